use super::field::FieldLevel;
use super::validation::ValidationIssue;
use thiserror::Error;

/// Ошибки редактирования схемы и матрицы вариантов.
///
/// Все ошибки локальные: операция отклоняется до изменения состояния.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuilderError {
    #[error("field `{name}` already exists at {level} level")]
    DuplicateFieldName { level: FieldLevel, name: String },

    #[error("select field `{name}` requires at least one option")]
    MissingOptions { name: String },

    #[error("only one image field is allowed at {level} level")]
    ImageFieldLimitExceeded { level: FieldLevel },

    #[error("field name must not be empty")]
    EmptyFieldName,

    #[error("the last variant row cannot be removed")]
    LastRowProtected,

    #[error("variant matrix must contain at least one row")]
    EmptyMatrix,

    #[error("field `{name}` is not defined at {level} level")]
    UnknownField { level: FieldLevel, name: String },

    #[error("field `{0}` holds images and is edited through attachments")]
    ImageFieldNotEditable(String),

    #[error("field `{name}` is not an image field at {level} level")]
    NotAnImageField { level: FieldLevel, name: String },

    #[error("variant row {0} does not exist")]
    VariantNotFound(usize),

    #[error("combination row {combination} of variant {variant} does not exist")]
    CombinationNotFound { variant: usize, combination: usize },

    #[error("attachment {0} does not exist")]
    AttachmentNotFound(usize),
}

/// Ошибки отправки товара
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SubmitError {
    #[error("validation failed: {}", format_issues(.0))]
    Validation(Vec<ValidationIssue>),

    #[error("image upload failed: {0}")]
    UploadFailed(String),

    #[error("product submission failed: {0}")]
    SubmissionFailed(String),
}

fn format_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

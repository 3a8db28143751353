use super::error::BuilderError;
use super::field::FieldKind;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Локально выбранный, ещё не загруженный файл.
///
/// Сам blob хранится на стороне UI; здесь только описатель с ключом `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingFile {
    pub id: Uuid,
    pub file_name: String,
    pub content_type: String,
    pub size: u64,
    /// Unix-время изменения в миллисекундах
    pub last_modified: i64,
}

impl PendingFile {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        size: u64,
        last_modified: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            file_name: file_name.into(),
            content_type: content_type.into(),
            size,
            last_modified,
        }
    }

    /// Тот же файл, выбранный повторно (другой `id`, те же атрибуты)
    pub fn same_source(&self, other: &PendingFile) -> bool {
        self.id == other.id
            || (self.file_name == other.file_name
                && self.size == other.size
                && self.last_modified == other.last_modified)
    }
}

/// Элемент списка изображений поля: ожидающий загрузки файл или URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum ImageRef {
    Pending(PendingFile),
    Uploaded(String),
}

impl ImageRef {
    pub fn is_pending(&self) -> bool {
        matches!(self, ImageRef::Pending(_))
    }

    pub fn as_pending(&self) -> Option<&PendingFile> {
        match self {
            ImageRef::Pending(file) => Some(file),
            ImageRef::Uploaded(_) => None,
        }
    }

    pub fn as_url(&self) -> Option<&str> {
        match self {
            ImageRef::Uploaded(url) => Some(url),
            ImageRef::Pending(_) => None,
        }
    }

    pub(crate) fn duplicates(&self, other: &ImageRef) -> bool {
        match (self, other) {
            (ImageRef::Pending(a), ImageRef::Pending(b)) => a.same_source(b),
            (ImageRef::Uploaded(a), ImageRef::Uploaded(b)) => a == b,
            _ => false,
        }
    }
}

/// Типизированное значение пользовательского поля
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Bool(bool),
    Select(String),
    Color(String),
    Images(Vec<ImageRef>),
}

impl FieldValue {
    pub const DEFAULT_COLOR: &'static str = "#000000";

    pub fn kind(&self) -> FieldKind {
        match self {
            Self::Text(_) => FieldKind::Text,
            Self::Number(_) => FieldKind::Number,
            Self::Bool(_) => FieldKind::Boolean,
            Self::Select(_) => FieldKind::Select,
            Self::Color(_) => FieldKind::Color,
            Self::Images(_) => FieldKind::Image,
        }
    }

    /// Строковое представление для полей ввода
    pub fn as_text(&self) -> String {
        match self {
            Self::Text(s) | Self::Select(s) | Self::Color(s) => s.clone(),
            Self::Number(n) => n.to_string(),
            Self::Bool(b) => b.to_string(),
            Self::Images(_) => String::new(),
        }
    }

    pub fn as_number(&self) -> f64 {
        match self {
            Self::Number(n) => *n,
            Self::Bool(true) => 1.0,
            Self::Bool(false) => 0.0,
            Self::Text(s) | Self::Select(s) | Self::Color(s) => parse_number(s),
            Self::Images(_) => 0.0,
        }
    }

    pub fn as_bool(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Number(n) => *n != 0.0,
            Self::Text(s) | Self::Select(s) | Self::Color(s) => parse_flag(s),
            Self::Images(list) => !list.is_empty(),
        }
    }

    pub fn images(&self) -> Option<&[ImageRef]> {
        match self {
            Self::Images(list) => Some(list),
            _ => None,
        }
    }

    pub fn has_pending(&self) -> bool {
        self.images()
            .map(|list| list.iter().any(ImageRef::is_pending))
            .unwrap_or(false)
    }

    /// JSON для запроса на создание товара.
    /// Ожидающие загрузки файлы в запрос не попадают.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value;
        match self {
            Self::Text(s) | Self::Select(s) | Self::Color(s) => Value::String(s.clone()),
            Self::Number(n) => serde_json::Number::from_f64(*n)
                .map(Value::Number)
                .unwrap_or_else(|| Value::from(0)),
            Self::Bool(b) => Value::Bool(*b),
            Self::Images(list) => Value::Array(
                list.iter()
                    .filter_map(ImageRef::as_url)
                    .map(|url| Value::String(url.to_string()))
                    .collect(),
            ),
        }
    }
}

/// Необработанный ввод оператора
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawValue {
    Text(String),
    Flag(bool),
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        RawValue::Text(value)
    }
}

impl From<bool> for RawValue {
    fn from(value: bool) -> Self {
        RawValue::Flag(value)
    }
}

impl RawValue {
    fn into_text(self) -> String {
        match self {
            RawValue::Text(s) => s,
            RawValue::Flag(b) => b.to_string(),
        }
    }
}

/// Приведение ввода к типу поля.
///
/// Для чисел ошибка разбора даёт `0`. Текст, список и цвет сохраняются как есть,
/// проверка выполняется перед отправкой.
pub fn coerce(kind: FieldKind, field: &str, raw: RawValue) -> Result<FieldValue, BuilderError> {
    let value = match kind {
        FieldKind::Number => FieldValue::Number(match raw {
            RawValue::Text(s) => parse_number(&s),
            RawValue::Flag(b) => f64::from(u8::from(b)),
        }),
        FieldKind::Boolean => FieldValue::Bool(match raw {
            RawValue::Flag(b) => b,
            RawValue::Text(s) => parse_flag(&s),
        }),
        FieldKind::Text => FieldValue::Text(raw.into_text()),
        FieldKind::Select => FieldValue::Select(raw.into_text()),
        FieldKind::Color => FieldValue::Color(raw.into_text()),
        FieldKind::Image => return Err(BuilderError::ImageFieldNotEditable(field.to_string())),
    };
    Ok(value)
}

pub fn parse_number(s: &str) -> f64 {
    s.trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .unwrap_or(0.0)
}

fn parse_flag(s: &str) -> bool {
    matches!(s.trim().to_lowercase().as_str(), "true" | "1" | "on")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_coercion_falls_back_to_zero() {
        let v = coerce(FieldKind::Number, "weight", "abc".into()).unwrap();
        assert_eq!(v, FieldValue::Number(0.0));
        let v = coerce(FieldKind::Number, "weight", " 12.5 ".into()).unwrap();
        assert_eq!(v, FieldValue::Number(12.5));
        let v = coerce(FieldKind::Number, "weight", "NaN".into()).unwrap();
        assert_eq!(v, FieldValue::Number(0.0));
        let v = coerce(FieldKind::Number, "weight", "".into()).unwrap();
        assert_eq!(v, FieldValue::Number(0.0));
    }

    #[test]
    fn test_text_like_kinds_store_verbatim() {
        let v = coerce(FieldKind::Color, "tone", "not-a-color".into()).unwrap();
        assert_eq!(v, FieldValue::Color("not-a-color".into()));
        let v = coerce(FieldKind::Select, "size", "XL".into()).unwrap();
        assert_eq!(v, FieldValue::Select("XL".into()));
        let v = coerce(FieldKind::Text, "note", " spaced ".into()).unwrap();
        assert_eq!(v, FieldValue::Text(" spaced ".into()));
    }

    #[test]
    fn test_boolean_coercion() {
        assert_eq!(coerce(FieldKind::Boolean, "f", true.into()).unwrap(), FieldValue::Bool(true));
        assert_eq!(coerce(FieldKind::Boolean, "f", "ON".into()).unwrap(), FieldValue::Bool(true));
        assert_eq!(coerce(FieldKind::Boolean, "f", "no".into()).unwrap(), FieldValue::Bool(false));
    }

    #[test]
    fn test_image_kind_rejects_direct_edit() {
        let err = coerce(FieldKind::Image, "SKUImage", "x".into()).unwrap_err();
        assert_eq!(err, BuilderError::ImageFieldNotEditable("SKUImage".into()));
    }

    #[test]
    fn test_images_to_json_skips_pending() {
        let value = FieldValue::Images(vec![
            ImageRef::Uploaded("https://cdn/a.png".into()),
            ImageRef::Pending(PendingFile::new("b.png", "image/png", 10, 0)),
        ]);
        assert!(value.has_pending());
        assert_eq!(value.to_json(), serde_json::json!(["https://cdn/a.png"]));
    }

    #[test]
    fn test_same_source_detects_reselected_file() {
        let a = PendingFile::new("a.png", "image/png", 10, 5);
        let again = PendingFile::new("a.png", "image/png", 10, 5);
        let other = PendingFile::new("a.png", "image/png", 11, 5);
        assert_ne!(a.id, again.id);
        assert!(a.same_source(&again));
        assert!(!a.same_source(&other));
    }
}

//! Вариативный товар (агрегат a025)
//!
//! Конструктор матрицы вариантов: схема пользовательских полей на двух
//! уровнях (вариант / комбинация), строки вариантов с вложенными
//! комбинациями, вложения-изображения и сборка запроса на создание товара.

pub mod editor;
pub mod error;
pub mod field;
pub mod matrix;
pub mod payload;
pub mod schema;
pub mod staging;
pub mod submission;
pub mod validation;
pub mod value;

pub use editor::{ProductDraft, VariationEditor};
pub use error::{BuilderError, SubmitError};
pub use field::{FieldDefinition, FieldKind, FieldLevel};
pub use matrix::{CombinationRow, CustomFields, RowMatrix, VariantRow};
pub use payload::{CreatedProduct, GalleryImage, ProductCreatePayload, UploadedImage};
pub use schema::FieldSchema;
pub use staging::RowPath;
pub use submission::{submit, ImageUploader, ProductCreator};
pub use value::{FieldValue, ImageRef, PendingFile, RawValue};

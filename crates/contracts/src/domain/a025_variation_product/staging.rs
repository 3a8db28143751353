//! Вложения-изображения строк матрицы.
//!
//! Очередь файлов живёт прямо в значении поля `FieldValue::Images`:
//! ожидающие загрузки файлы и уже загруженные URL в одном упорядоченном списке.

use super::error::BuilderError;
use super::field::{FieldKind, FieldLevel};
use super::matrix::{CustomFields, RowMatrix};
use super::schema::FieldSchema;
use super::value::{FieldValue, ImageRef, PendingFile};
use serde::{Deserialize, Serialize};

/// Адрес строки матрицы
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RowPath {
    Variant(usize),
    Combination(usize, usize),
}

impl RowPath {
    pub fn level(&self) -> FieldLevel {
        match self {
            RowPath::Variant(_) => FieldLevel::Variant,
            RowPath::Combination(..) => FieldLevel::Combination,
        }
    }
}

/// Дописать файлы в конец списка, пропуская уже присутствующие.
/// Возвращает число добавленных.
pub fn stage_files(list: &mut Vec<ImageRef>, files: Vec<PendingFile>) -> usize {
    let mut added = 0;
    for file in files {
        let candidate = ImageRef::Pending(file);
        if list.iter().any(|existing| existing.duplicates(&candidate)) {
            log::debug!("staging: skip duplicate attachment");
            continue;
        }
        list.push(candidate);
        added += 1;
    }
    added
}

pub fn unstage_at(list: &mut Vec<ImageRef>, index: usize) -> Result<ImageRef, BuilderError> {
    if index >= list.len() {
        return Err(BuilderError::AttachmentNotFound(index));
    }
    Ok(list.remove(index))
}

impl RowMatrix {
    fn image_list_mut(
        &mut self,
        schema: &FieldSchema,
        path: RowPath,
        field: &str,
    ) -> Result<&mut Vec<ImageRef>, BuilderError> {
        let level = path.level();
        ensure_image_field(schema, level, field)?;
        let fields = match path {
            RowPath::Variant(v) => &mut self.variant_mut(v)?.custom_fields,
            RowPath::Combination(v, c) => &mut self.combination_mut(v, c)?.custom_fields,
        };
        let slot = fields
            .entry(field.to_string())
            .or_insert_with(|| FieldValue::Images(Vec::new()));
        match slot {
            FieldValue::Images(list) => Ok(list),
            _ => Err(BuilderError::NotAnImageField {
                level,
                name: field.to_string(),
            }),
        }
    }

    /// Текущий список вложений поля
    pub fn images(&self, path: RowPath, field: &str) -> Option<&[ImageRef]> {
        let fields = match path {
            RowPath::Variant(v) => &self.variant(v)?.custom_fields,
            RowPath::Combination(v, c) => &self.variant(v)?.combinations.get(c)?.custom_fields,
        };
        fields.get(field).and_then(FieldValue::images)
    }

    pub fn append_files(
        &mut self,
        schema: &FieldSchema,
        path: RowPath,
        field: &str,
        files: Vec<PendingFile>,
    ) -> Result<usize, BuilderError> {
        let list = self.image_list_mut(schema, path, field)?;
        Ok(stage_files(list, files))
    }

    pub fn remove_image_at(
        &mut self,
        schema: &FieldSchema,
        path: RowPath,
        field: &str,
        index: usize,
    ) -> Result<ImageRef, BuilderError> {
        let list = self.image_list_mut(schema, path, field)?;
        unstage_at(list, index)
    }

    /// Количество ожидающих загрузки файлов во всей матрице
    pub fn pending_count(&self) -> usize {
        self.variants()
            .iter()
            .map(|v| {
                pending_in(&v.custom_fields)
                    + v.combinations
                        .iter()
                        .map(|c| pending_in(&c.custom_fields))
                        .sum::<usize>()
            })
            .sum()
    }
}

fn pending_in(fields: &CustomFields) -> usize {
    fields
        .values()
        .filter_map(FieldValue::images)
        .map(|list| list.iter().filter(|i| i.is_pending()).count())
        .sum()
}

fn ensure_image_field(
    schema: &FieldSchema,
    level: FieldLevel,
    field: &str,
) -> Result<(), BuilderError> {
    match schema.find(level, field) {
        Some(def) if def.kind == FieldKind::Image => Ok(()),
        _ => Err(BuilderError::NotAnImageField {
            level,
            name: field.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::a025_variation_product::field::FieldDefinition;

    fn file(name: &str) -> PendingFile {
        PendingFile::new(name, "image/png", 100, 1)
    }

    fn setup() -> (FieldSchema, RowMatrix) {
        let mut schema = FieldSchema::new();
        let mut matrix = RowMatrix::new(&schema);
        let def = schema
            .add_field(FieldLevel::Variant, FieldDefinition::image())
            .unwrap();
        matrix.backfill_field(FieldLevel::Variant, &def);
        (schema, matrix)
    }

    fn names(list: &[ImageRef]) -> Vec<&str> {
        list.iter()
            .map(|i| match i {
                ImageRef::Pending(f) => f.file_name.as_str(),
                ImageRef::Uploaded(u) => u.as_str(),
            })
            .collect()
    }

    #[test]
    fn test_append_preserves_order_across_calls() {
        let (schema, mut matrix) = setup();
        let path = RowPath::Variant(0);
        matrix
            .append_files(&schema, path, "SKUImage", vec![file("a"), file("b")])
            .unwrap();
        matrix
            .append_files(&schema, path, "SKUImage", vec![file("c")])
            .unwrap();
        assert_eq!(names(matrix.images(path, "SKUImage").unwrap()), vec!["a", "b", "c"]);
        assert_eq!(matrix.pending_count(), 3);
    }

    #[test]
    fn test_append_keeps_uploaded_urls_and_skips_duplicates() {
        let (schema, mut matrix) = setup();
        let path = RowPath::Variant(0);
        if let Ok(row) = matrix.variant_mut(0) {
            row.custom_fields.insert(
                "SKUImage".into(),
                FieldValue::Images(vec![ImageRef::Uploaded("https://cdn/old.png".into())]),
            );
        }
        let a = file("a");
        let added = matrix
            .append_files(&schema, path, "SKUImage", vec![a.clone(), file("a")])
            .unwrap();
        assert_eq!(added, 1);
        let added = matrix
            .append_files(&schema, path, "SKUImage", vec![a])
            .unwrap();
        assert_eq!(added, 0);
        assert_eq!(
            names(matrix.images(path, "SKUImage").unwrap()),
            vec!["https://cdn/old.png", "a"]
        );
    }

    #[test]
    fn test_remove_at_ignores_entry_type() {
        let (schema, mut matrix) = setup();
        let path = RowPath::Variant(0);
        if let Ok(row) = matrix.variant_mut(0) {
            row.custom_fields.insert(
                "SKUImage".into(),
                FieldValue::Images(vec![ImageRef::Uploaded("u1".into())]),
            );
        }
        matrix
            .append_files(&schema, path, "SKUImage", vec![file("a")])
            .unwrap();

        let removed = matrix.remove_image_at(&schema, path, "SKUImage", 0).unwrap();
        assert_eq!(removed, ImageRef::Uploaded("u1".into()));
        let removed = matrix.remove_image_at(&schema, path, "SKUImage", 0).unwrap();
        assert!(removed.is_pending());
        assert_eq!(
            matrix.remove_image_at(&schema, path, "SKUImage", 0),
            Err(BuilderError::AttachmentNotFound(0))
        );
    }

    #[test]
    fn test_staging_requires_image_field() {
        let (schema, mut matrix) = setup();
        let err = matrix
            .append_files(&schema, RowPath::Variant(0), "name", vec![file("a")])
            .unwrap_err();
        assert!(matches!(err, BuilderError::NotAnImageField { .. }));

        let err = matrix
            .append_files(&schema, RowPath::Combination(0, 0), "CombinationImage", vec![])
            .unwrap_err();
        assert!(matches!(err, BuilderError::NotAnImageField { .. }));
    }

    #[test]
    fn test_combination_staging() {
        let mut schema = FieldSchema::new();
        let mut matrix = RowMatrix::new(&schema);
        matrix.add_combination(0, &schema).unwrap();
        let def = schema
            .add_field(FieldLevel::Combination, FieldDefinition::image())
            .unwrap();
        matrix.backfill_field(FieldLevel::Combination, &def);

        let path = RowPath::Combination(0, 0);
        matrix
            .append_files(&schema, path, "CombinationImage", vec![file("x")])
            .unwrap();
        assert_eq!(names(matrix.images(path, "CombinationImage").unwrap()), vec!["x"]);
        assert_eq!(
            matrix.append_files(&schema, RowPath::Combination(0, 4), "CombinationImage", vec![]),
            Err(BuilderError::CombinationNotFound {
                variant: 0,
                combination: 4
            })
        );
    }
}

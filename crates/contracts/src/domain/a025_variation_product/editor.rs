use super::error::BuilderError;
use super::field::{FieldDefinition, FieldLevel};
use super::matrix::{CustomFields, RowMatrix};
use super::schema::FieldSchema;
use super::staging::{stage_files, unstage_at, RowPath};
use super::validation::{validate, ValidationIssue};
use super::value::{ImageRef, PendingFile, RawValue};
use serde::{Deserialize, Serialize};

/// Реквизиты товара верхнего уровня
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    pub category_id: Option<String>,
    pub subcategory_id: Option<String>,
    pub tax_id: Option<String>,
    pub is_active: bool,
}

impl Default for ProductDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            category_id: None,
            subcategory_id: None,
            tax_id: None,
            is_active: true,
        }
    }
}

/// Сессия редактирования вариативного товара.
///
/// Владеет схемой полей, матрицей вариантов, реквизитами товара и галереей.
/// Любое изменение схемы проходит через сессию, чтобы сразу дописать
/// или убрать поле во всех строках.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "EditorRecord")]
pub struct VariationEditor {
    schema: FieldSchema,
    matrix: RowMatrix,
    pub product: ProductDraft,
    gallery: Vec<ImageRef>,
}

#[derive(Deserialize)]
struct EditorRecord {
    schema: FieldSchema,
    matrix: RowMatrix,
    product: ProductDraft,
    gallery: Vec<ImageRef>,
}

/// Строки сохранённой сессии не могут нести поля, которых нет в схеме;
/// недостающие поля дописываются значениями по умолчанию.
impl TryFrom<EditorRecord> for VariationEditor {
    type Error = BuilderError;

    fn try_from(record: EditorRecord) -> Result<Self, Self::Error> {
        let EditorRecord {
            schema,
            mut matrix,
            product,
            gallery,
        } = record;

        for variant in matrix.variants() {
            ensure_known_keys(&schema, FieldLevel::Variant, &variant.custom_fields)?;
            for combination in &variant.combinations {
                ensure_known_keys(&schema, FieldLevel::Combination, &combination.custom_fields)?;
            }
        }
        for level in [FieldLevel::Variant, FieldLevel::Combination] {
            for definition in schema.custom_fields(level) {
                matrix.backfill_field(level, definition);
            }
        }

        Ok(Self {
            schema,
            matrix,
            product,
            gallery,
        })
    }
}

fn ensure_known_keys(
    schema: &FieldSchema,
    level: FieldLevel,
    fields: &CustomFields,
) -> Result<(), BuilderError> {
    match fields
        .keys()
        .find(|name| !schema.custom_fields(level).any(|f| &f.name == *name))
    {
        Some(name) => Err(BuilderError::UnknownField {
            level,
            name: name.clone(),
        }),
        None => Ok(()),
    }
}

impl Default for VariationEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl VariationEditor {
    pub fn new() -> Self {
        Self::with_schema(FieldSchema::new())
    }

    pub fn with_schema(schema: FieldSchema) -> Self {
        let matrix = RowMatrix::new(&schema);
        Self {
            schema,
            matrix,
            product: ProductDraft::default(),
            gallery: Vec::new(),
        }
    }

    pub fn schema(&self) -> &FieldSchema {
        &self.schema
    }

    pub fn matrix(&self) -> &RowMatrix {
        &self.matrix
    }

    pub fn gallery(&self) -> &[ImageRef] {
        &self.gallery
    }

    // === Схема ===

    pub fn add_field(
        &mut self,
        level: FieldLevel,
        definition: FieldDefinition,
    ) -> Result<FieldDefinition, BuilderError> {
        let added = self.schema.add_field(level, definition)?;
        self.matrix.backfill_field(level, &added);
        Ok(added)
    }

    pub fn remove_field(&mut self, level: FieldLevel, name: &str) -> Option<FieldDefinition> {
        let removed = self.schema.remove_field(level, name)?;
        self.matrix.strip_field(level, &removed.name);
        Some(removed)
    }

    // === Строки ===

    pub fn add_variant(&mut self) -> usize {
        self.matrix.add_variant(&self.schema)
    }

    pub fn remove_variant(&mut self, index: usize) -> Result<(), BuilderError> {
        self.matrix.remove_variant(index).map(|_| ())
    }

    pub fn add_combination(&mut self, variant: usize) -> Result<usize, BuilderError> {
        self.matrix.add_combination(variant, &self.schema)
    }

    pub fn remove_combination(
        &mut self,
        variant: usize,
        combination: usize,
    ) -> Result<(), BuilderError> {
        self.matrix
            .remove_combination(variant, combination)
            .map(|_| ())
    }

    pub fn set_variant_field_value(
        &mut self,
        variant: usize,
        field: &str,
        raw: impl Into<RawValue>,
    ) -> Result<(), BuilderError> {
        self.matrix
            .set_variant_field_value(&self.schema, variant, field, raw)
    }

    pub fn set_combination_field_value(
        &mut self,
        variant: usize,
        combination: usize,
        field: &str,
        raw: impl Into<RawValue>,
    ) -> Result<(), BuilderError> {
        self.matrix
            .set_combination_field_value(&self.schema, variant, combination, field, raw)
    }

    // === Вложения ===

    pub fn append_files(
        &mut self,
        path: RowPath,
        field: &str,
        files: Vec<PendingFile>,
    ) -> Result<usize, BuilderError> {
        self.matrix.append_files(&self.schema, path, field, files)
    }

    pub fn remove_image_at(
        &mut self,
        path: RowPath,
        field: &str,
        index: usize,
    ) -> Result<ImageRef, BuilderError> {
        self.matrix.remove_image_at(&self.schema, path, field, index)
    }

    pub fn append_gallery_files(&mut self, files: Vec<PendingFile>) -> usize {
        stage_files(&mut self.gallery, files)
    }

    pub fn remove_gallery_at(&mut self, index: usize) -> Result<ImageRef, BuilderError> {
        unstage_at(&mut self.gallery, index)
    }

    /// Файлы, ожидающие загрузки (матрица и галерея)
    pub fn pending_count(&self) -> usize {
        self.matrix.pending_count() + self.gallery.iter().filter(|i| i.is_pending()).count()
    }

    // === Отправка ===

    pub fn validate(&self) -> Result<(), Vec<ValidationIssue>> {
        validate(&self.product, &self.schema, &self.matrix)
    }

    /// Зафиксировать результат успешной отправки
    pub(crate) fn commit_resolved(&mut self, matrix: RowMatrix, gallery: Vec<ImageRef>) {
        self.matrix = matrix;
        self.gallery = gallery;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::a025_variation_product::field::FieldKind;
    use crate::domain::a025_variation_product::value::FieldValue;
    use std::collections::BTreeSet;

    fn key_sets(editor: &VariationEditor) -> (Vec<BTreeSet<String>>, Vec<BTreeSet<String>>) {
        let variants = editor
            .matrix()
            .variants()
            .iter()
            .map(|v| v.custom_fields.keys().cloned().collect())
            .collect();
        let combinations = editor
            .matrix()
            .variants()
            .iter()
            .flat_map(|v| &v.combinations)
            .map(|c| c.custom_fields.keys().cloned().collect())
            .collect();
        (variants, combinations)
    }

    fn assert_converged(editor: &VariationEditor) {
        let expected = |level| -> BTreeSet<String> {
            editor
                .schema()
                .custom_fields(level)
                .map(|f| f.name.clone())
                .collect()
        };
        let (variants, combinations) = key_sets(editor);
        for keys in variants {
            assert_eq!(keys, expected(FieldLevel::Variant));
        }
        for keys in combinations {
            assert_eq!(keys, expected(FieldLevel::Combination));
        }
    }

    #[test]
    fn test_select_field_then_new_variant_has_empty_value() {
        let mut editor = VariationEditor::new();
        editor
            .add_field(
                FieldLevel::Variant,
                FieldDefinition::select("Color", ["Red", "Blue"]),
            )
            .unwrap();
        let index = editor.add_variant();
        assert_eq!(
            editor.matrix().variants()[index].custom_fields["Color"],
            FieldValue::Select(String::new())
        );
    }

    #[test]
    fn test_new_field_backfills_existing_rows() {
        let mut editor = VariationEditor::new();
        editor.add_variant();
        editor
            .add_field(FieldLevel::Variant, FieldDefinition::new("Material", FieldKind::Text))
            .unwrap();
        for row in editor.matrix().variants() {
            assert_eq!(row.custom_fields["Material"], FieldValue::Text(String::new()));
        }
    }

    #[test]
    fn test_keys_converge_after_every_schema_change() {
        let mut editor = VariationEditor::new();
        editor.add_variant();
        editor.add_combination(0).unwrap();
        editor.add_combination(1).unwrap();

        let steps: Vec<Box<dyn Fn(&mut VariationEditor)>> = vec![
            Box::new(|e: &mut VariationEditor| {
                e.add_field(FieldLevel::Variant, FieldDefinition::new("A", FieldKind::Number))
                    .unwrap();
            }),
            Box::new(|e: &mut VariationEditor| {
                e.add_field(FieldLevel::Combination, FieldDefinition::image())
                    .unwrap();
            }),
            Box::new(|e: &mut VariationEditor| {
                e.add_variant();
            }),
            Box::new(|e: &mut VariationEditor| {
                e.add_combination(2).unwrap();
            }),
            Box::new(|e: &mut VariationEditor| {
                e.remove_field(FieldLevel::Variant, "A");
            }),
            Box::new(|e: &mut VariationEditor| {
                e.add_field(FieldLevel::Variant, FieldDefinition::new("B", FieldKind::Color))
                    .unwrap();
            }),
            Box::new(|e: &mut VariationEditor| {
                e.remove_field(FieldLevel::Combination, "CombinationImage");
            }),
        ];
        for step in steps {
            step(&mut editor);
            assert_converged(&editor);
        }
    }

    #[test]
    fn test_add_then_remove_restores_key_sets() {
        let mut editor = VariationEditor::new();
        editor
            .add_field(FieldLevel::Variant, FieldDefinition::new("Keep", FieldKind::Boolean))
            .unwrap();
        editor.add_variant();
        editor.add_combination(1).unwrap();
        let before = key_sets(&editor);

        editor
            .add_field(FieldLevel::Variant, FieldDefinition::new("Temp", FieldKind::Text))
            .unwrap();
        editor
            .add_field(FieldLevel::Combination, FieldDefinition::new("Temp", FieldKind::Text))
            .unwrap();
        editor.remove_field(FieldLevel::Variant, "Temp");
        editor.remove_field(FieldLevel::Combination, "Temp");

        assert_eq!(key_sets(&editor), before);
    }

    #[test]
    fn test_rejected_field_leaves_editor_unchanged() {
        let mut editor = VariationEditor::new();
        editor.add_field(FieldLevel::Variant, FieldDefinition::image()).unwrap();
        let before = editor.clone();
        let err = editor
            .add_field(FieldLevel::Variant, FieldDefinition::image())
            .unwrap_err();
        assert_eq!(
            err,
            BuilderError::ImageFieldLimitExceeded {
                level: FieldLevel::Variant
            }
        );
        assert_eq!(editor, before);
    }

    #[test]
    fn test_gallery_staging_and_pending_count() {
        let mut editor = VariationEditor::new();
        let a = PendingFile::new("a.jpg", "image/jpeg", 1, 1);
        assert_eq!(editor.append_gallery_files(vec![a.clone(), a]), 1);
        assert_eq!(editor.pending_count(), 1);
        assert!(editor.remove_gallery_at(0).is_ok());
        assert_eq!(
            editor.remove_gallery_at(0),
            Err(BuilderError::AttachmentNotFound(0))
        );
    }

    #[test]
    fn test_last_variant_cannot_be_removed() {
        let mut editor = VariationEditor::new();
        assert_eq!(editor.remove_variant(0), Err(BuilderError::LastRowProtected));
        assert_eq!(editor.matrix().len(), 1);
    }

    #[test]
    fn test_saved_session_is_checked_on_load() {
        let mut editor = VariationEditor::new();
        editor
            .add_field(FieldLevel::Variant, FieldDefinition::select("Color", ["Red, Blue"]))
            .unwrap();
        editor
            .add_field(FieldLevel::Variant, FieldDefinition::image())
            .unwrap();
        editor.add_variant();

        let json = serde_json::to_value(&editor).unwrap();
        let restored: VariationEditor = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(restored, editor);

        // поле, которого нет в схеме
        let mut stray = json.clone();
        stray["matrix"]["variants"][0]["customFields"]["Material"] =
            serde_json::json!({ "kind": "text", "value": "" });
        assert!(serde_json::from_value::<VariationEditor>(stray).is_err());

        // матрица без строк
        let mut empty = json.clone();
        empty["matrix"]["variants"] = serde_json::json!([]);
        assert!(serde_json::from_value::<VariationEditor>(empty).is_err());

        // второе поле-изображение
        let mut two_images = json;
        two_images["schema"]["variant"]
            .as_array_mut()
            .unwrap()
            .push(serde_json::json!({ "name": "Extra", "kind": "image" }));
        assert!(serde_json::from_value::<VariationEditor>(two_images).is_err());
    }
}

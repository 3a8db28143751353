use super::error::BuilderError;
use super::field::{
    parse_options, FieldDefinition, FieldKind, FieldLevel, VARIANT_NAME, VARIANT_SKU_LABEL,
};
use serde::{Deserialize, Serialize};

/// Реестр пользовательских полей для обоих уровней матрицы.
///
/// Порядок полей: сначала базовые, затем в порядке добавления.
/// Реестр не трогает строки сами по себе; каскад в матрицу выполняет
/// [`VariationEditor`](super::VariationEditor).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SchemaRecord")]
pub struct FieldSchema {
    variant: Vec<FieldDefinition>,
    combination: Vec<FieldDefinition>,
}

#[derive(Deserialize)]
struct SchemaRecord {
    variant: Vec<FieldDefinition>,
    combination: Vec<FieldDefinition>,
}

/// Сохранённая схема собирается заново через `add_field`,
/// поэтому проходит те же проверки, что и ввод оператора.
impl TryFrom<SchemaRecord> for FieldSchema {
    type Error = BuilderError;

    fn try_from(record: SchemaRecord) -> Result<Self, Self::Error> {
        let mut schema = FieldSchema::new();
        let levels = [
            (FieldLevel::Variant, record.variant),
            (FieldLevel::Combination, record.combination),
        ];
        for (level, fields) in levels {
            for definition in fields {
                if definition.is_default {
                    let builtin = schema
                        .find(level, &definition.name)
                        .is_some_and(|f| f.is_default && f.kind == definition.kind);
                    if !builtin {
                        return Err(BuilderError::UnknownField {
                            level,
                            name: definition.name,
                        });
                    }
                    continue;
                }
                schema.add_field(level, definition)?;
            }
        }
        Ok(schema)
    }
}

impl Default for FieldSchema {
    fn default() -> Self {
        Self {
            variant: vec![
                FieldDefinition::builtin(VARIANT_NAME, FieldKind::Text),
                FieldDefinition::builtin(VARIANT_SKU_LABEL, FieldKind::Text),
            ],
            combination: Vec::new(),
        }
    }
}

impl FieldSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fields(&self, level: FieldLevel) -> &[FieldDefinition] {
        match level {
            FieldLevel::Variant => &self.variant,
            FieldLevel::Combination => &self.combination,
        }
    }

    fn fields_mut(&mut self, level: FieldLevel) -> &mut Vec<FieldDefinition> {
        match level {
            FieldLevel::Variant => &mut self.variant,
            FieldLevel::Combination => &mut self.combination,
        }
    }

    /// Поля, значения которых хранятся в `custom_fields` строк
    pub fn custom_fields(&self, level: FieldLevel) -> impl Iterator<Item = &FieldDefinition> {
        self.fields(level).iter().filter(|f| !f.is_default)
    }

    pub fn find(&self, level: FieldLevel, name: &str) -> Option<&FieldDefinition> {
        self.fields(level).iter().find(|f| f.name == name)
    }

    /// Тип поля; неизвестные имена считаются числовыми (цена, остаток)
    pub fn kind_of(&self, level: FieldLevel, name: &str) -> FieldKind {
        self.find(level, name)
            .map(|f| f.kind)
            .unwrap_or(FieldKind::Number)
    }

    pub fn has_image_field(&self, level: FieldLevel) -> bool {
        self.fields(level).iter().any(|f| f.kind == FieldKind::Image)
    }

    pub fn image_field_names(&self, level: FieldLevel) -> Vec<String> {
        self.fields(level)
            .iter()
            .filter(|f| f.kind == FieldKind::Image)
            .map(|f| f.name.clone())
            .collect()
    }

    /// Добавить поле. При ошибке схема не меняется.
    pub fn add_field(
        &mut self,
        level: FieldLevel,
        definition: FieldDefinition,
    ) -> Result<FieldDefinition, BuilderError> {
        let normalized = self.prepare(level, definition)?;
        log::debug!(
            "schema: add {} field `{}` ({})",
            level,
            normalized.name,
            normalized.kind
        );
        self.fields_mut(level).push(normalized.clone());
        Ok(normalized)
    }

    fn prepare(
        &self,
        level: FieldLevel,
        definition: FieldDefinition,
    ) -> Result<FieldDefinition, BuilderError> {
        let FieldDefinition { name, kind, options, .. } = definition;

        let name = if kind == FieldKind::Image {
            if self.has_image_field(level) {
                return Err(BuilderError::ImageFieldLimitExceeded { level });
            }
            level.image_field_name().to_string()
        } else {
            let trimmed = name.trim();
            if trimmed.is_empty() {
                return Err(BuilderError::EmptyFieldName);
            }
            trimmed.to_string()
        };

        if self.find(level, &name).is_some() || level.is_reserved(&name) {
            return Err(BuilderError::DuplicateFieldName { level, name });
        }

        let options = if kind == FieldKind::Select {
            let options = parse_options(&options);
            if options.is_empty() {
                return Err(BuilderError::MissingOptions { name });
            }
            options
        } else {
            Vec::new()
        };

        Ok(FieldDefinition {
            name,
            kind,
            options,
            is_default: false,
        })
    }

    /// Удалить поле. Отсутствующие и базовые поля игнорируются.
    pub fn remove_field(&mut self, level: FieldLevel, name: &str) -> Option<FieldDefinition> {
        let fields = self.fields_mut(level);
        let index = fields.iter().position(|f| f.name == name && !f.is_default)?;
        log::debug!("schema: remove {} field `{}`", level, name);
        Some(fields.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_schema_has_builtin_variant_fields() {
        let schema = FieldSchema::new();
        let names: Vec<_> = schema
            .fields(FieldLevel::Variant)
            .iter()
            .map(|f| f.name.as_str())
            .collect();
        assert_eq!(names, vec!["name", "skuLabel"]);
        assert!(schema.fields(FieldLevel::Combination).is_empty());
        assert_eq!(schema.custom_fields(FieldLevel::Variant).count(), 0);
    }

    #[test]
    fn test_add_select_normalizes_options() {
        let mut schema = FieldSchema::new();
        let def = schema
            .add_field(
                FieldLevel::Variant,
                FieldDefinition::select(" Color ", ["Red, Blue", "Red"]),
            )
            .unwrap();
        assert_eq!(def.name, "Color");
        assert_eq!(def.options, vec!["Red", "Blue"]);
        assert!(!def.is_default);
    }

    #[test]
    fn test_select_without_options_is_rejected() {
        let mut schema = FieldSchema::new();
        let err = schema
            .add_field(FieldLevel::Variant, FieldDefinition::select("Size", [" , "]))
            .unwrap_err();
        assert_eq!(err, BuilderError::MissingOptions { name: "Size".into() });
        assert_eq!(schema, FieldSchema::new());
    }

    #[test]
    fn test_duplicate_names_are_rejected_per_level() {
        let mut schema = FieldSchema::new();
        schema
            .add_field(FieldLevel::Variant, FieldDefinition::new("Material", FieldKind::Text))
            .unwrap();
        let err = schema
            .add_field(FieldLevel::Variant, FieldDefinition::new("Material", FieldKind::Number))
            .unwrap_err();
        assert!(matches!(err, BuilderError::DuplicateFieldName { .. }));

        // тот же ключ на другом уровне допустим
        schema
            .add_field(FieldLevel::Combination, FieldDefinition::new("Material", FieldKind::Text))
            .unwrap();
    }

    #[test]
    fn test_reserved_and_default_names_are_rejected() {
        let mut schema = FieldSchema::new();
        for name in ["name", "skuLabel", "basePrice", "stockQuantity", "combinations"] {
            let err = schema
                .add_field(FieldLevel::Variant, FieldDefinition::new(name, FieldKind::Text))
                .unwrap_err();
            assert!(matches!(err, BuilderError::DuplicateFieldName { .. }), "{name}");
        }
        let err = schema
            .add_field(FieldLevel::Combination, FieldDefinition::new("price", FieldKind::Number))
            .unwrap_err();
        assert!(matches!(err, BuilderError::DuplicateFieldName { .. }));
    }

    #[test]
    fn test_empty_name_is_rejected() {
        let mut schema = FieldSchema::new();
        let err = schema
            .add_field(FieldLevel::Variant, FieldDefinition::new("   ", FieldKind::Text))
            .unwrap_err();
        assert_eq!(err, BuilderError::EmptyFieldName);
    }

    #[test]
    fn test_second_image_field_is_rejected() {
        let mut schema = FieldSchema::new();
        let first = schema
            .add_field(FieldLevel::Variant, FieldDefinition::image())
            .unwrap();
        assert_eq!(first.name, "SKUImage");
        let before = schema.clone();

        let err = schema
            .add_field(FieldLevel::Variant, FieldDefinition::image())
            .unwrap_err();
        assert_eq!(
            err,
            BuilderError::ImageFieldLimitExceeded {
                level: FieldLevel::Variant
            }
        );
        assert_eq!(schema, before);

        let combo = schema
            .add_field(FieldLevel::Combination, FieldDefinition::image())
            .unwrap();
        assert_eq!(combo.name, "CombinationImage");
    }

    #[test]
    fn test_image_limit_holds_across_add_remove_sequences() {
        let mut schema = FieldSchema::new();
        for _ in 0..3 {
            let _ = schema.add_field(FieldLevel::Variant, FieldDefinition::image());
            assert_eq!(schema.image_field_names(FieldLevel::Variant).len(), 1);
            schema.remove_field(FieldLevel::Variant, "SKUImage");
            assert!(!schema.has_image_field(FieldLevel::Variant));
        }
    }

    #[test]
    fn test_remove_ignores_defaults_and_missing() {
        let mut schema = FieldSchema::new();
        assert!(schema.remove_field(FieldLevel::Variant, "name").is_none());
        assert!(schema.remove_field(FieldLevel::Variant, "ghost").is_none());
        assert_eq!(schema, FieldSchema::new());
    }

    #[test]
    fn test_kind_of_falls_back_to_number() {
        let mut schema = FieldSchema::new();
        schema
            .add_field(FieldLevel::Variant, FieldDefinition::new("Shiny", FieldKind::Boolean))
            .unwrap();
        assert_eq!(schema.kind_of(FieldLevel::Variant, "Shiny"), FieldKind::Boolean);
        assert_eq!(schema.kind_of(FieldLevel::Variant, "name"), FieldKind::Text);
        assert_eq!(schema.kind_of(FieldLevel::Variant, "basePrice"), FieldKind::Number);
    }
}

use super::editor::ProductDraft;
use super::field::{FieldKind, FieldLevel};
use super::matrix::{CustomFields, RowMatrix};
use super::schema::FieldSchema;
use super::value::FieldValue;
use crate::shared::validation::ValidationRules;
use serde::{Deserialize, Serialize};

const NAME_RULES: ValidationRules = ValidationRules::required();
const PRICE_RULES: ValidationRules = ValidationRules::non_negative();
const COLOR_RULES: ValidationRules = ValidationRules::hex_color();

/// Замечание проверки перед отправкой
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Например `sku[0].combinations[1].Storage`
    pub location: String,
    pub message: String,
}

impl ValidationIssue {
    fn new(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.location, self.message)
    }
}

/// Проверить товар и матрицу; собирает все замечания, а не только первое
pub fn validate(
    product: &ProductDraft,
    schema: &FieldSchema,
    matrix: &RowMatrix,
) -> Result<(), Vec<ValidationIssue>> {
    let mut issues = Vec::new();
    let mut check = |location: String, result: Result<(), String>| {
        if let Err(message) = result {
            issues.push(ValidationIssue::new(location, message));
        }
    };

    check(
        "product.name".into(),
        NAME_RULES.with_max_length(255).validate_string(&product.name, "Наименование товара"),
    );

    for (vi, variant) in matrix.variants().iter().enumerate() {
        let prefix = format!("sku[{}]", vi);
        check(
            format!("{}.name", prefix),
            NAME_RULES.validate_string(&variant.name, "Наименование варианта"),
        );
        check(
            format!("{}.basePrice", prefix),
            PRICE_RULES.validate_number(variant.base_price, "Цена"),
        );
        for (location, result) in
            check_custom_fields(schema, FieldLevel::Variant, &prefix, &variant.custom_fields)
        {
            check(location, result);
        }

        for (ci, combination) in variant.combinations.iter().enumerate() {
            let prefix = format!("{}.combinations[{}]", prefix, ci);
            check(
                format!("{}.price", prefix),
                PRICE_RULES.validate_number(combination.price, "Цена"),
            );
            for (location, result) in check_custom_fields(
                schema,
                FieldLevel::Combination,
                &prefix,
                &combination.custom_fields,
            ) {
                check(location, result);
            }
        }
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues)
    }
}

fn check_custom_fields(
    schema: &FieldSchema,
    level: FieldLevel,
    prefix: &str,
    fields: &CustomFields,
) -> Vec<(String, Result<(), String>)> {
    schema
        .custom_fields(level)
        .filter_map(|def| {
            let value = fields.get(&def.name)?;
            let result = match (def.kind, value) {
                (FieldKind::Color, FieldValue::Color(color)) => {
                    COLOR_RULES.validate_string(color, &def.name)
                }
                (FieldKind::Select, FieldValue::Select(choice)) => {
                    if choice.is_empty() || def.options.iter().any(|o| o == choice) {
                        Ok(())
                    } else {
                        Err(format!("{}: значение «{}» не входит в список", def.name, choice))
                    }
                }
                (kind, value) if value.kind() != kind => {
                    Err(format!("{}: ожидается тип {}", def.name, kind))
                }
                _ => Ok(()),
            };
            Some((format!("{}.{}", prefix, def.name), result))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::a025_variation_product::field::FieldDefinition;

    fn named_product() -> ProductDraft {
        ProductDraft {
            name: "Тали".into(),
            ..ProductDraft::default()
        }
    }

    #[test]
    fn test_empty_names_are_reported() {
        let schema = FieldSchema::new();
        let matrix = RowMatrix::new(&schema);
        let issues = validate(&ProductDraft::default(), &schema, &matrix).unwrap_err();
        let locations: Vec<_> = issues.iter().map(|i| i.location.as_str()).collect();
        assert_eq!(locations, vec!["product.name", "sku[0].name"]);
    }

    #[test]
    fn test_color_and_select_values_are_checked() {
        let mut schema = FieldSchema::new();
        let mut matrix = RowMatrix::new(&schema);
        for def in [
            FieldDefinition::new("Tone", FieldKind::Color),
            FieldDefinition::select("Size", ["S", "M"]),
        ] {
            let def = schema.add_field(FieldLevel::Variant, def).unwrap();
            matrix.backfill_field(FieldLevel::Variant, &def);
        }
        matrix.set_variant_field_value(&schema, 0, "name", "Red").unwrap();

        // значения по умолчанию корректны
        assert!(validate(&named_product(), &schema, &matrix).is_ok());

        matrix.set_variant_field_value(&schema, 0, "Tone", "#12345").unwrap();
        matrix.set_variant_field_value(&schema, 0, "Size", "XL").unwrap();
        let issues = validate(&named_product(), &schema, &matrix).unwrap_err();
        let locations: Vec<_> = issues.iter().map(|i| i.location.as_str()).collect();
        assert_eq!(locations, vec!["sku[0].Tone", "sku[0].Size"]);

        matrix.set_variant_field_value(&schema, 0, "Tone", "#ABCDEF").unwrap();
        matrix.set_variant_field_value(&schema, 0, "Size", "M").unwrap();
        assert!(validate(&named_product(), &schema, &matrix).is_ok());
    }

    #[test]
    fn test_combination_fields_are_checked() {
        let mut schema = FieldSchema::new();
        let mut matrix = RowMatrix::new(&schema);
        matrix.set_variant_field_value(&schema, 0, "name", "Red").unwrap();
        matrix.add_combination(0, &schema).unwrap();
        let def = schema
            .add_field(FieldLevel::Combination, FieldDefinition::new("Shade", FieldKind::Color))
            .unwrap();
        matrix.backfill_field(FieldLevel::Combination, &def);
        matrix
            .set_combination_field_value(&schema, 0, 0, "Shade", "blue")
            .unwrap();

        let issues = validate(&named_product(), &schema, &matrix).unwrap_err();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].location, "sku[0].combinations[0].Shade");
    }
}

use super::error::BuilderError;
use super::field::{
    FieldDefinition, FieldLevel, COMBINATION_PRICE, STOCK_QUANTITY, VARIANT_BASE_PRICE,
    VARIANT_NAME, VARIANT_SKU_LABEL,
};
use super::schema::FieldSchema;
use super::value::{coerce, FieldValue, RawValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Значения пользовательских полей строки по имени поля.
/// Порядок вывода задаёт схема, а не эта коллекция.
pub type CustomFields = BTreeMap<String, FieldValue>;

/// Строка, несущая пользовательские поля одного уровня
pub trait FieldBag {
    fn custom_fields(&self) -> &CustomFields;
    fn custom_fields_mut(&mut self) -> &mut CustomFields;
}

/// Вложенная комбинация варианта (например, объём памяти внутри цвета)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombinationRow {
    pub price: f64,
    pub stock_quantity: u32,
    pub custom_fields: CustomFields,
}

impl CombinationRow {
    pub fn new(schema: &FieldSchema) -> Self {
        Self {
            price: 0.0,
            stock_quantity: 0,
            custom_fields: default_custom_fields(schema, FieldLevel::Combination),
        }
    }
}

/// Вариант товара (SKU)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantRow {
    pub name: String,
    pub sku_label: String,
    pub base_price: f64,
    pub stock_quantity: u32,
    pub custom_fields: CustomFields,
    pub combinations: Vec<CombinationRow>,
}

impl VariantRow {
    pub fn new(schema: &FieldSchema) -> Self {
        Self {
            name: String::new(),
            sku_label: String::new(),
            base_price: 0.0,
            stock_quantity: 0,
            custom_fields: default_custom_fields(schema, FieldLevel::Variant),
            combinations: Vec::new(),
        }
    }

    /// Остаток для отображения: сумма по комбинациям, если они есть
    pub fn derived_stock(&self) -> u32 {
        if self.combinations.is_empty() {
            self.stock_quantity
        } else {
            self.combinations
                .iter()
                .fold(0u32, |acc, c| acc.saturating_add(c.stock_quantity))
        }
    }
}

impl FieldBag for VariantRow {
    fn custom_fields(&self) -> &CustomFields {
        &self.custom_fields
    }
    fn custom_fields_mut(&mut self) -> &mut CustomFields {
        &mut self.custom_fields
    }
}

impl FieldBag for CombinationRow {
    fn custom_fields(&self) -> &CustomFields {
        &self.custom_fields
    }
    fn custom_fields_mut(&mut self) -> &mut CustomFields {
        &mut self.custom_fields
    }
}

pub fn default_custom_fields(schema: &FieldSchema, level: FieldLevel) -> CustomFields {
    schema
        .custom_fields(level)
        .map(|f| (f.name.clone(), f.default_value()))
        .collect()
}

/// Дописать новое поле во все строки; существующие значения не трогаются
pub fn backfill<R: FieldBag>(rows: &mut [R], definition: &FieldDefinition) {
    for row in rows {
        row.custom_fields_mut()
            .entry(definition.name.clone())
            .or_insert_with(|| definition.default_value());
    }
}

/// Убрать удалённое поле из всех строк
pub fn strip<R: FieldBag>(rows: &mut [R], name: &str) {
    for row in rows {
        row.custom_fields_mut().remove(name);
    }
}

fn non_negative_price(value: &FieldValue) -> f64 {
    value.as_number().max(0.0)
}

fn stock_from(value: &FieldValue) -> u32 {
    let n = value.as_number();
    if n <= 0.0 {
        0
    } else if n >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        n.trunc() as u32
    }
}

/// Матрица вариантов: всегда содержит хотя бы один вариант
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MatrixRecord")]
pub struct RowMatrix {
    variants: Vec<VariantRow>,
}

#[derive(Deserialize)]
struct MatrixRecord {
    variants: Vec<VariantRow>,
}

impl TryFrom<MatrixRecord> for RowMatrix {
    type Error = BuilderError;

    fn try_from(record: MatrixRecord) -> Result<Self, Self::Error> {
        if record.variants.is_empty() {
            return Err(BuilderError::EmptyMatrix);
        }
        Ok(Self {
            variants: record.variants,
        })
    }
}

impl RowMatrix {
    pub fn new(schema: &FieldSchema) -> Self {
        Self {
            variants: vec![VariantRow::new(schema)],
        }
    }

    pub fn variants(&self) -> &[VariantRow] {
        &self.variants
    }

    pub(crate) fn variants_mut(&mut self) -> &mut [VariantRow] {
        &mut self.variants
    }

    pub fn variant(&self, index: usize) -> Option<&VariantRow> {
        self.variants.get(index)
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    pub(crate) fn variant_mut(&mut self, index: usize) -> Result<&mut VariantRow, BuilderError> {
        self.variants
            .get_mut(index)
            .ok_or(BuilderError::VariantNotFound(index))
    }

    pub(crate) fn combination_mut(
        &mut self,
        variant: usize,
        combination: usize,
    ) -> Result<&mut CombinationRow, BuilderError> {
        self.variant_mut(variant)?
            .combinations
            .get_mut(combination)
            .ok_or(BuilderError::CombinationNotFound {
                variant,
                combination,
            })
    }

    /// Добавить вариант; возвращает его индекс
    pub fn add_variant(&mut self, schema: &FieldSchema) -> usize {
        self.variants.push(VariantRow::new(schema));
        self.variants.len() - 1
    }

    pub fn remove_variant(&mut self, index: usize) -> Result<VariantRow, BuilderError> {
        if index >= self.variants.len() {
            return Err(BuilderError::VariantNotFound(index));
        }
        if self.variants.len() == 1 {
            return Err(BuilderError::LastRowProtected);
        }
        Ok(self.variants.remove(index))
    }

    pub fn add_combination(
        &mut self,
        variant: usize,
        schema: &FieldSchema,
    ) -> Result<usize, BuilderError> {
        let row = self.variant_mut(variant)?;
        row.combinations.push(CombinationRow::new(schema));
        Ok(row.combinations.len() - 1)
    }

    pub fn remove_combination(
        &mut self,
        variant: usize,
        combination: usize,
    ) -> Result<CombinationRow, BuilderError> {
        let row = self.variant_mut(variant)?;
        if combination >= row.combinations.len() {
            return Err(BuilderError::CombinationNotFound {
                variant,
                combination,
            });
        }
        Ok(row.combinations.remove(combination))
    }

    pub fn set_variant_field_value(
        &mut self,
        schema: &FieldSchema,
        variant: usize,
        field: &str,
        raw: impl Into<RawValue>,
    ) -> Result<(), BuilderError> {
        let row = self.variant_mut(variant)?;
        let value = coerce(schema.kind_of(FieldLevel::Variant, field), field, raw.into())?;
        match field {
            VARIANT_NAME => row.name = value.as_text(),
            VARIANT_SKU_LABEL => row.sku_label = value.as_text(),
            VARIANT_BASE_PRICE => row.base_price = non_negative_price(&value),
            STOCK_QUANTITY => row.stock_quantity = stock_from(&value),
            _ => assign_custom(&mut row.custom_fields, FieldLevel::Variant, field, value)?,
        }
        Ok(())
    }

    pub fn set_combination_field_value(
        &mut self,
        schema: &FieldSchema,
        variant: usize,
        combination: usize,
        field: &str,
        raw: impl Into<RawValue>,
    ) -> Result<(), BuilderError> {
        let row = self.combination_mut(variant, combination)?;
        let value = coerce(
            schema.kind_of(FieldLevel::Combination, field),
            field,
            raw.into(),
        )?;
        match field {
            COMBINATION_PRICE => row.price = non_negative_price(&value),
            STOCK_QUANTITY => row.stock_quantity = stock_from(&value),
            _ => assign_custom(
                &mut row.custom_fields,
                FieldLevel::Combination,
                field,
                value,
            )?,
        }
        Ok(())
    }

    pub fn backfill_field(&mut self, level: FieldLevel, definition: &FieldDefinition) {
        match level {
            FieldLevel::Variant => backfill(&mut self.variants, definition),
            FieldLevel::Combination => {
                for row in &mut self.variants {
                    backfill(&mut row.combinations, definition);
                }
            }
        }
    }

    pub fn strip_field(&mut self, level: FieldLevel, name: &str) {
        match level {
            FieldLevel::Variant => strip(&mut self.variants, name),
            FieldLevel::Combination => {
                for row in &mut self.variants {
                    strip(&mut row.combinations, name);
                }
            }
        }
    }
}

fn assign_custom(
    fields: &mut CustomFields,
    level: FieldLevel,
    name: &str,
    value: FieldValue,
) -> Result<(), BuilderError> {
    let slot = fields
        .get_mut(name)
        .ok_or_else(|| BuilderError::UnknownField {
            level,
            name: name.to_string(),
        })?;
    *slot = value;
    Ok(())
}

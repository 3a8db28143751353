use super::editor::ProductDraft;
use super::field::FieldLevel;
use super::matrix::{CustomFields, RowMatrix};
use super::schema::FieldSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const PRODUCT_TYPE_VARIATION: &str = "variation";

/// Ответ загрузки: один элемент на каждый переданный файл, в том же порядке
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedImage {
    pub url: String,
}

/// Ответ на создание товара
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedProduct {
    #[serde(default)]
    pub data: Value,
}

/// Изображение галереи товара
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryImage {
    pub url: String,
    pub is_primary: bool,
}

impl GalleryImage {
    /// Первое изображение становится основным
    pub fn from_urls<I>(urls: I) -> Vec<Self>
    where
        I: IntoIterator<Item = String>,
    {
        urls.into_iter()
            .enumerate()
            .map(|(i, url)| GalleryImage {
                url,
                is_primary: i == 0,
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombinationPayload {
    pub price: f64,
    pub stock_quantity: u32,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkuPayload {
    pub name: String,
    pub sku_label: String,
    pub base_price: f64,
    pub stock_quantity: u32,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
    pub combinations: Vec<CombinationPayload>,
}

/// Тело запроса на создание вариативного товара
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCreatePayload {
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subcategory_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_id: Option<String>,
    pub product_type: String,
    pub is_active: bool,
    pub images: Vec<GalleryImage>,
    pub sku: Vec<SkuPayload>,
}

impl ProductCreatePayload {
    /// Собрать запрос из матрицы с уже подставленными URL изображений
    pub fn assemble(
        product: &ProductDraft,
        images: Vec<GalleryImage>,
        schema: &FieldSchema,
        matrix: &RowMatrix,
    ) -> Self {
        let sku = matrix
            .variants()
            .iter()
            .map(|variant| SkuPayload {
                name: variant.name.trim().to_string(),
                sku_label: variant.sku_label.trim().to_string(),
                base_price: variant.base_price,
                stock_quantity: variant.derived_stock(),
                attributes: attributes(schema, FieldLevel::Variant, &variant.custom_fields),
                combinations: variant
                    .combinations
                    .iter()
                    .map(|c| CombinationPayload {
                        price: c.price,
                        stock_quantity: c.stock_quantity,
                        attributes: attributes(schema, FieldLevel::Combination, &c.custom_fields),
                    })
                    .collect(),
            })
            .collect();

        Self {
            name: product.name.trim().to_string(),
            description: product.description.clone(),
            category_id: non_empty(&product.category_id),
            subcategory_id: non_empty(&product.subcategory_id),
            tax_id: non_empty(&product.tax_id),
            product_type: PRODUCT_TYPE_VARIATION.to_string(),
            is_active: product.is_active,
            images,
            sku,
        }
    }
}

/// Пользовательские поля в порядке схемы
fn attributes(schema: &FieldSchema, level: FieldLevel, fields: &CustomFields) -> Map<String, Value> {
    schema
        .custom_fields(level)
        .filter_map(|def| {
            fields
                .get(&def.name)
                .map(|value| (def.name.clone(), value.to_json()))
        })
        .collect()
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

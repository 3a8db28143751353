use super::value::FieldValue;
use serde::{Deserialize, Serialize};

/// Тип пользовательского поля
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Number,
    Boolean,
    Select,
    Color,
    Image,
}

impl FieldKind {
    pub const ALL: [FieldKind; 6] = [
        FieldKind::Text,
        FieldKind::Number,
        FieldKind::Boolean,
        FieldKind::Select,
        FieldKind::Color,
        FieldKind::Image,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Select => "select",
            Self::Color => "color",
            Self::Image => "image",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "text" => Some(Self::Text),
            "number" => Some(Self::Number),
            "boolean" => Some(Self::Boolean),
            "select" => Some(Self::Select),
            "color" => Some(Self::Color),
            "image" => Some(Self::Image),
            _ => None,
        }
    }

    /// Подпись для выпадающего списка
    pub fn label(&self) -> &'static str {
        match self {
            Self::Text => "Текст",
            Self::Number => "Число",
            Self::Boolean => "Да/Нет",
            Self::Select => "Список",
            Self::Color => "Цвет",
            Self::Image => "Изображение",
        }
    }

    /// Значение, которым заполняется поле в новой или существующей строке
    pub fn default_value(&self) -> FieldValue {
        match self {
            Self::Text => FieldValue::Text(String::new()),
            Self::Number => FieldValue::Number(0.0),
            Self::Boolean => FieldValue::Bool(false),
            Self::Select => FieldValue::Select(String::new()),
            Self::Color => FieldValue::Color(FieldValue::DEFAULT_COLOR.to_string()),
            Self::Image => FieldValue::Images(Vec::new()),
        }
    }
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Уровень схемы: поля варианта (SKU) или поля комбинации внутри варианта
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldLevel {
    Variant,
    Combination,
}

impl FieldLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Variant => "variant",
            Self::Combination => "combination",
        }
    }

    /// Фиксированное имя поля-изображения: одно на уровень, стабильный ключ в матрице
    pub fn image_field_name(&self) -> &'static str {
        match self {
            Self::Variant => "SKUImage",
            Self::Combination => "CombinationImage",
        }
    }

    /// Базовые атрибуты строки, которые не описываются схемой
    pub fn reserved_names(&self) -> &'static [&'static str] {
        match self {
            Self::Variant => &[
                VARIANT_NAME,
                VARIANT_SKU_LABEL,
                VARIANT_BASE_PRICE,
                STOCK_QUANTITY,
                COMBINATIONS,
            ],
            Self::Combination => &[COMBINATION_PRICE, STOCK_QUANTITY],
        }
    }

    pub fn is_reserved(&self, name: &str) -> bool {
        self.reserved_names().contains(&name)
    }
}

impl std::fmt::Display for FieldLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

pub const VARIANT_NAME: &str = "name";
pub const VARIANT_SKU_LABEL: &str = "skuLabel";
pub const VARIANT_BASE_PRICE: &str = "basePrice";
pub const COMBINATION_PRICE: &str = "price";
pub const STOCK_QUANTITY: &str = "stockQuantity";
pub const COMBINATIONS: &str = "combinations";

/// Описание поля схемы
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    pub name: String,
    pub kind: FieldKind,
    /// Только для `FieldKind::Select`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    /// Поле базовой схемы, оператор не может его удалить
    #[serde(default)]
    pub is_default: bool,
}

impl FieldDefinition {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            options: Vec::new(),
            is_default: false,
        }
    }

    pub fn select<I, S>(name: impl Into<String>, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(name, FieldKind::Select).with_options(options)
    }

    /// Поле-изображение; имя назначается схемой по уровню
    pub fn image() -> Self {
        Self::new(String::new(), FieldKind::Image)
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    pub(crate) fn builtin(name: &str, kind: FieldKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            options: Vec::new(),
            is_default: true,
        }
    }

    pub fn default_value(&self) -> FieldValue {
        self.kind.default_value()
    }
}

/// Нормализация вариантов списка: каждое значение делится по запятым,
/// части обрезаются, пустые и повторы отбрасываются.
pub fn parse_options<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for entry in raw {
        for part in entry.as_ref().split(',') {
            let part = part.trim();
            if !part.is_empty() && !out.iter().any(|o| o == part) {
                out.push(part.to_string());
            }
        }
    }
    out
}

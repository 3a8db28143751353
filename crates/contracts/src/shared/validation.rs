//! Validation rules for form fields

use once_cell::sync::Lazy;
use regex::Regex;

/// Цвет в формате `#RRGGBB`
pub const HEX_COLOR_PATTERN: &str = r"^#[0-9A-Fa-f]{6}$";

static HEX_COLOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(HEX_COLOR_PATTERN).unwrap_or_else(|e| panic!("invalid color pattern: {e}"))
});

/// Validation rules for a field
/// Copy trait for efficient passing
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ValidationRules {
    pub required: bool,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub max_length: Option<usize>,
    pub pattern: Option<&'static str>,
    pub custom_error: Option<&'static str>,
}

impl ValidationRules {
    /// Create empty validation rules (all optional, no constraints)
    pub const fn none() -> Self {
        Self {
            required: false,
            min: None,
            max: None,
            max_length: None,
            pattern: None,
            custom_error: None,
        }
    }

    /// Create validation rules for required field
    pub const fn required() -> Self {
        Self {
            required: true,
            ..Self::none()
        }
    }

    pub const fn non_negative() -> Self {
        Self {
            min: Some(0.0),
            ..Self::none()
        }
    }

    pub const fn hex_color() -> Self {
        Self {
            pattern: Some(HEX_COLOR_PATTERN),
            custom_error: Some("цвет должен быть в формате #RRGGBB"),
            ..Self::none()
        }
    }

    pub fn with_max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    /// Validate a string value against the rules
    pub fn validate_string(&self, value: &str, field_label: &str) -> Result<(), String> {
        if self.required && value.trim().is_empty() {
            return Err(format!("{} не может быть пустым", field_label));
        }

        if let Some(max) = self.max_length {
            if value.chars().count() > max {
                return Err(format!(
                    "{} не должен превышать {} символов",
                    field_label, max
                ));
            }
        }

        if let Some(pattern) = self.pattern {
            if !matches_pattern(pattern, value) {
                let reason = self.custom_error.unwrap_or("неверный формат");
                return Err(format!("{}: {}", field_label, reason));
            }
        }

        Ok(())
    }

    /// Validate a numeric value against min/max rules
    pub fn validate_number(&self, value: f64, field_label: &str) -> Result<(), String> {
        if let Some(min) = self.min {
            if value < min {
                return Err(format!("{} должен быть не менее {}", field_label, min));
            }
        }

        if let Some(max) = self.max {
            if value > max {
                return Err(format!("{} должен быть не более {}", field_label, max));
            }
        }

        Ok(())
    }
}

fn matches_pattern(pattern: &str, value: &str) -> bool {
    if pattern == HEX_COLOR_PATTERN {
        return is_hex_color(value);
    }
    match Regex::new(pattern) {
        Ok(re) => re.is_match(value),
        Err(e) => {
            log::warn!("validation: invalid pattern `{}`: {}", pattern, e);
            false
        }
    }
}

pub fn is_hex_color(value: &str) -> bool {
    HEX_COLOR.is_match(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_color() {
        assert!(is_hex_color("#000000"));
        assert!(is_hex_color("#a1B2c3"));
        assert!(!is_hex_color("#abc"));
        assert!(!is_hex_color("000000"));
        assert!(!is_hex_color("#0000000"));
        assert!(!is_hex_color("#gg0000"));
    }

    #[test]
    fn test_required_string() {
        let rules = ValidationRules::required();
        assert!(rules.validate_string("  ", "Наименование").is_err());
        assert!(rules.validate_string("Чай", "Наименование").is_ok());
    }

    #[test]
    fn test_pattern_uses_custom_error() {
        let err = ValidationRules::hex_color()
            .validate_string("red", "Цвет")
            .unwrap_err();
        assert_eq!(err, "Цвет: цвет должен быть в формате #RRGGBB");
    }

    #[test]
    fn test_hex_color_rule_matches_hex_check() {
        let rules = ValidationRules::hex_color();
        for value in ["#000000", "#a1B2c3", "#abc", "000000", "#gg0000", ""] {
            assert_eq!(
                rules.validate_string(value, "Цвет").is_ok(),
                is_hex_color(value),
                "{}",
                value
            );
        }
    }

    #[test]
    fn test_non_negative_number() {
        let rules = ValidationRules::non_negative();
        assert!(rules.validate_number(-0.01, "Цена").is_err());
        assert!(rules.validate_number(0.0, "Цена").is_ok());
    }

    #[test]
    fn test_max_length_counts_chars() {
        let rules = ValidationRules::none().with_max_length(3);
        assert!(rules.validate_string("абв", "Код").is_ok());
        assert!(rules.validate_string("абвг", "Код").is_err());
    }
}

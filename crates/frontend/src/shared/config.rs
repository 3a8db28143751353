use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Config {
    pub api: ApiConfig,
    pub products: ProductsApiConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ApiConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ProductsApiConfig {
    /// Массовая загрузка изображений (multipart)
    pub upload_path: String,
    /// Создание товара (JSON)
    pub create_path: String,
    /// Имя поля формы, под которым передаются файлы
    pub upload_field: String,
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[api]
port = 3000

[products]
upload_path = "/api/upload/images"
create_path = "/api/products"
upload_field = "images"
"#;

/// localStorage key holding an optional TOML override
pub const CONFIG_STORAGE_KEY: &str = "app_config";

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig { port: 3000 },
            products: ProductsApiConfig {
                upload_path: "/api/upload/images".to_string(),
                create_path: "/api/products".to_string(),
                upload_field: "images".to_string(),
            },
        }
    }
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    Ok(toml::from_str(contents)?)
}

/// Load configuration
///
/// Search order:
/// 1. TOML override in localStorage (`app_config`)
/// 2. Falls back to embedded default config
pub fn load_config() -> anyhow::Result<Config> {
    if let Some(contents) = stored_override() {
        log::info!("Loading config from localStorage key `{}`", CONFIG_STORAGE_KEY);
        return parse_config(&contents);
    }

    log::info!("Using default embedded configuration");
    parse_config(DEFAULT_CONFIG)
}

fn stored_override() -> Option<String> {
    let storage = web_sys::window()?.local_storage().ok()??;
    storage
        .get_item(CONFIG_STORAGE_KEY)
        .ok()
        .flatten()
        .filter(|s| !s.trim().is_empty())
}

//! Object URL для локального предпросмотра файла.
//!
//! URL освобождается при удалении значения, поэтому держать его нужно ровно
//! столько, сколько браузеру нужно на отрисовку превью.

use web_sys::{Blob, Url};

#[derive(Debug)]
pub struct PreviewUrl {
    url: String,
}

impl PreviewUrl {
    pub fn new(blob: &Blob) -> Result<Self, String> {
        let url = Url::create_object_url_with_blob(blob)
            .map_err(|e| format!("Failed to create object URL: {:?}", e))?;
        Ok(Self { url })
    }

    pub fn as_str(&self) -> &str {
        &self.url
    }
}

impl Drop for PreviewUrl {
    fn drop(&mut self) {
        if let Err(e) = Url::revoke_object_url(&self.url) {
            log::warn!("Failed to revoke object URL {}: {:?}", self.url, e);
        }
    }
}

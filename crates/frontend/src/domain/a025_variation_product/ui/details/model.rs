use crate::shared::api_utils::api_url;
use crate::shared::config::Config;
use async_trait::async_trait;
use contracts::domain::a025_variation_product::{
    CreatedProduct, ImageUploader, PendingFile, ProductCreatePayload, ProductCreator,
    UploadedImage,
};
use gloo_net::http::Request;
use leptos::prelude::*;
use std::collections::HashMap;
use uuid::Uuid;
use web_sys::{File, FileList, FormData};

/// Выбранные в браузере файлы, ожидающие загрузки.
///
/// Матрица хранит только описатели `PendingFile`; сами `File` лежат здесь по `id`.
#[derive(Default)]
pub struct FileStore {
    files: HashMap<Uuid, File>,
}

impl FileStore {
    /// Запомнить файл и вернуть его описатель
    pub fn register(&mut self, file: File) -> PendingFile {
        let pending = PendingFile::new(
            file.name(),
            file.type_(),
            file.size().max(0.0) as u64,
            file.last_modified() as i64,
        );
        self.files.insert(pending.id, file);
        pending
    }

    pub fn register_list(&mut self, list: &FileList) -> Vec<PendingFile> {
        (0..list.length())
            .filter_map(|i| list.get(i))
            .map(|file| self.register(file))
            .collect()
    }

    pub fn get(&self, id: &Uuid) -> Option<File> {
        self.files.get(id).cloned()
    }

    /// Оставить только файлы, на которые ещё ссылается редактор
    pub fn retain(&mut self, alive: &[Uuid]) {
        self.files.retain(|id, _| alive.contains(id));
    }
}

pub type SharedFileStore = StoredValue<FileStore, LocalStorage>;

/// Загрузка изображений одним multipart-запросом
pub struct HttpImageUploader {
    pub config: Config,
    pub files: SharedFileStore,
}

#[async_trait(?Send)]
impl ImageUploader for HttpImageUploader {
    async fn upload_images(&self, files: &[PendingFile]) -> Result<Vec<UploadedImage>, String> {
        let form = FormData::new().map_err(|e| format!("Failed to create form: {:?}", e))?;
        let field = &self.config.products.upload_field;

        for pending in files {
            let file = self
                .files
                .with_value(|store| store.get(&pending.id))
                .ok_or_else(|| format!("Файл {} больше недоступен", pending.file_name))?;
            form.append_with_blob_and_filename(field, &file, &pending.file_name)
                .map_err(|e| format!("Failed to append file: {:?}", e))?;
        }

        let url = api_url(self.config.api.port, &self.config.products.upload_path);
        let response = Request::post(&url)
            .body(form)
            .map_err(|e| format!("Failed to build request: {}", e))?
            .send()
            .await
            .map_err(|e| format!("Request failed: {}", e))?;

        if !response.ok() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(format!("HTTP {}: {}", status, text));
        }

        let data: Vec<UploadedImage> = response
            .json()
            .await
            .map_err(|e| format!("Failed to parse response: {}", e))?;
        Ok(data)
    }
}

/// Создание товара JSON-запросом
pub struct HttpProductCreator {
    pub config: Config,
}

#[async_trait(?Send)]
impl ProductCreator for HttpProductCreator {
    async fn create_product(
        &self,
        payload: &ProductCreatePayload,
    ) -> Result<CreatedProduct, String> {
        let url = api_url(self.config.api.port, &self.config.products.create_path);
        let response = Request::post(&url)
            .json(payload)
            .map_err(|e| format!("Failed to serialize request: {}", e))?
            .send()
            .await
            .map_err(|e| format!("Request failed: {}", e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| format!("Failed to read response: {}", e))?;

        if !response.ok() {
            // Попытка извлечь детали ошибки из ответа
            #[derive(serde::Deserialize)]
            struct ErrorResponse {
                error: Option<String>,
                message: Option<String>,
            }
            if let Ok(error_data) = serde_json::from_str::<ErrorResponse>(&text) {
                if let Some(msg) = error_data.error.or(error_data.message) {
                    return Err(format!("HTTP {}: {}", status, msg));
                }
            }
            return Err(format!("HTTP {}: {}", status, text));
        }

        serde_json::from_str(&text).map_err(|e| format!("Failed to parse response: {}", e))
    }
}

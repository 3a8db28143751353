//! Отправка вариативного товара.
//!
//! Последовательно загружает ожидающие файлы каждого поля-изображения
//! (варианты, затем комбинации, затем галерея), подставляет полученные URL
//! и отправляет собранный запрос. Работа идёт на копии матрицы: при любой
//! ошибке сессия редактора остаётся без изменений.

use super::editor::VariationEditor;
use super::error::SubmitError;
use super::field::FieldLevel;
use super::payload::{CreatedProduct, GalleryImage, ProductCreatePayload, UploadedImage};
use super::value::{FieldValue, ImageRef, PendingFile};
use async_trait::async_trait;

/// Массовая загрузка изображений. Порядок ответа совпадает с порядком файлов.
#[async_trait(?Send)]
pub trait ImageUploader {
    async fn upload_images(&self, files: &[PendingFile]) -> Result<Vec<UploadedImage>, String>;
}

/// Создание товара на сервере
#[async_trait(?Send)]
pub trait ProductCreator {
    async fn create_product(
        &self,
        payload: &ProductCreatePayload,
    ) -> Result<CreatedProduct, String>;
}

pub async fn submit<U, P>(
    editor: &mut VariationEditor,
    uploader: &U,
    creator: &P,
) -> Result<CreatedProduct, SubmitError>
where
    U: ImageUploader + ?Sized,
    P: ProductCreator + ?Sized,
{
    editor.validate().map_err(SubmitError::Validation)?;

    let variant_fields = editor.schema().image_field_names(FieldLevel::Variant);
    let combination_fields = editor.schema().image_field_names(FieldLevel::Combination);
    let mut matrix = editor.matrix().clone();

    for (vi, variant) in matrix.variants_mut().iter_mut().enumerate() {
        for field in &variant_fields {
            if let Some(FieldValue::Images(list)) = variant.custom_fields.get_mut(field) {
                resolve_images(uploader, list, &format!("sku[{}].{}", vi, field)).await?;
            }
        }
    }

    for (vi, variant) in matrix.variants_mut().iter_mut().enumerate() {
        for (ci, combination) in variant.combinations.iter_mut().enumerate() {
            for field in &combination_fields {
                if let Some(FieldValue::Images(list)) = combination.custom_fields.get_mut(field) {
                    let location = format!("sku[{}].combinations[{}].{}", vi, ci, field);
                    resolve_images(uploader, list, &location).await?;
                }
            }
        }
    }

    let mut gallery = editor.gallery().to_vec();
    resolve_images(uploader, &mut gallery, "gallery").await?;
    let images = GalleryImage::from_urls(
        gallery
            .iter()
            .filter_map(ImageRef::as_url)
            .map(str::to_string),
    );

    let payload =
        ProductCreatePayload::assemble(&editor.product, images, editor.schema(), &matrix);
    log::info!(
        "submit: creating product `{}` with {} sku",
        payload.name,
        payload.sku.len()
    );
    let created = creator
        .create_product(&payload)
        .await
        .map_err(SubmitError::SubmissionFailed)?;

    editor.commit_resolved(matrix, gallery);
    Ok(created)
}

/// Загрузить ожидающие файлы списка и заменить список полученными URL.
/// Список без ожидающих файлов не меняется.
async fn resolve_images<U>(
    uploader: &U,
    list: &mut Vec<ImageRef>,
    location: &str,
) -> Result<(), SubmitError>
where
    U: ImageUploader + ?Sized,
{
    let pending: Vec<PendingFile> = list
        .iter()
        .filter_map(ImageRef::as_pending)
        .cloned()
        .collect();
    if pending.is_empty() {
        return Ok(());
    }

    log::debug!("submit: uploading {} file(s) for {}", pending.len(), location);
    let uploaded = uploader
        .upload_images(&pending)
        .await
        .map_err(|e| SubmitError::UploadFailed(format!("{}: {}", location, e)))?;

    if uploaded.len() != pending.len() {
        log::warn!(
            "submit: {} expected {} url(s), got {}",
            location,
            pending.len(),
            uploaded.len()
        );
        return Err(SubmitError::UploadFailed(format!(
            "{}: expected {} url(s), got {}",
            location,
            pending.len(),
            uploaded.len()
        )));
    }

    *list = uploaded
        .into_iter()
        .map(|image| ImageRef::Uploaded(image.url))
        .collect();
    Ok(())
}

//! ViewModel for the variation product editor (EditDetails MVVM Standard)
//!
//! The whole editing session lives in one `RwSignal<VariationEditor>`;
//! selected browser files live next to it in a local `FileStore`.

use super::model::{FileStore, HttpImageUploader, HttpProductCreator, SharedFileStore};
use crate::shared::config::Config;
use contracts::domain::a025_variation_product::{
    submit, BuilderError, FieldDefinition, FieldKind, FieldLevel, ImageRef, ProductDraft,
    RawValue, RowPath, VariationEditor,
};
use leptos::prelude::*;
use uuid::Uuid;
use web_sys::FileList;

/// Черновик нового поля схемы (форма «Добавить поле»)
#[derive(Clone, Copy)]
pub struct NewFieldForm {
    pub name: RwSignal<String>,
    pub kind: RwSignal<FieldKind>,
    pub options: RwSignal<String>,
}

impl NewFieldForm {
    fn new() -> Self {
        Self {
            name: RwSignal::new(String::new()),
            kind: RwSignal::new(FieldKind::Text),
            options: RwSignal::new(String::new()),
        }
    }

    fn take_definition(&self) -> FieldDefinition {
        let kind = self.kind.get_untracked();
        FieldDefinition::new(self.name.get_untracked(), kind)
            .with_options([self.options.get_untracked()])
    }

    fn reset(&self) {
        self.name.set(String::new());
        self.kind.set(FieldKind::Text);
        self.options.set(String::new());
    }
}

/// ViewModel for the variation product editor
#[derive(Clone, Copy)]
pub struct VariationProductVm {
    pub editor: RwSignal<VariationEditor>,
    pub files: SharedFileStore,
    pub config: StoredValue<Config>,

    pub new_variant_field: NewFieldForm,
    pub new_combination_field: NewFieldForm,

    // === UI State ===
    pub saving: RwSignal<bool>,
    pub error: RwSignal<Option<String>>,
    pub success: RwSignal<Option<String>>,
}

impl VariationProductVm {
    pub fn new(config: Config) -> Self {
        Self {
            editor: RwSignal::new(VariationEditor::new()),
            files: StoredValue::new_local(FileStore::default()),
            config: StoredValue::new(config),
            new_variant_field: NewFieldForm::new(),
            new_combination_field: NewFieldForm::new(),
            saving: RwSignal::new(false),
            error: RwSignal::new(None),
            success: RwSignal::new(None),
        }
    }

    pub fn field_form(&self, level: FieldLevel) -> NewFieldForm {
        match level {
            FieldLevel::Variant => self.new_variant_field,
            FieldLevel::Combination => self.new_combination_field,
        }
    }

    /// Пока идёт отправка, сессия только для чтения: по её завершении
    /// редактор заменяется отправленной копией.
    pub fn is_locked(&self) -> bool {
        self.saving.get_untracked()
    }

    /// Применить изменение к сессии; ошибка показывается оператору
    fn apply<T>(&self, f: impl FnOnce(&mut VariationEditor) -> Result<T, BuilderError>) {
        if self.is_locked() {
            log::debug!("variation editor: change ignored while saving");
            return;
        }
        self.success.set(None);
        let mut result = None;
        self.editor.update(|editor| result = Some(f(editor).map(|_| ())));
        match result {
            Some(Err(e)) => {
                log::debug!("variation editor: {}", e);
                self.error.set(Some(builder_error_message(&e)));
            }
            _ => self.error.set(None),
        }
    }

    // === Схема ===

    pub fn add_field(&self, level: FieldLevel) {
        let form = self.field_form(level);
        let definition = form.take_definition();
        let mut added = false;
        self.apply(|editor| {
            editor.add_field(level, definition)?;
            added = true;
            Ok(())
        });
        if added {
            form.reset();
        }
    }

    pub fn remove_field(&self, level: FieldLevel, name: String) {
        self.apply(|editor| {
            editor.remove_field(level, &name);
            Ok(())
        });
        self.forget_unused_files();
    }

    // === Товар ===

    pub fn update_product(&self, f: impl FnOnce(&mut ProductDraft)) {
        self.apply(|editor| {
            f(&mut editor.product);
            Ok(())
        });
    }

    // === Строки ===

    pub fn add_variant(&self) {
        self.apply(|editor| Ok(editor.add_variant()));
    }

    pub fn remove_variant(&self, index: usize) {
        self.apply(|editor| editor.remove_variant(index));
        self.forget_unused_files();
    }

    pub fn add_combination(&self, variant: usize) {
        self.apply(|editor| editor.add_combination(variant));
    }

    pub fn remove_combination(&self, variant: usize, combination: usize) {
        self.apply(|editor| editor.remove_combination(variant, combination));
        self.forget_unused_files();
    }

    pub fn set_value(&self, path: RowPath, field: String, raw: RawValue) {
        self.apply(|editor| match path {
            RowPath::Variant(v) => editor.set_variant_field_value(v, &field, raw),
            RowPath::Combination(v, c) => editor.set_combination_field_value(v, c, &field, raw),
        });
    }

    // === Вложения ===

    pub fn attach_files(&self, path: RowPath, field: String, list: FileList) {
        if self.is_locked() {
            return;
        }
        let pending = self
            .files
            .try_update_value(|store| store.register_list(&list))
            .unwrap_or_default();
        self.apply(|editor| editor.append_files(path, &field, pending));
        self.forget_unused_files();
    }

    pub fn remove_attachment(&self, path: RowPath, field: String, index: usize) {
        self.apply(|editor| editor.remove_image_at(path, &field, index));
        self.forget_unused_files();
    }

    pub fn attach_gallery(&self, list: FileList) {
        if self.is_locked() {
            return;
        }
        let pending = self
            .files
            .try_update_value(|store| store.register_list(&list))
            .unwrap_or_default();
        self.apply(|editor| Ok(editor.append_gallery_files(pending)));
        self.forget_unused_files();
    }

    pub fn remove_gallery_image(&self, index: usize) {
        self.apply(|editor| editor.remove_gallery_at(index));
        self.forget_unused_files();
    }

    /// Убрать из хранилища файлы, которые удалены или отброшены как дубликаты
    fn forget_unused_files(&self) {
        let alive = self.editor.with_untracked(pending_ids);
        self.files.update_value(|store| store.retain(&alive));
    }

    // === Отправка ===

    pub fn save(&self) {
        if self.saving.get_untracked() {
            return;
        }
        let this = *self;
        this.saving.set(true);
        this.error.set(None);
        this.success.set(None);

        leptos::task::spawn_local(async move {
            let config = this.config.get_value();
            let uploader = HttpImageUploader {
                config: config.clone(),
                files: this.files,
            };
            let creator = HttpProductCreator { config };

            let mut working = this.editor.get_untracked();
            match submit(&mut working, &uploader, &creator).await {
                Ok(_) => {
                    log::info!("variation product `{}` created", working.product.name);
                    this.editor.set(working);
                    this.forget_unused_files();
                    this.success.set(Some("Товар создан".to_string()));
                }
                Err(e) => {
                    log::warn!("variation product submission failed: {}", e);
                    this.error.set(Some(e.to_string()));
                }
            }
            this.saving.set(false);
        });
    }

    /// Начать новый товар
    pub fn reset(&self) {
        if self.is_locked() {
            return;
        }
        self.editor.set(VariationEditor::new());
        self.files.set_value(FileStore::default());
        self.error.set(None);
        self.success.set(None);
    }
}

fn pending_ids(editor: &VariationEditor) -> Vec<Uuid> {
    let from_list = |list: &[ImageRef]| -> Vec<Uuid> {
        list.iter()
            .filter_map(ImageRef::as_pending)
            .map(|p| p.id)
            .collect()
    };
    let mut ids = from_list(editor.gallery());
    for variant in editor.matrix().variants() {
        for value in variant.custom_fields.values() {
            ids.extend(value.images().map(from_list).unwrap_or_default());
        }
        for combination in &variant.combinations {
            for value in combination.custom_fields.values() {
                ids.extend(value.images().map(from_list).unwrap_or_default());
            }
        }
    }
    ids
}

/// Сообщение об ошибке для оператора
pub fn builder_error_message(error: &BuilderError) -> String {
    match error {
        BuilderError::DuplicateFieldName { name, .. } => {
            format!("Поле «{}» уже существует", name)
        }
        BuilderError::MissingOptions { name } => {
            format!("Для списка «{}» укажите значения через запятую", name)
        }
        BuilderError::ImageFieldLimitExceeded { .. } => {
            "Допускается только одно поле-изображение на уровень".to_string()
        }
        BuilderError::EmptyFieldName => "Укажите имя поля".to_string(),
        BuilderError::LastRowProtected => "Нельзя удалить последний вариант".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::shared::config::Config;
    use contracts::domain::a025_variation_product::field::VARIANT_NAME;

    #[test]
    fn test_session_is_read_only_while_saving() {
        let vm = VariationProductVm::new(Config::default());
        vm.set_value(RowPath::Variant(0), VARIANT_NAME.to_string(), "Синий".into());
        let before = vm.editor.get_untracked();

        vm.saving.set(true);
        vm.set_value(RowPath::Variant(0), VARIANT_NAME.to_string(), "Красный".into());
        vm.add_variant();
        vm.update_product(|p| p.name = "Чай".to_string());
        vm.new_variant_field.name.set("Material".to_string());
        vm.add_field(FieldLevel::Variant);
        vm.reset();
        assert_eq!(vm.editor.get_untracked(), before);

        vm.saving.set(false);
        vm.update_product(|p| p.name = "Чай".to_string());
        assert_eq!(vm.editor.get_untracked().product.name, "Чай");
    }

    #[test]
    fn test_remove_field_clears_messages() {
        let vm = VariationProductVm::new(Config::default());
        vm.new_variant_field.name.set("Material".to_string());
        vm.add_field(FieldLevel::Variant);
        vm.error.set(Some("old".to_string()));
        vm.success.set(Some("Товар создан".to_string()));

        vm.remove_field(FieldLevel::Variant, "Material".to_string());
        assert_eq!(vm.error.get_untracked(), None);
        assert_eq!(vm.success.get_untracked(), None);
        assert!(vm
            .editor
            .get_untracked()
            .schema()
            .find(FieldLevel::Variant, "Material")
            .is_none());
    }

    #[test]
    fn test_builder_error_message() {
        let duplicate = BuilderError::DuplicateFieldName {
            level: FieldLevel::Variant,
            name: "Color".to_string(),
        };
        assert_eq!(builder_error_message(&duplicate), "Поле «Color» уже существует");
        assert_eq!(
            builder_error_message(&BuilderError::LastRowProtected),
            "Нельзя удалить последний вариант"
        );
        // остальные ошибки показываются как есть
        let other = BuilderError::AttachmentNotFound(3);
        assert_eq!(builder_error_message(&other), other.to_string());
    }
}

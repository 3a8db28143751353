use super::view_model::VariationProductVm;
use crate::shared::components::ui::{Button, FieldInput};
use crate::shared::config::Config;
use crate::shared::preview_url::PreviewUrl;
use contracts::domain::a025_variation_product::field::{
    COMBINATION_PRICE, STOCK_QUANTITY, VARIANT_BASE_PRICE, VARIANT_NAME, VARIANT_SKU_LABEL,
};
use contracts::domain::a025_variation_product::{
    CombinationRow, CustomFields, FieldDefinition, FieldKind, FieldLevel, FieldValue, ImageRef,
    PendingFile, RawValue, RowPath, VariantRow, VariationEditor,
};
use leptos::prelude::*;
use web_sys::HtmlInputElement;

#[component]
pub fn VariationProductDetails(config: Config) -> impl IntoView {
    let vm = VariationProductVm::new(config);

    let pending = move || vm.editor.with(VariationEditor::pending_count);

    view! {
        <div class="details-container variation-product-details">
            <div class="modal-header">
                <h3 class="modal-title">"Новый вариативный товар"</h3>
                <div class="modal-header-actions">
                    <span class="details-hint">
                        {move || format!("Файлов к загрузке: {}", pending())}
                    </span>
                    <Button
                        variant="secondary"
                        disabled=Signal::derive(move || vm.saving.get())
                        on_click=Callback::new(move |_| vm.reset())
                    >
                        "Очистить"
                    </Button>
                    <Button
                        disabled=Signal::derive(move || vm.saving.get())
                        on_click=Callback::new(move |_| vm.save())
                    >
                        {move || if vm.saving.get() { "Сохранение..." } else { "Сохранить" }}
                    </Button>
                </div>
            </div>

            <div class="modal-body">
                {move || vm.error.get().map(|e| view! {
                    <div class="warning-box warning-box--error">
                        <span class="warning-box__icon">"⚠"</span>
                        <span class="warning-box__text">{e}</span>
                    </div>
                })}
                {move || vm.success.get().map(|msg| view! {
                    <div class="info-box info-box--success">{msg}</div>
                })}

                // во время отправки форма только для чтения
                <fieldset class="details-fieldset" disabled=move || vm.saving.get()>
                    <ProductSection vm=vm />
                    <SchemaPanel vm=vm level=FieldLevel::Variant title="Поля вариантов" />
                    <SchemaPanel vm=vm level=FieldLevel::Combination title="Поля комбинаций" />
                    <VariantMatrix vm=vm />
                    <GallerySection vm=vm />
                </fieldset>
            </div>
        </div>
    }
}

#[component]
fn ProductSection(vm: VariationProductVm) -> impl IntoView {
    let product = move || vm.editor.with(|e| e.product.clone());

    view! {
        <div class="details-section">
            <h4 class="details-section__title">"Товар"</h4>
            <div class="details-grid--3col">
                <div class="form__group" style="grid-column: 1 / -1;">
                    <label class="form__label">"Наименование"</label>
                    <input
                        class="form__input"
                        prop:value=move || product().name
                        on:change=move |ev| {
                            let name = event_target_value(&ev);
                            vm.update_product(|p| p.name = name);
                        }
                    />
                </div>
                <div class="form__group" style="grid-column: 1 / -1;">
                    <label class="form__label">"Описание"</label>
                    <textarea
                        class="form__textarea"
                        prop:value=move || product().description
                        on:change=move |ev| {
                            let description = event_target_value(&ev);
                            vm.update_product(|p| p.description = description);
                        }
                    />
                </div>
                <div class="form__group">
                    <label class="form__label">"Категория (ID)"</label>
                    <input
                        class="form__input"
                        prop:value=move || product().category_id.unwrap_or_default()
                        on:change=move |ev| {
                            let id = non_empty(event_target_value(&ev));
                            vm.update_product(|p| p.category_id = id);
                        }
                    />
                </div>
                <div class="form__group">
                    <label class="form__label">"Подкатегория (ID)"</label>
                    <input
                        class="form__input"
                        prop:value=move || product().subcategory_id.unwrap_or_default()
                        on:change=move |ev| {
                            let id = non_empty(event_target_value(&ev));
                            vm.update_product(|p| p.subcategory_id = id);
                        }
                    />
                </div>
                <div class="form__group">
                    <label class="form__label">"Налог (ID)"</label>
                    <input
                        class="form__input"
                        prop:value=move || product().tax_id.unwrap_or_default()
                        on:change=move |ev| {
                            let id = non_empty(event_target_value(&ev));
                            vm.update_product(|p| p.tax_id = id);
                        }
                    />
                </div>
                <div class="form__checkbox-wrapper">
                    <input
                        type="checkbox"
                        class="form__checkbox"
                        prop:checked=move || product().is_active
                        on:change=move |ev| {
                            let active = event_target_checked(&ev);
                            vm.update_product(|p| p.is_active = active);
                        }
                    />
                    <label class="form__checkbox-label">"Активен"</label>
                </div>
            </div>
        </div>
    }
}

fn non_empty(s: String) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[component]
fn SchemaPanel(vm: VariationProductVm, level: FieldLevel, title: &'static str) -> impl IntoView {
    let form = vm.field_form(level);
    let custom = move || {
        vm.editor
            .with(|e| e.schema().custom_fields(level).cloned().collect::<Vec<_>>())
    };

    view! {
        <div class="details-section">
            <h4 class="details-section__title">{title}</h4>
            <div class="schema-fields">
                {move || custom()
                    .into_iter()
                    .map(|field| {
                        let name = field.name.clone();
                        view! {
                            <span class="badge badge--neutral schema-field">
                                {format!("{} ({})", field.name, field.kind.label())}
                                {(!field.options.is_empty())
                                    .then(|| format!(": {}", field.options.join(", ")))}
                                <Button
                                    variant="ghost"
                                    small=true
                                    title="Удалить поле"
                                    on_click=Callback::new(move |_| vm.remove_field(level, name.clone()))
                                >
                                    "×"
                                </Button>
                            </span>
                        }
                    })
                    .collect_view()}
            </div>
            <div class="schema-add">
                <input
                    class="form__input"
                    placeholder="Имя поля"
                    prop:value=move || form.name.get()
                    disabled=move || form.kind.get() == FieldKind::Image
                    on:input=move |ev| form.name.set(event_target_value(&ev))
                />
                <select
                    class="form__select"
                    on:change=move |ev| {
                        if let Some(kind) = FieldKind::from_str(&event_target_value(&ev)) {
                            form.kind.set(kind);
                        }
                    }
                >
                    {FieldKind::ALL
                        .into_iter()
                        .map(|kind| view! {
                            <option value=kind.as_str() selected=move || form.kind.get() == kind>
                                {kind.label()}
                            </option>
                        })
                        .collect_view()}
                </select>
                <Show when=move || form.kind.get() == FieldKind::Select>
                    <input
                        class="form__input"
                        placeholder="Значения через запятую"
                        prop:value=move || form.options.get()
                        on:input=move |ev| form.options.set(event_target_value(&ev))
                    />
                </Show>
                <Button variant="secondary" on_click=Callback::new(move |_| vm.add_field(level))>
                    "Добавить поле"
                </Button>
            </div>
        </div>
    }
}

#[component]
fn VariantMatrix(vm: VariationProductVm) -> impl IntoView {
    view! {
        <div class="details-section">
            <h4 class="details-section__title">"Варианты"</h4>
            {move || {
                let (variants, variant_fields, combination_fields) = vm.editor.with(|e| {
                    (
                        e.matrix().variants().to_vec(),
                        e.schema().custom_fields(FieldLevel::Variant).cloned().collect::<Vec<_>>(),
                        e.schema().custom_fields(FieldLevel::Combination).cloned().collect::<Vec<_>>(),
                    )
                });
                let single = variants.len() <= 1;
                variants
                    .into_iter()
                    .enumerate()
                    .map(|(index, row)| view! {
                        <VariantCard
                            vm=vm
                            index=index
                            row=row
                            variant_fields=variant_fields.clone()
                            combination_fields=combination_fields.clone()
                            removable=!single
                        />
                    })
                    .collect_view()
            }}
            <Button variant="secondary" on_click=Callback::new(move |_| vm.add_variant())>
                "+ Вариант"
            </Button>
        </div>
    }
}

#[component]
fn VariantCard(
    vm: VariationProductVm,
    index: usize,
    row: VariantRow,
    variant_fields: Vec<FieldDefinition>,
    combination_fields: Vec<FieldDefinition>,
    removable: bool,
) -> impl IntoView {
    let path = RowPath::Variant(index);
    let has_combinations = !row.combinations.is_empty();
    let stock = row.derived_stock();

    let base = [
        (VARIANT_NAME, "Название", FieldKind::Text, FieldValue::Text(row.name.clone())),
        (VARIANT_SKU_LABEL, "Артикул", FieldKind::Text, FieldValue::Text(row.sku_label.clone())),
        (VARIANT_BASE_PRICE, "Цена", FieldKind::Number, FieldValue::Number(row.base_price)),
    ];

    view! {
        <div class="variant-card">
            <div class="variant-card__header">
                <span class="variant-card__title">{format!("Вариант {}", index + 1)}</span>
                <Show when=move || removable>
                    <Button
                        variant="danger"
                        small=true
                        on_click=Callback::new(move |_| vm.remove_variant(index))
                    >
                        "Удалить"
                    </Button>
                </Show>
            </div>
            <div class="details-grid--3col">
                {base
                    .into_iter()
                    .map(|(name, label, kind, value)| {
                        cell(vm, path, label, FieldDefinition::new(name, kind), value, false)
                    })
                    .collect_view()}
                {cell(
                    vm,
                    path,
                    "Остаток",
                    FieldDefinition::new(STOCK_QUANTITY, FieldKind::Number),
                    FieldValue::Number(stock as f64),
                    has_combinations,
                )}
                {custom_cells(vm, path, &variant_fields, &row.custom_fields)}
            </div>

            <div class="combination-table">
                {row
                    .combinations
                    .into_iter()
                    .enumerate()
                    .map(|(ci, combination)| view! {
                        <CombinationLine
                            vm=vm
                            variant=index
                            index=ci
                            row=combination
                            fields=combination_fields.clone()
                        />
                    })
                    .collect_view()}
                <Button
                    variant="ghost"
                    small=true
                    on_click=Callback::new(move |_| vm.add_combination(index))
                >
                    "+ Комбинация"
                </Button>
            </div>
        </div>
    }
}

#[component]
fn CombinationLine(
    vm: VariationProductVm,
    variant: usize,
    index: usize,
    row: CombinationRow,
    fields: Vec<FieldDefinition>,
) -> impl IntoView {
    let path = RowPath::Combination(variant, index);

    view! {
        <div class="combination-row">
            {cell(
                vm,
                path,
                "Цена",
                FieldDefinition::new(COMBINATION_PRICE, FieldKind::Number),
                FieldValue::Number(row.price),
                false,
            )}
            {cell(
                vm,
                path,
                "Остаток",
                FieldDefinition::new(STOCK_QUANTITY, FieldKind::Number),
                FieldValue::Number(row.stock_quantity as f64),
                false,
            )}
            {custom_cells(vm, path, &fields, &row.custom_fields)}
            <Button
                variant="ghost"
                small=true
                title="Удалить комбинацию"
                on_click=Callback::new(move |_| vm.remove_combination(variant, index))
            >
                "×"
            </Button>
        </div>
    }
}

fn custom_cells(
    vm: VariationProductVm,
    path: RowPath,
    fields: &[FieldDefinition],
    values: &CustomFields,
) -> Vec<AnyView> {
    fields
        .iter()
        .map(|field| {
            let value = values
                .get(&field.name)
                .cloned()
                .unwrap_or_else(|| field.default_value());
            match value {
                FieldValue::Images(list) => view! {
                    <div class="form__group">
                        <label class="form__label">{field.name.clone()}</label>
                        <ImageCell vm=vm path=path field=field.name.clone() images=list />
                    </div>
                }
                .into_any(),
                other => {
                    let label = field.name.clone();
                    cell(vm, path, &label, field.clone(), other, false)
                }
            }
        })
        .collect()
}

fn cell(
    vm: VariationProductVm,
    path: RowPath,
    label: &str,
    definition: FieldDefinition,
    value: FieldValue,
    disabled: bool,
) -> AnyView {
    let name = definition.name.clone();
    let on_change = Callback::new(move |raw: RawValue| vm.set_value(path, name.clone(), raw));

    view! {
        <div class="form__group">
            <label class="form__label">{label.to_string()}</label>
            <FieldInput
                definition=definition
                value=Signal::stored(value)
                on_change=on_change
                disabled=disabled
            />
        </div>
    }
    .into_any()
}

#[component]
fn ImageCell(
    vm: VariationProductVm,
    path: RowPath,
    field: String,
    images: Vec<ImageRef>,
) -> impl IntoView {
    let attach_field = field.clone();

    view! {
        <div class="image-cell">
            <ImageStrip
                vm=vm
                images=images
                on_remove=Callback::new(move |i: usize| vm.remove_attachment(path, field.clone(), i))
            />
            <input
                type="file"
                accept="image/*"
                multiple=true
                on:change=move |ev| {
                    let input: HtmlInputElement = event_target(&ev);
                    if let Some(list) = input.files() {
                        vm.attach_files(path, attach_field.clone(), list);
                    }
                    input.set_value("");
                }
            />
        </div>
    }
}

#[component]
fn GallerySection(vm: VariationProductVm) -> impl IntoView {
    view! {
        <div class="details-section">
            <h4 class="details-section__title">"Галерея товара"</h4>
            {move || {
                let images = vm.editor.with(|e| e.gallery().to_vec());
                view! {
                    <ImageStrip
                        vm=vm
                        images=images
                        on_remove=Callback::new(move |i: usize| vm.remove_gallery_image(i))
                    />
                }
            }}
            <input
                type="file"
                accept="image/*"
                multiple=true
                on:change=move |ev| {
                    let input: HtmlInputElement = event_target(&ev);
                    if let Some(list) = input.files() {
                        vm.attach_gallery(list);
                    }
                    input.set_value("");
                }
            />
        </div>
    }
}

#[component]
fn ImageStrip(
    vm: VariationProductVm,
    images: Vec<ImageRef>,
    on_remove: Callback<usize>,
) -> impl IntoView {
    view! {
        <div class="image-strip">
            {images
                .into_iter()
                .enumerate()
                .map(|(i, image)| {
                    let thumb = match image {
                        ImageRef::Uploaded(url) => view! {
                            <img class="image-strip__thumb" src=url />
                        }
                        .into_any(),
                        ImageRef::Pending(file) => view! { <ImagePreview vm=vm file=file /> }
                            .into_any(),
                    };
                    view! {
                        <div class="image-strip__item">
                            {thumb}
                            <Button
                                variant="ghost"
                                small=true
                                title="Убрать"
                                on_click=Callback::new(move |_| on_remove.run(i))
                            >
                                "×"
                            </Button>
                        </div>
                    }
                })
                .collect_view()}
        </div>
    }
}

/// Превью ещё не загруженного файла.
/// Object URL освобождается после загрузки картинки или при удалении компонента.
#[component]
fn ImagePreview(vm: VariationProductVm, file: PendingFile) -> impl IntoView {
    let preview = vm
        .files
        .with_value(|store| store.get(&file.id))
        .and_then(|blob| match PreviewUrl::new(&blob) {
            Ok(url) => Some(url),
            Err(e) => {
                log::warn!("preview for {}: {}", file.file_name, e);
                None
            }
        });
    let src = preview.as_ref().map(|p| p.as_str().to_string());
    let guard = StoredValue::new(preview);
    on_cleanup(move || {
        guard.try_update_value(Option::take);
    });

    view! {
        <img
            class="image-strip__thumb image-strip__thumb--pending"
            src=src
            on:load=move |_| {
                guard.try_update_value(Option::take);
            }
            alt=file.file_name.clone()
            title=format!("{} ({} КБ)", file.file_name, file.size / 1024)
        />
    }
}

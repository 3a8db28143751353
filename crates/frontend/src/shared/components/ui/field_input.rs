use contracts::domain::a025_variation_product::{FieldDefinition, FieldKind, FieldValue, RawValue};
use leptos::prelude::*;

/// Ячейка матрицы вариантов: элемент ввода выбирается по типу поля.
///
/// Изменение отдаётся наружу по `change`, а не по `input`: матрица
/// перерисовывается после каждого изменения и фокус иначе теряется.
/// Поля-изображения здесь не обрабатываются.
#[component]
pub fn FieldInput(
    definition: FieldDefinition,
    /// Current value
    #[prop(into)]
    value: Signal<FieldValue>,
    on_change: Callback<RawValue>,
    #[prop(optional)]
    disabled: bool,
) -> impl IntoView {
    let text = move || value.with(FieldValue::as_text);

    match definition.kind {
        FieldKind::Boolean => view! {
            <input
                type="checkbox"
                class="form__checkbox"
                checked=move || value.with(FieldValue::as_bool)
                disabled=disabled
                on:change=move |ev| on_change.run(RawValue::Flag(event_target_checked(&ev)))
            />
        }
        .into_any(),
        FieldKind::Select => {
            let options = definition.options.clone();
            view! {
                <select
                    class="form__select"
                    disabled=disabled
                    on:change=move |ev| on_change.run(RawValue::Text(event_target_value(&ev)))
                >
                    <option value="" selected=move || text().is_empty()>"не выбрано"</option>
                    {options
                        .into_iter()
                        .map(|option| {
                            let current = option.clone();
                            let value = option.clone();
                            view! {
                                <option value=value selected=move || text() == current>
                                    {option}
                                </option>
                            }
                        })
                        .collect_view()}
                </select>
            }
            .into_any()
        }
        FieldKind::Color => view! {
            <input
                type="color"
                class="form__input form__input--color"
                prop:value=text
                disabled=disabled
                on:change=move |ev| on_change.run(RawValue::Text(event_target_value(&ev)))
            />
        }
        .into_any(),
        FieldKind::Number => view! {
            <input
                type="number"
                class="form__input"
                min="0"
                step="any"
                prop:value=text
                disabled=disabled
                on:change=move |ev| on_change.run(RawValue::Text(event_target_value(&ev)))
            />
        }
        .into_any(),
        FieldKind::Text | FieldKind::Image => view! {
            <input
                type="text"
                class="form__input"
                prop:value=text
                placeholder=definition.name.clone()
                disabled=disabled
                on:change=move |ev| on_change.run(RawValue::Text(event_target_value(&ev)))
            />
        }
        .into_any(),
    }
}

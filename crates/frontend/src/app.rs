use crate::domain::a025_variation_product::ui::details::VariationProductDetails;
use crate::shared::config::{load_config, Config};
use leptos::prelude::*;

#[component]
pub fn App() -> impl IntoView {
    let config = load_config().unwrap_or_else(|e| {
        log::warn!("Invalid config override, using defaults: {}", e);
        Config::default()
    });

    view! {
        <main class="app-main">
            <VariationProductDetails config=config />
        </main>
    }
}

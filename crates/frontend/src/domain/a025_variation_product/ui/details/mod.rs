//! Variation Product Details UI Module
//!
//! MVVM:
//! - model.rs: file store and HTTP adapters (upload, create)
//! - view_model.rs: ViewModel with commands and state management
//! - view.rs: Leptos components (pure UI)

mod model;
mod view;
mod view_model;

pub use view::VariationProductDetails;
pub use view_model::VariationProductVm;

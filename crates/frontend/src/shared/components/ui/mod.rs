pub mod button;
pub mod field_input;

pub use button::Button;
pub use field_input::FieldInput;

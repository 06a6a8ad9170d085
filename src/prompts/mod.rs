pub mod builder;
pub mod templates;

pub use builder::{build_prompt, check_template, extract_fields, placeholders, FieldContext};

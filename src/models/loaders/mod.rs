pub mod toml_loader;
pub mod xlsx_loader;

pub use toml_loader::load_prompt_profile;
pub use xlsx_loader::{load_table, strip_html};

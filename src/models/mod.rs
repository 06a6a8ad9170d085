pub mod fields;
pub mod loaders;
pub mod profile;
pub mod record;

pub use fields::{DerivedField, DerivedFields, OptionLetter, KEY_COLUMN, SOURCE_FIELDS};
pub use loaders::{load_prompt_profile, load_table};
pub use profile::{PromptProfile, PromptTemplates, RecommendationMode};
pub use record::{Record, Table};

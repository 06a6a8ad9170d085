pub mod failure_writer;
pub mod gemini_service;
pub mod llm_service;
pub mod pacing;

pub use failure_writer::FailureWriter;
pub use gemini_service::GeminiService;
pub use llm_service::{GenerationService, LlmService};
pub use pacing::{FixedDelayPacer, NoPacing, Pacer};

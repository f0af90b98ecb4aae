/// Domain layer - core business models and analysis rules
///
/// These modules are platform-agnostic and free of I/O beyond taxonomy loading.
pub mod insight;
pub mod models;
pub mod prompts;
pub mod scoring;
pub mod taxonomy;

pub use prompts::PromptTemplates;
pub use taxonomy::Taxonomy;

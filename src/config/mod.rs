// src/config/mod.rs
pub mod constants;
pub mod query;
pub mod settings;
pub mod test_kind;

// Re-export commonly used types
pub use query::{Query, CorrelationRequest, Side};
pub use settings::Settings;
pub use test_kind::TestKind;

pub mod directory;
pub mod llama_parse;
pub mod r#trait;

pub use directory::{route_for, DocumentLoader, Route};
pub use llama_parse::LlamaParseClient;
pub use r#trait::StructuredParser;

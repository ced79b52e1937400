pub mod chat;
pub mod config;
pub mod constants;
pub mod context;
pub mod embeddings;
pub mod file;
pub mod gui;
pub mod indexer;
pub mod llm;
pub mod loader;
pub mod logging;
pub mod models;
pub mod repl;
pub mod utils;

#[cfg(test)]
pub(crate) mod mock;

pub use chat::{ChatEngine, ContextChatEngine};
pub use context::AppContext;
pub use indexer::VectorIndex;
pub use models::{Document, FileMeta};

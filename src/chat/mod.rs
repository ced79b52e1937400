pub mod engine;
pub mod memory;
pub mod prompt;

pub use engine::{ChatEngine, ContextChatEngine, StreamingResponse};
pub use memory::ChatMemory;

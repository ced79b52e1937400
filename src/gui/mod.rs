//! Browser front-end: an axum server exposing the chat and knowledge-base handlers

pub mod github;
pub mod handlers;
pub mod page;
pub mod routes;

pub use github::GithubClient;
pub use handlers::{ClearedChat, GithubForm, GithubReset, KnowledgeBaseHandlers, UiHandlers, UploadedFile};
pub use routes::{router, run_server};

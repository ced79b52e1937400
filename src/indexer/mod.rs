pub mod builder;
pub mod memory;
pub mod r#trait;

pub use builder::IndexBuilder;
pub use memory::InMemoryVectorIndex;
pub use r#trait::{IndexEntry, VectorIndex};

/// Source tag of documents loaded from the data directory
pub const SOURCE_DATA: &str = "data";

/// Source tag of files uploaded through the GUI
pub const SOURCE_UPLOAD: &str = "upload";

/// Source tag of a GitHub repository branch
pub fn github_source(owner: &str, repo: &str, branch: &str) -> String {
    format!("github:{}/{}@{}", owner, repo, branch)
}

//! Constants shared by the loader, the chat engine and both front-ends

/// Extensions (without the dot) that are sent to the structured parsing
/// service when a LlamaCloud key is configured
pub const STRUCTURED_PARSE_EXTENSIONS: &[&str] = &["pdf", "docx", "xlsx", "csv", "xml", "html", "json"];

/// Instruction text sent as the first system message of every model call
pub const SYSTEM_PROMPT: &str = concat!(
    "\n",
    "You are a helpful AI Assistant that is amazing at summarizing bug reports from json files. \n",
    "Each bug has a blank and a blank. \n",
    "I want you to .........  \n",
    "When you generate your response make sure you talk like a pirate.\n",
);

/// Template wrapped around the retrieved context.
/// `{context_str}` and `{query_str}` are substituted per query.
pub const CONTEXT_PROMPT_TEMPLATE: &str = "Context information is below.\n\
---------------------\n\
{context_str}\n\
---------------------\n\
Given the context information above I want you to think step by step to answer \n\
the query in a crisp manner, incase case you don't know the answer say 'I don't know!'.\n\
Query: {query_str}\n\
Answer: ";

pub const CONTEXT_PLACEHOLDER: &str = "{context_str}";
pub const QUERY_PLACEHOLDER: &str = "{query_str}";

/// Prompt shown by the CLI query loop
pub const QUERY_PROMPT: &str = "Enter your question: ";

/// Input that ends the CLI query loop; compared against the whole line
pub const EXIT_SENTINEL: &str = "e";

/// Width of the dashed separator printed after every answer
pub const SEPARATOR_WIDTH: usize = 60;

/// File types accepted by the upload tab of the GUI
pub const UPLOAD_EXTENSIONS: &[&str] = &[
    "pdf", "xlsx", "py", "txt", "dart", "c", "jsx", "xml", "css", "cpp", "html", "docx", "doc",
    "js", "json", "csv", "md", "text",
];

/// Files kept when a GitHub repository archive is ingested
pub const REPOSITORY_EXTENSIONS: &[&str] = &[
    "txt", "md", "markdown", "json", "xml", "html", "htm", "css", "js", "jsx", "ts", "tsx", "rs",
    "py", "java", "kt", "c", "cpp", "h", "hpp", "go", "rb", "php", "sh", "bash", "dart", "swift",
    "yaml", "yml", "toml", "ini", "cfg", "conf", "csv", "sql",
];

/// Repository files above this size are skipped
pub const MAX_REPOSITORY_FILE_BYTES: u64 = 1024 * 1024;

/// Rough characters-per-token ratio used for budgeting text
pub const CHARS_PER_TOKEN: usize = 4;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_keeps_trailing_spaces() {
        let lines: Vec<&str> = SYSTEM_PROMPT.split('\n').collect();
        assert_eq!(lines[0], "");
        assert!(lines[1].ends_with("json files. "));
        assert_eq!(lines[2], "Each bug has a blank and a blank. ");
        assert_eq!(lines[3], "I want you to .........  ");
        assert_eq!(
            lines[4],
            "When you generate your response make sure you talk like a pirate."
        );
        assert_eq!(lines[5], "");
        assert_eq!(lines.len(), 6);
    }
}

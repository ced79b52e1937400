use crate::constants::{CONTEXT_PLACEHOLDER, QUERY_PLACEHOLDER};
use crate::models::ScoredNode;

/// Render retrieved nodes as the context block of the prompt
pub fn format_context(nodes: &[ScoredNode]) -> String {
    nodes
        .iter()
        .map(|scored| {
            format!(
                "file_path: {}\n\n{}",
                scored.node.meta.path.display(),
                scored.node.text.trim()
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Substitute the context and the query into a template
pub fn fill_template(template: &str, context: &str, query: &str) -> String {
    // Placeholders appearing inside the context are not substituted
    let (before, after) = match template.split_once(CONTEXT_PLACEHOLDER) {
        Some((before, after)) => (before, Some(after)),
        None => (template, None),
    };
    let mut filled = before.replace(QUERY_PLACEHOLDER, query);
    if let Some(after) = after {
        filled.push_str(context);
        filled.push_str(&after.replace(QUERY_PLACEHOLDER, query));
    }
    filled
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::CONTEXT_PROMPT_TEMPLATE;
    use crate::mock::sample_document;
    use crate::models::Node;

    fn scored(path: &str, text: &str, score: f32) -> ScoredNode {
        let doc = sample_document(path, text);
        ScoredNode {
            node: Node {
                id: format!("node_{}", path),
                doc_id: doc.id,
                text: text.to_string(),
                meta: doc.meta,
                page: None,
            },
            score,
        }
    }

    #[test]
    fn test_format_context() {
        let context = format_context(&[
            scored("/data/bugs.json", "crash on save\n", 0.9),
            scored("/data/notes.txt", "slow login", 0.5),
        ]);
        assert_eq!(
            context,
            "file_path: /data/bugs.json\n\ncrash on save\n\nfile_path: /data/notes.txt\n\nslow login"
        );
        assert_eq!(format_context(&[]), "");
    }

    #[test]
    fn test_fill_template() {
        let filled = fill_template(CONTEXT_PROMPT_TEMPLATE, "BUG-1 crash", "What crashes?");
        assert!(filled.starts_with("Context information is below.\n---------------------\nBUG-1 crash\n"));
        assert!(filled.ends_with("Query: What crashes?\nAnswer: "));
        assert!(!filled.contains("{context_str}"));
        assert!(!filled.contains("{query_str}"));
    }

    #[test]
    fn test_fill_template_leaves_placeholders_in_context() {
        let filled = fill_template("{context_str} | {query_str}", "literal {query_str}", "q");
        assert_eq!(filled, "literal {query_str} | q");
    }
}

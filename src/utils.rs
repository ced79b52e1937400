use crate::constants::CHARS_PER_TOKEN;
use crate::models::FileMeta;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Compute Blake3 hash of file contents
pub fn compute_file_hash(file_path: &Path) -> Result<String> {
    let mut file = File::open(file_path)?;
    let mut hasher = blake3::Hasher::new();
    let mut buffer = [0u8; 8192];

    loop {
        let bytes_read = file.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hasher.finalize().to_hex().to_string())
}

/// Get file extension from path (without the dot)
pub fn get_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|s| s.to_lowercase())
}

/// Collect filesystem metadata and content hash for a file
pub fn file_meta(path: &Path) -> Result<FileMeta> {
    let metadata = std::fs::metadata(path)
        .with_context(|| format!("Failed to read metadata: {}", path.display()))?;
    let updated_at = metadata
        .modified()
        .with_context(|| format!("Failed to read modification time: {}", path.display()))?;
    // Not every filesystem records creation time
    let created_at = metadata.created().unwrap_or(updated_at);
    let hash = compute_file_hash(path)
        .with_context(|| format!("Failed to hash file: {}", path.display()))?;

    Ok(FileMeta::new(
        path.to_path_buf(),
        metadata.len(),
        get_extension(path),
        created_at,
        updated_at,
        hash,
    ))
}

/// Stable document id from source path and optional page
pub fn document_id(path: &Path, page: Option<u32>) -> String {
    let key = match page {
        Some(page) => format!("{}#{}", path.display(), page),
        None => path.display().to_string(),
    };
    let hash = blake3::hash(key.as_bytes());
    format!("doc_{}", &hash.to_hex()[..32])
}

/// Id of the `index`-th chunk of a document
pub fn node_id(doc_id: &str, index: usize) -> String {
    let hash = blake3::hash(format!("{}:{}", doc_id, index).as_bytes());
    format!("node_{}", &hash.to_hex()[..32])
}

/// Split text into chunks of roughly `chunk_tokens` tokens with `overlap_tokens`
/// of trailing context repeated at the start of the next chunk.
///
/// Chunks break on whitespace and keep the original line structure. A single
/// word longer than the budget becomes its own chunk.
pub fn chunk_text(text: &str, chunk_tokens: usize, overlap_tokens: usize) -> Vec<String> {
    let pieces: Vec<&str> = text.split_inclusive(char::is_whitespace).collect();
    if text.trim().is_empty() {
        return Vec::new();
    }

    let budget = chunk_tokens.max(1) * CHARS_PER_TOKEN;
    let overlap = overlap_tokens.min(chunk_tokens.saturating_sub(1)) * CHARS_PER_TOKEN;

    let mut chunks = Vec::new();
    let mut start = 0;
    while start < pieces.len() {
        let mut end = start;
        let mut len = 0;
        while end < pieces.len() {
            let add = pieces[end].len();
            if end > start && len + add > budget {
                break;
            }
            len += add;
            end += 1;
        }

        let chunk = pieces[start..end].concat();
        let chunk = chunk.trim();
        if !chunk.is_empty() {
            chunks.push(chunk.to_string());
        }
        if end >= pieces.len() {
            break;
        }

        // Step back over trailing pieces that fit in the overlap
        let mut next = end;
        let mut carried = 0;
        while next > start + 1 {
            let add = pieces[next - 1].len();
            if carried + add > overlap {
                break;
            }
            carried += add;
            next -= 1;
        }
        start = next;
    }

    chunks
}

/// Approximate token count of a text
pub fn estimate_tokens(text: &str) -> usize {
    text.len().div_ceil(CHARS_PER_TOKEN)
}

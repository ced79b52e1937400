use crate::indexer::{IndexEntry, VectorIndex};
use crate::models::ScoredNode;
use anyhow::Result;
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

/// Brute-force cosine-similarity index held in memory
#[derive(Default)]
pub struct InMemoryVectorIndex {
    store: RwLock<Store>,
}

/// Entries in insertion order, plus the position of every node id
#[derive(Default)]
struct Store {
    entries: Vec<IndexEntry>,
    positions: HashMap<String, usize>,
}

impl Store {
    /// Upsert by node id
    fn upsert(&mut self, entry: IndexEntry) {
        match self.positions.get(&entry.node.id) {
            Some(&i) => self.entries[i] = entry,
            None => {
                self.positions.insert(entry.node.id.clone(), self.entries.len());
                self.entries.push(entry);
            }
        }
    }

    /// Keep only entries passing `keep` and reindex positions; returns the number dropped
    fn retain(&mut self, keep: impl Fn(&IndexEntry) -> bool) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| keep(e));
        let removed = before - self.entries.len();
        if removed > 0 {
            self.positions = self
                .entries
                .iter()
                .enumerate()
                .map(|(i, e)| (e.node.id.clone(), i))
                .collect();
        }
        removed
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.positions.clear();
    }

    /// Every embedding in `new_entries` must match the dimension of the entries
    /// that will remain, or of the first new entry when none remain
    fn check_dimensions(
        &self,
        new_entries: &[IndexEntry],
        remains: impl Fn(&IndexEntry) -> bool,
    ) -> Result<()> {
        let expected = self
            .entries
            .iter()
            .find(|e| remains(e))
            .or_else(|| new_entries.first())
            .map(|e| e.embedding.len());

        if let Some(expected) = expected {
            if let Some(bad) = new_entries.iter().find(|e| e.embedding.len() != expected) {
                anyhow::bail!(
                    "Embedding dimension mismatch for node {}: got {}, index uses {}",
                    bad.node.id,
                    bad.embedding.len(),
                    expected
                );
            }
        }
        Ok(())
    }
}

impl InMemoryVectorIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ids of the documents that currently have at least one indexed node
    pub fn document_ids(&self) -> Vec<String> {
        let store = self.store.read().unwrap_or_else(|e| e.into_inner());
        let mut ids: Vec<String> = store.entries.iter().map(|e| e.node.doc_id.clone()).collect();
        ids.sort();
        ids.dedup();
        ids
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Store>> {
        self.store
            .write()
            .map_err(|_| anyhow::anyhow!("vector index lock poisoned"))
    }
}

impl std::fmt::Debug for InMemoryVectorIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryVectorIndex").finish_non_exhaustive()
    }
}

pub(crate) fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[async_trait::async_trait]
impl VectorIndex for InMemoryVectorIndex {
    async fn insert(&self, new_entries: Vec<IndexEntry>) -> Result<()> {
        let mut store = self.write()?;
        store.check_dimensions(&new_entries, |_| true)?;

        for entry in new_entries {
            store.upsert(entry);
        }

        Ok(())
    }

    async fn search(&self, query: &[f32], top_k: usize) -> Result<Vec<ScoredNode>> {
        let store = self
            .store
            .read()
            .map_err(|_| anyhow::anyhow!("vector index lock poisoned"))?;

        let mut scored: Vec<(usize, f32)> = store
            .entries
            .par_iter()
            .enumerate()
            .map(|(i, entry)| (i, cosine_similarity(query, &entry.embedding)))
            .collect();

        // Stable sort keeps insertion order between equal scores
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        Ok(scored
            .into_iter()
            .take(top_k)
            .map(|(i, score)| ScoredNode {
                node: store.entries[i].node.clone(),
                score,
            })
            .collect())
    }

    async fn remove_source(&self, source: &str) -> Result<usize> {
        Ok(self.write()?.retain(|e| e.source != source))
    }

    async fn replace(
        &self,
        doc_ids: &[String],
        sources: &[&str],
        entries: Vec<IndexEntry>,
    ) -> Result<usize> {
        let doc_ids: HashSet<&str> = doc_ids.iter().map(String::as_str).collect();
        let stale = |e: &IndexEntry| {
            doc_ids.contains(e.node.doc_id.as_str()) || sources.contains(&e.source.as_str())
        };

        let mut store = self.write()?;
        store.check_dimensions(&entries, |e| !stale(e))?;

        let removed = store.retain(|e| !stale(e));
        for entry in entries {
            store.upsert(entry);
        }
        Ok(removed)
    }

    async fn clear(&self) -> Result<()> {
        self.write()?.clear();
        Ok(())
    }

    async fn len(&self) -> usize {
        self.store.read().map(|s| s.entries.len()).unwrap_or(0)
    }
}

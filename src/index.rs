//! Durable vector index: build, persist, load, and search.
//!
//! The index is a versioned JSON snapshot of (chunk text, sha256, vector)
//! entries. Persistence is write-whole-replace: the snapshot is written to
//! a sibling temp file and renamed into place, so an interrupted build
//! never leaves a partial index and a failed build leaves any prior index
//! untouched. Loading validates the format version, vector dimensions,
//! and per-entry hashes before use; JSON carries no executable content,
//! so a crafted index can at worst fail validation.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;

use crate::embedding::{cosine_similarity, Embedder};
use crate::error::PipelineError;

/// Bumped whenever the on-disk layout changes; mismatches are rejected.
pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexEntry {
    pub text: String,
    pub hash: String,
    pub vector: Vec<f32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VectorIndex {
    pub format_version: u32,
    pub model: String,
    pub dims: usize,
    pub built_at: i64,
    pub entries: Vec<IndexEntry>,
}

/// A retrieved chunk with its similarity to the query.
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub text: String,
    pub score: f32,
}

impl VectorIndex {
    /// Load and validate the index at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(PipelineError::IndexNotFound(path.to_path_buf()).into());
            }
            Err(e) => return Err(e.into()),
        };

        let index: VectorIndex = serde_json::from_slice(&bytes)
            .map_err(|e| PipelineError::IndexCorrupt(e.to_string()))?;

        index.validate()?;
        Ok(index)
    }

    /// Serialize to `<path>.tmp`, then rename into place.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file_name = path
            .file_name()
            .ok_or_else(|| anyhow::anyhow!("index path has no file name: {}", path.display()))?;
        let tmp = path.with_file_name(format!("{}.tmp", file_name.to_string_lossy()));

        let bytes = serde_json::to_vec(self)?;
        std::fs::write(&tmp, bytes)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.format_version != FORMAT_VERSION {
            return Err(PipelineError::IndexCorrupt(format!(
                "unsupported format version {} (expected {})",
                self.format_version, FORMAT_VERSION
            ))
            .into());
        }

        for (i, entry) in self.entries.iter().enumerate() {
            if entry.vector.len() != self.dims {
                return Err(PipelineError::IndexCorrupt(format!(
                    "entry {} has {} dims, index declares {}",
                    i,
                    entry.vector.len(),
                    self.dims
                ))
                .into());
            }
            if hash_text(&entry.text) != entry.hash {
                return Err(PipelineError::IndexCorrupt(format!(
                    "entry {} text does not match its hash",
                    i
                ))
                .into());
            }
        }

        Ok(())
    }

    /// Return up to `k` chunks ordered most similar first. Ties keep entry
    /// order, so results are deterministic.
    pub fn search(&self, query: &[f32], k: usize) -> Vec<ScoredChunk> {
        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (i, cosine_similarity(query, &entry.vector)))
            .collect();

        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        scored.truncate(k);

        scored
            .into_iter()
            .map(|(i, score)| ScoredChunk {
                text: self.entries[i].text.clone(),
                score,
            })
            .collect()
    }
}

/// Embed all chunks and replace the index at `path`. Returns the number of
/// entries written. Any embedding failure aborts before anything is
/// written to disk.
pub async fn build_index(
    embedder: &dyn Embedder,
    chunks: &[String],
    batch_size: usize,
    path: &Path,
) -> Result<usize> {
    let mut vectors: Vec<Vec<f32>> = Vec::with_capacity(chunks.len());
    for batch in chunks.chunks(batch_size.max(1)) {
        vectors.extend(embedder.embed(batch).await?);
    }

    if vectors.len() != chunks.len() {
        return Err(PipelineError::EmbeddingServiceFailure(format!(
            "embedded {} of {} chunks",
            vectors.len(),
            chunks.len()
        ))
        .into());
    }

    let dims = vectors.first().map(|v| v.len()).unwrap_or(0);
    if vectors.iter().any(|v| v.len() != dims) {
        return Err(PipelineError::EmbeddingServiceFailure(
            "embedding service returned vectors of mixed dimensions".to_string(),
        )
        .into());
    }

    let entries: Vec<IndexEntry> = chunks
        .iter()
        .zip(vectors)
        .map(|(text, vector)| IndexEntry {
            hash: hash_text(text),
            text: text.clone(),
            vector,
        })
        .collect();

    let index = VectorIndex {
        format_version: FORMAT_VERSION,
        model: embedder.model_name().to_string(),
        dims,
        built_at: chrono::Utc::now().timestamp(),
        entries,
    };

    index.save(path)?;
    Ok(index.entries.len())
}

/// Retrieve the top-`k` chunks for a question.
///
/// The index is loaded (and its existence and recorded embedding model
/// checked) before the question is embedded, so asking against a missing
/// or mismatched index never touches the network. Vectors from different
/// models are not comparable, so a model mismatch is an error rather than
/// a silent garbage ranking.
pub async fn retrieve(
    embedder: &dyn Embedder,
    path: &Path,
    question: &str,
    k: usize,
) -> Result<Vec<ScoredChunk>> {
    let index = VectorIndex::load(path)?;

    if index.model != embedder.model_name() {
        anyhow::bail!(
            "index at {} was built with embedding model \"{}\" but \"{}\" is configured; \
             rebuild with `docchat build`",
            path.display(),
            index.model,
            embedder.model_name()
        );
    }

    let vectors = embedder.embed(&[question.to_string()]).await?;
    let query = vectors.into_iter().next().ok_or_else(|| {
        PipelineError::EmbeddingServiceFailure("empty embedding response".to_string())
    })?;

    Ok(index.search(&query, k))
}

pub fn hash_text(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_index() -> VectorIndex {
        let texts = ["alpha", "beta", "gamma"];
        VectorIndex {
            format_version: FORMAT_VERSION,
            model: "test-model".to_string(),
            dims: 2,
            built_at: 0,
            entries: texts
                .iter()
                .enumerate()
                .map(|(i, t)| IndexEntry {
                    text: t.to_string(),
                    hash: hash_text(t),
                    vector: vec![i as f32 + 1.0, 1.0],
                })
                .collect(),
        }
    }

    #[test]
    fn save_load_roundtrip() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("index.json");

        let index = sample_index();
        index.save(&path).unwrap();

        let loaded = VectorIndex::load(&path).unwrap();
        assert_eq!(loaded.model, "test-model");
        assert_eq!(loaded.entries.len(), 3);
        assert_eq!(loaded.entries[0].text, "alpha");
    }

    #[test]
    fn save_replaces_prior_index_and_leaves_no_temp_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("index.json");

        sample_index().save(&path).unwrap();
        let mut second = sample_index();
        second.entries.truncate(1);
        second.save(&path).unwrap();

        let loaded = VectorIndex::load(&path).unwrap();
        assert_eq!(loaded.entries.len(), 1);
        assert!(!tmp.path().join("index.json.tmp").exists());
    }

    #[test]
    fn load_missing_file_is_index_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let err = VectorIndex::load(&tmp.path().join("absent.json")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::IndexNotFound(_))
        ));
    }

    #[test]
    fn load_rejects_invalid_json() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("index.json");
        std::fs::write(&path, "not json at all").unwrap();

        let err = VectorIndex::load(&path).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::IndexCorrupt(_))
        ));
    }

    #[test]
    fn load_rejects_wrong_format_version() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("index.json");

        let mut index = sample_index();
        index.format_version = 99;
        let bytes = serde_json::to_vec(&index).unwrap();
        std::fs::write(&path, bytes).unwrap();

        let err = VectorIndex::load(&path).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::IndexCorrupt(_))
        ));
    }

    #[test]
    fn load_rejects_tampered_entry_text() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("index.json");

        let mut index = sample_index();
        index.entries[1].text = "tampered".to_string();
        let bytes = serde_json::to_vec(&index).unwrap();
        std::fs::write(&path, bytes).unwrap();

        let err = VectorIndex::load(&path).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::IndexCorrupt(_))
        ));
    }

    #[test]
    fn load_rejects_dimension_mismatch() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("index.json");

        let mut index = sample_index();
        index.entries[2].vector = vec![1.0, 2.0, 3.0];
        let bytes = serde_json::to_vec(&index).unwrap();
        std::fs::write(&path, bytes).unwrap();

        let err = VectorIndex::load(&path).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::IndexCorrupt(_))
        ));
    }

    #[test]
    fn search_orders_most_similar_first() {
        let index = sample_index();
        // Query aligned with entry 2's direction (3.0, 1.0).
        let results = index.search(&[3.0, 1.0], 2);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].text, "gamma");
        assert!(results[0].score >= results[1].score);
    }

    #[test]
    fn search_respects_k() {
        let index = sample_index();
        assert_eq!(index.search(&[1.0, 1.0], 1).len(), 1);
        assert_eq!(index.search(&[1.0, 1.0], 10).len(), 3);
    }
}

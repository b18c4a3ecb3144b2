//! The `build` command: documents in, index on disk out.

use anyhow::Result;

use crate::chunk::chunk_text;
use crate::config::Config;
use crate::embedding::GeminiEmbedder;
use crate::extract::{collect_documents, extract_corpus};
use crate::index::build_index;

/// Extract, chunk, embed, and persist the index for the given paths.
///
/// The index file is only replaced once the whole pipeline succeeds; any
/// failure leaves a previously built index intact.
pub async fn run_build(config: &Config, api_key: String, paths: &[std::path::PathBuf]) -> Result<()> {
    let documents = collect_documents(paths)?;
    println!("Extracting text from {} document(s)...", documents.len());

    let corpus = extract_corpus(&documents)?;
    let chunks = chunk_text(
        &corpus,
        config.chunking.chunk_size,
        config.chunking.chunk_overlap,
    );

    if chunks.is_empty() {
        anyhow::bail!("documents contained no extractable text");
    }
    println!("Split into {} chunk(s), embedding...", chunks.len());

    let embedder = GeminiEmbedder::new(&config.embedding, api_key)?;
    let written = build_index(
        &embedder,
        &chunks,
        config.embedding.batch_size,
        &config.index.path,
    )
    .await?;

    println!(
        "Indexed {} chunk(s) to {}",
        written,
        config.index.path.display()
    );
    Ok(())
}

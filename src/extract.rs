//! Document text extraction.
//!
//! Turns uploaded documents into one corpus string. PDF text comes from
//! `pdf-extract`; plain-text files are read as UTF-8. Extraction is
//! all-or-nothing: any unreadable document fails the whole build.

use anyhow::Result;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::PipelineError;

/// File extensions the extractor accepts.
pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["pdf", "txt", "md"];

/// Expand the given paths into a flat list of document files.
///
/// Directories are walked recursively and filtered to supported
/// extensions; explicit file arguments must be supported. The result is
/// sorted by path so upload order is deterministic.
pub fn collect_documents(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut documents = Vec::new();

    for path in paths {
        if path.is_dir() {
            for entry in WalkDir::new(path) {
                let entry = entry.map_err(|e| PipelineError::ExtractionFailure {
                    path: path.clone(),
                    reason: e.to_string(),
                })?;
                if entry.file_type().is_file() && is_supported(entry.path()) {
                    documents.push(entry.path().to_path_buf());
                }
            }
        } else if is_supported(path) {
            documents.push(path.clone());
        } else {
            return Err(PipelineError::ExtractionFailure {
                path: path.clone(),
                reason: "unsupported file type (expected .pdf, .txt, or .md)".to_string(),
            }
            .into());
        }
    }

    documents.sort();

    if documents.is_empty() {
        anyhow::bail!("no supported documents found in the given paths");
    }

    Ok(documents)
}

/// Extract plain text from every document and concatenate in upload order.
pub fn extract_corpus(paths: &[PathBuf]) -> Result<String> {
    let mut corpus = String::new();
    for path in paths {
        corpus.push_str(&extract_file(path)?);
    }
    Ok(corpus)
}

fn extract_file(path: &Path) -> Result<String> {
    match extension(path).as_deref() {
        Some("pdf") => {
            let bytes = std::fs::read(path).map_err(|e| PipelineError::ExtractionFailure {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
            pdf_extract::extract_text_from_mem(&bytes)
                .map_err(|e| {
                    PipelineError::ExtractionFailure {
                        path: path.to_path_buf(),
                        reason: e.to_string(),
                    }
                    .into()
                })
        }
        Some("txt") | Some("md") => {
            std::fs::read_to_string(path).map_err(|e| {
                PipelineError::ExtractionFailure {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                }
                .into()
            })
        }
        _ => Err(PipelineError::ExtractionFailure {
            path: path.to_path_buf(),
            reason: "unsupported file type".to_string(),
        }
        .into()),
    }
}

fn is_supported(path: &Path) -> bool {
    extension(path).map_or(false, |ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
}

fn extension(path: &Path) -> Option<String> {
    path.extension().map(|e| e.to_string_lossy().to_lowercase())
}

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::embedding::Embedder;

/// An immutable unit of retrievable knowledge: one summarized service
/// description plus its origin metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub content: String,
    /// Name of the summary file this document came from.
    pub source: String,
    /// Category label: the name of the file's immediate parent directory.
    pub tag: String,
}

/// A document together with its embedding vector, as persisted on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedDocument {
    #[serde(flatten)]
    pub document: Document,
    pub embedding: Vec<f32>,
}

/// The similarity index: every summarized document with its vector.
/// Built offline by `build_from_dir` and treated as read-only while serving.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SummaryIndex {
    pub documents: Vec<IndexedDocument>,
}

impl SummaryIndex {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read index at {}: {e}", path.display()))?;
        let index: SummaryIndex = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("invalid index at {}: {e}", path.display()))?;
        Ok(index)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string(self)?;
        std::fs::write(path, content)
            .map_err(|e| anyhow::anyhow!("failed to write index to {}: {e}", path.display()))?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// Build an index from a directory tree of plain-text summaries.
///
/// Every `*.txt` file under `dir` becomes one document: `source` is the file
/// name, `tag` is the name of the file's immediate parent directory.
/// Unreadable files are skipped with a warning.
pub async fn build_from_dir(dir: &Path, embedder: &dyn Embedder) -> anyhow::Result<SummaryIndex> {
    let mut files = Vec::new();
    collect_txt_files(dir, &mut files)?;
    files.sort();

    let mut index = SummaryIndex::default();
    for path in files {
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) => {
                warn!(file = %path.display(), "skipping unreadable summary: {e}");
                continue;
            }
        };

        let source = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let tag = path
            .parent()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let embedding = embedder.embed(&content).await?;
        index.documents.push(IndexedDocument {
            document: Document {
                content,
                source,
                tag,
            },
            embedding,
        });
    }

    info!(documents = index.len(), "index built");
    Ok(index)
}

fn collect_txt_files(dir: &Path, out: &mut Vec<PathBuf>) -> anyhow::Result<()> {
    for entry in std::fs::read_dir(dir)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", dir.display()))?
    {
        let path = entry?.path();
        if path.is_dir() {
            collect_txt_files(&path, out)?;
        } else if path.extension().is_some_and(|ext| ext == "txt") {
            out.push(path);
        }
    }
    Ok(())
}

use std::{fmt, sync::Arc};

use tracing::{debug, info, instrument};

use crate::{error::AppError, storage::store::StorageManager};

const CORPUS_EXTENSION: &str = ".txt";

/// Immutable text the pipeline answers questions over.
///
/// Cloning is cheap; every clone shares the same buffer.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Corpus(Arc<str>);

impl Corpus {
    pub fn new(text: impl Into<Arc<str>>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for Corpus {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for Corpus {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl fmt::Debug for Corpus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Corpus").field("bytes", &self.len()).finish()
    }
}

/// Concatenate every `.txt` object below `prefix`, each followed by a newline.
///
/// Objects are read in location order so the corpus is stable across loads.
#[instrument(skip(storage))]
pub async fn load_corpus(
    storage: &StorageManager,
    prefix: Option<&str>,
) -> Result<Corpus, AppError> {
    let mut objects = storage.list(prefix).await?;
    objects.retain(|meta| meta.location.as_ref().ends_with(CORPUS_EXTENSION));
    objects.sort_by(|left, right| left.location.cmp(&right.location));

    let mut merged = String::new();
    for meta in &objects {
        let bytes = storage.get(meta.location.as_ref()).await?;
        debug!(location = %meta.location, bytes = bytes.len(), "loaded corpus document");
        merged.push_str(&String::from_utf8_lossy(&bytes));
        merged.push('\n');
    }

    info!(
        documents = objects.len(),
        corpus_bytes = merged.len(),
        "corpus loaded"
    );

    Ok(Corpus::from(merged))
}

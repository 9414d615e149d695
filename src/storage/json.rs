use std::path::Path;

use serde::{Deserialize, Serialize};
use tokio::fs::File as TokioFile;
use tokio::io::{AsyncWriteExt, BufWriter as TokioBufWriter};
use tracing::{debug, info};

use crate::error::Result;
use crate::models::{Account, BookingRef, FeedbackRecord};

/// Serialized form of a [`super::MemoryStore`], used to seed and persist it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub feedback: Vec<FeedbackRecord>,
    #[serde(default)]
    pub bookings: Vec<BookingRef>,
}

impl Snapshot {
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let snapshot: Snapshot = serde_json::from_slice(&bytes)?;

        info!(
            path = %path.display(),
            accounts = snapshot.accounts.len(),
            feedback = snapshot.feedback.len(),
            bookings = snapshot.bookings.len(),
            "Loaded snapshot"
        );
        Ok(snapshot)
    }

    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let file = TokioFile::create(path).await?;
        let mut writer = TokioBufWriter::new(file);
        let json = serde_json::to_vec_pretty(self)?;
        writer.write_all(&json).await?;
        writer.flush().await?;

        debug!(path = %path.display(), bytes = json.len(), "Wrote snapshot");
        Ok(())
    }
}

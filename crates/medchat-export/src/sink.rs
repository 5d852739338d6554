//! Host seams: where finished documents go and how the user hears about it

use async_trait::async_trait;
use medchat_common::Result;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{error, info};

/// Persists a finished artifact (the host's save/download primitive)
#[async_trait]
pub trait ArtifactSink: Send + Sync {
    /// Store `bytes` under `filename`, returning where it ended up
    async fn save(&self, filename: &str, bytes: &[u8]) -> Result<String>;
}

/// User-visible notices (the host's toast primitive)
pub trait Notifier: Send + Sync {
    fn success(&self, message: &str);
    fn failure(&self, message: &str);
}

/// Writes artifacts into a directory.
///
/// Bytes go to a `.part` sibling first and are renamed into place, so a
/// failed write never leaves a truncated document under the final name.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }
}

#[async_trait]
impl ArtifactSink for DirectorySink {
    async fn save(&self, filename: &str, bytes: &[u8]) -> Result<String> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let target = self.dir.join(filename);
        let partial = self.dir.join(format!("{}.part", filename));
        if let Err(e) = tokio::fs::write(&partial, bytes).await {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(e.into());
        }
        if let Err(e) = tokio::fs::rename(&partial, &target).await {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(e.into());
        }

        Ok(target.display().to_string())
    }
}

/// Keeps artifacts in memory; used by hosts that stream the bytes
/// themselves and by tests
#[derive(Debug, Default)]
pub struct MemorySink {
    saved: Mutex<Vec<(String, Vec<u8>)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything saved so far, in save order
    pub fn saved(&self) -> Vec<(String, Vec<u8>)> {
        match self.saved.lock() {
            Ok(saved) => saved.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[async_trait]
impl ArtifactSink for MemorySink {
    async fn save(&self, filename: &str, bytes: &[u8]) -> Result<String> {
        let mut saved = match self.saved.lock() {
            Ok(saved) => saved,
            Err(poisoned) => poisoned.into_inner(),
        };
        saved.push((filename.to_string(), bytes.to_vec()));
        Ok(filename.to_string())
    }
}

/// Reports notices through the tracing subscriber
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn success(&self, message: &str) {
        info!("{}", message);
    }

    fn failure(&self, message: &str) {
        error!("{}", message);
    }
}

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use log::{debug, info};
use once_cell::sync::OnceCell;
use sha2::{Digest, Sha256};

use crate::folio::config::DiagramConfig;
use crate::folio::error::RenderError;

const HASH_LEN: usize = 16;

/// Where a persisted diagram can be fetched from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiagramArtifact {
    pub hash: String,
    pub light_url: String,
    pub dark_url: String,
}

/// First 16 hex chars of the SHA-256 of a diagram's source.
pub fn short_hash(source: &str) -> String {
    let digest = format!("{:x}", Sha256::digest(source.as_bytes()));
    digest[..HASH_LEN].to_string()
}

/// Diagram output directory for one build session.
///
/// The directory is emptied the first time anything is persisted, and each
/// hash is written at most once. Shared across documents behind an `Arc`.
pub struct DiagramStore {
    output_dir: PathBuf,
    public_path: String,
    cleaned: OnceCell<()>,
    written: Mutex<HashSet<String>>,
}

impl DiagramStore {
    pub fn new(output_dir: impl Into<PathBuf>, public_path: impl Into<String>) -> Self {
        Self {
            output_dir: output_dir.into(),
            public_path: public_path.into().trim_end_matches('/').to_string(),
            cleaned: OnceCell::new(),
            written: Mutex::new(HashSet::new()),
        }
    }

    pub fn from_config(config: &DiagramConfig) -> Self {
        Self::new(&config.output_dir, config.public_path.clone())
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn ensure_clean(&self) -> io::Result<()> {
        self.cleaned.get_or_try_init(|| {
            if self.output_dir.exists() {
                info!("Clearing diagram output {}", self.output_dir.display());
                fs::remove_dir_all(&self.output_dir)?;
            }
            fs::create_dir_all(&self.output_dir)
        })?;
        Ok(())
    }

    fn file_name(hash: &str, variant: &str) -> String {
        format!("mermaid-{hash}-{variant}.svg")
    }

    fn url(&self, file_name: &str) -> String {
        format!("{}/{}", self.public_path, file_name)
    }

    /// Write both variants of a diagram unless this session already has.
    pub fn persist(
        &self,
        source: &str,
        light_svg: &str,
        dark_svg: &str,
    ) -> Result<DiagramArtifact, RenderError> {
        self.ensure_clean()?;

        let hash = short_hash(source);
        let light = Self::file_name(&hash, "light");
        let dark = Self::file_name(&hash, "dark");

        let mut written = self.written.lock().unwrap_or_else(|e| e.into_inner());
        if !written.contains(&hash) {
            fs::write(self.output_dir.join(&light), light_svg)?;
            fs::write(self.output_dir.join(&dark), dark_svg)?;
            debug!("Wrote diagram {hash}");
            written.insert(hash.clone());
        }

        Ok(DiagramArtifact {
            light_url: self.url(&light),
            dark_url: self.url(&dark),
            hash,
        })
    }

    pub fn written_count(&self) -> usize {
        self.written.lock().map(|w| w.len()).unwrap_or_else(|e| e.into_inner().len())
    }
}

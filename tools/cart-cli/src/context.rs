//! CLI execution context.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context as _, Result};
use cart_data::{HttpShopApi, TimeoutConfig};
use cart_storage::{FileStore, SnapshotStorage};
use cart_store::{CartStore, CorruptSnapshotPolicy};

use crate::config::{CliConfig, CONFIG_NAMES};
use crate::output::Output;

/// Execution context for CLI commands.
pub struct Context {
    /// CLI configuration.
    pub config: CliConfig,
    /// File the configuration came from, if any.
    pub config_path: Option<PathBuf>,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
}

impl Context {
    /// Load context from config file.
    pub fn load(config_path: Option<&str>, api_url: Option<String>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let (mut config, config_path) = match config_path {
            Some(path) => {
                let path = PathBuf::from(path);
                (CliConfig::load(&path)?, Some(path))
            }
            // Try to find config in current directory or parent directories
            None => match find_config_file(&cwd) {
                Some(path) => (CliConfig::load(&path)?, Some(path)),
                None => (CliConfig::default(), None),
            },
        };

        if let Some(url) = api_url {
            config.api.base_url = url;
        }

        if let Some(path) = &config_path {
            output.debug(&format!("Using config {}", path.display()));
        }

        Ok(Self {
            config,
            config_path,
            output,
            cwd,
        })
    }

    /// Build the cart store described by the configuration.
    pub fn open_store(&self) -> Result<CartStore> {
        let timeouts = TimeoutConfig::from_total(Duration::from_millis(self.config.api.timeout_ms));
        let api = Arc::new(
            HttpShopApi::with_timeouts(&self.config.api.base_url, timeouts)
                .context("Invalid shop API configuration")?,
        );

        let path = self.resolve_path(&self.config.storage.path);
        let file = match self.config.storage.on_corrupt {
            CorruptSnapshotPolicy::Reset => FileStore::open_or_reset(&path),
            CorruptSnapshotPolicy::Fail => FileStore::open(&path),
        }
        .with_context(|| format!("Failed to open cart storage at {}", path.display()))?;
        tracing::debug!(
            base_url = %self.config.api.base_url,
            path = %path.display(),
            "opening cart store"
        );
        let storage = SnapshotStorage::with_key(Arc::new(file), self.config.storage.key.clone());

        CartStore::builder(storage, api.clone(), api)
            .notifier(Arc::new(self.output.clone()))
            .on_corrupt(self.config.storage.on_corrupt)
            .open()
            .context("Failed to load cart")
    }

    /// Resolve a path relative to the working directory.
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        let path = PathBuf::from(path);
        if path.is_absolute() {
            path
        } else {
            self.cwd.join(path)
        }
    }
}

/// Find a config file in the directory tree.
pub fn find_config_file(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        for name in CONFIG_NAMES {
            let candidate = current.join(name);
            if candidate.is_file() {
                return Some(candidate);
            }
        }

        if !current.pop() {
            return None;
        }
    }
}

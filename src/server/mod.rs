//! Connection handling and request dispatch.

pub mod connection;
pub mod dispatch;
pub mod listener;

use anyhow::Context;

use crate::config::Config;
use crate::storage::Storage;
use crate::templates::TemplateStore;

/// Everything a connection needs, built once at startup and shared
/// read-only between connection tasks.
#[derive(Debug)]
pub struct AppContext {
    pub config: Config,
    pub templates: TemplateStore,
    pub storage: Storage,
}

impl AppContext {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let storage = Storage::new(config.upload_dir(), config.max_files);
        storage.ensure_dir().await.with_context(|| {
            format!(
                "Failed to create upload directory {}",
                storage.dir().display()
            )
        })?;

        if !config.web_root.is_dir() {
            tracing::warn!(web_root = %config.web_root.display(), "Web root does not exist");
        }

        Ok(Self {
            templates: TemplateStore::new(&config.web_root),
            storage,
            config,
        })
    }
}

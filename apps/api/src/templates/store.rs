//! Disk-backed template store with an in-memory cache.
//!
//! The directory is the source of truth at startup; afterwards every write goes to
//! disk first and then to the cache, so a failed write never leaves a cached-only template.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::contract::pipeline::generate_template;
use crate::errors::AppError;
use crate::llm_client::Completion;
use crate::templates::{template_slug, DEFAULT_TEMPLATE};

const TEMPLATE_EXT: &str = "txt";

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("template I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("template '{0}' has no content")]
    Empty(String),
}

impl From<TemplateError> for AppError {
    fn from(e: TemplateError) -> Self {
        match e {
            TemplateError::Empty(name) => {
                AppError::Validation(format!("template '{name}' cannot be empty"))
            }
            other => AppError::Storage(other.to_string()),
        }
    }
}

/// Where the template used for a proposal came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateSource {
    Stored,
    Generated,
}

pub struct TemplateStore {
    dir: PathBuf,
    cache: RwLock<BTreeMap<String, String>>,
}

impl TemplateStore {
    /// Opens (creating if needed) the template directory and loads every `*.txt` file.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, TemplateError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|source| io_error(&dir, source))?;

        let mut cache = BTreeMap::new();
        let mut entries = tokio::fs::read_dir(&dir)
            .await
            .map_err(|source| io_error(&dir, source))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|source| io_error(&dir, source))?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(TEMPLATE_EXT) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            match tokio::fs::read_to_string(&path).await {
                Ok(content) if !content.trim().is_empty() => {
                    debug!("Loaded template '{stem}' from {}", path.display());
                    cache.insert(template_slug(stem), content);
                }
                Ok(_) => warn!("Skipping empty template file {}", path.display()),
                Err(e) => warn!("Skipping unreadable template file {}: {e}", path.display()),
            }
        }

        info!("Loaded {} template(s) from {}", cache.len(), dir.display());
        Ok(Self {
            dir,
            cache: RwLock::new(cache),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Sorted template names.
    pub async fn names(&self) -> Vec<String> {
        self.cache.read().await.keys().cloned().collect()
    }

    pub async fn get(&self, name: &str) -> Option<String> {
        self.cache.read().await.get(&template_slug(name)).cloned()
    }

    /// Persists `content` under the slug of `name` and returns that slug.
    pub async fn save(&self, name: &str, content: &str) -> Result<String, TemplateError> {
        let slug = template_slug(name);
        if content.trim().is_empty() {
            return Err(TemplateError::Empty(slug));
        }

        let path = self.dir.join(format!("{slug}.{TEMPLATE_EXT}"));
        tokio::fs::write(&path, content)
            .await
            .map_err(|source| io_error(&path, source))?;

        self.cache
            .write()
            .await
            .insert(slug.clone(), content.to_string());
        info!("Saved template '{slug}' to {}", path.display());
        Ok(slug)
    }

    /// Generates and stores a `default` template when the store is empty.
    pub async fn ensure_default(&self, llm: &dyn Completion) -> Result<(), AppError> {
        if !self.cache.read().await.is_empty() {
            return Ok(());
        }
        info!("Template store is empty, generating '{DEFAULT_TEMPLATE}' template");
        let template = generate_template(llm, DEFAULT_TEMPLATE).await?;
        self.save(DEFAULT_TEMPLATE, &template).await?;
        Ok(())
    }

    /// Returns the stored template for `contract_type`, generating and persisting
    /// one through the completion service when none exists.
    pub async fn get_or_generate(
        &self,
        contract_type: &str,
        llm: &dyn Completion,
    ) -> Result<(String, TemplateSource), AppError> {
        if let Some(template) = self.get(contract_type).await {
            debug!("Using stored template for '{contract_type}'");
            return Ok((template, TemplateSource::Stored));
        }

        info!("No stored template for '{contract_type}', generating one");
        let template = generate_template(llm, contract_type).await?;
        if let Err(e) = self.save(contract_type, &template).await {
            // The generated text is still usable for this request.
            warn!("Could not persist generated template '{contract_type}': {e}");
        }
        Ok((template, TemplateSource::Generated))
    }
}

fn io_error(path: &Path, source: io::Error) -> TemplateError {
    TemplateError::Io {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::prompts::TEMPLATE_SYSTEM;
    use crate::llm_client::scripted::ScriptedCompletion;

    #[tokio::test]
    async fn test_open_creates_missing_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("nested").join("templates");
        let store = TemplateStore::open(&dir).await.unwrap();
        assert!(dir.is_dir());
        assert!(store.names().await.is_empty());
    }

    #[tokio::test]
    async fn test_open_loads_only_nonempty_txt_files() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("nda.txt"), "NDA between [Party A] and [Party B]").unwrap();
        std::fs::write(tmp.path().join("Lease Agreement.txt"), "Lease of [Premises]").unwrap();
        std::fs::write(tmp.path().join("blank.txt"), "   \n").unwrap();
        std::fs::write(tmp.path().join("notes.md"), "ignore me").unwrap();

        let store = TemplateStore::open(tmp.path()).await.unwrap();
        assert_eq!(store.names().await, vec!["lease_agreement", "nda"]);
        assert_eq!(
            store.get("Lease Agreement").await.as_deref(),
            Some("Lease of [Premises]")
        );
    }

    #[tokio::test]
    async fn test_save_round_trips_through_disk() {
        let tmp = tempfile::tempdir().unwrap();
        let store = TemplateStore::open(tmp.path()).await.unwrap();
        let slug = store
            .save("Service Agreement", "Services by [Provider]")
            .await
            .unwrap();
        assert_eq!(slug, "service_agreement");
        assert!(tmp.path().join("service_agreement.txt").is_file());

        let reopened = TemplateStore::open(tmp.path()).await.unwrap();
        assert_eq!(
            reopened.get("service agreement").await.as_deref(),
            Some("Services by [Provider]")
        );
    }

    #[tokio::test]
    async fn test_save_rejects_blank_content() {
        let tmp = tempfile::tempdir().unwrap();
        let store = TemplateStore::open(tmp.path()).await.unwrap();
        let err = store.save("nda", "  ").await.unwrap_err();
        assert!(matches!(err, TemplateError::Empty(_)));
        assert!(store.names().await.is_empty());
    }

    #[tokio::test]
    async fn test_ensure_default_generates_once() {
        let tmp = tempfile::tempdir().unwrap();
        let store = TemplateStore::open(tmp.path()).await.unwrap();
        let llm = ScriptedCompletion::new().reply(TEMPLATE_SYSTEM, "GENERAL AGREEMENT [Party]");

        store.ensure_default(&llm).await.unwrap();
        store.ensure_default(&llm).await.unwrap();

        assert_eq!(llm.calls().len(), 1);
        assert_eq!(
            store.get(DEFAULT_TEMPLATE).await.as_deref(),
            Some("GENERAL AGREEMENT [Party]")
        );
        assert!(tmp.path().join("default.txt").is_file());
    }

    #[tokio::test]
    async fn test_get_or_generate_prefers_stored_template() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("nda.txt"), "Stored NDA [Party]").unwrap();
        let store = TemplateStore::open(tmp.path()).await.unwrap();
        let llm = ScriptedCompletion::new();

        let (template, source) = store.get_or_generate("NDA", &llm).await.unwrap();
        assert_eq!(template, "Stored NDA [Party]");
        assert_eq!(source, TemplateSource::Stored);
        assert!(llm.calls().is_empty());
    }

    #[tokio::test]
    async fn test_get_or_generate_persists_new_template() {
        let tmp = tempfile::tempdir().unwrap();
        let store = TemplateStore::open(tmp.path()).await.unwrap();
        let llm = ScriptedCompletion::new().reply(TEMPLATE_SYSTEM, "```\nLICENSE [Licensor]\n```");

        let (template, source) = store
            .get_or_generate("software license agreement", &llm)
            .await
            .unwrap();
        assert_eq!(template, "LICENSE [Licensor]");
        assert_eq!(source, TemplateSource::Generated);
        assert!(tmp.path().join("software_license_agreement.txt").is_file());

        let (_, second) = store
            .get_or_generate("software license agreement", &llm)
            .await
            .unwrap();
        assert_eq!(second, TemplateSource::Stored);
        assert_eq!(llm.calls().len(), 1);
    }
}

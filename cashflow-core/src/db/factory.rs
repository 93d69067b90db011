//! Choosing and opening the application store.
//!
//! The CLI names a backend and a connection string; [`DbConfig::location`]
//! decides what the string means, so every backend agrees on what `:memory:`
//! or a bare path refers to.

use std::path::Path;

use async_trait::async_trait;
use tracing::{debug, info};

use super::repository::{ApplicationRepository, RepositoryError};

/// Connection string that selects a throwaway in-memory store.
pub const IN_MEMORY: &str = ":memory:";

/// Where a backend should keep applications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageLocation<'a> {
    /// Gone when the process exits.
    Memory,
    /// A URL in the backend's own scheme, used as is.
    Url(&'a str),
    /// A database file, created on first use.
    File(&'a Path),
}

/// Storage settings as resolved from flags and `cashflow.toml`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    /// Name of a registered backend, matched case-insensitively.
    pub backend: String,
    /// `:memory:`, a file path, or a URL starting with `<backend>:`.
    pub connection_string: String,
}

impl DbConfig {
    pub fn in_memory(backend: &str) -> Self {
        Self {
            backend: backend.to_string(),
            connection_string: IN_MEMORY.to_string(),
        }
    }

    pub fn file(
        backend: &str,
        path: impl AsRef<Path>,
    ) -> Self {
        Self {
            backend: backend.to_string(),
            connection_string: path.as_ref().display().to_string(),
        }
    }

    /// Interpret the connection string. An empty string means memory.
    pub fn location(&self) -> StorageLocation<'_> {
        let trimmed = self.connection_string.trim();
        if trimmed.is_empty() || trimmed == IN_MEMORY {
            return StorageLocation::Memory;
        }

        let scheme = self.backend.trim();
        let has_scheme = trimmed
            .get(..scheme.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
            && trimmed[scheme.len()..].starts_with(':');
        if !scheme.is_empty() && has_scheme {
            StorageLocation::Url(trimmed)
        } else {
            StorageLocation::File(Path::new(trimmed))
        }
    }

    /// Whether saved applications survive the process.
    pub fn is_persistent(&self) -> bool {
        self.location() != StorageLocation::Memory
    }
}

impl Default for DbConfig {
    fn default() -> Self {
        Self::in_memory("sqlite")
    }
}

/// A storage backend. Each backend crate exports one of these.
#[async_trait]
pub trait RepositoryFactory: Send + Sync {
    /// Lowercase name used in `--backend` and `[database] backend`.
    fn backend_name(&self) -> &'static str;

    /// Open the store at `location` with its schema ready for use.
    async fn open(
        &self,
        location: StorageLocation<'_>,
    ) -> Result<Box<dyn ApplicationRepository>, RepositoryError>;
}

/// The backends compiled into a binary, in registration order.
#[derive(Default)]
pub struct RepositoryRegistry {
    factories: Vec<Box<dyn RepositoryFactory>>,
}

impl RepositoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a backend. A later factory with the same name takes the earlier
    /// one's place.
    pub fn register(
        &mut self,
        factory: Box<dyn RepositoryFactory>,
    ) {
        let name = factory.backend_name();
        match self.position(name) {
            Some(idx) => {
                debug!(backend = name, "replacing registered storage backend");
                self.factories[idx] = factory;
            }
            None => self.factories.push(factory),
        }
    }

    pub fn backend_names(&self) -> Vec<&'static str> {
        self.factories.iter().map(|f| f.backend_name()).collect()
    }

    /// Open the store `config` describes.
    ///
    /// # Errors
    ///
    /// [`RepositoryError::Configuration`] when no backend has the requested
    /// name; otherwise whatever the backend reports.
    pub async fn open(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn ApplicationRepository>, RepositoryError> {
        let idx = self.position(&config.backend).ok_or_else(|| {
            RepositoryError::Configuration(format!(
                "unknown storage backend '{}' (available: {})",
                config.backend.trim(),
                self.backend_names().join(", ")
            ))
        })?;
        let factory = &self.factories[idx];

        let location = config.location();
        info!(
            backend = factory.backend_name(),
            location = ?location,
            persistent = config.is_persistent(),
            "opening application store"
        );
        factory.open(location).await
    }

    fn position(
        &self,
        name: &str,
    ) -> Option<usize> {
        let name = name.trim();
        self.factories
            .iter()
            .position(|f| f.backend_name().eq_ignore_ascii_case(name))
    }
}

use async_trait::async_trait;
use tracing::info;

use cashflow_core::db::repository::{ApplicationRepository, RepositoryError};
use cashflow_core::db::{RepositoryFactory, StorageLocation};

use crate::repository::SqliteRepository;

/// sqlx URL for a storage location. Files are opened read-write and
/// created if missing.
fn database_url(location: StorageLocation<'_>) -> String {
    match location {
        StorageLocation::Memory => "sqlite::memory:".to_string(),
        StorageLocation::Url(url) => url.to_string(),
        StorageLocation::File(path) => format!("sqlite:{}?mode=rwc", path.display()),
    }
}

/// [`RepositoryFactory`] for SQLite.
///
/// Register this with a [`cashflow_core::db::RepositoryRegistry`] to make the
/// `"sqlite"` backend available:
///
/// ```rust,no_run
/// use cashflow_core::db::RepositoryRegistry;
/// use cashflow_db_sqlite::SqliteRepositoryFactory;
///
/// let mut registry = RepositoryRegistry::new();
/// registry.register(Box::new(SqliteRepositoryFactory));
/// ```
pub struct SqliteRepositoryFactory;

#[async_trait]
impl RepositoryFactory for SqliteRepositoryFactory {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    /// Connect and bring the schema up to date.
    async fn open(
        &self,
        location: StorageLocation<'_>,
    ) -> Result<Box<dyn ApplicationRepository>, RepositoryError> {
        let url = database_url(location);
        info!(url = %url, "opening sqlite database");

        let repo = SqliteRepository::new(&url).await?;
        repo.run_migrations().await?;
        Ok(Box::new(repo))
    }
}

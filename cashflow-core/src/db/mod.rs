pub mod factory;
pub mod repository;

pub use factory::{DbConfig, IN_MEMORY, RepositoryFactory, RepositoryRegistry, StorageLocation};
pub use repository::{ApplicationRepository, RepositoryError};

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{
    ApplicationListing, ApplicationStatus, LoanApplication, NewLoanApplication,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Record not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A stored JSON blob could not be read or written.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The application's inputs could not be analyzed, so no snapshot can be
    /// written for it.
    #[error("Invalid application: {0}")]
    InvalidApplication(String),
}

/// Persistence for loan applications.
///
/// Implementations store the raw inputs together with a freshly computed
/// snapshot on every write, and rebuild records from the raw inputs on every
/// read.
#[async_trait]
pub trait ApplicationRepository: Send + Sync {
    async fn create_application(
        &self,
        application: NewLoanApplication,
    ) -> Result<LoanApplication, RepositoryError>;

    async fn get_application(&self, id: i64) -> Result<LoanApplication, RepositoryError>;

    async fn update_application(
        &self,
        application: &LoanApplication,
    ) -> Result<(), RepositoryError>;

    async fn delete_application(&self, id: i64) -> Result<(), RepositoryError>;

    async fn list_applications(
        &self,
        status: Option<ApplicationStatus>,
    ) -> Result<Vec<ApplicationListing>, RepositoryError>;
}

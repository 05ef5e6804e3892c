//! Fintrack Core - personal finance tracking with per-user isolation
//!
//! This crate follows a hexagonal layout:
//!
//! - **domain**: entities (User, Category, Transaction, Savings) and reports
//! - **ports**: the `Repository` trait the services depend on
//! - **services**: credentials, tokens, identity, ownership guard, reports
//! - **adapters**: the DuckDB repository

pub mod domain;
pub mod ports;
pub mod services;
pub mod adapters;
pub mod config;
pub mod migrations;
pub mod log_migrations;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use adapters::duckdb::DuckDbRepository;
use config::Config;
use services::*;

pub use domain::{
    AccessToken, Category, MonthlyReport, NewUser, Savings, SavingsInput, SavingsTotal,
    SavingsUpdate, Transaction, TransactionInput, TransactionType, User, UserView,
};
pub use domain::result::{Error, OperationResult};
pub use services::{EntryPoint, LogEvent, LoggingService};

/// Database file inside the data directory
pub const DB_FILENAME: &str = "fintrack.duckdb";

/// Main context for Fintrack operations
///
/// Holds the repository and every service wired to it.
pub struct FintrackContext {
    pub repository: Arc<DuckDbRepository>,
    pub identity: Arc<IdentityResolver>,
    pub auth_service: AuthService,
    pub category_service: CategoryService,
    pub transaction_service: TransactionService,
    pub savings_service: SavingsService,
    pub report_service: ReportService,
}

impl FintrackContext {
    /// Open the data directory, creating the database and settings on first use
    pub fn new(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)?;
        let config = Config::load(dir)?;

        let repository = Arc::new(DuckDbRepository::new(&dir.join(DB_FILENAME))?);
        repository.ensure_schema()?;

        Ok(Self::assemble(
            config.token_settings()?,
            repository,
            CredentialStore::default(),
        )?)
    }

    /// Wire services around an already opened repository
    pub fn assemble(
        token_settings: TokenSettings,
        repository: Arc<DuckDbRepository>,
        credentials: CredentialStore,
    ) -> domain::result::Result<Self> {
        let tokens = Arc::new(TokenService::new(token_settings)?);
        let port: Arc<dyn ports::Repository> = repository.clone();
        let identity = Arc::new(IdentityResolver::new(Arc::clone(&port), Arc::clone(&tokens)));

        Ok(Self {
            auth_service: AuthService::new(
                Arc::clone(&port),
                Arc::new(credentials),
                tokens,
                Arc::clone(&identity),
            ),
            category_service: CategoryService::new(Arc::clone(&port)),
            transaction_service: TransactionService::new(Arc::clone(&port)),
            savings_service: SavingsService::new(Arc::clone(&port)),
            report_service: ReportService::new(port),
            identity,
            repository,
        })
    }
}

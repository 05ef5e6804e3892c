//! Service layer - business logic orchestration
//!
//! Services coordinate domain logic and port interactions. Record-scoped
//! operations all pass through [`ensure_owner`] before touching a record.

mod auth;
mod category;
mod credentials;
mod identity;
pub mod logging;
pub mod migration;
mod ownership;
mod report;
mod savings;
mod token;
mod transaction;

pub use auth::AuthService;
pub use category::CategoryService;
pub use credentials::{CredentialStore, HashCost};
pub use identity::IdentityResolver;
pub use logging::{EntryPoint, LogEntry, LogEvent, LoggingService};
pub use migration::{MigrationResult, MigrationService};
pub use ownership::ensure_owner;
pub use report::{render_html, ReportService};
pub use savings::SavingsService;
pub use token::{parse_bearer, TokenService, TokenSettings, DEFAULT_TOKEN_TTL_MINUTES};
pub use transaction::TransactionService;

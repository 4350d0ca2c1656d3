//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod in_memory_membership_directory;
mod in_memory_settings_repository;
mod postgres_membership_directory;
mod postgres_settings_repository;

pub use in_memory_membership_directory::InMemoryMembershipDirectory;
pub use in_memory_settings_repository::InMemorySettingsRepository;
pub use postgres_membership_directory::PostgresMembershipDirectory;
pub use postgres_settings_repository::PostgresSettingsRepository;

/// Embedded SQL migrations for the directory and settings tables.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

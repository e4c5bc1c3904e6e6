//! Keystone DNS domain layer.

pub mod config;
pub mod errors;
pub mod question;
pub mod record_type;
pub mod store_entry;

pub use config::{CliOverrides, Config, ConfigError, DnsConfig, StaticRecord};
pub use errors::DomainError;
pub use question::{canonical_name, Question};
pub use record_type::RecordType;
pub use store_entry::{StoredEntry, StoredValue};

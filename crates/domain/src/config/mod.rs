mod dns;
mod errors;
mod logging;
mod root;
mod server;
mod store;

pub use dns::DnsConfig;
pub use errors::ConfigError;
pub use logging::LoggingConfig;
pub use root::{CliOverrides, Config};
pub use server::ServerConfig;
pub use store::{StaticRecord, StoreConfig};

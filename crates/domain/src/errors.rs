use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum DomainError {
    #[error("Invalid domain name: {0}")]
    InvalidDomainName(String),

    #[error("Record not found")]
    RecordNotFound,

    #[error("Record store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Invalid DNS message: {0}")]
    InvalidDnsMessage(String),

    #[error("Query timeout")]
    QueryTimeout,

    #[error("Transport timeout contacting {server}")]
    TransportTimeout { server: String },

    #[error("Transport error contacting {server}: {detail}")]
    TransportError { server: String, detail: String },

    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

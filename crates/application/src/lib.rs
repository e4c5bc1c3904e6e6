//! Keystone DNS application layer: ports and the per-question use case.

pub mod ports;
pub mod use_cases;

pub use ports::{DnsResolver, PartialAnswers, RecordStore, Resolution};
pub use use_cases::HandleQuestionUseCase;

pub mod answers;
pub mod authority;
pub mod cache;
pub mod forwarding;
pub mod resolver;
pub mod server;
pub(crate) mod wire;

pub use authority::AuthorityOracle;
pub use cache::{AnswerCache, CacheKey, CacheMaintenance};
pub use forwarding::{Forwarder, ForwarderClient};
pub use resolver::{CachedResolver, CoreResolver};
pub use server::DnsServer;

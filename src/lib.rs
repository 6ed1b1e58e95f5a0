pub mod config;
pub mod error;
pub mod logging;
pub mod proxy;
pub mod tools;

pub use config::ProxyConfig;
pub use error::{ProxyError, ProxyResult};
pub use proxy::StdioProxy;
pub use proxy::protocol::{ErrorCodes, RequestId, ResponseError};
pub use tools::GithubTools;

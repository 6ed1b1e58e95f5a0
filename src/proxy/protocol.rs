//! JSON-RPC protocol pieces for subprocess communication.
//!
//! ## Module Structure
//!
//! - `request_id` - RequestId type for type-safe correlation id handling
//! - `frame` - Newline-delimited JSON encoding and decoding
//! - `lifecycle` - Handshake payload and success test
//! - `error_types` - Synthetic error responses

mod error_types;
mod frame;
mod lifecycle;
mod request_id;

pub use error_types::{ErrorCodes, ResponseError};
pub(crate) use frame::{InboundFrame, JsonRpcRequest, line_from_bytes};
pub use frame::JSONRPC_VERSION;
pub(crate) use lifecycle::{advertised_tool_count, build_initialize_params, handshake_succeeded};
pub use lifecycle::{DEFAULT_PROTOCOL_VERSION, HANDSHAKE_METHOD};
pub use request_id::RequestId;

//! Newline-delimited JSON framing.
//!
//! One JSON value per line, terminated by `\n`. The wrapped server does not
//! understand `Content-Length` headers, so line framing is the only framing
//! this crate speaks.
//!
//! ```text
//! {"jsonrpc":"2.0","id":1,"method":"tools/list","params":{}}\n
//! ```

use serde::Serialize;
use serde_json::Value;

use super::RequestId;

/// JSON-RPC protocol version written on every request.
pub const JSONRPC_VERSION: &str = "2.0";

/// Outgoing request envelope.
///
/// A struct rather than `json!` so the encoded field order is fixed:
/// `jsonrpc`, `id`, `method`, `params`.
#[derive(Debug, Serialize)]
pub(crate) struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    id: RequestId,
    method: &'a str,
    params: &'a Value,
}

impl<'a> JsonRpcRequest<'a> {
    pub(crate) fn new(id: RequestId, method: &'a str, params: &'a Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            method,
            params,
        }
    }

    /// Encode as one compact line, terminator included.
    pub(crate) fn to_frame(&self) -> serde_json::Result<Vec<u8>> {
        let mut frame = serde_json::to_vec(self)?;
        frame.push(b'\n');
        Ok(frame)
    }
}

/// One decoded line of subprocess output.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum InboundFrame {
    /// Empty or whitespace-only line; carries nothing.
    Blank,
    /// A line that parsed as JSON.
    Message(Value),
    /// A line that did not parse; kept verbatim for diagnostics only.
    Unparsed(String),
}

impl InboundFrame {
    /// Decode a line that has already had its terminator removed.
    pub(crate) fn decode(line: &str) -> Self {
        if line.trim().is_empty() {
            return InboundFrame::Blank;
        }
        match serde_json::from_str(line) {
            Ok(value) => InboundFrame::Message(value),
            Err(_) => InboundFrame::Unparsed(line.to_string()),
        }
    }

    /// The correlation id this frame could be delivered to, if any.
    pub(crate) fn request_id(&self) -> Option<RequestId> {
        match self {
            InboundFrame::Message(value) => RequestId::from_json(value),
            InboundFrame::Blank | InboundFrame::Unparsed(_) => None,
        }
    }
}

/// Turn raw bytes read up to (and including) `\n` into a line of text.
///
/// Invalid UTF-8 is replaced rather than rejected; trailing `\r` and `\n`
/// are stripped.
pub(crate) fn line_from_bytes(raw: &[u8]) -> String {
    let text = String::from_utf8_lossy(raw);
    text.trim_end_matches(['\r', '\n']).to_string()
}

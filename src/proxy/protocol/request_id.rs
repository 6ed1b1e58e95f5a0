//! JSON-RPC correlation id type for subprocess communication.
//!
//! This module provides a type-safe wrapper for request IDs, preventing
//! confusion with other integer types and enabling compile-time guarantees.

use serde::Serialize;

/// JSON-RPC correlation id.
///
/// Wraps `i64` so ids cannot be mixed up with other integers (line counts,
/// timeouts) and so the pending table has a dedicated key type.
///
/// # Wire Format
///
/// JSON-RPC allows ids to be numbers or strings. The proxy generates every id
/// itself, so only integral numbers are ever matched. A response whose id is a
/// string, a float or `null` is not routable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RequestId(i64);

impl RequestId {
    /// Create a new RequestId from an i64 value.
    #[inline]
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the underlying i64 value.
    #[inline]
    pub fn as_i64(self) -> i64 {
        self.0
    }

    /// Extract RequestId from a decoded message.
    ///
    /// Returns `Some(RequestId)` only if the message is an object with an
    /// integral numeric "id" field.
    pub fn from_json(message: &serde_json::Value) -> Option<Self> {
        message.get("id")?.as_i64().map(Self)
    }
}

impl From<i64> for RequestId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<RequestId> for i64 {
    fn from(id: RequestId) -> Self {
        id.0
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn request_id_round_trips_through_i64() {
        let id: RequestId = 123.into();
        let value: i64 = id.into();
        assert_eq!(value, 123);
        assert_eq!(RequestId::new(7).as_i64(), 7);
    }

    #[test]
    fn request_id_orders_numerically() {
        assert!(RequestId::new(1) < RequestId::new(2));
        assert!(RequestId::new(10) > RequestId::new(9));
    }

    #[test]
    fn request_id_serializes_as_bare_number() {
        let encoded = serde_json::to_string(&RequestId::new(42)).unwrap();
        assert_eq!(encoded, "42");
    }

    #[test]
    fn request_id_from_json_with_numeric_id() {
        let msg = json!({"jsonrpc": "2.0", "id": 42, "result": null});
        assert_eq!(RequestId::from_json(&msg), Some(RequestId::new(42)));
    }

    #[rstest]
    #[case::notification(json!({"jsonrpc": "2.0", "method": "notifications/message", "params": {}}))]
    #[case::null_id(json!({"jsonrpc": "2.0", "id": null, "result": null}))]
    #[case::string_id(json!({"jsonrpc": "2.0", "id": "1", "result": {}}))]
    #[case::float_id(json!({"jsonrpc": "2.0", "id": 1.5, "result": {}}))]
    #[case::not_an_object(json!([1, 2, 3]))]
    #[case::unparsed_wrapper(json!({"_unparsed": "garbage"}))]
    fn request_id_from_json_rejects_unroutable(#[case] msg: serde_json::Value) {
        assert_eq!(RequestId::from_json(&msg), None);
    }
}

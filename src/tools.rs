//! Tool-level operations on top of [`StdioProxy`].
//!
//! Each operation maps to one proxied request and returns the proxy's
//! response object unchanged unless documented otherwise. A `None` timeout
//! uses the configured request timeout.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};

use crate::error::ProxyResult;
use crate::proxy::StdioProxy;

/// Lines returned by [`GithubTools::raw_stdout`].
pub const RAW_STDOUT_LINES: usize = 50;

pub struct GithubTools {
    proxy: Arc<StdioProxy>,
}

impl GithubTools {
    pub fn new(proxy: Arc<StdioProxy>) -> Self {
        Self { proxy }
    }

    pub fn proxy(&self) -> &Arc<StdioProxy> {
        &self.proxy
    }

    fn timeout(&self, timeout: Option<Duration>) -> Duration {
        timeout.unwrap_or(self.proxy.config().request_timeout)
    }

    /// Forward any method unchanged.
    pub async fn github_rpc(
        &self,
        method: &str,
        params: Option<Value>,
        timeout: Option<Duration>,
    ) -> ProxyResult<Value> {
        self.proxy.call(method, params, self.timeout(timeout)).await
    }

    /// `tools/call` with `{"name": name, "arguments": arguments}`.
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: Option<Value>,
        timeout: Option<Duration>,
    ) -> ProxyResult<Value> {
        let params = json!({
            "name": name,
            "arguments": arguments.unwrap_or_else(|| json!({})),
        });
        self.proxy
            .call("tools/call", Some(params), self.timeout(timeout))
            .await
    }

    pub async fn list_available_toolsets(&self, timeout: Option<Duration>) -> ProxyResult<Value> {
        self.call_tool("list_available_toolsets", None, timeout).await
    }

    pub async fn get_toolset_tools(
        &self,
        toolset: &str,
        timeout: Option<Duration>,
    ) -> ProxyResult<Value> {
        self.call_tool("get_toolset_tools", Some(json!({"toolset": toolset})), timeout)
            .await
    }

    pub async fn enable_toolset(
        &self,
        toolset: &str,
        timeout: Option<Duration>,
    ) -> ProxyResult<Value> {
        self.call_tool("enable_toolset", Some(json!({"toolset": toolset})), timeout)
            .await
    }

    /// `tools/list` with empty params.
    pub async fn list_enabled_tools(&self, timeout: Option<Duration>) -> ProxyResult<Value> {
        self.proxy
            .call("tools/list", Some(json!({})), self.timeout(timeout))
            .await
    }

    /// `tools/list`, reduced to `{"tools": [names...], "raw": response}`.
    ///
    /// Entries without a string `name` are skipped; an error response yields
    /// an empty list.
    pub async fn list_tool_names(&self, timeout: Option<Duration>) -> ProxyResult<Value> {
        let response = self.list_enabled_tools(timeout).await?;
        Ok(json!({
            "tools": tool_names(&response),
            "raw": response,
        }))
    }

    /// `{"lines": [...]}` with the most recent raw stdout lines.
    pub fn raw_stdout(&self) -> Value {
        json!({ "lines": self.proxy.recent_stdout(RAW_STDOUT_LINES) })
    }
}

fn tool_names(response: &Value) -> Vec<String> {
    response
        .get("result")
        .and_then(|result| result.get("tools"))
        .and_then(Value::as_array)
        .map(|tools| {
            tools
                .iter()
                .filter_map(|tool| tool.get("name").and_then(Value::as_str))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

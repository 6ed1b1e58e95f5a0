//! Scripted stand-ins for github-mcp-server.
//!
//! Each fake server is a POSIX `sh` loop that reads one request per line,
//! extracts `$id` and `$method` with `sed`, and runs a shell snippet that
//! decides what to print. Requests can be appended to a log file so tests can
//! inspect exactly what went over the wire.

use github_mcp_wrapper::{ProxyConfig, StdioProxy};
use std::path::Path;
use std::time::Duration;

/// Reply helpers available inside every snippet.
const PRELUDE: &str = r#"
reply() { printf '{"jsonrpc":"2.0","id":%s,"result":%s}\n' "$1" "$2"; }
reply_error() { printf '{"jsonrpc":"2.0","id":%s,"error":{"code":%s,"message":"%s"}}\n' "$1" "$2" "$3"; }
"#;

/// Snippet answering every request with `{"echo": <method>}`.
pub const ECHO: &str = r#"reply "$id" "{\"echo\":\"$method\"}""#;

/// Build a server script around `snippet`, optionally logging every request
/// line to `request_log`.
pub fn script(snippet: &str, request_log: Option<&Path>) -> String {
    let log_line = match request_log {
        Some(path) => format!("printf '%s\\n' \"$line\" >> '{}'", path.display()),
        None => ":".to_string(),
    };
    format!(
        r#"{prelude}
while IFS= read -r line; do
  {log_line}
  id=$(printf '%s\n' "$line" | sed -n 's/^{{"jsonrpc":"2.0","id":\([0-9]*\),.*/\1/p')
  method=$(printf '%s\n' "$line" | sed -n 's/.*"method":"\([^"]*\)".*/\1/p')
  {snippet}
done
"#,
        prelude = PRELUDE,
        log_line = log_line,
        snippet = snippet,
    )
}

/// Proxy configuration that runs `script` under `sh -c`.
pub fn config(script: &str) -> ProxyConfig {
    ProxyConfig {
        binary: "sh".into(),
        args: vec!["-c".to_string(), script.to_string()],
        request_timeout: Duration::from_secs(5),
        handshake_timeout: Duration::from_secs(5),
        shutdown_grace: Duration::from_millis(200),
        ..ProxyConfig::default()
    }
}

pub fn proxy(script: &str) -> StdioProxy {
    StdioProxy::new(config(script))
}

/// Request lines recorded by a server started with a request log.
pub fn recorded_requests(request_log: &Path) -> Vec<String> {
    std::fs::read_to_string(request_log)
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}

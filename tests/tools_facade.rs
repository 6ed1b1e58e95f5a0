//! Integration tests for `GithubTools`.

#![cfg(unix)]

mod helpers;

use github_mcp_wrapper::GithubTools;
use helpers::fake_server;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

/// Answers `tools/list` with two tools and echoes `tools/call` params back.
const TOOL_SERVER: &str = r#"
  case "$method" in
    initialize) reply "$id" '{"capabilities":{"tools":{}}}' ;;
    tools/list) reply "$id" '{"tools":[{"name":"get_me"},{"name":"search_repositories"}]}' ;;
    tools/call)
      params=$(printf '%s\n' "$line" | sed -n 's/.*"params":\(.*\)}$/\1/p')
      reply "$id" "$params" ;;
    *) reply_error "$id" -32601 "Method not found" ;;
  esac"#;

fn tools_with_log() -> (GithubTools, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let script = fake_server::script(TOOL_SERVER, Some(&dir.path().join("requests.log")));
    let proxy = Arc::new(fake_server::proxy(&script));
    (GithubTools::new(proxy), dir)
}

#[tokio::test]
async fn call_tool_wraps_name_and_arguments() {
    let (tools, _dir) = tools_with_log();

    let response = tools
        .call_tool("get_me", Some(json!({"verbose": true})), None)
        .await
        .unwrap();
    tools.proxy().shutdown().await;

    assert_eq!(
        response["result"],
        json!({"arguments": {"verbose": true}, "name": "get_me"})
    );
}

#[tokio::test]
async fn call_tool_defaults_arguments_to_empty_object() {
    let (tools, _dir) = tools_with_log();

    let response = tools.call_tool("get_me", None, None).await.unwrap();
    tools.proxy().shutdown().await;

    assert_eq!(response["result"], json!({"arguments": {}, "name": "get_me"}));
}

#[tokio::test]
async fn toolset_operations_call_the_matching_tool() {
    let (tools, _dir) = tools_with_log();

    let available = tools.list_available_toolsets(None).await.unwrap();
    let listed = tools.get_toolset_tools("repos", None).await.unwrap();
    let enabled = tools.enable_toolset("issues", None).await.unwrap();
    tools.proxy().shutdown().await;

    assert_eq!(
        available["result"],
        json!({"arguments": {}, "name": "list_available_toolsets"})
    );
    assert_eq!(
        listed["result"],
        json!({"arguments": {"toolset": "repos"}, "name": "get_toolset_tools"})
    );
    assert_eq!(
        enabled["result"],
        json!({"arguments": {"toolset": "issues"}, "name": "enable_toolset"})
    );
}

#[tokio::test]
async fn list_tool_names_extracts_names_and_keeps_raw_response() {
    let (tools, _dir) = tools_with_log();

    let names = tools.list_tool_names(None).await.unwrap();
    let enabled = tools.list_enabled_tools(None).await.unwrap();
    tools.proxy().shutdown().await;

    assert_eq!(names["tools"], json!(["get_me", "search_repositories"]));
    assert_eq!(names["raw"]["id"], 2);
    assert_eq!(enabled["result"]["tools"][1]["name"], "search_repositories");
}

#[tokio::test]
async fn github_rpc_forwards_remote_errors_unchanged() {
    let (tools, _dir) = tools_with_log();

    let response = tools
        .github_rpc("resources/list", None, Some(Duration::from_secs(5)))
        .await
        .unwrap();
    tools.proxy().shutdown().await;

    assert_eq!(
        response,
        json!({"jsonrpc": "2.0", "id": 2, "error": {"code": -32601, "message": "Method not found"}})
    );
}

#[tokio::test]
async fn raw_stdout_returns_recent_lines() {
    let (tools, _dir) = tools_with_log();
    assert_eq!(tools.raw_stdout(), json!({"lines": []}));

    tools.list_enabled_tools(None).await.unwrap();
    let raw = tools.raw_stdout();
    tools.proxy().shutdown().await;

    let lines = raw["lines"].as_array().unwrap();
    assert_eq!(lines.len(), 2, "handshake and tools/list responses");
    assert!(lines[1].as_str().unwrap().contains("search_repositories"));
}

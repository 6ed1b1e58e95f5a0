use clap::{Parser, Subcommand};
use github_mcp_wrapper::config::{self, WrapperSettings};
use github_mcp_wrapper::{GithubTools, StdioProxy, logging};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;

/// Drive a stdio GitHub MCP server from the command line
#[derive(Parser)]
#[command(name = "github-mcp-wrapper")]
#[command(version)]
#[command(about = "Drive a stdio GitHub MCP server from the command line")]
struct Cli {
    /// Path to the github-mcp-server binary
    #[arg(long, global = true)]
    binary: Option<PathBuf>,

    /// Protocol version offered in the handshake
    #[arg(long, global = true)]
    protocol_version: Option<String>,

    /// Config file to use instead of the user config
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Per-request timeout in seconds
    #[arg(long, global = true, value_name = "SECS")]
    timeout: Option<u64>,

    /// Enable diagnostic logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print the most recent raw server output to stderr before exiting
    #[arg(long, global = true)]
    dump_stdout: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send an arbitrary JSON-RPC method
    Rpc {
        /// Method name (e.g., tools/list)
        method: String,

        /// Params as a JSON object
        #[arg(long)]
        params: Option<String>,
    },
    /// List the names of the currently enabled tools
    Tools,
    /// List the toolsets the server offers
    Toolsets,
    /// List the tools of one toolset
    ToolsetTools {
        /// Toolset name (e.g., repos, issues, pull_requests)
        toolset: String,
    },
    /// Enable a toolset
    EnableToolset {
        /// Toolset name (e.g., repos, issues, pull_requests)
        toolset: String,
    },
    /// Call a tool by name
    Call {
        /// Tool name (e.g., get_me, search_repositories)
        tool: String,

        /// Tool arguments as a JSON object
        #[arg(long)]
        arguments: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    std::process::exit(run(cli).await);
}

async fn run(cli: Cli) -> i32 {
    let cli_layer = WrapperSettings {
        binary: cli.binary,
        protocol_version: cli.protocol_version,
        request_timeout_secs: cli.timeout,
        diagnostics: cli.verbose.then_some(true),
        ..WrapperSettings::default()
    };
    let config = match config::resolve(
        cli.config.as_deref(),
        |key| std::env::var(key).ok(),
        cli_layer,
    ) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 2;
        }
    };
    logging::init(config.log_level);

    let proxy = Arc::new(StdioProxy::new(config));
    let tools = GithubTools::new(Arc::clone(&proxy));

    let result = match cli.command {
        Commands::Rpc { method, params } => {
            let params = match parse_json_arg("--params", params.as_deref()) {
                Ok(params) => params,
                Err(message) => return usage_error(&message),
            };
            tools.github_rpc(&method, params, None).await
        }
        Commands::Tools => tools.list_tool_names(None).await,
        Commands::Toolsets => tools.list_available_toolsets(None).await,
        Commands::ToolsetTools { toolset } => tools.get_toolset_tools(&toolset, None).await,
        Commands::EnableToolset { toolset } => tools.enable_toolset(&toolset, None).await,
        Commands::Call { tool, arguments } => {
            let arguments = match parse_json_arg("--arguments", arguments.as_deref()) {
                Ok(arguments) => arguments,
                Err(message) => return usage_error(&message),
            };
            tools.call_tool(&tool, arguments, None).await
        }
    };

    if cli.dump_stdout {
        for line in proxy.recent_stdout(github_mcp_wrapper::tools::RAW_STDOUT_LINES) {
            eprintln!("[stdout] {}", line);
        }
    }
    proxy.shutdown().await;

    match result {
        Ok(response) => {
            let rendered =
                serde_json::to_string_pretty(&response).unwrap_or_else(|_| response.to_string());
            println!("{}", rendered);
            // Nested errors count too: `tools` wraps the response under "raw"
            let failed = response.get("error").is_some()
                || response
                    .get("raw")
                    .is_some_and(|raw| raw.get("error").is_some());
            i32::from(failed)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

/// Parse an optional JSON object argument.
fn parse_json_arg(flag: &str, raw: Option<&str>) -> Result<Option<Value>, String> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    match serde_json::from_str::<Value>(raw) {
        Ok(value @ Value::Object(_)) => Ok(Some(value)),
        Ok(_) => Err(format!("{} must be a JSON object", flag)),
        Err(e) => Err(format!("{} is not valid JSON: {}", flag, e)),
    }
}

fn usage_error(message: &str) -> i32 {
    eprintln!("Error: {}", message);
    2
}

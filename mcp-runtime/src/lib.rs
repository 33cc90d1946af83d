//! MCP runtime exposing the Singularity task manager as agent tools.
//!
//! [`server::McpServer`] speaks JSON-RPC over stdio, [`dispatch`] maps tool
//! calls onto [`client::SingularityClient`], and the client talks to the
//! remote API through a [`transport::Transport`].

use std::sync::Arc;

use clap::{Args, Subcommand};
use serde_json::{Map, Value, json};
use singularity_core::error::codes;
use tracing::info;

pub mod client;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod framing;
pub mod server;
pub mod tools;
pub mod transport;

#[cfg(test)]
mod testing;

use config::RuntimeConfig;
use server::{McpServer, to_pretty_json};

#[derive(Subcommand, Clone, Debug)]
pub enum McpCommands {
    /// Run the MCP server over stdio (default)
    Serve,
    /// Print the tool catalog as JSON
    Tools,
    /// Run a single tool against the live API and print its result
    Call(McpCallArgs),
}

#[derive(Args, Clone, Debug)]
pub struct McpCallArgs {
    /// Tool name, e.g. list_tasks
    pub tool: String,
    /// Tool arguments as a JSON object
    #[arg(long, default_value = "{}")]
    pub args: String,
}

pub async fn run(config: RuntimeConfig, command: McpCommands) -> i32 {
    match command {
        McpCommands::Tools => {
            println!("{}", to_pretty_json(&tools::tools_list_payload()));
            0
        }
        McpCommands::Serve => {
            let client = match config.connect() {
                Ok(client) => client,
                Err(err) => return print_error(err.code(), &err.to_string(), 1),
            };
            info!(config = ?config, "starting MCP server on stdio");
            match Arc::new(McpServer::new(client)).serve_stdio().await {
                Ok(()) => {
                    info!("stdin closed; MCP server stopped");
                    0
                }
                Err(err) => print_error("mcp_server_error", &err.to_string(), 1),
            }
        }
        McpCommands::Call(args) => {
            let arguments = match parse_call_arguments(&args.args) {
                Ok(arguments) => arguments,
                Err(message) => return print_error(codes::VALIDATION_FAILED, &message, 2),
            };
            let client = match config.connect() {
                Ok(client) => client,
                Err(err) => return print_error(err.code(), &err.to_string(), 1),
            };
            let outcome = McpServer::new(client)
                .call_tool(&args.tool, &arguments)
                .await;
            if outcome.is_error {
                eprintln!("{}", outcome.text);
                1
            } else {
                println!("{}", outcome.text);
                0
            }
        }
    }
}

fn parse_call_arguments(raw: &str) -> Result<Map<String, Value>, String> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(Value::Null) => Ok(Map::new()),
        Ok(_) => Err("--args must be a JSON object".to_string()),
        Err(e) => Err(format!("--args is not valid JSON: {e}")),
    }
}

fn print_error(code: &str, message: &str, exit_code: i32) -> i32 {
    let payload = json!({
        "error": code,
        "message": message,
    });
    eprintln!("{}", to_pretty_json(&payload));
    exit_code
}

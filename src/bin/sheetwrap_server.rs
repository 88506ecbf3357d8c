//! Sheetwrap API Server binary
//!
//! HTTP JSON API for reflow, projection, conversion and template memory.

use clap::Parser;
use sheetwrap::api::{run_api_server, ApiConfig};
use sheetwrap::config::{FormatterConfig, ENV_API_KEY, ENV_BASE_URL, ENV_MEMORY, ENV_MODEL};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "sheetwrap-server")]
#[command(version)]
#[command(about = "Sheetwrap API Server - HTTP JSON API for spreadsheet-to-text conversion")]
#[command(long_about = r#"
Sheetwrap API Server - HTTP JSON API

Provides endpoints for every Sheetwrap operation:
  - POST /api/v1/reflow             - Re-wrap text to a maximum line width
  - POST /api/v1/project            - Project a table to tab-separated text
  - POST /api/v1/convert            - Convert a table using an example layout
  - GET  /api/v1/memory             - List remembered layouts
  - GET  /api/v1/memory/{signature} - Show one remembered layout

Additional endpoints:
  - GET  /health                    - Health check
  - GET  /version                   - Server version info
  - GET  /                          - API documentation

Features:
  - CORS enabled for cross-origin requests
  - Graceful shutdown on SIGINT/SIGTERM
  - JSON response format with request IDs
  - Tracing and structured logging

Example usage:
  sheetwrap-server                           # Start on localhost:8080
  sheetwrap-server --host 0.0.0.0 --port 3000

  curl -X POST http://localhost:8080/api/v1/reflow \
    -H "Content-Type: application/json" \
    -d '{"text": "The quick brown fox jumps", "width": 10}'
"#)]
struct Args {
    /// Host address to bind to (use 0.0.0.0 for all interfaces)
    #[arg(short = 'H', long, default_value = "127.0.0.1", env = "SHEETWRAP_HOST")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "8080", env = "SHEETWRAP_PORT")]
    port: u16,

    /// Template memory file (process-local memory when omitted)
    #[arg(long, env = ENV_MEMORY)]
    memory: Option<PathBuf>,

    /// API key for the reformatting service
    #[arg(long, env = ENV_API_KEY, hide_env_values = true)]
    api_key: Option<String>,

    /// Model name
    #[arg(long, env = ENV_MODEL)]
    model: Option<String>,

    /// Base URL of the reformatting service
    #[arg(long, env = ENV_BASE_URL)]
    base_url: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = ApiConfig {
        host: args.host,
        port: args.port,
        memory: args.memory,
        formatter: FormatterConfig::from_env()
            .with_api_key(args.api_key)
            .with_model(args.model)
            .with_base_url(args.base_url),
    };

    run_api_server(config).await
}

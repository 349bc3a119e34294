//! Wound care MCP server — entry point.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use wound_care_mcp::config::{
    resolve_knowledge_base_path, resolve_model_path, ConfigOverrides, ServerConfig,
};
use wound_care_mcp::protocol::ProtocolHandler;
use wound_care_mcp::resources::treatment::INDEX_KEY;
use wound_care_mcp::resources::ResourceRegistry;
use wound_care_mcp::service::WoundService;
use wound_care_mcp::tools::ToolRegistry;
use wound_care_mcp::transport::StdioTransport;

#[derive(Parser)]
#[command(
    name = "wound-care-mcp",
    about = "MCP server for wound segmentation, area measurement, infection screening, and treatment plans",
    version
)]
struct Cli {
    /// Path to the segmentation ONNX model.
    #[arg(long, global = true)]
    model: Option<String>,

    /// Path to the treatment plan knowledge base (JSON).
    #[arg(long, global = true)]
    knowledge_base: Option<String>,

    /// Gemini API key. Also reads GEMINI_API_KEY.
    #[arg(long, global = true)]
    gemini_api_key: Option<String>,

    /// Gemini model name.
    #[arg(long, global = true)]
    gemini_model: Option<String>,

    /// Gemini API base URL. Also reads GEMINI_ENDPOINT.
    #[arg(long, global = true)]
    gemini_endpoint: Option<String>,

    /// Physical size of one pixel in centimetres. Also reads WOUND_PIXEL_SPACING_CM.
    #[arg(long, global = true)]
    pixel_spacing_cm: Option<f64>,

    /// Default minimum detection confidence for segment_wound.
    #[arg(long, global = true)]
    conf_thresh: Option<f32>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            model: self.model.clone(),
            knowledge_base: self.knowledge_base.clone(),
            gemini_api_key: self.gemini_api_key.clone(),
            gemini_model: self.gemini_model.clone(),
            gemini_endpoint: self.gemini_endpoint.clone(),
            pixel_spacing_cm: self.pixel_spacing_cm,
            confidence_threshold: self.conf_thresh,
        }
    }

    fn knowledge_base_path(&self) -> PathBuf {
        PathBuf::from(resolve_knowledge_base_path(self.knowledge_base.as_deref()))
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Start MCP server over stdio (default).
    Serve,

    /// Start MCP server over HTTP.
    #[cfg(feature = "sse")]
    ServeHttp {
        /// Listen address (host:port).
        #[arg(long, default_value = "127.0.0.1:8001")]
        addr: String,
    },

    /// Print server capabilities and resolved paths as JSON.
    Info,

    /// Check that the knowledge base loads and list its wound types.
    ValidateKb,

    /// Print the treatment plan for a wound type.
    Plan {
        /// Wound type key, e.g. "abrasion".
        wound_type: String,
    },

    /// Generate shell completion scripts.
    ///
    /// Examples:
    ///   wound-care-mcp completions bash > ~/.local/share/bash-completion/completions/wound-care-mcp
    ///   wound-care-mcp completions zsh > ~/.zfunc/_wound-care-mcp
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },

    /// Launch interactive REPL mode.
    Repl,
}

fn open_service(cli: &Cli) -> anyhow::Result<Arc<WoundService>> {
    let config = ServerConfig::resolve(cli.overrides())?;
    tracing::info!("Model: {}", config.model_path.display());
    Ok(Arc::new(WoundService::open(&config)?))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command.as_ref().unwrap_or(&Commands::Serve) {
        Commands::Serve => {
            let service = open_service(&cli)?;
            let transport = StdioTransport::new(ProtocolHandler::new(service));
            transport.run().await?;
        }

        #[cfg(feature = "sse")]
        Commands::ServeHttp { addr } => {
            use wound_care_mcp::transport::SseTransport;

            let service = open_service(&cli)?;
            let transport = SseTransport::new(ProtocolHandler::new(service));
            transport.run(addr).await?;
        }

        Commands::Info => {
            let capabilities = wound_care_mcp::types::InitializeResult::default_result();
            let tools = ToolRegistry::list_tools();
            let model_path = resolve_model_path(cli.model.as_deref());
            let kb_path = cli.knowledge_base_path();
            let info = serde_json::json!({
                "server": capabilities.server_info,
                "protocol_version": capabilities.protocol_version,
                "capabilities": capabilities.capabilities,
                "tools": tools.iter().map(|t| &t.name).collect::<Vec<_>>(),
                "tool_count": tools.len(),
                "resources": ResourceRegistry::list_resources().iter().map(|r| r.uri.clone()).collect::<Vec<_>>(),
                "model_path": model_path,
                "model_present": std::path::Path::new(&model_path).exists(),
                "knowledge_base": kb_path.display().to_string(),
                "knowledge_base_present": kb_path.exists(),
            });
            println!("{}", serde_json::to_string_pretty(&info)?);
        }

        Commands::ValidateKb => {
            let path = cli.knowledge_base_path();
            match wound_care::load_knowledge_base(&path) {
                Ok(kb) => {
                    println!("Valid knowledge base: {}", path.display());
                    println!("  Wound types: {}", kb.len());
                    for wound_type in wound_care::wound_types(&kb) {
                        let steps = kb
                            .get(&wound_type)
                            .and_then(|p| p.steps.as_ref())
                            .map_or(0, |s| s.len());
                        println!("    {wound_type:<24} {steps} step(s)");
                    }
                    if kb.contains_key(INDEX_KEY) {
                        println!(
                            "  Warning: \"{INDEX_KEY}\" is reserved for treatment://index; \
                             that entry is only reachable through get_treatment_plan"
                        );
                    }
                }
                Err(e) => {
                    eprintln!("Invalid knowledge base: {e}");
                    std::process::exit(1);
                }
            }
        }

        Commands::Plan { wound_type } => {
            let path = cli.knowledge_base_path();
            println!("{}", wound_care::treatment_plan(wound_type, &path));
        }

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(*shell, &mut cmd, "wound-care-mcp", &mut std::io::stdout());
        }

        Commands::Repl => {
            let overrides = cli.overrides();
            let handle = tokio::runtime::Handle::current();
            tokio::task::spawn_blocking(move || wound_care_mcp::repl::run(overrides, handle))
                .await??;
        }
    }

    Ok(())
}

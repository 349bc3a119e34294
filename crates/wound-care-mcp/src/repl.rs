//! Interactive REPL for the wound care MCP server.
//!
//! Launch with `wound-care-mcp repl` to enter interactive mode.
//! Type `/help` for available commands, Tab for completion.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rustyline::completion::{Completer, Pair};
use rustyline::config::CompletionType;
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{
    Cmd, ConditionalEventHandler, Config, Editor, Event, EventContext, EventHandler, Helper,
    KeyEvent, RepeatCount,
};
use tokio::runtime::Handle;

use crate::config::{resolve_knowledge_base_path, ConfigOverrides, ServerConfig};
use crate::service::WoundService;
use crate::tools::ToolRegistry;

/// Available REPL commands.
const COMMANDS: &[(&str, &str)] = &[
    ("/info", "Show server capabilities and tools"),
    ("/tools", "List available MCP tools"),
    ("/kb", "Show or switch the treatment plan knowledge base"),
    ("/types", "List wound types in the knowledge base"),
    ("/plan", "Print the treatment plan for a wound type"),
    ("/segment", "Segment a wound photo and measure its area"),
    ("/diagnose", "Screen a wound photo for infection"),
    ("/describe", "Describe a wound photo"),
    ("/clear", "Clear the screen"),
    ("/help", "Show available commands"),
    ("/exit", "Quit the REPL"),
];

/// REPL helper for tab completion.
struct WoundHelper;

impl Default for WoundHelper {
    fn default() -> Self {
        Self
    }
}

impl Completer for WoundHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let input = &line[..pos];

        if !input.contains(' ') {
            let matches: Vec<Pair> = COMMANDS
                .iter()
                .filter(|(cmd, _)| cmd.starts_with(input))
                .map(|(cmd, desc)| Pair {
                    display: format!("{cmd:<16} {desc}"),
                    replacement: format!("{cmd} "),
                })
                .collect();
            return Ok((0, matches));
        }

        let parts: Vec<&str> = input.splitn(2, ' ').collect();
        let cmd = parts[0];
        let args = if parts.len() > 1 { parts[1] } else { "" };

        let wanted: fn(&Path) -> bool = match cmd {
            "/kb" => is_json,
            "/segment" | "/diagnose" | "/describe" => is_image,
            _ => return Ok((pos, Vec::new())),
        };

        let files = local_files(wanted);
        let prefix_start = input.len() - args.len();
        let matches: Vec<Pair> = files
            .iter()
            .filter(|f| f.starts_with(args.trim()))
            .map(|f| Pair {
                display: f.clone(),
                replacement: format!("{f} "),
            })
            .collect();
        Ok((prefix_start, matches))
    }
}

impl Hinter for WoundHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &rustyline::Context<'_>) -> Option<String> {
        if pos < line.len() || line.is_empty() {
            return None;
        }
        if line.starts_with('/') && !line.contains(' ') {
            for (cmd, _) in COMMANDS {
                if cmd.starts_with(line) && *cmd != line {
                    return Some(cmd[line.len()..].to_string());
                }
            }
        }
        None
    }
}

impl Highlighter for WoundHelper {}
impl Validator for WoundHelper {}
impl Helper for WoundHelper {}

struct TabCompleteOrAcceptHint;

impl ConditionalEventHandler for TabCompleteOrAcceptHint {
    fn handle(
        &self,
        _evt: &Event,
        _n: RepeatCount,
        _positive: bool,
        ctx: &EventContext<'_>,
    ) -> Option<Cmd> {
        if ctx.has_hint() {
            Some(Cmd::CompleteHint)
        } else {
            Some(Cmd::Complete)
        }
    }
}

fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|e| e == "json")
}

fn is_image(path: &Path) -> bool {
    path.to_str()
        .is_some_and(wound_care::capture::is_supported_format)
}

/// File names in the current directory accepted by `wanted`, sorted.
fn local_files(wanted: fn(&Path) -> bool) -> Vec<String> {
    let mut files = Vec::new();
    if let Ok(entries) = std::fs::read_dir(".") {
        for entry in entries.flatten() {
            let path = entry.path();
            if wanted(&path) {
                if let Some(name) = path.file_name().and_then(|s| s.to_str()) {
                    files.push(name.to_string());
                }
            }
        }
    }
    files.sort();
    files
}

/// Session state. The service is opened on the first analysis command so that
/// plan lookups work without a model or API key.
struct ReplState {
    overrides: ConfigOverrides,
    knowledge_base: PathBuf,
    service: Option<Arc<WoundService>>,
    runtime: Handle,
}

impl ReplState {
    fn service(&mut self) -> Option<Arc<WoundService>> {
        if self.service.is_none() {
            let opened = ServerConfig::resolve(self.overrides.clone())
                .and_then(|config| WoundService::open(&config));
            match opened {
                Ok(service) => self.service = Some(Arc::new(service)),
                Err(e) => {
                    eprintln!("  Cannot start analysis: {e}");
                    return None;
                }
            }
        }
        self.service.clone()
    }
}

/// Run the interactive REPL. Must be called off the async worker threads,
/// e.g. from `spawn_blocking`, since analysis commands block on `runtime`.
pub fn run(overrides: ConfigOverrides, runtime: Handle) -> anyhow::Result<()> {
    eprintln!();
    eprintln!(
        "  \x1b[32m\u{25c9}\x1b[0m \x1b[1mwound-care-mcp v{}\x1b[0m \x1b[90m\u{2014} Wound assessment and care plans\x1b[0m",
        env!("CARGO_PKG_VERSION")
    );
    eprintln!();
    eprintln!(
        "    Press \x1b[36m/\x1b[0m to browse commands, \x1b[90mTab\x1b[0m to complete, \x1b[90m/exit\x1b[0m to quit."
    );
    eprintln!();

    let config = Config::builder()
        .history_ignore_space(true)
        .auto_add_history(true)
        .completion_type(CompletionType::List)
        .completion_prompt_limit(20)
        .build();

    let mut rl: Editor<WoundHelper, rustyline::history::DefaultHistory> =
        Editor::with_config(config)?;
    rl.set_helper(Some(WoundHelper));
    rl.bind_sequence(
        KeyEvent::from('\t'),
        EventHandler::Conditional(Box::new(TabCompleteOrAcceptHint)),
    );

    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    let hist_path = PathBuf::from(&home).join(".wound_care_mcp_history");
    if hist_path.exists() {
        let _ = rl.load_history(&hist_path);
    }

    let knowledge_base = PathBuf::from(resolve_knowledge_base_path(
        overrides.knowledge_base.as_deref(),
    ));
    let mut state = ReplState {
        overrides,
        knowledge_base,
        service: None,
        runtime,
    };
    let prompt = " \x1b[36mwound>\x1b[0m ";

    loop {
        match rl.readline(prompt) {
            Ok(line) => {
                let Some((cmd, args)) = split_command(&line) else {
                    continue;
                };

                match cmd {
                    "" | "help" | "h" | "?" => cmd_help(),
                    "exit" | "quit" => {
                        eprintln!("  \x1b[90m\u{2728}\x1b[0m Goodbye!");
                        break;
                    }
                    "clear" | "cls" => eprint!("\x1b[2J\x1b[H"),
                    "info" => cmd_info(&state),
                    "tools" => cmd_tools(),
                    "kb" => cmd_kb(args, &mut state),
                    "types" => cmd_types(&state),
                    "plan" => cmd_plan(args, &state),
                    "segment" => cmd_segment(args, &mut state),
                    "diagnose" => cmd_diagnose(args, &mut state),
                    "describe" => cmd_describe(args, &mut state),
                    _ => {
                        eprintln!("  Unknown command '/{cmd}'. Type /help for commands.");
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                eprintln!("  \x1b[90m(Ctrl+C)\x1b[0m Type \x1b[1m/exit\x1b[0m to quit.");
            }
            Err(ReadlineError::Eof) => {
                eprintln!("  \x1b[90m\u{2728}\x1b[0m Goodbye!");
                break;
            }
            Err(err) => {
                eprintln!("  Error: {err}");
                break;
            }
        }
    }

    let _ = std::fs::create_dir_all(hist_path.parent().unwrap_or(Path::new(".")));
    let _ = rl.save_history(&hist_path);

    Ok(())
}

/// Split a line into command and argument text. The leading `/` is optional.
fn split_command(line: &str) -> Option<(&str, &str)> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let input = line.strip_prefix('/').unwrap_or(line);
    let mut parts = input.splitn(2, ' ');
    let cmd = parts.next().unwrap_or("");
    let args = parts.next().unwrap_or("").trim();
    Some((cmd, args))
}

fn cmd_help() {
    eprintln!();
    eprintln!("  Commands:");
    eprintln!();
    for (cmd, desc) in COMMANDS {
        eprintln!("    {cmd:<18} {desc}");
    }
    eprintln!();
    eprintln!("  Tip: Tab completion works for commands, .json files, and images.");
    eprintln!();
}

fn cmd_info(state: &ReplState) {
    let capabilities = crate::types::InitializeResult::default_result();
    let tools = ToolRegistry::list_tools();
    eprintln!();
    eprintln!(
        "  Server:    {} v{}",
        capabilities.server_info.name, capabilities.server_info.version
    );
    eprintln!("  Protocol:  {}", capabilities.protocol_version);
    eprintln!("  Tools:     {}", tools.len());
    eprintln!("  Plans:     {}", state.knowledge_base.display());
    match &state.service {
        Some(service) => eprintln!(
            "  Analysis:  ready ({} cm/px)",
            service.analyzer().calibration().cm_per_pixel()
        ),
        None => eprintln!("  Analysis:  not started"),
    }
    eprintln!();
}

fn cmd_tools() {
    let tools = ToolRegistry::list_tools();
    eprintln!();
    eprintln!("  {} MCP tools available:", tools.len());
    eprintln!();
    for tool in &tools {
        eprintln!(
            "    {:<28} {}",
            tool.name,
            tool.description.as_deref().unwrap_or("")
        );
    }
    eprintln!();
}

fn cmd_kb(args: &str, state: &mut ReplState) {
    if !args.is_empty() {
        let path = PathBuf::from(args.split_whitespace().next().unwrap_or(args));
        state.overrides.knowledge_base = Some(path.display().to_string());
        // Analysis keeps its own path, so drop it and reopen on demand.
        state.service = None;
        state.knowledge_base = path;
    }

    match wound_care::load_knowledge_base(&state.knowledge_base) {
        Ok(kb) => eprintln!(
            "  Knowledge base: {} ({} wound types)",
            state.knowledge_base.display(),
            kb.len()
        ),
        Err(e) => eprintln!("  Invalid knowledge base: {e}"),
    }
}

fn cmd_types(state: &ReplState) {
    match wound_care::load_knowledge_base(&state.knowledge_base) {
        Ok(kb) => {
            eprintln!();
            for wound_type in wound_care::wound_types(&kb) {
                eprintln!("    {wound_type}");
            }
            eprintln!();
        }
        Err(e) => eprintln!("  Cannot read knowledge base: {e}"),
    }
}

fn cmd_plan(args: &str, state: &ReplState) {
    if args.is_empty() {
        eprintln!("  Usage: /plan <wound_type>");
        return;
    }
    println!();
    println!("{}", wound_care::treatment_plan(args, &state.knowledge_base));
    println!();
}

fn cmd_segment(args: &str, state: &mut ReplState) {
    let mut parts = args.split_whitespace();
    let Some(path) = parts.next() else {
        eprintln!("  Usage: /segment <image> [conf_thresh]");
        return;
    };
    let Some(service) = state.service() else {
        return;
    };
    let threshold = match parts.next().map(str::parse::<f32>) {
        None => service.confidence_threshold(),
        Some(Ok(t)) => t,
        Some(Err(e)) => {
            eprintln!("  Invalid threshold: {e}");
            return;
        }
    };

    match state
        .runtime
        .block_on(service.analyzer().segment(Path::new(path), threshold))
    {
        Ok(report) => {
            eprintln!("  Area: {:.2} cm²", report.area_cm2);
            if let Some(message) = &report.message {
                eprintln!("  {message}");
            }
            if let Some(diagnosis) = &report.diagnosis {
                eprintln!("  Diagnosis: {diagnosis}");
            }
            if let Some(image) = &report.annotated_image_base64 {
                eprintln!("  Annotated image: {} base64 bytes", image.len());
            }
        }
        Err(e) => eprintln!("  Segmentation failed: {e}"),
    }
}

fn cmd_diagnose(args: &str, state: &mut ReplState) {
    if args.is_empty() {
        eprintln!("  Usage: /diagnose <image>");
        return;
    }
    let Some(service) = state.service() else {
        return;
    };
    match state
        .runtime
        .block_on(service.analyzer().diagnose(Path::new(args)))
    {
        Ok(diagnosis) => eprintln!("  Diagnosis: {diagnosis}"),
        Err(e) => eprintln!("  Diagnosis failed: {e}"),
    }
}

fn cmd_describe(args: &str, state: &mut ReplState) {
    if args.is_empty() {
        eprintln!("  Usage: /describe <image>");
        return;
    }
    let Some(service) = state.service() else {
        return;
    };
    match state
        .runtime
        .block_on(service.analyzer().describe(Path::new(args)))
    {
        Ok(description) => eprintln!("  {description}"),
        Err(e) => eprintln!("  Description failed: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_command() {
        assert_eq!(split_command("  /plan  abrasion "), Some(("plan", "abrasion")));
        assert_eq!(split_command("types"), Some(("types", "")));
        assert_eq!(split_command("/"), Some(("", "")));
        assert_eq!(split_command("   "), None);
    }

    #[test]
    fn test_completion_filters() {
        assert!(is_json(Path::new("plans.json")));
        assert!(!is_json(Path::new("wound.png")));
        assert!(is_image(Path::new("wound.JPG")));
        assert!(!is_image(Path::new("plans.json")));
    }

    #[test]
    fn test_segment_args_keep_threshold() {
        let (cmd, args) = split_command("/segment wound.jpg 0.3").unwrap();
        assert_eq!(cmd, "segment");
        let mut parts = args.split_whitespace();
        assert_eq!(parts.next(), Some("wound.jpg"));
        assert_eq!(parts.next(), Some("0.3"));
    }
}

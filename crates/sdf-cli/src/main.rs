//! SDF CLI tool
//!
//! Examples:
//!   sdf lsp                          - start the language server (stdio)
//!   sdf check model.sdf              - report parse errors
//!   sdf complete model.sdf 120       - list completions at byte offset 120
//!   sdf highlight model.sdf          - print with terminal colors

use std::io::{self, Read};
use std::path::Path;

use facet::Facet;
use figue as args;
use sdf_lsp::completion::{Candidate, CandidateKind, get_completions};
use sdf_lsp::config::{SdfUserConfig, load_config};
use sdf_lsp::semantic_tokens::{TokenType, compute_highlight_spans};
use sdf_lsp::type_index::{TypeDescriptor, types_of};
use sdf_lsp::workspace::scan_workspace;

// ============================================================================
// Exit codes
// ============================================================================

const EXIT_SUCCESS: i32 = 0;
const EXIT_SYNTAX_ERROR: i32 = 1;
const EXIT_USAGE_ERROR: i32 = 2;
const EXIT_IO_ERROR: i32 = 3;

// ============================================================================
// CLI argument structures
// ============================================================================

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Top-level CLI with optional subcommand
#[derive(Facet, Debug)]
struct Args {
    /// Subcommand to run
    #[facet(args::subcommand, default)]
    command: Option<Command>,
}

/// Available subcommands
#[derive(Facet, Debug)]
#[repr(u8)]
enum Command {
    /// Start language server (stdio)
    Lsp,

    /// Show CST structure
    Cst {
        /// Input file
        #[facet(args::positional)]
        file: String,
    },

    /// Report parse errors
    Check {
        /// Input file
        #[facet(args::positional)]
        file: String,
    },

    /// List completions at a byte offset
    Complete {
        /// Input file
        #[facet(args::positional)]
        file: String,

        /// Byte offset of the cursor
        #[facet(args::positional)]
        offset: String,

        /// Also offer types declared under this directory
        #[facet(args::named, default)]
        workspace: Option<String>,

        /// Print candidates as JSON
        #[facet(args::named, default)]
        json: bool,
    },

    /// Print a file with terminal colors
    Highlight {
        /// Input file
        #[facet(args::positional)]
        file: String,
    },
}

// ============================================================================
// Main entry point
// ============================================================================

fn main() {
    let raw_args: Vec<String> = std::env::args().skip(1).collect();

    if raw_args.is_empty() || raw_args[0] == "--help" || raw_args[0] == "-h" {
        print_help();
        std::process::exit(EXIT_SUCCESS);
    }

    if raw_args[0] == "--version" || raw_args[0] == "-V" {
        println!("sdf {VERSION}");
        std::process::exit(EXIT_SUCCESS);
    }

    match run_subcommand(&raw_args) {
        Ok(()) => std::process::exit(EXIT_SUCCESS),
        Err(e) => {
            if !matches!(e, CliError::Syntax { .. }) {
                eprintln!("error: {e}");
            }
            std::process::exit(e.exit_code());
        }
    }
}

fn print_help() {
    eprintln!("sdf {VERSION} - command-line tool for SDF schema files\n");
    eprintln!("USAGE:");
    eprintln!("    sdf <command> [args]\n");
    eprintln!("SUBCOMMANDS:");
    eprintln!("    lsp                             Start language server (stdio)");
    eprintln!("    cst <file>                      Show CST structure");
    eprintln!("    check <file>                    Report parse errors");
    eprintln!("    complete <file> <offset>        List completions at a byte offset");
    eprintln!("        --workspace <DIR>           Also offer types declared under DIR");
    eprintln!("        --json                      Print candidates as JSON");
    eprintln!("    highlight <file>                Print with terminal colors\n");
    eprintln!("    Use '-' as the file to read from stdin.");
}

fn run_subcommand(args: &[String]) -> Result<(), CliError> {
    let args_strs: Vec<&str> = args.iter().map(|s| s.as_str()).collect();
    let parsed: Args =
        figue::from_slice(&args_strs).map_err(|e| CliError::Usage(format!("{e:?}")))?;

    match parsed.command {
        Some(Command::Lsp) => run_lsp(),
        Some(Command::Cst { file }) => run_cst(&file),
        Some(Command::Check { file }) => run_check(&file),
        Some(Command::Complete {
            file,
            offset,
            workspace,
            json,
        }) => run_complete(&file, &offset, workspace.as_deref(), json),
        Some(Command::Highlight { file }) => run_highlight(&file),
        None => {
            print_help();
            Ok(())
        }
    }
}

// ============================================================================
// Error handling
// ============================================================================

#[derive(Debug)]
enum CliError {
    Io(io::Error),
    /// Parse errors were already reported on stderr.
    Syntax { count: usize },
    Usage(String),
}

impl CliError {
    fn exit_code(&self) -> i32 {
        match self {
            CliError::Io(_) => EXIT_IO_ERROR,
            CliError::Syntax { .. } => EXIT_SYNTAX_ERROR,
            CliError::Usage(_) => EXIT_USAGE_ERROR,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Io(e) => write!(f, "{e}"),
            CliError::Syntax { count } => write!(f, "{count} parse error(s)"),
            CliError::Usage(e) => write!(f, "{e}"),
        }
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        CliError::Io(e)
    }
}

// ============================================================================
// Subcommand implementations
// ============================================================================

fn run_lsp() -> Result<(), CliError> {
    let rt = tokio::runtime::Runtime::new().map_err(CliError::Io)?;
    rt.block_on(async {
        sdf_lsp::run()
            .await
            .map_err(|e| CliError::Io(io::Error::other(e.to_string())))
    })
}

fn run_cst(file: &str) -> Result<(), CliError> {
    let source = read_input(file)?;
    let parsed = sdf_cst::parse(&source);

    println!("{:#?}", parsed.syntax());

    if !parsed.errors().is_empty() {
        println!("\nParse errors:");
        for err in parsed.errors() {
            println!("  {:?}", err);
        }
    }

    Ok(())
}

fn run_check(file: &str) -> Result<(), CliError> {
    let source = read_input(file)?;
    let filename = display_name(file);
    let parsed = sdf_cst::parse(&source);

    for error in parsed.errors() {
        error.write_report(filename, &source, io::stderr());
    }

    match parsed.errors().len() {
        0 => Ok(()),
        count => Err(CliError::Syntax { count }),
    }
}

fn run_complete(
    file: &str,
    offset: &str,
    workspace: Option<&str>,
    json: bool,
) -> Result<(), CliError> {
    let offset: usize = offset
        .parse()
        .map_err(|_| CliError::Usage(format!("offset must be a byte offset, got '{offset}'")))?;
    let source = read_input(file)?;

    let registry = match workspace {
        Some(dir) => workspace_types(Path::new(dir), &user_config())?,
        None => types_of(&sdf_cst::parse(&source).syntax()),
    };

    let candidates = get_completions(&source, offset, &registry);

    if json {
        let items: Vec<serde_json::Value> = candidates.iter().map(candidate_json).collect();
        let out = serde_json::to_string_pretty(&items)
            .map_err(|e| CliError::Io(io::Error::other(e)))?;
        println!("{out}");
    } else {
        for candidate in &candidates {
            println!("{}", candidate.label());
        }
    }

    Ok(())
}

/// The user's config file, or defaults when it is missing or broken.
fn user_config() -> SdfUserConfig {
    match load_config() {
        Ok(config) => config.unwrap_or_default(),
        Err(e) => {
            eprintln!("warning: {e}");
            SdfUserConfig::default()
        }
    }
}

/// Types declared in the schema files under `dir`.
fn workspace_types(dir: &Path, config: &SdfUserConfig) -> Result<Vec<TypeDescriptor>, CliError> {
    let files = scan_workspace(dir, config).map_err(|e| CliError::Usage(e.to_string()))?;
    Ok(files
        .iter()
        .flat_map(|scanned| types_of(&sdf_cst::parse(&scanned.content).syntax()))
        .collect())
}

fn candidate_json(candidate: &Candidate) -> serde_json::Value {
    let kind = match candidate.kind {
        CandidateKind::Keyword => "keyword",
        CandidateKind::FieldKind => "field-kind",
        CandidateKind::Hook => "hook",
        CandidateKind::Annotation => "annotation",
        CandidateKind::Parameter => "parameter",
        CandidateKind::Value => "value",
        CandidateKind::Type => "type",
    };
    serde_json::json!({
        "label": candidate.label(),
        "insert": candidate.insert_text(),
        "kind": kind,
    })
}

fn run_highlight(file: &str) -> Result<(), CliError> {
    let source = read_input(file)?;
    print!("{}", highlight_sdf(&source));
    Ok(())
}

// ============================================================================
// Helper functions
// ============================================================================

fn read_input(file: &str) -> Result<String, io::Error> {
    if file == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        std::fs::read_to_string(file)
    }
}

fn display_name(file: &str) -> &str {
    if file == "-" { "<stdin>" } else { file }
}

// ============================================================================
// Semantic highlighting for terminal output
// ============================================================================

/// ANSI color codes for different token types
mod ansi {
    pub const RESET: &str = "\x1b[0m";
    pub const COMMENT: &str = "\x1b[38;5;243m"; // Gray
    pub const STRING: &str = "\x1b[38;5;214m"; // Orange
    pub const NUMBER: &str = "\x1b[38;5;141m"; // Purple
    pub const KEYWORD: &str = "\x1b[38;5;203m"; // Red
    pub const TYPE: &str = "\x1b[38;5;80m"; // Cyan
    pub const MEMBER: &str = "\x1b[38;5;75m"; // Blue
    pub const DECORATOR: &str = "\x1b[38;5;179m"; // Gold
    pub const PLAIN: &str = "";
}

/// Get ANSI color code for a token type
fn ansi_color_for_token(token_type: TokenType) -> &'static str {
    match token_type {
        TokenType::Comment => ansi::COMMENT,
        TokenType::String => ansi::STRING,
        TokenType::Number => ansi::NUMBER,
        TokenType::Keyword | TokenType::Operator => ansi::KEYWORD,
        TokenType::Type | TokenType::Namespace => ansi::TYPE,
        TokenType::Property | TokenType::Method => ansi::MEMBER,
        TokenType::Decorator => ansi::DECORATOR,
        TokenType::Parameter => ansi::PLAIN,
    }
}

/// Apply semantic highlighting to SDF source using ANSI escape codes
fn highlight_sdf(source: &str) -> String {
    let parse = sdf_cst::parse(source);
    let spans = compute_highlight_spans(&parse);

    let mut result = String::with_capacity(source.len() * 2);
    let mut last_end = 0;

    for span in &spans {
        if span.start > last_end {
            result.push_str(&source[last_end..span.start]);
        }

        let color = ansi_color_for_token(span.token_type);
        if color.is_empty() {
            result.push_str(&source[span.start..span.end]);
        } else {
            result.push_str(color);
            result.push_str(&source[span.start..span.end]);
            result.push_str(ansi::RESET);
        }

        last_end = span.end;
    }

    if last_end < source.len() {
        result.push_str(&source[last_end..]);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strip_ansi(s: &str) -> String {
        let mut out = String::new();
        let mut chars = s.chars();
        while let Some(c) = chars.next() {
            if c == '\x1b' {
                for c in chars.by_ref() {
                    if c == 'm' {
                        break;
                    }
                }
            } else {
                out.push(c);
            }
        }
        out
    }

    #[test]
    fn test_highlight_preserves_text() {
        let source = "// cars\npackage sample;\n\n$vue type Car {\n  Id: int <id @set=\"x\">;\n}\n";
        let highlighted = highlight_sdf(source);
        assert_ne!(highlighted, source);
        assert_eq!(strip_ansi(&highlighted), source);
        assert!(highlighted.starts_with(ansi::COMMENT));
    }

    #[test]
    fn test_candidate_json() {
        let candidate = Candidate::tag("set", sdf_lsp::completion::TagKind::Hook, true);
        let value = candidate_json(&candidate);
        assert_eq!(value["label"], "@set");
        assert_eq!(value["insert"], "set");
        assert_eq!(value["kind"], "hook");
    }

    #[test]
    fn test_workspace_types_honor_config() {
        let root = std::env::temp_dir().join(format!("sdf-cli-workspace-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&root);
        std::fs::create_dir_all(root.join("vendor")).unwrap();
        std::fs::write(root.join("car.sdf"), "package sample;\ntype Car {}").unwrap();
        std::fs::write(root.join("wheel.schema"), "package sample;\ntype Wheel {}").unwrap();
        std::fs::write(root.join("vendor/old.schema"), "package old;\ntype Old {}").unwrap();

        let names = |config: &SdfUserConfig| -> Vec<String> {
            workspace_types(&root, config)
                .unwrap()
                .into_iter()
                .map(|t| t.name)
                .collect()
        };
        assert_eq!(names(&SdfUserConfig::default()), vec!["Car"]);

        let config = SdfUserConfig {
            file_extensions: vec!["schema".to_string()],
            exclude: vec!["vendor".to_string()],
            ..SdfUserConfig::default()
        };
        assert_eq!(names(&config), vec!["Wheel"]);

        std::fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(CliError::Syntax { count: 2 }.exit_code(), EXIT_SYNTAX_ERROR);
        assert_eq!(CliError::Usage(String::new()).exit_code(), EXIT_USAGE_ERROR);
        assert_eq!(display_name("-"), "<stdin>");
    }
}

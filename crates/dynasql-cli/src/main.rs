//! dynasql CLI: offline checks over JSON fixtures and schema dumps.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dynasql_compare::to_json;
use dynasql_config::{CliOverrides, LibraryConfig};
use dynasql_keywords::AssertionKeywords;
use dynasql_types::Value;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "dynasql",
    version,
    about = "Compare DynamoDB SQL results against JSON fixtures"
)]
struct Cli {
    /// Settings file (overrides ~/.dynasql/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Default row key for ordering top-level elements
    #[arg(long, global = true)]
    order_by: Option<String>,

    /// Enable verbose/debug logging
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Restore a tagged JSON fixture and print its canonical form
    Restore {
        /// Fixture path, or `-` for stdin
        input: PathBuf,
    },
    /// Deep compare two fixtures and print -1, 0 or 1
    Compare { actual: PathBuf, expected: PathBuf },
    /// Fail unless two fixtures are deeply equal
    AssertEqual { actual: PathBuf, expected: PathBuf },
    /// Fail unless two schema dumps declare the same pieces
    DumpsEqual { dump1: PathBuf, dump2: PathBuf },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let log_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(io::stderr)
        .init();

    let config = load_config(cli.order_by, cli.config)?;
    let keywords = AssertionKeywords::new(config.order_by);

    match cli.command {
        Command::Restore { input } => {
            let value = load_fixture(&keywords, &input)?;
            let json = to_json(&value).context("Failed to serialize restored value")?;
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        Command::Compare { actual, expected } => {
            let actual = load_fixture(&keywords, &actual)?;
            let expected = load_fixture(&keywords, &expected)?;
            println!("{}", keywords.deep_compare(&actual, &expected, None));
        }
        Command::AssertEqual { actual, expected } => {
            let actual = load_fixture(&keywords, &actual)?;
            let expected_text = read_input(&expected)?;
            keywords.list_and_json_should_be_equal(&actual, &expected_text, None)?;
        }
        Command::DumpsEqual { dump1, dump2 } => {
            let dump1 = read_input(&dump1)?;
            let dump2 = read_input(&dump2)?;
            keywords.dumps_should_be_equal(&dump1, &dump2)?;
        }
    }
    Ok(())
}

fn load_config(order_by: Option<String>, config_file: Option<PathBuf>) -> Result<LibraryConfig> {
    let config = LibraryConfig::load(CliOverrides {
        region: None,
        order_by,
        config_file,
    })
    .context("Failed to load configuration")?;
    tracing::debug!(
        "Loaded config from {}: order_by={}",
        config.config_dir.display(),
        config.order_by
    );
    Ok(config)
}

fn load_fixture(keywords: &AssertionKeywords, path: &Path) -> Result<Value> {
    let text = read_input(path)?;
    keywords
        .json_loads(&text)
        .with_context(|| format!("Invalid fixture {}", path.display()))
}

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_compare_with_global_order_by() {
        let cli = Cli::try_parse_from([
            "dynasql", "compare", "a.json", "b.json", "--order-by", "key",
        ])
        .unwrap();
        assert_eq!(cli.order_by.as_deref(), Some("key"));
        assert!(matches!(cli.command, Command::Compare { .. }));
    }

    #[test]
    fn restore_accepts_stdin_marker() {
        let cli = Cli::try_parse_from(["dynasql", "restore", "-"]).unwrap();
        match cli.command {
            Command::Restore { input } => assert_eq!(input, PathBuf::from("-")),
            _ => panic!("expected restore"),
        }
    }

    #[test]
    fn broken_config_file_keeps_its_cause() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "[compare\norder_by = ").unwrap();

        let err = load_config(None, Some(path)).unwrap_err();
        assert_eq!(err.to_string(), "Failed to load configuration");
        let cause = err.chain().nth(1).unwrap().to_string();
        assert!(cause.starts_with("Config file parse error"), "{cause}");
    }

    #[test]
    fn explicit_order_by_wins() {
        let config = load_config(Some("pk".into()), None).unwrap();
        assert_eq!(config.order_by, "pk");
    }

    #[test]
    fn subcommand_is_required() {
        assert!(Cli::try_parse_from(["dynasql", "--verbose"]).is_err());
    }
}

//! CLI module - Command-line interface definitions and handlers

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde_json::Value;
use std::path::PathBuf;
use std::process::Command;

use readthru::core::paths::normalize_path;
use readthru::{CacheConfig, Codec, FileCache, Outcome, PrettyJsonCodec, StatPolicy, WriteMode};

/// readthru - cache the JSON output of a command, one file per key.
#[derive(Parser, Debug)]
#[command(name = "readthru")]
#[command(
    author,
    version,
    about,
    long_about = r#"readthru runs a command only when its result is not cached yet.

On the first call for a KEY the command runs, its stdout is parsed as JSON and
stored at <CACHE_DIR>/<KEY>.json. Later calls print the stored value without
running the command. Entries never expire: delete the file to refresh it.

Examples:
    readthru fetch weather -- curl -s https://example.com/weather.json
    readthru --cache-dir /tmp/cache fetch numbers -- echo "[1,2,3]"
    readthru path weather
"#
)]
pub struct Cli {
    /// Directory holding cache entries.
    #[arg(
        long,
        global = true,
        env = "READTHRU_CACHE_DIR",
        default_value = ".",
        value_name = "DIR",
        long_help = "Directory holding cache entries (defaults to the current directory).\n\n\
The directory must already exist; readthru never creates it."
    )]
    pub cache_dir: PathBuf,

    /// Entry encoding (json/json-pretty).
    #[arg(
        long,
        global = true,
        default_value = "json",
        value_parser = ["json", "json-pretty"],
        value_name = "CODEC",
        long_help = "Encoding used when writing new entries.\n\n\
Supported values:\n\
- json (default): compact JSON\n\
- json-pretty: indented JSON\n\n\
Both are read back the same way, so switching codecs keeps existing entries valid."
    )]
    pub codec: String,

    /// Write entries through a temporary file and rename.
    #[arg(
        long,
        global = true,
        long_help = "Write new entries to a temporary file in the cache directory and rename it\n\
into place, so concurrent readers never see a partially written entry."
    )]
    pub atomic: bool,

    /// Recompute when the existence check fails.
    #[arg(
        long,
        global = true,
        long_help = "By default an existence check that fails for a reason other than \"not found\"\n\
(for example permission denied) is reported as an error. With this flag the entry\n\
is treated as missing and the command runs."
    )]
    pub stat_as_miss: bool,

    /// Pretty-print the JSON written to stdout.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Disable colored output (when applicable).
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Quiet mode (no hit/miss status on stderr).
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging on stderr).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the cached value for KEY, running COMMAND on a miss.
    #[command(
        long_about = "Look KEY up in the cache directory. On a hit the stored JSON is printed.\n\
On a miss COMMAND runs once, its stdout must be valid JSON, and the value is\n\
stored and printed.\n\n\
A command that exits non-zero or prints invalid JSON is an error and nothing is\n\
stored. If the value cannot be stored it is still printed and a warning goes to\n\
stderr.\n\n\
Examples:\n\
  readthru fetch numbers -- echo \"[1,2,3]\"\n\
  readthru --atomic fetch repo -- gh api repos/rust-lang/rust\n"
    )]
    Fetch {
        /// Cache key (file name without extension).
        #[arg(value_name = "KEY")]
        key: String,

        /// Producer command and its arguments.
        #[arg(last = true, required = true, value_name = "COMMAND")]
        command: Vec<String>,
    },

    /// Print the entry path for KEY.
    Path {
        /// Cache key (file name without extension).
        #[arg(value_name = "KEY")]
        key: String,
    },
}

/// How fetched values are reported
#[derive(Debug, Clone, Copy)]
struct OutputOptions {
    pretty: bool,
    quiet: bool,
}

pub fn run(cli: Cli) -> Result<()> {
    if cli.no_color {
        colored::control::set_override(false);
    }

    let config = CacheConfig::new()
        .write_mode(if cli.atomic {
            WriteMode::Atomic
        } else {
            WriteMode::Direct
        })
        .stat_policy(if cli.stat_as_miss {
            StatPolicy::TreatAsMiss
        } else {
            StatPolicy::Surface
        });
    let output = OutputOptions {
        pretty: cli.pretty,
        quiet: cli.quiet,
    };

    match cli.command {
        Commands::Fetch { key, command } => match cli.codec.as_str() {
            "json-pretty" => {
                let cache =
                    FileCache::with_codec(&cli.cache_dir, PrettyJsonCodec).with_config(config);
                run_fetch(&cache, &key, &command, output)
            }
            _ => {
                let cache = FileCache::new(&cli.cache_dir).with_config(config);
                run_fetch(&cache, &key, &command, output)
            }
        },

        Commands::Path { key } => {
            let cache = FileCache::new(&cli.cache_dir);
            println!("{}", normalize_path(&cache.entry_path(&key)));
            Ok(())
        }
    }
}

fn run_fetch<C: Codec>(
    cache: &FileCache<C>,
    key: &str,
    command: &[String],
    output: OutputOptions,
) -> Result<()> {
    let path = normalize_path(&cache.entry_path(key));
    let outcome = cache
        .fetch(key, || run_producer(command))
        .with_context(|| format!("Failed to fetch '{}'", key))?;

    let value = match outcome {
        Outcome::Hit(value) => {
            if !output.quiet {
                eprintln!("{} {}", "hit".green(), path);
            }
            value
        }
        Outcome::Computed(value) => {
            if !output.quiet {
                eprintln!("{} {}", "miss".yellow(), path);
            }
            value
        }
        Outcome::Unpersisted { value, error } => {
            eprintln!("{} {:#}", "unpersisted".red(), anyhow::Error::from(error));
            value
        }
    };

    let rendered = if output.pretty {
        serde_json::to_string_pretty(&value)?
    } else {
        serde_json::to_string(&value)?
    };
    println!("{}", rendered);

    Ok(())
}

/// Run the producer command and parse its stdout as JSON
fn run_producer(command: &[String]) -> Result<Value> {
    let Some((program, args)) = command.split_first() else {
        bail!("No producer command given");
    };

    let output = Command::new(program)
        .args(args)
        .output()
        .with_context(|| format!("Failed to run '{}'", program))?;

    if !output.status.success() {
        bail!(
            "'{}' exited with {}: {}",
            program,
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    serde_json::from_slice(&output.stdout)
        .with_context(|| format!("'{}' did not print valid JSON", program))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_fetch() {
        let cli = Cli::try_parse_from([
            "readthru",
            "--cache-dir",
            "/tmp/cache",
            "fetch",
            "abc",
            "--",
            "echo",
            "[1]",
        ])
        .unwrap();

        assert_eq!(cli.cache_dir, PathBuf::from("/tmp/cache"));
        match cli.command {
            Commands::Fetch { key, command } => {
                assert_eq!(key, "abc");
                assert_eq!(command, vec!["echo", "[1]"]);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_cli_requires_producer_command() {
        assert!(Cli::try_parse_from(["readthru", "fetch", "abc"]).is_err());
    }

    #[test]
    fn test_cli_rejects_unknown_codec() {
        let parsed = Cli::try_parse_from(["readthru", "--codec", "yaml", "path", "abc"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_run_producer_parses_stdout() {
        let value = run_producer(&["echo".to_string(), "{\"a\":1}".to_string()]).unwrap();
        assert_eq!(value["a"], 1);
    }

    #[test]
    fn test_run_producer_rejects_failing_command() {
        assert!(run_producer(&["false".to_string()]).is_err());
    }

    #[test]
    fn test_run_producer_rejects_non_json() {
        assert!(run_producer(&["echo".to_string(), "not json".to_string()]).is_err());
    }
}

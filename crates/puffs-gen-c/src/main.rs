//! `puffs-gen-c` command line entry point.
//!
//! Reads one or more JSON package documents (or one from stdin), generates
//! a single C file and writes it to stdout or `--output`. Logs go to
//! stderr, filtered by `RUST_LOG`.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::Parser;
use puffs_gen_c::{compile, CompileResult, CompilerConfig};
use puffs_types::ast::Package;
use tracing::debug;

#[derive(Debug, Parser)]
#[command(name = "puffs-gen-c", version, about = "Generate C from a type-checked Puffs package")]
struct Cli {
    /// Package documents (JSON). Reads one from stdin when none are given.
    inputs: Vec<PathBuf>,

    /// Write the C file here instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// JSON config file; flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Formatter program.
    #[arg(long, value_name = "PROGRAM")]
    clang_format: Option<String>,

    /// Formatter style.
    #[arg(long)]
    style: Option<String>,

    /// Emit the generated text without running the formatter.
    #[arg(long)]
    no_format: bool,

    /// The PUFFS_VERSION token to compile in (decimal or 0x-prefixed hex).
    #[arg(long, value_name = "TOKEN", value_parser = parse_u32)]
    version_token: Option<u32>,

    /// Print a JSON compile result instead of the bare C file.
    #[arg(long)]
    json: bool,
}

fn parse_u32(s: &str) -> Result<u32, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid version token {s:?}: {e}"))
}

fn main() -> ExitCode {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .try_init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("puffs-gen-c: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Returns whether compilation succeeded.
fn run(cli: &Cli) -> Result<bool> {
    let config = load_config(cli)?;
    let pkg = load_package(&cli.inputs)?;
    debug!(package = %pkg.name, files = pkg.files.len(), "loaded package");

    if cli.json {
        let result = CompileResult::from_outcome(&pkg.name, compile(&pkg, &config));
        let mut text = serde_json::to_string_pretty(&result).context("serializing compile result")?;
        text.push('\n');
        write_output(cli.output.as_deref(), &text)?;
        return Ok(result.success);
    }

    let source = compile(&pkg, &config)
        .with_context(|| format!("generating C for package {:?}", pkg.name))?;
    write_output(cli.output.as_deref(), &source)?;
    Ok(true)
}

fn load_config(cli: &Cli) -> Result<CompilerConfig> {
    let mut config = match &cli.config {
        Some(path) => CompilerConfig::load(path)?,
        None => CompilerConfig::default(),
    };
    if let Some(program) = &cli.clang_format {
        config.formatter.program = program.clone();
    }
    if let Some(style) = &cli.style {
        config.formatter.style = style.clone();
    }
    if cli.no_format {
        config.formatter.enabled = false;
    }
    if let Some(version) = cli.version_token {
        config.gen.version = version;
    }
    Ok(config)
}

/// Decode every input and merge them into one package, in argument order.
fn load_package(inputs: &[PathBuf]) -> Result<Package> {
    if inputs.is_empty() {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("reading package from stdin")?;
        return serde_json::from_str(&text).context("decoding package from stdin");
    }

    let mut merged: Option<Package> = None;
    for path in inputs {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let pkg: Package = serde_json::from_str(&text)
            .with_context(|| format!("decoding package from {}", path.display()))?;
        merged = Some(match merged.take() {
            None => pkg,
            Some(mut m) => {
                m.extend(pkg)
                    .with_context(|| format!("merging {}", path.display()))?;
                m
            }
        });
    }
    match merged {
        Some(pkg) => Ok(pkg),
        None => bail!("no package documents given"),
    }
}

/// Write `text` in one go, only after generation fully succeeded.
fn write_output(path: Option<&Path>, text: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, text).with_context(|| format!("writing {}", path.display()))
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(text.as_bytes()).context("writing to stdout")?;
            stdout.flush().context("flushing stdout")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_token_accepts_hex_and_decimal() {
        assert_eq!(parse_u32("0x00001"), Ok(1));
        assert_eq!(parse_u32("0X1F"), Ok(31));
        assert_eq!(parse_u32("42"), Ok(42));
        assert!(parse_u32("0xZZ").is_err());
    }

    #[test]
    fn flags_override_config() {
        let cli = Cli::parse_from([
            "puffs-gen-c",
            "--style",
            "Google",
            "--no-format",
            "--version-token",
            "0x2",
            "a.json",
        ]);
        let config = load_config(&cli).unwrap();
        assert_eq!(config.formatter.style, "Google");
        assert!(!config.formatter.enabled);
        assert_eq!(config.gen.version, 2);
        assert_eq!(cli.inputs, [PathBuf::from("a.json")]);
    }
}

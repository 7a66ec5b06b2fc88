//! DocVault CLI — local build tool for the document portal.
//!
//! `docvault scan` regenerates the manifest from a documents directory, and
//! `docvault digest` produces the expected-digest constant for
//! `DOCVAULT_EXPECTED_DIGEST`. Neither command talks to a running server.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::fs;
use std::io::Read as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

use docvault_core::digest::credential_digest;
use docvault_core::manifest::scan_directory;

/// DocVault — password-gated document portal tooling.
#[derive(Parser)]
#[command(
    name = "docvault",
    version,
    about = "DocVault CLI — generate manifests and credential digests",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a documents directory and write the manifest JSON.
    Scan {
        /// Directory containing the documents (created if missing).
        #[arg(long, default_value = "docs")]
        docs_dir: PathBuf,
        /// Output path (default: `<docs-dir>/manifest.json`).
        #[arg(long)]
        output: Option<PathBuf>,
        /// Pretty-print the JSON output.
        #[arg(long)]
        pretty: bool,
    },
    /// Compute the SHA-256 hex digest of a credential.
    Digest {
        /// The credential to hash. Omit to read from stdin instead, which
        /// keeps it out of shell history.
        credential: Option<String>,
        /// Read the credential from stdin (trailing newline stripped).
        #[arg(long, conflicts_with = "credential")]
        stdin: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Scan {
            docs_dir,
            output,
            pretty,
        } => cmd_scan(&docs_dir, output, pretty),
        Commands::Digest { credential, stdin } => cmd_digest(credential, stdin),
    }
}

fn cmd_scan(docs_dir: &Path, output: Option<PathBuf>, pretty: bool) -> Result<()> {
    if !docs_dir.exists() {
        eprintln!("Directory not found, creating: {}", docs_dir.display());
        fs::create_dir_all(docs_dir)
            .with_context(|| format!("failed to create {}", docs_dir.display()))?;
    }

    let records = scan_directory(docs_dir)
        .with_context(|| format!("failed to scan {}", docs_dir.display()))?;

    let output = output.unwrap_or_else(|| docs_dir.join("manifest.json"));
    let json = if pretty {
        serde_json::to_vec_pretty(&records)?
    } else {
        serde_json::to_vec(&records)?
    };
    fs::write(&output, json)
        .with_context(|| format!("failed to write {}", output.display()))?;

    println!(
        "Generated manifest with {} documents at {}",
        records.len(),
        output.display()
    );
    Ok(())
}

fn cmd_digest(credential: Option<String>, stdin: bool) -> Result<()> {
    let credential = if stdin {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read credential from stdin")?;
        // Strip one trailing newline so `echo secret | docvault digest --stdin`
        // hashes the same bytes as `docvault digest secret`.
        buf.strip_suffix('\n').unwrap_or(&buf).to_owned()
    } else if let Some(credential) = credential {
        credential
    } else {
        bail!("provide a credential argument or pass --stdin");
    };

    println!("{}", credential_digest(&credential));
    Ok(())
}

//! ioc_parse - Validate OpenIOC documents and print their contents as JSON.
//!
//! Each input document is validated against the given XSD schema and, if
//! valid, its metadata and indicator items are written to stdout as one
//! JSON object per document. Directories are searched recursively for
//! `.ioc` and `.xml` files.
//!
//! # Usage
//!
//! ```bash
//! ioc_parse --schema <XSD> [OPTIONS] <PATH>...
//! ```
//!
//! # Examples
//!
//! ```bash
//! # Parse a single IOC
//! ioc_parse --schema ioc.xsd evil.ioc
//!
//! # Parse every IOC under a directory, one compact JSON line each
//! ioc_parse --schema ioc.xsd --compact iocs/ > indicators.jsonl
//!
//! # Print a one-line summary per document
//! ioc_parse --schema ioc.xsd --summary iocs/
//! ```
//!
//! A document that fails to validate or extract is reported on stderr and
//! skipped; the exit status is 1 if any document failed.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

use openioc_rs::{parse_with_config, Error, ParsedDocument, ParserConfig};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// File extensions picked up when walking a directory.
const IOC_EXTENSIONS: &[&str] = &["ioc", "xml"];

/// Validate OpenIOC documents and print their contents as JSON.
#[derive(Parser, Debug)]
#[command(name = "ioc_parse")]
#[command(version = VERSION)]
#[command(about = "Validate OpenIOC documents and print their contents as JSON")]
#[command(long_about = "Validates each OpenIOC document against an XSD schema and \
    writes its metadata and indicator items to stdout as JSON. Directories are \
    searched recursively for .ioc and .xml files.")]
struct Args {
    /// XSD schema to validate against
    #[arg(short, long, value_name = "XSD")]
    schema: PathBuf,

    /// IOC documents or directories containing them
    #[arg(required = true, value_name = "PATH")]
    paths: Vec<PathBuf>,

    /// Output compact JSON (one document per line)
    #[arg(long)]
    compact: bool,

    /// Print a one-line summary per document instead of JSON
    #[arg(long, conflicts_with = "compact")]
    summary: bool,

    /// Largest document to accept, in bytes (0 disables the limit)
    #[arg(long, value_name = "BYTES")]
    max_bytes: Option<u64>,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,
}

fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Expands directories into the IOC files beneath them, sorted by path.
fn collect_documents(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut documents = Vec::new();

    for path in paths {
        if !path.is_dir() {
            documents.push(path.clone());
            continue;
        }

        for entry in WalkDir::new(path).sort_by_file_name() {
            match entry {
                Ok(e) if e.file_type().is_file() && has_ioc_extension(e.path()) => {
                    documents.push(e.path().to_path_buf());
                }
                Ok(_) => {}
                Err(e) => error!("Error walking {}: {}", path.display(), e),
            }
        }
    }

    documents
}

fn has_ioc_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IOC_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
        .unwrap_or(false)
}

fn summary_line(path: &Path, parsed: &ParsedDocument) -> String {
    format!(
        "{}\t{}\t{} indicator(s)\t{}",
        path.display(),
        parsed.metadata().ioc_id,
        parsed.len(),
        parsed.categories().join(",")
    )
}

/// Message logged for a document that could not be parsed.
fn failure_message(e: &Error) -> String {
    if e.is_extraction_error() {
        format!("{} (document is schema-valid but not extractable)", e)
    } else {
        e.to_string()
    }
}

fn write_document(
    out: &mut impl Write,
    path: &Path,
    parsed: &ParsedDocument,
    args: &Args,
) -> Result<(), Box<dyn std::error::Error>> {
    if args.summary {
        writeln!(out, "{}", summary_line(path, parsed))?;
    } else if args.compact {
        serde_json::to_writer(&mut *out, parsed)?;
        writeln!(out)?;
    } else {
        serde_json::to_writer_pretty(&mut *out, parsed)?;
        writeln!(out)?;
    }
    Ok(())
}

fn run(args: &Args) -> Result<bool, Box<dyn std::error::Error>> {
    let config = match args.max_bytes {
        Some(0) => ParserConfig::unlimited(),
        Some(limit) => ParserConfig::new().with_max_document_bytes(limit),
        None => ParserConfig::default(),
    };

    let documents = collect_documents(&args.paths);
    debug!("Found {} document(s)", documents.len());

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut failures = 0usize;

    for path in &documents {
        match parse_with_config(&args.schema, path, &config) {
            Ok(parsed) => {
                info!("Parsed {} ({} indicators)", path.display(), parsed.len());
                write_document(&mut out, path, &parsed, args)?;
            }
            // A bad schema fails every document the same way
            Err(e @ Error::SchemaLoad { .. }) => return Err(e.into()),
            Err(e) => {
                error!("{}", failure_message(&e));
                failures += 1;
            }
        }
    }

    out.flush()?;
    if failures > 0 {
        error!("{} of {} document(s) failed", failures, documents.len());
    }
    Ok(failures == 0)
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.debug);

    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_has_ioc_extension() {
        assert!(has_ioc_extension(Path::new("a/b/evil.ioc")));
        assert!(has_ioc_extension(Path::new("EVIL.XML")));
        assert!(!has_ioc_extension(Path::new("notes.txt")));
        assert!(!has_ioc_extension(Path::new("README")));
    }

    #[test]
    fn test_failure_message_flags_extraction_errors() {
        let malformed = Error::MalformedIndicator {
            path: PathBuf::from("bad.ioc"),
            id: Some("i1".to_string()),
            reason: "expected at least 2 child elements, found 1".to_string(),
        };
        let msg = failure_message(&malformed);
        assert!(msg.starts_with(&malformed.to_string()));
        assert!(msg.ends_with("(document is schema-valid but not extractable)"));

        let invalid = Error::SchemaValidation {
            path: PathBuf::from("bad.ioc"),
            violations: vec!["missing definition".to_string()],
        };
        assert_eq!(failure_message(&invalid), invalid.to_string());
    }

    #[test]
    fn test_collect_documents_walks_directories() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("b.ioc"), "").unwrap();
        fs::write(dir.path().join("a.xml"), "").unwrap();
        fs::write(dir.path().join("skip.txt"), "").unwrap();
        fs::write(dir.path().join("nested/c.ioc"), "").unwrap();

        let explicit = PathBuf::from("explicit.txt");
        let found = collect_documents(&[dir.path().to_path_buf(), explicit.clone()]);

        assert_eq!(
            found,
            vec![
                dir.path().join("a.xml"),
                dir.path().join("b.ioc"),
                dir.path().join("nested/c.ioc"),
                explicit,
            ]
        );
    }
}

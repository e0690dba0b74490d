//! CLI command handler: resolve options, run the digest pipeline, print the map.

use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::collections::BTreeMap;
use std::io::Write;
use std::sync::Arc;
use std::time::Instant;

use crate::engine::arg_parser::Cli;
use crate::engine::hashing::{DigestBackend, digest_to_hex};
use crate::engine::progress::{create_counter, refresh_bar, update_progress_bar};
use crate::error::DigestError;
use crate::pipeline::CancelToken;
use crate::types::{DigestOpts, DigestReport, FileDigest, Strategy, WalkMode};
use crate::utils::{apply_file_to_opts, load_treedigest_toml, setup_logging};

/// Output settings that are not part of the library options.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OutputOpts {
    pub verbose: bool,
    pub json: bool,
}

/// Build options: defaults, then `.treedigest.toml` in DIR, then CLI flags.
pub fn resolve_opts(cli: &Cli) -> (DigestOpts, OutputOpts) {
    let mut opts = DigestOpts::default();
    let mut output = OutputOpts::default();
    if let Some(file) = load_treedigest_toml(&cli.dir) {
        apply_file_to_opts(&file, &mut opts);
        output.verbose = file.settings.verbose.unwrap_or(false);
        output.json = file.settings.json.unwrap_or(false);
    }
    if cli.bound.is_some() {
        opts.bound = cli.bound;
    }
    if let Some(serial) = cli.serial {
        opts.strategy = if serial {
            Strategy::Serial
        } else {
            Strategy::Bounded
        };
    }
    if let Some(parallel) = cli.parallel_walk {
        opts.walk_mode = if parallel {
            WalkMode::Parallel
        } else {
            WalkMode::Serial
        };
    }
    if let Some(v) = cli.follow_links {
        opts.follow_links = v;
    }
    if !cli.exclude.is_empty() {
        opts.exclude = cli.exclude.clone();
    }
    if let Some(v) = cli.relative {
        opts.relative_paths = v;
    }
    if let Some(v) = cli.skip_walk_errors {
        opts.skip_walk_errors = v;
    }
    if let Some(v) = cli.verbose {
        output.verbose = v;
    }
    if let Some(v) = cli.json {
        output.json = v;
    }
    (opts, output)
}

/// Write the map to `out`, sorted by path: `<hex>  <path>` lines, or one JSON object.
pub fn write_report<W: Write>(out: &mut W, report: &DigestReport, json: bool) -> Result<()> {
    let sorted: BTreeMap<String, String> = report
        .digests
        .iter()
        .map(|(p, d)| (p.display().to_string(), digest_to_hex(d)))
        .collect();
    if json {
        serde_json::to_writer_pretty(&mut *out, &sorted).context("serialize digests")?;
        writeln!(out)?;
    } else {
        for (path, hex) in &sorted {
            writeln!(out, "{}  {}", hex, path)?;
        }
    }
    out.flush()?;
    Ok(())
}

/// Digest `cli.dir` and print the result. Ctrl+C cancels the run.
pub fn handle_run(cli: &Cli) -> Result<()> {
    let (opts, output) = resolve_opts(cli);
    setup_logging(output.verbose);

    let cancel = CancelToken::new();
    let cancel_handler = cancel.clone();
    ctrlc::set_handler(move || cancel_handler.cancel()).context("set Ctrl+C handler")?;

    let bar = output.verbose.then(|| create_counter("Digesting"));
    let on_result = bar.as_ref().map(|bar| {
        let bar = Arc::clone(bar);
        move |_: &FileDigest| update_progress_bar(&bar, 1)
    });

    debug!("Digesting {}...", cli.dir.display());
    let start = Instant::now();
    let result = crate::digest_tree_with(
        &cli.dir,
        &opts,
        &cancel,
        &DigestBackend::default(),
        on_result,
    );
    if let Some(bar) = &bar {
        refresh_bar(bar);
        eprintln!();
    }

    let report = match result {
        Ok(report) => report,
        Err(DigestError::Cancelled(partial)) => {
            anyhow::bail!("Cancelled by user after {} files", partial.len());
        }
        Err(e) => return Err(e).with_context(|| format!("digest {}", cli.dir.display())),
    };

    let stdout = std::io::stdout();
    write_report(&mut stdout.lock(), &report, output.json)?;

    info!(
        "digested {} files in {} ms ({} workers)",
        report.digests.len(),
        start.elapsed().as_millis(),
        report.bound
    );
    if output.verbose {
        for (p, msg) in &report.skipped {
            eprintln!("  skipped: {} ({})", p.display(), msg);
        }
    } else if !report.skipped.is_empty() {
        warn!("Use --verbose to list skipped files");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::path::PathBuf;

    #[test]
    fn test_resolve_opts_cli_over_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(".treedigest.toml"),
            "[settings]\nbound = 2\nrelative = true\njson = true\n",
        )
        .unwrap();
        let dir_arg = dir.path().to_string_lossy().to_string();
        let cli = Cli::parse_from(["treedigest", dir_arg.as_str(), "-j", "5"]);
        let (opts, output) = resolve_opts(&cli);
        assert_eq!(opts.bound, Some(5));
        assert!(opts.relative_paths);
        assert!(output.json);
        assert!(!output.verbose);
    }

    #[test]
    fn test_write_report_lines_sorted() {
        let mut report = DigestReport::default();
        report.digests.insert(PathBuf::from("b"), [0u8; 32]);
        report.digests.insert(PathBuf::from("a"), [0xffu8; 32]);
        let mut out = Vec::new();
        write_report(&mut out, &report, false).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("  a"));
        assert!(lines[0].starts_with("ffff"));
        assert!(lines[1].ends_with("  b"));
    }

    #[test]
    fn test_write_report_json() {
        let mut report = DigestReport::default();
        report.digests.insert(PathBuf::from("x.txt"), [0u8; 32]);
        let mut out = Vec::new();
        write_report(&mut out, &report, true).unwrap();
        let v: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(v["x.txt"], serde_json::Value::String("0".repeat(64)));
    }
}

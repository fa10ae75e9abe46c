//! Main entry point for the bundlezip CLI.
//!
//! This binary provides a command-line interface for listing and
//! extracting members of app bundle archives and other ZIP containers.

use anyhow::{Context, Result};
use clap::Parser;
use std::collections::HashSet;
use std::io::Write;
use std::path::Path;

use bundlezip::{Cli, FileKind, ZipArchive, ZipEntry};

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let archive = ZipArchive::open(Path::new(&cli.file))
        .with_context(|| format!("cannot read {}", cli.file))?
        .verify_checksums(!cli.no_verify);

    // List mode: display archive contents and exit
    if cli.list || cli.verbose {
        return list_entries(&archive, cli.verbose);
    }

    // Extract mode: resolve which members to extract.
    // 1. Skip directories (they are created automatically during extraction)
    // 2. If member paths are given, select by exact or suffix lookup
    let selected: Vec<&ZipEntry> = if cli.paths.is_empty() {
        archive.entries().iter().filter(|e| !e.is_dir).collect()
    } else {
        let mut seen = HashSet::new();
        let mut selected = Vec::new();
        for pattern in &cli.paths {
            let matches = archive.lookup(pattern, cli.exact);
            if matches.is_empty() && !cli.is_quiet() {
                eprintln!("no entry matching: {pattern}");
            }
            for entry in matches {
                if !entry.is_dir && seen.insert(entry.path.as_str()) {
                    selected.push(entry);
                }
            }
        }
        selected
    };

    let multiple_files = cli.pipe && selected.len() > 1;
    for entry in selected {
        extract_entry(&archive, entry, &cli, multiple_files)?;
    }

    Ok(())
}

/// List entries of the archive.
///
/// Supports two output formats:
/// - Simple format (`-l`): Just member paths, one per line
/// - Verbose format (`-v`): Detailed table with sizes, compression ratio
///   and timestamps, plus the detected archive kind
fn list_entries(archive: &ZipArchive, verbose: bool) -> Result<()> {
    if verbose {
        if let Some(kind) = FileKind::from_path(archive.source()) {
            println!("Archive kind: {kind:?}");
        }
        println!(
            "{:>10}  {:>10}  {:>5}  {:>10}  {:>5}  Name",
            "Length", "Size", "Cmpr", "Date", "Time"
        );
        println!("{}", "-".repeat(70));
    }

    // Track totals for summary line
    let mut total_uncompressed = 0u64;
    let mut total_compressed = 0u64;
    let mut file_count = 0usize;

    for entry in archive.entries() {
        if verbose {
            let (year, month, day) = entry.date();
            let (hour, minute, _second) = entry.time();

            // Compression ratio as percentage saved
            let ratio = if entry.uncompressed_size > 0 {
                format!(
                    "{:>4}%",
                    100 - (entry.compressed_size * 100 / entry.uncompressed_size)
                )
            } else {
                "  0%".to_string()
            };

            println!(
                "{:>10}  {:>10}  {}  {:04}-{:02}-{:02}  {:02}:{:02}  {}",
                entry.uncompressed_size,
                entry.compressed_size,
                ratio,
                year,
                month,
                day,
                hour,
                minute,
                entry.path
            );

            if !entry.is_dir {
                total_uncompressed += entry.uncompressed_size;
                total_compressed += entry.compressed_size;
                file_count += 1;
            }
        } else {
            println!("{}", entry.path);
        }
    }

    if verbose {
        println!("{}", "-".repeat(70));
        let total_ratio = if total_uncompressed > 0 {
            format!(
                "{:>4}%",
                100 - (total_compressed * 100 / total_uncompressed)
            )
        } else {
            "  0%".to_string()
        };
        println!(
            "{:>10}  {:>10}  {}  {:>21}  {} files",
            total_uncompressed, total_compressed, total_ratio, "", file_count
        );
    }

    Ok(())
}

/// Extract a single member, to stdout in pipe mode or below the target
/// directory otherwise.
fn extract_entry(
    archive: &ZipArchive,
    entry: &ZipEntry,
    cli: &Cli,
    show_filename: bool,
) -> Result<()> {
    // Pipe mode: write member contents directly to stdout
    if cli.pipe {
        let data = archive
            .extract_to_memory(entry)
            .with_context(|| format!("failed to extract {}", entry.path))?;
        let mut stdout = std::io::stdout().lock();
        if show_filename {
            writeln!(stdout, "--- {} ---", entry.path)?;
        }
        stdout.write_all(&data)?;
        return Ok(());
    }

    if !cli.is_quiet() {
        println!("  extracting: {}", entry.path);
    }

    let target = cli.extract_dir.as_deref().unwrap_or(".");
    archive
        .extract_to_directory(entry, Path::new(target))
        .with_context(|| format!("failed to extract {}", entry.path))?;

    Ok(())
}

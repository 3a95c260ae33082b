use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

use profile_parser::capture::refined_name;
use profile_parser::store::{JsonFileStore, ProfileStore, SqliteStore};
use profile_parser::{Capture, CaptureSection, ParsedSection, ParserConfig, ProfileParser};

#[derive(Parser)]
#[command(name = "profile_parser", about = "Structured records from captured profile and feed text")]
struct Cli {
    /// Settings file layered under PROFILE_PARSER_* variables
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse capture files and print the records as JSON
    Parse {
        /// Section of every file (default: inferred from each file name)
        #[arg(short, long)]
        section: Option<CaptureSection>,
        /// Display name of the profile owner
        #[arg(short, long, default_value = "")]
        name: String,
        /// Store key (default: derived from the name)
        #[arg(short = 'k', long)]
        profile_key: Option<String>,
        /// Merge results into JSON documents under this directory
        #[arg(long, conflicts_with = "sqlite")]
        store: Option<PathBuf>,
        /// Merge results into this SQLite database
        #[arg(long)]
        sqlite: Option<PathBuf>,
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Per-file block counts, record counts and rule hits
    Inspect {
        #[arg(short, long)]
        section: Option<CaptureSection>,
        #[arg(short, long, default_value = "")]
        name: String,
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

#[derive(Serialize)]
struct FileOutput {
    file: String,
    #[serde(flatten)]
    parsed: ParsedSection,
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let t0 = Instant::now();
    let cli = Cli::parse();

    let config = ParserConfig::load(cli.config.as_deref()).context("loading parser settings")?;
    let parser = ProfileParser::new(config).context("building parser")?;

    match cli.command {
        Commands::Parse {
            section,
            name,
            profile_key,
            store,
            sqlite,
            files,
        } => {
            let key = profile_key.unwrap_or_else(|| profile_key_from(&name));
            let captures = read_captures(&files, section, &key)?;
            let (parsed, name) = parse_all(&parser, &captures, &name)?;
            info!(files = parsed.len(), name = %name, "parsed captures");

            let target: Option<Box<dyn ProfileStore>> = match (store, sqlite) {
                (Some(dir), _) => {
                    let store = JsonFileStore::new(dir);
                    info!(dir = %store.dir().display(), "merging into JSON documents");
                    Some(Box::new(store))
                }
                (None, Some(db)) => Some(Box::new(
                    SqliteStore::open(&db).with_context(|| format!("opening {}", db.display()))?,
                )),
                (None, None) => None,
            };
            if let Some(target) = target {
                if key.is_empty() {
                    bail!("a profile key (or --name) is required to merge into a store");
                }
                let stats = target
                    .merge_all(&key, parsed.clone())
                    .with_context(|| format!("merging into the store for {key:?}"))?;
                eprintln!("Store: {} added, {} replaced", stats.added, stats.replaced);
            }

            let outputs: Vec<FileOutput> = files
                .iter()
                .zip(parsed)
                .map(|(path, parsed)| FileOutput {
                    file: path.display().to_string(),
                    parsed,
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&outputs)?);
        }
        Commands::Inspect { section, name, files } => {
            let captures = read_captures(&files, section, &profile_key_from(&name))?;
            for (path, capture) in files.iter().zip(&captures) {
                inspect(&parser, path, capture, &name);
            }
        }
    }

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        eprintln!("Done in {}", format_duration(elapsed));
    }
    Ok(())
}

fn read_captures(files: &[PathBuf], section: Option<CaptureSection>, key: &str) -> Result<Vec<Capture>> {
    files
        .iter()
        .map(|path| {
            let section = match section {
                Some(s) => s,
                None => infer_section(path)
                    .with_context(|| format!("cannot tell the section of {}; pass --section", path.display()))?,
            };
            let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
            Ok(Capture::new(key, section, text))
        })
        .collect()
}

/// Profiles first (they can refine the display name), then the feeds in parallel.
fn parse_all(parser: &ProfileParser, captures: &[Capture], name: &str) -> Result<(Vec<ParsedSection>, String)> {
    let mut name = name.to_string();
    let mut parsed: Vec<Option<ParsedSection>> = vec![None; captures.len()];

    for (i, capture) in captures.iter().enumerate() {
        if capture.section == CaptureSection::Profile {
            let result = parser.parse_capture(capture, &name);
            name = refined_name(&name, &result);
            parsed[i] = Some(result);
        }
    }

    let feed_count = parsed.iter().filter(|p| p.is_none()).count();
    let pb = ProgressBar::new(feed_count as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")?
            .progress_chars("#>-"),
    );
    let feeds: Vec<(usize, ParsedSection)> = captures
        .par_iter()
        .enumerate()
        .filter(|(_, c)| c.section != CaptureSection::Profile)
        .map(|(i, capture)| {
            let result = parser.parse_capture(capture, &name);
            pb.inc(1);
            (i, result)
        })
        .collect();
    pb.finish_and_clear();

    for (i, result) in feeds {
        parsed[i] = Some(result);
    }
    Ok((parsed.into_iter().flatten().collect(), name))
}

fn inspect(parser: &ProfileParser, path: &Path, capture: &Capture, name: &str) {
    let blocks = parser.blocks_for(capture.section, &capture.text).len();
    let parsed = parser.parse_capture(capture, name);

    let mut hits: BTreeMap<(&str, &str), usize> = BTreeMap::new();
    for p in parsed.provenance() {
        *hits.entry((p.field.as_str(), p.rule.as_str())).or_default() += 1;
    }

    println!("{} [{}]", path.display(), capture.section);
    if capture.section != CaptureSection::Profile {
        println!("  delimiter: {}", parser.config().activity_delimiter);
    }
    println!("  blocks:  {blocks}");
    println!("  records: {}", parsed.len());
    if capture.section != CaptureSection::Profile && blocks > 0 && parsed.is_empty() {
        warn!(
            file = %path.display(),
            blocks,
            delimiter = %parser.config().activity_delimiter,
            "no records recognized; check the name and the section"
        );
    }
    println!("  {:<28} | {:<28} | {:>5}", "field", "rule", "hits");
    println!("  {}", "-".repeat(67));
    for ((field, rule), count) in &hits {
        println!("  {:<28} | {:<28} | {:>5}", truncate(field, 28), truncate(rule, 28), count);
    }
}

fn infer_section(path: &Path) -> Option<CaptureSection> {
    let stem = path.file_stem()?.to_str()?.to_lowercase();
    [
        ("comment", CaptureSection::Comments),
        ("reaction", CaptureSection::Reactions),
        ("post", CaptureSection::Posts),
        ("activit", CaptureSection::Posts),
        ("share", CaptureSection::Posts),
        ("profile", CaptureSection::Profile),
        ("about", CaptureSection::Profile),
    ]
    .into_iter()
    .find(|(needle, _)| stem.contains(needle))
    .map(|(_, section)| section)
}

fn profile_key_from(name: &str) -> String {
    let slug: String = name
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    slug.split('-').filter(|s| !s.is_empty()).collect::<Vec<_>>().join("-")
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max - 3).collect();
        format!("{}...", truncated)
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}

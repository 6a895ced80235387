// SPDX-License-Identifier: PMPL-1.0-or-later

//! ts-catalog: inspect, check and repair Qt Linguist translation catalogs

use anyhow::{bail, Context as _, Result};
use clap::{Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use ts_catalog::report::{self, OutputFormat, ReportFormatter};
use ts_catalog::scan::{self, ScanConfig};
use ts_catalog::{active, lint, mojibake, stats, ts};
use ts_catalog::{Catalog, LoadOptions, LoaderConfig, SwitchOutcome, Translator};

#[derive(Parser)]
#[command(name = "ts-catalog")]
#[command(version)]
#[command(about = "Load, resolve and check Qt Linguist .ts translation catalogs")]
#[command(long_about = None)]
struct Cli {
    /// Loader configuration (YAML or JSON)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only print findings and results
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve one message the way the application would
    Resolve {
        /// Catalogs to stack, later files take priority. Without any, the
        /// configured modules are loaded for --language
        #[arg(value_name = "CATALOG")]
        catalogs: Vec<PathBuf>,

        #[arg(long)]
        context: String,

        #[arg(long)]
        source: String,

        /// Disambiguation comment
        #[arg(long, default_value = "")]
        comment: String,

        /// Language to load from the configured search paths
        #[arg(short, long)]
        language: Option<String>,
    },

    /// Coverage statistics for one catalog
    Stats {
        #[arg(value_name = "CATALOG")]
        catalog: PathBuf,

        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Include a per-context breakdown
        #[arg(long)]
        contexts: bool,
    },

    /// Check catalogs for malformed entries, conflicts, mojibake and
    /// placeholder mismatches
    Check {
        #[arg(value_name = "CATALOG", required = true)]
        catalogs: Vec<PathBuf>,

        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Rewrite a catalog with double-encoded UTF-8 repaired
    Repair {
        #[arg(value_name = "CATALOG")]
        catalog: PathBuf,

        #[arg(short, long)]
        output: PathBuf,
    },

    /// Coverage of every .ts file below a directory
    Scan {
        #[arg(value_name = "DIR")]
        directory: PathBuf,

        /// Only this language (`pl`, `zh_CN`)
        #[arg(short, long)]
        language: Option<String>,

        /// Only catalogs below this completion percentage
        #[arg(long, value_name = "PERCENT")]
        below: Option<f32>,

        /// Write the JSON report here
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Dump a catalog as JSON or YAML
    Export {
        #[arg(value_name = "CATALOG")]
        catalog: PathBuf,

        /// Defaults to the --output extension, else JSON
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Write here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = LoaderConfig::load_or_default(cli.config.as_deref())
        .context("reading loader configuration")?;
    let formatter = ReportFormatter::new().quiet(cli.quiet);

    match cli.command {
        Commands::Resolve {
            catalogs,
            context,
            source,
            comment,
            language,
        } => {
            let text = if catalogs.is_empty() {
                resolve_configured(&config, language, &context, &source, &comment, cli.quiet)?
            } else {
                let translator = stack_catalogs(&catalogs, &config.options)?;
                translator
                    .resolve_disambiguated(&context, &source, &comment)
                    .to_string()
            };
            println!("{}", text);
        }

        Commands::Stats {
            catalog,
            format,
            contexts,
        } => {
            let loaded = ts::load(&catalog, &config.options)
                .with_context(|| format!("loading {}", catalog.display()))?;
            let stats = stats::compute(&loaded.document, contexts);
            match format {
                OutputFormat::Text => formatter.print_stats(&stats),
                _ => println!("{}", format.serialize(&stats)?),
            }
        }

        Commands::Check { catalogs, format } => {
            let reports = lint::check_files(&catalogs);
            match format {
                OutputFormat::Text => {
                    for report in &reports {
                        formatter.print_lint(report);
                    }
                }
                _ => println!("{}", format.serialize(&reports)?),
            }
            let errors: usize = reports.iter().map(|r| r.errors()).sum();
            if errors > 0 {
                bail!("{} error(s) in {} catalog(s)", errors, catalogs.len());
            }
        }

        Commands::Repair { catalog, output } => {
            let repaired = repair_file(&catalog, &output)?;
            if !cli.quiet {
                println!(
                    "Repaired {} string(s); written to {}",
                    repaired,
                    output.display()
                );
            }
        }

        Commands::Scan {
            directory,
            language,
            below,
            output,
        } => {
            let report = scan::run(&ScanConfig {
                directory,
                language,
                below_percent: below,
                options: config.options,
            })?;
            scan::print_summary(&report, cli.quiet);
            if let Some(path) = output {
                scan::write_report(&report, &path)?;
                if !cli.quiet {
                    println!("Report saved to: {}", path.display());
                }
            }
        }

        Commands::Export {
            catalog,
            format,
            output,
        } => {
            let loaded = ts::load(&catalog, &config.options)
                .with_context(|| format!("loading {}", catalog.display()))?;
            let format = format.unwrap_or_else(|| OutputFormat::for_output(output.as_deref()));
            match (format, output) {
                (OutputFormat::Text, _) => formatter.print_document(&loaded.document),
                (format, Some(path)) => {
                    report::save(&loaded.document, format, &path)?;
                    if !cli.quiet {
                        println!("Exported to: {}", path.display());
                    }
                }
                (format, None) => println!("{}", format.serialize(&loaded.document)?),
            }
        }
    }

    Ok(())
}

/// Stack the given files into one translator, in order
fn stack_catalogs(paths: &[PathBuf], options: &LoadOptions) -> Result<Translator> {
    let mut translator: Option<Translator> = None;
    for path in paths {
        let (catalog, _) = Catalog::load(path, options)
            .with_context(|| format!("loading {}", path.display()))?;
        let base = translator.unwrap_or_else(|| Translator::empty(catalog.language()));
        translator = Some(base.with_catalog(catalog));
    }
    translator.context("no catalogs given")
}

/// Switch the process-wide locale from the configuration and translate
/// through it
fn resolve_configured(
    config: &LoaderConfig,
    language: Option<String>,
    context: &str,
    source: &str,
    comment: &str,
    quiet: bool,
) -> Result<String> {
    let Some(language) = language.or_else(|| config.language.clone()) else {
        bail!("no catalogs given and no language selected (use --language or a config file)");
    };
    let locale = active::global();
    if let SwitchOutcome::FellBack { error, .. } = locale.switch_or_empty(config, &language) {
        if !quiet {
            eprintln!("{} {}", "warning:".yellow().bold(), error);
        }
    }
    Ok(locale.tr_disambiguated(context, source, comment))
}

/// Verbatim load, repair every message body, write back out
fn repair_file(input: &Path, output: &Path) -> Result<usize> {
    let mut loaded = ts::load(input, &LoadOptions::verbatim())
        .with_context(|| format!("loading {}", input.display()))?;
    let repaired = mojibake::repair_document(&mut loaded.document);
    ts::write_file(&loaded.document, output)
        .with_context(|| format!("writing {}", output.display()))?;
    Ok(repaired)
}

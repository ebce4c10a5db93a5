use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use docfid::config::Config;
use docfid::document::{UnitOptions, extract_structure_with, units_from_structure, write_json};
use docfid::reinject::{SheetOptions, TranslationMap, apply_sheet_translation_map_with, read_map_file, sheet_entries};
use docfid::validate::{ReportOptions, markdown};
use docfid::{FileKind, apply_translation_map, delta_from_files};

#[derive(Parser)]
#[command(name = "docfid")]
#[command(version)]
#[command(about = "Structure extraction, diffing and formatting fidelity for .docx and .xlsx files")]
struct Cli {
    /// Configuration file (defaults to the user config directory)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log progress to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract the structure snapshot of a document
    Extract {
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Also write the result to this JSON file
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Emit translation units instead of the snapshot
        #[arg(long)]
        units: bool,

        /// Stop after this many units
        #[arg(long, requires = "units")]
        max_units: Option<usize>,
    },

    /// Build the numbered section tree and chunks of a document
    Sections {
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        #[arg(long)]
        max_chars: Option<usize>,

        #[arg(long)]
        overlap: Option<usize>,

        /// Store the result next to the document
        #[arg(long)]
        sidecar: bool,
    },

    /// Compare two versions of a document
    Delta {
        #[arg(long)]
        job_id: String,

        /// Old version (.docx or structure JSON)
        #[arg(long, value_name = "FILE")]
        v1: PathBuf,

        /// New version (.docx or structure JSON)
        #[arg(long, value_name = "FILE")]
        v2: PathBuf,

        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Check that a translation kept the original formatting
    Validate {
        #[arg(long, value_name = "FILE")]
        original: PathBuf,

        #[arg(long, value_name = "FILE")]
        translated: PathBuf,

        /// JSON result file
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Markdown report file
        #[arg(long, value_name = "FILE")]
        report: Option<PathBuf>,

        #[arg(long, value_enum, default_value = "json")]
        format: ReportFormat,
    },

    /// Write translated text back into a copy of the source document
    Reinject {
        #[arg(long, value_name = "FILE")]
        template: PathBuf,

        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        /// Translation map JSON
        #[arg(long, value_name = "FILE")]
        map: PathBuf,

        /// Wrap translated spreadsheet text and raise its rows to 20pt
        #[arg(long)]
        beautify: bool,
    },

    /// Write the default configuration file
    InitConfig,
}

#[derive(ValueEnum, Clone, Copy, PartialEq, Eq)]
enum ReportFormat {
    Json,
    Markdown,
    Both,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();

    match run(cli) {
        Ok(data) => {
            println!("{}", json!({ "ok": true, "data": data }));
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", json!({ "ok": false, "error": format!("{e:#}") }));
            ExitCode::from(2)
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    let mut config = match path {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("Failed to load config file {}", path.display()))?,
        None => Config::load().context("Failed to load config")?,
    };
    config.validation.apply_env();
    Ok(config)
}

fn to_value<T: Serialize>(value: &T) -> Result<serde_json::Value> {
    Ok(serde_json::to_value(value)?)
}

fn save<T: Serialize>(output: Option<&Path>, value: &T) -> Result<()> {
    if let Some(path) = output {
        write_json(path, value).with_context(|| format!("Failed to write {}", path.display()))?;
    }
    Ok(())
}

fn run(cli: Cli) -> Result<serde_json::Value> {
    match cli.command {
        Commands::InitConfig => {
            let path = Config::init_default()?;
            Ok(json!({ "config_path": path }))
        }
        command => {
            let config = load_config(cli.config.as_deref())?;
            run_command(command, config)
        }
    }
}

fn run_command(command: Commands, mut config: Config) -> Result<serde_json::Value> {
    match command {
        Commands::InitConfig => Config::init_default()
            .map(|path| json!({ "config_path": path }))
            .map_err(Into::into),

        Commands::Extract {
            input,
            output,
            units,
            max_units,
        } => {
            let structure = extract_structure_with(&input, &config.extract)?;
            let data = if units {
                let options = UnitOptions {
                    max_units,
                    max_chars_per_unit: config.extract.max_chars_per_unit,
                    ..UnitOptions::default()
                };
                to_value(&units_from_structure(&structure, &options))?
            } else {
                to_value(&structure)?
            };
            save(output.as_deref(), &data)?;
            Ok(data)
        }

        Commands::Sections {
            input,
            output,
            max_chars,
            overlap,
            sidecar,
        } => {
            if let Some(max_chars) = max_chars {
                config.sections.max_chars = max_chars;
            }
            if let Some(overlap) = overlap {
                config.sections.overlap_chars = overlap;
            }

            let policy = if sidecar {
                let (policy, path) = docfid::sections::write_sidecar(&input, &config.sections)?;
                log::info!("sidecar written to {}", path.display());
                policy
            } else {
                docfid::extract_policy_structure(&input, &config.sections)?
            };
            save(output.as_deref(), &policy)?;
            to_value(&policy)
        }

        Commands::Delta {
            job_id,
            v1,
            v2,
            output,
        } => {
            let pack = delta_from_files(&job_id, &v1, &v2, &config.delta)?;
            save(output.as_deref(), &pack)?;
            to_value(&pack)
        }

        Commands::Validate {
            original,
            translated,
            output,
            report,
            format,
        } => {
            let result = docfid::validate_file_pair(&original, &translated, &config.validation)?;

            if matches!(format, ReportFormat::Json | ReportFormat::Both) {
                save(output.as_deref(), &result)?;
            }
            if matches!(format, ReportFormat::Markdown | ReportFormat::Both) {
                let text = markdown(std::slice::from_ref(&result), &ReportOptions::default())?;
                match report {
                    Some(path) => fs::write(&path, text)
                        .with_context(|| format!("Failed to write report {}", path.display()))?,
                    None => eprintln!("{text}"),
                }
            }
            to_value(&result)
        }

        Commands::Reinject {
            template,
            output,
            map,
            beautify,
        } => {
            let payload = read_map_file(&map)?;
            match FileKind::from_path(&template)? {
                FileKind::Document => {
                    if beautify {
                        log::warn!("--beautify only applies to spreadsheets");
                    }
                    let map = TranslationMap::from_json(&payload);
                    to_value(&apply_translation_map(&template, &output, &map)?)
                }
                FileKind::Grid => {
                    let entries = sheet_entries(&payload);
                    let options = SheetOptions { beautify };
                    to_value(&apply_sheet_translation_map_with(&template, &output, &entries, &options)?)
                }
            }
        }
    }
}

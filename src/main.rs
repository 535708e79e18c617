//! resume – command-line front end for the resume builder.
//!
//! Usage:
//!   resume sample                       seed the store with an example resume
//!   resume import <resume.json>         replace the stored resume
//!   resume show                         print the stored resume as JSON
//!   resume template <modern|classic|creative>
//!   resume preview [--out page.html] [--template name]
//!   resume export [--out-dir dir] [--template name]
//!
//! The resume snapshot lives in `--data-dir` (default: the platform data
//! directory) under the `resumeData` key.

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};

use resume_forge::dom::Theme;
use resume_forge::pipeline::{ExportConfig, Exporter, FileDelivery};
use resume_forge::storage::FileStorage;
use resume_forge::templates::{preview_document, PreviewMode};
use resume_forge::{ResumeData, ResumeStore, TemplateId};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Export settings (JSON); missing fields take defaults
    #[arg(short, long, env = "RESUME_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding the saved resume
    #[arg(long, env = "RESUME_DATA_DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replace the stored resume with a populated example
    Sample,
    /// Replace the stored resume with a JSON snapshot
    Import { file: PathBuf },
    /// Print the stored resume
    Show,
    /// Choose the template used for preview and export
    Template { name: String },
    /// Write the preview page as HTML
    Preview {
        #[arg(short, long)]
        out: Option<PathBuf>,
        #[arg(short, long)]
        template: Option<String>,
        /// Render as the scaled editor side panel
        #[arg(long)]
        panel: bool,
    },
    /// Export the resume as a one-page A4 PDF
    Export {
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,
        #[arg(short, long)]
        template: Option<String>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    env_logger::init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let data_dir = match cli.data_dir {
        Some(dir) => dir,
        None => default_data_dir()?,
    };
    let mut storage = FileStorage::open(&data_dir)
        .with_context(|| format!("opening data directory '{}'", data_dir.display()))?;
    let mut store = ResumeStore::load(&storage).context("loading saved resume")?;

    match cli.command {
        Commands::Sample => {
            store.replace(resume_forge::samples::sample_resume());
            store.save(&mut storage)?;
            println!("Stored sample resume in {}", storage.dir().display());
        }
        Commands::Import { file } => {
            let json = fs::read_to_string(&file)
                .with_context(|| format!("reading '{}'", file.display()))?;
            let data = ResumeData::from_json(&json)
                .with_context(|| format!("'{}' is not a resume snapshot", file.display()))?;
            store.replace(data);
            store.save(&mut storage)?;
            println!("Imported '{}'", file.display());
        }
        Commands::Show => {
            println!("{}", store.snapshot().to_json()?);
        }
        Commands::Template { name } => {
            let template = TemplateId::parse(&name);
            if template.as_str() != name {
                log::warn!("Unknown template '{name}', using {template}");
            }
            store.set_template(template);
            store.save(&mut storage)?;
            println!("Template set to {template}");
        }
        Commands::Preview {
            out,
            template,
            panel,
        } => {
            let data = with_template(store.snapshot(), template.as_deref());
            let mode = if panel {
                PreviewMode::Panel
            } else {
                PreviewMode::FullPage
            };
            let html = preview_document(&data, mode, Theme::Light).to_html();
            match out {
                Some(path) => {
                    fs::write(&path, html)
                        .with_context(|| format!("writing '{}'", path.display()))?;
                    println!("Wrote preview to {}", path.display());
                }
                None => print!("{html}"),
            }
        }
        Commands::Export { out_dir, template } => {
            let config = load_config(cli.config.as_deref())?;
            let fonts = config.font_manager().context("loading configured fonts")?;
            let data = with_template(store.snapshot(), template.as_deref());
            let document = preview_document(&data, PreviewMode::FullPage, Theme::Light);

            let exporter = Exporter::new(config, fonts, FileDelivery::new(out_dir));
            match exporter.export(&document, &data).await {
                Ok(outcome) => println!(
                    "Wrote '{}' ({} bytes, capture {}x{} px)",
                    outcome.location, outcome.pdf_len, outcome.capture_size.0, outcome.capture_size.1
                ),
                Err(e) => {
                    eprintln!("{}", e.user_message());
                    return Err(e.into());
                }
            }
        }
    }
    Ok(())
}

fn default_data_dir() -> Result<PathBuf> {
    directories::ProjectDirs::from("dev", "resume-forge", "resume-forge")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| anyhow!("no home directory; pass --data-dir"))
}

fn load_config(path: Option<&Path>) -> Result<ExportConfig> {
    match path {
        Some(path) => Ok(ExportConfig::from_json_file(path)?),
        None => Ok(ExportConfig::default()),
    }
}

/// The snapshot, with the template swapped for a one-off override.
fn with_template(data: &ResumeData, template: Option<&str>) -> ResumeData {
    let mut data = data.clone();
    if let Some(name) = template {
        data.template = TemplateId::parse(name);
    }
    data
}

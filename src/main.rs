//! NyayMitra command line: run the legal document pipeline on local files.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use nyaymitra::config::PipelineConfig;
use nyaymitra::models::{DocumentType, ExportFormat, OutputLanguage};
use nyaymitra::pipeline::drafting::Draft;
use nyaymitra::pipeline::extraction::SourceArtifact;
use nyaymitra::pipeline::rendering::StylingMetadata;
use nyaymitra::LegalPipeline;
use serde::Serialize;

#[derive(Parser)]
#[command(name = "nyaymitra")]
#[command(version)]
#[command(about = "Legal document extraction, drafting and court-formatted rendering")]
struct Cli {
    /// JSON configuration file (defaults plus NYAYMITRA_* variables otherwise)
    #[arg(short, long, env = "NYAYMITRA_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract text from audio, PDF, image or text file
    Extract {
        file: PathBuf,
        /// Declared language of the source (ISO 639-1)
        #[arg(short, long)]
        language: Option<String>,
        /// Declared MIME type; detected from content and extension otherwise
        #[arg(long)]
        mime: Option<String>,
    },

    /// Extract structured metadata from a transcript file
    Metadata { transcript: PathBuf },

    /// Explain a legal document in plain language
    Explain {
        file: PathBuf,
        #[arg(short = 'o', long, default_value = "english")]
        output_language: String,
        #[arg(short, long)]
        language: Option<String>,
        #[arg(long)]
        mime: Option<String>,
    },

    /// Generate a draft from a dictation (audio or transcript text)
    Draft {
        file: PathBuf,
        /// Overrides the document type found in the dictation
        #[arg(short = 't', long)]
        document_type: Option<String>,
        #[arg(short = 'o', long, default_value = "english")]
        output_language: String,
        #[arg(short, long)]
        language: Option<String>,
        /// Also render the draft (docx or pdf) into the output directory
        #[arg(short, long)]
        format: Option<String>,
        #[arg(long)]
        mime: Option<String>,
    },

    /// Apply editing instructions to an existing draft
    Refine {
        draft: PathBuf,
        #[arg(short, long)]
        instructions: String,
        #[arg(short = 't', long)]
        document_type: Option<String>,
    },

    /// Render a draft text file to DOCX or PDF
    Render {
        draft: PathBuf,
        #[arg(short, long, default_value = "pdf")]
        format: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(short = 't', long)]
        document_type: Option<String>,
        #[arg(short = 'o', long, default_value = "english")]
        output_language: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    nyaymitra::init_tracing();

    let config = load_config(cli.config.as_deref())?;
    let pipeline = LegalPipeline::from_config(&config).context("Failed to build pipeline")?;
    let source_language = |lang: Option<String>| lang.unwrap_or_else(|| config.dictation_language.clone());

    match cli.command {
        Commands::Extract {
            file,
            language,
            mime,
        } => {
            let artifact = load_artifact(&file, mime.as_deref(), &source_language(language))?;
            print_json(&pipeline.extract_text(&artifact)?)?;
        }
        Commands::Metadata { transcript } => {
            let text = read_text(&transcript)?;
            print_json(&pipeline.extract_metadata(&text)?)?;
        }
        Commands::Explain {
            file,
            output_language,
            language,
            mime,
        } => {
            let artifact = load_artifact(&file, mime.as_deref(), &source_language(language))?;
            let outcome =
                pipeline.understand_document(&artifact, OutputLanguage::from_tag(&output_language))?;
            print_json(&outcome)?;
        }
        Commands::Draft {
            file,
            document_type,
            output_language,
            language,
            format,
            mime,
        } => {
            let artifact = load_artifact(&file, mime.as_deref(), &source_language(language))?;
            let document_type = document_type.as_deref().map(DocumentType::from_tag);
            let output_language = OutputLanguage::from_tag(&output_language);
            let outcome = if artifact.kind == nyaymitra::pipeline::extraction::MediaKind::Audio {
                pipeline.create_from_audio(&artifact, document_type, output_language)?
            } else {
                let text = String::from_utf8(artifact.bytes)
                    .context("Dictation transcript must be UTF-8 text")?;
                pipeline.create_from_text(&text, document_type, output_language)?
            };
            print_json(&outcome)?;

            if let Some(format) = format {
                let styling = StylingMetadata {
                    title: outcome.metadata.title().map(str::to_string),
                    document_type: Some(outcome.draft.document_type),
                    language: output_language,
                };
                let artifact =
                    pipeline.render(&outcome.draft.text, parse_format(&format)?, &styling)?;
                let path = pipeline.save(&artifact)?;
                eprintln!("Saved {}", path.display());
            }
        }
        Commands::Refine {
            draft,
            instructions,
            document_type,
        } => {
            let current = Draft::from_text(
                read_text(&draft)?,
                document_type.as_deref().map(DocumentType::from_tag),
            );
            print_json(&pipeline.refine_draft(&current, &instructions)?)?;
        }
        Commands::Render {
            draft,
            format,
            title,
            document_type,
            output_language,
        } => {
            let styling = StylingMetadata {
                title,
                document_type: document_type.as_deref().map(DocumentType::from_tag),
                language: OutputLanguage::from_tag(&output_language),
            };
            let artifact = pipeline.render(&read_text(&draft)?, parse_format(&format)?, &styling)?;
            let path = pipeline.save(&artifact)?;
            print_json(&serde_json::json!({
                "path": path,
                "artifact": artifact,
            }))?;
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Cannot read config {}", path.display()))?;
            serde_json::from_str(&content).context("Invalid configuration JSON")
        }
        None => Ok(PipelineConfig::from_env()),
    }
}

fn load_artifact(path: &Path, mime: Option<&str>, language: &str) -> Result<SourceArtifact> {
    let artifact = match mime {
        Some(mime) => {
            let bytes = std::fs::read(path)
                .with_context(|| format!("Cannot read {}", path.display()))?;
            let file_name = path.file_name().and_then(|n| n.to_str());
            SourceArtifact::from_bytes_with_mime(bytes, mime, file_name, language)?
        }
        None => SourceArtifact::from_path(path, language)?,
    };
    Ok(artifact)
}

fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Cannot read {}", path.display()))
}

fn parse_format(tag: &str) -> Result<ExportFormat> {
    match tag.parse() {
        Ok(format) => Ok(format),
        Err(_) => bail!("Unknown format '{tag}', expected docx or pdf"),
    }
}

fn print_json(value: &impl Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

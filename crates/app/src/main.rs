use chrono::Utc;
use clap::{Parser, Subcommand};
use pdf_qa_core::{
    classify, extract_keywords, extract_sections, load_pdf_bytes, AnswerOptions, AskRequest,
    ErrorEnvelope, GenerationParams, GradioConfig, GradioGateway, LopdfExtractor, QuestionRouter,
};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "pdf-qa", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Base URL of the hosted Gradio chat app
    #[arg(long, global = true, env = "PDF_QA_ENDPOINT", default_value = pdf_qa_core::gateways::gradio::DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Name of the chat endpoint exposed by the app
    #[arg(long, global = true, env = "PDF_QA_API_NAME", default_value = "/chat")]
    api_name: String,

    /// Bearer token for private apps
    #[arg(long, global = true, env = "PDF_QA_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Token cap for each generated answer
    #[arg(long, global = true, env = "PDF_QA_MAX_TOKENS", default_value = "512")]
    max_tokens: u32,

    /// Sampling temperature
    #[arg(long, global = true, env = "PDF_QA_TEMPERATURE", default_value = "0.7")]
    temperature: f32,

    /// Nucleus sampling threshold
    #[arg(long, global = true, env = "PDF_QA_TOP_P", default_value = "0.95")]
    top_p: f32,

    /// Give up on a single inference call after this many seconds (no limit when unset)
    #[arg(long, global = true, env = "PDF_QA_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,
}

#[derive(Subcommand)]
enum Command {
    /// Ask a question about a PDF and print the answer as JSON.
    Ask {
        /// PDF file to read.
        #[arg(long)]
        pdf: PathBuf,
        /// Question to answer.
        #[arg(long)]
        question: String,
    },
    /// Show how a question would be routed, without calling the model.
    Classify {
        #[arg(long)]
        question: String,
    },
    /// List the section titles detected in a PDF.
    Sections {
        #[arg(long)]
        pdf: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app_version = env!("CARGO_PKG_VERSION");

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    info!(
        version = app_version,
        started_at = %Utc::now().to_rfc3339(),
        "pdf-qa boot"
    );

    let options = AnswerOptions {
        params: GenerationParams {
            max_tokens: cli.max_tokens,
            temperature: cli.temperature,
            top_p: cli.top_p,
            api_name: cli.api_name.clone(),
        },
        ..AnswerOptions::default()
    };

    match cli.command {
        Command::Ask { pdf, question } => {
            let gateway = GradioGateway::new(GradioConfig {
                endpoint: cli.endpoint,
                token: cli.token,
                timeout: cli.timeout_secs.map(Duration::from_secs),
            })
            .map_err(|error| anyhow::anyhow!(error.to_string()))?;
            let router = QuestionRouter::with_extractor(gateway, LopdfExtractor, options);

            let request = match load_pdf_bytes(&pdf) {
                Ok(bytes) => AskRequest::new(bytes, question),
                Err(error) => {
                    warn!(path = %pdf.display(), error = %error, "unable to read pdf");
                    AskRequest {
                        pdf: None,
                        question: Some(question),
                    }
                }
            };

            match router.ask(request).await {
                Ok(answer) => println!("{}", serde_json::to_string_pretty(&answer)?),
                Err(error) => {
                    let envelope = ErrorEnvelope::from(&error);
                    warn!(status = envelope.status, error = %envelope.error, "question failed");
                    println!("{}", serde_json::to_string_pretty(&envelope)?);
                    std::process::exit(exit_code(envelope.status));
                }
            }
        }
        Command::Classify { question } => {
            println!("intent: {:?}", classify(&question));
            println!("keywords: {}", extract_keywords(&question).join(", "));
        }
        Command::Sections { pdf } => {
            let bytes = load_pdf_bytes(&pdf).map_err(|error| anyhow::anyhow!(error.to_string()))?;
            let sections = extract_sections(&LopdfExtractor, &bytes, options.section_heading_regex)
                .map_err(|error| anyhow::anyhow!(error.to_string()))?;

            if sections.is_empty() {
                println!("no sections detected in {}", pdf.display());
            }
            for section in &sections {
                println!("{} ({} chars)", section.title, section.content.chars().count());
            }
        }
    }

    Ok(())
}

fn exit_code(status: u16) -> i32 {
    match status {
        400 => 2,
        404 => 3,
        _ => 1,
    }
}

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use pdfqa_cli::chat::{self, Terminal};
use pdfqa_cli::{Settings, build_answerer, ingest, settings};
use pdfqa_rag::QuestionAnswerer;
use pdfqa_telemetry::init_logging;
use tracing::error;

#[derive(Parser)]
#[command(
    name = "pdfqa",
    version,
    about = "Ask questions about a PDF, answered only from its content"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Load, split, embed and store the PDF
    Ingest {
        /// PDF to ingest (overrides PDF_PATH)
        #[arg(long)]
        pdf: Option<PathBuf>,
    },
    /// Interactive question loop (default)
    Chat,
    /// Answer one question and exit
    Ask {
        /// The question, in Portuguese
        question: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let _ = dotenvy::dotenv();

    match settings::log_format(|var| std::env::var(var).ok()) {
        Ok(format) => {
            let _ = init_logging(format);
        }
        Err(e) => {
            eprintln!("ERRO: {e}");
            return ExitCode::FAILURE;
        }
    }

    let command = cli.command.unwrap_or(Commands::Chat);
    let mut settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            match command {
                Commands::Ingest { .. } => eprintln!("ERRO: Configuração inválida: {e}"),
                Commands::Chat | Commands::Ask { .. } => {
                    let _ = chat::print_startup_failure(&mut io::stderr(), &e);
                }
            }
            return ExitCode::FAILURE;
        }
    };

    match command {
        Commands::Ingest { pdf } => {
            if let Some(pdf) = pdf {
                settings.pdf_path = pdf;
            }
            run_ingest(&settings).await
        }
        Commands::Chat => run_chat(&settings).await,
        Commands::Ask { question } => run_ask(&settings, &question).await,
    }
}

async fn run_ingest(settings: &Settings) -> ExitCode {
    match ingest(settings).await {
        Ok(report) => {
            println!(
                "SUCESSO: Ingestão concluída com sucesso! {} páginas, {} trechos em '{}'.",
                report.documents, report.chunks, report.collection
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %format!("{e:#}"), "ingestion failed");
            eprintln!("ERRO: Falha na ingestão. Verifique os logs para mais detalhes.");
            ExitCode::FAILURE
        }
    }
}

async fn run_chat(settings: &Settings) -> ExitCode {
    let mut out = io::stdout();
    let _ = chat::print_banner(&mut out);
    println!("Inicializando sistema de busca...");

    let answerer = match build_answerer(settings).await {
        Ok(answerer) => answerer,
        Err(e) => {
            error!(error = %format!("{e:#}"), "chat startup failed");
            let _ = chat::print_startup_failure(&mut out, &format!("{e:#}"));
            return ExitCode::FAILURE;
        }
    };
    println!("Sistema inicializado com sucesso!");
    println!("\nChat iniciado! Faça sua pergunta:");

    let mut terminal = match Terminal::new() {
        Ok(terminal) => terminal,
        Err(e) => {
            eprintln!("ERRO: Não foi possível abrir o terminal: {e}");
            return ExitCode::FAILURE;
        }
    };

    match chat::run_loop(&mut terminal, &mut out, &answerer).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "chat loop failed");
            ExitCode::FAILURE
        }
    }
}

async fn run_ask(settings: &Settings, question: &str) -> ExitCode {
    let answerer = match build_answerer(settings).await {
        Ok(answerer) => answerer,
        Err(e) => {
            error!(error = %format!("{e:#}"), "startup failed");
            let _ = chat::print_startup_failure(&mut io::stderr(), &format!("{e:#}"));
            return ExitCode::FAILURE;
        }
    };

    match answerer.answer(question).await {
        Ok(answer) => {
            let mut out = io::stdout();
            let _ = writeln!(out, "{answer}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "failed to answer question");
            eprintln!("ERRO: Erro ao processar sua pergunta: {e}");
            ExitCode::FAILURE
        }
    }
}

//! The interactive question loop.

use std::io::{self, Write};

use crossterm::cursor::MoveTo;
use crossterm::execute;
use crossterm::terminal::{Clear, ClearType};
use pdfqa_rag::QuestionAnswerer;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::error;

const RULE_WIDTH: usize = 60;
const PROMPT: &str = "\nPERGUNTA: ";

/// What a line of user input asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `sair`, `quit` or `exit`.
    Exit,
    /// `ajuda` or `help`.
    Help,
    /// `limpar` or `clear`.
    Clear,
    /// Nothing but whitespace.
    Empty,
    /// Anything else, trimmed.
    Question(String),
}

impl Command {
    /// Classify a line of input. Command words are case-insensitive.
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        match trimmed.to_lowercase().as_str() {
            "" => Command::Empty,
            "sair" | "quit" | "exit" => Command::Exit,
            "ajuda" | "help" => Command::Help,
            "limpar" | "clear" => Command::Clear,
            _ => Command::Question(trimmed.to_string()),
        }
    }
}

/// One read from the terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// A line of text.
    Line(String),
    /// Ctrl-C.
    Interrupted,
    /// Ctrl-D or end of input.
    Eof,
}

/// Somewhere lines of input come from.
pub trait LineSource {
    /// Show `prompt` and read one line.
    fn read_line(&mut self, prompt: &str) -> io::Result<Input>;
}

/// Reads lines from the terminal with history and editing.
pub struct Terminal {
    editor: DefaultEditor,
}

impl Terminal {
    /// Open the terminal editor.
    pub fn new() -> io::Result<Self> {
        let editor = DefaultEditor::new().map_err(io::Error::other)?;
        Ok(Self { editor })
    }
}

impl LineSource for Terminal {
    fn read_line(&mut self, prompt: &str) -> io::Result<Input> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = self.editor.add_history_entry(line.as_str());
                }
                Ok(Input::Line(line))
            }
            Err(ReadlineError::Interrupted) => Ok(Input::Interrupted),
            Err(ReadlineError::Eof) => Ok(Input::Eof),
            Err(ReadlineError::Io(e)) => Err(e),
            Err(e) => Err(io::Error::other(e)),
        }
    }
}

fn rule(out: &mut impl Write, ch: char) -> io::Result<()> {
    writeln!(out, "{}", ch.to_string().repeat(RULE_WIDTH))
}

/// Print the title banner.
pub fn print_banner(out: &mut impl Write) -> io::Result<()> {
    rule(out, '=')?;
    writeln!(out, "SISTEMA DE PERGUNTAS E RESPOSTAS SOBRE O DOCUMENTO")?;
    rule(out, '=')?;
    writeln!(out, "Digite 'sair' ou 'quit' para encerrar o chat")?;
    writeln!(out, "Digite 'ajuda' para ver comandos disponíveis")?;
    rule(out, '=')
}

/// Print the command list and usage tips.
pub fn print_help(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "\nCOMANDOS DISPONÍVEIS:")?;
    writeln!(out, "• Digite sua pergunta normalmente")?;
    writeln!(out, "• 'sair' ou 'quit' - Encerra o chat")?;
    writeln!(out, "• 'ajuda' - Mostra esta mensagem")?;
    writeln!(out, "• 'limpar' ou 'clear' - Limpa a tela")?;
    writeln!(out, "\nDICAS:")?;
    writeln!(out, "• Faça perguntas específicas sobre o conteúdo do PDF")?;
    writeln!(out, "• O sistema só responde com base no documento carregado")?;
    writeln!(out, "• Se não houver informação no documento, você receberá uma mensagem padrão")?;
    rule(out, '-')
}

/// Print why the chat could not start and what to check.
pub fn print_startup_failure(
    out: &mut impl Write,
    cause: &dyn std::fmt::Display,
) -> io::Result<()> {
    writeln!(out, "ERRO: Não foi possível iniciar o chat: {cause}")?;
    writeln!(out, "\nPOSSÍVEIS SOLUÇÕES:")?;
    writeln!(out, "1. Verifique se o banco de dados PostgreSQL está rodando")?;
    writeln!(out, "2. Execute primeiro: pdfqa ingest")?;
    writeln!(out, "3. Verifique as variáveis de ambiente no arquivo .env")?;
    writeln!(out, "4. Verifique se as API keys estão configuradas corretamente")
}

fn clear_screen(out: &mut impl Write) -> io::Result<()> {
    execute!(out, Clear(ClearType::All), MoveTo(0, 0))
}

/// Read questions until the user leaves, answering each one.
///
/// Per-question failures are logged and reported, and the loop continues.
/// Returns `Ok` on `sair`, Ctrl-C and end of input.
pub async fn run_loop<L, W>(
    source: &mut L,
    out: &mut W,
    answerer: &dyn QuestionAnswerer,
) -> io::Result<()>
where
    L: LineSource,
    W: Write,
{
    loop {
        out.flush()?;
        let line = match source.read_line(PROMPT)? {
            Input::Line(line) => line,
            Input::Interrupted => {
                writeln!(out, "\n\nChat interrompido pelo usuário. Até logo!")?;
                return Ok(());
            }
            Input::Eof => {
                writeln!(out, "\nAté logo! Chat encerrado.")?;
                return Ok(());
            }
        };

        match Command::parse(&line) {
            Command::Exit => {
                writeln!(out, "\nAté logo! Chat encerrado.")?;
                return Ok(());
            }
            Command::Help => print_help(out)?,
            Command::Clear => {
                clear_screen(out)?;
                print_banner(out)?;
            }
            Command::Empty => writeln!(out, "AVISO: Por favor, digite uma pergunta.")?,
            Command::Question(question) => {
                writeln!(out, "Processando sua pergunta...")?;
                out.flush()?;
                match answerer.answer(&question).await {
                    Ok(answer) => writeln!(out, "\nRESPOSTA: {answer}")?,
                    Err(e) => {
                        error!(
                            error = %e,
                            transient = e.is_transient(),
                            "failed to answer question"
                        );
                        writeln!(out, "\nERRO: Erro ao processar sua pergunta: {e}")?;
                        writeln!(
                            out,
                            "Tente novamente ou digite 'ajuda' para ver os comandos disponíveis."
                        )?;
                    }
                }
                rule(out, '-')?;
            }
        }
    }
}

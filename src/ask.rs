//! The `ask` and `chat` commands.

use anyhow::Result;
use std::io::{BufRead, Write};

use crate::config::Config;
use crate::embedding::GeminiEmbedder;
use crate::generate::GeminiGenerator;
use crate::session::Session;

/// Build a session wired to the live embedding and generation services.
pub fn new_session(config: &Config, api_key: String) -> Result<Session> {
    let embedder = GeminiEmbedder::new(&config.embedding, api_key.clone())?;
    let generator = GeminiGenerator::new(&config.generation, api_key)?;

    Ok(Session::new(
        Box::new(embedder),
        Box::new(generator),
        config.index.path.clone(),
        config.retrieval.top_k,
    ))
}

/// Answer a single question and print the exchange.
pub async fn run_ask(config: &Config, api_key: String, question: &str) -> Result<()> {
    let mut session = new_session(config, api_key)?;
    session.ask(question).await?;
    print!("{}", session.render_transcript());
    Ok(())
}

/// Interactive loop: read questions from stdin until EOF.
pub async fn run_chat(config: &Config, api_key: String) -> Result<()> {
    let mut session = new_session(config, api_key)?;
    let stdin = std::io::stdin();
    chat_loop(&mut session, stdin.lock(), &mut std::io::stdout()).await
}

/// Drive a chat session over arbitrary input/output streams.
///
/// After every answered question the full transcript is re-rendered, so
/// the whole conversation so far is always on screen. A failed question
/// is reported and the loop continues; the session (and its cache)
/// survives individual failures.
pub async fn chat_loop(
    session: &mut Session,
    mut input: impl BufRead,
    output: &mut impl Write,
) -> Result<()> {
    writeln!(
        output,
        "Session {}. Ask questions about your documents (Ctrl-D to exit).",
        session.id()
    )?;

    loop {
        write!(output, "> ")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        let question = line.trim();
        if question.is_empty() {
            continue;
        }

        match session.ask(question).await {
            Ok(_) => write!(output, "{}", session.render_transcript())?,
            Err(e) => eprintln!("Error: {:#}", e),
        }
    }

    writeln!(output)?;
    Ok(())
}

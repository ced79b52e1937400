use crate::chat::ChatEngine;
use crate::constants::{EXIT_SENTINEL, QUERY_PROMPT, SEPARATOR_WIDTH};
use anyhow::{Context, Result};
use std::io::{BufRead, Write};

/// Read questions from `input` and stream the answers to `output`
///
/// The loop ends when a line is exactly `e` or the input is exhausted.
/// Blank lines are prompted for again. A failed answer ends the loop
/// with that error.
pub async fn run_query_loop<E, R, W>(engine: &E, mut input: R, mut output: W) -> Result<()>
where
    E: ChatEngine + ?Sized,
    R: BufRead,
    W: Write,
{
    let separator = "-".repeat(SEPARATOR_WIDTH);
    let mut line = String::new();

    loop {
        write!(output, "{}", QUERY_PROMPT)?;
        output.flush()?;

        line.clear();
        if input.read_line(&mut line).context("Failed to read question")? == 0 {
            tracing::debug!("input closed, leaving query loop");
            writeln!(output)?;
            return Ok(());
        }

        let query = line.strip_suffix('\n').unwrap_or(&line);
        let query = query.strip_suffix('\r').unwrap_or(query);
        if query == EXIT_SENTINEL {
            return Ok(());
        }
        if query.trim().is_empty() {
            continue;
        }

        let mut response = engine.stream_chat(query).await?;
        while let Some(token) = response.next_token().await {
            write!(output, "{}", token?)?;
            output.flush()?;
        }

        write!(output, "\n{}\n", separator)?;
        write!(output, "\n\n")?;
        output.flush()?;
    }
}

use anyhow::{Context as _, Result};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader, Lines, Stdin};
use visit_dashboard::VisitType;

pub type InputLines = Lines<BufReader<Stdin>>;

pub fn stdin_lines() -> InputLines {
    BufReader::new(tokio::io::stdin()).lines()
}

fn print_prompt(prompt: &str) -> Result<()> {
    print!("{}", prompt);
    std::io::stdout().flush().context("Failed to flush stdout")
}

/// Read one trimmed line; `None` on end of input.
pub async fn read_line(lines: &mut InputLines, prompt: &str) -> Result<Option<String>> {
    print_prompt(prompt)?;
    let line = lines.next_line().await.context("Failed to read from stdin")?;
    Ok(line.map(|l| l.trim().to_string()))
}

/// Read lines until a blank line or end of input.
pub async fn read_block(lines: &mut InputLines, prompt: &str) -> Result<String> {
    println!("{}", prompt);
    let mut collected = Vec::new();
    while let Some(line) = lines.next_line().await.context("Failed to read from stdin")? {
        if line.trim().is_empty() {
            break;
        }
        collected.push(line);
    }
    Ok(collected.join("\n"))
}

pub async fn read_visit_type(lines: &mut InputLines) -> Result<Option<VisitType>> {
    println!("Visit Type:");
    for (idx, visit_type) in VisitType::ALL.iter().enumerate() {
        println!("  {}. {}", idx + 1, visit_type.label());
    }

    loop {
        let Some(answer) = read_line(lines, "Select visit type: ").await? else {
            return Ok(None);
        };
        if answer.is_empty() {
            return Ok(None);
        }
        let choice = answer
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|n| VisitType::ALL.get(n).copied());
        match choice.map(Ok).unwrap_or_else(|| answer.parse::<VisitType>()) {
            Ok(visit_type) => return Ok(Some(visit_type)),
            Err(e) => println!("{}", e),
        }
    }
}

/// Whole of stdin, for `--transcript-file -`.
pub async fn read_all_stdin() -> Result<String> {
    let mut buf = String::new();
    tokio::io::stdin()
        .read_to_string(&mut buf)
        .await
        .context("Failed to read transcript from stdin")?;
    Ok(buf)
}

use std::io::{self, Write};

use anyhow::{Context, Result};

/// Reads one line from stdin, falling back to `default` on empty input.
pub fn prompt_input(message: &str, default: Option<&str>) -> Result<String> {
    let mut stdout = io::stdout();
    match default {
        Some(value) if !value.is_empty() => write!(stdout, "{} [{}]: ", message, value)?,
        _ => write!(stdout, "{}: ", message)?,
    }
    stdout.flush().context("failed to flush prompt")?;

    let mut buffer = String::new();
    io::stdin()
        .read_line(&mut buffer)
        .context("failed to read input")?;
    let input = buffer.trim().to_string();
    if input.is_empty() {
        Ok(default.unwrap_or_default().to_string())
    } else {
        Ok(input)
    }
}

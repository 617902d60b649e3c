//! Terminal I/O utilities.

use std::io::{self, BufRead, Write};

use crate::error::{Error, Result};

pub fn prompt(message: &str) -> Result<String> {
    eprint!("{}", message);
    io::stderr().flush().ok();

    let stdin = io::stdin();
    let mut line = String::new();
    stdin.lock().read_line(&mut line).map_err(|e| {
        Error::internal_io(
            format!("Failed to read input: {}", e),
            Some("prompt".to_string()),
        )
    })?;

    Ok(line.trim().to_string())
}

pub fn prompt_password(message: &str) -> Result<String> {
    prompt(message)
}

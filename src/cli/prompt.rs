//! Interactive approval on the terminal.

use std::io::{self, BufRead, Write};

use async_trait::async_trait;
use tracing::warn;

use crate::services::{ApprovalRequest, Approver};

/// Ask a yes/no question until the answer is `y` or `n`.
///
/// Answers are trimmed and case-insensitive. End of input counts as `n`.
pub fn prompt_yes_no<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    question: &str,
) -> io::Result<bool> {
    loop {
        write!(output, "      >> {} (y/n): ", question)?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            writeln!(output)?;
            return Ok(false);
        }

        match line.trim().to_lowercase().as_str() {
            "y" => return Ok(true),
            "n" => return Ok(false),
            _ => continue,
        }
    }
}

/// Approver that asks the operator on stdin.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalApprover;

#[async_trait]
impl Approver for TerminalApprover {
    async fn approve(&self, request: &ApprovalRequest) -> bool {
        let question = request.question();
        let answer = tokio::task::spawn_blocking(move || {
            let stdin = io::stdin();
            let mut input = stdin.lock();
            let mut output = io::stdout();
            prompt_yes_no(&mut input, &mut output, question)
        })
        .await;

        match answer {
            Ok(Ok(approved)) => approved,
            Ok(Err(e)) => {
                warn!("Failed to read answer, treating as no: {}", e);
                false
            }
            Err(e) => {
                warn!("Prompt task failed, treating as no: {}", e);
                false
            }
        }
    }
}

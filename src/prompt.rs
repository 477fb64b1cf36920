//! Interactive operator prompts.

use crate::error::Result;
use std::future::Future;
use std::io::{BufRead, Write};

/// Asks the operator a question and returns the raw answer line
pub trait Prompter {
    /// Show `text` (with `default` as the suggested answer) and wait for a line.
    ///
    /// An empty answer is returned as `default`.
    fn ask(&self, text: &str, default: &str) -> impl Future<Output = Result<String>>;
}

impl<T: Prompter> Prompter for &T {
    fn ask(&self, text: &str, default: &str) -> impl Future<Output = Result<String>> {
        (**self).ask(text, default)
    }
}

/// Reads answers from stdin
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    async fn ask(&self, text: &str, default: &str) -> Result<String> {
        let question = format!("{text} ({default}) ");
        let default = default.to_string();

        // stdin reads block; keep them off the runtime's worker threads
        let answer = tokio::task::spawn_blocking(move || -> std::io::Result<Option<String>> {
            let mut stdout = std::io::stdout();
            write!(stdout, "{question}")?;
            stdout.flush()?;

            let mut line = String::new();
            let read = std::io::stdin().lock().read_line(&mut line)?;
            Ok((read > 0).then_some(line))
        })
        .await
        .map_err(|e| std::io::Error::other(e.to_string()))??;

        let Some(line) = answer else {
            return Err(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "input closed before an answer was given",
            )
            .into());
        };

        Ok(with_default(&line, &default))
    }
}

/// Trimmed answer, or `default` when the answer is blank
pub fn with_default(answer: &str, default: &str) -> String {
    let trimmed = answer.trim();
    if trimmed.is_empty() {
        default.to_string()
    } else {
        trimmed.to_string()
    }
}

/// True for answers that approve a yes/no question
pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_answer_takes_default() {
        assert_eq!(with_default("  \n", "Y"), "Y");
        assert_eq!(with_default(" 0.2.0\n", "0.1.0"), "0.2.0");
    }

    #[test]
    fn test_affirmative_answers() {
        assert!(is_affirmative("Y"));
        assert!(is_affirmative("yes"));
        assert!(is_affirmative(" YES "));
        assert!(!is_affirmative("n"));
        assert!(!is_affirmative(""));
        assert!(!is_affirmative("yep"));
    }
}

// components/song_pipeline/src/prompt.rs
use async_trait::async_trait;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Asks the operator a yes/no question
#[async_trait]
pub trait Prompt: Send + Sync {
    async fn confirm(&self, question: &str) -> std::io::Result<bool>;
}

/// Reads the answer from stdin; a closed stdin counts as "no"
#[derive(Debug, Default, Clone)]
pub struct StdinPrompt;

#[async_trait]
impl Prompt for StdinPrompt {
    async fn confirm(&self, question: &str) -> std::io::Result<bool> {
        {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{question}")?;
            write!(stdout, "> ")?;
            stdout.flush()?;
        }

        let mut answer = String::new();
        BufReader::new(tokio::io::stdin()).read_line(&mut answer).await?;
        Ok(is_affirmative(&answer))
    }
}

pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use super::super::Container;

pub struct AskController<'a> {
    container: &'a Container,
}

impl<'a> AskController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    pub async fn ask(&self, prompt: Option<String>) -> Result<String> {
        let prompt = match prompt {
            Some(prompt) => prompt,
            None => read_prompt().await?,
        };

        let use_case = self.container.single_prompt_use_case();
        Ok(use_case.execute(&prompt).await?)
    }
}

async fn read_prompt() -> Result<String> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(b"Enter your prompt here: ").await?;
    stdout.flush().await?;

    let mut line = String::new();
    BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;
    Ok(line)
}

use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use crate::application::{Applied, Conversation};
use crate::domain::format_history;

use super::super::Container;

const USER_PROMPT: &str = "User (Enter 'quit' to End the chat session): ";
const HISTORY_PROMPT: &str = "Do you want to print CHAT History? ";

pub struct ChatController<'a> {
    container: &'a Container,
}

impl<'a> ChatController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    pub async fn chat(&self) -> Result<String> {
        let conversation = self.container.conversation().await?;
        run_repl(
            conversation,
            BufReader::new(tokio::io::stdin()),
            tokio::io::stdout(),
        )
        .await?;
        Ok(String::new())
    }
}

/// Line-oriented chat: every line is one turn and waits for its own reply.
/// A failed turn is reported and the loop carries on.
pub async fn run_repl<R, W>(mut conversation: Conversation, input: R, mut out: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();

    loop {
        out.write_all(USER_PROMPT.as_bytes()).await?;
        out.flush().await?;

        let Some(line) = lines.next_line().await? else {
            out.write_all(b"\nBye.\n").await?;
            break;
        };

        if line.trim().eq_ignore_ascii_case("quit") {
            out.write_all(HISTORY_PROMPT.as_bytes()).await?;
            out.flush().await?;
            let answer = lines.next_line().await?.unwrap_or_default();
            if matches!(answer.trim().to_uppercase().as_str(), "Y" | "YES") {
                let report = match conversation.history().await {
                    Ok(entries) => format!("MESSAGE HISTORY\n{}\n", format_history(&entries)),
                    Err(error) => format!("Could not fetch history: {}\n", error.reason()),
                };
                out.write_all(report.as_bytes()).await?;
            }
            out.write_all(b"Bye.\n").await?;
            break;
        }

        if conversation.submit(&line).is_none() {
            continue;
        }

        let report = match conversation.wait_next().await {
            Some(Applied::Reply { text, .. }) => format!("MODEL: {text}\n"),
            Some(Applied::Notified { notification, .. }) => {
                conversation.take_notifications();
                format!("{}: {}\n", notification.title(), notification.message())
            }
            None => continue,
        };
        out.write_all(report.as_bytes()).await?;
    }

    out.flush().await?;
    Ok(())
}

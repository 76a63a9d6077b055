//! The interactive conversation loop.

use memochat_core::error::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};
use crate::memory_agent::MemoryAgent;

/// Line written after every reply.
pub const SEPARATOR: &str = "--------------------------------------------------";

/// Printed when the user types the exit keyword.
pub const FAREWELL: &str = "See you! (memories saved)";

/// Where the loop currently is within a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    AwaitingInput,
    Retrieving,
    Generating,
    Persisting,
    Stopped,
}

/// Reads one line per turn from `reader` and writes replies to `writer`.
pub struct ConversationLoop<R, W> {
    agent: MemoryAgent,
    reader: R,
    writer: W,
    exit_keyword: String,
    show_recalled: bool,
    state: LoopState,
}

impl<R, W> ConversationLoop<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(agent: MemoryAgent, reader: R, writer: W) -> Self {
        Self {
            agent,
            reader,
            writer,
            exit_keyword: "exit".into(),
            show_recalled: false,
            state: LoopState::AwaitingInput,
        }
    }

    /// Set the word that ends the session (matched case-insensitively).
    pub fn with_exit_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.exit_keyword = keyword.into();
        self
    }

    /// Echo the recalled context block after each reply.
    pub fn with_show_recalled(mut self, enabled: bool) -> Self {
        self.show_recalled = enabled;
        self
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Give back the reader and writer.
    pub fn into_parts(self) -> (R, W) {
        (self.reader, self.writer)
    }

    fn is_exit(&self, input: &str) -> bool {
        input.to_lowercase() == self.exit_keyword.to_lowercase()
    }

    fn transition(&mut self, next: LoopState) {
        debug!(from = ?self.state, to = ?next, "Loop state");
        self.state = next;
    }

    /// Read the next line without its line terminator. `None` at end of input.
    async fn read_input(&mut self) -> Result<Option<String>> {
        self.writer.write_all(b"You: ").await?;
        self.writer.flush().await?;

        let mut line = String::new();
        if self.reader.read_line(&mut line).await? == 0 {
            return Ok(None);
        }
        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        Ok(Some(line))
    }

    /// One turn up to and including persistence. Returns the reply and
    /// the context block it was generated from.
    async fn turn(&mut self, input: &str) -> Result<(String, String)> {
        let agent = self.agent.clone();
        let outcome = agent.respond(input, |stage| self.transition(stage)).await?;
        Ok((outcome.response, outcome.context))
    }

    /// Run turns until the exit keyword or end of input.
    ///
    /// Returns the number of completed turns. The first failing turn ends
    /// the loop with its error; turns completed before it stay persisted.
    pub async fn run(&mut self) -> Result<usize> {
        let mut turns = 0;
        self.transition(LoopState::AwaitingInput);

        loop {
            let Some(input) = self.read_input().await? else {
                info!(turns, "Input closed, ending session");
                self.writer.write_all(b"\n").await?;
                self.writer.flush().await?;
                self.transition(LoopState::Stopped);
                return Ok(turns);
            };

            if self.is_exit(&input) {
                info!(turns, "Exit requested");
                self.writer.write_all(format!("{FAREWELL}\n").as_bytes()).await?;
                self.writer.flush().await?;
                self.transition(LoopState::Stopped);
                return Ok(turns);
            }

            let outcome = self.turn(&input).await;
            let (response, context) = match outcome {
                Ok(v) => v,
                Err(e) => {
                    self.transition(LoopState::Stopped);
                    return Err(e);
                }
            };

            let mut out = format!("AI: {response}\n");
            if self.show_recalled {
                out.push_str("[recalled]\n");
                out.push_str(&context);
                out.push('\n');
            }
            out.push_str(SEPARATOR);
            out.push('\n');
            self.writer.write_all(out.as_bytes()).await?;
            self.writer.flush().await?;

            turns += 1;
            self.transition(LoopState::AwaitingInput);
        }
    }
}

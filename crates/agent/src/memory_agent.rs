//! One retrieve → prompt → generate → persist turn.

use std::sync::Arc;
use memochat_core::error::Result;
use memochat_core::memory::{MemoryRecord, MemoryStore};
use memochat_core::provider::Generator;
use tracing::{debug, info};
use crate::context::build_context;
use crate::loop_runner::LoopState;
use crate::prompt::build_prompt;
use crate::turn::Turn;

/// Number of memories recalled per turn.
pub const FAN_OUT: usize = 3;

/// Everything a turn produced.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    /// The generator's reply, verbatim.
    pub response: String,
    /// The context block that went into the prompt.
    pub context: String,
    /// The record written to memory for this turn.
    pub record: MemoryRecord,
}

/// Runs single turns against a memory store and a generator.
///
/// Both handles are built once at startup and shared for the whole session.
#[derive(Clone)]
pub struct MemoryAgent {
    store: Arc<dyn MemoryStore>,
    generator: Arc<dyn Generator>,
}

impl MemoryAgent {
    pub fn new(store: Arc<dyn MemoryStore>, generator: Arc<dyn Generator>) -> Self {
        Self { store, generator }
    }

    pub fn store(&self) -> &Arc<dyn MemoryStore> {
        &self.store
    }

    /// Recall up to [`FAN_OUT`] memories for `input` as a context block.
    async fn recall(&self, input: &str) -> Result<String> {
        let recalled = self.store.search(input, FAN_OUT).await?;
        debug!(recalled = recalled.len(), "Recalled memories");
        Ok(build_context(&recalled))
    }

    /// Build the prompt and return the generator's reply verbatim.
    async fn generate(&self, context: &str, input: &str) -> Result<String> {
        let prompt = build_prompt(context, input);
        Ok(self.generator.generate(&prompt).await?)
    }

    /// Append the turn to memory.
    async fn persist(&self, turn: &Turn) -> Result<MemoryRecord> {
        let record = self.store.upsert(&turn.to_record_text()).await?;
        debug!(id = %record.id, "Persisted turn");
        Ok(record)
    }

    /// Handle one user input: recall, generate, persist.
    ///
    /// `on_stage` is told when each step starts. Failures from the store or
    /// generator are returned as-is. If generation fails nothing is
    /// persisted; if persistence fails the reply is dropped.
    pub async fn respond(
        &self,
        input: &str,
        mut on_stage: impl FnMut(LoopState),
    ) -> Result<TurnOutcome> {
        on_stage(LoopState::Retrieving);
        let context = self.recall(input).await?;

        on_stage(LoopState::Generating);
        let response = self.generate(&context, input).await?;

        on_stage(LoopState::Persisting);
        let turn = Turn::new(input, response);
        let record = self.persist(&turn).await?;
        info!(id = %record.id, response_len = turn.response.len(), "Turn complete");

        Ok(TurnOutcome {
            response: turn.response,
            context,
            record,
        })
    }
}

//! The memory-augmented conversation loop.
//!
//! Every turn follows a **Retrieve → Prompt → Generate → Persist** cycle:
//!
//! 1. **Recall** the three stored turns most similar to the user's input
//! 2. **Format** them into a context block (or a placeholder when none)
//! 3. **Prompt** the generator with the context and the raw input
//! 4. **Persist** `User: {input} / AI: {response}` as a new memory
//! 5. **Reply** to the user
//!
//! The loop ends when the user types the exit keyword or input closes.

pub mod context;
pub mod loop_runner;
pub mod memory_agent;
pub mod prompt;
pub mod turn;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use context::{NO_MEMORY_SENTINEL, build_context};
pub use loop_runner::{ConversationLoop, FAREWELL, LoopState, SEPARATOR};
pub use memory_agent::{FAN_OUT, MemoryAgent, TurnOutcome};
pub use prompt::build_prompt;
pub use turn::Turn;

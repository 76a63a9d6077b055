//! Context block: recalled memories formatted for the prompt.

/// Placeholder used when nothing was recalled.
pub const NO_MEMORY_SENTINEL: &str = "(No related past conversations.)";

/// Join recalled memory texts with newlines, in the order given.
///
/// An empty slice yields [`NO_MEMORY_SENTINEL`].
pub fn build_context(records: &[String]) -> String {
    if records.is_empty() {
        return NO_MEMORY_SENTINEL.to_string();
    }
    records.join("\n")
}

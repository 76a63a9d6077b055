//! Prompt template for the friend persona.

const ROLE: &str = "You are the user's close friend, an AI that remembers past conversations.\n\
Use the memories below when they help, and reply warmly and naturally.";

const MEMORY_HEADER: &str = "[Past memories]";
const INPUT_HEADER: &str = "[What the user just said]";
const ANSWER_CUE: &str = "Answer:";

/// Substitute the context block and user input into the fixed template.
///
/// Both values are inserted verbatim. Braces or section headers inside them
/// are not interpreted.
pub fn build_prompt(context: &str, user_input: &str) -> String {
    format!("{ROLE}\n\n{MEMORY_HEADER}\n{context}\n\n{INPUT_HEADER}\n{user_input}\n\n{ANSWER_CUE}")
}

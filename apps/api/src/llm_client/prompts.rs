// Shared prompt fragments.
// Each stage that calls the LLM defines its own prompts alongside it;
// only cross-cutting text lives here.

/// Appended to system prompts whose answer is parsed as JSON.
pub const STRUCTURED_OUTPUT_INSTRUCTION: &str = "\
    Respond with a single JSON object that matches the requested schema. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences around the JSON.";

/// Rendered in place of an empty negative-word list.
pub const NOT_APPLICABLE: &str = "n/a";

// Blog post generation pipeline: brief → outline → sections → assembly.
// All LLM calls go through llm_client, never a provider directly.

pub mod brief;
pub mod handlers;
pub mod orchestrator;
pub mod outline;
pub mod prompts;
pub mod section;

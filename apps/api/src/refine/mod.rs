// Ad refinement: the chat state machine, the priming contract, and the
// response sanitizer that guards ad updates. All LLM calls go through
// llm_client — no direct Gemini calls here.

pub mod handlers;
pub mod prompts;
pub mod sanitizer;
pub mod session;

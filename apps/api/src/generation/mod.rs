// Document generation: prompts, the LLM + PDF pipeline, and the form POST handler.
// All LLM calls go through llm_client — no direct Gemini calls here.

pub mod generator;
pub mod handlers;
pub mod prompts;

pub use generator::DocumentGenerator;

//! AI prompt templates.

pub mod keyword_expansion;
pub mod translate;

pub use keyword_expansion::{render_keyword_expansion_prompt, KEYWORD_EXPANSION_PROMPT_NAME};
pub use translate::{render_translate_prompt, TRANSLATE_PROMPT_NAME};

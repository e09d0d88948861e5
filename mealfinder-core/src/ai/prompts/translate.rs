//! Translation prompt for recipe text.

/// Prompt name for logs.
pub const TRANSLATE_PROMPT_NAME: &str = "translate";

/// Render a prompt asking for `text` in the language named by `language_code`.
pub fn render_translate_prompt(text: &str, language_code: &str) -> String {
    format!(
        r#"Translate the following recipe text into the language with ISO 639-1 code "{language_code}".
Keep numbers, units and line breaks. Reply with the translation only, no quotes or commentary.

{text}"#,
        language_code = language_code,
        text = text
    )
}

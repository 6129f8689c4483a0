/*!
 * Language utilities for prompt-facing language names.
 *
 * The translation prompts address languages by their English name
 * ("French", "Japanese"), but callers frequently send ISO 639-1 or
 * ISO 639-3 codes instead. This module resolves either form to a
 * prompt-ready name and leaves anything it does not recognize untouched,
 * since the models accept free-text language names.
 */

use isolang::Language;

/// Resolve a caller-supplied language value to an English language name.
///
/// Accepts ISO 639-1 (2-letter) codes, ISO 639-3 (3-letter) codes, or a
/// free-text name. Unrecognized values are returned as-is after trimming.
pub fn resolve_language_name(input: &str) -> String {
    let trimmed = input.trim();
    let lowered = trimmed.to_lowercase();

    if lowered.len() == 2 {
        if let Some(lang) = Language::from_639_1(&lowered) {
            return lang.to_name().to_string();
        }
    } else if lowered.len() == 3 {
        if let Some(lang) = Language::from_639_3(&lowered) {
            return lang.to_name().to_string();
        }
    }

    trimmed.to_string()
}

//! Lemmatization capability.
//!
//! Keyword lemma sets and extracted phrases must be reduced to base forms
//! through one shared pipeline, otherwise set membership tests silently
//! disagree (e.g. a keyword stored as "families" never matching a token
//! lemmatized to "family"). Article tokens arrive already lemmatized by the
//! external parser; this trait covers the remaining uses: keyword loading
//! and term/unit phrase normalization.

use std::collections::HashMap;

/// Capability: reduce an English word to its dictionary base form.
pub trait Lemmatizer: Send + Sync {
    fn lemma(&self, word: &str) -> String;
}

/// Rule-based fallback lemmatizer: a small irregular-form table plus
/// inflectional suffix stripping. Good enough for the curated keyword
/// vocabulary and for the short verb/noun phrases the converter sees;
/// callers with a full morphological analyzer should inject that instead.
pub struct SuffixLemmatizer {
    irregular: HashMap<&'static str, &'static str>,
}

impl SuffixLemmatizer {
    pub fn new() -> Self {
        let irregular = HashMap::from([
            ("people", "people"),
            ("men", "man"),
            ("women", "woman"),
            ("children", "child"),
            ("lives", "life"),
            ("left", "leave"),
            ("fled", "flee"),
            ("became", "become"),
            ("swept", "sweep"),
            ("stuck", "stuck"),
            ("hit", "hit"),
            ("was", "be"),
            ("were", "be"),
            ("been", "be"),
        ]);
        Self { irregular }
    }

    fn ends_with_double_letter(word: &str) -> bool {
        let bytes = word.as_bytes();
        bytes.len() >= 2 && bytes[bytes.len() - 1] == bytes[bytes.len() - 2]
    }

    /// Whether a stem produced by stripping "-ed" needs its elided "e" back
    /// ("forc" -> "force", "evacuat" -> "evacuate", but "wash" stays).
    fn wants_final_e(stem: &str) -> bool {
        if Self::ends_with_double_letter(stem) {
            return false;
        }
        stem.ends_with("at") || matches!(stem.as_bytes().last(), Some(b'c' | b'g' | b's' | b'u' | b'v' | b'z'))
    }
}

impl Default for SuffixLemmatizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Lemmatizer for SuffixLemmatizer {
    fn lemma(&self, word: &str) -> String {
        let lower = word.to_lowercase();
        if let Some(base) = self.irregular.get(lower.as_str()) {
            return (*base).to_string();
        }
        if let Some(stem) = lower.strip_suffix("ies") {
            if !stem.is_empty() {
                return format!("{stem}y");
            }
        }
        if let Some(stem) = lower.strip_suffix("ed") {
            if stem.len() >= 2 {
                if Self::ends_with_double_letter(stem) && !stem.ends_with("ll") && !stem.ends_with("ss") {
                    return stem[..stem.len() - 1].to_string();
                }
                if Self::wants_final_e(stem) {
                    return format!("{stem}e");
                }
                return stem.to_string();
            }
        }
        if lower.ends_with('s')
            && !lower.ends_with("ss")
            && !lower.ends_with("us")
            && !lower.ends_with("is")
            && lower.len() > 2
        {
            return lower[..lower.len() - 1].to_string();
        }
        lower
    }
}

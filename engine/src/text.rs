//! Text normalization helpers
//!
//! Intent routing, FAQ lookup and the relevance guardrail all compare user text
//! against fixed phrases. They share one normalization so that a phrase
//! matches the same way everywhere: lowercase, punctuation folded to spaces,
//! whitespace collapsed, and matches only on whole-token boundaries.

/// Normalize text for phrase comparison
pub fn normalize(text: &str) -> String {
    let folded: String = text
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '\'' { c } else { ' ' })
        .collect();

    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split normalized text into tokens
pub fn tokens(text: &str) -> Vec<String> {
    normalize(text)
        .split(' ')
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Check whether `phrase` occurs in already-normalized `haystack` on token boundaries
pub fn contains_phrase(haystack: &str, phrase: &str) -> bool {
    let phrase = normalize(phrase);
    if phrase.is_empty() {
        return false;
    }
    format!(" {} ", haystack).contains(&format!(" {} ", phrase))
}

/// Check whether any of `phrases` occurs in `text`
pub fn contains_any(text: &str, phrases: &[&str]) -> bool {
    let haystack = normalize(text);
    phrases.iter().any(|p| contains_phrase(&haystack, p))
}

/// Words that end a captured phrase
const PHRASE_STOPS: &[&str] = &[
    " for ", " that ", " which ", " so ", " because ", " and i ", " with my ",
];

/// Leading articles dropped from a captured phrase
const ARTICLES: &[&str] = &["a ", "an ", "the ", "my ", "our "];

/// Maximum number of words kept in a captured phrase
const MAX_PHRASE_WORDS: usize = 8;

/// Capture the phrase that follows the first matching marker.
///
/// The result is normalized, cut at the end of the clause and stripped of
/// leading articles, e.g. `"a course on Social Media Marketing for founders."`
/// with marker `"course on"` yields `"social media marketing"`.
pub fn phrase_after(text: &str, markers: &[&str]) -> Option<String> {
    let haystack = format!(" {} ", normalize_clauses(text));

    let rest = markers.iter().find_map(|marker| {
        let needle = format!(" {} ", normalize(marker));
        haystack
            .find(&needle)
            .map(|idx| haystack[idx + needle.len()..].to_string())
    })?;

    // Cut at the end of the clause
    let mut clause = rest.split('|').next().unwrap_or_default().to_string();
    for stop in PHRASE_STOPS {
        if let Some(idx) = format!(" {}", clause).find(stop) {
            clause.truncate(idx.saturating_sub(1).min(clause.len()));
        }
    }

    let mut clause = clause.trim().to_string();
    for article in ARTICLES {
        if let Some(stripped) = clause.strip_prefix(article) {
            clause = stripped.to_string();
        }
    }

    let words: Vec<&str> = clause.split_whitespace().take(MAX_PHRASE_WORDS).collect();
    if words.is_empty() {
        None
    } else {
        Some(words.join(" "))
    }
}

/// Normalized text in front of the earliest marker, if any marker occurs.
///
/// `"Plan a course on pricing"` with marker `"course on"` yields `"plan a"`.
pub fn text_before(text: &str, markers: &[&str]) -> Option<String> {
    let haystack = format!(" {} ", normalize(text));

    markers
        .iter()
        .filter_map(|marker| {
            let needle = format!(" {} ", normalize(marker));
            haystack.find(&needle)
        })
        .min()
        .map(|idx| haystack[..idx].trim().to_string())
}

/// Normalize while keeping clause boundaries as `|` separators
fn normalize_clauses(text: &str) -> String {
    text.split(|c| matches!(c, '.' | '?' | '!' | ',' | ';' | ':' | '\n'))
        .map(normalize)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" | ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_folds_punctuation_and_case() {
        assert_eq!(
            normalize("  How LONG should each module be?? "),
            "how long should each module be"
        );
    }

    #[test]
    fn test_contains_phrase_respects_token_boundaries() {
        let haystack = normalize("Our refunds policy");
        assert!(contains_phrase(&haystack, "refunds"));
        assert!(!contains_phrase(&haystack, "refund"));
        assert!(contains_phrase(&haystack, "refunds policy"));
    }

    #[test]
    fn test_contains_any() {
        assert!(contains_any("How long should each module be?", &["how long"]));
        assert!(!contains_any("Tell me a joke", &["how long", "module"]));
    }

    #[test]
    fn test_phrase_after_cuts_clause() {
        let topic = phrase_after(
            "I need help planning a course on social media marketing for small businesses.",
            &["course on", "course about"],
        );
        assert_eq!(topic.as_deref(), Some("social media marketing"));
    }

    #[test]
    fn test_phrase_after_stops_at_sentence_end() {
        let topic = phrase_after("Build a course about pricing. Then review it", &["course about"]);
        assert_eq!(topic.as_deref(), Some("pricing"));
    }

    #[test]
    fn test_phrase_after_strips_articles() {
        let module = phrase_after("Give me lesson content for the launch module", &["content for"]);
        assert_eq!(module.as_deref(), Some("launch module"));
    }

    #[test]
    fn test_text_before_uses_earliest_marker() {
        let markers = ["course on", "module on"];
        assert_eq!(
            text_before("Review my module on pricing in the course on sales", &markers).as_deref(),
            Some("review my")
        );
        assert_eq!(text_before("Course on pricing", &markers).as_deref(), Some(""));
        assert_eq!(text_before("How much should I charge?", &markers), None);
    }

    #[test]
    fn test_phrase_after_missing_marker() {
        assert_eq!(phrase_after("Hello there", &["course on"]), None);
    }
}

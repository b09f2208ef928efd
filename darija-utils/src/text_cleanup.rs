//! Darija text rewriting and speech preparation
//!
//! This module pushes generated text towards colloquial Moroccan Darija by
//! replacing Standard Arabic constructs, and prepares text for narration by
//! inserting pacing, emphasis and pronunciation markup.

use std::sync::LazyLock;

use regex::{NoExpand, Regex};

use crate::patterns::{CANONICAL_OPENERS, EMPHASIS_PHRASES};

/// Prepended to texts that contain neither canonical opener.
pub const OPENER_PREFIX: &str = "أ صاحبي، ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Matcher {
    /// Every occurrence of the substring.
    Literal(&'static str),
    /// Occurrences delimited by Unicode word boundaries.
    Word(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RewriteRule {
    pub matcher: Matcher,
    pub replacement: &'static str,
}

const fn literal(from: &'static str, to: &'static str) -> RewriteRule {
    RewriteRule {
        matcher: Matcher::Literal(from),
        replacement: to,
    }
}

const fn word(from: &'static str, to: &'static str) -> RewriteRule {
    RewriteRule {
        matcher: Matcher::Word(from),
        replacement: to,
    }
}

/// Substitutions applied in this exact order. Each rule sees the output of
/// the previous ones, so "كيف" (rule 8) also rewrites the "كيفاش" produced
/// by rule 6.
pub const REWRITE_RULES: [RewriteRule; 15] = [
    literal("في ال", "ف ال"),
    literal("لديك", "عندك"),
    literal("يمكنك أن", "تقدر"),
    literal("يجب عليك", "خاصك"),
    literal("دعونا نبدأ", "يالله نبداو"),
    literal("كيف يمكن", "كيفاش ممكن"),
    literal("ماذا", "شنو"),
    literal("كيف", "كيفاش"),
    literal("هل تعرف", "واش تعرف"),
    literal("جيد جداً", "مزيان بزاف"),
    literal("لا بأس", "ما علاش"),
    word("أن", "باش"),     // "that", purpose
    word("سوف", "غادي"),   // future
    word("يعمل", "كايخدم"), // "works"
    word("نقوم", "كنديرو"), // "we do"
];

fn word_regex(word: &str) -> Regex {
    Regex::new(&format!(r"\b{}\b", regex::escape(word))).expect("escaped word is a valid regex")
}

static WORD_REGEXES: LazyLock<Vec<Option<Regex>>> = LazyLock::new(|| {
    REWRITE_RULES
        .iter()
        .map(|rule| match rule.matcher {
            Matcher::Literal(_) => None,
            Matcher::Word(w) => Some(word_regex(w)),
        })
        .collect()
});

impl RewriteRule {
    fn apply(&self, text: &str, compiled: Option<&Regex>) -> String {
        match (self.matcher, compiled) {
            (Matcher::Word(_), Some(re)) => {
                re.replace_all(text, NoExpand(self.replacement)).into_owned()
            }
            (Matcher::Literal(from), _) | (Matcher::Word(from), None) => {
                text.replace(from, self.replacement)
            }
        }
    }
}

/// Rewrite `text` towards colloquial Darija
///
/// Applies [`REWRITE_RULES`] in order, then prepends [`OPENER_PREFIX`] if
/// neither canonical opener occurs anywhere in the result. Running it twice
/// is not guaranteed to be a no-op.
pub fn rewrite(text: &str) -> String {
    let mut result = text.to_string();
    for (rule, compiled) in REWRITE_RULES.iter().zip(WORD_REGEXES.iter()) {
        result = rule.apply(&result, compiled.as_ref());
    }

    if !CANONICAL_OPENERS.iter().any(|opener| result.contains(opener)) {
        result.insert_str(0, OPENER_PREFIX);
    }

    result
}

static SENTENCE_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!؟]").expect("valid sentence punctuation regex"));
static CLAUSE_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[،,]").expect("valid clause punctuation regex"));
static EMPHASIS_REGEXES: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    EMPHASIS_PHRASES
        .iter()
        .map(|phrase| (*phrase, word_regex(phrase)))
        .collect()
});

const TECHNICAL_TERM: &str = "الذكاء الاصطناعي";
const ALGORITHM: &str = "خوارزمية";

/// Prepare dialect text for the speech API
///
/// - a 0.7s break after sentence punctuation, 0.3s after clause punctuation
/// - moderate emphasis around the fixed Darija phrases
/// - a 0.4s break after "الذكاء الاصطناعي"
/// - IPA guidance for "خوارزمية"
pub fn prepare_for_speech(text: &str) -> String {
    let processed = SENTENCE_END.replace_all(text, r#"$0<break time="0.7s"/>"#);
    let mut processed = CLAUSE_END
        .replace_all(&processed, r#"$0<break time="0.3s"/>"#)
        .into_owned();

    for (phrase, re) in EMPHASIS_REGEXES.iter() {
        let tagged = format!(r#"<emphasis level="moderate">{phrase}</emphasis>"#);
        processed = re.replace_all(&processed, NoExpand(&tagged)).into_owned();
    }

    processed
        .replace(TECHNICAL_TERM, &format!(r#"{TECHNICAL_TERM}<break time="0.4s"/>"#))
        .replace(
            ALGORITHM,
            &format!(r#"<phoneme alphabet="ipa" ph="xawarizmi.ja">{ALGORITHM}</phoneme>"#),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rewrite_contracts_fi_al() {
        let result = rewrite("أ صاحبي في البيت");
        assert_eq!(result, "أ صاحبي ف البيت");
    }

    #[test]
    fn test_rewrite_prepends_opener() {
        let result = rewrite("هاد الشي مهم");
        assert_eq!(result, "أ صاحبي، هاد الشي مهم");
    }

    #[test]
    fn test_rewrite_keeps_existing_opener() {
        // the second opener anywhere in the text is enough
        let result = rewrite("هاد الشي مهم، باغي نقوليك");
        assert_eq!(result, "هاد الشي مهم، باغي نقوليك");
    }

    #[test]
    fn test_rewrite_standard_phrases() {
        assert_eq!(rewrite("أ صاحبي لديك"), "أ صاحبي عندك");
        assert_eq!(rewrite("أ صاحبي يمكنك أن تقرا"), "أ صاحبي تقدر تقرا");
        assert_eq!(rewrite("أ صاحبي يجب عليك"), "أ صاحبي خاصك");
        assert_eq!(rewrite("أ صاحبي دعونا نبدأ"), "أ صاحبي يالله نبداو");
        assert_eq!(rewrite("أ صاحبي ماذا"), "أ صاحبي شنو");
        assert_eq!(rewrite("أ صاحبي هل تعرف"), "أ صاحبي واش تعرف");
        assert_eq!(rewrite("أ صاحبي جيد جداً"), "أ صاحبي مزيان بزاف");
        assert_eq!(rewrite("أ صاحبي لا بأس"), "أ صاحبي ما علاش");
    }

    #[test]
    fn test_rewrite_rule_order_is_observable() {
        // rule 6 produces "كيفاش", which rule 8 matches again
        assert_eq!(rewrite("أ صاحبي كيف يمكن"), "أ صاحبي كيفاشاش ممكن");
        assert_eq!(rewrite("أ صاحبي كيف"), "أ صاحبي كيفاش");
    }

    #[test]
    fn test_rewrite_is_not_idempotent() {
        let once = rewrite("كيف");
        let twice = rewrite(&once);
        assert_eq!(once, "أ صاحبي، كيفاش");
        assert_eq!(twice, "أ صاحبي، كيفاشاش");
    }

    #[test]
    fn test_rewrite_whole_words_only() {
        assert_eq!(rewrite("أ صاحبي سوف نقوم"), "أ صاحبي غادي كنديرو");
        assert_eq!(rewrite("أ صاحبي هو يعمل"), "أ صاحبي هو كايخدم");
        assert_eq!(rewrite("أ صاحبي باغي أن نمشي"), "أ صاحبي باغي باش نمشي");
        // "أن" inside a longer word is left alone
        assert_eq!(rewrite("أ صاحبي الأنترنيت"), "أ صاحبي الأنترنيت");
    }

    #[test]
    fn test_rewrite_untouched_text() {
        let text = "أ صاحبي، واش عرفتي؟";
        assert_eq!(rewrite(text), text);
    }

    #[test]
    fn test_speech_breaks() {
        assert_eq!(
            prepare_for_speech("مرحبا. سلام، لا"),
            r#"مرحبا.<break time="0.7s"/> سلام،<break time="0.3s"/> لا"#
        );
    }

    #[test]
    fn test_speech_emphasis() {
        assert_eq!(
            prepare_for_speech("واش عرفتي؟"),
            r#"<emphasis level="moderate">واش عرفتي</emphasis>؟<break time="0.7s"/>"#
        );
        // no emphasis inside a longer word
        assert_eq!(prepare_for_speech("بصحتك"), "بصحتك");
    }

    #[test]
    fn test_speech_technical_terms() {
        assert_eq!(
            prepare_for_speech("الذكاء الاصطناعي"),
            r#"الذكاء الاصطناعي<break time="0.4s"/>"#
        );
        assert_eq!(
            prepare_for_speech("خوارزمية"),
            r#"<phoneme alphabet="ipa" ph="xawarizmi.ja">خوارزمية</phoneme>"#
        );
    }
}

//! Static classification of Darija vocabulary and grammar markers.

/// Four ordered collections of dialect fragments, loaded once and never mutated.
#[derive(Debug, Clone, Copy)]
pub struct PatternSet {
    /// Everyday Darija expressions a natural text tends to contain.
    pub essential: &'static [&'static str],
    /// Darija-specific grammar structures.
    pub grammar: &'static [&'static str],
    /// Standard Arabic phrasing that must not appear.
    pub forbidden: &'static [&'static str],
    /// Typical conversation openers.
    pub starters: &'static [&'static str],
}

pub const PATTERNS: PatternSet = PatternSet {
    essential: &[
        "باغي",
        "عندك",
        "كيفاش",
        "شنو",
        "واش",
        "مزيان",
        "ما علاش",
        "يالله",
        "ديالك",
        "ف",
        "هاد الشي",
        "أول حاجة",
        "صاحبي",
        "واخا",
        "بصح",
        "معقولة",
        "غادي",
        "كاين",
        "ماكاينش",
        "بلاك",
    ],
    grammar: &[
        "ف ال",    // "في ال" contracted
        "ديال ال", // possessive
        "هاد ال",  // "this"
        "داك ال",  // "that"
        "كي",
        "كيفاش",
        "غادي ن", // future tense
        "غادي ت",
        "كا", // present continuous prefix
    ],
    forbidden: &[
        "لديك",
        "يمكنك أن",
        "على دراية",
        "من الممكن",
        "يجب عليك",
        "في هذه الحالة",
        "بإمكانك",
        "دعونا نبدأ",
        "يفضل أن",
        "ينبغي",
        "بوسعك",
        "من المفترض",
        "من الأفضل",
        "كما تعلم",
        "كما ذكرنا",
    ],
    starters: &[
        "يالله نشوفو",
        "باغين نفهمو",
        "واش عرفتي",
        "هاد الشي",
        "أول حاجة",
        "ف الآخر",
        "بصح",
        "أ صاحبي",
        "واخا",
        "معقولة",
    ],
};

/// Expressions the scorer requires; at least three must appear in a chunk.
pub const MANDATORY_EXPRESSIONS: [&str; 7] = [
    "باغي نقوليك",
    "واش عرفتي",
    "هاد الشي مهم",
    "يالله نشوفو",
    "كيفاش كايخدم",
    "أ صاحبي",
    "بصح",
];

/// Grammar markers the scorer requires; at least two must appear in a chunk.
pub const GRAMMAR_MARKERS: [&str; 6] = ["ف ال", "ديال ال", "هاد ال", "كايخدم", "كايدير", "غادي"];

/// A text containing either of these already opens like a Darija speaker.
pub const CANONICAL_OPENERS: [&str; 2] = ["أ صاحبي", "باغي نقوليك"];

/// Phrases narrated with moderate emphasis.
pub const EMPHASIS_PHRASES: [&str; 10] = [
    "باغي نقوليك",
    "واش عرفتي",
    "أ صاحبي",
    "هاد الشي",
    "بصح",
    "يالله",
    "كيفاش",
    "مزيان بزاف",
    "معقولة",
    "واخا",
];

/// Returns the entries of `patterns` that occur in `text` as literal substrings.
pub fn find_in<'a>(text: &str, patterns: &[&'a str]) -> Vec<&'a str> {
    patterns
        .iter()
        .copied()
        .filter(|pattern| text.contains(pattern))
        .collect()
}

use serde::{Deserialize, Serialize};

/// Word-class markers recognized in the analysis stream.
pub const WORD_CLASSES: &[&str] = &[
    "N", "V", "Pali", "Conj", "Adv", "Interj", "Pron", "Prop", "Num", "Symbol",
];

/// Case markers normalized to absolutive when generating candidate forms.
pub const CASE_MARKERS: &[&str] = &[
    "Rel", "Trm", "Abl", "Lok", "Aeq", "Ins", "Via", "Nom", "Akk",
];

/// Grammar markers carrying lexical identity (verb valence and reflexive
/// voice). All other Gram/ markers are stripped from comparison forms.
pub const PROTECTED_GRAM: &[&str] = &["Gram/HV", "Gram/IV", "Gram/TV", "Gram/RV"];

/// Valence markers the resolver may drop as a fallback: some entries are
/// indexed without them. Reflexive voice is never dropped.
pub const VALENCE_GRAM: &[&str] = &["Gram/HV", "Gram/IV", "Gram/TV"];

/// Marker families with no lexical identity: preserved in output, stripped
/// from comparison forms.
pub const SURFACE_PREFIXES: &[&str] = &["Dial/", "Orth/", "OLang/", "Olang/", "Heur/", "Hyb/"];

/// Adjective/adverb-forming prefix markers that may be stripped during
/// resolution and re-attached as semantic tags.
pub const PREFIX_MARKERS: &[&str] = &["Prefix/TA", "Prefix/AA"];

/// Person/number agreement markers used for pronoun reinterpretation.
pub const PERSON_MARKERS: &[&str] = &["1Sg", "2Sg", "3Sg", "1Pl", "2Pl", "3Pl"];

/// The literal compounding boundary marker.
pub const COMPOUND_MARKER: &str = "U";

/// The hybrid-script variant meaning "already normalized"; any other Hyb/
/// token marks the line hybrid.
pub const HYBRID_NORMALIZED: &str = "Hyb/Orth";

pub const TRANSLATION_MARKER: &str = "<tr>";
pub const TRANSLATION_DONE: &str = "<tr-done>";

// Some word classes use a different notation in the lexicon.
const WC_LEXICON_MAP: &[(&str, &str)] = &[
    ("N", "T"),
    ("V", "V"),
    ("Pali", "Pali"),
    ("Conj", "Conj"),
    ("Adv", "Adv"),
    ("Interj", "Intj"),
    ("Pron", "Pron"),
    ("Prop", "Prop"),
    ("Num", "Num"),
    ("Symbol", "Symbol"),
    ("Adj", "Adj"),
    ("Part", "Part"),
    ("Prep", "Prep"),
];

/// Map a stream word class to the lexicon's notation.
pub fn wordclass_to_lexicon(wc: &str) -> &str {
    WC_LEXICON_MAP
        .iter()
        .find(|(s, _)| *s == wc)
        .map(|(_, k)| *k)
        .unwrap_or(wc)
}

/// Map a lexicon word class back to the stream notation.
pub fn wordclass_from_lexicon(wc: &str) -> &str {
    WC_LEXICON_MAP
        .iter()
        .find(|(_, k)| *k == wc)
        .map(|(s, _)| *s)
        .unwrap_or(wc)
}

/// Kind of one whitespace-delimited token in an analysis line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// Quoted lemma, e.g. `"taku"`.
    Lemma,
    /// Word-class marker, possibly i-prefixed (internal).
    WordClass,
    /// Derivation/compounding morpheme: `U` or two-or-more uppercase letters.
    Morpheme,
    /// `Der/..` derivation class tag.
    Derivation,
    /// `Gram/..` grammar marker.
    Gram,
    /// `Sem/..` or `iSem/..` semantic tag.
    Sem,
    /// `Prefix/..` prefix marker.
    PrefixMarker,
    /// Dialectal/orthographic/heuristic/hybrid marker.
    Surface,
    /// Flexion token, e.g. `Ind`, `3Sg`, `Abs`.
    Flexion,
    Other,
}

/// Classify one raw token.
pub fn classify(text: &str) -> TokenKind {
    if text.starts_with('"') {
        return TokenKind::Lemma;
    }
    let bare = text.strip_prefix('i').unwrap_or(text);
    if WORD_CLASSES.contains(&bare) {
        return TokenKind::WordClass;
    }
    if text == COMPOUND_MARKER
        || (text.chars().count() >= 2 && text.chars().all(|c| c.is_uppercase()))
    {
        return TokenKind::Morpheme;
    }
    if text.starts_with("Der/") {
        return TokenKind::Derivation;
    }
    if text.starts_with("Gram/") {
        return TokenKind::Gram;
    }
    if text.starts_with("Sem/") || text.starts_with("iSem/") {
        return TokenKind::Sem;
    }
    if text.starts_with("Prefix/") {
        return TokenKind::PrefixMarker;
    }
    if SURFACE_PREFIXES.iter().any(|p| text.starts_with(p)) {
        return TokenKind::Surface;
    }
    if is_flexion(text) {
        return TokenKind::Flexion;
    }
    TokenKind::Other
}

/// Flexion tokens: optional `i`, optional digit, an uppercase letter followed
/// by a lowercase letter, and no slash anywhere (`Ind`, `3Sg`, `3PlO`).
fn is_flexion(text: &str) -> bool {
    if text.contains('/') {
        return false;
    }
    let rest = text.strip_prefix('i').unwrap_or(text);
    let rest = rest
        .strip_prefix(|c: char| c.is_ascii_digit())
        .unwrap_or(rest);
    let mut chars = rest.chars();
    matches!(
        (chars.next(), chars.next()),
        (Some(u), Some(l)) if u.is_uppercase() && l.is_lowercase()
    )
}

/// One token of an analysis line, with its original text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub kind: TokenKind,
}

impl Token {
    pub fn new(text: &str) -> Self {
        Token {
            kind: classify(text),
            text: text.to_string(),
        }
    }

    /// True for i-prefixed (demoted) word-class and semantic tokens.
    pub fn is_internal(&self) -> bool {
        matches!(self.kind, TokenKind::WordClass | TokenKind::Sem | TokenKind::Flexion)
            && self.text.starts_with('i')
    }

    /// Token text with any internal prefix removed.
    pub fn bare(&self) -> &str {
        if self.is_internal() {
            &self.text[1..]
        } else {
            &self.text
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    Lemma,
    WordClass,
    Morpheme,
}

/// One morpheme unit of an analysis line: a boundary token (lemma, word-class
/// marker, or derivation morpheme) together with the tags and flexion that
/// follow it up to the next boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub tokens: Vec<Token>,
}

impl Segment {
    pub fn kind(&self) -> SegmentKind {
        match self.tokens.first().map(|t| t.kind) {
            Some(TokenKind::WordClass) => SegmentKind::WordClass,
            Some(TokenKind::Morpheme) => SegmentKind::Morpheme,
            _ => SegmentKind::Lemma,
        }
    }

    /// Bare word class for word-class segments.
    pub fn word_class(&self) -> Option<&str> {
        let first = self.tokens.first()?;
        if first.kind == TokenKind::WordClass {
            Some(first.bare())
        } else {
            None
        }
    }

    /// Word class derived from a `Der/xy` tag on a morpheme segment: the
    /// second letter names the class the derivation produces.
    pub fn derived_class(&self) -> Option<&'static str> {
        if self.kind() != SegmentKind::Morpheme {
            return None;
        }
        self.tokens.iter().find_map(|t| {
            let rest = t.text.strip_prefix("Der/")?;
            let mut chars = rest.chars();
            match (chars.next(), chars.next()) {
                (Some('n' | 'v'), Some('n')) => Some("N"),
                (Some('n' | 'v'), Some('v')) => Some("V"),
                _ => None,
            }
        })
    }

    /// Tokens contributing lexical identity: lemma, morpheme, derivation and
    /// prefix tags, valence grammar markers, and the bare word class.
    pub fn comparison_tokens(&self) -> Vec<&str> {
        self.tokens
            .iter()
            .filter_map(|t| match t.kind {
                TokenKind::Lemma
                | TokenKind::Morpheme
                | TokenKind::Derivation
                | TokenKind::PrefixMarker => Some(t.text.as_str()),
                TokenKind::WordClass => Some(t.bare()),
                TokenKind::Gram if PROTECTED_GRAM.contains(&t.text.as_str()) => {
                    Some(t.text.as_str())
                }
                _ => None,
            })
            .collect()
    }

    /// Bare flexion token texts, in order.
    pub fn flexion(&self) -> Vec<&str> {
        self.tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Flexion)
            .map(|t| t.bare())
            .collect()
    }

    /// Semantic codes attached to this segment (internal prefix stripped).
    pub fn sem_codes(&self) -> Vec<&str> {
        self.tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Sem)
            .filter_map(|t| t.bare().strip_prefix("Sem/"))
            .collect()
    }
}

/// One tokenized interpretation of one surface word.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisLine {
    pub segments: Vec<Segment>,
    /// Set when the line carries a hybrid-script marker other than the
    /// already-normalized variant.
    pub hybrid: bool,
}

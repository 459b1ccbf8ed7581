//! Candidate comparison forms for one span, ordered most-specific first.

use crate::types::{CASE_MARKERS, VALENCE_GRAM};

/// Everything the candidate generator needs to know about one span.
#[derive(Debug, Clone, Default)]
pub struct SpanContext {
    /// Comparison tokens of the span joined with single spaces, ending with
    /// the terminating word class.
    pub base: String,
    /// The span's word class (from the terminating marker or derivation tag).
    pub word_class: String,
    /// Bare flexion tokens of the terminating segment.
    pub flexion: Vec<String>,
    pub has_iv: bool,
    pub has_tv: bool,
    pub hybrid: bool,
}

impl SpanContext {
    pub fn new(base: String, word_class: String, flexion: Vec<String>, hybrid: bool) -> Self {
        let has_iv = base.split(' ').any(|t| t == "Gram/IV");
        let has_tv = base.split(' ').any(|t| t == "Gram/TV");
        SpanContext {
            base,
            word_class,
            flexion,
            has_iv,
            has_tv,
            hybrid,
        }
    }
}

/// Generate the ordered, deduplicated candidate list for a span.
///
/// Candidates are tried in this order: the bare base form, then base plus
/// flexion suffixes from longest to shortest (each with case-normalized,
/// singularized, and possessive-stripped variants), then baseform defaults
/// when the span carries no flexion at all. On hybrid lines every candidate
/// is doubled with its quoted lemma rewritten as a bare uppercase form.
pub fn candidate_forms(ctx: &SpanContext) -> Vec<String> {
    let mut forms = vec![ctx.base.clone()];

    if ctx.flexion.is_empty() {
        forms.extend(baseform_defaults(ctx));
    } else {
        for take in (1..=ctx.flexion.len()).rev() {
            for suffix in flexion_variants(&ctx.flexion[..take]) {
                forms.push(format!("{} {}", ctx.base, suffix.join(" ")));
            }
        }
    }

    if ctx.hybrid {
        let doubled: Vec<String> = forms
            .iter()
            .flat_map(|f| [f.clone(), hybrid_form(f)])
            .collect();
        forms = doubled;
    }

    dedup_keep_order(forms)
}

/// Default flexions assumed when an entry names a bare stem: absolutive and
/// instrumental citation forms for nominals, indicative third person for
/// verbs (object agreement when the stem is transitive; both valences when
/// the stem carries no valence marker at all).
fn baseform_defaults(ctx: &SpanContext) -> Vec<String> {
    let mut out = Vec::new();
    if ctx.word_class != "V" {
        for flex in ["Abs Sg", "Ins Sg", "Abs Pl", "Ins Pl"] {
            out.push(format!("{} {}", ctx.base, flex));
        }
        return out;
    }
    let ambiguous = !ctx.has_iv && !ctx.has_tv;
    if ctx.has_iv || ambiguous {
        out.push(format!("{} Ind 3Sg", ctx.base));
        out.push(format!("{} Ind 3Pl", ctx.base));
    }
    if ctx.has_tv || ambiguous {
        out.push(format!("{} Ind 3Sg 3SgO", ctx.base));
        out.push(format!("{} Ind 3Pl 3PlO", ctx.base));
    }
    out
}

/// Variants of one flexion suffix: as written, oblique cases replaced by
/// absolutive, plural markers singularized, and possessive markers dropped.
/// Applied combinatorially so e.g. `Rel Pl` also yields `Abs Sg`.
fn flexion_variants(flexion: &[String]) -> Vec<Vec<String>> {
    let mut variants: Vec<Vec<String>> = vec![flexion.to_vec()];

    for v in variants.clone() {
        let normalized: Vec<String> = v
            .iter()
            .map(|t| {
                if CASE_MARKERS.contains(&t.as_str()) {
                    "Abs".to_string()
                } else {
                    t.clone()
                }
            })
            .collect();
        if normalized != v {
            variants.push(normalized);
        }
    }
    for v in variants.clone() {
        let singular: Vec<String> = v.iter().map(|t| singularize(t)).collect();
        if singular != v {
            variants.push(singular);
        }
    }
    for v in variants.clone() {
        let stripped: Vec<String> = v
            .iter()
            .filter(|t| !t.ends_with("Poss"))
            .cloned()
            .collect();
        if stripped != v && !stripped.is_empty() {
            variants.push(stripped);
        }
    }

    dedup_keep_order(variants)
}

fn singularize(token: &str) -> String {
    match token {
        "Pl" => "Sg".to_string(),
        "1Pl" => "1Sg".to_string(),
        "2Pl" => "2Sg".to_string(),
        "3Pl" => "3Sg".to_string(),
        "3PlO" => "3SgO".to_string(),
        _ => token.to_string(),
    }
}

/// Rewrite a candidate's quoted lemma as a bare uppercase stem, for hybrid
/// lines whose roots the lexicon stores in uppercase notation.
fn hybrid_form(form: &str) -> String {
    let Some(tail) = form.strip_prefix('"') else {
        return form.to_string();
    };
    let Some(close) = tail.find('"') else {
        return form.to_string();
    };
    let lemma: String = tail[..close].to_uppercase();
    format!("{}{}", lemma, &tail[close + 1..])
}

fn dedup_keep_order<T: PartialEq + Clone>(items: Vec<T>) -> Vec<T> {
    let mut out: Vec<T> = Vec::with_capacity(items.len());
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

/// Strip valence grammar markers from a candidate form.
pub fn strip_valence_gram(form: &str) -> String {
    form.split(' ')
        .filter(|t| !VALENCE_GRAM.contains(t))
        .collect::<Vec<_>>()
        .join(" ")
}

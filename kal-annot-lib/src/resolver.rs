//! Tiered resolution of candidate forms against the lexicon.

use crate::candidates::strip_valence_gram;
use crate::lexicon::{LexemeId, Lexicon};
use crate::types::{PERSON_MARKERS, PREFIX_MARKERS};

/// Outcome of resolving one span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Matching lexeme ids, ascending, distinct.
    pub ids: Vec<LexemeId>,
    /// The form that matched, after any fallback rewriting.
    pub matched: String,
    /// Prefix marker removed by the fallback tier, to be re-attached in
    /// gloss output.
    pub stripped_prefix: Option<String>,
}

pub struct Resolver<'a> {
    lexicon: &'a Lexicon,
}

impl<'a> Resolver<'a> {
    pub fn new(lexicon: &'a Lexicon) -> Self {
        Resolver { lexicon }
    }

    /// Try each candidate in order; within a candidate, try the form as
    /// written, then with valence grammar markers removed, then with a
    /// prefix marker removed, then reinterpreted as a pronoun. The first
    /// tier with any hits wins.
    pub fn resolve(&self, forms: &[String], word_class: &str) -> Option<Resolution> {
        for form in forms {
            if let Some(ids) = self.exact(form) {
                return Some(Resolution {
                    ids,
                    matched: form.clone(),
                    stripped_prefix: None,
                });
            }

            let mut current = form.clone();

            // Valence markers inside a quoted-root span are part of the
            // stored key; only derivation-internal spans drop them.
            if !current.starts_with('"') {
                let stripped = strip_valence_gram(&current);
                if stripped != current {
                    current = stripped;
                    if let Some(ids) = self.exact(&current) {
                        return Some(Resolution {
                            ids,
                            matched: current,
                            stripped_prefix: None,
                        });
                    }
                }
            }

            if let Some((without, prefix)) = remove_prefix_marker(&current) {
                current = without;
                if let Some(ids) = self.exact(&current) {
                    return Some(Resolution {
                        ids,
                        matched: current,
                        stripped_prefix: Some(prefix),
                    });
                }
            }

            if word_class == "N" {
                for variant in pronoun_variants(&current) {
                    if let Some(ids) = self.exact(&variant) {
                        return Some(Resolution {
                            ids,
                            matched: variant,
                            stripped_prefix: None,
                        });
                    }
                }
            }
        }
        None
    }

    /// First-stage prefix filter plus full equality check.
    fn exact(&self, form: &str) -> Option<Vec<LexemeId>> {
        let mut ids: Vec<LexemeId> = self
            .lexicon
            .lookup_by_prefix(form, true)
            .into_iter()
            .filter(|(key, _)| key == form)
            .map(|(_, id)| *id)
            .collect();
        if ids.is_empty() {
            return None;
        }
        ids.sort_unstable();
        ids.dedup();
        Some(ids)
    }
}

fn remove_prefix_marker(form: &str) -> Option<(String, String)> {
    let tokens: Vec<&str> = form.split(' ').collect();
    let pos = tokens.iter().position(|t| PREFIX_MARKERS.contains(t))?;
    let prefix = tokens[pos].to_string();
    let rest: Vec<&str> = tokens
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != pos)
        .map(|(_, t)| *t)
        .collect();
    Some((rest.join(" "), prefix))
}

/// Nominal forms reinterpreted as pronouns: the word class becomes `Pron`
/// and the final number marker is exhaustively replaced with each person
/// marker (pronoun entries are stored with explicit person).
fn pronoun_variants(form: &str) -> Vec<String> {
    let tokens: Vec<&str> = form.split(' ').collect();
    let Some(wc_pos) = tokens.iter().rposition(|t| *t == "N") else {
        return Vec::new();
    };
    let mut base: Vec<String> = tokens.iter().map(|t| t.to_string()).collect();
    base[wc_pos] = "Pron".to_string();

    let mut out = vec![base.join(" ")];
    let number_pos = base
        .iter()
        .rposition(|t| t == "Sg" || t == "Pl" || PERSON_MARKERS.contains(&t.as_str()));
    for person in PERSON_MARKERS {
        let mut v = base.clone();
        match number_pos {
            Some(pos) => v[pos] = person.to_string(),
            None => v.push(person.to_string()),
        }
        out.push(v.join(" "));
    }
    out
}

//! In-memory lexicon loaded from a JSON snapshot.
//!
//! The snapshot carries lexeme records for every language, the semantic
//! class table, and the synonym graph linking lexemes across languages.
//! Kalaallisut records additionally carry stem notations which are expanded
//! into comparison keys at load time.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub type LexemeId = u32;

/// Length of the prefix used as the fast first-stage lookup filter.
pub const PREFIX_LEN: usize = 16;

/// The semantic class marking bookkeeping entries that never match spans.
pub const META_CLASS: &str = "meta-cat-lib";

const UNKNOWN: &str = "UNK";

fn unknown() -> String {
    UNKNOWN.to_string()
}

#[derive(Debug, thiserror::Error)]
pub enum LexiconError {
    #[error("cannot read lexicon snapshot {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid lexicon snapshot: {0}")]
    Json(#[from] serde_json::Error),
}

/// One lexeme record as stored in the snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LexemeRecord {
    pub id: LexemeId,
    /// Display form. For Kalaallisut entries this is the annotated lexeme
    /// (possibly with derivation tags); for other languages the plain word.
    pub lexeme: String,
    /// Newline-separated stem notations (`stem+Tag+Tag`), Kalaallisut only.
    #[serde(default)]
    pub stems: String,
    /// Word class in lexicon notation (`T` for nouns, `Intj`, ...).
    pub word_class: String,
    #[serde(default = "unknown")]
    pub sem_class: String,
    #[serde(default = "unknown")]
    pub sem_class2: String,
    pub language: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemClassRow {
    pub code: String,
    /// English rendering; verbal codes start with a `:word` citation form.
    pub english: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynonymRow {
    pub lexeme: LexemeId,
    pub synonym: LexemeId,
    /// Preference order among synonyms of the same lexeme; lower wins.
    pub rank: u32,
}

/// Deserialized snapshot, before indexing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LexiconData {
    pub lexemes: Vec<LexemeRecord>,
    pub sem_classes: Vec<SemClassRow>,
    pub synonyms: Vec<SynonymRow>,
}

/// Bidirectional semantic class table: internal codes to human-readable
/// names and back. The unknown class is not mapped.
#[derive(Debug, Clone, Default)]
pub struct SemClassMap {
    to_human: HashMap<String, String>,
    to_code: HashMap<String, String>,
}

impl SemClassMap {
    pub fn human(&self, code: &str) -> Option<&str> {
        self.to_human.get(code).map(String::as_str)
    }

    pub fn code(&self, human: &str) -> Option<&str> {
        self.to_code.get(human).map(String::as_str)
    }
}

/// Indexed lexicon ready for span resolution.
pub struct Lexicon {
    prefix_index: HashMap<String, Vec<(String, LexemeId)>>,
    lexemes: HashMap<LexemeId, LexemeRecord>,
    synonyms: HashMap<LexemeId, Vec<SynonymRow>>,
    sem_classes: Vec<SemClassRow>,
}

impl Lexicon {
    pub fn from_path(path: &Path) -> Result<Self, LexiconError> {
        let raw = std::fs::read_to_string(path).map_err(|source| LexiconError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let data: LexiconData = serde_json::from_str(&raw)?;
        Ok(Self::from_data(data))
    }

    pub fn from_data(data: LexiconData) -> Self {
        let mut prefix_index: HashMap<String, Vec<(String, LexemeId)>> = HashMap::new();
        let mut lexemes = HashMap::new();
        let mut keys = 0usize;

        for rec in &data.lexemes {
            if rec.language == "kal" {
                for key in expansion_keys(rec) {
                    prefix_index
                        .entry(prefix_of(&key))
                        .or_default()
                        .push((key, rec.id));
                    keys += 1;
                }
            }
            lexemes.insert(rec.id, rec.clone());
        }

        let mut synonyms: HashMap<LexemeId, Vec<SynonymRow>> = HashMap::new();
        for row in &data.synonyms {
            synonyms.entry(row.lexeme).or_default().push(*row);
        }
        for rows in synonyms.values_mut() {
            rows.sort_by_key(|r| (r.rank, r.synonym));
        }

        tracing::debug!(
            lexemes = lexemes.len(),
            comparison_keys = keys,
            "lexicon indexed"
        );

        Lexicon {
            prefix_index,
            lexemes,
            synonyms,
            sem_classes: data.sem_classes,
        }
    }

    /// All comparison keys sharing a candidate's prefix. The caller still
    /// checks full equality; this only narrows the search.
    pub fn lookup_by_prefix(&self, form: &str, exclude_meta: bool) -> Vec<&(String, LexemeId)> {
        let Some(bucket) = self.prefix_index.get(&prefix_of(form)) else {
            return Vec::new();
        };
        bucket
            .iter()
            .filter(|(_, id)| {
                if !exclude_meta {
                    return true;
                }
                self.lexemes
                    .get(id)
                    .map(|r| r.sem_class != META_CLASS && r.sem_class != UNKNOWN)
                    .unwrap_or(false)
            })
            .collect()
    }

    pub fn lexeme(&self, id: LexemeId) -> Option<&LexemeRecord> {
        self.lexemes.get(&id)
    }

    /// Records for a set of ids, distinct and in ascending id order.
    pub fn lexemes_by_id(&self, ids: &[LexemeId]) -> Vec<&LexemeRecord> {
        let mut ids: Vec<LexemeId> = ids.to_vec();
        ids.sort_unstable();
        ids.dedup();
        ids.iter().filter_map(|id| self.lexemes.get(id)).collect()
    }

    /// Synonyms of a lexeme restricted to one target language, best first.
    pub fn synonyms_of(&self, id: LexemeId, language: &str) -> Vec<&LexemeRecord> {
        let Some(rows) = self.synonyms.get(&id) else {
            return Vec::new();
        };
        rows.iter()
            .filter_map(|r| self.lexemes.get(&r.synonym))
            .filter(|rec| rec.language == language)
            .collect()
    }

    /// Build the semantic class table. Verbal codes (`V.` prefix) map to the
    /// leading citation word of their English rendering; other codes map to
    /// themselves.
    pub fn semantic_class_table(&self) -> SemClassMap {
        let mut map = SemClassMap::default();
        for row in &self.sem_classes {
            if row.code == UNKNOWN {
                continue;
            }
            let human = if row.code.starts_with("V.") {
                match citation_word(&row.english) {
                    Some(word) => word.to_string(),
                    None => continue,
                }
            } else {
                row.code.clone()
            };
            map.to_code.insert(human.clone(), row.code.clone());
            map.to_human.insert(row.code.clone(), human);
        }
        map
    }
}

/// First component of a `:word, other words` English rendering.
fn citation_word(english: &str) -> Option<&str> {
    let tail = english.strip_prefix(':')?;
    let end = tail
        .find(|c: char| c.is_whitespace() || c == ',')
        .unwrap_or(tail.len());
    if end == 0 {
        None
    } else {
        Some(&tail[..end])
    }
}

fn prefix_of(form: &str) -> String {
    form.chars().take(PREFIX_LEN).collect()
}

/// Comparison keys for one Kalaallisut record: annotated display forms are
/// taken verbatim, stem notations are rewritten to quoted-lemma form, and
/// verb stems without a valence marker are expanded to both valences.
fn expansion_keys(rec: &LexemeRecord) -> Vec<String> {
    let mut keys = Vec::new();
    if rec.lexeme.contains(" Der/") {
        keys.push(rec.lexeme.clone());
    }
    for stem in rec.stems.lines() {
        let stem = stem.trim();
        if stem.is_empty() {
            continue;
        }
        let Some(key) = stem_key(stem) else {
            tracing::warn!(lexeme = rec.id, stem, "skipping invalid stem notation");
            continue;
        };
        if key.split(' ').any(|t| t == "V") && !key.contains(" Gram/") {
            let mut iv = Vec::new();
            let mut tv = Vec::new();
            let mut inserted = false;
            for tok in key.split(' ') {
                if tok == "V" && !inserted {
                    iv.push("Gram/IV");
                    tv.push("Gram/TV");
                    inserted = true;
                }
                iv.push(tok);
                tv.push(tok);
            }
            keys.push(iv.join(" "));
            keys.push(tv.join(" "));
        }
        keys.push(key);
    }
    keys
}

/// Rewrite `stem+Tag+Tag` notation as a quoted comparison key. The stem
/// itself may start with a literal plus sign.
fn stem_key(stem: &str) -> Option<String> {
    let search_from = usize::from(stem.starts_with('+'));
    let split = stem[search_from..].find('+')? + search_from;
    let lemma = &stem[..split];
    let tags = stem[split + 1..].replace('+', " ");
    Some(format!("\"{}\" {}", lemma, tags).trim_end().to_string())
}

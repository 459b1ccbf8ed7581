//! Turning a resolution into output tokens: semantic tags for tagging mode,
//! translation insertions for glossing mode.

use crate::lexicon::{LexemeId, Lexicon, SemClassMap};
use crate::resolver::Resolution;
use crate::types::{wordclass_from_lexicon, TRANSLATION_MARKER};

/// Distinct semantic readings of a resolved span, one tag group per reading.
/// Readings whose primary class is unknown contribute nothing; a known
/// secondary class yields a second tag. With tracing enabled each tag
/// carries the contributing lexeme ids.
pub fn sem_alternatives(
    lexicon: &Lexicon,
    map: &SemClassMap,
    resolution: &Resolution,
    trace: bool,
) -> Vec<Vec<String>> {
    let mut readings: Vec<((String, String), Vec<LexemeId>)> = Vec::new();
    for rec in lexicon.lexemes_by_id(&resolution.ids) {
        if map.human(&rec.sem_class).is_none() {
            continue;
        }
        let pair = (rec.sem_class.clone(), rec.sem_class2.clone());
        match readings.iter_mut().find(|(p, _)| *p == pair) {
            Some((_, ids)) => ids.push(rec.id),
            None => readings.push((pair, vec![rec.id])),
        }
    }
    readings.sort_by(|(a, _), (b, _)| a.cmp(b));

    readings
        .into_iter()
        .map(|((c1, c2), ids)| {
            let mut tags = vec![sem_tag(map, &c1, &ids, trace)];
            if map.human(&c2).is_some() {
                tags.push(sem_tag(map, &c2, &ids, trace));
            }
            tags
        })
        .collect()
}

fn sem_tag(map: &SemClassMap, code: &str, ids: &[LexemeId], trace: bool) -> String {
    let human = map.human(code).unwrap_or(code);
    if trace {
        let ids: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
        format!("Sem/{}={}", human, ids.join(","))
    } else {
        format!("Sem/{}", human)
    }
}

/// Translation tokens for a resolved span: quoted target lemma, its word
/// class, any prefix marker stripped during resolution, the target's
/// semantic tags, and the translation marker.
///
/// Source lexemes are walked in ascending id order. A first pass keeps only
/// sources whose semantic classes match the span's filter; if none of those
/// has a translation in the target language, a second unfiltered pass runs.
pub fn gloss_tokens(
    lexicon: &Lexicon,
    map: &SemClassMap,
    resolution: &Resolution,
    language: &str,
    sem_filter: &(String, String),
    trace: bool,
) -> Option<Vec<String>> {
    let translation = pick_translation(lexicon, resolution, language, Some(sem_filter))
        .or_else(|| pick_translation(lexicon, resolution, language, None))?;

    let wc = wordclass_from_lexicon(&capitalize(&translation.word_class)).to_string();
    let mut tokens = vec![format!("\"{}\"", translation.lexeme), wc];
    if let Some(prefix) = &resolution.stripped_prefix {
        tokens.push(prefix.clone());
    }
    for code in [&translation.sem_class, &translation.sem_class2] {
        if map.human(code).is_some() {
            tokens.push(sem_tag(map, code, &[translation.id], trace));
        }
    }
    tokens.push(TRANSLATION_MARKER.to_string());
    Some(tokens)
}

fn pick_translation<'a>(
    lexicon: &'a Lexicon,
    resolution: &Resolution,
    language: &str,
    sem_filter: Option<&(String, String)>,
) -> Option<&'a crate::lexicon::LexemeRecord> {
    for rec in lexicon.lexemes_by_id(&resolution.ids) {
        if let Some((s1, s2)) = sem_filter {
            if rec.sem_class != *s1 || rec.sem_class2 != *s2 {
                continue;
            }
        }
        if let Some(translation) = lexicon.synonyms_of(rec.id, language).first().copied() {
            return Some(translation);
        }
    }
    None
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::{LexemeRecord, LexiconData, SemClassRow, SynonymRow};

    fn record(id: u32, lexeme: &str, wc: &str, sem: &str, sem2: &str, lang: &str) -> LexemeRecord {
        LexemeRecord {
            id,
            lexeme: lexeme.to_string(),
            stems: String::new(),
            word_class: wc.to_string(),
            sem_class: sem.to_string(),
            sem_class2: sem2.to_string(),
            language: lang.to_string(),
        }
    }

    fn classes() -> Vec<SemClassRow> {
        ["PERCEPTION", "HOUSE", "BUILDING", "ARTEFACT"]
            .iter()
            .map(|c| SemClassRow {
                code: c.to_string(),
                english: c.to_string(),
            })
            .collect()
    }

    fn resolution(ids: &[u32]) -> Resolution {
        Resolution {
            ids: ids.to_vec(),
            matched: String::new(),
            stripped_prefix: None,
        }
    }

    #[test]
    fn test_distinct_readings() {
        let lex = Lexicon::from_data(LexiconData {
            lexemes: vec![
                record(1, "illu", "T", "HOUSE", "BUILDING", "kal"),
                record(2, "illu", "T", "HOUSE", "BUILDING", "kal"),
                record(3, "illu", "T", "ARTEFACT", "UNK", "kal"),
                record(4, "illu", "T", "UNK", "HOUSE", "kal"),
            ],
            sem_classes: classes(),
            synonyms: vec![],
        });
        let map = lex.semantic_class_table();
        let alts = sem_alternatives(&lex, &map, &resolution(&[1, 2, 3, 4]), false);
        assert_eq!(
            alts,
            vec![
                vec!["Sem/ARTEFACT".to_string()],
                vec!["Sem/HOUSE".to_string(), "Sem/BUILDING".to_string()],
            ]
        );
    }

    #[test]
    fn test_trace_carries_ids() {
        let lex = Lexicon::from_data(LexiconData {
            lexemes: vec![
                record(1, "illu", "T", "HOUSE", "UNK", "kal"),
                record(2, "illu", "T", "HOUSE", "UNK", "kal"),
            ],
            sem_classes: classes(),
            synonyms: vec![],
        });
        let map = lex.semantic_class_table();
        let alts = sem_alternatives(&lex, &map, &resolution(&[2, 1]), true);
        assert_eq!(alts, vec![vec!["Sem/HOUSE=1,2".to_string()]]);
    }

    #[test]
    fn test_gloss_prefers_sem_filtered_source() {
        let lex = Lexicon::from_data(LexiconData {
            lexemes: vec![
                record(1, "taku", "V", "PERCEPTION", "UNK", "kal"),
                record(2, "taku", "V", "HOUSE", "UNK", "kal"),
                record(10, "see", "V", "PERCEPTION", "UNK", "eng"),
                record(11, "roof", "T", "HOUSE", "UNK", "eng"),
            ],
            sem_classes: classes(),
            synonyms: vec![
                SynonymRow { lexeme: 1, synonym: 10, rank: 1 },
                SynonymRow { lexeme: 2, synonym: 11, rank: 1 },
            ],
        });
        let map = lex.semantic_class_table();
        let filter = ("HOUSE".to_string(), "UNK".to_string());
        let tokens =
            gloss_tokens(&lex, &map, &resolution(&[1, 2]), "eng", &filter, false).unwrap();
        assert_eq!(tokens, vec!["\"roof\"", "N", "Sem/HOUSE", "<tr>"]);
    }

    #[test]
    fn test_gloss_falls_back_unfiltered() {
        let lex = Lexicon::from_data(LexiconData {
            lexemes: vec![
                record(1, "taku", "V", "PERCEPTION", "UNK", "kal"),
                record(10, "see", "V", "PERCEPTION", "UNK", "eng"),
            ],
            sem_classes: classes(),
            synonyms: vec![SynonymRow { lexeme: 1, synonym: 10, rank: 1 }],
        });
        let map = lex.semantic_class_table();
        let filter = ("UNK".to_string(), "UNK".to_string());
        let tokens =
            gloss_tokens(&lex, &map, &resolution(&[1]), "eng", &filter, false).unwrap();
        assert_eq!(tokens, vec!["\"see\"", "V", "Sem/PERCEPTION", "<tr>"]);
    }

    #[test]
    fn test_gloss_reattaches_prefix() {
        let lex = Lexicon::from_data(LexiconData {
            lexemes: vec![
                record(1, "NNGOR Der/nv V", "V", "PERCEPTION", "UNK", "kal"),
                record(10, "become", "V", "PERCEPTION", "UNK", "eng"),
            ],
            sem_classes: classes(),
            synonyms: vec![SynonymRow { lexeme: 1, synonym: 10, rank: 1 }],
        });
        let map = lex.semantic_class_table();
        let mut res = resolution(&[1]);
        res.stripped_prefix = Some("Prefix/TA".to_string());
        let filter = ("UNK".to_string(), "UNK".to_string());
        let tokens = gloss_tokens(&lex, &map, &res, "eng", &filter, false).unwrap();
        assert_eq!(
            tokens,
            vec!["\"become\"", "V", "Prefix/TA", "Sem/PERCEPTION", "<tr>"]
        );
    }

    #[test]
    fn test_missing_translation() {
        let lex = Lexicon::from_data(LexiconData {
            lexemes: vec![record(1, "taku", "V", "PERCEPTION", "UNK", "kal")],
            sem_classes: classes(),
            synonyms: vec![],
        });
        let map = lex.semantic_class_table();
        let filter = ("UNK".to_string(), "UNK".to_string());
        assert!(gloss_tokens(&lex, &map, &resolution(&[1]), "eng", &filter, false).is_none());
    }
}

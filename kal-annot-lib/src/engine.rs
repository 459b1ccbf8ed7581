//! The annotation engine: span enumeration over tokenized lines, longest
//! match resolution, and the two output modes.

use std::collections::HashMap;

use crate::annotate;
use crate::assemble::{self, GlossInsertion, SemInsertion};
use crate::cache::ResultCache;
use crate::candidates::{candidate_forms, SpanContext};
use crate::lexicon::{Lexicon, SemClassMap};
use crate::resolver::{Resolution, Resolver};
use crate::tokenizer::tokenize;
use crate::types::{AnalysisLine, SegmentKind};

const UNKNOWN: &str = "UNK";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Attach semantic class tags to resolved spans.
    Sems,
    /// Insert translations in front of resolved spans.
    Gloss,
}

#[derive(Debug, Clone)]
pub struct Options {
    pub mode: Mode,
    /// Target language for glossing.
    pub language: String,
    /// Append contributing lexeme ids to every semantic tag.
    pub trace: bool,
    /// Tag only the rightmost matching span.
    pub last_match_only: bool,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            mode: Mode::Sems,
            language: "eng".to_string(),
            trace: false,
            last_match_only: false,
        }
    }
}

/// One resolved span: segment indices are inclusive on both ends.
#[derive(Debug, Clone)]
struct SpanMatch {
    start: usize,
    end: usize,
    resolution: Resolution,
}

type Memo = HashMap<(usize, usize), Option<Resolution>>;

pub struct Annotator {
    lexicon: Lexicon,
    sem_map: SemClassMap,
    options: Options,
}

impl Annotator {
    pub fn new(lexicon: Lexicon, options: Options) -> Self {
        let sem_map = lexicon.semantic_class_table();
        Annotator {
            lexicon,
            sem_map,
            options,
        }
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    /// Annotate one raw input line. Pass-through lines come back unchanged
    /// (and are never cached); eligible lines are answered from the cache
    /// when possible.
    pub fn annotate_line(&self, line: &str, cache: &mut ResultCache) -> Vec<String> {
        let Some(parsed) = tokenize(line) else {
            return vec![line.to_string()];
        };
        if let Some(hit) = cache.get(line) {
            return hit.to_vec();
        }
        let output = match self.options.mode {
            Mode::Sems => self.apply_sems(&parsed),
            Mode::Gloss => self.gloss(&parsed),
        };
        cache.insert(line, output.clone());
        output
    }

    /// Semantic tagging: the root span is matched longest-first from the
    /// lemma, then every derivation morpheme is matched independently. Only
    /// a root match covering the whole line drops the intermediate matches.
    fn apply_sems(&self, line: &AnalysisLine) -> Vec<String> {
        let mut memo = Memo::new();
        let last = line.segments.len() - 1;
        let mut matches: Vec<SpanMatch> = Vec::new();

        if let Some(root) = self.longest_match(line, 0, &mut memo) {
            matches.push(root);
        }

        for i in 1..=last {
            if line.segments[i].kind() != SegmentKind::Morpheme {
                continue;
            }
            if let Some(m) = self.longest_match(line, i, &mut memo) {
                matches.push(m);
            }
        }

        if let Some(root_end) = matches
            .iter()
            .find(|m| m.start == 0)
            .map(|m| m.end)
            .filter(|end| *end == last)
        {
            matches.retain(|m| m.start == 0 || m.start > root_end);
        }

        if self.options.last_match_only {
            if let Some(max_start) = matches.iter().map(|m| m.start).max() {
                matches.retain(|m| m.start == max_start);
            }
        }

        let mut insertions: Vec<SemInsertion> = Vec::new();
        for m in &matches {
            let alternatives = annotate::sem_alternatives(
                &self.lexicon,
                &self.sem_map,
                &m.resolution,
                self.options.trace,
            );
            if !alternatives.is_empty() {
                insertions.push(SemInsertion {
                    segment: m.end,
                    alternatives,
                });
            }
        }
        insertions.sort_by_key(|i| i.segment);
        assemble::assemble_sems(line, &insertions)
    }

    /// Glossing: spans are consumed left to right. For each start the
    /// longest resolvable span with a translation wins; a resolvable span
    /// with no translation shrinks until one is found or the start is
    /// given up.
    fn gloss(&self, line: &AnalysisLine) -> Vec<String> {
        let mut memo = Memo::new();
        let mut insertions: Vec<GlossInsertion> = Vec::new();
        let mut i = 0;
        while i < line.segments.len() {
            if !can_start(line, i) {
                i += 1;
                continue;
            }
            let mut advanced = false;
            for e in (i..line.segments.len()).rev() {
                if !is_terminator(line, i, e) {
                    continue;
                }
                let Some(resolution) = self.resolve_span(line, i, e, &mut memo) else {
                    continue;
                };
                let filter = self.span_sem_filter(line, i, e);
                let tokens = annotate::gloss_tokens(
                    &self.lexicon,
                    &self.sem_map,
                    &resolution,
                    &self.options.language,
                    &filter,
                    self.options.trace,
                );
                if let Some(tokens) = tokens {
                    insertions.push(GlossInsertion {
                        start: i,
                        end: e,
                        tokens,
                    });
                    i = e + 1;
                    advanced = true;
                    break;
                }
            }
            if !advanced {
                i += 1;
            }
        }
        vec![assemble::assemble_gloss(line, &insertions)]
    }

    fn longest_match(&self, line: &AnalysisLine, start: usize, memo: &mut Memo) -> Option<SpanMatch> {
        for e in (start..line.segments.len()).rev() {
            if !is_terminator(line, start, e) {
                continue;
            }
            if let Some(resolution) = self.resolve_span(line, start, e, memo) {
                return Some(SpanMatch {
                    start,
                    end: e,
                    resolution,
                });
            }
        }
        None
    }

    fn resolve_span(
        &self,
        line: &AnalysisLine,
        start: usize,
        end: usize,
        memo: &mut Memo,
    ) -> Option<Resolution> {
        if let Some(cached) = memo.get(&(start, end)) {
            return cached.clone();
        }
        let resolution = self.resolve_span_uncached(line, start, end);
        memo.insert((start, end), resolution.clone());
        resolution
    }

    fn resolve_span_uncached(
        &self,
        line: &AnalysisLine,
        start: usize,
        end: usize,
    ) -> Option<Resolution> {
        let terminator = &line.segments[end];
        // A morpheme terminator carries no word-class token of its own, so
        // the class its derivation produces is appended to the span.
        let (word_class, append_class) = match terminator.word_class() {
            Some(wc) => (wc.to_string(), false),
            None => (terminator.derived_class()?.to_string(), true),
        };
        let mut base: Vec<&str> = line.segments[start..=end]
            .iter()
            .flat_map(|s| s.comparison_tokens())
            .collect();
        if base.is_empty() {
            return None;
        }
        if append_class {
            base.push(&word_class);
        }
        let flexion = terminator.flexion().iter().map(|s| s.to_string()).collect();
        let ctx = SpanContext::new(base.join(" "), word_class.clone(), flexion, line.hybrid);
        let forms = candidate_forms(&ctx);
        Resolver::new(&self.lexicon).resolve(&forms, &word_class)
    }

    /// The semantic filter for a gloss span: the last one or two semantic
    /// tags inside the span, mapped back to internal codes.
    fn span_sem_filter(&self, line: &AnalysisLine, start: usize, end: usize) -> (String, String) {
        let codes: Vec<&str> = line.segments[start..=end]
            .iter()
            .flat_map(|s| s.sem_codes())
            .map(|c| c.split('=').next().unwrap_or(c))
            .collect();
        let internal = |human: &str| self.sem_map.code(human).map(str::to_string);
        match *codes.as_slice() {
            [] => (UNKNOWN.to_string(), UNKNOWN.to_string()),
            [.., a, b] => match (internal(a), internal(b)) {
                (Some(a), Some(b)) => (a, b),
                _ => (
                    internal(b).unwrap_or_else(|| UNKNOWN.to_string()),
                    UNKNOWN.to_string(),
                ),
            },
            [a] => (
                internal(a).unwrap_or_else(|| UNKNOWN.to_string()),
                UNKNOWN.to_string(),
            ),
        }
    }
}

fn can_start(line: &AnalysisLine, idx: usize) -> bool {
    matches!(
        line.segments[idx].kind(),
        SegmentKind::Lemma | SegmentKind::Morpheme
    )
}

/// A span from `start` may end at a word-class segment or at a morpheme
/// segment with a derivation tag; a morpheme segment may terminate itself.
fn is_terminator(line: &AnalysisLine, start: usize, end: usize) -> bool {
    let seg = &line.segments[end];
    if end == start {
        return seg.derived_class().is_some();
    }
    seg.word_class().is_some() || seg.derived_class().is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::{LexemeRecord, LexiconData, SemClassRow, SynonymRow};

    fn rec(id: u32, lexeme: &str, stems: &str, wc: &str, sem: &str, lang: &str) -> LexemeRecord {
        LexemeRecord {
            id,
            lexeme: lexeme.to_string(),
            stems: stems.to_string(),
            word_class: wc.to_string(),
            sem_class: sem.to_string(),
            sem_class2: "UNK".to_string(),
            language: lang.to_string(),
        }
    }

    fn classes(names: &[&str]) -> Vec<SemClassRow> {
        names
            .iter()
            .map(|c| SemClassRow {
                code: c.to_string(),
                english: c.to_string(),
            })
            .collect()
    }

    fn fixture() -> LexiconData {
        LexiconData {
            lexemes: vec![
                rec(1, "taku", "taku+V", "V", "PERCEPTION", "kal"),
                rec(2, "illu", "illu+N", "T", "HOUSE", "kal"),
                rec(3, "SIOQ Der/nv Gram/IV V", "", "V", "MAKE", "kal"),
                rec(4, "\"illu\" N SIOQ Der/nv Gram/IV V", "", "V", "BUILD", "kal"),
                rec(5, "GALAK Der/nv V", "", "V", "BECOME", "kal"),
                rec(6, "NNGUAQ Der/nn N", "", "T", "SMALL", "kal"),
                rec(7, "SIOQ Der/nv NNGUAQ Der/nn N", "", "T", "TINY", "kal"),
                rec(10, "see", "", "V", "PERCEPTION", "eng"),
                rec(11, "house", "", "T", "HOUSE", "eng"),
            ],
            sem_classes: classes(&[
                "PERCEPTION", "HOUSE", "MAKE", "BUILD", "BECOME", "SMALL", "TINY",
            ]),
            synonyms: vec![
                SynonymRow { lexeme: 1, synonym: 10, rank: 1 },
                SynonymRow { lexeme: 2, synonym: 11, rank: 1 },
            ],
        }
    }

    fn annotator(options: Options) -> Annotator {
        Annotator::new(Lexicon::from_data(fixture()), options)
    }

    #[test]
    fn test_sems_simple_verb() {
        let a = annotator(Options::default());
        let mut cache = ResultCache::new();
        let out = a.annotate_line("\t\"taku\" V Ind 3Sg 3SgO", &mut cache);
        assert_eq!(out, vec!["\t\"taku\" V Sem/PERCEPTION Ind 3Sg 3SgO"]);
    }

    #[test]
    fn test_sems_root_suppresses_morphemes() {
        let a = annotator(Options::default());
        let mut cache = ResultCache::new();
        // whole line resolves via lexeme 4, so the SIOQ span stays bare
        let out = a.annotate_line("\t\"illu\" N SIOQ Der/nv Gram/IV V Ind 3Sg", &mut cache);
        assert_eq!(
            out,
            vec!["\t\"illu\" iN SIOQ Der/nv Gram/IV V Sem/BUILD Ind 3Sg"]
        );
    }

    #[test]
    fn test_sems_morpheme_annotated_without_root_match() {
        let a = annotator(Options::default());
        let mut cache = ResultCache::new();
        // unknown root, known derivation morpheme
        let out = a.annotate_line("\t\"qaqqa\" N SIOQ Der/nv Gram/IV V Ind 3Sg", &mut cache);
        assert_eq!(
            out,
            vec!["\t\"qaqqa\" iN SIOQ Der/nv Gram/IV V Sem/MAKE Ind 3Sg"]
        );
    }

    #[test]
    fn test_sems_valence_marked_span_matches_unmarked_entry() {
        let a = annotator(Options::default());
        let mut cache = ResultCache::new();
        // the GALAK entry is indexed without a valence marker
        let out = a.annotate_line("\t\"qaqqa\" N GALAK Der/nv Gram/IV V Ind 3Sg", &mut cache);
        assert_eq!(
            out,
            vec!["\t\"qaqqa\" iN GALAK Der/nv Gram/IV V Sem/BECOME Ind 3Sg"]
        );
    }

    #[test]
    fn test_sems_morpheme_terminated_span() {
        let a = annotator(Options::default());
        let mut cache = ResultCache::new();
        // NNGUAQ is followed directly by another morpheme, so its span
        // self-terminates and is matched with the derived class appended
        let out = a.annotate_line("\t\"qaqqa\" N NNGUAQ Der/nn GALAK Der/nv V Ind 3Sg", &mut cache);
        assert_eq!(
            out,
            vec!["\t\"qaqqa\" iN NNGUAQ Der/nn iSem/SMALL GALAK Der/nv V Sem/BECOME Ind 3Sg"]
        );
    }

    #[test]
    fn test_sems_overlapping_morpheme_starts_both_fire() {
        let a = annotator(Options::default());
        let mut cache = ResultCache::new();
        // the SIOQ..NNGUAQ span covers the NNGUAQ start; with no
        // root-to-end match both keep their semantics
        let out = a.annotate_line("\t\"qaqqa\" N SIOQ Der/nv NNGUAQ Der/nn V Ind 3Sg", &mut cache);
        assert_eq!(
            out,
            vec!["\t\"qaqqa\" iN SIOQ Der/nv NNGUAQ Der/nn iSem/TINY iSem/SMALL V Ind 3Sg"]
        );
    }

    #[test]
    fn test_pass_through_untouched_and_uncached() {
        let a = annotator(Options::default());
        let mut cache = ResultCache::new();
        let out = a.annotate_line("\"<takuvaa>\"", &mut cache);
        assert_eq!(out, vec!["\"<takuvaa>\""]);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_cache_round_trip() {
        let a = annotator(Options::default());
        let mut cache = ResultCache::new();
        let first = a.annotate_line("\t\"taku\" V Ind 3Sg 3SgO", &mut cache);
        assert_eq!(cache.len(), 1);
        let second = a.annotate_line("\t\"taku\" V Ind 3Sg 3SgO", &mut cache);
        assert_eq!(first, second);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_gloss_simple_verb() {
        let a = annotator(Options {
            mode: Mode::Gloss,
            ..Options::default()
        });
        let mut cache = ResultCache::new();
        let out = a.annotate_line("\t\"taku\" V Ind 3Sg 3SgO", &mut cache);
        assert_eq!(
            out,
            vec!["\t\"see\" V Sem/PERCEPTION <tr> \"taku\" iV Ind 3Sg 3SgO"]
        );
    }

    #[test]
    fn test_gloss_untranslatable_span_shrinks() {
        let a = annotator(Options {
            mode: Mode::Gloss,
            ..Options::default()
        });
        let mut cache = ResultCache::new();
        // lexeme 4 resolves the whole line but has no translation; the
        // root span shrinks away and the lemma-only span wins instead,
        // so the translation covers only part of the word and its own
        // markers end up internal
        let out = a.annotate_line("\t\"illu\" N SIOQ Der/nv Gram/IV V Ind 3Sg", &mut cache);
        assert_eq!(
            out,
            vec!["\t\"house\" iN iSem/HOUSE <tr> \"illu\" iN SIOQ Der/nv Gram/IV V Ind 3Sg"]
        );
    }

    #[test]
    fn test_last_match_only() {
        let a = annotator(Options {
            last_match_only: true,
            ..Options::default()
        });
        let mut cache = ResultCache::new();
        let out = a.annotate_line("\t\"qaqqa\" N SIOQ Der/nv Gram/IV V Ind 3Sg", &mut cache);
        assert_eq!(
            out,
            vec!["\t\"qaqqa\" iN SIOQ Der/nv Gram/IV V Sem/MAKE Ind 3Sg"]
        );
    }

    #[test]
    fn test_trace_ids() {
        let a = annotator(Options {
            trace: true,
            ..Options::default()
        });
        let mut cache = ResultCache::new();
        let out = a.annotate_line("\t\"taku\" V Ind 3Sg 3SgO", &mut cache);
        assert_eq!(out, vec!["\t\"taku\" V Sem/PERCEPTION=1 Ind 3Sg 3SgO"]);
    }
}

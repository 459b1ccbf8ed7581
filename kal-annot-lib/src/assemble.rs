//! Rebuilding output lines: inserting annotation tokens, demoting markers
//! made internal by later material, and serializing.

use crate::types::{classify, AnalysisLine, TokenKind, WORD_CLASSES};

/// A group of semantic-tag alternatives attached after one segment.
#[derive(Debug, Clone)]
pub struct SemInsertion {
    /// Index of the terminating segment the tags follow.
    pub segment: usize,
    /// Alternative tag groups; each produces one output variant.
    pub alternatives: Vec<Vec<String>>,
}

/// A translated span in gloss output: the translation tokens are inserted
/// before the span, and the span's own markers are demoted.
#[derive(Debug, Clone)]
pub struct GlossInsertion {
    /// First segment of the consumed span.
    pub start: usize,
    /// Last segment of the consumed span, inclusive.
    pub end: usize,
    pub tokens: Vec<String>,
}

/// Expand a tagged line into all annotation variants: the cross product of
/// every insertion's alternatives, each demoted, serialized, sorted, and
/// deduplicated.
pub fn assemble_sems(line: &AnalysisLine, insertions: &[SemInsertion]) -> Vec<String> {
    let mut variants: Vec<Vec<String>> = vec![Vec::new()];
    for (idx, segment) in line.segments.iter().enumerate() {
        let insert_at = insertion_offset(segment);
        for (pos, token) in segment.tokens.iter().enumerate() {
            for v in &mut variants {
                v.push(token.text.clone());
            }
            if pos + 1 == insert_at {
                for ins in insertions.iter().filter(|i| i.segment == idx) {
                    variants = cross(variants, &ins.alternatives);
                }
            }
        }
    }

    let mut out: Vec<String> = variants
        .into_iter()
        .map(|tokens| serialize(&demote_internal(tokens)))
        .collect();
    out.sort();
    out.dedup();
    out
}

/// Offset within a segment after which semantic tags are inserted: directly
/// after a word-class marker, otherwise after the segment's last token.
fn insertion_offset(segment: &crate::types::Segment) -> usize {
    segment
        .tokens
        .iter()
        .position(|t| t.kind == TokenKind::WordClass)
        .map(|p| p + 1)
        .unwrap_or(segment.tokens.len())
}

fn cross(variants: Vec<Vec<String>>, alternatives: &[Vec<String>]) -> Vec<Vec<String>> {
    if alternatives.is_empty() {
        return variants;
    }
    let mut out = Vec::with_capacity(variants.len() * alternatives.len());
    for v in variants {
        for alt in alternatives {
            let mut next = v.clone();
            next.extend(alt.iter().cloned());
            out.push(next);
        }
    }
    out
}

/// Rebuild a glossed line: translation tokens go in front of each consumed
/// span, whose own word-class and semantic markers become internal.
pub fn assemble_gloss(line: &AnalysisLine, insertions: &[GlossInsertion]) -> String {
    let mut tokens: Vec<String> = Vec::new();
    for (idx, segment) in line.segments.iter().enumerate() {
        if let Some(ins) = insertions.iter().find(|i| i.start == idx) {
            tokens.extend(ins.tokens.iter().cloned());
        }
        let consumed = insertions.iter().any(|i| idx >= i.start && idx <= i.end);
        for token in &segment.tokens {
            if consumed
                && !token.text.starts_with('i')
                && matches!(token.kind, TokenKind::WordClass | TokenKind::Sem)
            {
                tokens.push(format!("i{}", token.text));
            } else {
                tokens.push(token.text.clone());
            }
        }
    }
    serialize(&demote_internal(tokens))
}

/// Mark markers internal when later material shows they do not describe the
/// whole word: a word-class marker followed by another derivation morpheme,
/// or a semantic tag followed by a derivation morpheme or a later plain
/// word-class marker. Already-internal markers never count as boundaries.
/// Repeated until nothing changes.
pub fn demote_internal(mut tokens: Vec<String>) -> Vec<String> {
    loop {
        let demote: Vec<usize> = tokens
            .iter()
            .enumerate()
            .filter(|(pos, t)| should_demote(&tokens, *pos, t))
            .map(|(pos, _)| pos)
            .collect();
        if demote.is_empty() {
            return tokens;
        }
        for pos in demote {
            tokens[pos] = format!("i{}", tokens[pos]);
        }
    }
}

fn should_demote(tokens: &[String], pos: usize, token: &str) -> bool {
    let later_morpheme = || {
        tokens[pos + 1..]
            .iter()
            .any(|t| classify(t) == TokenKind::Morpheme)
    };
    if WORD_CLASSES.contains(&token) {
        return later_morpheme();
    }
    if token.starts_with("Sem/") {
        return later_morpheme()
            || tokens[pos + 1..]
                .iter()
                .any(|t| WORD_CLASSES.contains(&t.as_str()));
    }
    false
}

pub fn serialize(tokens: &[String]) -> String {
    format!("\t{}", tokens.join(" "))
}

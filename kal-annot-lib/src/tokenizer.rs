//! Splitting raw analysis lines into quoted-lemma-aware tokens and segments.

use crate::types::{
    classify, AnalysisLine, Segment, Token, TokenKind, HYBRID_NORMALIZED, TRANSLATION_DONE,
    WORD_CLASSES,
};

/// An eligible analysis line starts with a tab and a quoted lemma, carries at
/// least one plain word-class marker, and has not already been glossed.
pub fn is_annotation_line(line: &str) -> bool {
    line.starts_with("\t\"")
        && !line.contains(&format!(" {} ", TRANSLATION_DONE))
        && has_word_class(line)
}

fn has_word_class(line: &str) -> bool {
    line.split_whitespace()
        .any(|t| WORD_CLASSES.contains(&t))
}

/// Split a line on whitespace, keeping quoted lemmas (which may contain
/// spaces) as single tokens. An unterminated quote falls back to a plain
/// whitespace split for the rest of the token.
pub fn split_tokens(line: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut rest = line.trim();
    while !rest.is_empty() {
        if let Some(tail) = rest.strip_prefix('"') {
            if let Some(close) = tail.find('"') {
                out.push(rest[..close + 2].to_string());
                rest = rest[close + 2..].trim_start();
                continue;
            }
        }
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        out.push(rest[..end].to_string());
        rest = rest[end..].trim_start();
    }
    out
}

/// Tokenize an eligible line into segments. Returns `None` for pass-through
/// lines (surface forms, already-glossed lines, anything unquoted).
pub fn tokenize(line: &str) -> Option<AnalysisLine> {
    if !is_annotation_line(line) {
        return None;
    }
    let tokens: Vec<Token> = split_tokens(line)
        .into_iter()
        .map(|t| Token {
            kind: classify(&t),
            text: t,
        })
        .collect();
    let hybrid = tokens
        .iter()
        .any(|t| t.text.starts_with("Hyb/") && t.text != HYBRID_NORMALIZED);

    let mut segments: Vec<Segment> = Vec::new();
    for token in tokens {
        let boundary = matches!(
            token.kind,
            TokenKind::Lemma | TokenKind::WordClass | TokenKind::Morpheme
        );
        if boundary || segments.is_empty() {
            segments.push(Segment { tokens: vec![token] });
        } else if let Some(last) = segments.last_mut() {
            last.tokens.push(token);
        }
    }
    Some(AnalysisLine { segments, hybrid })
}

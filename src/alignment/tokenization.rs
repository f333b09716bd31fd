use crate::error::AlignmentError;
use crate::types::{ReferenceToken, TranscriptItemKind, TranscriptToken, TranscriptWord};

/// Lowercases `raw`, splits it on whitespace and dashes, and strips every
/// character that is not alphanumeric. Pieces left empty are dropped.
pub fn normalize_words(raw: &str) -> Vec<String> {
    let lowered = raw.to_lowercase();
    lowered
        .split(|c: char| c.is_whitespace() || is_dash(c))
        .map(|piece| piece.chars().filter(|c| c.is_alphanumeric()).collect::<String>())
        .filter(|piece| !piece.is_empty())
        .collect()
}

/// Single-word form of `raw`, or `None` when it normalizes to zero or
/// several words.
pub fn normalize_single(raw: &str) -> Option<String> {
    let mut words = normalize_words(raw);
    if words.len() == 1 {
        words.pop()
    } else {
        None
    }
}

fn is_dash(c: char) -> bool {
    matches!(c, '-' | '\u{2010}'..='\u{2015}')
}

/// Bracketed items such as `[laughter]` or `<unk>` are recognizer markers, not speech.
fn is_marker(word: &str) -> bool {
    let trimmed = word.trim();
    (trimmed.starts_with('[') && trimmed.ends_with(']'))
        || (trimmed.starts_with('<') && trimmed.ends_with('>'))
}

pub fn tokenize_reference(text: &str) -> Vec<ReferenceToken> {
    normalize_words(text)
        .into_iter()
        .enumerate()
        .map(|(index, text)| ReferenceToken { index, text })
        .collect()
}

pub fn tokenize_transcript(
    words: &[TranscriptWord],
) -> Result<Vec<TranscriptToken>, AlignmentError> {
    let mut tokens: Vec<TranscriptToken> = Vec::with_capacity(words.len());
    let mut prev_start: Option<f64> = None;

    for (source_index, word) in words.iter().enumerate() {
        if word.kind != TranscriptItemKind::Pronunciation || is_marker(&word.word) {
            continue;
        }
        validate_timestamps(source_index, word, prev_start)?;
        prev_start = Some(word.start_time);

        let pieces = normalize_words(&word.word);
        if pieces.is_empty() {
            tracing::debug!(
                source_index,
                word = word.word.as_str(),
                "tokenization: dropping item with no speakable characters"
            );
            continue;
        }

        // Multi-word items share their interval evenly.
        let step = (word.end_time - word.start_time) / pieces.len() as f64;
        let last = pieces.len() - 1;
        for (k, text) in pieces.into_iter().enumerate() {
            let start_time = word.start_time + step * k as f64;
            let end_time = if k == last {
                word.end_time
            } else {
                word.start_time + step * (k + 1) as f64
            };
            tokens.push(TranscriptToken {
                index: tokens.len(),
                source_index,
                text,
                start_time,
                end_time,
                confidence: word.confidence,
            });
        }
    }

    debug_assert!(
        tokens.iter().enumerate().all(|(i, t)| t.index == i),
        "transcript token indices must be dense"
    );
    Ok(tokens)
}

fn validate_timestamps(
    source_index: usize,
    word: &TranscriptWord,
    prev_start: Option<f64>,
) -> Result<(), AlignmentError> {
    let (start, end) = (word.start_time, word.end_time);
    if !start.is_finite() || !end.is_finite() || start < 0.0 || end < 0.0 {
        return Err(AlignmentError::invalid_input(format!(
            "transcript item {source_index} ('{}') has invalid timestamps [{start}, {end}]",
            word.word
        )));
    }
    if start >= end {
        return Err(AlignmentError::invalid_input(format!(
            "transcript item {source_index} ('{}') starts at {start} but ends at {end}",
            word.word
        )));
    }
    if let Some(prev) = prev_start {
        if start < prev {
            return Err(AlignmentError::invalid_input(format!(
                "transcript item {source_index} ('{}') starts at {start}, before {prev}",
                word.word
            )));
        }
    }
    Ok(())
}

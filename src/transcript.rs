//! Transcript and reference sources.
//!
//! Transcripts come either as an Amazon Transcribe result document
//! (`{"results": {"items": [...]}}`, or just the `{"items": [...]}` part) or as
//! a plain JSON array of [`TranscriptWord`]. References are plain text or SRT
//! subtitles.

use std::path::Path;

use serde::Deserialize;

use crate::error::AlignmentError;
use crate::types::{TranscriptItemKind, TranscriptWord};

#[derive(Deserialize)]
#[serde(untagged)]
enum TranscriptDocument {
    Transcribe { results: TranscribeResults },
    Results(TranscribeResults),
    Words(Vec<TranscriptWord>),
}

#[derive(Deserialize)]
struct TranscribeResults {
    items: Vec<TranscribeItem>,
}

#[derive(Deserialize)]
struct TranscribeItem {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    start_time: Option<NumberOrString>,
    #[serde(default)]
    end_time: Option<NumberOrString>,
    alternatives: Vec<TranscribeAlternative>,
}

#[derive(Deserialize)]
struct TranscribeAlternative {
    content: String,
    #[serde(default)]
    confidence: Option<NumberOrString>,
}

/// Transcribe encodes numbers as strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    Text(String),
}

impl NumberOrString {
    fn to_f64(&self, index: usize, field: &str) -> Result<f64, AlignmentError> {
        match self {
            Self::Number(value) => Ok(*value),
            Self::Text(text) => text.trim().parse::<f64>().map_err(|_| {
                AlignmentError::invalid_input(format!(
                    "transcript item {index}: {field} '{text}' is not a number"
                ))
            }),
        }
    }
}

pub fn parse_transcript_json(data: &str) -> Result<Vec<TranscriptWord>, AlignmentError> {
    let document: TranscriptDocument =
        serde_json::from_str(data).map_err(|e| AlignmentError::json("parse transcript", e))?;
    match document {
        TranscriptDocument::Transcribe { results } | TranscriptDocument::Results(results) => {
            convert_items(results.items)
        }
        TranscriptDocument::Words(words) => Ok(words),
    }
}

pub fn load_transcript(path: &Path) -> Result<Vec<TranscriptWord>, AlignmentError> {
    let data =
        std::fs::read_to_string(path).map_err(|e| AlignmentError::io("read transcript", e))?;
    parse_transcript_json(&data)
}

fn convert_items(items: Vec<TranscribeItem>) -> Result<Vec<TranscriptWord>, AlignmentError> {
    let mut words = Vec::with_capacity(items.len());
    let mut last_end = 0.0f64;

    for (index, item) in items.into_iter().enumerate() {
        let Some(best) = item.alternatives.into_iter().next() else {
            return Err(AlignmentError::invalid_input(format!(
                "transcript item {index} has no alternatives"
            )));
        };
        let kind = match item.kind.as_str() {
            "pronunciation" => TranscriptItemKind::Pronunciation,
            "punctuation" => TranscriptItemKind::Punctuation,
            _ => TranscriptItemKind::NonSpeech,
        };
        let confidence = best
            .confidence
            .as_ref()
            .map(|value| value.to_f64(index, "confidence").map(|c| c as f32))
            .transpose()?;

        let (start_time, end_time) = match (&item.start_time, &item.end_time) {
            (Some(start), Some(end)) => {
                (start.to_f64(index, "start_time")?, end.to_f64(index, "end_time")?)
            }
            _ if kind == TranscriptItemKind::Pronunciation => {
                return Err(AlignmentError::invalid_input(format!(
                    "transcript item {index} ('{}') has no timestamps",
                    best.content
                )));
            }
            // Punctuation carries no timing; pin it to the preceding word.
            _ => (last_end, last_end),
        };
        if kind == TranscriptItemKind::Pronunciation {
            last_end = end_time;
        }

        words.push(TranscriptWord {
            word: best.content,
            start_time,
            end_time,
            kind,
            confidence,
        });
    }
    Ok(words)
}

/// Concatenates subtitle text with single spaces. Empty cues and bracketed
/// cues such as `[Music]` are dropped.
pub fn srt_to_text(content: &str) -> String {
    let normalized = content.replace("\r\n", "\n");
    let cues: Vec<String> = normalized
        .split("\n\n")
        .filter_map(|block| cue_text(block.trim()))
        .filter(|text| !(text.starts_with('[') || text.ends_with(']')))
        .collect();
    cues.join(" ").replace('\n', " ")
}

fn cue_text(block: &str) -> Option<String> {
    let lines: Vec<&str> = block.lines().collect();
    let timing = lines.iter().position(|line| line.contains("-->"))?;
    let text = lines[timing + 1..].join("\n").trim().to_string();
    (!text.is_empty()).then_some(text)
}

/// Reads reference text; `.srt` files are flattened to plain text.
pub fn load_reference_text(path: &Path) -> Result<String, AlignmentError> {
    let data =
        std::fs::read_to_string(path).map_err(|e| AlignmentError::io("read reference", e))?;
    let is_srt = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("srt"));
    Ok(if is_srt { srt_to_text(&data) } else { data })
}

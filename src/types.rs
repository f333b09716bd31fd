use std::ops::Range;

use serde::{Deserialize, Serialize};

/// One timestamped unit as delivered by the transcription service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptWord {
    pub word: String,
    /// Seconds from the start of the recording.
    pub start_time: f64,
    /// Seconds from the start of the recording.
    pub end_time: f64,
    #[serde(default)]
    pub kind: TranscriptItemKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
}

impl TranscriptWord {
    pub fn new(word: impl Into<String>, start_time: f64, end_time: f64) -> Self {
        Self {
            word: word.into(),
            start_time,
            end_time,
            kind: TranscriptItemKind::Pronunciation,
            confidence: None,
        }
    }
}

/// Items other than `Pronunciation` are silence/non-speech markers and never
/// reach the aligner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptItemKind {
    #[default]
    Pronunciation,
    Punctuation,
    #[serde(rename = "non_speech")]
    NonSpeech,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferenceToken {
    pub index: usize,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptToken {
    pub index: usize,
    /// Position of the originating `TranscriptWord`.
    pub source_index: usize,
    pub text: String,
    pub start_time: f64,
    pub end_time: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
}

/// Reference range `[reference.start, reference.end)` matched token by token
/// against transcript range `[transcript.start, transcript.end)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignedChunk {
    pub reference: Range<usize>,
    pub transcript: Range<usize>,
    pub start_time: f64,
    pub end_time: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
}

impl AlignedChunk {
    pub fn len(&self) -> usize {
        self.reference.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reference.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GapPosition {
    /// Before the first chunk.
    Leading,
    /// Between two chunks.
    Interior,
    /// After the last chunk.
    Trailing,
    /// No chunk was found; the gap spans the whole reference.
    Whole,
}

/// Reference tokens with no accepted match. `slack` is the transcript range
/// between the neighbouring chunks that no chunk consumed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Gap {
    pub reference: Range<usize>,
    pub slack: Range<usize>,
    pub position: GapPosition,
    /// End of the preceding chunk, or 0.0 for leading gaps.
    pub start_time: f64,
    /// Start of the following chunk, or the end of the slack for trailing gaps.
    pub end_time: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MispronunciationLabel {
    Addition,
    Substitution,
    Both,
    None,
}

impl MispronunciationLabel {
    pub const ALL: [MispronunciationLabel; 4] = [
        MispronunciationLabel::Addition,
        MispronunciationLabel::Substitution,
        MispronunciationLabel::Both,
        MispronunciationLabel::None,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Addition => "addition",
            Self::Substitution => "substitution",
            Self::Both => "both",
            Self::None => "none",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabeledGap {
    pub gap: Gap,
    pub label: MispronunciationLabel,
}

/// Transcript words spoken between two adjacent chunks where the reference
/// continues without a gap, i.e. words the reader added.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insertion {
    /// Index of the chunk the words follow.
    pub after_chunk: usize,
    pub transcript: Range<usize>,
    pub start_time: f64,
    pub end_time: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct AlignmentResult {
    pub chunks: Vec<AlignedChunk>,
    pub gaps: Vec<LabeledGap>,
    pub insertions: Vec<Insertion>,
}

impl AlignmentResult {
    pub fn is_no_match(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn matched_reference_tokens(&self) -> usize {
        self.chunks.iter().map(AlignedChunk::len).sum()
    }
}

/// Interval handed to the audio splitter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
    pub start_time: f64,
    pub end_time: f64,
    pub reference_text: String,
    pub transcript_text: String,
    pub reference: Range<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MispronunciationEntry {
    pub reference_span: String,
    pub label: MispronunciationLabel,
    pub reference: Range<usize>,
    /// Reference words with no counterpart in the slack.
    pub skipped: Vec<String>,
    /// Slack words with no counterpart in the gap (fillers excluded).
    pub heard: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AlignmentWarning {
    /// Equivalence falls back to identity for this language.
    MissingHomophoneTable { language: String },
    /// A chunk start was moved forward to the previous chunk's end.
    TimestampClamped { chunk: usize, shifted_by: f64 },
}

#[derive(Debug, Clone, Deserialize)]
pub struct AlignmentInput {
    pub reference: String,
    pub transcript: Vec<TranscriptWord>,
    pub language: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignmentOutput {
    pub reference_tokens: Vec<String>,
    pub transcript_tokens: Vec<TranscriptToken>,
    pub result: AlignmentResult,
    pub segments: Vec<Segment>,
    pub mispronunciations: Vec<MispronunciationEntry>,
    pub warnings: Vec<AlignmentWarning>,
}

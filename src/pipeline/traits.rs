use crate::alignment::mispronunciation::GapEvidence;
use crate::error::AlignmentError;
use crate::homophones::Equivalence;
use crate::types::{AlignedChunk, Gap, ReferenceToken, TranscriptToken, TranscriptWord};

pub trait Tokenizer: Send + Sync {
    fn tokenize_reference(&self, text: &str) -> Vec<ReferenceToken>;

    fn tokenize_transcript(
        &self,
        words: &[TranscriptWord],
    ) -> Result<Vec<TranscriptToken>, AlignmentError>;
}

pub trait SequenceAligner: Send + Sync {
    /// Chunks must be ordered and non-overlapping in both index spaces.
    fn align_chunks(
        &self,
        reference: &[ReferenceToken],
        transcript: &[TranscriptToken],
        equivalence: Equivalence<'_>,
    ) -> Vec<AlignedChunk>;
}

pub trait GapClassifier: Send + Sync {
    fn classify(
        &self,
        gap: &Gap,
        reference: &[ReferenceToken],
        transcript: &[TranscriptToken],
        equivalence: Equivalence<'_>,
    ) -> GapEvidence;

    fn is_filler(&self, word: &str) -> bool;
}

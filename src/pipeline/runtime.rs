use std::sync::Arc;

use rayon::prelude::*;

use crate::alignment::gaps::{collect_gaps, covers_reference};
use crate::alignment::greedy::clamp_overlaps;
use crate::alignment::segments::{build_mispronunciation_entry, build_segments};
use crate::error::AlignmentError;
use crate::homophones::{Equivalence, HomophoneRegistry};
use crate::pipeline::traits::{GapClassifier, SequenceAligner, Tokenizer};
use crate::types::{
    AlignmentInput, AlignmentOutput, AlignmentResult, AlignmentWarning, Insertion, TranscriptToken,
};

pub struct ReadingAligner {
    homophones: Arc<HomophoneRegistry>,
    tokenizer: Box<dyn Tokenizer>,
    sequence_aligner: Box<dyn SequenceAligner>,
    gap_classifier: Box<dyn GapClassifier>,
}

pub(crate) struct ReadingAlignerParts {
    pub homophones: Arc<HomophoneRegistry>,
    pub tokenizer: Box<dyn Tokenizer>,
    pub sequence_aligner: Box<dyn SequenceAligner>,
    pub gap_classifier: Box<dyn GapClassifier>,
}

impl ReadingAligner {
    pub(crate) fn from_parts(parts: ReadingAlignerParts) -> Self {
        Self {
            homophones: parts.homophones,
            tokenizer: parts.tokenizer,
            sequence_aligner: parts.sequence_aligner,
            gap_classifier: parts.gap_classifier,
        }
    }

    pub fn homophones(&self) -> &HomophoneRegistry {
        &self.homophones
    }

    pub fn align(&self, input: &AlignmentInput) -> Result<AlignmentOutput, AlignmentError> {
        let reference = self.tokenizer.tokenize_reference(&input.reference);
        if reference.is_empty() {
            return Err(AlignmentError::invalid_input(
                "reference text contains no words",
            ));
        }
        let transcript = self.tokenizer.tokenize_transcript(&input.transcript)?;
        if transcript.is_empty() {
            return Err(AlignmentError::invalid_input(
                "transcript contains no spoken words",
            ));
        }

        let mut warnings = Vec::new();
        let equivalence = match self.homophones.table_for(&input.language) {
            Some(table) => Equivalence::with_table(table),
            None => {
                tracing::warn!(
                    language = input.language.as_str(),
                    "no homophone table for language; matching exact tokens only"
                );
                warnings.push(AlignmentWarning::MissingHomophoneTable {
                    language: input.language.clone(),
                });
                Equivalence::identity()
            }
        };

        let mut chunks = self
            .sequence_aligner
            .align_chunks(&reference, &transcript, equivalence);
        warnings.extend(clamp_overlaps(&mut chunks));

        let (gaps, insertions) = collect_gaps(&chunks, reference.len(), &transcript);
        debug_assert!(
            covers_reference(&chunks, &gaps, reference.len()),
            "chunks and gaps must cover the reference exactly once"
        );
        let insertions: Vec<Insertion> = insertions
            .into_iter()
            .filter(|insertion| !self.is_filler_span(&transcript[insertion.transcript.clone()]))
            .collect();

        let mut labeled_gaps = Vec::with_capacity(gaps.len());
        let mut mispronunciations = Vec::with_capacity(gaps.len());
        for gap in gaps {
            let evidence = self
                .gap_classifier
                .classify(&gap, &reference, &transcript, equivalence);
            let (labeled, entry) = build_mispronunciation_entry(gap, evidence, &reference);
            labeled_gaps.push(labeled);
            mispronunciations.push(entry);
        }

        let segments = build_segments(&chunks, &reference, &transcript);
        tracing::debug!(
            language = input.language.as_str(),
            reference_tokens = reference.len(),
            transcript_tokens = transcript.len(),
            chunks = chunks.len(),
            gaps = labeled_gaps.len(),
            insertions = insertions.len(),
            "alignment complete"
        );

        Ok(AlignmentOutput {
            reference_tokens: reference.into_iter().map(|t| t.text).collect(),
            transcript_tokens: transcript,
            result: AlignmentResult {
                chunks,
                gaps: labeled_gaps,
                insertions,
            },
            segments,
            mispronunciations,
            warnings,
        })
    }

    /// Aligns independent inputs in parallel; results keep input order.
    pub fn align_batch(
        &self,
        inputs: &[AlignmentInput],
    ) -> Vec<Result<AlignmentOutput, AlignmentError>> {
        inputs.par_iter().map(|input| self.align(input)).collect()
    }

    fn is_filler_span(&self, tokens: &[TranscriptToken]) -> bool {
        tokens.iter().all(|t| self.gap_classifier.is_filler(&t.text))
    }
}

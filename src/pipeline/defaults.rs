use std::collections::HashSet;

use crate::alignment::greedy::{greedy_align, GreedyParams};
use crate::alignment::mispronunciation::{classify_gap, GapEvidence};
use crate::alignment::tokenization::{tokenize_reference, tokenize_transcript};
use crate::config::AlignerConfig;
use crate::error::AlignmentError;
use crate::homophones::Equivalence;
use crate::pipeline::traits::{GapClassifier, SequenceAligner, Tokenizer};
use crate::types::{AlignedChunk, Gap, ReferenceToken, TranscriptToken, TranscriptWord};

pub struct NormalizingTokenizer;

impl Tokenizer for NormalizingTokenizer {
    fn tokenize_reference(&self, text: &str) -> Vec<ReferenceToken> {
        tokenize_reference(text)
    }

    fn tokenize_transcript(
        &self,
        words: &[TranscriptWord],
    ) -> Result<Vec<TranscriptToken>, AlignmentError> {
        tokenize_transcript(words)
    }
}

pub struct GreedySequenceAligner {
    params: GreedyParams,
}

impl GreedySequenceAligner {
    pub fn new(lookahead: usize, min_run_length: usize) -> Self {
        Self {
            params: GreedyParams {
                lookahead,
                min_run_length,
            },
        }
    }

    pub fn from_config(config: &AlignerConfig) -> Self {
        Self::new(config.lookahead, config.min_run_length)
    }
}

impl SequenceAligner for GreedySequenceAligner {
    fn align_chunks(
        &self,
        reference: &[ReferenceToken],
        transcript: &[TranscriptToken],
        equivalence: Equivalence<'_>,
    ) -> Vec<AlignedChunk> {
        greedy_align(reference, transcript, equivalence, self.params)
    }
}

pub struct ResidueGapClassifier {
    fillers: HashSet<String>,
}

impl ResidueGapClassifier {
    pub fn new<S: AsRef<str>>(fillers: &[S]) -> Self {
        Self {
            fillers: fillers.iter().map(|f| f.as_ref().to_lowercase()).collect(),
        }
    }
}

impl GapClassifier for ResidueGapClassifier {
    fn classify(
        &self,
        gap: &Gap,
        reference: &[ReferenceToken],
        transcript: &[TranscriptToken],
        equivalence: Equivalence<'_>,
    ) -> GapEvidence {
        classify_gap(
            &reference[gap.reference.clone()],
            &transcript[gap.slack.clone()],
            gap.position,
            &self.fillers,
            equivalence,
        )
    }

    fn is_filler(&self, word: &str) -> bool {
        self.fillers.contains(word)
    }
}

#[cfg(test)]
mod tests {
    use crate::alignment::greedy::greedy_align;
    use crate::types::{GapPosition, MispronunciationLabel};

    use super::*;

    #[test]
    fn normalizing_tokenizer_tokenize() {
        let tokenizer = NormalizingTokenizer;
        let reference = tokenizer.tokenize_reference("Hello, World!");
        assert_eq!(reference.len(), 2);
        assert_eq!(reference[1].text, "world");
        let transcript = tokenizer
            .tokenize_transcript(&[TranscriptWord::new("Hello", 0.0, 0.5)])
            .unwrap();
        assert_eq!(transcript[0].text, "hello");
    }

    #[test]
    fn greedy_sequence_aligner_matches_free_function() {
        let aligner = GreedySequenceAligner::new(4, 1);
        let reference = tokenize_reference("a b c");
        let transcript = tokenize_transcript(&[
            TranscriptWord::new("a", 0.0, 1.0),
            TranscriptWord::new("c", 1.0, 2.0),
        ])
        .unwrap();
        let chunks = aligner.align_chunks(&reference, &transcript, Equivalence::identity());
        let expected = greedy_align(
            &reference,
            &transcript,
            Equivalence::identity(),
            GreedyParams {
                lookahead: 4,
                min_run_length: 1,
            },
        );
        assert_eq!(chunks, expected);
    }

    #[test]
    fn residue_classifier_uses_gap_ranges() {
        let classifier = ResidueGapClassifier::new(&AlignerConfig::default().fillers);
        let reference = tokenize_reference("the cat sat");
        let transcript = tokenize_transcript(&[
            TranscriptWord::new("the", 0.0, 1.0),
            TranscriptWord::new("cat", 1.0, 2.0),
            TranscriptWord::new("mat", 2.0, 3.0),
        ])
        .unwrap();
        let gap = Gap {
            reference: 2..3,
            slack: 2..3,
            position: GapPosition::Trailing,
            start_time: 2.0,
            end_time: 3.0,
        };
        let evidence = classifier.classify(&gap, &reference, &transcript, Equivalence::identity());
        assert_eq!(evidence.label, MispronunciationLabel::Substitution);
    }

    #[test]
    fn residue_classifier_fillers_are_case_insensitive() {
        let classifier = ResidueGapClassifier::new(&["UH", "Hmm"]);
        assert!(classifier.is_filler("uh"));
        assert!(classifier.is_filler("hmm"));
        assert!(!classifier.is_filler("the"));
    }
}

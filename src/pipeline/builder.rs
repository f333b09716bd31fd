use std::sync::Arc;

use crate::config::AlignerConfig;
use crate::error::AlignmentError;
use crate::homophones::HomophoneRegistry;
use crate::pipeline::defaults::{GreedySequenceAligner, NormalizingTokenizer, ResidueGapClassifier};
use crate::pipeline::runtime::{ReadingAligner, ReadingAlignerParts};
use crate::pipeline::traits::{GapClassifier, SequenceAligner, Tokenizer};

pub struct ReadingAlignerBuilder {
    config: AlignerConfig,
    homophones: Option<Arc<HomophoneRegistry>>,
    tokenizer: Option<Box<dyn Tokenizer>>,
    sequence_aligner: Option<Box<dyn SequenceAligner>>,
    gap_classifier: Option<Box<dyn GapClassifier>>,
}

impl ReadingAlignerBuilder {
    pub fn new(config: AlignerConfig) -> Self {
        Self {
            config,
            homophones: None,
            tokenizer: None,
            sequence_aligner: None,
            gap_classifier: None,
        }
    }

    /// Without this, the built-in tables are used.
    pub fn with_homophones(mut self, homophones: Arc<HomophoneRegistry>) -> Self {
        self.homophones = Some(homophones);
        self
    }

    pub fn with_tokenizer(mut self, tokenizer: Box<dyn Tokenizer>) -> Self {
        self.tokenizer = Some(tokenizer);
        self
    }

    pub fn with_sequence_aligner(mut self, sequence_aligner: Box<dyn SequenceAligner>) -> Self {
        self.sequence_aligner = Some(sequence_aligner);
        self
    }

    pub fn with_gap_classifier(mut self, gap_classifier: Box<dyn GapClassifier>) -> Self {
        self.gap_classifier = Some(gap_classifier);
        self
    }

    pub fn build(self) -> Result<ReadingAligner, AlignmentError> {
        self.config.validate()?;

        let homophones = match self.homophones {
            Some(homophones) => homophones,
            None => Arc::new(HomophoneRegistry::builtin()?),
        };

        Ok(ReadingAligner::from_parts(ReadingAlignerParts {
            homophones,
            tokenizer: self
                .tokenizer
                .unwrap_or_else(|| Box::new(NormalizingTokenizer)),
            sequence_aligner: self
                .sequence_aligner
                .unwrap_or_else(|| Box::new(GreedySequenceAligner::from_config(&self.config))),
            gap_classifier: self
                .gap_classifier
                .unwrap_or_else(|| Box::new(ResidueGapClassifier::new(&self.config.fillers))),
        }))
    }
}

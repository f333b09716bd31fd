pub mod alignment;
pub mod annotation;
pub mod config;
pub mod error;
pub mod homophones;
pub mod logging;
pub mod pipeline;
pub mod transcript;
pub mod types;

pub use alignment::report::{
    aggregate_reports, compute_case_report, AggregateReport, CaseFailure, CaseReport, LabelCounts,
    Meta, Report, REPORT_SCHEMA_VERSION,
};
pub use config::AlignerConfig;
pub use error::AlignmentError;
pub use homophones::{Equivalence, HomophoneRegistry, HomophoneTable};
pub use pipeline::builder::ReadingAlignerBuilder;
pub use pipeline::runtime::ReadingAligner;
pub use pipeline::traits::{GapClassifier, SequenceAligner, Tokenizer};
pub use types::{
    AlignedChunk, AlignmentInput, AlignmentOutput, AlignmentResult, AlignmentWarning, Gap,
    GapPosition, Insertion, LabeledGap, MispronunciationEntry, MispronunciationLabel, Segment,
    TranscriptItemKind, TranscriptWord,
};

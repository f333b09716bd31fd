pub mod gaps;
pub mod greedy;
pub mod mispronunciation;
pub mod report;
pub mod segments;
pub mod tokenization;

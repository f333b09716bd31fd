use crate::alignment::mispronunciation::GapEvidence;
use crate::types::{
    AlignedChunk, Gap, LabeledGap, MispronunciationEntry, ReferenceToken, Segment, TranscriptToken,
};

pub fn build_segments(
    chunks: &[AlignedChunk],
    reference: &[ReferenceToken],
    transcript: &[TranscriptToken],
) -> Vec<Segment> {
    chunks
        .iter()
        .map(|chunk| Segment {
            start_time: chunk.start_time,
            end_time: chunk.end_time,
            reference_text: join_words(
                reference[chunk.reference.clone()]
                    .iter()
                    .map(|t| t.text.as_str()),
            ),
            transcript_text: join_words(
                transcript[chunk.transcript.clone()]
                    .iter()
                    .map(|t| t.text.as_str()),
            ),
            reference: chunk.reference.clone(),
        })
        .collect()
}

pub fn build_mispronunciation_entry(
    gap: Gap,
    evidence: GapEvidence,
    reference: &[ReferenceToken],
) -> (LabeledGap, MispronunciationEntry) {
    let entry = MispronunciationEntry {
        reference_span: join_words(
            reference[gap.reference.clone()]
                .iter()
                .map(|t| t.text.as_str()),
        ),
        label: evidence.label,
        reference: gap.reference.clone(),
        skipped: evidence.skipped,
        heard: evidence.heard,
    };
    (
        LabeledGap {
            gap,
            label: evidence.label,
        },
        entry,
    )
}

fn join_words<'a>(words: impl Iterator<Item = &'a str>) -> String {
    words.collect::<Vec<_>>().join(" ")
}

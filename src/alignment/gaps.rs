use std::ops::Range;

use crate::types::{AlignedChunk, Gap, GapPosition, Insertion, TranscriptToken};

/// Reference runs between chunks, plus transcript-only runs between chunks
/// that sit back to back in the reference.
pub fn collect_gaps(
    chunks: &[AlignedChunk],
    reference_len: usize,
    transcript: &[TranscriptToken],
) -> (Vec<Gap>, Vec<Insertion>) {
    let n = transcript.len();
    let mut gaps = Vec::new();
    let mut insertions = Vec::new();

    if chunks.is_empty() {
        if reference_len > 0 {
            gaps.push(Gap {
                reference: 0..reference_len,
                slack: 0..n,
                position: GapPosition::Whole,
                start_time: 0.0,
                end_time: transcript.last().map_or(0.0, |t| t.end_time),
            });
        }
        return (gaps, insertions);
    }

    let mut prev_reference_end = 0usize;
    let mut prev_transcript_end = 0usize;
    let mut prev_time_end = 0.0f64;

    for (k, chunk) in chunks.iter().enumerate() {
        let slack = prev_transcript_end..chunk.transcript.start;
        if chunk.reference.start > prev_reference_end {
            gaps.push(Gap {
                reference: prev_reference_end..chunk.reference.start,
                slack,
                position: if k == 0 {
                    GapPosition::Leading
                } else {
                    GapPosition::Interior
                },
                start_time: prev_time_end,
                end_time: chunk.start_time,
            });
        } else if k > 0 && !slack.is_empty() {
            let (start_time, end_time) = span_times(transcript, &slack);
            insertions.push(Insertion {
                after_chunk: k - 1,
                transcript: slack,
                start_time,
                end_time,
            });
        }
        prev_reference_end = chunk.reference.end;
        prev_transcript_end = chunk.transcript.end;
        prev_time_end = chunk.end_time;
    }

    if prev_reference_end < reference_len {
        let slack = prev_transcript_end..n;
        let end_time = if slack.is_empty() {
            prev_time_end
        } else {
            span_times(transcript, &slack).1.max(prev_time_end)
        };
        gaps.push(Gap {
            reference: prev_reference_end..reference_len,
            slack,
            position: GapPosition::Trailing,
            start_time: prev_time_end,
            end_time,
        });
    }

    (gaps, insertions)
}

fn span_times(transcript: &[TranscriptToken], span: &Range<usize>) -> (f64, f64) {
    (
        transcript[span.start].start_time,
        transcript[span.end - 1].end_time,
    )
}

/// True when chunk and gap reference ranges, taken in order, tile
/// `[0, reference_len)` exactly once.
pub fn covers_reference(chunks: &[AlignedChunk], gaps: &[Gap], reference_len: usize) -> bool {
    let mut ranges: Vec<&Range<usize>> = chunks
        .iter()
        .map(|c| &c.reference)
        .chain(gaps.iter().map(|g| &g.reference))
        .collect();
    if ranges.iter().any(|r| r.is_empty()) {
        return false;
    }
    ranges.sort_by_key(|r| r.start);
    let mut cursor = 0usize;
    for range in ranges {
        if range.start != cursor {
            return false;
        }
        cursor = range.end;
    }
    cursor == reference_len
}

//! Greedy two-cursor alignment of reference tokens against transcript tokens.
//!
//! Both cursors only move forward. A run that starts exactly at the cursors
//! is always taken. Otherwise the aligner looks at a `lookahead x lookahead`
//! window anchored at the cursors and accepts the longest run of equivalent
//! tokens it finds there. Ties go to the run that starts earliest in the
//! transcript, then earliest in the reference. The accepted run is extended
//! past the window to its full length.
//!
//! When the window holds no run, the reader either skipped more reference
//! words than the window spans or said words that are not in the text. The
//! transcript window is then matched against the whole remaining reference.
//! Only if that fails too are the transcript window's tokens dropped; the
//! reference cursor stays put.

use std::ops::Range;

use crate::homophones::Equivalence;
use crate::types::{AlignedChunk, AlignmentWarning, ReferenceToken, TranscriptToken};

#[cfg(test)]
mod tests;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GreedyParams {
    pub lookahead: usize,
    pub min_run_length: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Candidate {
    reference_start: usize,
    transcript_start: usize,
    /// Run length capped at the window size.
    probe_len: usize,
}

pub fn greedy_align(
    reference: &[ReferenceToken],
    transcript: &[TranscriptToken],
    equivalence: Equivalence<'_>,
    params: GreedyParams,
) -> Vec<AlignedChunk> {
    let window = params.lookahead.max(1);
    let min_run = params.min_run_length.max(1);
    let (m, n) = (reference.len(), transcript.len());

    let mut chunks = Vec::new();
    let mut i = 0usize;
    let mut j = 0usize;
    let mut reference_skips = 0usize;
    let mut dropped_transcript = 0usize;

    while i < m && j < n {
        let at_cursor = run_length(reference, transcript, i, j, min_run, equivalence);
        let transcript_end = (j + window).min(n);
        let found = if at_cursor >= min_run {
            Some(Candidate {
                reference_start: i,
                transcript_start: j,
                probe_len: at_cursor,
            })
        } else {
            let search = SearchArea {
                reference: i..(i + window).min(m),
                transcript: j..transcript_end,
                cap: window,
                min_run,
            };
            let near = best_candidate(reference, transcript, &search, equivalence);
            if near.is_some() {
                near
            } else {
                let wide = SearchArea {
                    reference: i..m,
                    ..search
                };
                let far = best_candidate(reference, transcript, &wide, equivalence);
                if far.is_some() {
                    reference_skips += 1;
                }
                far
            }
        };
        let Some(candidate) = found else {
            // No run starts in the transcript window anywhere in the remaining
            // reference.
            dropped_transcript += transcript_end - j;
            j = transcript_end;
            continue;
        };

        let len = run_length(
            reference,
            transcript,
            candidate.reference_start,
            candidate.transcript_start,
            usize::MAX,
            equivalence,
        );
        let chunk = build_chunk(
            candidate.reference_start,
            candidate.transcript_start,
            len,
            transcript,
        );
        tracing::debug!(
            reference_start = chunk.reference.start,
            reference_end = chunk.reference.end,
            transcript_start = chunk.transcript.start,
            transcript_end = chunk.transcript.end,
            skipped_reference = candidate.reference_start - i,
            skipped_transcript = candidate.transcript_start - j,
            "greedy: chunk accepted"
        );
        i = chunk.reference.end;
        j = chunk.transcript.end;
        chunks.push(chunk);
    }

    if reference_skips > 0 || dropped_transcript > 0 {
        tracing::debug!(
            reference_skips,
            dropped_transcript,
            chunks = chunks.len(),
            "greedy: window misses"
        );
    }
    chunks
}

#[derive(Debug, Clone)]
struct SearchArea {
    reference: Range<usize>,
    transcript: Range<usize>,
    /// Longest run length worth measuring.
    cap: usize,
    min_run: usize,
}

fn best_candidate(
    reference: &[ReferenceToken],
    transcript: &[TranscriptToken],
    area: &SearchArea,
    equivalence: Equivalence<'_>,
) -> Option<Candidate> {
    let mut best: Option<Candidate> = None;

    // Scanning transcript-major means the first run of a given length is
    // the earliest one, so only strictly longer runs replace it.
    for q in area.transcript.clone() {
        for p in area.reference.clone() {
            if !equivalence.matches(&reference[p].text, &transcript[q].text) {
                continue;
            }
            let probe_len = run_length(reference, transcript, p, q, area.cap, equivalence);
            if probe_len < area.min_run {
                continue;
            }
            if best.map_or(true, |b| probe_len > b.probe_len) {
                best = Some(Candidate {
                    reference_start: p,
                    transcript_start: q,
                    probe_len,
                });
            }
        }
        if best.is_some_and(|b| b.probe_len >= area.cap) {
            break;
        }
    }
    best
}

fn run_length(
    reference: &[ReferenceToken],
    transcript: &[TranscriptToken],
    p: usize,
    q: usize,
    cap: usize,
    equivalence: Equivalence<'_>,
) -> usize {
    reference[p..]
        .iter()
        .zip(&transcript[q..])
        .take(cap)
        .take_while(|(r, t)| equivalence.matches(&r.text, &t.text))
        .count()
}

fn build_chunk(p: usize, q: usize, len: usize, transcript: &[TranscriptToken]) -> AlignedChunk {
    let span = &transcript[q..q + len];
    let confidences: Vec<f32> = span.iter().filter_map(|t| t.confidence).collect();
    let confidence = if confidences.is_empty() {
        None
    } else {
        Some(confidences.iter().sum::<f32>() / confidences.len() as f32)
    };
    AlignedChunk {
        reference: p..p + len,
        transcript: q..q + len,
        start_time: span[0].start_time,
        end_time: span[len - 1].end_time,
        confidence,
    }
}

/// Forces each chunk to start no earlier than the previous chunk ends.
pub fn clamp_overlaps(chunks: &mut [AlignedChunk]) -> Vec<AlignmentWarning> {
    let mut warnings = Vec::new();
    for k in 1..chunks.len() {
        let prev_end = chunks[k - 1].end_time;
        let chunk = &mut chunks[k];
        if chunk.start_time >= prev_end {
            continue;
        }
        let shifted_by = prev_end - chunk.start_time;
        tracing::warn!(
            chunk = k,
            start_time = chunk.start_time,
            prev_end,
            "greedy: overlapping transcript timestamps, clamping chunk start"
        );
        chunk.start_time = prev_end;
        if chunk.end_time < chunk.start_time {
            chunk.end_time = chunk.start_time;
        }
        warnings.push(AlignmentWarning::TimestampClamped { chunk: k, shifted_by });
    }
    warnings
}

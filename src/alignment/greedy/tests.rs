use super::{clamp_overlaps, greedy_align, GreedyParams};
use crate::homophones::{Equivalence, HomophoneTable};
use crate::types::{AlignmentWarning, ReferenceToken, TranscriptToken};

const PARAMS: GreedyParams = GreedyParams {
    lookahead: 8,
    min_run_length: 1,
};

fn reference(words: &str) -> Vec<ReferenceToken> {
    words
        .split_whitespace()
        .enumerate()
        .map(|(index, w)| ReferenceToken {
            index,
            text: w.to_string(),
        })
        .collect()
}

/// One token per word, each one second long, back to back.
fn transcript(words: &str) -> Vec<TranscriptToken> {
    words
        .split_whitespace()
        .enumerate()
        .map(|(index, w)| TranscriptToken {
            index,
            source_index: index,
            text: w.to_string(),
            start_time: index as f64,
            end_time: index as f64 + 1.0,
            confidence: None,
        })
        .collect()
}

fn spans(chunks: &[crate::types::AlignedChunk]) -> Vec<((usize, usize), (usize, usize))> {
    chunks
        .iter()
        .map(|c| {
            (
                (c.reference.start, c.reference.end),
                (c.transcript.start, c.transcript.end),
            )
        })
        .collect()
}

#[test]
fn identical_sequences_form_one_chunk() {
    let r = reference("once upon a time there was a cat");
    let t = transcript("once upon a time there was a cat");
    let chunks = greedy_align(&r, &t, Equivalence::identity(), PARAMS);
    assert_eq!(spans(&chunks), [((0, 8), (0, 8))]);
    assert_eq!(chunks[0].start_time, 0.0);
    assert_eq!(chunks[0].end_time, 8.0);
}

#[test]
fn identical_sequences_longer_than_window_stay_one_chunk() {
    let words = (0..40).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ");
    let chunks = greedy_align(
        &reference(&words),
        &transcript(&words),
        Equivalence::identity(),
        PARAMS,
    );
    assert_eq!(spans(&chunks), [((0, 40), (0, 40))]);
}

#[test]
fn substituted_last_word_is_left_out() {
    let chunks = greedy_align(
        &reference("the cat sat"),
        &transcript("the cat mat"),
        Equivalence::identity(),
        PARAMS,
    );
    assert_eq!(spans(&chunks), [((0, 2), (0, 2))]);
    assert_eq!((chunks[0].start_time, chunks[0].end_time), (0.0, 2.0));
}

#[test]
fn skipped_word_splits_into_two_chunks() {
    let chunks = greedy_align(
        &reference("read the book"),
        &transcript("read book"),
        Equivalence::identity(),
        PARAMS,
    );
    assert_eq!(spans(&chunks), [((0, 1), (0, 1)), ((2, 3), (1, 2))]);
}

#[test]
fn inserted_word_splits_transcript_only() {
    let chunks = greedy_align(
        &reference("the cat sat"),
        &transcript("the big cat sat"),
        Equivalence::identity(),
        PARAMS,
    );
    assert_eq!(spans(&chunks), [((0, 1), (0, 1)), ((1, 3), (2, 4))]);
}

#[test]
fn homophones_match_through_table() {
    let table = HomophoneTable::from_mapping(vec![("their", vec!["there"])]);
    let chunks = greedy_align(
        &reference("their house"),
        &transcript("there house"),
        Equivalence::with_table(&table),
        PARAMS,
    );
    assert_eq!(spans(&chunks), [((0, 2), (0, 2))]);
}

#[test]
fn longest_run_wins_over_nearer_short_run() {
    // At the cursor, "the" could match transcript[2] (run of 3) while
    // "book" matches transcript[0] (run of 5). The longer run is taken.
    let chunks = greedy_align(
        &reference("read the book and the cat sat"),
        &transcript("read book and the cat sat"),
        Equivalence::identity(),
        PARAMS,
    );
    assert_eq!(spans(&chunks), [((0, 1), (0, 1)), ((2, 7), (1, 6))]);
}

#[test]
fn run_at_cursor_is_taken_before_longer_runs_ahead() {
    let chunks = greedy_align(
        &reference("read the book and the cat sat"),
        &transcript("read book and the cat sat"),
        Equivalence::identity(),
        PARAMS,
    );
    assert_eq!(chunks[0].reference, 0..1);
    assert_eq!(chunks[0].transcript, 0..1);
}

#[test]
fn ties_prefer_earliest_transcript_occurrence() {
    let chunks = greedy_align(
        &reference("the"),
        &transcript("um the and the"),
        Equivalence::identity(),
        PARAMS,
    );
    assert_eq!(spans(&chunks), [((0, 1), (1, 2))]);
}

#[test]
fn equal_length_runs_prefer_smaller_transcript_index() {
    // "b" at (1, 0) and "a" at (0, 1) are both single-token runs.
    let chunks = greedy_align(
        &reference("a b"),
        &transcript("b a"),
        Equivalence::identity(),
        PARAMS,
    );
    assert_eq!(spans(&chunks), [((1, 2), (0, 1))]);
}

#[test]
fn no_shared_tokens_yields_no_chunks() {
    let chunks = greedy_align(
        &reference("alpha beta gamma"),
        &transcript("one two three four"),
        Equivalence::identity(),
        PARAMS,
    );
    assert!(chunks.is_empty());
}

#[test]
fn long_unread_opening_does_not_consume_transcript() {
    let unread = (0..50).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ");
    let r = reference(&format!("{unread} the cat sat on the mat"));
    let t = transcript("the cat sat on the mat");
    let chunks = greedy_align(&r, &t, Equivalence::identity(), PARAMS);
    assert_eq!(spans(&chunks), [((50, 56), (0, 6))]);
}

#[test]
fn long_spoken_preamble_keeps_reference_cursor() {
    let preamble = (0..20).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ");
    let chunks = greedy_align(
        &reference("the cat sat"),
        &transcript(&format!("{preamble} the cat sat")),
        Equivalence::identity(),
        PARAMS,
    );
    assert_eq!(spans(&chunks), [((0, 3), (20, 23))]);
}

#[test]
fn matches_beyond_window_are_still_found() {
    let params = GreedyParams {
        lookahead: 2,
        min_run_length: 1,
    };
    let chunks = greedy_align(
        &reference("x1 x2 x3 x4 end"),
        &transcript("y1 y2 y3 y4 end"),
        Equivalence::identity(),
        params,
    );
    assert_eq!(spans(&chunks), [((4, 5), (4, 5))]);
}

#[test]
fn min_run_length_rejects_short_matches() {
    let params = GreedyParams {
        lookahead: 8,
        min_run_length: 2,
    };
    let chunks = greedy_align(
        &reference("the dog ran to the big park"),
        &transcript("the cat sat by the big park"),
        Equivalence::identity(),
        params,
    );
    assert_eq!(spans(&chunks), [((4, 7), (4, 7))]);
}

#[test]
fn cursors_never_move_backwards() {
    let chunks = greedy_align(
        &reference("a b c d e f a b c"),
        &transcript("d e f a b c a b c"),
        Equivalence::identity(),
        PARAMS,
    );
    for pair in chunks.windows(2) {
        assert!(pair[0].reference.end <= pair[1].reference.start);
        assert!(pair[0].transcript.end <= pair[1].transcript.start);
    }
}

#[test]
fn empty_inputs_yield_no_chunks() {
    assert!(greedy_align(&[], &transcript("a"), Equivalence::identity(), PARAMS).is_empty());
    assert!(greedy_align(&reference("a"), &[], Equivalence::identity(), PARAMS).is_empty());
}

#[test]
fn chunk_confidence_is_mean_of_word_confidences() {
    let mut t = transcript("a b");
    t[0].confidence = Some(0.5);
    t[1].confidence = Some(1.0);
    let chunks = greedy_align(&reference("a b"), &t, Equivalence::identity(), PARAMS);
    assert_eq!(chunks[0].confidence, Some(0.75));
}

#[test]
fn clamp_moves_overlapping_start_forward() {
    let mut t = transcript("a x b");
    t[0].end_time = 2.5;
    let mut chunks = greedy_align(&reference("a b"), &t, Equivalence::identity(), PARAMS);
    assert_eq!(chunks.len(), 2);
    let warnings = clamp_overlaps(&mut chunks);
    assert_eq!(chunks[1].start_time, 2.5);
    assert_eq!(chunks[1].end_time, 3.0);
    assert_eq!(
        warnings,
        [AlignmentWarning::TimestampClamped {
            chunk: 1,
            shifted_by: 0.5
        }]
    );
}

#[test]
fn clamp_never_inverts_a_chunk() {
    let mut t = transcript("a b");
    t[0].end_time = 5.0;
    let mut chunks = greedy_align(&reference("a x b"), &t, Equivalence::identity(), PARAMS);
    clamp_overlaps(&mut chunks);
    assert_eq!(chunks[1].start_time, 5.0);
    assert_eq!(chunks[1].end_time, 5.0);
}

#[test]
fn clamp_leaves_ordered_chunks_alone() {
    let mut chunks = greedy_align(
        &reference("read the book"),
        &transcript("read book"),
        Equivalence::identity(),
        PARAMS,
    );
    assert!(clamp_overlaps(&mut chunks).is_empty());
}

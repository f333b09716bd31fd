use readalign::annotation::build_task;
use readalign::{
    aggregate_reports, compute_case_report, AlignerConfig, AlignmentInput, AlignmentOutput,
    GapPosition, HomophoneRegistry, MispronunciationLabel, ReadingAligner, ReadingAlignerBuilder,
    TranscriptWord,
};

const BASE: &str = "the quick brown fox jumps over the lazy dog near the river bank";

fn aligner() -> ReadingAligner {
    ReadingAlignerBuilder::new(AlignerConfig::default())
        .build()
        .expect("default aligner should build")
}

fn spoken(words: &[&str]) -> Vec<TranscriptWord> {
    words
        .iter()
        .enumerate()
        .map(|(k, w)| TranscriptWord::new(*w, k as f64 * 0.5, k as f64 * 0.5 + 0.45))
        .collect()
}

fn input(reference: &str, words: &[&str]) -> AlignmentInput {
    AlignmentInput {
        reference: reference.to_string(),
        transcript: spoken(words),
        language: "en".to_string(),
    }
}

/// Readings of `BASE` with one word dropped, replaced, doubled, or swapped.
fn variants() -> Vec<Vec<&'static str>> {
    let base: Vec<&str> = BASE.split_whitespace().collect();
    let mut out = vec![base.clone()];
    for k in 0..base.len() {
        let mut dropped = base.clone();
        dropped.remove(k);
        out.push(dropped);

        let mut replaced = base.clone();
        replaced[k] = "zebra";
        out.push(replaced);

        let mut doubled = base.clone();
        doubled.insert(k, base[k]);
        out.push(doubled);

        let mut hesitated = base.clone();
        hesitated.insert(k, "uh");
        out.push(hesitated);

        if k + 1 < base.len() {
            let mut swapped = base.clone();
            swapped.swap(k, k + 1);
            out.push(swapped);
        }
    }
    out
}

fn assert_invariants(output: &AlignmentOutput, context: &str) {
    let result = &output.result;
    let m = output.reference_tokens.len();
    let n = output.transcript_tokens.len();

    let mut covered = vec![0u32; m];
    for chunk in &result.chunks {
        assert!(!chunk.is_empty(), "{context}: empty chunk");
        assert_eq!(chunk.reference.len(), chunk.transcript.len(), "{context}");
        assert!(chunk.reference.end <= m && chunk.transcript.end <= n, "{context}");
        assert!(chunk.start_time <= chunk.end_time, "{context}");
        for idx in chunk.reference.clone() {
            covered[idx] += 1;
        }
    }
    for labeled in &result.gaps {
        for idx in labeled.gap.reference.clone() {
            covered[idx] += 1;
        }
    }
    assert!(
        covered.iter().all(|&count| count == 1),
        "{context}: coverage {covered:?}"
    );

    for pair in result.chunks.windows(2) {
        assert!(pair[0].reference.end <= pair[1].reference.start, "{context}");
        assert!(pair[0].transcript.end <= pair[1].transcript.start, "{context}");
        assert!(pair[0].end_time <= pair[1].start_time, "{context}");
    }
    assert_eq!(output.segments.len(), result.chunks.len(), "{context}");
    assert_eq!(output.mispronunciations.len(), result.gaps.len(), "{context}");
}

#[test]
fn every_variant_covers_reference_once_and_stays_monotonic() {
    let aligner = aligner();
    for words in variants() {
        let context = words.join(" ");
        let output = aligner
            .align(&input(BASE, &words))
            .unwrap_or_else(|err| panic!("{context}: {err}"));
        assert_invariants(&output, &context);
        assert!(!output.result.is_no_match(), "{context}");
    }
}

#[test]
fn small_window_keeps_invariants() {
    let config = AlignerConfig {
        lookahead: 2,
        ..AlignerConfig::default()
    };
    let aligner = ReadingAlignerBuilder::new(config).build().unwrap();
    for words in variants() {
        let context = words.join(" ");
        let output = aligner.align(&input(BASE, &words)).unwrap();
        assert_invariants(&output, &context);
    }
}

#[test]
fn identical_reading_is_one_chunk() {
    let words: Vec<&str> = BASE.split_whitespace().collect();
    let output = aligner().align(&input(BASE, &words)).unwrap();
    assert_eq!(output.result.chunks.len(), 1);
    assert_eq!(output.result.chunks[0].reference, 0..words.len());
    assert!(output.result.gaps.is_empty());
    assert!(output.result.insertions.is_empty());
    assert_eq!(output.segments[0].reference_text, BASE);
}

#[test]
fn dropped_word_is_one_addition_gap() {
    let mut words: Vec<&str> = BASE.split_whitespace().collect();
    words.remove(3);
    let output = aligner().align(&input(BASE, &words)).unwrap();
    assert_eq!(output.result.gaps.len(), 1);
    assert_eq!(output.result.gaps[0].gap.reference, 3..4);
    assert_eq!(output.result.gaps[0].label, MispronunciationLabel::Addition);
    assert_eq!(output.mispronunciations[0].skipped, ["fox"]);
}

#[test]
fn skipping_more_words_than_the_window_keeps_the_reading() {
    let unread: Vec<String> = (0..60).map(|i| format!("line{i}")).collect();
    let reference = format!("{} the cat sat on the mat", unread.join(" "));
    let words = ["the", "cat", "sat", "on", "the", "mat"];
    let output = aligner().align(&input(&reference, &words)).unwrap();

    assert_eq!(output.result.chunks.len(), 1);
    assert_eq!(output.result.chunks[0].reference, 60..66);
    assert_eq!(output.result.chunks[0].transcript, 0..6);
    assert_eq!(output.result.gaps.len(), 1);
    assert_eq!(output.result.gaps[0].gap.reference, 0..60);
    assert_eq!(output.result.gaps[0].label, MispronunciationLabel::Addition);
    assert_invariants(&output, "long skipped opening");
}

#[test]
fn builtin_english_table_is_reflexive_and_symmetric() {
    let registry = HomophoneRegistry::builtin().unwrap();
    let words = [
        "their", "there", "theyre", "to", "two", "too", "for", "four", "fore", "ate", "eight",
        "not", "knot", "won", "one", "sun", "son", "cat",
    ];
    for a in words {
        assert!(registry.are_equivalent(a, a, "en"), "{a} should match itself");
        for b in words {
            assert_eq!(
                registry.are_equivalent(a, b, "en"),
                registry.are_equivalent(b, a, "en"),
                "{a} / {b}"
            );
        }
    }
    assert!(registry.are_equivalent("their", "there", "en"));
    assert!(!registry.are_equivalent("their", "cat", "en"));
}

#[test]
fn unknown_language_matches_exact_tokens_only() {
    let registry = HomophoneRegistry::builtin().unwrap();
    assert!(registry.are_equivalent("their", "their", "sw"));
    assert!(!registry.are_equivalent("their", "there", "sw"));
}

#[test]
fn full_mismatch_label_matrix() {
    let aligner = aligner();
    let cases: [(&str, &[&str], MispronunciationLabel); 4] = [
        ("alpha beta", &["uh", "hmm"], MispronunciationLabel::Addition),
        ("alpha beta", &["gamma", "delta"], MispronunciationLabel::Substitution),
        ("alpha beta", &["gamma"], MispronunciationLabel::Substitution),
        ("alpha", &["gamma", "delta", "epsilon"], MispronunciationLabel::Substitution),
    ];
    for (reference, words, expected) in cases {
        let output = aligner.align(&input(reference, words)).unwrap();
        assert!(output.result.is_no_match(), "{reference} / {words:?}");
        assert_eq!(output.result.gaps.len(), 1);
        let gap = &output.result.gaps[0];
        assert_eq!(gap.gap.position, GapPosition::Whole);
        assert_eq!(gap.label, expected, "{reference} / {words:?}");
    }
}

#[test]
fn invalid_inputs_are_rejected_without_result() {
    let aligner = aligner();

    let empty_reference = input("  ?! ", &["hello"]);
    assert!(aligner.align(&empty_reference).unwrap_err().is_input_error());

    let empty_transcript = input("hello", &[]);
    assert!(aligner.align(&empty_transcript).unwrap_err().is_input_error());

    let mut inverted = input("hello world", &["hello", "world"]);
    inverted.transcript[1].end_time = inverted.transcript[1].start_time;
    assert!(aligner.align(&inverted).unwrap_err().is_input_error());

    let mut not_finite = input("hello", &["hello"]);
    not_finite.transcript[0].end_time = f64::NAN;
    assert!(aligner.align(&not_finite).unwrap_err().is_input_error());

    let mut negative = input("hello", &["hello"]);
    negative.transcript[0].start_time = -1.0;
    assert!(aligner.align(&negative).unwrap_err().is_input_error());

    let mut decreasing = input("a b", &["a", "b"]);
    decreasing.transcript[1].start_time = 0.0;
    decreasing.transcript[0].start_time = 0.2;
    assert!(aligner.align(&decreasing).unwrap_err().is_input_error());
}

#[test]
fn batch_matches_sequential_alignment() {
    let aligner = aligner();
    let inputs: Vec<AlignmentInput> = variants()
        .iter()
        .map(|words| input(BASE, words))
        .collect();
    let batch = aligner.align_batch(&inputs);
    assert_eq!(batch.len(), inputs.len());
    for (input, result) in inputs.iter().zip(&batch) {
        let sequential = aligner.align(input).unwrap();
        assert_eq!(result.as_ref().unwrap(), &sequential);
    }
}

#[test]
fn report_and_annotation_agree_with_output() {
    let mut words: Vec<&str> = BASE.split_whitespace().collect();
    words[5] = "under";
    let output = aligner().align(&input(BASE, &words)).unwrap();

    let report = compute_case_report("swap-over", "en", &output, true).unwrap();
    assert_eq!(report.chunk_count as usize, output.result.chunks.len());
    assert_eq!(report.labels.substitution, 1);
    assert!(report.coverage_ratio < 1.0);

    let aggregate = aggregate_reports(&[report], &[]);
    assert_eq!(aggregate.counts.aligned, 1);
    assert_eq!(aggregate.labels.total(), 1);

    let task = build_task("audio.wav", BASE, &output, "test");
    assert_eq!(
        task.predictions[0].result.len(),
        1 + 3 * output.segments.len()
    );
}

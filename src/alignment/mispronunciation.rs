//! Classification of reference gaps into mispronunciation labels.
//!
//! The gap's reference words are paired in order with the non-filler slack
//! words (longest common subsequence under token equivalence). What is left
//! unpaired on each side decides the label:
//!
//! | slack | unpaired reference | unpaired slack | label |
//! |-------|--------------------|----------------|-------|
//! | empty, trailing gap | - | - | `none` |
//! | empty, other gap | - | - | `addition` |
//! | non-empty | 0 | 0 | `none` |
//! | non-empty | 0 | > 0 | `addition` |
//! | non-empty | > 0 | 0 | `addition` |
//! | non-empty, nothing paired | g > 0 | s > 0 | `substitution` |
//! | non-empty, some paired | g > 0 | s = g | `substitution` |
//! | non-empty, some paired | g > 0 | s > 0, s != g | `both` |

use std::collections::HashSet;

use crate::homophones::Equivalence;
use crate::types::{GapPosition, MispronunciationLabel, ReferenceToken, TranscriptToken};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GapEvidence {
    pub label: MispronunciationLabel,
    /// Gap words with no counterpart in the slack.
    pub skipped: Vec<String>,
    /// Slack words with no counterpart in the gap.
    pub heard: Vec<String>,
}

pub fn classify_gap(
    gap_tokens: &[ReferenceToken],
    slack: &[TranscriptToken],
    position: GapPosition,
    fillers: &HashSet<String>,
    equivalence: Equivalence<'_>,
) -> GapEvidence {
    let spoken: Vec<&TranscriptToken> = slack
        .iter()
        .filter(|t| !fillers.contains(&t.text))
        .collect();

    if spoken.is_empty() {
        let label = if position == GapPosition::Trailing {
            MispronunciationLabel::None
        } else {
            MispronunciationLabel::Addition
        };
        return GapEvidence {
            label,
            skipped: gap_tokens.iter().map(|t| t.text.clone()).collect(),
            heard: Vec::new(),
        };
    }

    let (paired_gap, paired_slack) = pair_in_order(gap_tokens, &spoken, equivalence);
    let skipped: Vec<String> = gap_tokens
        .iter()
        .zip(&paired_gap)
        .filter(|(_, paired)| !**paired)
        .map(|(t, _)| t.text.clone())
        .collect();
    let heard: Vec<String> = spoken
        .iter()
        .zip(&paired_slack)
        .filter(|(_, paired)| !**paired)
        .map(|(t, _)| t.text.clone())
        .collect();

    let paired = gap_tokens.len() - skipped.len();
    let label = label_for_residue(paired, skipped.len(), heard.len());
    tracing::debug!(
        gap_words = gap_tokens.len(),
        paired,
        slack_words = spoken.len(),
        skipped = skipped.len(),
        heard = heard.len(),
        label = label.as_str(),
        "mispronunciation: gap classified"
    );
    GapEvidence {
        label,
        skipped,
        heard,
    }
}

/// Label from the pairing outcome. With nothing paired, every heard word
/// replaces the gap regardless of how many words either side has.
pub fn label_for_residue(
    paired: usize,
    unpaired_reference: usize,
    unpaired_slack: usize,
) -> MispronunciationLabel {
    match (unpaired_reference, unpaired_slack) {
        (0, 0) => MispronunciationLabel::None,
        (0, _) | (_, 0) => MispronunciationLabel::Addition,
        _ if paired == 0 => MispronunciationLabel::Substitution,
        (g, s) if g == s => MispronunciationLabel::Substitution,
        _ => MispronunciationLabel::Both,
    }
}

/// Order-preserving maximum pairing; returns a paired flag per element.
fn pair_in_order(
    gap_tokens: &[ReferenceToken],
    spoken: &[&TranscriptToken],
    equivalence: Equivalence<'_>,
) -> (Vec<bool>, Vec<bool>) {
    let (g, s) = (gap_tokens.len(), spoken.len());
    let width = s + 1;
    // lcs[a * width + b] = LCS length of gap_tokens[a..] and spoken[b..]
    let mut lcs = vec![0u32; (g + 1) * width];
    for a in (0..g).rev() {
        for b in (0..s).rev() {
            lcs[a * width + b] = if equivalence.matches(&gap_tokens[a].text, &spoken[b].text) {
                lcs[(a + 1) * width + b + 1] + 1
            } else {
                lcs[(a + 1) * width + b].max(lcs[a * width + b + 1])
            };
        }
    }

    let mut paired_gap = vec![false; g];
    let mut paired_slack = vec![false; s];
    let (mut a, mut b) = (0usize, 0usize);
    while a < g && b < s {
        if equivalence.matches(&gap_tokens[a].text, &spoken[b].text)
            && lcs[a * width + b] == lcs[(a + 1) * width + b + 1] + 1
        {
            paired_gap[a] = true;
            paired_slack[b] = true;
            a += 1;
            b += 1;
        } else if lcs[(a + 1) * width + b] >= lcs[a * width + b + 1] {
            a += 1;
        } else {
            b += 1;
        }
    }
    (paired_gap, paired_slack)
}

//! Label Studio task export.
//!
//! Each aligned chunk becomes three regions sharing the id `sentence_<k>`: the
//! heard words, a `Sentence` label, and the reference words.

use serde::Serialize;

use crate::types::{AlignmentOutput, Segment};

pub const SENTENCE_LABEL: &str = "Sentence";
const AUDIO_TARGET: &str = "audio";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotationRegion {
    pub value: RegionValue,
    pub id: String,
    pub from_name: &'static str,
    pub to_name: &'static str,
    #[serde(rename = "type")]
    pub kind: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionValue {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotationTask {
    pub data: TaskData,
    pub predictions: Vec<Prediction>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskData {
    pub audio: String,
    /// Reference text shown to the labeller.
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub model_version: String,
    pub result: Vec<AnnotationRegion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

pub fn sentence_regions(segments: &[Segment]) -> Vec<AnnotationRegion> {
    let mut regions = Vec::with_capacity(segments.len() * 3);
    for (k, segment) in segments.iter().enumerate() {
        let id = format!("sentence_{k}");
        let timed = |text: Option<&str>, labels: Option<&str>| RegionValue {
            start: Some(segment.start_time),
            end: Some(segment.end_time),
            text: text.map(|t| vec![t.to_string()]),
            labels: labels.map(|l| vec![l.to_string()]),
        };
        regions.push(AnnotationRegion {
            value: timed(Some(segment.transcript_text.as_str()), None),
            id: id.clone(),
            from_name: "transcription",
            to_name: AUDIO_TARGET,
            kind: "textarea",
        });
        regions.push(AnnotationRegion {
            value: timed(None, Some(SENTENCE_LABEL)),
            id: id.clone(),
            from_name: "labels",
            to_name: AUDIO_TARGET,
            kind: "labels",
        });
        regions.push(AnnotationRegion {
            value: timed(Some(segment.reference_text.as_str()), None),
            id,
            from_name: "region-ground-truth",
            to_name: AUDIO_TARGET,
            kind: "textarea",
        });
    }
    regions
}

/// Task whose first result is the whole transcript, followed by the sentence
/// regions of every aligned chunk.
pub fn build_task(
    audio: &str,
    reference: &str,
    output: &AlignmentOutput,
    model_version: &str,
) -> AnnotationTask {
    let transcript_text = output
        .transcript_tokens
        .iter()
        .map(|t| t.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");

    let mut result = vec![AnnotationRegion {
        value: RegionValue {
            start: None,
            end: None,
            text: Some(vec![transcript_text]),
            labels: None,
        },
        id: "transcript".to_string(),
        from_name: "transcription",
        to_name: AUDIO_TARGET,
        kind: "textarea",
    }];
    result.extend(sentence_regions(&output.segments));

    let confidences: Vec<f32> = output
        .transcript_tokens
        .iter()
        .filter_map(|t| t.confidence)
        .collect();
    let score = (!confidences.is_empty())
        .then(|| confidences.iter().sum::<f32>() / confidences.len() as f32);

    AnnotationTask {
        data: TaskData {
            audio: audio.to_string(),
            text: reference.to_string(),
        },
        predictions: vec![Prediction {
            model_version: model_version.to_string(),
            result,
            score,
        }],
    }
}

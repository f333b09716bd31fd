use std::cmp::Ordering;

use serde::Serialize;

use crate::error::AlignmentError;
use crate::types::{
    AlignmentOutput, AlignmentWarning, MispronunciationEntry, MispronunciationLabel, Segment,
};

pub const REPORT_SCHEMA_VERSION: u32 = 1;
const OUTLIER_TOP_N: usize = 20;

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub schema_version: u32,
    pub meta: Meta,
    pub cases: Vec<CaseReport>,
    pub failures: Vec<CaseFailure>,
    pub aggregates: AggregateReport,
}

#[derive(Debug, Clone, Serialize)]
pub struct Meta {
    pub generated_at: String,
    pub lookahead: usize,
    pub min_run_length: usize,
    pub homophone_languages: Vec<String>,
    pub case_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct CaseReport {
    pub id: String,
    pub language: String,
    pub reference_token_count: u32,
    pub transcript_token_count: u32,
    pub chunk_count: u32,
    pub gap_count: u32,
    pub insertion_count: u32,
    /// Share of reference tokens inside a chunk.
    pub coverage_ratio: f32,
    pub mean_chunk_length: f32,
    pub mean_confidence: Option<f32>,
    pub labels: LabelCounts,
    pub warnings: Vec<AlignmentWarning>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub segments: Option<Vec<Segment>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mispronunciations: Option<Vec<MispronunciationEntry>>,
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LabelCounts {
    pub addition: u32,
    pub substitution: u32,
    pub both: u32,
    pub none: u32,
}

impl LabelCounts {
    pub fn record(&mut self, label: MispronunciationLabel) {
        let slot = match label {
            MispronunciationLabel::Addition => &mut self.addition,
            MispronunciationLabel::Substitution => &mut self.substitution,
            MispronunciationLabel::Both => &mut self.both,
            MispronunciationLabel::None => &mut self.none,
        };
        *slot = slot.saturating_add(1);
    }

    pub fn total(&self) -> u32 {
        self.addition + self.substitution + self.both + self.none
    }

    fn merge(&mut self, other: &LabelCounts) {
        self.addition += other.addition;
        self.substitution += other.substitution;
        self.both += other.both;
        self.none += other.none;
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CaseFailure {
    pub id: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AggregateReport {
    pub counts: AggregateCounts,
    pub labels: LabelCounts,
    pub metrics: AggregateMetrics,
    pub outliers: OutlierReport,
}

#[derive(Debug, Clone, Serialize)]
pub struct AggregateCounts {
    pub total: u32,
    pub aligned: u32,
    pub failed: u32,
    pub no_match: u32,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct AggregateMetrics {
    pub coverage_ratio: Option<MetricDistribution>,
    pub chunks_per_case: Option<MetricDistribution>,
    pub mean_chunk_length: Option<MetricDistribution>,
    pub insertions_per_case: Option<MetricDistribution>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricDistribution {
    pub mean: f32,
    pub p50: f32,
    pub p90: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct OutlierReport {
    pub worst_coverage_ratio: Vec<OutlierEntry>,
    pub most_gaps: Vec<OutlierEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OutlierEntry {
    pub id: String,
    pub value: f32,
}

pub fn compute_case_report(
    id: &str,
    language: &str,
    output: &AlignmentOutput,
    include_details: bool,
) -> Result<CaseReport, AlignmentError> {
    let result = &output.result;
    let reference_len = output.reference_tokens.len();
    let mut notes = Vec::new();

    if result.is_no_match() {
        notes.push("no_match".to_string());
    }
    let clamped = output
        .warnings
        .iter()
        .filter(|w| matches!(w, AlignmentWarning::TimestampClamped { .. }))
        .count();
    if clamped > 0 {
        notes.push(format!("timestamp_clamped={clamped}"));
    }
    if output
        .warnings
        .iter()
        .any(|w| matches!(w, AlignmentWarning::MissingHomophoneTable { .. }))
    {
        notes.push("identity_equivalence_only".to_string());
    }

    let matched = result.matched_reference_tokens();
    let coverage_ratio = if reference_len == 0 {
        0.0
    } else {
        matched as f64 / reference_len as f64
    };
    let mean_chunk_length = if result.chunks.is_empty() {
        0.0
    } else {
        matched as f64 / result.chunks.len() as f64
    };
    let confidences: Vec<f64> = result
        .chunks
        .iter()
        .filter_map(|chunk| chunk.confidence.map(f64::from))
        .collect();
    let mean_confidence = if confidences.is_empty() {
        None
    } else {
        Some(checked_f32(mean(&confidences), "case.mean_confidence")?)
    };

    let mut labels = LabelCounts::default();
    for gap in &result.gaps {
        labels.record(gap.label);
    }

    Ok(CaseReport {
        id: id.to_string(),
        language: language.to_string(),
        reference_token_count: to_u32(reference_len),
        transcript_token_count: to_u32(output.transcript_tokens.len()),
        chunk_count: to_u32(result.chunks.len()),
        gap_count: to_u32(result.gaps.len()),
        insertion_count: to_u32(result.insertions.len()),
        coverage_ratio: checked_f32(coverage_ratio, "case.coverage_ratio")?,
        mean_chunk_length: checked_f32(mean_chunk_length, "case.mean_chunk_length")?,
        mean_confidence,
        labels,
        warnings: output.warnings.clone(),
        segments: include_details.then(|| output.segments.clone()),
        mispronunciations: include_details.then(|| output.mispronunciations.clone()),
        notes,
    })
}

pub fn aggregate_reports(cases: &[CaseReport], failures: &[CaseFailure]) -> AggregateReport {
    let mut labels = LabelCounts::default();
    for case in cases {
        labels.merge(&case.labels);
    }
    let no_match = cases.iter().filter(|case| case.chunk_count == 0).count();

    let metrics = AggregateMetrics {
        coverage_ratio: distribution_or_none(&metric_values(cases, |c| c.coverage_ratio as f64)),
        chunks_per_case: distribution_or_none(&metric_values(cases, |c| c.chunk_count as f64)),
        mean_chunk_length: distribution_or_none(&metric_values(cases, |c| {
            c.mean_chunk_length as f64
        })),
        insertions_per_case: distribution_or_none(&metric_values(cases, |c| {
            c.insertion_count as f64
        })),
    };

    AggregateReport {
        counts: AggregateCounts {
            total: to_u32(cases.len() + failures.len()),
            aligned: to_u32(cases.len()),
            failed: to_u32(failures.len()),
            no_match: to_u32(no_match),
        },
        labels,
        metrics,
        outliers: OutlierReport {
            worst_coverage_ratio: ranked_outliers(cases, OUTLIER_TOP_N, Ordering::Less, |c| {
                c.coverage_ratio as f64
            }),
            most_gaps: ranked_outliers(cases, OUTLIER_TOP_N, Ordering::Greater, |c| {
                c.gap_count as f64
            }),
        },
    }
}

fn metric_values(cases: &[CaseReport], metric: impl Fn(&CaseReport) -> f64) -> Vec<f64> {
    cases.iter().map(metric).collect()
}

/// `worst` is the ordering of a worse value relative to a better one.
fn ranked_outliers(
    cases: &[CaseReport],
    top_n: usize,
    worst: Ordering,
    metric: impl Fn(&CaseReport) -> f64,
) -> Vec<OutlierEntry> {
    let mut entries: Vec<OutlierEntry> = cases
        .iter()
        .map(|case| OutlierEntry {
            id: case.id.clone(),
            value: metric(case) as f32,
        })
        .collect();

    entries.sort_by(|a, b| {
        let by_value = a.value.partial_cmp(&b.value).unwrap_or(Ordering::Equal);
        let by_value = if worst == Ordering::Greater {
            by_value.reverse()
        } else {
            by_value
        };
        by_value.then_with(|| a.id.cmp(&b.id))
    });
    entries.truncate(top_n);
    entries
}

fn distribution_or_none(values: &[f64]) -> Option<MetricDistribution> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    Some(MetricDistribution {
        mean: checked_f32(mean(&sorted), "aggregate.mean").ok()?,
        p50: checked_f32(percentile_sorted(&sorted, 0.5), "aggregate.p50").ok()?,
        p90: checked_f32(percentile_sorted(&sorted, 0.9), "aggregate.p90").ok()?,
    })
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn percentile_sorted(sorted_values: &[f64], percentile: f64) -> f64 {
    if sorted_values.is_empty() {
        return 0.0;
    }
    if sorted_values.len() == 1 {
        return sorted_values[0];
    }

    let clamped = percentile.clamp(0.0, 1.0);
    let max_index = (sorted_values.len() - 1) as f64;
    let rank = clamped * max_index;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        sorted_values[lower]
    } else {
        let weight = rank - lower as f64;
        sorted_values[lower] * (1.0 - weight) + sorted_values[upper] * weight
    }
}

fn to_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

fn checked_f32(value: f64, metric_name: &str) -> Result<f32, AlignmentError> {
    if !value.is_finite() {
        return Err(AlignmentError::invalid_input(format!(
            "metric '{metric_name}' produced non-finite value: {value}"
        )));
    }
    if value < f32::MIN as f64 || value > f32::MAX as f64 {
        return Err(AlignmentError::invalid_input(format!(
            "metric '{metric_name}' out of f32 range: {value}"
        )));
    }
    Ok(value as f32)
}

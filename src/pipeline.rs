//! Pipeline orchestration
//!
//! This module provides the public API for humanbench. It routes each test in
//! a capture bundle to its analyzer and encodes the combined report.

use crate::capture::CaptureBundle;
use crate::config::AnalysisConfig;
use crate::encoder::ReportEncoder;
use crate::error::AnalysisError;
use crate::grid::Grid;
use crate::memory::{chimp_result, number_result, visual_result};
use crate::reaction::reaction_result;
use crate::spatial::aim_result;
use crate::types::{BenchmarkReport, GridRound, SequenceResult};
use crate::typing::typing_result;
use crate::verbal::verbal_result;
use tracing::{debug, info};

/// Analyze a capture bundle JSON with the default configuration.
///
/// # Returns
/// The report envelope as pretty-printed JSON
///
/// # Example
/// ```ignore
/// let report = analyze_capture_json(r#"{"reaction": {"times": [200, 215]}}"#.to_string())?;
/// ```
pub fn analyze_capture_json(capture_json: String) -> Result<String, AnalysisError> {
    BenchmarkAnalyzer::new().process(&capture_json)
}

/// Reusable analyzer holding a validated configuration and one encoder
/// instance, so every report it produces carries the same instance ID.
pub struct BenchmarkAnalyzer {
    config: AnalysisConfig,
    encoder: ReportEncoder,
}

impl Default for BenchmarkAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl BenchmarkAnalyzer {
    /// Create an analyzer with the default configuration
    pub fn new() -> Self {
        Self {
            config: AnalysisConfig::default(),
            encoder: ReportEncoder::new(),
        }
    }

    /// Create an analyzer with a custom configuration
    pub fn with_config(config: AnalysisConfig) -> Result<Self, AnalysisError> {
        config.validate()?;
        Ok(Self {
            config,
            encoder: ReportEncoder::new(),
        })
    }

    /// Replace the encoder, e.g. to pin the instance ID
    pub fn with_encoder(mut self, encoder: ReportEncoder) -> Self {
        self.encoder = encoder;
        self
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn encoder(&self) -> &ReportEncoder {
        &self.encoder
    }

    /// Run every analyzer whose test is present in the bundle
    pub fn analyze(&self, bundle: &CaptureBundle) -> Result<BenchmarkReport, AnalysisError> {
        bundle.validate()?;

        let report = BenchmarkReport {
            reaction: bundle
                .reaction
                .as_ref()
                .map(|c| reaction_result(c.times.clone())),
            sequence: bundle
                .sequence
                .as_ref()
                .map(|c| SequenceResult::from_sequence(c.final_sequence.clone())),
            aim: bundle.aim.as_ref().map(|c| {
                aim_result(
                    c.targets,
                    c.seconds,
                    c.coordinates.clone(),
                    self.config.target_radius,
                )
            }),
            number: bundle
                .number
                .as_ref()
                .map(|c| number_result(c.numbers.clone())),
            verbal: bundle
                .verbal
                .as_ref()
                .map(|c| verbal_result(&c.words, c.score, self.config.most_common_count)),
            chimp: bundle
                .chimp
                .as_ref()
                .map(|c| chimp_result(analyze_grids(&c.grids), c.seconds)),
            visual: bundle
                .visual
                .as_ref()
                .map(|c| visual_result(c.level_lost, analyze_grids(&c.boards))),
            typing: bundle
                .typing
                .as_ref()
                .map(|c| typing_result(c.words_per_min, &c.text, &self.config.difficulty)),
        };

        debug!(
            session_id = ?bundle.session_id,
            tests = ?bundle.tests_present(),
            "analyzed capture bundle"
        );
        Ok(report)
    }

    /// Parse a capture bundle JSON, analyze it and encode the report envelope
    pub fn process(&self, capture_json: &str) -> Result<String, AnalysisError> {
        let bundle = CaptureBundle::from_json(capture_json)?;
        let report = self.analyze(&bundle)?;
        self.encoder.encode_to_json(bundle.session_id, report)
    }

    /// Analyze newline-delimited bundles, returning one compact envelope per line
    pub fn process_ndjson(&self, input: &str) -> Result<Vec<String>, AnalysisError> {
        let bundles = CaptureBundle::parse_ndjson(input)?;
        let mut envelopes = Vec::with_capacity(bundles.len());
        for bundle in bundles {
            let report = self.analyze(&bundle)?;
            let envelope = self.encoder.encode(bundle.session_id, report);
            envelopes.push(serde_json::to_string(&envelope)?);
        }
        info!(bundles = envelopes.len(), "processed capture stream");
        Ok(envelopes)
    }
}

fn analyze_grids(grids: &[Grid]) -> Vec<GridRound> {
    grids.iter().cloned().map(GridRound::analyze).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::ReportEnvelope;
    use crate::types::WordCount;
    use pretty_assertions::assert_eq;

    const FULL_CAPTURE: &str = r#"{
        "session_id": "session-7",
        "reaction": { "times": [250, 200, 300, 220, 230] },
        "sequence": { "final_sequence": [4, 1, 4, 1, 7] },
        "aim": { "targets": 3, "seconds": 1.5, "coordinates": [[0, 0], [0, 300], [400, 300]] },
        "number": { "numbers": [3, 17, 402] },
        "verbal": { "score": 3, "words": { "cat": [0, 2], "dog": [1] } },
        "chimp": { "grids": [[[1, 2, 0], [0, 3, 4]]], "seconds": 2.0 },
        "visual": { "level_lost": 2, "boards": [[[1, 0, 1], [0, 0, 1], [0, 0, 0]]] },
        "typing": { "words_per_min": 120, "text": "The cat sat. The cat sat!" }
    }"#;

    #[test]
    fn test_analyze_full_bundle() {
        let bundle = CaptureBundle::from_json(FULL_CAPTURE).unwrap();
        let report = BenchmarkAnalyzer::new().analyze(&bundle).unwrap();

        assert_eq!(report.reaction.unwrap().best, Some(200));
        assert_eq!(report.sequence.unwrap().longest_sub_sequence, vec![4, 1]);

        let aim = report.aim.unwrap();
        assert_eq!(aim.ms_per_target, 500.0);
        // 300 - 100 and 400 - 100
        assert_eq!(aim.distance.unwrap().total, Some(500.0));

        assert_eq!(report.number.unwrap().total_digits, 6);

        let verbal = report.verbal.unwrap();
        assert_eq!(
            verbal.most_common[0],
            WordCount {
                word: "cat".to_string(),
                count: 2
            }
        );

        let chimp = report.chimp.unwrap();
        assert_eq!(chimp.numbers, 4);
        assert_eq!(chimp.grids[0].islands, vec![4]);

        let visual = report.visual.unwrap();
        assert_eq!(visual.total_squares, 3);
        assert_eq!(visual.boards[0].islands, vec![2, 1]);

        let typing = report.typing.unwrap();
        assert_eq!(typing.word_count, 6);
        assert!(typing.difficulty.overall.is_some());
    }

    #[test]
    fn test_empty_bundle_yields_empty_report() {
        let report = BenchmarkAnalyzer::new()
            .analyze(&CaptureBundle::default())
            .unwrap();
        assert_eq!(report, BenchmarkReport::default());
    }

    #[test]
    fn test_config_changes_results() {
        let config = AnalysisConfig {
            target_radius: 0.0,
            most_common_count: 1,
            ..Default::default()
        };
        let analyzer = BenchmarkAnalyzer::with_config(config).unwrap();
        let bundle = CaptureBundle::from_json(FULL_CAPTURE).unwrap();
        let report = analyzer.analyze(&bundle).unwrap();

        assert_eq!(report.aim.unwrap().distance.unwrap().total, Some(700.0));
        assert_eq!(report.verbal.unwrap().most_common.len(), 1);
    }

    #[test]
    fn test_with_config_rejects_invalid() {
        let config = AnalysisConfig {
            most_common_count: 0,
            ..Default::default()
        };
        assert!(matches!(
            BenchmarkAnalyzer::with_config(config),
            Err(AnalysisError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_process_produces_envelope() {
        let analyzer = BenchmarkAnalyzer::new()
            .with_encoder(ReportEncoder::with_instance_id("fixed".to_string()));
        let json = analyzer.process(FULL_CAPTURE).unwrap();
        let envelope: ReportEnvelope = serde_json::from_str(&json).unwrap();

        assert_eq!(envelope.session_id.as_deref(), Some("session-7"));
        assert_eq!(envelope.producer.instance_id, "fixed");
        assert_eq!(envelope.tests_analyzed.len(), 8);
        assert!(envelope.results.aim.is_some());
    }

    #[test]
    fn test_analyze_capture_json() {
        let json = analyze_capture_json(r#"{"reaction": {"times": [180]}}"#.to_string()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["tests_analyzed"], serde_json::json!(["reaction"]));
        assert_eq!(value["results"]["reaction"]["best"], 180);
    }

    #[test]
    fn test_invalid_input_is_an_error() {
        assert!(analyze_capture_json("not json".to_string()).is_err());
        assert!(matches!(
            analyze_capture_json(r#"{"chimp": {"grids": [], "seconds": -1}}"#.to_string()),
            Err(AnalysisError::InvalidCapture(_))
        ));
    }

    #[test]
    fn test_repeated_word_position_is_analyzed() {
        let json =
            analyze_capture_json(r#"{"verbal": {"words": {"cat": [0, 0]}}}"#.to_string()).unwrap();
        let envelope: ReportEnvelope = serde_json::from_str(&json).unwrap();
        let verbal = envelope.results.verbal.unwrap();
        assert_eq!(verbal.unique_count, 1);
        assert_eq!(verbal.biggest_gap, None);
    }

    #[test]
    fn test_huge_visual_level_is_an_error() {
        assert!(matches!(
            analyze_capture_json(
                r#"{"visual": {"level_lost": 100000, "boards": []}}"#.to_string()
            ),
            Err(AnalysisError::InvalidCapture(_))
        ));
    }

    #[test]
    fn test_twenty_digit_number_is_analyzed() {
        let json = analyze_capture_json(
            r#"{"number": {"numbers": ["98765432109876543210"]}}"#.to_string(),
        )
        .unwrap();
        let envelope: ReportEnvelope = serde_json::from_str(&json).unwrap();
        let number = envelope.results.number.unwrap();
        assert_eq!(number.score, 1);
        assert_eq!(number.digit_breakdown, [2; 10]);
    }

    #[test]
    fn test_process_ndjson() {
        let analyzer = BenchmarkAnalyzer::new();
        let input = concat!(
            r#"{"session_id": "a", "number": {"numbers": [5]}}"#,
            "\n",
            r#"{"session_id": "b", "sequence": {"final_sequence": [2, 2]}}"#,
            "\n"
        );
        let lines = analyzer.process_ndjson(input).unwrap();
        assert_eq!(lines.len(), 2);
        assert!(!lines[0].contains('\n'));

        let second: ReportEnvelope = serde_json::from_str(&lines[1]).unwrap();
        assert_eq!(second.session_id.as_deref(), Some("b"));
        assert_eq!(
            second.results.sequence.unwrap().longest_sub_sequence,
            vec![2]
        );
    }
}

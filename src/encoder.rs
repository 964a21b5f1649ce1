//! Report encoding
//!
//! Wraps a [`BenchmarkReport`] in an envelope carrying producer metadata and
//! the computation timestamp, so reports from different builds and machines
//! can be told apart downstream.

use crate::error::AnalysisError;
use crate::types::BenchmarkReport;
use crate::{PRODUCER_NAME, VERSION};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Current report envelope version
pub const REPORT_VERSION: &str = "1.0.0";

/// Who computed a report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Envelope around the results of one capture bundle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportEnvelope {
    pub report_version: String,
    pub producer: ReportProducer,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    /// RFC 3339 timestamp
    pub computed_at_utc: String,
    /// Names of the tests with results, in report order
    pub tests_analyzed: Vec<String>,
    pub results: BenchmarkReport,
}

/// Encoder for report envelopes
pub struct ReportEncoder {
    instance_id: String,
}

impl Default for ReportEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// Wrap a report in an envelope stamped with the current time
    pub fn encode(&self, session_id: Option<String>, report: BenchmarkReport) -> ReportEnvelope {
        ReportEnvelope {
            report_version: REPORT_VERSION.to_string(),
            producer: ReportProducer {
                name: PRODUCER_NAME.to_string(),
                version: VERSION.to_string(),
                instance_id: self.instance_id.clone(),
            },
            session_id,
            computed_at_utc: Utc::now().to_rfc3339(),
            tests_analyzed: report
                .tests_present()
                .into_iter()
                .map(String::from)
                .collect(),
            results: report,
        }
    }

    /// Encode to a JSON string
    pub fn encode_to_json(
        &self,
        session_id: Option<String>,
        report: BenchmarkReport,
    ) -> Result<String, AnalysisError> {
        let envelope = self.encode(session_id, report);
        Ok(serde_json::to_string_pretty(&envelope)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::longest_repeated_run;
    use crate::types::SequenceResult;
    use chrono::DateTime;

    fn sample_report() -> BenchmarkReport {
        BenchmarkReport {
            sequence: Some(SequenceResult {
                final_sequence: vec![3, 1, 3, 1],
                score: 4,
                longest_sub_sequence: longest_repeated_run(&[3, 1, 3, 1]),
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_encode_envelope() {
        let encoder = ReportEncoder::with_instance_id("test-instance".to_string());
        let envelope = encoder.encode(Some("run-9".to_string()), sample_report());

        assert_eq!(envelope.report_version, REPORT_VERSION);
        assert_eq!(envelope.producer.name, PRODUCER_NAME);
        assert_eq!(envelope.producer.version, VERSION);
        assert_eq!(envelope.producer.instance_id, "test-instance");
        assert_eq!(envelope.session_id.as_deref(), Some("run-9"));
        assert_eq!(envelope.tests_analyzed, vec!["sequence".to_string()]);
        assert!(DateTime::parse_from_rfc3339(&envelope.computed_at_utc).is_ok());
    }

    #[test]
    fn test_encode_to_json_omits_absent_tests() {
        let encoder = ReportEncoder::new();
        let json = encoder.encode_to_json(None, sample_report()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert!(value.get("session_id").is_none());
        assert!(value["results"].get("reaction").is_none());
        assert_eq!(
            value["results"]["sequence"]["longest_sub_sequence"],
            serde_json::json!([3, 1])
        );
    }

    #[test]
    fn test_instance_ids_are_unique() {
        assert_ne!(ReportEncoder::new().instance_id(), ReportEncoder::new().instance_id());
    }
}

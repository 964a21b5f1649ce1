//! humanbench - Analysis core for human benchmark telemetry
//!
//! humanbench turns the raw values captured from a run of the Human Benchmark
//! tests into derived metrics: reaction time summaries, aim gap distances,
//! verbal memory word statistics, chimp and visual memory island counts,
//! sequence repetition and a typing difficulty score.
//!
//! ## Modules
//!
//! - **Analyzers**: pure functions per test (`grid`, `sequence`, `spatial`,
//!   `verbal`, `typing`, `reaction`, `memory`) built on the `stats` primitives
//! - **Pipeline**: routes a capture bundle through the analyzers and encodes a
//!   report envelope

pub mod capture;
pub mod config;
pub mod encoder;
pub mod error;
pub mod grid;
pub mod memory;
pub mod pipeline;
pub mod reaction;
pub mod sequence;
pub mod spatial;
pub mod stats;
pub mod types;
pub mod typing;
pub mod verbal;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use capture::CaptureBundle;
pub use config::AnalysisConfig;
pub use encoder::{ReportEncoder, ReportEnvelope};
pub use error::AnalysisError;
pub use pipeline::{analyze_capture_json, BenchmarkAnalyzer};

// Analyzer exports
pub use grid::{get_islands, island_sizes, Grid};
pub use sequence::longest_repeated_run;
pub use spatial::{distance_summary, gap_distances};
pub use typing::{difficulty_score, DifficultyCalibration, TextSample};
pub use verbal::{verbal_result, WordOccurrenceLog};

/// humanbench version embedded in every report
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for report envelopes
pub const PRODUCER_NAME: &str = "humanbench";

//! Metrics reports for CI artifacts.
//!
//! Worldtests fill a [`MetricsReport`] with cave and lifecycle numbers and
//! write it as pretty JSON next to the test output.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Top-level metrics report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsReport {
    /// Test/benchmark identifier
    pub test_name: String,

    /// Timestamp when metrics were collected (ISO 8601)
    pub timestamp: String,

    /// Overall test result
    pub result: TestResult,

    /// Cave generation metrics
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cave: Option<CaveMetrics>,

    /// Destruction/regeneration metrics
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lifecycle: Option<LifecycleMetrics>,

    /// Peer sync metrics
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<NetworkMetrics>,

    /// Test execution metrics
    pub test_execution: TestExecutionMetrics,
}

/// Overall test result status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestResult {
    /// Test passed all validations
    Pass,
    /// Test failed
    Fail,
    /// Test was skipped
    Skip,
}

/// Cave generation numbers aggregated over one or more seeds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CaveMetrics {
    /// Seeds generated
    pub seeds: usize,

    /// Average wall segments per level
    pub avg_segments: f64,

    /// Average solid cells per grid
    pub avg_solid_cells: f64,

    /// Average main tunnels per level
    pub avg_main_tunnels: f64,

    /// Seeds whose tunnel network was fully connected
    pub connected_seeds: usize,

    /// Average generation time per level (microseconds)
    pub avg_gen_time_us: f64,
}

/// Destruction lifecycle counters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LifecycleMetrics {
    /// Damage calls applied
    pub hits: usize,

    /// Segments destroyed
    pub destroyed: usize,

    /// Segments regenerated
    pub regenerated: usize,

    /// Regenerations deferred by occupancy
    pub deferred: usize,
}

/// Peer message counters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetworkMetrics {
    /// Messages broadcast
    pub messages_sent: usize,

    /// Messages delivered to handlers
    pub messages_received: usize,

    /// Messages rejected by decode or validation
    pub messages_rejected: usize,

    /// Bytes put on the wire
    pub bytes_sent: u64,
}

/// Test execution and infrastructure metrics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TestExecutionMetrics {
    /// Total test duration (seconds)
    pub duration_seconds: f64,

    /// Number of assertions checked
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assertions_checked: Option<usize>,

    /// Number of validations passed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validations_passed: Option<usize>,
}

/// Builder for constructing metrics reports
pub struct MetricsReportBuilder {
    report: MetricsReport,
}

impl MetricsReportBuilder {
    /// Create a new builder with test name
    pub fn new(test_name: impl Into<String>) -> Self {
        Self {
            report: MetricsReport {
                test_name: test_name.into(),
                timestamp: chrono::Utc::now().to_rfc3339(),
                result: TestResult::Pass,
                cave: None,
                lifecycle: None,
                network: None,
                test_execution: TestExecutionMetrics::default(),
            },
        }
    }

    /// Set test result
    pub fn result(mut self, result: TestResult) -> Self {
        self.report.result = result;
        self
    }

    /// Set cave metrics
    pub fn cave(mut self, metrics: CaveMetrics) -> Self {
        self.report.cave = Some(metrics);
        self
    }

    /// Set lifecycle metrics
    pub fn lifecycle(mut self, metrics: LifecycleMetrics) -> Self {
        self.report.lifecycle = Some(metrics);
        self
    }

    /// Set network metrics
    pub fn network(mut self, metrics: NetworkMetrics) -> Self {
        self.report.network = Some(metrics);
        self
    }

    /// Set test execution metrics
    pub fn execution(mut self, metrics: TestExecutionMetrics) -> Self {
        self.report.test_execution = metrics;
        self
    }

    /// Build the metrics report
    pub fn build(self) -> MetricsReport {
        self.report
    }
}

/// Sink for writing metrics reports to JSON files
pub struct MetricsSink {
    path: PathBuf,
}

impl MetricsSink {
    /// Create a new metrics sink at the specified path
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating metrics directory {}", parent.display()))?;
        }
        Ok(Self { path })
    }

    /// Write metrics report to file
    pub fn write(&self, report: &MetricsReport) -> Result<()> {
        let json = serde_json::to_string_pretty(report)?;
        let mut file = File::create(&self.path)
            .with_context(|| format!("creating metrics file {}", self.path.display()))?;
        file.write_all(json.as_bytes())?;
        tracing::debug!(path = %self.path.display(), "metrics written");
        Ok(())
    }

    /// Destination path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

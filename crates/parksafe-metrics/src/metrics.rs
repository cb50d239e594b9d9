use parksafe_core::{RiskAssessment, RiskLevel};
use prometheus::core::Collector;
use prometheus::{
    histogram_opts, opts, Encoder, Histogram, IntCounterVec, Registry, TextEncoder,
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetricsError {
    #[error("prometheus: {0}")]
    Prometheus(#[from] prometheus::Error),
    #[error("metrics output is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Counters and histograms for scoring outcomes, held in a private registry
/// so several services (or tests) can coexist in one process.
pub struct ScoringMetrics {
    registry: Registry,
    pub assessments_total: IntCounterVec,
    pub rejected_requests_total: IntCounterVec,
    pub risk_score: Histogram,
}

impl ScoringMetrics {
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let assessments_total = IntCounterVec::new(
            opts!(
                "parksafe_assessments_total",
                "Risk assessments served, by risk level"
            ),
            &["risk_level"],
        )?;
        registry.register(Box::new(assessments_total.clone()))?;

        let rejected_requests_total = IntCounterVec::new(
            opts!(
                "parksafe_rejected_requests_total",
                "Requests rejected before scoring, by reason"
            ),
            &["reason"],
        )?;
        registry.register(Box::new(rejected_requests_total.clone()))?;

        let risk_score = Histogram::with_opts(histogram_opts!(
            "parksafe_risk_score",
            "Distribution of overall risk scores",
            vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9, 1.0]
        ))?;
        registry.register(Box::new(risk_score.clone()))?;

        Ok(Self {
            registry,
            assessments_total,
            rejected_requests_total,
            risk_score,
        })
    }

    pub fn observe_assessment(&self, assessment: &RiskAssessment) {
        self.assessments_total
            .with_label_values(&[assessment.risk_level.as_str()])
            .inc();
        self.risk_score.observe(assessment.risk_score);
    }

    pub fn observe_rejection(&self, reason: &str) {
        self.rejected_requests_total
            .with_label_values(&[reason])
            .inc();
    }

    /// Reads the counter for `level` from a snapshot, without creating the
    /// series when it has never been observed.
    pub fn assessments_at(&self, level: RiskLevel) -> u64 {
        self.assessments_total
            .collect()
            .iter()
            .flat_map(|family| family.get_metric())
            .filter(|metric| {
                metric.get_label().iter().any(|pair| {
                    pair.get_name() == "risk_level" && pair.get_value() == level.as_str()
                })
            })
            .map(|metric| metric.get_counter().get_value() as u64)
            .sum()
    }

    /// Prometheus text exposition of everything registered.
    pub fn render(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let mut buf = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buf)?;
        Ok(String::from_utf8(buf)?)
    }
}

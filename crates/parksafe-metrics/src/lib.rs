pub mod metrics;


pub use metrics::{MetricsError, ScoringMetrics};

//! Submission metrics for the prediction service.

use crate::types::prediction::{Outcome, Prediction};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use tracing::info;

/// Metrics collector for form and API submissions
pub struct ServiceMetrics {
    /// Total submissions received
    pub submissions: AtomicU64,
    /// Submissions rejected by the form collector
    pub rejected: AtomicU64,
    /// Predictions with a positive outcome
    pub likely: AtomicU64,
    /// Predictions with a negative outcome
    pub unlikely: AtomicU64,
    /// Classifier failures
    pub failures: AtomicU64,
    /// Predictions that contained at least one unseen category
    pub unseen_category_predictions: AtomicU64,
    /// Processing times (in microseconds)
    processing_times: RwLock<Vec<u64>>,
    /// Positive-class probability distribution buckets
    probability_buckets: RwLock<[u64; 10]>,
    start_time: Instant,
}

impl ServiceMetrics {
    pub fn new() -> Self {
        Self {
            submissions: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
            likely: AtomicU64::new(0),
            unlikely: AtomicU64::new(0),
            failures: AtomicU64::new(0),
            unseen_category_predictions: AtomicU64::new(0),
            processing_times: RwLock::new(Vec::with_capacity(1000)),
            probability_buckets: RwLock::new([0; 10]),
            start_time: Instant::now(),
        }
    }

    /// Record a rejected submission
    pub fn record_rejected(&self) {
        self.submissions.fetch_add(1, Ordering::Relaxed);
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a successful prediction
    pub fn record_prediction(&self, prediction: &Prediction, processing_time: Duration) {
        self.submissions.fetch_add(1, Ordering::Relaxed);
        match prediction.outcome {
            Outcome::Likely => self.likely.fetch_add(1, Ordering::Relaxed),
            Outcome::Unlikely => self.unlikely.fetch_add(1, Ordering::Relaxed),
        };
        if !prediction.unseen_categories.is_empty() {
            self.unseen_category_predictions
                .fetch_add(1, Ordering::Relaxed);
        }

        self.record_time(processing_time);

        if let Some(p) = prediction.positive_probability() {
            let bucket = (p.clamp(0.0, 1.0) * 10.0).min(9.0) as usize;
            if let Ok(mut buckets) = self.probability_buckets.write() {
                buckets[bucket] += 1;
            }
        }
    }

    /// Record a classifier failure
    pub fn record_failure(&self, processing_time: Duration) {
        self.submissions.fetch_add(1, Ordering::Relaxed);
        self.failures.fetch_add(1, Ordering::Relaxed);
        self.record_time(processing_time);
    }

    fn record_time(&self, processing_time: Duration) {
        if let Ok(mut times) = self.processing_times.write() {
            times.push(processing_time.as_micros() as u64);
            // Keep only the most recent samples
            if times.len() > 10000 {
                times.drain(0..5000);
            }
        }
    }

    /// Get processing time statistics
    pub fn get_processing_stats(&self) -> ProcessingStats {
        let Ok(times) = self.processing_times.read() else {
            return ProcessingStats::default();
        };
        if times.is_empty() {
            return ProcessingStats::default();
        }

        let mut sorted: Vec<u64> = times.clone();
        sorted.sort_unstable();

        let sum: u64 = sorted.iter().sum();
        let count = sorted.len();

        ProcessingStats {
            count: count as u64,
            mean_us: sum / count as u64,
            p50_us: sorted[count / 2],
            p95_us: sorted[((count as f64 * 0.95) as usize).min(count - 1)],
            p99_us: sorted[((count as f64 * 0.99) as usize).min(count - 1)],
            max_us: *sorted.last().unwrap_or(&0),
        }
    }

    /// Get the positive-class probability distribution
    pub fn get_probability_distribution(&self) -> [u64; 10] {
        self.probability_buckets
            .read()
            .map(|b| *b)
            .unwrap_or_default()
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            uptime_secs: self.start_time.elapsed().as_secs(),
            submissions: self.submissions.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            likely: self.likely.load(Ordering::Relaxed),
            unlikely: self.unlikely.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            unseen_category_predictions: self.unseen_category_predictions.load(Ordering::Relaxed),
            processing: self.get_processing_stats(),
            probability_distribution: self.get_probability_distribution(),
        }
    }

    /// Log summary statistics
    pub fn print_summary(&self) {
        let snapshot = self.snapshot();
        let predictions = snapshot.likely + snapshot.unlikely;
        let likely_rate = if predictions > 0 {
            (snapshot.likely as f64 / predictions as f64) * 100.0
        } else {
            0.0
        };

        info!(
            submissions = snapshot.submissions,
            rejected = snapshot.rejected,
            failures = snapshot.failures,
            likely = snapshot.likely,
            unlikely = snapshot.unlikely,
            likely_rate = format!("{:.1}%", likely_rate),
            unseen_categories = snapshot.unseen_category_predictions,
            "Submission summary"
        );
        info!(
            mean_us = snapshot.processing.mean_us,
            p50_us = snapshot.processing.p50_us,
            p95_us = snapshot.processing.p95_us,
            p99_us = snapshot.processing.p99_us,
            max_us = snapshot.processing.max_us,
            "Processing time"
        );

        let total: u64 = snapshot.probability_distribution.iter().sum();
        if total > 0 {
            for (i, &count) in snapshot.probability_distribution.iter().enumerate() {
                let pct = (count as f64 / total as f64) * 100.0;
                let bar: String = "█".repeat(((pct / 5.0) as usize).min(20));
                info!(
                    "  p(subscribe) {:.1}-{:.1}: {:>6} ({:>5.1}%) {}",
                    i as f64 / 10.0,
                    (i + 1) as f64 / 10.0,
                    count,
                    pct,
                    bar
                );
            }
        }
    }
}

impl Default for ServiceMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Processing time statistics
#[derive(Debug, Default, Clone, Serialize)]
pub struct ProcessingStats {
    pub count: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub p95_us: u64,
    pub p99_us: u64,
    pub max_us: u64,
}

/// Point-in-time view of the metrics, served at `/metrics`
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub uptime_secs: u64,
    pub submissions: u64,
    pub rejected: u64,
    pub likely: u64,
    pub unlikely: u64,
    pub failures: u64,
    pub unseen_category_predictions: u64,
    pub processing: ProcessingStats,
    pub probability_distribution: [u64; 10],
}

/// Periodic metrics reporter
pub struct MetricsReporter {
    metrics: Arc<ServiceMetrics>,
    interval_secs: u64,
}

impl MetricsReporter {
    pub fn new(metrics: Arc<ServiceMetrics>, interval_secs: u64) -> Self {
        Self {
            metrics,
            interval_secs,
        }
    }

    /// Start the periodic reporting task
    pub async fn start(self) {
        let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs.max(1)));
        // The first tick completes immediately
        interval.tick().await;
        loop {
            interval.tick().await;
            self.metrics.print_summary();
        }
    }
}

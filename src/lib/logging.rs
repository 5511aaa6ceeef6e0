//! Formatting helpers and summaries for log output.

use std::time::{Duration, Instant};

use crate::metrics::AnnotationMetrics;

/// Formats a count with comma thousands separators.
///
/// ```
/// use tagbam_lib::logging::format_count;
///
/// assert_eq!(format_count(1_234_567), "1,234,567");
/// assert_eq!(format_count(12), "12");
/// ```
#[must_use]
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Formats a fraction (0.0-1.0) as a percentage with `decimals` places.
///
/// ```
/// use tagbam_lib::logging::format_percent;
///
/// assert_eq!(format_percent(0.9543, 2), "95.43%");
/// assert_eq!(format_percent(1.0, 0), "100%");
/// ```
#[must_use]
pub fn format_percent(value: f64, decimals: usize) -> String {
    format!("{:.decimals$}%", value * 100.0)
}

/// Formats a duration as e.g. "45s", "2m 15s" or "1h 30m".
#[must_use]
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    match secs {
        0..60 => format!("{secs}s"),
        60..3600 => {
            let (mins, rem) = (secs / 60, secs % 60);
            if rem == 0 { format!("{mins}m") } else { format!("{mins}m {rem}s") }
        }
        _ => {
            let (hours, mins) = (secs / 3600, (secs % 3600) / 60);
            if mins == 0 { format!("{hours}h") } else { format!("{hours}h {mins}m") }
        }
    }
}

/// Formats a throughput as records per second, or per minute when below one per second.
#[must_use]
pub fn format_rate(count: u64, duration: Duration) -> String {
    let secs = duration.as_secs_f64();
    if secs < 0.001 {
        return format!("{} records/s", format_count(count));
    }
    let rate = count as f64 / secs;
    if rate >= 1.0 {
        format!("{} records/s", format_count(rate as u64))
    } else {
        format!("{:.1} records/min", count as f64 / (secs / 60.0))
    }
}

/// Logs the end-of-run summary for an annotation run.
pub fn log_annotation_summary(metrics: &AnnotationMetrics, max_dist: i64) {
    log::info!("Amplicon Annotation Summary:");
    log::info!("  Total records: {}", format_count(metrics.total_records));
    log::info!("  Resolved fragments: {}", format_count(metrics.eligible_records));
    log::info!("    assigned: {}", format_count(metrics.assigned_fragments));
    log::info!("    unassigned: {}", format_count(metrics.unassigned_fragments));
    log::info!("  Ineligible records: {}", format_count(metrics.ineligible_records));
    if metrics.empty_tagged_records > 0 {
        log::info!("  Records with empty tag: {}", format_count(metrics.empty_tagged_records));
    }
    log::info!("  Chromosomes: {}", metrics.chromosomes);
    log::info!(
        "Tagged {} records out of {} ({}) with maxDist {max_dist}",
        format_count(metrics.tagged_records),
        format_count(metrics.total_records),
        format_percent(metrics.fraction_tagged, 2),
    );
}

/// Times an operation and logs its completion with a record rate.
///
/// ```no_run
/// use tagbam_lib::logging::OperationTimer;
///
/// let timer = OperationTimer::new("Annotating records");
/// // ... do work ...
/// timer.log_completion(10_000);
/// ```
pub struct OperationTimer {
    operation: String,
    start_time: Instant,
}

impl OperationTimer {
    /// Creates a new timer and logs the start.
    #[must_use]
    pub fn new(operation: &str) -> Self {
        log::info!("{operation} ...");
        Self { operation: operation.to_string(), start_time: Instant::now() }
    }

    /// Time since the timer was created.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Logs the completion with record count and rate.
    pub fn log_completion(&self, count: u64) {
        let duration = self.elapsed();
        log::info!(
            "{} completed: {} records in {} ({})",
            self.operation,
            format_count(count),
            format_duration(duration),
            format_rate(count, duration)
        );
    }
}

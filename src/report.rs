//! Aggregation and rendering of per-test results.
//!
//! This module is purely computational: it folds [`RunStat`] values into
//! category and grand totals and renders plain report lines plus a severity
//! tier. Styling is the presentation layer's job (see `cmd::run`).

use std::{ops::Add, time::Duration};

/// Points, maximum points, and elapsed time for one labeled unit — a single
/// test, a category subtotal, or the grand total.
///
/// Addition is pointwise over points/max/duration (the left label is kept),
/// so accumulation is associative and commutative; summed stats are derived
/// values, never mutated in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunStat {
    /// Test name or category label, depending on aggregation level.
    pub label: String,

    /// Points earned.
    pub points: u32,

    /// Maximum points possible.
    pub max: u32,

    /// Elapsed wall-clock time.
    pub duration: Duration,
}

impl RunStat {
    pub fn new(label: impl Into<String>, points: u32, max: u32, duration: Duration) -> Self {
        Self {
            label: label.into(),
            points,
            max,
            duration,
        }
    }

    /// The same stat under a different label.
    pub fn with_label(&self, label: impl Into<String>) -> Self {
        Self::new(label, self.points, self.max, self.duration)
    }

    /// Points as a percentage of max. 0 when max is 0.
    pub fn percent(&self) -> f64 {
        if self.max == 0 {
            0.0
        } else {
            f64::from(self.points) / f64::from(self.max) * 100.0
        }
    }

    /// Severity tier of this stat's percentage.
    pub fn severity(&self) -> Severity {
        Severity::from_percent(self.percent())
    }
}

impl Add for RunStat {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            label: self.label,
            points: self.points + other.points,
            max: self.max + other.max,
            duration: self.duration + other.duration,
        }
    }
}

/// Presentation tier for a score percentage. Has no effect on scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Below 40%.
    Low,

    /// 40% up to 80%.
    Medium,

    /// 80% and above.
    High,
}

impl Severity {
    pub fn from_percent(percent: f64) -> Self {
        if percent < 40.0 {
            Self::Low
        } else if percent < 80.0 {
            Self::Medium
        } else {
            Self::High
        }
    }
}

/// The append-only sequence of per-test stats for one model's run.
#[derive(Debug, Clone, Default)]
pub struct Report {
    stats: Vec<RunStat>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one test's stat. The label is the test's category.
    pub fn push(&mut self, stat: RunStat) {
        self.stats.push(stat);
    }

    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }

    /// Fold stats into one subtotal per category, categories in
    /// first-appearance order.
    pub fn category_totals(&self) -> Vec<RunStat> {
        let mut totals: Vec<RunStat> = Vec::new();

        for stat in &self.stats {
            match totals.iter_mut().find(|t| t.label == stat.label) {
                Some(total) => *total = total.clone() + stat.clone(),
                None => totals.push(stat.clone()),
            }
        }

        totals
    }

    /// Fold all stats into a grand total labeled `Total`.
    pub fn total(&self) -> RunStat {
        self.stats
            .iter()
            .cloned()
            .fold(RunStat::new("Total", 0, 0, Duration::ZERO), |acc, stat| {
                acc + stat
            })
    }
}

/// Width of the report's separator line.
pub const SEPARATOR_WIDTH: usize = 44;

/// Render one plain report line: `<label padded> <pts>/<max>, <pct>% <mm:ss.ff>`.
pub fn format_line(stat: &RunStat) -> String {
    format!(
        "{:>20} {:>2}/{:>2}, {:>4.0}% {}",
        stat.label,
        stat.points,
        stat.max,
        stat.percent(),
        format_duration(stat.duration)
    )
}

/// Format a duration as `mm:ss.ff` (minutes, seconds, centiseconds).
pub fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs();
    let minutes = total_secs / 60;
    let seconds = total_secs % 60;
    let centis = duration.subsec_millis() / 10;
    format!("{minutes:02}:{seconds:02}.{centis:02}")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn stat(label: &str, points: u32, max: u32, secs: u64) -> RunStat {
        RunStat::new(label, points, max, Duration::from_secs(secs))
    }

    #[test]
    fn addition_is_pointwise_and_keeps_left_label() {
        let sum = stat("a", 3, 10, 5) + stat("b", 2, 10, 7);
        assert_eq!(sum, stat("a", 5, 20, 12));
    }

    #[test]
    fn addition_is_associative_and_commutative_in_values() {
        let (a, b, c) = (stat("x", 1, 5, 1), stat("x", 2, 5, 2), stat("x", 3, 5, 3));

        let left = (a.clone() + b.clone()) + c.clone();
        let right = a.clone() + (b.clone() + c.clone());
        assert_eq!(left, right);

        let ab = a.clone() + b.clone();
        let ba = b + a;
        assert_eq!((ab.points, ab.max, ab.duration), (ba.points, ba.max, ba.duration));
    }

    #[test]
    fn total_is_independent_of_grouping() {
        let mut report = Report::new();
        report.push(stat("strings", 5, 10, 3));
        report.push(stat("math", 10, 10, 4));
        report.push(stat("strings", 0, 10, 5));

        let by_category = report
            .category_totals()
            .into_iter()
            .fold(RunStat::new("Total", 0, 0, Duration::ZERO), |acc, s| acc + s);

        assert_eq!(report.total(), by_category.with_label("Total"));
        assert_eq!(report.total(), stat("Total", 15, 30, 12));
    }

    #[test]
    fn category_totals_keep_first_seen_order() {
        let mut report = Report::new();
        report.push(stat("strings", 5, 10, 1));
        report.push(stat("math", 10, 10, 1));
        report.push(stat("strings", 10, 10, 1));

        let labels: Vec<String> = report
            .category_totals()
            .into_iter()
            .map(|t| t.label)
            .collect();
        assert_eq!(labels, vec!["strings", "math"]);
    }

    #[test]
    fn severity_tiers() {
        assert_eq!(Severity::from_percent(0.0), Severity::Low);
        assert_eq!(Severity::from_percent(39.9), Severity::Low);
        assert_eq!(Severity::from_percent(40.0), Severity::Medium);
        assert_eq!(Severity::from_percent(79.9), Severity::Medium);
        assert_eq!(Severity::from_percent(80.0), Severity::High);
        assert_eq!(Severity::from_percent(100.0), Severity::High);
    }

    #[test]
    fn zero_max_is_zero_percent() {
        assert_eq!(stat("x", 0, 0, 0).percent(), 0.0);
    }

    #[test]
    fn duration_formatting() {
        assert_eq!(format_duration(Duration::from_millis(0)), "00:00.00");
        assert_eq!(format_duration(Duration::from_millis(61_230)), "01:01.23");
        assert_eq!(format_duration(Duration::from_secs(600)), "10:00.00");
    }

    #[test]
    fn line_formatting() {
        let line = format_line(&stat("strings", 5, 10, 61));
        assert_eq!(line, "             strings  5/10,   50% 01:01.00");
    }
}

//! The filter-and-aggregate engine.
//!
//! [`apply`] is a pure function of an immutable [`Dataset`] and a
//! [`FilterSelection`]: every call filters from scratch and derives each view
//! independently, so it can run concurrently against a shared dataset.

use std::collections::BTreeMap;

use serde::Serialize;

use super::filter::{filter, FilterSelection, FilteredView};
use super::model::{Dataset, Outcome, Record};
use super::stats::{self, BoxSummary};

/// Number of equal-width bins in the age histogram.
pub const AGE_BIN_COUNT: usize = 20;

/// Placeholder rendered for an undefined metric.
pub const NO_DATA: &str = "no data";

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// KPIs over the whole dataset, independent of any selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlobalKpis {
    pub records: usize,
    pub avg_age: Option<f64>,
    pub avg_duration: Option<f64>,
    /// Percentage of `Yes` outcomes.
    pub success_rate: Option<f64>,
}

/// KPIs over the filtered view. `None` means the view has no usable data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeadlineMetrics {
    pub records: usize,
    pub success_rate: Option<f64>,
    pub avg_duration: Option<f64>,
    pub avg_emp_var_rate: Option<f64>,
    pub avg_cons_conf_idx: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgeBin {
    pub lower: f64,
    pub upper: f64,
    pub yes: usize,
    pub no: usize,
}

impl AgeBin {
    pub fn count(&self, outcome: Outcome) -> usize {
        match outcome {
            Outcome::Yes => self.yes,
            Outcome::No => self.no,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DurationBox {
    pub outcome: Outcome,
    pub summary: BoxSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobSuccess {
    pub job: String,
    pub contacts: usize,
    pub success_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EducationCount {
    pub education: String,
    pub count: usize,
    /// Percentage of the filtered view.
    pub share: f64,
}

/// Outcome frequencies within one month; `yes_rate + no_rate == 100`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthOutcome {
    pub month: String,
    pub contacts: usize,
    pub yes_rate: f64,
    pub no_rate: f64,
}

impl MonthOutcome {
    pub fn rate(&self, outcome: Outcome) -> f64 {
        match outcome {
            Outcome::Yes => self.yes_rate,
            Outcome::No => self.no_rate,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EconomicPoint {
    pub emp_var_rate: f64,
    pub euribor3m: f64,
    pub outcome: Outcome,
}

/// Everything the dashboard renders for one selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateResult {
    pub selection: FilterSelection,
    pub headline: HeadlineMetrics,
    pub age_histogram: Vec<AgeBin>,
    pub duration_by_outcome: Vec<DurationBox>,
    pub job_success: Vec<JobSuccess>,
    pub education_counts: Vec<EducationCount>,
    pub month_outcomes: Vec<MonthOutcome>,
    pub economic_points: Vec<EconomicPoint>,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

pub fn global_kpis(dataset: &Dataset) -> GlobalKpis {
    let records = dataset.records();
    GlobalKpis {
        records: records.len(),
        avg_age: stats::mean(records.iter().map(|r| r.age.map(|v| v as f64))),
        avg_duration: stats::mean(records.iter().map(|r| r.duration.map(|v| v as f64))),
        success_rate: success_rate(records.iter()),
    }
}

/// Filter `dataset` by `selection` and derive every view from the result.
pub fn apply(dataset: &Dataset, selection: &FilterSelection) -> AggregateResult {
    let view = filter(dataset, selection);
    log::debug!(
        "selection {selection:?} keeps {} of {} records",
        view.len(),
        dataset.len()
    );

    AggregateResult {
        selection: selection.clone(),
        headline: headline_metrics(&view),
        age_histogram: age_histogram(&view, AGE_BIN_COUNT),
        duration_by_outcome: duration_by_outcome(&view),
        job_success: job_success(&view),
        education_counts: education_counts(&view),
        month_outcomes: month_outcomes(&view),
        economic_points: economic_points(&view),
    }
}

pub fn headline_metrics(view: &FilteredView<'_>) -> HeadlineMetrics {
    HeadlineMetrics {
        records: view.len(),
        success_rate: success_rate(view.iter()),
        avg_duration: stats::mean(view.iter().map(|r| r.duration.map(|v| v as f64))),
        avg_emp_var_rate: stats::mean(view.iter().map(|r| r.emp_var_rate)),
        avg_cons_conf_idx: stats::mean(view.iter().map(|r| r.cons_conf_idx)),
    }
}

fn success_rate<'a>(records: impl Iterator<Item = &'a Record>) -> Option<f64> {
    let (yes, total) = records.fold((0, 0), |(yes, total), r| {
        (yes + usize::from(r.y.is_yes()), total + 1)
    });
    stats::proportion(yes, total)
}

/// Age counts per outcome over `bins` equal-width bins spanning the observed
/// age range of the view. Records without an age are not counted.
pub fn age_histogram(view: &FilteredView<'_>, bins: usize) -> Vec<AgeBin> {
    let ages: Vec<(f64, Outcome)> = view
        .iter()
        .filter_map(|r| r.age.map(|a| (a as f64, r.y)))
        .collect();

    let Some(min) = ages.iter().map(|(a, _)| *a).reduce(f64::min) else {
        return Vec::new();
    };
    let max = ages.iter().map(|(a, _)| *a).fold(min, f64::max);

    let edges = stats::equal_width_bins(min, max, bins);
    let mut hist: Vec<AgeBin> = edges
        .iter()
        .map(|&(lower, upper)| AgeBin {
            lower,
            upper,
            yes: 0,
            no: 0,
        })
        .collect();

    for (age, outcome) in ages {
        let Some(bin) = stats::bin_index(&edges, age).and_then(|i| hist.get_mut(i)) else {
            continue;
        };
        match outcome {
            Outcome::Yes => bin.yes += 1,
            Outcome::No => bin.no += 1,
        }
    }
    hist
}

/// Box-plot inputs of `duration`, one entry per outcome present in the view.
pub fn duration_by_outcome(view: &FilteredView<'_>) -> Vec<DurationBox> {
    Outcome::ALL
        .iter()
        .filter_map(|&outcome| {
            let durations: Vec<f64> = view
                .iter()
                .filter(|r| r.y == outcome)
                .filter_map(|r| r.duration.map(|d| d as f64))
                .collect();
            BoxSummary::from_values(durations).map(|summary| DurationBox { outcome, summary })
        })
        .collect()
}

/// Success rate per job, highest first. Ties are ordered by job name.
pub fn job_success(view: &FilteredView<'_>) -> Vec<JobSuccess> {
    let mut groups: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    for r in view.iter() {
        let entry = groups.entry(r.job.as_str()).or_default();
        entry.0 += usize::from(r.y.is_yes());
        entry.1 += 1;
    }

    let mut rows: Vec<JobSuccess> = groups
        .into_iter()
        .filter_map(|(job, (yes, contacts))| {
            stats::proportion(yes, contacts).map(|success_rate| JobSuccess {
                job: job.to_owned(),
                contacts,
                success_rate,
            })
        })
        .collect();
    rows.sort_by(|a, b| {
        b.success_rate
            .total_cmp(&a.success_rate)
            .then_with(|| a.job.cmp(&b.job))
    });
    rows
}

/// Contacts per education level, in education-name order.
pub fn education_counts(view: &FilteredView<'_>) -> Vec<EducationCount> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for r in view.iter() {
        *counts.entry(r.education.as_str()).or_default() += 1;
    }

    let total = view.len();
    counts
        .into_iter()
        .filter_map(|(education, count)| {
            stats::proportion(count, total).map(|share| EducationCount {
                education: education.to_owned(),
                count,
                share,
            })
        })
        .collect()
}

/// Normalized outcome frequencies per month, in month-name order.
pub fn month_outcomes(view: &FilteredView<'_>) -> Vec<MonthOutcome> {
    let mut groups: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    for r in view.iter() {
        let entry = groups.entry(r.month.as_str()).or_default();
        entry.0 += usize::from(r.y.is_yes());
        entry.1 += 1;
    }

    groups
        .into_iter()
        .filter_map(|(month, (yes, contacts))| {
            let yes_rate = stats::proportion(yes, contacts)?;
            Some(MonthOutcome {
                month: month.to_owned(),
                contacts,
                yes_rate,
                no_rate: 100.0 - yes_rate,
            })
        })
        .collect()
}

/// `(emp.var.rate, euribor3m, y)` per record; records missing either
/// coordinate cannot be placed and are skipped.
pub fn economic_points(view: &FilteredView<'_>) -> Vec<EconomicPoint> {
    view.iter()
        .filter_map(|r| {
            Some(EconomicPoint {
                emp_var_rate: r.emp_var_rate?,
                euribor3m: r.euribor3m?,
                outcome: r.y,
            })
        })
        .collect()
}

/// The first `n` records, for the raw-data preview.
pub fn preview(dataset: &Dataset, n: usize) -> &[Record] {
    let records = dataset.records();
    &records[..n.min(records.len())]
}

// ---------------------------------------------------------------------------
// Display helpers
// ---------------------------------------------------------------------------

/// `"50.00%"`, or [`NO_DATA`] when the rate is undefined.
pub fn format_percent(value: Option<f64>) -> String {
    value.map_or_else(|| NO_DATA.to_owned(), |v| format!("{v:.2}%"))
}

/// A mean with `decimals` fractional digits, or [`NO_DATA`].
pub fn format_mean(value: Option<f64>, decimals: usize) -> String {
    value.map_or_else(|| NO_DATA.to_owned(), |v| format!("{v:.decimals$}"))
}

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::model::{CategoricalField, Dataset, Record};

// ---------------------------------------------------------------------------
// Filter predicate: one optional exact-match constraint per field
// ---------------------------------------------------------------------------

/// Categorical constraints chosen by the user.
///
/// `None` means "All": the field imposes no restriction. Using `Option`
/// instead of a literal `"All"` string keeps a real category called `All`
/// selectable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterSelection {
    pub job: Option<String>,
    pub education: Option<String>,
    pub month: Option<String>,
}

impl FilterSelection {
    /// No constraints at all.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn get(&self, field: CategoricalField) -> Option<&str> {
        match field {
            CategoricalField::Job => self.job.as_deref(),
            CategoricalField::Education => self.education.as_deref(),
            CategoricalField::Month => self.month.as_deref(),
        }
    }

    pub fn set(&mut self, field: CategoricalField, value: Option<String>) {
        match field {
            CategoricalField::Job => self.job = value,
            CategoricalField::Education => self.education = value,
            CategoricalField::Month => self.month = value,
        }
    }

    /// Whether every field is unconstrained.
    pub fn is_unconstrained(&self) -> bool {
        CategoricalField::ALL.iter().all(|f| self.get(*f).is_none())
    }

    /// A record passes when every constrained field matches exactly
    /// (case-sensitive).
    pub fn matches(&self, record: &Record) -> bool {
        CategoricalField::ALL.iter().all(|&field| match self.get(field) {
            Some(wanted) => record.category(field) == wanted,
            None => true,
        })
    }
}

// ---------------------------------------------------------------------------
// FilteredView – borrowed subset of the dataset
// ---------------------------------------------------------------------------

/// The records passing a [`FilterSelection`], in dataset order.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    records: Vec<&'a Record>,
}

impl<'a> FilteredView<'a> {
    pub fn records(&self) -> &[&'a Record] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Record> + '_ {
        self.records.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Return the records of `dataset` that pass `selection`.
pub fn filter<'a>(dataset: &'a Dataset, selection: &FilterSelection) -> FilteredView<'a> {
    let records = dataset
        .records()
        .iter()
        .filter(|r| selection.matches(r))
        .collect();
    FilteredView { records }
}

// ---------------------------------------------------------------------------
// Selector vocabularies
// ---------------------------------------------------------------------------

/// Distinct observed values for each filterable field, sorted ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterChoices {
    pub jobs: Vec<String>,
    pub educations: Vec<String>,
    pub months: Vec<String>,
}

impl FilterChoices {
    pub fn from_dataset(dataset: &Dataset) -> Self {
        let distinct = |field: CategoricalField| -> Vec<String> {
            dataset
                .records()
                .iter()
                .map(|r| r.category(field))
                .collect::<BTreeSet<_>>()
                .into_iter()
                .map(str::to_owned)
                .collect()
        };

        Self {
            jobs: distinct(CategoricalField::Job),
            educations: distinct(CategoricalField::Education),
            months: distinct(CategoricalField::Month),
        }
    }

    pub fn values(&self, field: CategoricalField) -> &[String] {
        match field {
            CategoricalField::Job => &self.jobs,
            CategoricalField::Education => &self.educations,
            CategoricalField::Month => &self.months,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Outcome;

    fn record(job: &str, education: &str, month: &str) -> Record {
        Record {
            job: job.to_owned(),
            education: education.to_owned(),
            month: month.to_owned(),
            y: Outcome::No,
            ..Record::default()
        }
    }

    fn sample() -> Dataset {
        Dataset::from_records(vec![
            record("admin.", "university.degree", "may"),
            record("admin.", "high.school", "jun"),
            record("technician", "university.degree", "may"),
            record("All", "basic.4y", "may"),
        ])
    }

    #[test]
    fn unconstrained_selection_keeps_everything() {
        let ds = sample();
        let view = filter(&ds, &FilterSelection::all());
        assert_eq!(view.len(), ds.len());
        assert!(FilterSelection::all().is_unconstrained());
    }

    #[test]
    fn constraints_are_combined_with_and() {
        let ds = sample();
        let selection = FilterSelection {
            job: Some("admin.".to_owned()),
            month: Some("may".to_owned()),
            ..FilterSelection::all()
        };
        let view = filter(&ds, &selection);
        assert_eq!(view.len(), 1);
        assert!(view.iter().all(|r| selection.matches(r)));

        let excluded = ds.records().iter().filter(|r| !selection.matches(r)).count();
        assert_eq!(excluded + view.len(), ds.len());
    }

    #[test]
    fn matching_is_case_sensitive() {
        let ds = sample();
        let selection = FilterSelection {
            job: Some("Admin.".to_owned()),
            ..FilterSelection::all()
        };
        assert!(filter(&ds, &selection).is_empty());
    }

    #[test]
    fn a_category_literally_named_all_is_selectable() {
        let ds = sample();
        let selection = FilterSelection {
            job: Some("All".to_owned()),
            ..FilterSelection::all()
        };
        let view = filter(&ds, &selection);
        assert_eq!(view.len(), 1);
        assert_eq!(view.records()[0].education, "basic.4y");
    }

    #[test]
    fn set_and_get_round_trip_per_field() {
        let mut selection = FilterSelection::all();
        selection.set(CategoricalField::Education, Some("basic.4y".to_owned()));
        assert_eq!(selection.get(CategoricalField::Education), Some("basic.4y"));
        assert_eq!(selection.get(CategoricalField::Job), None);
        selection.set(CategoricalField::Education, None);
        assert!(selection.is_unconstrained());
    }

    #[test]
    fn choices_are_distinct_and_sorted() {
        let choices = FilterChoices::from_dataset(&sample());
        assert_eq!(choices.jobs, vec!["All", "admin.", "technician"]);
        assert_eq!(
            choices.educations,
            vec!["basic.4y", "high.school", "university.degree"]
        );
        assert_eq!(choices.values(CategoricalField::Month), ["jun", "may"]);
    }
}

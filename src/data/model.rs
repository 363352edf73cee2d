use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Outcome – the campaign result column `y`
// ---------------------------------------------------------------------------

/// Whether the contacted client subscribed to the term deposit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Outcome {
    Yes,
    #[default]
    No,
}

impl Outcome {
    /// Display order used by every per-outcome aggregate.
    pub const ALL: [Outcome; 2] = [Outcome::Yes, Outcome::No];

    /// Case-insensitive parse of a raw outcome cell; surrounding whitespace is ignored.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("yes") {
            Some(Outcome::Yes)
        } else if trimmed.eq_ignore_ascii_case("no") {
            Some(Outcome::No)
        } else {
            None
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Yes => "Yes",
            Outcome::No => "No",
        }
    }

    pub fn is_yes(self) -> bool {
        self == Outcome::Yes
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// CategoricalField – the columns the dashboard filters on
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CategoricalField {
    Job,
    Education,
    Month,
}

impl CategoricalField {
    pub const ALL: [CategoricalField; 3] = [
        CategoricalField::Job,
        CategoricalField::Education,
        CategoricalField::Month,
    ];

    /// Canonical column name in the source table.
    pub fn column(self) -> &'static str {
        match self {
            CategoricalField::Job => "job",
            CategoricalField::Education => "education",
            CategoricalField::Month => "month",
        }
    }
}

impl fmt::Display for CategoricalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

// ---------------------------------------------------------------------------
// Record – one campaign contact
// ---------------------------------------------------------------------------

/// A single campaign contact (one row of the source table).
///
/// Numeric fields are `None` when the source cell could not be coerced to a
/// number. Categorical fields keep the source text verbatim, so matching on
/// them is case-sensitive.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Record {
    pub age: Option<i64>,
    pub job: String,
    pub marital: String,
    pub education: String,
    pub default: String,
    pub housing: String,
    pub loan: String,
    pub contact: String,
    pub month: String,
    pub day_of_week: String,
    /// Contact length in seconds.
    pub duration: Option<i64>,
    pub campaign: Option<i64>,
    pub pdays: Option<i64>,
    pub previous: Option<i64>,
    pub poutcome: String,
    pub emp_var_rate: Option<f64>,
    pub cons_price_idx: Option<f64>,
    pub cons_conf_idx: Option<f64>,
    pub euribor3m: Option<f64>,
    pub nr_employed: Option<f64>,
    pub y: Outcome,
}

impl Record {
    pub fn category(&self, field: CategoricalField) -> &str {
        match field {
            CategoricalField::Job => &self.job,
            CategoricalField::Education => &self.education,
            CategoricalField::Month => &self.month,
        }
    }
}

// ---------------------------------------------------------------------------
// Dataset – the canonical, immutable table
// ---------------------------------------------------------------------------

/// The full normalized dataset.
///
/// Fields are private: once built, a dataset is only ever read. Share it
/// across threads behind an `Arc`.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    source: String,
    columns: Vec<String>,
    records: Vec<Record>,
}

impl Dataset {
    /// `columns` are the normalized header names in source order.
    pub fn new(source: impl Into<String>, columns: Vec<String>, records: Vec<Record>) -> Self {
        Self {
            source: source.into(),
            columns,
            records,
        }
    }

    /// Build an in-memory dataset without a backing file.
    pub fn from_records(records: Vec<Record>) -> Self {
        Self::new("<memory>", Vec::new(), records)
    }

    /// Where the dataset was loaded from.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

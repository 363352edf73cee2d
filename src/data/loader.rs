use std::io::Read;
use std::path::Path;

use arrow::array::{Array, AsArray};
use arrow::compute::cast;
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{Dataset, Outcome, Record};
use crate::error::{LoadError, Result, SchemaError};

/// Field separator of the UCI bank-marketing export.
pub const DEFAULT_DELIMITER: u8 = b';';

/// Columns the aggregation engine reads. Every other canonical column is
/// optional and defaults to an empty string or a missing value.
pub const REQUIRED_COLUMNS: [&str; 9] = [
    "age",
    "job",
    "education",
    "month",
    "duration",
    "emp.var.rate",
    "cons.conf.idx",
    "euribor3m",
    "y",
];

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a campaign dataset from a file, dispatching by extension.
///
/// Supported formats:
/// * `.csv` / `.txt` – delimited text, `;` separated
/// * `.json`         – `[{ "age": 56, "job": "housemaid", ... }, ...]`
/// * `.parquet`      – any column types Arrow can render as text
pub fn load_file(path: &Path) -> Result<Dataset> {
    load_file_with(path, DEFAULT_DELIMITER)
}

/// Same as [`load_file`] with an explicit separator for delimited text.
pub fn load_file_with(path: &Path, delimiter: u8) -> Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" | "txt" => load_delimited(path, delimiter),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => Err(LoadError::UnsupportedFormat(other.to_owned())),
    }
}

/// Parse delimited text from any reader. `source_name` only labels errors
/// and the resulting [`Dataset`].
pub fn load_reader<R: Read>(reader: R, source_name: &str, delimiter: u8) -> Result<Dataset> {
    let csv_err = |source| LoadError::Csv {
        source_name: source_name.to_owned(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .from_reader(reader);
    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_err)?
        .iter()
        .map(str::to_owned)
        .collect();

    let mut rows: Vec<Vec<String>> = Vec::new();
    for result in reader.records() {
        let record = result.map_err(csv_err)?;
        rows.push(record.iter().map(str::to_owned).collect());
    }

    build_dataset(RawTable { headers, rows }, source_name)
}

/// Lowercase a header and turn every whitespace character into `_`.
/// Dots are kept, so `emp.var.rate` stays a literal column name.
pub fn normalize_column_name(raw: &str) -> String {
    raw.trim()
        .trim_matches('\u{feff}')
        .to_lowercase()
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect()
}

// ---------------------------------------------------------------------------
// Format readers → RawTable
// ---------------------------------------------------------------------------

/// Untyped cells straight out of a reader; absent/null cells are empty strings.
struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

fn load_delimited(path: &Path, delimiter: u8) -> Result<Dataset> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_reader(file, &path.display().to_string(), delimiter)
}

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "age": 56, "job": "housemaid", "duration": 261, "y": "no", ... },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<Dataset> {
    let source_name = path.display().to_string();
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let root: JsonValue = serde_json::from_str(&text).map_err(|source| LoadError::Json {
        source_name: source_name.clone(),
        source,
    })?;
    let Some(records) = root.as_array() else {
        return Err(LoadError::Layout {
            source_name,
            message: "expected a top-level JSON array of records".to_owned(),
        });
    };

    let mut headers: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let Some(obj) = rec.as_object() else {
            return Err(LoadError::Layout {
                source_name,
                message: format!("record {i} is not a JSON object"),
            });
        };
        for key in obj.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }

    let rows = records
        .iter()
        .filter_map(JsonValue::as_object)
        .map(|obj| {
            headers
                .iter()
                .map(|h| obj.get(h).map(json_to_cell).unwrap_or_default())
                .collect()
        })
        .collect();

    build_dataset(RawTable { headers, rows }, &source_name)
}

fn json_to_cell(val: &JsonValue) -> String {
    match val {
        JsonValue::String(s) => s.clone(),
        JsonValue::Null => String::new(),
        other => other.to_string(),
    }
}

/// Every column is cast to UTF-8 and then goes through the same coercion as
/// delimited text, so a typed parquet file and its CSV export load identically.
fn load_parquet(path: &Path) -> Result<Dataset> {
    let source_name = path.display().to_string();
    let parquet_err = |source| LoadError::Parquet {
        source_name: source_name.clone(),
        source,
    };

    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file).map_err(parquet_err)?;
    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().map_err(parquet_err)?;

    let mut rows: Vec<Vec<String>> = Vec::new();
    for batch_result in reader {
        let batch = batch_result.map_err(|source| LoadError::Arrow {
            source_name: source_name.clone(),
            source,
        })?;

        let mut text_columns = Vec::with_capacity(batch.num_columns());
        for column in batch.columns() {
            let text = cast(column, &DataType::Utf8).map_err(|source| LoadError::Arrow {
                source_name: source_name.clone(),
                source,
            })?;
            text_columns.push(text);
        }

        for row in 0..batch.num_rows() {
            let cells = text_columns
                .iter()
                .map(|col| {
                    if col.is_null(row) {
                        String::new()
                    } else {
                        col.as_string::<i32>().value(row).to_owned()
                    }
                })
                .collect();
            rows.push(cells);
        }
    }

    build_dataset(RawTable { headers, rows }, &source_name)
}

// ---------------------------------------------------------------------------
// Normalization: RawTable → Dataset
// ---------------------------------------------------------------------------

/// Resolved position of each canonical column in the source header.
struct ColumnIndex {
    age: usize,
    job: usize,
    marital: Option<usize>,
    education: usize,
    default: Option<usize>,
    housing: Option<usize>,
    loan: Option<usize>,
    contact: Option<usize>,
    month: usize,
    day_of_week: Option<usize>,
    duration: usize,
    campaign: Option<usize>,
    pdays: Option<usize>,
    previous: Option<usize>,
    poutcome: Option<usize>,
    emp_var_rate: usize,
    cons_price_idx: Option<usize>,
    cons_conf_idx: usize,
    euribor3m: usize,
    nr_employed: Option<usize>,
    y: usize,
}

impl ColumnIndex {
    fn resolve(headers: &[String]) -> std::result::Result<Self, SchemaError> {
        let optional = |name: &str| headers.iter().position(|h| h == name);
        let required = |name: &str| {
            optional(name).ok_or_else(|| SchemaError::MissingColumn {
                column: name.to_owned(),
            })
        };

        Ok(Self {
            age: required("age")?,
            job: required("job")?,
            marital: optional("marital"),
            education: required("education")?,
            default: optional("default"),
            housing: optional("housing"),
            loan: optional("loan"),
            contact: optional("contact"),
            month: required("month")?,
            day_of_week: optional("day_of_week"),
            duration: required("duration")?,
            campaign: optional("campaign"),
            pdays: optional("pdays"),
            previous: optional("previous"),
            poutcome: optional("poutcome"),
            emp_var_rate: required("emp.var.rate")?,
            cons_price_idx: optional("cons.price.idx"),
            cons_conf_idx: required("cons.conf.idx")?,
            euribor3m: required("euribor3m")?,
            nr_employed: optional("nr.employed"),
            y: required("y")?,
        })
    }
}

/// Reads one raw row, tallying numeric cells that failed coercion.
struct RowReader<'a> {
    row: &'a [String],
    coerced: usize,
}

impl RowReader<'_> {
    fn cell(&self, idx: usize) -> &str {
        self.row.get(idx).map(String::as_str).unwrap_or("")
    }

    fn text(&self, idx: usize) -> String {
        self.cell(idx).to_owned()
    }

    fn opt_text(&self, idx: Option<usize>) -> String {
        idx.map(|i| self.text(i)).unwrap_or_default()
    }

    fn int(&mut self, idx: usize) -> Option<i64> {
        let value = coerce_int(self.cell(idx));
        if value.is_none() {
            self.coerced += 1;
        }
        value
    }

    fn opt_int(&mut self, idx: Option<usize>) -> Option<i64> {
        idx.and_then(|i| self.int(i))
    }

    fn float(&mut self, idx: usize) -> Option<f64> {
        let value = coerce_float(self.cell(idx));
        if value.is_none() {
            self.coerced += 1;
        }
        value
    }

    fn opt_float(&mut self, idx: Option<usize>) -> Option<f64> {
        idx.and_then(|i| self.float(i))
    }
}

fn build_dataset(table: RawTable, source_name: &str) -> Result<Dataset> {
    if table.rows.is_empty() {
        return Err(LoadError::Empty(source_name.to_owned()));
    }

    let headers: Vec<String> = table
        .headers
        .iter()
        .map(|h| normalize_column_name(h))
        .collect();
    let idx = ColumnIndex::resolve(&headers)?;

    let mut records = Vec::with_capacity(table.rows.len());
    let mut coerced = 0usize;

    for (row_no, row) in table.rows.iter().enumerate() {
        let mut r = RowReader { row, coerced: 0 };

        let raw_y = r.cell(idx.y);
        let y = Outcome::parse(raw_y).ok_or_else(|| SchemaError::UnknownOutcome {
            row: row_no + 1,
            value: raw_y.to_owned(),
        })?;

        records.push(Record {
            age: r.int(idx.age),
            job: r.text(idx.job),
            marital: r.opt_text(idx.marital),
            education: r.text(idx.education),
            default: r.opt_text(idx.default),
            housing: r.opt_text(idx.housing),
            loan: r.opt_text(idx.loan),
            contact: r.opt_text(idx.contact),
            month: r.text(idx.month),
            day_of_week: r.opt_text(idx.day_of_week),
            duration: r.int(idx.duration),
            campaign: r.opt_int(idx.campaign),
            pdays: r.opt_int(idx.pdays),
            previous: r.opt_int(idx.previous),
            poutcome: r.opt_text(idx.poutcome),
            emp_var_rate: r.float(idx.emp_var_rate),
            cons_price_idx: r.opt_float(idx.cons_price_idx),
            cons_conf_idx: r.float(idx.cons_conf_idx),
            euribor3m: r.float(idx.euribor3m),
            nr_employed: r.opt_float(idx.nr_employed),
            y,
        });
        coerced += r.coerced;
    }

    if coerced > 0 {
        log::debug!("{source_name}: {coerced} numeric cells coerced to missing");
    }
    log::info!(
        "Loaded {} records with {} columns from {source_name}",
        records.len(),
        headers.len()
    );

    Ok(Dataset::new(source_name, headers, records))
}

/// Integer cells also accept integral float text such as `41.0`.
fn coerce_int(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if let Ok(i) = trimmed.parse::<i64>() {
        return Some(i);
    }
    let f = trimmed.parse::<f64>().ok()?;
    if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

fn coerce_float(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|f| f.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "\"age\";\"job\";\"marital\";\"education\";\"default\";\"housing\";\"loan\";\"contact\";\"month\";\"day_of_week\";\"duration\";\"campaign\";\"pdays\";\"previous\";\"poutcome\";\"emp.var.rate\";\"cons.price.idx\";\"cons.conf.idx\";\"euribor3m\";\"nr.employed\";\"y\"";

    fn csv_with(rows: &[&str]) -> String {
        let mut text = HEADER.to_owned();
        for row in rows {
            text.push('\n');
            text.push_str(row);
        }
        text.push('\n');
        text
    }

    fn load(text: &str) -> Result<Dataset> {
        load_reader(text.as_bytes(), "test.csv", DEFAULT_DELIMITER)
    }

    #[test]
    fn normalizes_column_names() {
        assert_eq!(normalize_column_name("Day Of Week"), "day_of_week");
        assert_eq!(normalize_column_name("emp.var.rate"), "emp.var.rate");
        assert_eq!(normalize_column_name("\u{feff}Age"), "age");
        assert_eq!(normalize_column_name(" NR.Employed "), "nr.employed");
        assert_eq!(normalize_column_name("a\tb"), "a_b");
    }

    #[test]
    fn parses_a_full_row() {
        let text = csv_with(&[
            "56;\"housemaid\";\"married\";\"basic.4y\";\"no\";\"no\";\"no\";\"telephone\";\"may\";\"mon\";261;1;999;0;\"nonexistent\";1.1;93.994;-36.4;4.857;5191;\"no\"",
        ]);
        let ds = load(&text).expect("load");
        assert_eq!(ds.len(), 1);

        let r = &ds.records()[0];
        assert_eq!(r.age, Some(56));
        assert_eq!(r.job, "housemaid");
        assert_eq!(r.education, "basic.4y");
        assert_eq!(r.month, "may");
        assert_eq!(r.duration, Some(261));
        assert_eq!(r.pdays, Some(999));
        assert_eq!(r.emp_var_rate, Some(1.1));
        assert_eq!(r.cons_conf_idx, Some(-36.4));
        assert_eq!(r.nr_employed, Some(5191.0));
        assert_eq!(r.y, Outcome::No);
        assert_eq!(ds.columns().len(), 21);
        assert!(ds.columns().iter().any(|c| c == "emp.var.rate"));
    }

    #[test]
    fn unparseable_numbers_become_missing() {
        let text = csv_with(&[
            "41;\"admin.\";\"single\";\"university.degree\";\"no\";\"yes\";\"no\";\"cellular\";\"aug\";\"thu\";NA;2;999;0;\"nonexistent\";abc;93.2;-42;;5228.1;\"yes\"",
        ]);
        let ds = load(&text).expect("coercion failures must not abort the load");
        let r = &ds.records()[0];
        assert_eq!(r.duration, None);
        assert_eq!(r.emp_var_rate, None);
        assert_eq!(r.euribor3m, None);
        assert_eq!(r.cons_conf_idx, Some(-42.0));
        assert_eq!(r.y, Outcome::Yes);
    }

    #[test]
    fn integral_float_text_is_accepted_for_integers() {
        assert_eq!(coerce_int("41.0"), Some(41));
        assert_eq!(coerce_int(" 7 "), Some(7));
        assert_eq!(coerce_int("41.5"), None);
        assert_eq!(coerce_int("NaN"), None);
        assert_eq!(coerce_float("inf"), None);
        assert_eq!(coerce_float("-1.8"), Some(-1.8));
    }

    #[test]
    fn outcome_is_capitalized() {
        let text = csv_with(&[
            "30;\"admin.\";\"single\";\"high.school\";\"no\";\"no\";\"no\";\"cellular\";\"may\";\"mon\";100;1;999;0;\"nonexistent\";1.1;93.9;-36.4;4.8;5191;\"YES\"",
            "31;\"admin.\";\"single\";\"high.school\";\"no\";\"no\";\"no\";\"cellular\";\"may\";\"mon\";100;1;999;0;\"nonexistent\";1.1;93.9;-36.4;4.8;5191;\" no \"",
        ]);
        let ds = load(&text).expect("load");
        assert_eq!(ds.records()[0].y, Outcome::Yes);
        assert_eq!(ds.records()[1].y, Outcome::No);
    }

    #[test]
    fn unknown_outcome_is_a_schema_error() {
        let text = csv_with(&[
            "30;\"admin.\";\"single\";\"high.school\";\"no\";\"no\";\"no\";\"cellular\";\"may\";\"mon\";100;1;999;0;\"nonexistent\";1.1;93.9;-36.4;4.8;5191;\"no\"",
            "31;\"admin.\";\"single\";\"high.school\";\"no\";\"no\";\"no\";\"cellular\";\"may\";\"mon\";100;1;999;0;\"nonexistent\";1.1;93.9;-36.4;4.8;5191;\"unknown\"",
        ]);
        match load(&text) {
            Err(LoadError::Schema(SchemaError::UnknownOutcome { row, value })) => {
                assert_eq!(row, 2);
                assert_eq!(value, "unknown");
            }
            other => panic!("expected UnknownOutcome, got {other:?}"),
        }
    }

    #[test]
    fn missing_required_column_is_a_schema_error() {
        let text = "age;job;education;month;duration;emp.var.rate;cons.conf.idx;y\n30;admin.;high.school;may;100;1.1;-36.4;no\n";
        match load(text) {
            Err(LoadError::Schema(SchemaError::MissingColumn { column })) => {
                assert_eq!(column, "euribor3m");
            }
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn optional_columns_may_be_absent() {
        let text = "Age;Job;Education;Month;Duration;Emp.Var.Rate;Cons.Conf.Idx;Euribor3m;Y\n30;admin.;high.school;may;100;1.1;-36.4;4.857;no\n";
        let ds = load(text).expect("load");
        let r = &ds.records()[0];
        assert_eq!(r.marital, "");
        assert_eq!(r.campaign, None);
        assert_eq!(r.euribor3m, Some(4.857));
    }

    #[test]
    fn header_only_source_is_empty() {
        let text = csv_with(&[]);
        assert!(matches!(load(&text), Err(LoadError::Empty(_))));
    }

    #[test]
    fn loading_twice_is_identical() {
        let text = csv_with(&[
            "56;\"housemaid\";\"married\";\"basic.4y\";\"no\";\"no\";\"no\";\"telephone\";\"may\";\"mon\";261;1;999;0;\"nonexistent\";1.1;93.994;-36.4;4.857;5191;\"no\"",
            "57;\"services\";\"married\";\"high.school\";\"unknown\";\"no\";\"no\";\"telephone\";\"may\";\"mon\";NA;1;999;0;\"nonexistent\";1.1;93.994;-36.4;4.857;5191;\"yes\"",
        ]);
        let first = load(&text).expect("first load");
        let second = load(&text).expect("second load");
        assert_eq!(first, second);
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let err = load_file(Path::new("campaign.xlsx")).expect_err("xlsx is not supported");
        assert!(matches!(err, LoadError::UnsupportedFormat(ext) if ext == "xlsx"));
    }
}

//! End-to-end tests: files on disk → loader → engine.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use campaign_dashboard::{
    apply, filter, global_kpis, load_file, CategoricalField, FilterChoices, FilterSelection,
    LoadError, Outcome,
};
use parquet::arrow::ArrowWriter;
use tempfile::TempDir;

const CSV: &str = "\
age;job;marital;education;default;housing;loan;contact;month;day_of_week;duration;campaign;pdays;previous;poutcome;emp.var.rate;cons.price.idx;cons.conf.idx;euribor3m;nr.employed;y
56;housemaid;married;basic.4y;no;no;no;telephone;may;mon;261;1;999;0;nonexistent;1.1;93.994;-36.4;4.857;5191;no
57;services;married;high.school;unknown;no;no;telephone;may;mon;149;1;999;0;nonexistent;1.1;93.994;-36.4;4.857;5191;no
37;services;married;high.school;no;yes;no;telephone;may;mon;226;1;999;0;nonexistent;1.1;93.994;-36.4;4.857;5191;yes
40;admin.;married;basic.6y;no;no;no;telephone;jun;tue;NA;1;999;0;nonexistent;1.4;94.465;-41.8;4.961;5228.1;no
25;admin.;single;university.degree;no;yes;no;cellular;jun;wed;500;2;999;0;nonexistent;1.4;94.465;-41.8;4.961;5228.1;YES
61;retired;married;university.degree;no;yes;no;cellular;oct;fri;300;1;3;1;success;-3.4;92.431;-26.9;0.742;5017.5;yes
";

fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("write fixture");
    path
}

fn write_parquet(path: &Path) {
    let text = |name: &str| Field::new(name, DataType::Utf8, false);
    let int = |name: &str| Field::new(name, DataType::Int64, true);
    let float = |name: &str| Field::new(name, DataType::Float64, false);
    let schema = Arc::new(Schema::new(vec![
        int("age"),
        text("job"),
        text("education"),
        text("month"),
        int("duration"),
        float("emp.var.rate"),
        float("cons.conf.idx"),
        float("euribor3m"),
        text("y"),
    ]));
    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from(vec![56, 40])),
        Arc::new(StringArray::from(vec!["housemaid", "admin."])),
        Arc::new(StringArray::from(vec!["basic.4y", "basic.6y"])),
        Arc::new(StringArray::from(vec!["may", "jun"])),
        Arc::new(Int64Array::from(vec![Some(261), None])),
        Arc::new(Float64Array::from(vec![1.1, 1.4])),
        Arc::new(Float64Array::from(vec![-36.4, -41.8])),
        Arc::new(Float64Array::from(vec![4.857, 4.961])),
        Arc::new(StringArray::from(vec!["no", "yes"])),
    ];
    let batch = RecordBatch::try_new(schema.clone(), columns).expect("batch");

    let file = fs::File::create(path).expect("create parquet");
    let mut writer = ArrowWriter::try_new(file, schema, None).expect("writer");
    writer.write(&batch).expect("write batch");
    writer.close().expect("close writer");
}

#[test]
fn csv_file_loads_and_aggregates() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = write(&dir, "bank-additional-full.csv", CSV);

    let dataset = load_file(&path).expect("load csv");
    assert_eq!(dataset.len(), 6);

    let global = global_kpis(&dataset);
    assert_eq!(global.records, 6);
    assert_eq!(global.success_rate, Some(50.0));
    // 261 + 149 + 226 + 500 + 300 over five present durations.
    let avg = global.avg_duration.expect("durations present");
    assert!((avg - 287.2).abs() < 1e-9, "got {avg}");

    let result = apply(&dataset, &FilterSelection::all());
    assert_eq!(result.headline.records, dataset.len());
    assert_eq!(result.job_success.first().map(|j| j.job.as_str()), Some("retired"));
    for pair in result.job_success.windows(2) {
        assert!(pair[0].success_rate >= pair[1].success_rate, "not sorted descending");
    }
}

#[test]
fn na_duration_stays_in_the_view() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = write(&dir, "bank.csv", CSV);
    let dataset = load_file(&path).expect("load csv");

    let selection = FilterSelection {
        job: Some("admin.".to_owned()),
        month: Some("jun".to_owned()),
        ..FilterSelection::all()
    };
    let view = filter(&dataset, &selection);
    assert_eq!(view.len(), 2);
    assert!(view.iter().any(|r| r.duration.is_none()));

    let result = apply(&dataset, &selection);
    assert_eq!(result.headline.avg_duration, Some(500.0));
    assert_eq!(result.headline.success_rate, Some(50.0));
}

#[test]
fn every_selector_value_partitions_the_dataset() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = write(&dir, "bank.csv", CSV);
    let dataset = load_file(&path).expect("load csv");
    let choices = FilterChoices::from_dataset(&dataset);

    for field in CategoricalField::ALL {
        let mut covered = 0;
        for value in choices.values(field) {
            let mut selection = FilterSelection::all();
            selection.set(field, Some(value.clone()));
            let view = filter(&dataset, &selection);
            assert!(view.iter().all(|r| r.category(field) == value.as_str()));
            covered += view.len();

            let result = apply(&dataset, &selection);
            if let Some(rate) = result.headline.success_rate {
                assert!((0.0..=100.0).contains(&rate));
            }
            for month in &result.month_outcomes {
                assert!((month.yes_rate + month.no_rate - 100.0).abs() < 1e-9);
            }
        }
        assert_eq!(covered, dataset.len(), "{field} values must cover every record");
    }
}

#[test]
fn json_and_csv_exports_load_identically() {
    let dir = tempfile::tempdir().expect("temp dir");
    let csv_path = write(
        &dir,
        "bank.csv",
        "age;job;education;month;duration;emp.var.rate;cons.conf.idx;euribor3m;y\n\
         56;housemaid;basic.4y;may;261;1.1;-36.4;4.857;no\n\
         40;admin.;basic.6y;jun;;1.4;-41.8;4.961;yes\n",
    );
    let json_path = write(
        &dir,
        "bank.json",
        r#"[
            {"age": 56, "job": "housemaid", "education": "basic.4y", "month": "may", "duration": 261,
             "emp.var.rate": 1.1, "cons.conf.idx": -36.4, "euribor3m": 4.857, "y": "no"},
            {"age": 40, "job": "admin.", "education": "basic.6y", "month": "jun", "duration": null,
             "emp.var.rate": 1.4, "cons.conf.idx": -41.8, "euribor3m": 4.961, "y": "yes"}
        ]"#,
    );

    let from_csv = load_file(&csv_path).expect("load csv");
    let from_json = load_file(&json_path).expect("load json");
    assert_eq!(from_csv.records(), from_json.records());
    assert_eq!(from_json.records()[1].duration, None);
    assert_eq!(from_json.records()[1].y, Outcome::Yes);
}

#[test]
fn parquet_file_loads_through_the_same_normalization() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("bank.parquet");
    write_parquet(&path);

    let dataset = load_file(&path).expect("load parquet");
    assert_eq!(dataset.len(), 2);
    let first = &dataset.records()[0];
    assert_eq!(first.age, Some(56));
    assert_eq!(first.duration, Some(261));
    assert_eq!(first.emp_var_rate, Some(1.1));
    assert_eq!(first.y, Outcome::No);
    assert_eq!(dataset.records()[1].duration, None);
    assert_eq!(dataset.records()[1].y, Outcome::Yes);
}

#[test]
fn load_errors_surface_before_any_aggregation() {
    let dir = tempfile::tempdir().expect("temp dir");

    let missing = dir.path().join("absent.csv");
    assert!(matches!(load_file(&missing), Err(LoadError::Io { .. })));

    let header_only = write(
        &dir,
        "empty.csv",
        "age;job;education;month;duration;emp.var.rate;cons.conf.idx;euribor3m;y\n",
    );
    assert!(matches!(load_file(&header_only), Err(LoadError::Empty(_))));

    let not_records = write(&dir, "object.json", r#"{"age": 1}"#);
    assert!(matches!(load_file(&not_records), Err(LoadError::Layout { .. })));

    let bad_json = write(&dir, "broken.json", "[{");
    assert!(matches!(load_file(&bad_json), Err(LoadError::Json { .. })));
}

//! Writes a synthetic bank-marketing dataset in the UCI column layout, as
//! `sample_campaign.csv` (`;` separated) and `sample_campaign.parquet`.

use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, AsArray, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;
use parquet::arrow::ArrowWriter;

const ROWS: usize = 2_000;

const JOBS: [&str; 8] = [
    "admin.",
    "blue-collar",
    "entrepreneur",
    "management",
    "retired",
    "services",
    "student",
    "technician",
];
const EDUCATIONS: [&str; 5] = [
    "basic.4y",
    "basic.9y",
    "high.school",
    "professional.course",
    "university.degree",
];
const MARITAL: [&str; 3] = ["divorced", "married", "single"];
const MONTHS: [&str; 10] = [
    "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];
const DAYS: [&str; 5] = ["mon", "tue", "wed", "thu", "fri"];
const YES_NO: [&str; 2] = ["no", "yes"];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    fn pick<'a>(&mut self, options: &[&'a str]) -> &'a str {
        let idx = (self.next_f64() * options.len() as f64) as usize;
        options[idx.min(options.len() - 1)]
    }
}

/// Quarterly macro indicators, keyed by month so they correlate the way the
/// real export does.
fn macro_for(month_idx: usize) -> (f64, f64, f64, f64, f64) {
    match month_idx {
        0..=2 => (-1.8, 92.893, -46.2, 1.299, 5099.1),
        3..=5 => (1.4, 93.918, -42.7, 4.962, 5228.1),
        6..=7 => (1.1, 93.994, -36.4, 4.857, 5191.0),
        _ => (-0.1, 93.2, -42.0, 4.191, 5195.8),
    }
}

#[derive(Default)]
struct Columns {
    age: Vec<i64>,
    job: Vec<&'static str>,
    marital: Vec<&'static str>,
    education: Vec<&'static str>,
    default: Vec<&'static str>,
    housing: Vec<&'static str>,
    loan: Vec<&'static str>,
    contact: Vec<&'static str>,
    month: Vec<&'static str>,
    day_of_week: Vec<&'static str>,
    duration: Vec<i64>,
    campaign: Vec<i64>,
    pdays: Vec<i64>,
    previous: Vec<i64>,
    poutcome: Vec<&'static str>,
    emp_var_rate: Vec<f64>,
    cons_price_idx: Vec<f64>,
    cons_conf_idx: Vec<f64>,
    euribor3m: Vec<f64>,
    nr_employed: Vec<f64>,
    y: Vec<&'static str>,
}

fn generate(rng: &mut SimpleRng) -> Columns {
    let mut c = Columns::default();
    for _ in 0..ROWS {
        let job = rng.pick(&JOBS);
        let base_age = match job {
            "student" => 24.0,
            "retired" => 66.0,
            _ => 41.0,
        };
        let age = rng.gauss(base_age, 8.0).clamp(17.0, 95.0).round() as i64;
        let month_idx = (rng.next_f64() * MONTHS.len() as f64) as usize % MONTHS.len();
        let (emp, price, conf, euribor, employed) = macro_for(month_idx);
        let duration = rng.gauss(5.3, 0.8).exp().clamp(0.0, 4000.0).round() as i64;

        // Longer calls and low-rate quarters convert better.
        let mut p_yes = 0.04 + (duration as f64 / 1500.0).min(0.5);
        if emp < 0.0 {
            p_yes += 0.15;
        }
        let subscribed = rng.next_f64() < p_yes;

        c.age.push(age);
        c.job.push(job);
        c.marital.push(rng.pick(&MARITAL));
        c.education.push(rng.pick(&EDUCATIONS));
        c.default.push("no");
        c.housing.push(rng.pick(&YES_NO));
        c.loan.push(rng.pick(&YES_NO));
        c.contact.push(rng.pick(&["cellular", "telephone"]));
        c.month.push(MONTHS[month_idx]);
        c.day_of_week.push(rng.pick(&DAYS));
        c.duration.push(duration);
        c.campaign.push(1 + (rng.next_f64() * 5.0) as i64);
        c.pdays.push(999);
        c.previous.push(0);
        c.poutcome.push("nonexistent");
        c.emp_var_rate.push(emp);
        c.cons_price_idx.push(price);
        c.cons_conf_idx.push(conf);
        c.euribor3m.push(euribor + rng.gauss(0.0, 0.05));
        c.nr_employed.push(employed);
        c.y.push(if subscribed { "yes" } else { "no" });
    }
    c
}

fn to_batch(c: Columns) -> Result<RecordBatch> {
    let text = |name: &str| Field::new(name, DataType::Utf8, false);
    let int = |name: &str| Field::new(name, DataType::Int64, false);
    let float = |name: &str| Field::new(name, DataType::Float64, false);

    let schema = Arc::new(Schema::new(vec![
        int("age"),
        text("job"),
        text("marital"),
        text("education"),
        text("default"),
        text("housing"),
        text("loan"),
        text("contact"),
        text("month"),
        text("day_of_week"),
        int("duration"),
        int("campaign"),
        int("pdays"),
        int("previous"),
        text("poutcome"),
        float("emp.var.rate"),
        float("cons.price.idx"),
        float("cons.conf.idx"),
        float("euribor3m"),
        float("nr.employed"),
        text("y"),
    ]));

    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from(c.age)),
        Arc::new(StringArray::from(c.job)),
        Arc::new(StringArray::from(c.marital)),
        Arc::new(StringArray::from(c.education)),
        Arc::new(StringArray::from(c.default)),
        Arc::new(StringArray::from(c.housing)),
        Arc::new(StringArray::from(c.loan)),
        Arc::new(StringArray::from(c.contact)),
        Arc::new(StringArray::from(c.month)),
        Arc::new(StringArray::from(c.day_of_week)),
        Arc::new(Int64Array::from(c.duration)),
        Arc::new(Int64Array::from(c.campaign)),
        Arc::new(Int64Array::from(c.pdays)),
        Arc::new(Int64Array::from(c.previous)),
        Arc::new(StringArray::from(c.poutcome)),
        Arc::new(Float64Array::from(c.emp_var_rate)),
        Arc::new(Float64Array::from(c.cons_price_idx)),
        Arc::new(Float64Array::from(c.cons_conf_idx)),
        Arc::new(Float64Array::from(c.euribor3m)),
        Arc::new(Float64Array::from(c.nr_employed)),
        Arc::new(StringArray::from(c.y)),
    ];

    RecordBatch::try_new(schema, columns).context("building record batch")
}

fn write_csv(batch: &RecordBatch, path: &str) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b';')
        .from_path(path)
        .with_context(|| format!("creating {path}"))?;

    let schema = batch.schema();
    writer.write_record(schema.fields().iter().map(|f| f.name().as_str()))?;

    let text_columns = batch
        .columns()
        .iter()
        .map(|col| arrow::compute::cast(col, &DataType::Utf8))
        .collect::<Result<Vec<_>, _>>()
        .context("casting columns to text")?;
    for row in 0..batch.num_rows() {
        let cells = text_columns
            .iter()
            .map(|col| col.as_string::<i32>().value(row));
        writer.write_record(cells)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(batch: &RecordBatch, path: &str) -> Result<()> {
    let file = std::fs::File::create(path).with_context(|| format!("creating {path}"))?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None)?;
    writer.write(batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let batch = to_batch(generate(&mut rng))?;

    write_csv(&batch, "sample_campaign.csv")?;
    write_parquet(&batch, "sample_campaign.parquet")?;

    println!("{}", pretty_format_batches(&[batch.slice(0, 5)])?);
    println!(
        "Wrote {} contacts to sample_campaign.csv and sample_campaign.parquet",
        batch.num_rows()
    );
    Ok(())
}

//! Writes a quarterly CRE sample dataset to `data/sample_data.{csv,parquet}`.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

const FIRST_YEAR: i32 = 1988;
const LAST_YEAR: i32 = 2020;

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
}

/// Random walk with drift, starting at `start`.
fn random_walk(rng: &mut SimpleRng, n: usize, start: f64, drift: f64, noise: f64) -> Vec<f64> {
    let mut level = start;
    (0..n)
        .map(|_| {
            let current = level;
            level += rng.gauss(drift, noise);
            current
        })
        .collect()
}

/// Mean-reverting AR(1) around `mean`.
fn ar1(rng: &mut SimpleRng, n: usize, mean: f64, phi: f64, noise: f64) -> Vec<f64> {
    let mut x = mean;
    (0..n)
        .map(|_| {
            x = mean + phi * (x - mean) + rng.gauss(0.0, noise);
            x
        })
        .collect()
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);

    let quarters: Vec<String> = (FIRST_YEAR..=LAST_YEAR)
        .flat_map(|y| (1..=4).map(move |q| format!("{y}Q{q}")))
        .collect();
    let n = quarters.len();

    let columns: Vec<(&str, Vec<f64>)> = vec![
        ("Employment", random_walk(&mut rng, n, 1_250_000.0, 4_000.0, 9_000.0)),
        ("GDP", ar1(&mut rng, n, 2.4, 0.7, 0.8)),
        ("CRE_Growth", ar1(&mut rng, n, 1.5, 0.8, 1.2)),
        ("Rent_Index", random_walk(&mut rng, n, 100.0, 0.6, 1.1)),
        ("Vacancy", ar1(&mut rng, n, 9.0, 0.9, 0.4)),
    ];

    let out_dir = Path::new("data");
    std::fs::create_dir_all(out_dir).context("creating data directory")?;

    // ---- CSV ----
    let csv_path = out_dir.join("sample_data.csv");
    let mut writer = csv::Writer::from_path(&csv_path).context("creating CSV file")?;
    let mut header = vec!["Quarter"];
    header.extend(columns.iter().map(|(name, _)| *name));
    writer.write_record(&header)?;
    for (row, quarter) in quarters.iter().enumerate() {
        let mut record = vec![quarter.clone()];
        record.extend(columns.iter().map(|(_, values)| format!("{:.4}", values[row])));
        writer.write_record(&record)?;
    }
    writer.flush()?;

    // ---- Parquet ----
    let mut fields = vec![Field::new("Quarter", DataType::Utf8, false)];
    let mut arrays: Vec<ArrayRef> = vec![Arc::new(StringArray::from(quarters.clone()))];
    for (name, values) in &columns {
        fields.push(Field::new(*name, DataType::Float64, true));
        arrays.push(Arc::new(Float64Array::from(values.clone())));
    }
    let schema = Arc::new(Schema::new(fields));
    let batch = RecordBatch::try_new(schema.clone(), arrays).context("building record batch")?;

    let parquet_path = out_dir.join("sample_data.parquet");
    let file = std::fs::File::create(&parquet_path).context("creating Parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating Parquet writer")?;
    writer.write(&batch)?;
    writer.close()?;

    println!(
        "Wrote {n} quarters ({} variables) to {} and {}",
        columns.len(),
        csv_path.display(),
        parquet_path.display()
    );
    Ok(())
}

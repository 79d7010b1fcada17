use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use region_stats::config::DashboardConfig;
use region_stats::data::model::{
    AGE_GROUP_COLUMNS, MONTH_COLUMNS, QUARTER_COLUMNS, REGION_COLUMNS, SENTINEL_REGION,
    TOTAL_COLUMNS, WAGE_AVERAGE_COLUMN, YEAR_COLUMNS,
};
use region_stats::data::registry::DatasetKind;

const POPULATION_YEARS: std::ops::RangeInclusive<i64> = 2015..=2022;
const WAGE_YEARS: std::ops::RangeInclusive<i64> = 2017..=2023;

/// Region name and population in thousands.
const REGIONS: &[(&str, f64)] = &[
    ("Москва", 12_600.0),
    ("Санкт-Петербург", 5_400.0),
    ("Республика Татарстан", 3_900.0),
    ("Новосибирская область", 2_800.0),
    ("Республика Алтай", 220.0),
    (SENTINEL_REGION, 1.0),
];

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

    /// Multiplicative noise around 1.0.
    fn jitter(&mut self, spread: f64) -> f64 {
        1.0 + (self.next_f64() * 2.0 - 1.0) * spread
    }
}

/// Relative size of one single-year age cohort (0..=100).
fn cohort_weight(age: usize) -> f64 {
    let survival = (-((age as f64) / 78.0).powi(4)).exp();
    let baby_dip = if (20..=30).contains(&age) { 0.8 } else { 1.0 };
    survival * baby_dip
}

/// One population row per sex: (male, female) cohort counts indexed by age.
fn cohorts(rng: &mut SimpleRng, thousands: f64, year: i64) -> (Vec<f64>, Vec<f64>) {
    let weights: Vec<f64> = (0..=100).map(cohort_weight).collect();
    let norm: f64 = weights.iter().sum();
    let growth = 1.0 + (year - 2015) as f64 * 0.002;
    let total = thousands * 1000.0 * growth;

    weights
        .iter()
        .enumerate()
        .map(|(age, w)| {
            let cohort = total * w / norm * rng.jitter(0.03);
            let male_share = if age < 60 { 0.51 } else { 0.38 };
            let male = (cohort * male_share).round();
            (male, (cohort - male).round())
        })
        .unzip()
}

fn population_header() -> Vec<String> {
    let mut header = vec![
        REGION_COLUMNS[0].to_string(),
        YEAR_COLUMNS[0].to_string(),
        TOTAL_COLUMNS[0].to_string(),
    ];
    header.extend(AGE_GROUP_COLUMNS.iter().map(|c| c.to_string()));
    // Real exports carry a trailing space here; the loader trims it.
    header.push("до 1 ".to_string());
    header.extend((1..=100).map(|a: u32| a.to_string()));
    header
}

fn population_row(region: &str, year: i64, ages: &[f64]) -> Vec<String> {
    let sum = |range: std::ops::Range<usize>| -> f64 { ages[range].iter().sum() };
    let mut row = vec![
        region.to_string(),
        year.to_string(),
        sum(0..ages.len()).to_string(),
        sum(0..16).to_string(),
        sum(16..60).to_string(),
        sum(60..ages.len()).to_string(),
    ];
    row.extend(ages.iter().map(|v| v.to_string()));
    row
}

fn write_csv(path: &Path, header: &[String], rows: &[Vec<String>]) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
    writer.write_record(header)?;
    for row in rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    println!("Wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}

fn main() -> Result<()> {
    let dir = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("sample_data"));
    std::fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;
    let config = DashboardConfig::with_data_dir(&dir);

    let mut rng = SimpleRng::new(42);
    let (mut total, mut male, mut female) = (Vec::new(), Vec::new(), Vec::new());

    for &(region, thousands) in REGIONS {
        for year in POPULATION_YEARS {
            let (m, f) = cohorts(&mut rng, thousands, year);
            let both: Vec<f64> = m.iter().zip(&f).map(|(a, b)| a + b).collect();
            total.push(population_row(region, year, &both));
            male.push(population_row(region, year, &m));
            female.push(population_row(region, year, &f));
        }
    }

    let header = population_header();
    let sources = config.sources();
    write_csv(&sources[&DatasetKind::Total], &header, &total)?;
    write_csv(&sources[&DatasetKind::Male], &header, &male)?;
    write_csv(&sources[&DatasetKind::Female], &header, &female)?;

    let mut wage_header = vec![YEAR_COLUMNS[0].to_string(), WAGE_AVERAGE_COLUMN.to_string()];
    wage_header.extend(QUARTER_COLUMNS.iter().map(|c| c.to_string()));
    wage_header.extend(MONTH_COLUMNS.iter().map(|c| c.to_string()));

    let wage_rows: Vec<Vec<String>> = WAGE_YEARS
        .map(|year| {
            let base = 39_000.0 * 1.09_f64.powi((year - 2017) as i32);
            let months: Vec<f64> = (0..12)
                .map(|m| {
                    // December bonuses lift the year-end figure.
                    let season = if m == 11 { 1.45 } else { 0.95 + m as f64 * 0.01 };
                    (base * season * rng.jitter(0.02)).round()
                })
                .collect();
            let quarters: Vec<f64> = months
                .chunks(3)
                .map(|q| (q.iter().sum::<f64>() / 3.0).round())
                .collect();
            let average = (months.iter().sum::<f64>() / 12.0).round();

            let mut row = vec![year.to_string(), average.to_string()];
            row.extend(quarters.iter().map(|v| v.to_string()));
            row.extend(months.iter().map(|v| v.to_string()));
            row
        })
        .collect();
    write_csv(&sources[&DatasetKind::Wage], &wage_header, &wage_rows)?;

    Ok(())
}

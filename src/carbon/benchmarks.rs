use lazy_static::lazy_static;
use serde::Serialize;

use super::calculator::calculate;

/// Reference page used to put a scan's emissions in context.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Benchmark {
    pub label: &'static str,
    pub weight_mb: f64,
    pub co2_grams: f64,
    pub color: &'static str,
}

/// Where a given emission value sits relative to the benchmarks.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BenchmarkPosition {
    /// Share of the heaviest benchmark's emissions, capped at 100.
    pub percentage: f64,
    pub nearest: Benchmark,
}

lazy_static! {
    static ref BENCHMARKS: [Benchmark; 3] = [
        benchmark("Optimized Green Site", 0.5, "#22c55e"),
        benchmark("Average Web Page", 2.5, "#eab308"),
        benchmark("Heavy Website", 8.0, "#ef4444"),
    ];
}

fn benchmark(label: &'static str, weight_mb: f64, color: &'static str) -> Benchmark {
    Benchmark {
        label,
        weight_mb,
        co2_grams: calculate(weight_mb).co2_grams,
        color,
    }
}

/// The benchmark table, lightest first.
pub fn benchmarks() -> &'static [Benchmark] {
    BENCHMARKS.as_slice()
}

pub fn position(co2_grams: f64) -> BenchmarkPosition {
    let table = benchmarks();
    let max_co2 = table[table.len() - 1].co2_grams;
    let percentage = (co2_grams / max_co2 * 100.0).clamp(0.0, 100.0);
    let percentage = if percentage.is_nan() { 0.0 } else { percentage };

    // Strict `<` keeps the earlier entry on ties.
    let mut nearest = &table[0];
    let mut min_diff = (co2_grams - nearest.co2_grams).abs();
    for b in &table[1..] {
        let diff = (co2_grams - b.co2_grams).abs();
        if diff < min_diff {
            min_diff = diff;
            nearest = b;
        }
    }

    BenchmarkPosition {
        percentage,
        nearest: nearest.clone(),
    }
}

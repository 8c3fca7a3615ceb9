use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::error::Result;
use crate::tuner::evaluation::EvaluationResult;
use crate::tuner::knobs::{Knob, TunerKnobs};

/// Round to `decimals` places for stable output files.
fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    (value * factor).round() / factor
}

/// Write all results to a CSV file, best first.
pub fn write_csv(results: &[EvaluationResult], path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    let mut header = vec!["rank".to_string()];
    header.extend(Knob::ALL.iter().map(|k| k.label().to_string()));
    header.extend(
        [
            "avg_final_sp",
            "avg_sp_per_100kcal",
            "avg_variety_count",
            "avg_balance_ratio",
        ]
        .map(String::from),
    );
    wtr.write_record(&header)?;

    for (i, result) in results.iter().enumerate() {
        let mut row = vec![(i + 1).to_string()];
        row.extend(
            Knob::ALL
                .iter()
                .map(|k| format!("{:.3}", result.knobs.get(*k))),
        );
        row.push(format!("{:.2}", result.avg_final_sp));
        row.push(format!("{:.3}", result.avg_sp_per_100kcal));
        row.push(format!("{:.1}", result.avg_variety_count));
        row.push(format!("{:.3}", result.avg_balance_ratio));
        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    Ok(())
}

#[derive(Serialize)]
struct BestMetrics {
    avg_final_sp: f64,
    avg_sp_per_100kcal: f64,
    avg_variety_count: f64,
    avg_balance_ratio: f64,
}

#[derive(Serialize)]
struct BestBudget {
    budget: i64,
    final_sp: f64,
    total_calories: f64,
    variety_count: usize,
    balance_ratio: f64,
    bites: usize,
}

#[derive(Serialize)]
struct BestReport {
    knobs: TunerKnobs,
    metrics: BestMetrics,
    per_budget: Vec<BestBudget>,
}

/// Write the chosen result as pretty JSON with rounded floats.
pub fn write_best_json(best: &EvaluationResult, path: &Path) -> Result<()> {
    let k = &best.knobs;
    let report = BestReport {
        knobs: TunerKnobs {
            soft_variety_bias_strength: round_to(k.soft_variety_bias_strength, 3),
            tiebreak_score_window_sp: round_to(k.tiebreak_score_window_sp, 3),
            proximity_approach_weight: round_to(k.proximity_approach_weight, 3),
            proximity_overshoot_penalty: round_to(k.proximity_overshoot_penalty, 3),
            low_calorie_threshold: round_to(k.low_calorie_threshold, 1),
            low_calorie_penalty_strength: round_to(k.low_calorie_penalty_strength, 3),
        },
        metrics: BestMetrics {
            avg_final_sp: round_to(best.avg_final_sp, 2),
            avg_sp_per_100kcal: round_to(best.avg_sp_per_100kcal, 3),
            avg_variety_count: round_to(best.avg_variety_count, 1),
            avg_balance_ratio: round_to(best.avg_balance_ratio, 3),
        },
        per_budget: best
            .per_budget
            .iter()
            .map(|r| BestBudget {
                budget: r.budget,
                final_sp: round_to(r.final_sp, 2),
                total_calories: r.total_calories,
                variety_count: r.variety_count,
                balance_ratio: round_to(r.balance_ratio, 3),
                bites: r.bites,
            })
            .collect(),
    };

    fs::write(path, serde_json::to_string_pretty(&report)?)?;
    Ok(())
}

fn summary_line(result: &EvaluationResult) -> String {
    format!(
        "SP={:.2} sp/100kcal={:.3} variety={:.1} balance={:.3}",
        result.avg_final_sp,
        result.avg_sp_per_100kcal,
        result.avg_variety_count,
        result.avg_balance_ratio
    )
}

/// Print top-k results to stdout.
pub fn print_topk(results: &[EvaluationResult], k: usize) {
    println!("\n=== Top {} Results (by SP) ===\n", k.min(results.len()));

    for (i, result) in results.iter().take(k).enumerate() {
        println!("#{}: {}", i + 1, summary_line(result));
        println!("    {}", result.knobs.display());
    }
    println!();
}

/// Print the frontier by SP, marking the balanced pick.
pub fn print_pareto_frontier(
    results: &[EvaluationResult],
    pareto_indices: &[usize],
    balanced_idx: Option<usize>,
) {
    println!(
        "\n=== Pareto Frontier ({} non-dominated solutions) ===\n",
        pareto_indices.len()
    );

    let mut sorted: Vec<usize> = pareto_indices.to_vec();
    sorted.sort_by(|&a, &b| {
        results[b]
            .avg_final_sp
            .partial_cmp(&results[a].avg_final_sp)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    for (rank, &idx) in sorted.iter().enumerate() {
        let marker = if balanced_idx == Some(idx) {
            "  <- balanced"
        } else {
            ""
        };
        println!("#{}: {}{}", rank + 1, summary_line(&results[idx]), marker);
        println!("    {}", results[idx].knobs.display());
    }
    println!();
}

/// Print the chosen result against the baseline.
pub fn print_comparison(baseline: &EvaluationResult, best: &EvaluationResult) {
    let sp_change = best.avg_final_sp - baseline.avg_final_sp;
    let sp_pct = if baseline.avg_final_sp.abs() > 0.0 {
        sp_change / baseline.avg_final_sp * 100.0
    } else {
        0.0
    };

    println!("=== Balanced vs Baseline ===");
    println!("Baseline: {}", summary_line(baseline));
    println!("Balanced: {}", summary_line(best));
    println!(
        "Change:   SP {:+.2} ({:+.2}%)  variety {:+.1}  balance {:+.3}",
        sp_change,
        sp_pct,
        best.avg_variety_count - baseline.avg_variety_count,
        best.avg_balance_ratio - baseline.avg_balance_ratio
    );
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuner::evaluation::BudgetResult;
    use tempfile::tempdir;

    fn sample_result() -> EvaluationResult {
        EvaluationResult {
            knobs: TunerKnobs::default(),
            avg_final_sp: 123.4567,
            avg_sp_per_100kcal: 1.23456,
            avg_variety_count: 4.25,
            avg_balance_ratio: 0.4321,
            per_budget: vec![BudgetResult {
                budget: 5000,
                final_sp: 123.4567,
                total_calories: 4900.0,
                variety_count: 4,
                balance_ratio: 0.4321,
                bites: 12,
            }],
        }
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(1.23456, 3), 1.235);
        assert_eq!(round_to(395.04, 1), 395.0);
    }

    #[test]
    fn test_write_csv() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("results.csv");
        write_csv(&[sample_result(), sample_result()], &path).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(&headers[0], "rank");
        assert_eq!(headers.len(), 1 + Knob::ALL.len() + 4);
        assert_eq!(reader.records().count(), 2);
    }

    #[test]
    fn test_write_best_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("best.json");
        write_best_json(&sample_result(), &path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["metrics"]["avg_final_sp"], 123.46);
        assert_eq!(value["knobs"]["low_calorie_threshold"], 395.0);
        assert_eq!(value["per_budget"][0]["bites"], 12);
    }
}

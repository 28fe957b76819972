use std::process::ExitCode;

use chrono::Local;

use crate::commands::base_commands::Commands;
use crate::domain::solution::{EstimateType, Solution};
use crate::services::input_health::{
    check_backlog_guess, check_sample_age, check_sample_count, check_sample_stability,
};
use crate::services::project_yaml::load_project_from_yaml_file;

pub fn check_command(cmd: Commands) -> ExitCode {
    let Commands::Check {
        input,
        min_samples,
        max_samples,
        max_sample_age_days,
        stability_ratio,
        backlog_spread_ratio,
    } = cmd
    else {
        return ExitCode::FAILURE;
    };

    let project = match load_project_from_yaml_file(&input) {
        Ok(project) => project,
        Err(e) => {
            eprintln!("Failed to load project: {e}");
            return ExitCode::FAILURE;
        }
    };

    let as_of = Local::now().date_naive();
    let mut warnings = 0;
    for solution in &project.solutions {
        if solution.estimate_type != EstimateType::Backlog {
            continue;
        }
        for warning in solution_warnings(
            solution,
            min_samples,
            max_samples,
            max_sample_age_days,
            stability_ratio,
            backlog_spread_ratio,
            as_of,
        ) {
            println!("warning: solution {}: {warning}", solution.id);
            warnings += 1;
        }
    }

    if warnings == 0 {
        println!("All forecast inputs look healthy.");
    } else {
        println!("{warnings} warning(s). Forecasts may be unreliable.");
    }
    // Advisory only: warnings never fail the command.
    ExitCode::SUCCESS
}

fn solution_warnings(
    solution: &Solution,
    min_samples: usize,
    max_samples: usize,
    max_sample_age_days: i64,
    stability_ratio: f64,
    backlog_spread_ratio: f64,
    as_of: chrono::NaiveDate,
) -> Vec<String> {
    let mut warnings = Vec::new();
    let samples = &solution.team.throughput_samples;

    if !samples.is_empty() {
        if !check_sample_count(samples, min_samples, max_samples) {
            warnings.push(format!(
                "throughput sample count {} is outside {min_samples}..={max_samples}",
                samples.len()
            ));
        }
        if !check_sample_age(samples, max_sample_age_days, as_of) {
            warnings.push(format!(
                "most recent throughput sample is older than {max_sample_age_days} days"
            ));
        }
        if !check_sample_stability(samples, stability_ratio) {
            warnings.push("throughput samples drift more than the stability threshold".to_string());
        }
    }

    if let Some(backlog) = &solution.backlog {
        if !check_backlog_guess(backlog.low_guess, backlog.high_guess, backlog_spread_ratio) {
            warnings.push(format!(
                "backlog guess range {}..{} looks overconfident",
                backlog.low_guess, backlog.high_guess
            ));
        }
    }

    warnings
}

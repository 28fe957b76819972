use rand::seq::SliceRandom;
use rand::{Rng, RngCore};
use thiserror::Error;

use crate::domain::actuals::Actuals;
use crate::domain::solution::{Backlog, EstimateType, Solution};
use crate::domain::team::{ThroughputEstimate, ThroughputType};
use crate::services::simulation::MonteCarloModel;

/// Raised for structurally invalid scheduling requests: a solution without a
/// probabilistic model, a broken dependency reference, or a percentile that
/// was never computed for a dependency. Always fatal to the enclosing
/// project scheduling call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CannotSimulate {
    #[error("solution {0} is a work-pattern solution and cannot be simulated")]
    WorkPatternSolution(String),
    #[error("solution {0} has no backlog")]
    MissingBacklog(String),
    #[error("solution {0} has no throughput period length")]
    MissingPeriodLength(String),
    #[error("solution {0} has no throughput model")]
    NoThroughputModel(String),
    #[error("solution {0} has start type fixed_date but no start date")]
    MissingFixedStartDate(String),
    #[error("solution {0} has start type after/with but no start dependency")]
    MissingStartDependency(String),
    #[error("dependency {dependency} of solution {solution} is not scheduled")]
    UnknownDependency { solution: String, dependency: String },
    #[error("solution dependencies form a cycle")]
    CyclicDependencies,
    #[error(
        "dependency {dependency} of solution {solution} has no forecast at percentile {percentile}"
    )]
    MissingPercentile {
        solution: String,
        dependency: String,
        percentile: f64,
    },
}

/// A risk that fired in one run, with its drawn impact.
#[derive(Debug, Clone, PartialEq)]
pub struct FiredRisk {
    pub name: String,
    pub impact: i64,
}

/// Per-run draw details, captured when metadata capture is requested.
#[derive(Debug, Clone, PartialEq)]
pub struct RunDetails {
    pub total_backlog: f64,
    pub initial_backlog: i64,
    pub splits: i64,
    pub actuals_to_date: i64,
    pub risks: Vec<FiredRisk>,
    /// Effective throughput drawn in each period, in period order.
    pub periods: Vec<f64>,
}

#[derive(Debug, Clone, Default)]
struct RunState {
    initial_backlog: i64,
    splits: i64,
    total_backlog: f64,
    fired_risks: Vec<FiredRisk>,
    period_draws: Vec<f64>,
}

/// Monte Carlo model of one backlog solution's delivery time.
///
/// Each run draws a randomized backlog (size guess, split-rate growth, risk
/// impacts, minus actual completed work) and depletes it with per-period
/// throughput draws, scaled down during ramp-up.
#[derive(Debug)]
pub struct BacklogSimulation<'a> {
    solution: &'a Solution,
    backlog: &'a Backlog,
    estimate: Option<ThroughputEstimate>,
    /// Periods already elapsed according to actuals; shifts the period
    /// number seen by the ramp-up check.
    elapsed_periods: usize,
    completed_work_items: i64,
    capture_metadata: bool,
    current: RunState,
}

impl<'a> BacklogSimulation<'a> {
    /// Validates that the solution is simulatable at all. A work-pattern
    /// solution, or a backlog solution without a usable throughput model,
    /// fails here before any run starts.
    pub fn new(solution: &'a Solution, capture_metadata: bool) -> Result<Self, CannotSimulate> {
        if solution.estimate_type != EstimateType::Backlog {
            return Err(CannotSimulate::WorkPatternSolution(solution.id.clone()));
        }
        let backlog = solution
            .backlog
            .as_ref()
            .ok_or_else(|| CannotSimulate::MissingBacklog(solution.id.clone()))?;
        let period_length = solution
            .throughput_period_length
            .ok_or_else(|| CannotSimulate::MissingPeriodLength(solution.id.clone()))?;

        let estimate = match solution.team.throughput_type {
            ThroughputType::Samples => {
                if solution.team.throughput_samples.is_empty() {
                    return Err(CannotSimulate::NoThroughputModel(solution.id.clone()));
                }
                None
            }
            ThroughputType::Estimate => Some(
                solution
                    .team
                    .throughput_estimate
                    .ok_or_else(|| CannotSimulate::NoThroughputModel(solution.id.clone()))?,
            ),
            ThroughputType::None => {
                return Err(CannotSimulate::NoThroughputModel(solution.id.clone()));
            }
        };

        let progress = solution.actuals.as_ref().and_then(Actuals::progress);
        let elapsed_periods = match progress {
            Some(progress) if period_length > 0 => {
                let whole_weeks = (progress.to_date - progress.start_date).num_days().max(0) / 7;
                (whole_weeks / i64::from(period_length)) as usize
            }
            _ => 0,
        };
        let completed_work_items = progress.map(|p| p.work_items).unwrap_or(0);

        Ok(BacklogSimulation {
            solution,
            backlog,
            estimate,
            elapsed_periods,
            completed_work_items,
            capture_metadata,
            current: RunState::default(),
        })
    }
}

impl MonteCarloModel for BacklogSimulation<'_> {
    type Metadata = RunDetails;

    fn on_run_start(&mut self, _run_number: usize) {
        self.current = RunState::default();
    }

    fn initial_work_items(&mut self, rng: &mut dyn RngCore) -> f64 {
        let backlog = self.backlog;
        let initial_backlog = rng.gen_range(backlog.low_guess..=backlog.high_guess);
        let split_rate = rng.gen_range(backlog.low_split_rate..=backlog.high_split_rate);
        let splits = (initial_backlog as f64 * (split_rate - 1.0)).round() as i64;

        let mut fired_risks = Vec::new();
        let mut risk_impact = 0;
        for risk in &backlog.risks {
            if rng.gen_range(0.0..1.0) <= risk.likelihood {
                let impact = rng.gen_range(risk.low_impact..=risk.high_impact);
                risk_impact += impact;
                fired_risks.push(FiredRisk {
                    name: risk.name.clone(),
                    impact,
                });
            }
        }

        let grown = (initial_backlog + splits + risk_impact) as f64;
        let total_backlog = (grown - self.completed_work_items as f64).max(0.0);

        self.current = RunState {
            initial_backlog,
            splits,
            total_backlog,
            fired_risks,
            period_draws: Vec::new(),
        };
        total_backlog
    }

    fn throughput_for_period(&mut self, period: usize, rng: &mut dyn RngCore) -> f64 {
        let team = &self.solution.team;
        let drawn = match team.throughput_type {
            ThroughputType::Samples => team
                .throughput_samples
                .choose(rng)
                .map(|sample| sample.throughput)
                .unwrap_or(0),
            ThroughputType::Estimate | ThroughputType::None => match self.estimate {
                Some(estimate) => rng.gen_range(estimate.low_guess..=estimate.high_guess),
                None => 0,
            },
        };

        // Ramp-up is measured in real elapsed periods, so simulated periods
        // are advanced by the progress already recorded in actuals.
        let effective_period = period + self.elapsed_periods;
        let throughput = match team.ramp_up {
            Some(ramp_up) if effective_period <= ramp_up.duration as usize => {
                let scaling = rng.gen_range(ramp_up.low_scaling..=ramp_up.high_scaling);
                (drawn as f64 * scaling).round()
            }
            _ => drawn as f64,
        };

        if self.capture_metadata {
            self.current.period_draws.push(throughput);
        }
        throughput
    }

    fn run_metadata(&self) -> Option<RunDetails> {
        if !self.capture_metadata {
            return None;
        }
        Some(RunDetails {
            total_backlog: self.current.total_backlog,
            initial_backlog: self.current.initial_backlog,
            splits: self.current.splits,
            actuals_to_date: self.completed_work_items,
            risks: self.current.fired_risks.clone(),
            periods: self.current.period_draws.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::actuals::Progress;
    use crate::domain::solution::{Risk, StartType};
    use crate::domain::team::{RampUp, Team, ThroughputSample};
    use crate::services::simulation::{self, DEFAULT_OVERFLOW_LIMIT};
    use chrono::NaiveDate;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn on_date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn build_backlog_solution(low: i64, high: i64) -> Solution {
        Solution {
            id: "sol-a".to_string(),
            name: "Solution A".to_string(),
            team_id: None,
            workstream_id: None,
            estimate_type: EstimateType::Backlog,
            start_type: StartType::Immediately,
            start_date: None,
            start_dependency: None,
            throughput_period_length: Some(1),
            backlog: Some(Backlog {
                low_guess: low,
                high_guess: high,
                low_split_rate: 1.0,
                high_split_rate: 1.0,
                risks: Vec::new(),
            }),
            team: Team {
                throughput_type: ThroughputType::Estimate,
                throughput_estimate: Some(ThroughputEstimate {
                    low_guess: 1,
                    high_guess: 1,
                }),
                ..Team::new()
            },
            actuals: None,
        }
    }

    #[test]
    fn collapsed_ranges_are_deterministic() {
        let solution = build_backlog_solution(5, 5);
        let mut model = BacklogSimulation::new(&solution, false).unwrap();
        let mut rng = StdRng::seed_from_u64(42);

        let results =
            simulation::run(&mut model, 50, DEFAULT_OVERFLOW_LIMIT, &mut rng).unwrap();
        assert!(results.iter().all(|result| result.periods == 5));
    }

    #[test]
    fn split_rate_grows_the_backlog() {
        let mut solution = build_backlog_solution(10, 10);
        let backlog = solution.backlog.as_mut().unwrap();
        backlog.low_split_rate = 1.5;
        backlog.high_split_rate = 1.5;

        let mut model = BacklogSimulation::new(&solution, true).unwrap();
        let mut rng = StdRng::seed_from_u64(42);

        let results = simulation::run(&mut model, 1, DEFAULT_OVERFLOW_LIMIT, &mut rng).unwrap();
        let details = results[0].metadata.as_ref().unwrap();
        assert_eq!(details.initial_backlog, 10);
        assert_eq!(details.splits, 5);
        assert_eq!(details.total_backlog, 15.0);
        assert_eq!(results[0].periods, 15);
    }

    #[test]
    fn certain_risks_always_fire_and_are_recorded() {
        let mut solution = build_backlog_solution(3, 3);
        solution.backlog.as_mut().unwrap().risks = vec![Risk {
            name: "vendor slip".to_string(),
            likelihood: 1.0,
            low_impact: 2,
            high_impact: 2,
        }];

        let mut model = BacklogSimulation::new(&solution, true).unwrap();
        let mut rng = StdRng::seed_from_u64(42);

        let results = simulation::run(&mut model, 3, DEFAULT_OVERFLOW_LIMIT, &mut rng).unwrap();
        for result in &results {
            let details = result.metadata.as_ref().unwrap();
            assert_eq!(
                details.risks,
                vec![FiredRisk {
                    name: "vendor slip".to_string(),
                    impact: 2,
                }]
            );
            assert_eq!(details.total_backlog, 5.0);
            assert_eq!(result.periods, 5);
        }
    }

    #[test]
    fn impossible_risks_never_fire() {
        let mut solution = build_backlog_solution(3, 3);
        solution.backlog.as_mut().unwrap().risks = vec![Risk {
            name: "meteor strike".to_string(),
            likelihood: 0.0,
            low_impact: 100,
            high_impact: 100,
        }];

        let mut model = BacklogSimulation::new(&solution, true).unwrap();
        let mut rng = StdRng::seed_from_u64(42);

        let results =
            simulation::run(&mut model, 100, DEFAULT_OVERFLOW_LIMIT, &mut rng).unwrap();
        assert!(results.iter().all(|result| result.periods == 3));
    }

    #[test]
    fn actuals_reduce_the_backlog_floored_at_zero() {
        let mut solution = build_backlog_solution(3, 3);
        solution.actuals = Some(Actuals::Started(Progress {
            start_date: on_date(2017, 1, 1),
            to_date: on_date(2017, 1, 4),
            work_items: 1,
        }));

        let mut model = BacklogSimulation::new(&solution, true).unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        let results = simulation::run(&mut model, 1, DEFAULT_OVERFLOW_LIMIT, &mut rng).unwrap();
        assert_eq!(results[0].periods, 2);
        assert_eq!(results[0].metadata.as_ref().unwrap().actuals_to_date, 1);

        solution.actuals = Some(Actuals::Started(Progress {
            start_date: on_date(2017, 1, 1),
            to_date: on_date(2017, 1, 4),
            work_items: 10,
        }));
        let mut model = BacklogSimulation::new(&solution, false).unwrap();
        let results = simulation::run(&mut model, 1, DEFAULT_OVERFLOW_LIMIT, &mut rng).unwrap();
        assert_eq!(results[0].periods, 0);
    }

    #[test]
    fn ramp_up_scales_early_periods() {
        let mut solution = build_backlog_solution(4, 4);
        let team = &mut solution.team;
        team.throughput_estimate = Some(ThroughputEstimate {
            low_guess: 2,
            high_guess: 2,
        });
        team.ramp_up = Some(RampUp {
            duration: 1,
            low_scaling: 0.5,
            high_scaling: 0.5,
        });

        let mut model = BacklogSimulation::new(&solution, false).unwrap();
        let mut rng = StdRng::seed_from_u64(42);

        // Period 1 delivers round(2 * 0.5) = 1, periods 2.. deliver 2.
        let results = simulation::run(&mut model, 10, DEFAULT_OVERFLOW_LIMIT, &mut rng).unwrap();
        assert!(results.iter().all(|result| result.periods == 3));
    }

    #[test]
    fn actuals_advance_the_period_past_the_ramp_up() {
        let mut solution = build_backlog_solution(4, 4);
        let team = &mut solution.team;
        team.throughput_estimate = Some(ThroughputEstimate {
            low_guess: 2,
            high_guess: 2,
        });
        team.ramp_up = Some(RampUp {
            duration: 1,
            low_scaling: 0.5,
            high_scaling: 0.5,
        });
        // Two whole weeks of progress => one elapsed weekly period, so the
        // ramp-up window is already behind us.
        solution.throughput_period_length = Some(2);
        solution.actuals = Some(Actuals::Started(Progress {
            start_date: on_date(2017, 1, 1),
            to_date: on_date(2017, 1, 15),
            work_items: 0,
        }));

        let mut model = BacklogSimulation::new(&solution, false).unwrap();
        let mut rng = StdRng::seed_from_u64(42);

        let results = simulation::run(&mut model, 10, DEFAULT_OVERFLOW_LIMIT, &mut rng).unwrap();
        assert!(results.iter().all(|result| result.periods == 2));
    }

    #[test]
    fn samples_draw_uniformly_with_replacement() {
        let mut solution = build_backlog_solution(100, 100);
        solution.team = Team {
            throughput_type: ThroughputType::Samples,
            throughput_samples: vec![
                ThroughputSample {
                    period_start: on_date(2017, 1, 2),
                    throughput: 2,
                },
                ThroughputSample {
                    period_start: on_date(2017, 1, 9),
                    throughput: 4,
                },
            ],
            ..Team::new()
        };

        let mut model = BacklogSimulation::new(&solution, false).unwrap();
        let mut rng = StdRng::seed_from_u64(42);

        let results = simulation::run(&mut model, 20, DEFAULT_OVERFLOW_LIMIT, &mut rng).unwrap();
        // Between all-4s and all-2s draws.
        assert!(results.iter().all(|r| r.periods >= 25 && r.periods <= 50));
    }

    #[test]
    fn work_pattern_solutions_cannot_be_simulated() {
        let mut solution = build_backlog_solution(3, 3);
        solution.estimate_type = EstimateType::WorkPattern;

        let error = BacklogSimulation::new(&solution, false).unwrap_err();
        assert_eq!(
            error,
            CannotSimulate::WorkPatternSolution("sol-a".to_string())
        );
    }

    #[test]
    fn missing_throughput_model_cannot_be_simulated() {
        let mut solution = build_backlog_solution(3, 3);
        solution.team = Team::new();
        let error = BacklogSimulation::new(&solution, false).unwrap_err();
        assert_eq!(error, CannotSimulate::NoThroughputModel("sol-a".to_string()));

        solution.team.throughput_type = ThroughputType::Samples;
        let error = BacklogSimulation::new(&solution, false).unwrap_err();
        assert_eq!(error, CannotSimulate::NoThroughputModel("sol-a".to_string()));
    }

    #[test]
    fn metadata_records_the_per_period_draws() {
        let mut solution = build_backlog_solution(5, 5);
        solution.team.ramp_up = Some(RampUp {
            duration: 1,
            low_scaling: 0.5,
            high_scaling: 0.5,
        });
        solution.team.throughput_estimate = Some(ThroughputEstimate {
            low_guess: 2,
            high_guess: 2,
        });

        let mut model = BacklogSimulation::new(&solution, true).unwrap();
        let mut rng = StdRng::seed_from_u64(42);

        // Period 1 is scaled to round(2 * 0.5) = 1; the remaining 4 items
        // take two full periods of 2.
        let results = simulation::run(&mut model, 1, DEFAULT_OVERFLOW_LIMIT, &mut rng).unwrap();
        let details = results[0].metadata.as_ref().unwrap();
        assert_eq!(details.periods, vec![1.0, 2.0, 2.0]);
        assert_eq!(results[0].periods, details.periods.len());
    }

    #[test]
    fn metadata_is_suppressed_unless_requested() {
        let solution = build_backlog_solution(3, 3);
        let mut model = BacklogSimulation::new(&solution, false).unwrap();
        let mut rng = StdRng::seed_from_u64(42);

        let results = simulation::run(&mut model, 2, DEFAULT_OVERFLOW_LIMIT, &mut rng).unwrap();
        assert!(results.iter().all(|result| result.metadata.is_none()));
    }
}

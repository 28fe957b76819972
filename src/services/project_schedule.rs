use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use chrono::{Duration, NaiveDate};
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use rand::Rng;
use thiserror::Error;

use crate::domain::actuals::Actuals;
use crate::domain::project::Project;
use crate::domain::solution::{EstimateType, Solution, StartType};
use crate::services::backlog_simulation::{BacklogSimulation, CannotSimulate};
use crate::services::percentiles::quantile_sorted;
use crate::services::project_yaml::{ProjectYamlError, load_project_from_yaml_file};
use crate::services::schedule_types::{
    ForecastDate, ScheduleEntry, ScheduleOutput, ScheduleReport,
};
use crate::services::simulation::{self, DEFAULT_OVERFLOW_LIMIT, OverflowError};

#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("failed to read project yaml: {0}")]
    ReadProject(#[from] std::io::Error),
    #[error("failed to parse project yaml: {0}")]
    ParseProject(#[from] ProjectYamlError),
    #[error("runs must be greater than zero")]
    InvalidRuns,
    #[error("percentile {0} is outside (0, 1]")]
    InvalidPercentile(f64),
    #[error("project has no solutions")]
    EmptyProject,
    #[error(transparent)]
    CannotSimulate(#[from] CannotSimulate),
    #[error(transparent)]
    Overflow(#[from] OverflowError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleOptions {
    /// Monte Carlo iterations per backlog solution.
    pub runs: usize,
    /// Requested confidence percentiles, each in (0, 1].
    pub percentiles: Vec<f64>,
    /// Iteration cap for a single run.
    pub overflow_limit: usize,
    /// Days per throughput-period-length week.
    pub period_days: i64,
}

impl Default for ScheduleOptions {
    fn default() -> Self {
        ScheduleOptions {
            runs: 10_000,
            percentiles: vec![0.5, 0.85],
            overflow_limit: DEFAULT_OVERFLOW_LIMIT,
            period_days: 7,
        }
    }
}

pub fn schedule_project_from_yaml_file(
    path: &str,
    options: &ScheduleOptions,
) -> Result<ScheduleOutput, ScheduleError> {
    let project = load_project_from_yaml_file(path)?;
    let mut output = schedule_project(&project, options)?;
    output.report.data_source = data_source_name(path);
    Ok(output)
}

pub fn schedule_project(
    project: &Project,
    options: &ScheduleOptions,
) -> Result<ScheduleOutput, ScheduleError> {
    let mut rng = rand::thread_rng();
    schedule_project_with_rng(project, options, &mut rng)
}

pub fn schedule_project_with_rng<R: Rng>(
    project: &Project,
    options: &ScheduleOptions,
    rng: &mut R,
) -> Result<ScheduleOutput, ScheduleError> {
    if options.runs == 0 {
        return Err(ScheduleError::InvalidRuns);
    }
    for &percentile in &options.percentiles {
        if percentile <= 0.0 || percentile > 1.0 {
            return Err(ScheduleError::InvalidPercentile(percentile));
        }
    }
    if project.solutions.is_empty() {
        return Err(ScheduleError::EmptyProject);
    }

    let order = topological_order(project)?;

    // Lookup of already-computed entries, scoped to this call. Later
    // solutions resolve their start dates against it.
    let mut computed: HashMap<String, ScheduleEntry> = HashMap::new();
    let mut entries = Vec::with_capacity(order.len());
    for position in order {
        let solution = &project.solutions[position];
        let entry = schedule_solution(project, solution, options, &computed, rng)?;
        computed.insert(solution.id.clone(), entry.clone());
        entries.push(entry);
    }

    Ok(ScheduleOutput {
        report: ScheduleReport {
            data_source: String::new(),
            project: project.name.clone(),
            start_date: project.start_date.format("%Y-%m-%d").to_string(),
            runs: options.runs,
            percentiles: options.percentiles.clone(),
        },
        entries,
    })
}

/// Stable topological order over the `start_dependency` graph: positions in
/// the original solution list, every dependency before its dependent, ties
/// broken by original list order.
fn topological_order(project: &Project) -> Result<Vec<usize>, CannotSimulate> {
    let mut graph: DiGraph<usize, ()> = DiGraph::new();
    let mut index_by_id: HashMap<&str, NodeIndex> = HashMap::new();
    for (position, solution) in project.solutions.iter().enumerate() {
        let node = graph.add_node(position);
        index_by_id.insert(solution.id.as_str(), node);
    }

    for solution in &project.solutions {
        if let Some(dependency) = &solution.start_dependency {
            let dependency_node = *index_by_id.get(dependency.as_str()).ok_or_else(|| {
                CannotSimulate::UnknownDependency {
                    solution: solution.id.clone(),
                    dependency: dependency.clone(),
                }
            })?;
            graph.add_edge(dependency_node, index_by_id[solution.id.as_str()], ());
        }
    }

    // Kahn's algorithm with a min-heap of node indices. Nodes were added in
    // list order, so the smallest ready index is the earliest solution.
    let mut indegree = vec![0usize; graph.node_count()];
    for node in graph.node_indices() {
        indegree[node.index()] = graph.neighbors_directed(node, Direction::Incoming).count();
    }
    let mut ready: BinaryHeap<Reverse<NodeIndex>> = graph
        .node_indices()
        .filter(|node| indegree[node.index()] == 0)
        .map(Reverse)
        .collect();

    let mut order = Vec::with_capacity(graph.node_count());
    while let Some(Reverse(node)) = ready.pop() {
        order.push(graph[node]);
        for successor in graph.neighbors_directed(node, Direction::Outgoing) {
            indegree[successor.index()] -= 1;
            if indegree[successor.index()] == 0 {
                ready.push(Reverse(successor));
            }
        }
    }

    if order.len() != graph.node_count() {
        return Err(CannotSimulate::CyclicDependencies);
    }
    Ok(order)
}

fn schedule_solution<R: Rng>(
    project: &Project,
    solution: &Solution,
    options: &ScheduleOptions,
    computed: &HashMap<String, ScheduleEntry>,
    rng: &mut R,
) -> Result<ScheduleEntry, ScheduleError> {
    // Completed work needs no forecast: the recorded dates are the schedule.
    if let Some(Actuals::Completed(progress)) = &solution.actuals {
        return Ok(ScheduleEntry {
            solution_id: solution.id.clone(),
            solution_name: solution.name.clone(),
            dates: vec![ForecastDate {
                start_date: progress.start_date,
                end_date: progress.to_date,
                percentile: None,
                description: Some("Actual (completed)".to_string()),
            }],
        });
    }

    // Work-pattern windows are exact inputs, copied verbatim.
    if solution.estimate_type == EstimateType::WorkPattern {
        let dates = solution
            .team
            .work_pattern
            .iter()
            .map(|window| ForecastDate {
                start_date: window.start_date,
                end_date: window.end_date,
                percentile: None,
                description: None,
            })
            .collect();
        return Ok(ScheduleEntry {
            solution_id: solution.id.clone(),
            solution_name: solution.name.clone(),
            dates,
        });
    }

    forecast_backlog_solution(project, solution, options, computed, rng)
}

fn forecast_backlog_solution<R: Rng>(
    project: &Project,
    solution: &Solution,
    options: &ScheduleOptions,
    computed: &HashMap<String, ScheduleEntry>,
    rng: &mut R,
) -> Result<ScheduleEntry, ScheduleError> {
    let mut model = BacklogSimulation::new(solution, false)?;
    let results = simulation::run(&mut model, options.runs, options.overflow_limit, rng)?;
    let mut sorted_periods: Vec<f64> = results.iter().map(|result| result.periods as f64).collect();
    sorted_periods.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let period_length = solution
        .throughput_period_length
        .ok_or_else(|| CannotSimulate::MissingPeriodLength(solution.id.clone()))?;
    let period_length_days = i64::from(period_length) * options.period_days;

    let progress = solution.actuals.as_ref().and_then(Actuals::progress);
    let mut dates = Vec::with_capacity(options.percentiles.len());
    for &percentile in &options.percentiles {
        // Once work has started, the rule-derived start date is irrelevant:
        // the simulation continues from the day after the actuals cutoff and
        // the reported start is the real one.
        let (simulation_start, reported_start) = match progress {
            Some(progress) => (progress.to_date + Duration::days(1), progress.start_date),
            None => {
                let start = resolve_start_date(project, solution, percentile, computed)?;
                (start, start)
            }
        };

        let periods = quantile_sorted(&sorted_periods, percentile).unwrap_or(0.0);
        let offset_days = (periods * period_length_days as f64).ceil() as i64;
        let end_date = simulation_start + Duration::days(offset_days - 1);

        let description = match progress {
            Some(progress) => format!(
                "{} percentile ({} work items completed to {})",
                percentile_label(percentile),
                progress.work_items,
                progress.to_date.format("%d/%m/%Y"),
            ),
            None => format!("{} percentile", percentile_label(percentile)),
        };

        dates.push(ForecastDate {
            start_date: reported_start,
            end_date,
            percentile: Some(percentile),
            description: Some(description),
        });
    }

    Ok(ScheduleEntry {
        solution_id: solution.id.clone(),
        solution_name: solution.name.clone(),
        dates,
    })
}

fn resolve_start_date(
    project: &Project,
    solution: &Solution,
    percentile: f64,
    computed: &HashMap<String, ScheduleEntry>,
) -> Result<NaiveDate, ScheduleError> {
    match solution.start_type {
        StartType::Immediately => Ok(project.start_date),
        StartType::FixedDate => solution
            .start_date
            .ok_or_else(|| CannotSimulate::MissingFixedStartDate(solution.id.clone()).into()),
        StartType::After | StartType::With => {
            let dependency_id = solution.start_dependency.as_ref().ok_or_else(|| {
                CannotSimulate::MissingStartDependency(solution.id.clone())
            })?;
            let mode = if solution.start_type == StartType::With {
                ChainMode::With
            } else {
                ChainMode::After
            };
            chain_from_dependency(project, solution, dependency_id, percentile, computed, mode)
        }
        StartType::TeamNext => {
            match nearest_preceding_team_solution(project, solution) {
                Some(previous) => chain_from_dependency(
                    project,
                    solution,
                    &previous.id,
                    percentile,
                    computed,
                    ChainMode::After,
                ),
                None => Ok(project.start_date),
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChainMode {
    After,
    With,
}

fn chain_from_dependency(
    project: &Project,
    solution: &Solution,
    dependency_id: &str,
    percentile: f64,
    computed: &HashMap<String, ScheduleEntry>,
    mode: ChainMode,
) -> Result<NaiveDate, ScheduleError> {
    let unknown = || CannotSimulate::UnknownDependency {
        solution: solution.id.clone(),
        dependency: dependency_id.to_string(),
    };
    let entry = computed.get(dependency_id).ok_or_else(unknown)?;
    let dependency = project
        .solutions
        .iter()
        .find(|candidate| candidate.id == dependency_id)
        .ok_or_else(unknown)?;

    // Work-pattern and completed dependencies carry exact dates, so there is
    // no percentile to match against.
    let exact = dependency.estimate_type == EstimateType::WorkPattern
        || matches!(dependency.actuals, Some(Actuals::Completed(_)));
    if exact {
        let date = match mode {
            ChainMode::With => entry.dates.first().map(|date| date.start_date),
            ChainMode::After => entry
                .dates
                .last()
                .map(|date| date.end_date + Duration::days(1)),
        };
        return Ok(date.unwrap_or(project.start_date));
    }

    let date = entry
        .dates
        .iter()
        .find(|date| date.percentile == Some(percentile))
        .ok_or_else(|| CannotSimulate::MissingPercentile {
            solution: solution.id.clone(),
            dependency: dependency_id.to_string(),
            percentile,
        })?;
    Ok(match mode {
        ChainMode::With => date.start_date,
        ChainMode::After => date.end_date + Duration::days(1),
    })
}

/// The nearest solution strictly before this one in the original project
/// list with the same team id (no team matches no team).
fn nearest_preceding_team_solution<'a>(
    project: &'a Project,
    solution: &Solution,
) -> Option<&'a Solution> {
    let position = project
        .solutions
        .iter()
        .position(|candidate| candidate.id == solution.id)?;
    project.solutions[..position]
        .iter()
        .rev()
        .find(|candidate| candidate.team_id == solution.team_id)
}

fn percentile_label(percentile: f64) -> String {
    let scaled = percentile * 100.0;
    if (scaled - scaled.round()).abs() < 1e-9 {
        format!("{}th", scaled.round() as i64)
    } else {
        format!("{scaled}th")
    }
}

fn data_source_name(path: &str) -> String {
    std::path::Path::new(path)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(path)
        .to_string()
}

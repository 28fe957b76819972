use std::io;

use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;

use crate::domain::actuals::{Actuals, Progress};
use crate::domain::project::{Project, TeamRef, Workstream};
use crate::domain::solution::{Backlog, EstimateType, Risk, Solution, StartType};
use crate::domain::team::{
    RampUp, Team, TeamMember, ThroughputEstimate, ThroughputSample, ThroughputType, WorkWindow,
};

#[derive(Error, Debug)]
pub enum ProjectYamlError {
    #[error("failed to read project yaml: {0}")]
    Read(#[from] io::Error),
    #[error("failed to parse project yaml: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("missing solution id")]
    MissingSolutionId,
    #[error("duplicate solution id {0}")]
    DuplicateSolutionId(String),
    #[error("solution {solution}: {field} range has low above high")]
    InvalidRange { solution: String, field: String },
    #[error("solution {solution}: split rates must be at least 1")]
    InvalidSplitRate { solution: String },
    #[error("solution {solution}: risk {risk} likelihood is outside [0, 1]")]
    InvalidLikelihood { solution: String, risk: String },
    #[error("solution {solution}: ramp-up scaling is outside [0, 1]")]
    InvalidScaling { solution: String },
    #[error("solution {solution}: ramp-up scaling range has low above high")]
    InvalidScalingRange { solution: String },
    #[error("backlog solution {solution} has no backlog")]
    MissingBacklog { solution: String },
    #[error("backlog solution {solution} has no throughput period length")]
    MissingPeriodLength { solution: String },
    #[error("solution {solution}: throughput period length must be at least 1")]
    InvalidPeriodLength { solution: String },
    #[error("solution {solution} has start type fixed_date but no start date")]
    MissingStartDate { solution: String },
    #[error("solution {solution} has start type {start_type} but no start dependency")]
    MissingStartDependency {
        solution: String,
        start_type: String,
    },
    #[error("solution {solution}: actuals status {status} requires start_date, to_date and work_items")]
    IncompleteActuals { solution: String, status: String },
}

#[derive(Deserialize)]
struct ProjectRecord {
    id: String,
    name: String,
    start_date: NaiveDate,
    #[serde(default)]
    teams: Vec<NamedRecord>,
    #[serde(default)]
    workstreams: Vec<NamedRecord>,
    #[serde(default)]
    solutions: Vec<SolutionRecord>,
}

#[derive(Deserialize)]
struct NamedRecord {
    id: String,
    name: String,
}

#[derive(Deserialize)]
struct SolutionRecord {
    id: String,
    name: String,
    team_id: Option<String>,
    workstream_id: Option<String>,
    estimate_type: EstimateTypeRecord,
    start_type: StartTypeRecord,
    start_date: Option<NaiveDate>,
    start_dependency: Option<String>,
    throughput_period_length: Option<u32>,
    backlog: Option<BacklogRecord>,
    team: TeamRecord,
    actuals: Option<ActualsRecord>,
}

#[derive(Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
enum EstimateTypeRecord {
    Backlog,
    WorkPattern,
}

#[derive(Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
enum StartTypeRecord {
    TeamNext,
    Immediately,
    FixedDate,
    After,
    With,
}

#[derive(Deserialize)]
struct BacklogRecord {
    low_guess: i64,
    high_guess: i64,
    low_split_rate: f64,
    high_split_rate: f64,
    #[serde(default)]
    risks: Vec<RiskRecord>,
}

#[derive(Deserialize)]
struct RiskRecord {
    name: String,
    likelihood: f64,
    low_impact: i64,
    high_impact: i64,
}

#[derive(Deserialize)]
struct TeamRecord {
    #[serde(default)]
    members: Vec<TeamMemberRecord>,
    throughput_type: ThroughputTypeRecord,
    #[serde(default)]
    throughput_samples: Vec<ThroughputSampleRecord>,
    throughput_estimate: Option<ThroughputEstimateRecord>,
    ramp_up: Option<RampUpRecord>,
    #[serde(default)]
    work_pattern: Vec<WorkWindowRecord>,
}

#[derive(Deserialize)]
struct TeamMemberRecord {
    role: String,
    quantity: u32,
}

#[derive(Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
enum ThroughputTypeRecord {
    Samples,
    Estimate,
    None,
}

#[derive(Deserialize)]
struct ThroughputSampleRecord {
    period_start: NaiveDate,
    throughput: i64,
}

#[derive(Deserialize)]
struct ThroughputEstimateRecord {
    low_guess: i64,
    high_guess: i64,
}

#[derive(Deserialize)]
struct RampUpRecord {
    duration: u32,
    low_scaling: f64,
    high_scaling: f64,
}

#[derive(Deserialize)]
struct WorkWindowRecord {
    start_date: NaiveDate,
    end_date: NaiveDate,
}

#[derive(Deserialize)]
struct ActualsRecord {
    status: ActualsStatusRecord,
    start_date: Option<NaiveDate>,
    to_date: Option<NaiveDate>,
    work_items: Option<i64>,
}

#[derive(Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
enum ActualsStatusRecord {
    NotStarted,
    Started,
    Completed,
}

pub fn load_project_from_yaml_file(path: &str) -> Result<Project, ProjectYamlError> {
    let contents = std::fs::read_to_string(path)?;
    deserialize_project_from_yaml_str(&contents)
}

pub fn deserialize_project_from_yaml_str(input: &str) -> Result<Project, ProjectYamlError> {
    let record: ProjectRecord = serde_yaml::from_str(input)?;

    let mut solutions = Vec::with_capacity(record.solutions.len());
    let mut seen_ids = std::collections::HashSet::new();
    for solution_record in record.solutions {
        let solution = solution_from_record(solution_record)?;
        if !seen_ids.insert(solution.id.clone()) {
            return Err(ProjectYamlError::DuplicateSolutionId(solution.id));
        }
        solutions.push(solution);
    }

    Ok(Project {
        id: record.id,
        name: record.name,
        start_date: record.start_date,
        teams: record
            .teams
            .into_iter()
            .map(|team| TeamRef {
                id: team.id,
                name: team.name,
            })
            .collect(),
        workstreams: record
            .workstreams
            .into_iter()
            .map(|workstream| Workstream {
                id: workstream.id,
                name: workstream.name,
            })
            .collect(),
        solutions,
    })
}

fn solution_from_record(record: SolutionRecord) -> Result<Solution, ProjectYamlError> {
    if record.id.trim().is_empty() {
        return Err(ProjectYamlError::MissingSolutionId);
    }
    let id = record.id;

    let estimate_type = match record.estimate_type {
        EstimateTypeRecord::Backlog => EstimateType::Backlog,
        EstimateTypeRecord::WorkPattern => EstimateType::WorkPattern,
    };
    let start_type = match record.start_type {
        StartTypeRecord::TeamNext => StartType::TeamNext,
        StartTypeRecord::Immediately => StartType::Immediately,
        StartTypeRecord::FixedDate => StartType::FixedDate,
        StartTypeRecord::After => StartType::After,
        StartTypeRecord::With => StartType::With,
    };

    if start_type == StartType::FixedDate && record.start_date.is_none() {
        return Err(ProjectYamlError::MissingStartDate { solution: id });
    }
    if matches!(start_type, StartType::After | StartType::With)
        && record.start_dependency.is_none()
    {
        let start_type = if start_type == StartType::After {
            "after"
        } else {
            "with"
        };
        return Err(ProjectYamlError::MissingStartDependency {
            solution: id,
            start_type: start_type.to_string(),
        });
    }

    let backlog = match record.backlog {
        Some(backlog_record) => Some(backlog_from_record(backlog_record, &id)?),
        None => None,
    };
    if estimate_type == EstimateType::Backlog {
        if backlog.is_none() {
            return Err(ProjectYamlError::MissingBacklog { solution: id });
        }
        match record.throughput_period_length {
            None => return Err(ProjectYamlError::MissingPeriodLength { solution: id }),
            Some(0) => return Err(ProjectYamlError::InvalidPeriodLength { solution: id }),
            Some(_) => {}
        }
    }

    let team = team_from_record(record.team, &id)?;
    let actuals = match record.actuals {
        Some(actuals_record) => Some(actuals_from_record(actuals_record, &id)?),
        None => None,
    };

    Ok(Solution {
        id,
        name: record.name,
        team_id: record.team_id,
        workstream_id: record.workstream_id,
        estimate_type,
        start_type,
        start_date: record.start_date,
        start_dependency: record.start_dependency,
        throughput_period_length: record.throughput_period_length,
        backlog,
        team,
        actuals,
    })
}

fn backlog_from_record(record: BacklogRecord, solution: &str) -> Result<Backlog, ProjectYamlError> {
    if record.low_guess > record.high_guess {
        return Err(invalid_range(solution, "backlog guess"));
    }
    if record.low_split_rate > record.high_split_rate {
        return Err(invalid_range(solution, "split rate"));
    }
    if record.low_split_rate < 1.0 {
        return Err(ProjectYamlError::InvalidSplitRate {
            solution: solution.to_string(),
        });
    }

    let mut risks = Vec::with_capacity(record.risks.len());
    for risk in record.risks {
        if !(0.0..=1.0).contains(&risk.likelihood) {
            return Err(ProjectYamlError::InvalidLikelihood {
                solution: solution.to_string(),
                risk: risk.name,
            });
        }
        if risk.low_impact > risk.high_impact {
            return Err(invalid_range(solution, "risk impact"));
        }
        risks.push(Risk {
            name: risk.name,
            likelihood: risk.likelihood,
            low_impact: risk.low_impact,
            high_impact: risk.high_impact,
        });
    }

    Ok(Backlog {
        low_guess: record.low_guess,
        high_guess: record.high_guess,
        low_split_rate: record.low_split_rate,
        high_split_rate: record.high_split_rate,
        risks,
    })
}

fn team_from_record(record: TeamRecord, solution: &str) -> Result<Team, ProjectYamlError> {
    let throughput_estimate = match record.throughput_estimate {
        Some(estimate) => {
            if estimate.low_guess > estimate.high_guess {
                return Err(invalid_range(solution, "throughput estimate"));
            }
            Some(ThroughputEstimate {
                low_guess: estimate.low_guess,
                high_guess: estimate.high_guess,
            })
        }
        None => None,
    };

    let ramp_up = match record.ramp_up {
        Some(ramp_up) => {
            if !(0.0..=1.0).contains(&ramp_up.low_scaling)
                || !(0.0..=1.0).contains(&ramp_up.high_scaling)
            {
                return Err(ProjectYamlError::InvalidScaling {
                    solution: solution.to_string(),
                });
            }
            if ramp_up.low_scaling > ramp_up.high_scaling {
                return Err(ProjectYamlError::InvalidScalingRange {
                    solution: solution.to_string(),
                });
            }
            Some(RampUp {
                duration: ramp_up.duration,
                low_scaling: ramp_up.low_scaling,
                high_scaling: ramp_up.high_scaling,
            })
        }
        None => None,
    };

    Ok(Team {
        members: record
            .members
            .into_iter()
            .map(|member| TeamMember {
                role: member.role,
                quantity: member.quantity,
            })
            .collect(),
        throughput_type: match record.throughput_type {
            ThroughputTypeRecord::Samples => ThroughputType::Samples,
            ThroughputTypeRecord::Estimate => ThroughputType::Estimate,
            ThroughputTypeRecord::None => ThroughputType::None,
        },
        throughput_samples: record
            .throughput_samples
            .into_iter()
            .map(|sample| ThroughputSample {
                period_start: sample.period_start,
                throughput: sample.throughput,
            })
            .collect(),
        throughput_estimate,
        ramp_up,
        work_pattern: record
            .work_pattern
            .into_iter()
            .map(|window| WorkWindow {
                start_date: window.start_date,
                end_date: window.end_date,
            })
            .collect(),
    })
}

fn actuals_from_record(record: ActualsRecord, solution: &str) -> Result<Actuals, ProjectYamlError> {
    let status_name = match record.status {
        ActualsStatusRecord::NotStarted => return Ok(Actuals::NotStarted),
        ActualsStatusRecord::Started => "started",
        ActualsStatusRecord::Completed => "completed",
    };

    let progress = match (record.start_date, record.to_date, record.work_items) {
        (Some(start_date), Some(to_date), Some(work_items)) => Progress {
            start_date,
            to_date,
            work_items,
        },
        _ => {
            return Err(ProjectYamlError::IncompleteActuals {
                solution: solution.to_string(),
                status: status_name.to_string(),
            });
        }
    };

    Ok(match record.status {
        ActualsStatusRecord::Started => Actuals::Started(progress),
        _ => Actuals::Completed(progress),
    })
}

fn invalid_range(solution: &str, field: &str) -> ProjectYamlError {
    ProjectYamlError::InvalidRange {
        solution: solution.to_string(),
        field: field.to_string(),
    }
}

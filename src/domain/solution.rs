use chrono::NaiveDate;

use crate::domain::actuals::Actuals;
use crate::domain::team::Team;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EstimateType {
    /// Size-range backlog, delivered at a probabilistic throughput.
    Backlog,
    /// Exact, pre-agreed delivery windows; never simulated.
    WorkPattern,
}

/// Rule determining when work on a solution begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartType {
    /// After the nearest preceding solution of the same team.
    TeamNext,
    /// At the project start date.
    Immediately,
    /// At the solution's own configured start date.
    FixedDate,
    /// The day after the start dependency ends.
    After,
    /// On the same day the start dependency starts.
    With,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Risk {
    pub name: String,
    /// Probability in [0, 1] that the risk fires in a given run.
    pub likelihood: f64,
    pub low_impact: i64,
    pub high_impact: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Backlog {
    pub low_guess: i64,
    pub high_guess: i64,
    /// Growth factors >= 1; a rate of 1.2 means 20% of items split.
    pub low_split_rate: f64,
    pub high_split_rate: f64,
    pub risks: Vec<Risk>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    pub id: String,
    pub name: String,
    pub team_id: Option<String>,
    pub workstream_id: Option<String>,
    pub estimate_type: EstimateType,
    pub start_type: StartType,
    /// Required iff `start_type` is `FixedDate`.
    pub start_date: Option<NaiveDate>,
    /// Id of another solution in the same project; required iff `start_type`
    /// is `After` or `With`.
    pub start_dependency: Option<String>,
    /// Throughput period granularity in weeks; required for backlog solutions.
    pub throughput_period_length: Option<u32>,
    /// Required iff `estimate_type` is `Backlog`.
    pub backlog: Option<Backlog>,
    pub team: Team,
    pub actuals: Option<Actuals>,
}

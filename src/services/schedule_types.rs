use chrono::NaiveDate;
use serde::Serialize;

/// One forecast or exact delivery window for a solution. Entries without a
/// `percentile` are exact (non-simulated) windows.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ForecastDate {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentile: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ScheduleEntry {
    pub solution_id: String,
    pub solution_name: String,
    pub dates: Vec<ForecastDate>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ScheduleReport {
    pub data_source: String,
    pub project: String,
    pub start_date: String,
    pub runs: usize,
    pub percentiles: Vec<f64>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ScheduleOutput {
    pub report: ScheduleReport,
    /// Entries in topological order of the solution dependency graph.
    pub entries: Vec<ScheduleEntry>,
}

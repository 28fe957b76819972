use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThroughputType {
    /// Draw from recorded historical samples, with replacement.
    Samples,
    /// Draw a uniform integer from an estimated range.
    Estimate,
    /// No throughput model; the solution cannot be simulated.
    None,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamMember {
    pub role: String,
    pub quantity: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThroughputSample {
    pub period_start: NaiveDate,
    pub throughput: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThroughputEstimate {
    pub low_guess: i64,
    pub high_guess: i64,
}

/// Temporary throughput scaling at the start of delivery. While the period
/// number is within `duration`, drawn throughput is multiplied by a uniform
/// factor from `[low_scaling, high_scaling]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RampUp {
    pub duration: u32,
    pub low_scaling: f64,
    pub high_scaling: f64,
}

/// An exact delivery window for work-pattern solutions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkWindow {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// The delivery profile of the team working on one solution.
#[derive(Debug, Clone, PartialEq)]
pub struct Team {
    pub members: Vec<TeamMember>,
    pub throughput_type: ThroughputType,
    pub throughput_samples: Vec<ThroughputSample>,
    pub throughput_estimate: Option<ThroughputEstimate>,
    pub ramp_up: Option<RampUp>,
    pub work_pattern: Vec<WorkWindow>,
}

impl Default for Team {
    fn default() -> Self {
        Team {
            members: Vec::new(),
            throughput_type: ThroughputType::None,
            throughput_samples: Vec::new(),
            throughput_estimate: None,
            ramp_up: None,
            work_pattern: Vec::new(),
        }
    }
}

impl Team {
    pub fn new() -> Self {
        Self::default()
    }
}

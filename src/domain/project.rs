use chrono::NaiveDate;

use crate::domain::solution::Solution;

/// A named team in the project's team registry. Solutions reference it by id
/// for start-order grouping only; a dangling reference is ignored, not an
/// error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workstream {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub start_date: NaiveDate,
    pub teams: Vec<TeamRef>,
    pub workstreams: Vec<Workstream>,
    pub solutions: Vec<Solution>,
}

pub mod backlog_simulation;
pub mod input_health;
pub mod percentiles;
pub mod project_schedule;
pub mod project_yaml;
pub mod schedule_types;
pub mod simulation;

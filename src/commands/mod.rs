pub mod base_commands;
pub mod check_cmd;
pub mod report_format;
pub mod schedule_cmd;

use std::process::ExitCode;

use crate::commands::base_commands::{Commands, OutputFormat};
use crate::commands::report_format::format_schedule;
use crate::services::project_schedule::{ScheduleOptions, schedule_project_from_yaml_file};

pub fn schedule_command(cmd: Commands) -> ExitCode {
    let Commands::Schedule {
        input,
        output,
        runs,
        percentiles,
        overflow_limit,
        period_days,
        format,
    } = cmd
    else {
        return ExitCode::FAILURE;
    };

    let options = ScheduleOptions {
        runs,
        percentiles,
        overflow_limit,
        period_days,
    };
    let schedule = match schedule_project_from_yaml_file(&input, &options) {
        Ok(schedule) => schedule,
        Err(e) => {
            eprintln!("Failed to schedule project: {e}");
            return ExitCode::FAILURE;
        }
    };

    let serialized = match format {
        OutputFormat::Yaml => serde_yaml::to_string(&schedule).map_err(|e| e.to_string()),
        OutputFormat::Json => serde_json::to_string_pretty(&schedule).map_err(|e| e.to_string()),
    };
    let serialized = match serialized {
        Ok(contents) => contents,
        Err(e) => {
            eprintln!("Failed to serialize schedule: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = std::fs::write(&output, serialized) {
        eprintln!("Failed to write schedule: {e}");
        return ExitCode::FAILURE;
    }

    println!("{}", format_schedule(&schedule));
    println!();
    println!("Schedule written to {output}");
    ExitCode::SUCCESS
}

use crate::services::schedule_types::{ScheduleEntry, ScheduleOutput};

pub fn format_schedule(output: &ScheduleOutput) -> String {
    let mut lines = Vec::new();
    lines.push("Project Schedule".to_string());
    lines.push(format!("Data source: {}", output.report.data_source));
    lines.push(format!("Project: {}", output.report.project));
    lines.push(format!("Start date: {}", output.report.start_date));
    lines.push(format!("Runs: {}", output.report.runs));
    lines.push(String::new());
    lines.push("Solution | Start | End | Notes".to_string());
    lines.push("---------|-------|-----|------".to_string());
    for entry in &output.entries {
        lines.extend(format_entry_rows(entry));
    }

    lines.join("\n")
}

fn format_entry_rows(entry: &ScheduleEntry) -> Vec<String> {
    entry
        .dates
        .iter()
        .map(|date| {
            format!(
                "{name} | {start} | {end} | {notes}",
                name = entry.solution_name,
                start = date.start_date.format("%Y-%m-%d"),
                end = date.end_date.format("%Y-%m-%d"),
                notes = date.description.as_deref().unwrap_or("exact window"),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::schedule_types::{ForecastDate, ScheduleReport};
    use chrono::NaiveDate;

    fn on_date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn build_output() -> ScheduleOutput {
        ScheduleOutput {
            report: ScheduleReport {
                data_source: "project.yaml".to_string(),
                project: "Demo".to_string(),
                start_date: "2017-01-01".to_string(),
                runs: 100,
                percentiles: vec![0.5],
            },
            entries: vec![
                ScheduleEntry {
                    solution_id: "sol-a".to_string(),
                    solution_name: "Solution A".to_string(),
                    dates: vec![ForecastDate {
                        start_date: on_date(2017, 2, 1),
                        end_date: on_date(2017, 2, 21),
                        percentile: Some(0.5),
                        description: Some("50th percentile".to_string()),
                    }],
                },
                ScheduleEntry {
                    solution_id: "sol-wp".to_string(),
                    solution_name: "Windows".to_string(),
                    dates: vec![ForecastDate {
                        start_date: on_date(2017, 1, 1),
                        end_date: on_date(2017, 1, 7),
                        percentile: None,
                        description: None,
                    }],
                },
            ],
        }
    }

    #[test]
    fn format_schedule_includes_header_and_rows() {
        let output = format_schedule(&build_output());

        assert!(output.contains("Project Schedule"));
        assert!(output.contains("Data source: project.yaml"));
        assert!(output.contains("Project: Demo"));
        assert!(output.contains("Runs: 100"));
        assert!(output.contains("Solution A | 2017-02-01 | 2017-02-21 | 50th percentile"));
        assert!(output.contains("Windows | 2017-01-01 | 2017-01-07 | exact window"));
    }
}

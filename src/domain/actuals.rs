use chrono::NaiveDate;

/// Recorded real-world progress on a solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub start_date: NaiveDate,
    /// The date up to which `work_items` have been counted.
    pub to_date: NaiveDate,
    pub work_items: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actuals {
    NotStarted,
    Started(Progress),
    Completed(Progress),
}

impl Actuals {
    /// Progress data, present once work has started.
    pub fn progress(&self) -> Option<&Progress> {
        match self {
            Actuals::NotStarted => None,
            Actuals::Started(progress) | Actuals::Completed(progress) => Some(progress),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn on_date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn progress_is_absent_until_started() {
        assert_eq!(Actuals::NotStarted.progress(), None);

        let progress = Progress {
            start_date: on_date(2017, 1, 1),
            to_date: on_date(2017, 1, 4),
            work_items: 1,
        };
        assert_eq!(Actuals::Started(progress).progress(), Some(&progress));
        assert_eq!(Actuals::Completed(progress).progress(), Some(&progress));
    }
}

use std::fmt;
use std::str::FromStr;

use chrono::Datelike;
use chrono::Days;
use chrono::NaiveDate;
use chrono::Weekday;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use work_order_records::history::HistoryRecord;
use work_order_records::work_order::PlanningRecord;

/// Reporting window selected on the dashboard.
#[derive(Hash, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportingPeriod
{
    ThisWeek,
    #[default]
    ThisMonth,
    LastMonth,
    ThisYear,
    All,
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown reporting period `{0}`, expected one of this_week, this_month, last_month, this_year, all")]
pub struct ParsePeriodError(pub String);

/// The date a record is bucketed by.
pub trait DatedRecord
{
    fn period_date(&self) -> Option<NaiveDate>;
}

impl DatedRecord for PlanningRecord
{
    fn period_date(&self) -> Option<NaiveDate>
    {
        self.assigned_date()
    }
}

impl DatedRecord for HistoryRecord
{
    fn period_date(&self) -> Option<NaiveDate>
    {
        self.processed_date()
    }
}

impl ReportingPeriod
{
    pub const ALL: [ReportingPeriod; 5] = [
        ReportingPeriod::ThisWeek,
        ReportingPeriod::ThisMonth,
        ReportingPeriod::LastMonth,
        ReportingPeriod::ThisYear,
        ReportingPeriod::All,
    ];

    pub fn as_str(&self) -> &'static str
    {
        match self {
            ReportingPeriod::ThisWeek => "this_week",
            ReportingPeriod::ThisMonth => "this_month",
            ReportingPeriod::LastMonth => "last_month",
            ReportingPeriod::ThisYear => "this_year",
            ReportingPeriod::All => "all",
        }
    }

    /// Whether `date` falls in this window as seen from `today`.
    ///
    /// `None` (a missing or unreadable date) only passes [`ReportingPeriod::All`].
    /// The weekly window has no upper bound, so future dates count as this week.
    pub fn contains(&self, date: Option<NaiveDate>, today: NaiveDate, week_starts_on: Weekday) -> bool
    {
        if *self == ReportingPeriod::All {
            return true;
        }

        let Some(date) = date else {
            return false;
        };

        match self {
            ReportingPeriod::ThisWeek => date >= week_start(today, week_starts_on),
            ReportingPeriod::ThisMonth => date.month() == today.month() && date.year() == today.year(),
            ReportingPeriod::LastMonth => (date.year(), date.month()) == previous_month(today),
            ReportingPeriod::ThisYear => date.year() == today.year(),
            ReportingPeriod::All => true,
        }
    }

    pub fn filter<'a, R: DatedRecord>(&self, records: &'a [R], today: NaiveDate, week_starts_on: Weekday) -> Vec<&'a R>
    {
        records
            .iter()
            .filter(|record| self.contains(record.period_date(), today, week_starts_on))
            .collect()
    }
}

/// Most recent `week_starts_on`, `today` included.
pub fn week_start(today: NaiveDate, week_starts_on: Weekday) -> NaiveDate
{
    let offset = (7 + today.weekday().num_days_from_monday() - week_starts_on.num_days_from_monday()) % 7;
    today - Days::new(u64::from(offset))
}

/// `(year, month)` of the calendar month before `today`.
pub fn previous_month(today: NaiveDate) -> (i32, u32)
{
    match today.month() {
        1 => (today.year() - 1, 12),
        month => (today.year(), month - 1),
    }
}

impl fmt::Display for ReportingPeriod
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportingPeriod
{
    type Err = ParsePeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        ReportingPeriod::ALL
            .into_iter()
            .find(|period| period.as_str() == s.trim())
            .ok_or_else(|| ParsePeriodError(s.to_string()))
    }
}

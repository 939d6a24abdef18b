use chrono::NaiveDate;

pub mod extraction;
pub mod history;
pub mod lenient;
pub mod search;
pub mod technician;
pub mod work_order;

/// Parses the spreadsheet date convention: `day`, `month`, `year` separated
/// by `-` or `/`, never ISO order.
///
/// Components beyond the third are ignored. A component that is not an
/// integer, or a combination that is not a calendar day, yields `None`.
///
/// Out-of-range days and months are rejected, not rolled over: the web
/// dashboard's `new Date(y, m - 1, d)` reads `31-04-2024` as 1 May and
/// `00-05-2024` as 30 April, this function reads both as no date.
pub fn parse_day_month_year(raw: &str) -> Option<NaiveDate>
{
    let mut components = raw.split(['-', '/']);

    let day = parse_component(components.next()?)?;
    let month = parse_component(components.next()?)?;
    let year = parse_component(components.next()?)?;

    let day = u32::try_from(day).ok()?;
    let month = u32::try_from(month).ok()?;
    let year = i32::try_from(year).ok()?;

    NaiveDate::from_ymd_opt(year, month, day)
}

fn parse_component(component: &str) -> Option<i64>
{
    component.trim().parse::<i64>().ok()
}

use serde::Serialize;
use tracing::debug;
use work_order_records::work_order::PlanningRecord;

#[derive(Hash, Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Timeliness
{
    /// Executed on or before the due date.
    OnTime,
    Late,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeviationOutcome
{
    pub timeliness: Timeliness,
    /// Whole days between execution and due date, always non-negative.
    pub days: u64,
}

/// Drill-down row: the planning record as fetched plus its day offset.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Deviation
{
    #[serde(flatten)]
    pub record: PlanningRecord,
    pub days: u64,
}

/// Only delivered orders with a readable execution and due date take part in
/// the deviation analysis; everything else returns `None`.
pub fn classify(record: &PlanningRecord) -> Option<DeviationOutcome>
{
    if !record.is_delivered() {
        return None;
    }

    let (Some(executed_on), Some(due_on)) = (record.executed_on.as_deref(), record.due_on.as_deref()) else {
        return None;
    };

    let (Some(execution_date), Some(due_date)) = (record.execution_date(), record.due_date()) else {
        debug!(
            order_number = %record.order_number,
            executed_on,
            due_on,
            "Delivered order has an unreadable date, excluded from deviation analysis"
        );
        return None;
    };

    let days = (execution_date - due_date).num_days().unsigned_abs();
    let timeliness = if execution_date <= due_date { Timeliness::OnTime } else { Timeliness::Late };

    Some(DeviationOutcome { timeliness, days })
}

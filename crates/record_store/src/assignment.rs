use chrono::NaiveDate;
use tracing::debug;
use tracing::info;
use work_order_records::extraction::AssignmentDraft;

use crate::store::Assignment;
use crate::store::RecordStore;
use crate::store::UserAccount;
use crate::store::WriteOutcome;

/// Per-draft result of a batch assignment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AssignmentStatus
{
    /// Missing an order number or a technician, nothing was sent.
    Skipped,
    Sent,
    Failed(String),
}

/// Display names of the technician accounts, distinct and in sheet order.
/// Extracted names are matched against this list.
pub fn technician_roster(users: &[UserAccount]) -> Vec<String>
{
    let mut roster: Vec<String> = Vec::new();
    for user in users.iter().filter(|user| user.is_technician()) {
        let name = user.display_name.trim();
        if !name.is_empty() && !roster.iter().any(|known| known == name) {
            roster.push(name.to_string());
        }
    }
    roster
}

/// Sends every ready draft to the planning sheet, stamped with `today`.
///
/// Statuses line up with `drafts`. A failed write does not stop the batch.
pub fn assign_batch<S>(store: &S, drafts: &[AssignmentDraft], today: NaiveDate) -> Vec<AssignmentStatus>
where
    S: RecordStore + ?Sized,
{
    let statuses: Vec<AssignmentStatus> = drafts
        .iter()
        .map(|draft| {
            if !draft.is_ready() {
                debug!(order = %draft.order_number, technician = %draft.technician, "Draft is not ready, skipping");
                return AssignmentStatus::Skipped;
            }

            match store.assign_order(&Assignment::from_draft(draft, today)) {
                WriteOutcome::Dispatched => AssignmentStatus::Sent,
                WriteOutcome::Failed(reason) => AssignmentStatus::Failed(reason),
            }
        })
        .collect();

    let sent = statuses.iter().filter(|status| **status == AssignmentStatus::Sent).count();
    let skipped = statuses.iter().filter(|status| **status == AssignmentStatus::Skipped).count();
    info!(drafts = drafts.len(), sent, skipped, failed = drafts.len() - sent - skipped, "Assignment batch finished");

    statuses
}

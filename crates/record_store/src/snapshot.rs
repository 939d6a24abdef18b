use std::fs;
use std::path::Path;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;

use serde::de::DeserializeOwned;
use tracing::debug;
use tracing::warn;
use work_order_records::history::HistoryRecord;
use work_order_records::work_order::PlanningRecord;

use crate::store::Assignment;
use crate::store::NewUser;
use crate::store::RecordStore;
use crate::store::UserAccount;
use crate::store::WriteOutcome;

/// Record store backed by exported sheet snapshots.
///
/// Reads serve what was loaded plus everything written since; writes never
/// touch the files.
#[derive(Debug, Default)]
pub struct SnapshotStore
{
    planning: Mutex<Vec<PlanningRecord>>,
    history: Mutex<Vec<HistoryRecord>>,
    users: Mutex<Vec<UserAccount>>,
}

impl SnapshotStore
{
    pub fn new(planning: Vec<PlanningRecord>, history: Vec<HistoryRecord>) -> Self
    {
        Self {
            planning: Mutex::new(planning),
            history: Mutex::new(history),
            users: Mutex::new(Vec::new()),
        }
    }

    /// Missing or unreadable files load as empty sheets.
    pub fn from_files(planning_path: &Path, history_path: &Path) -> Self
    {
        Self::new(load_rows(planning_path), load_rows(history_path))
    }

    pub fn with_users(self, users: Vec<UserAccount>) -> Self
    {
        *lock(&self.users) = users;
        self
    }

    /// Exported users sheet. Like the other snapshots, an unreadable file is
    /// an empty sheet.
    pub fn with_users_file(self, path: &Path) -> Self
    {
        let users = load_rows(path);
        self.with_users(users)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T>
{
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn load_rows<T: DeserializeOwned>(path: &Path) -> Vec<T>
{
    let json = match fs::read_to_string(path) {
        Ok(json) => json,
        Err(error) => {
            warn!(path = %path.display(), %error, "Could not read snapshot, using an empty sheet");
            return Vec::new();
        }
    };

    match serde_json::from_str::<Vec<T>>(&json) {
        Ok(rows) => {
            debug!(path = %path.display(), rows = rows.len(), "Loaded snapshot");
            rows
        }
        Err(error) => {
            warn!(path = %path.display(), %error, "Snapshot is not a list of rows, using an empty sheet");
            Vec::new()
        }
    }
}

impl RecordStore for SnapshotStore
{
    fn fetch_planning(&self) -> Vec<PlanningRecord>
    {
        lock(&self.planning).clone()
    }

    fn fetch_history(&self) -> Vec<HistoryRecord>
    {
        lock(&self.history).clone()
    }

    fn fetch_users(&self) -> Vec<UserAccount>
    {
        lock(&self.users).clone()
    }

    fn assign_order(&self, assignment: &Assignment) -> WriteOutcome
    {
        lock(&self.planning).push(assignment.to_planning_record());
        WriteOutcome::Dispatched
    }

    fn create_user(&self, user: &NewUser) -> WriteOutcome
    {
        lock(&self.users).push(UserAccount::from(user));
        WriteOutcome::Dispatched
    }

    fn log_history(&self, record: &HistoryRecord) -> WriteOutcome
    {
        lock(&self.history).push(record.clone());
        WriteOutcome::Dispatched
    }
}

use reqwest::Url;
use reqwest::blocking::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use tracing::warn;
use work_order_records::history::HistoryRecord;
use work_order_records::work_order::PlanningRecord;

use crate::config::StoreConfig;
use crate::store::Assignment;
use crate::store::NewUser;
use crate::store::RecordStore;
use crate::store::StoreError;
use crate::store::UserAccount;
use crate::store::WriteOutcome;

/// Actions the script dispatches on. History entries are posted without one.
#[derive(Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
enum ScriptAction<'a>
{
    AssignOt(&'a Assignment),
    CreateUser(&'a NewUser),
}

/// HTTP client for the spreadsheet script.
///
/// `GET` without parameters serves the history sheet, `GET ?type=planning`
/// and `GET ?type=users` the other two, and every write is a JSON `POST` to
/// the same URL.
#[derive(Debug, Clone)]
pub struct SheetClient
{
    endpoint: Url,
    client: Client,
}

impl SheetClient
{
    pub fn new(config: &StoreConfig) -> Result<Self, StoreError>
    {
        let endpoint = Url::parse(&config.endpoint).map_err(|_| StoreError::InvalidEndpoint(config.endpoint.clone()))?;
        let client = Client::builder().timeout(config.timeout()).build()?;

        Ok(Self { endpoint, client })
    }

    pub fn endpoint(&self) -> &Url
    {
        &self.endpoint
    }

    fn fetch_rows<T: DeserializeOwned>(&self, sheet_type: Option<&str>) -> Result<Vec<T>, StoreError>
    {
        let mut request = self.client.get(self.endpoint.clone());
        if let Some(sheet_type) = sheet_type {
            request = request.query(&[("type", sheet_type)]);
        }

        let rows = request.send()?.error_for_status()?.json::<Vec<T>>()?;
        Ok(rows)
    }

    fn fetch_or_empty<T: DeserializeOwned>(&self, sheet: &str, sheet_type: Option<&str>) -> Vec<T>
    {
        match self.fetch_rows(sheet_type) {
            Ok(rows) => {
                debug!(sheet, rows = rows.len(), "Fetched sheet");
                rows
            }
            Err(error) => {
                warn!(sheet, %error, "Sheet fetch failed, using an empty snapshot");
                Vec::new()
            }
        }
    }

    fn post<B: Serialize + ?Sized>(&self, kind: &str, body: &B) -> WriteOutcome
    {
        match self.client.post(self.endpoint.clone()).json(body).send() {
            Ok(response) => {
                debug!(kind, status = %response.status(), "Write dispatched");
                WriteOutcome::Dispatched
            }
            Err(error) => {
                warn!(kind, %error, "Write could not be dispatched");
                WriteOutcome::Failed(error.to_string())
            }
        }
    }
}

impl RecordStore for SheetClient
{
    fn fetch_planning(&self) -> Vec<PlanningRecord>
    {
        self.fetch_or_empty("planning", Some("planning"))
    }

    fn fetch_history(&self) -> Vec<HistoryRecord>
    {
        self.fetch_or_empty("history", None)
    }

    fn fetch_users(&self) -> Vec<UserAccount>
    {
        self.fetch_or_empty("users", Some("users"))
    }

    fn assign_order(&self, assignment: &Assignment) -> WriteOutcome
    {
        self.post("assign_ot", &ScriptAction::AssignOt(assignment))
    }

    fn create_user(&self, user: &NewUser) -> WriteOutcome
    {
        self.post("create_user", &ScriptAction::CreateUser(user))
    }

    fn log_history(&self, record: &HistoryRecord) -> WriteOutcome
    {
        self.post("history", record)
    }
}

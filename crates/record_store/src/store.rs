use chrono::NaiveDate;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use work_order_records::extraction::AssignmentDraft;
use work_order_records::history::HistoryRecord;
use work_order_records::lenient;
use work_order_records::work_order::OrderStatus;
use work_order_records::work_order::PlanningRecord;

#[derive(Debug, Error)]
pub enum StoreError
{
    #[error("invalid store endpoint `{0}`")]
    InvalidEndpoint(String),
    #[error("store request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// What the caller can know about a write to the sheet.
///
/// The script answers every POST the same way, so a dispatched write is not
/// a confirmed one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WriteOutcome
{
    Dispatched,
    Failed(String),
}

impl WriteOutcome
{
    pub fn is_dispatched(&self) -> bool
    {
        matches!(self, WriteOutcome::Dispatched)
    }
}

/// Body of an `assign_ot` write.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Assignment
{
    #[serde(rename = "fecha_asignacion")]
    pub assigned_on: String,
    #[serde(rename = "numero_ot")]
    pub order_number: String,
    #[serde(rename = "tecnico_asignado")]
    pub technician: String,
    #[serde(rename = "nombre_equipo")]
    pub equipment_name: String,
    #[serde(rename = "codigo_activo")]
    pub asset_code: String,
}

impl Assignment
{
    /// Stamps the draft with `assigned_on` as `dd/mm/yyyy`.
    pub fn from_draft(draft: &AssignmentDraft, assigned_on: NaiveDate) -> Self
    {
        Self {
            assigned_on: assigned_on.format("%d/%m/%Y").to_string(),
            order_number: draft.order_number.trim().to_string(),
            technician: draft.technician.trim().to_string(),
            equipment_name: draft.equipment_name.clone(),
            asset_code: draft.asset_code.clone(),
        }
    }

    /// The planning row the sheet creates for this assignment.
    pub fn to_planning_record(&self) -> PlanningRecord
    {
        PlanningRecord::new(self.order_number.clone(), self.technician.clone(), OrderStatus::Pendiente, self.assigned_on.clone())
            .with_equipment(self.equipment_name.clone(), self.asset_code.clone())
    }
}

/// Body of a `create_user` write.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct NewUser
{
    #[serde(rename = "usuario")]
    pub username: String,
    pub password: String,
    #[serde(rename = "nombre")]
    pub display_name: String,
    #[serde(rename = "rol")]
    pub role: String,
}

impl std::fmt::Debug for NewUser
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {
        f.debug_struct("NewUser")
            .field("username", &self.username)
            .field("password", &"***")
            .field("display_name", &self.display_name)
            .field("role", &self.role)
            .finish()
    }
}

/// Role of the accounts that can be assigned work orders.
pub const TECHNICIAN_ROLE: &str = "tecnico";

/// A row of the users sheet. The password column is never decoded.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount
{
    #[serde(rename = "usuario", default, deserialize_with = "lenient::string")]
    pub username: String,
    #[serde(rename = "nombre", default, deserialize_with = "lenient::string")]
    pub display_name: String,
    #[serde(rename = "rol", default, deserialize_with = "lenient::string")]
    pub role: String,
}

impl UserAccount
{
    pub fn is_technician(&self) -> bool
    {
        self.role.trim().eq_ignore_ascii_case(TECHNICIAN_ROLE)
    }
}

impl From<&NewUser> for UserAccount
{
    fn from(user: &NewUser) -> Self
    {
        Self {
            username: user.username.clone(),
            display_name: user.display_name.clone(),
            role: user.role.clone(),
        }
    }
}

/// Remote record store holding the planning, history and users sheets.
///
/// Fetches never fail: a transport or decode problem yields an empty
/// sequence. Writes report whether the request left, not whether the sheet
/// accepted it.
pub trait RecordStore: Send + Sync
{
    fn fetch_planning(&self) -> Vec<PlanningRecord>;

    fn fetch_history(&self) -> Vec<HistoryRecord>;

    fn fetch_users(&self) -> Vec<UserAccount>;

    fn assign_order(&self, assignment: &Assignment) -> WriteOutcome;

    fn create_user(&self, user: &NewUser) -> WriteOutcome;

    fn log_history(&self, record: &HistoryRecord) -> WriteOutcome;
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Snapshots
{
    pub planning: Vec<PlanningRecord>,
    pub history: Vec<HistoryRecord>,
}

/// Fetches both sheets concurrently. There is no ordering between the two.
pub fn fetch_snapshots<S>(store: &S) -> Snapshots
where
    S: RecordStore + ?Sized,
{
    let (planning, history) = rayon::join(|| store.fetch_planning(), || store.fetch_history());
    Snapshots { planning, history }
}

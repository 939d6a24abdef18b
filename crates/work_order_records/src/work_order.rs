use std::fmt;

use chrono::NaiveDate;
use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;

use crate::lenient;
use crate::parse_day_month_year;

pub type OrderNumber = String;

/// Literal the planning sheet writes into rows that never got an order number.
pub const MISSING_ORDER_NUMBER: &str = "N/A";

#[derive(Hash, Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus
{
    #[default]
    Pendiente,
    Urgente,
    Entregado,
}

impl OrderStatus
{
    /// Unrecognized or missing labels fall back to [`OrderStatus::Pendiente`].
    pub fn from_label(label: &str) -> Self
    {
        match label.trim() {
            "URGENTE" => OrderStatus::Urgente,
            "ENTREGADO" => OrderStatus::Entregado,
            _ => OrderStatus::Pendiente,
        }
    }

    pub fn label(&self) -> &'static str
    {
        match self {
            OrderStatus::Pendiente => "PENDIENTE",
            OrderStatus::Urgente => "URGENTE",
            OrderStatus::Entregado => "ENTREGADO",
        }
    }

    /// Position on a technician's task board, most pressing first.
    pub fn board_rank(&self) -> u8
    {
        match self {
            OrderStatus::Urgente => 0,
            OrderStatus::Pendiente => 1,
            OrderStatus::Entregado => 2,
        }
    }
}

impl fmt::Display for OrderStatus
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.write_str(self.label())
    }
}

impl<'de> Deserialize<'de> for OrderStatus
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let label = lenient::string(deserializer)?;
        Ok(OrderStatus::from_label(&label))
    }
}

/// One assigned work order as stored in the planning sheet.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanningRecord
{
    #[serde(rename = "numero_ot", default, deserialize_with = "lenient::string")]
    pub order_number: OrderNumber,
    #[serde(rename = "tecnico_asignado", default, deserialize_with = "lenient::string")]
    pub assigned_technician: String,
    #[serde(rename = "estado", default)]
    pub status: OrderStatus,
    #[serde(rename = "fecha_asignacion", default, deserialize_with = "lenient::string")]
    pub assigned_on: String,
    #[serde(
        rename = "fecha_limite",
        default,
        deserialize_with = "lenient::optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_on: Option<String>,
    #[serde(
        rename = "fecha_ejecucion",
        default,
        deserialize_with = "lenient::optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub executed_on: Option<String>,
    #[serde(rename = "nombre_equipo", default, deserialize_with = "lenient::string")]
    pub equipment_name: String,
    #[serde(rename = "codigo_activo", default, deserialize_with = "lenient::string")]
    pub asset_code: String,
    #[serde(
        rename = "evidencia_url",
        default,
        deserialize_with = "lenient::optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub evidence_url: Option<String>,
}

impl PlanningRecord
{
    pub fn new(order_number: impl Into<OrderNumber>, assigned_technician: impl Into<String>, status: OrderStatus, assigned_on: impl Into<String>) -> Self
    {
        Self {
            order_number: order_number.into(),
            assigned_technician: assigned_technician.into(),
            status,
            assigned_on: assigned_on.into(),
            ..Default::default()
        }
    }

    pub fn with_due_on(mut self, due_on: impl Into<String>) -> Self
    {
        self.due_on = Some(due_on.into());
        self
    }

    pub fn with_executed_on(mut self, executed_on: impl Into<String>) -> Self
    {
        self.executed_on = Some(executed_on.into());
        self
    }

    pub fn with_equipment(mut self, equipment_name: impl Into<String>, asset_code: impl Into<String>) -> Self
    {
        self.equipment_name = equipment_name.into();
        self.asset_code = asset_code.into();
        self
    }

    pub fn is_delivered(&self) -> bool
    {
        self.status == OrderStatus::Entregado
    }

    pub fn assigned_date(&self) -> Option<NaiveDate>
    {
        parse_day_month_year(&self.assigned_on)
    }

    pub fn due_date(&self) -> Option<NaiveDate>
    {
        self.due_on.as_deref().and_then(parse_day_month_year)
    }

    pub fn execution_date(&self) -> Option<NaiveDate>
    {
        self.executed_on.as_deref().and_then(parse_day_month_year)
    }

    /// Rows with an empty or `N/A` order number are filler in the sheet.
    pub fn has_order_number(&self) -> bool
    {
        let order_number = self.order_number.trim();
        !order_number.is_empty() && order_number != MISSING_ORDER_NUMBER
    }
}

pub fn retain_valid_planning(records: Vec<PlanningRecord>) -> Vec<PlanningRecord>
{
    records.into_iter().filter(PlanningRecord::has_order_number).collect()
}

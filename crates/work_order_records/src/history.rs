use chrono::NaiveDate;
use serde::Deserialize;
use serde::Serialize;

use crate::extraction::ExtractedFields;
use crate::lenient;
use crate::parse_day_month_year;

pub const PREVENTIVE_MARKER: &str = "PREVENTIVA";
pub const CORRECTIVE_MARKER: &str = "CORRECTIVA";

/// Fallbacks used when an uploaded document yields nothing usable.
pub const UNNUMBERED_ORDER: &str = "S/N";
pub const DEFAULT_ORDER_TYPE: &str = "REALIZADO";
pub const DEFAULT_TECHNICIAN: &str = "Técnico";

/// One processed work order in the maintenance log.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord
{
    #[serde(rename = "fecha_procesada", default, deserialize_with = "lenient::string")]
    pub processed_on: String,
    #[serde(rename = "tipo_ot", default, deserialize_with = "lenient::string")]
    pub order_type: String,
    #[serde(rename = "numero_ot", default, deserialize_with = "lenient::string")]
    pub order_number: String,
    #[serde(rename = "nombre_equipo", default, deserialize_with = "lenient::string")]
    pub equipment_name: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub area: String,
    #[serde(rename = "grupo", default, deserialize_with = "lenient::string")]
    pub group: String,
    #[serde(rename = "subgrupo", default, deserialize_with = "lenient::string")]
    pub subgroup: String,
    #[serde(rename = "codigo_activo", default, deserialize_with = "lenient::string")]
    pub asset_code: String,
    #[serde(rename = "tecnico_responsable", default, deserialize_with = "lenient::string")]
    pub responsible_technician: String,
    #[serde(rename = "usuario_registro", default, deserialize_with = "lenient::string")]
    pub registered_by: String,
    #[serde(
        rename = "evidencia_url",
        default,
        deserialize_with = "lenient::optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub evidence_url: Option<String>,
}

/// The person logging a document into the history sheet.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Uploader
{
    pub username: String,
    pub display_name: String,
}

impl HistoryRecord
{
    pub fn new(processed_on: impl Into<String>, order_type: impl Into<String>, equipment_name: impl Into<String>) -> Self
    {
        Self {
            processed_on: processed_on.into(),
            order_type: order_type.into(),
            equipment_name: equipment_name.into(),
            ..Default::default()
        }
    }

    pub fn processed_date(&self) -> Option<NaiveDate>
    {
        parse_day_month_year(&self.processed_on)
    }

    /// Order type classification is a substring test, so a free-text type
    /// like "Mant. Correctiva urgente" still counts.
    pub fn is_preventive(&self) -> bool
    {
        self.order_type.to_uppercase().contains(PREVENTIVE_MARKER)
    }

    pub fn is_corrective(&self) -> bool
    {
        self.order_type.to_uppercase().contains(CORRECTIVE_MARKER)
    }

    /// Builds the log entry for an uploaded document.
    ///
    /// The order number falls back to `fallback_order_number` (usually what
    /// the user typed into the search box) and then to `S/N`. The processed
    /// date is stamped as `dd/mm/yyyy` so it stays readable by
    /// [`parse_day_month_year`].
    pub fn from_extraction(fields: &ExtractedFields, fallback_order_number: Option<&str>, uploader: &Uploader, processed_on: NaiveDate) -> Self
    {
        let order_number = first_non_empty(&[fields.order_number.as_str(), fallback_order_number.unwrap_or_default()]).unwrap_or(UNNUMBERED_ORDER);
        let order_type = first_non_empty(&[fields.order_type.as_str()]).unwrap_or(DEFAULT_ORDER_TYPE);
        let technician = first_non_empty(&[fields.assigned_technician.as_str(), uploader.display_name.as_str()]).unwrap_or(DEFAULT_TECHNICIAN);

        Self {
            processed_on: processed_on.format("%d/%m/%Y").to_string(),
            order_type: order_type.to_string(),
            order_number: order_number.to_string(),
            equipment_name: fields.equipment_name.clone(),
            area: fields.area.clone(),
            group: fields.group.clone(),
            subgroup: fields.subgroup.clone(),
            asset_code: fields.asset_code.clone(),
            responsible_technician: technician.to_string(),
            registered_by: uploader.username.clone(),
            evidence_url: None,
        }
    }
}

fn first_non_empty<'a>(candidates: &[&'a str]) -> Option<&'a str>
{
    candidates.iter().copied().find(|candidate| !candidate.is_empty())
}

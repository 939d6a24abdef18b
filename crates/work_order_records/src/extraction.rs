use serde::Deserialize;
use serde::Serialize;
use tracing::warn;

use crate::lenient;
use crate::technician::match_roster;
use crate::technician::title_case;

/// Best-effort field guess returned by the document-understanding model.
///
/// Every field is optional on the wire and empty here when missing.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedFields
{
    #[serde(rename = "numero_ot", default, deserialize_with = "lenient::string")]
    pub order_number: String,
    #[serde(rename = "tipo_ot", default, deserialize_with = "lenient::string")]
    pub order_type: String,
    #[serde(rename = "nombre_equipo", default, deserialize_with = "lenient::string")]
    pub equipment_name: String,
    #[serde(rename = "codigo_activo", default, deserialize_with = "lenient::string")]
    pub asset_code: String,
    #[serde(rename = "tecnico_asignado", default, deserialize_with = "lenient::string")]
    pub assigned_technician: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub area: String,
    #[serde(rename = "grupo", default, deserialize_with = "lenient::string")]
    pub group: String,
    #[serde(rename = "subgrupo", default, deserialize_with = "lenient::string")]
    pub subgroup: String,
}

impl ExtractedFields
{
    /// Decodes the model's JSON answer. Anything that is not a JSON object
    /// degrades to an all-empty guess.
    pub fn from_response_text(text: &str) -> Self
    {
        let text = text.trim();
        if text.is_empty() {
            return Self::default();
        }

        match serde_json::from_str(text) {
            Ok(fields) => fields,
            Err(error) => {
                warn!(%error, "Extraction response is not a field object, using empty fields");
                Self::default()
            }
        }
    }

    pub fn is_empty(&self) -> bool
    {
        *self == Self::default()
    }
}

/// A pending assignment built from an uploaded order, editable before it is
/// sent to the planning sheet.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct AssignmentDraft
{
    #[serde(rename = "numero_ot")]
    pub order_number: String,
    #[serde(rename = "tecnico_asignado")]
    pub technician: String,
    #[serde(rename = "nombre_equipo")]
    pub equipment_name: String,
    #[serde(rename = "codigo_activo")]
    pub asset_code: String,
}

impl AssignmentDraft
{
    pub fn from_extraction(fields: &ExtractedFields) -> Self
    {
        Self {
            order_number: fields.order_number.clone(),
            technician: title_case(&fields.assigned_technician),
            equipment_name: fields.equipment_name.clone(),
            asset_code: fields.asset_code.clone(),
        }
    }

    /// Replaces the technician with the roster entry it overlaps, or clears it
    /// when nobody on the roster matches.
    pub fn matched_against(mut self, roster: &[String]) -> Self
    {
        self.technician = match_roster(&self.technician, roster).map(str::to_string).unwrap_or_default();
        self
    }

    pub fn is_ready(&self) -> bool
    {
        !self.order_number.trim().is_empty() && !self.technician.trim().is_empty()
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_from_response_text()
    {
        let fields = ExtractedFields::from_response_text(r#"{"numero_ot": "P00057775", "tipo_ot": "CORRECTIVA", "area": null, "grupo": 7}"#);

        assert_eq!(fields.order_number, "P00057775");
        assert_eq!(fields.order_type, "CORRECTIVA");
        assert_eq!(fields.area, "");
        assert_eq!(fields.group, "7");
    }

    #[test]
    fn test_from_response_text_degrades()
    {
        assert!(ExtractedFields::from_response_text("").is_empty());
        assert!(ExtractedFields::from_response_text("{}").is_empty());
        assert!(ExtractedFields::from_response_text("I could not read the document").is_empty());
        assert!(ExtractedFields::from_response_text("\"P0001\"").is_empty());
    }

    #[test]
    fn test_assignment_draft_title_cases_technician()
    {
        let fields = ExtractedFields {
            order_number: "P1".to_string(),
            assigned_technician: "JUAN perez".to_string(),
            equipment_name: "Bomba".to_string(),
            ..Default::default()
        };

        let draft = AssignmentDraft::from_extraction(&fields);

        assert_eq!(draft.technician, "Juan Perez");
        assert_eq!(draft.equipment_name, "Bomba");
        assert!(draft.is_ready());
    }

    #[test]
    fn test_assignment_draft_matched_against_roster()
    {
        let roster = vec!["Juan Perez Soto".to_string(), "Ana Diaz".to_string()];
        let fields = ExtractedFields {
            order_number: "P1".to_string(),
            assigned_technician: "juan perez".to_string(),
            ..Default::default()
        };

        let draft = AssignmentDraft::from_extraction(&fields).matched_against(&roster);
        assert_eq!(draft.technician, "Juan Perez Soto");

        let fields = ExtractedFields {
            order_number: "P1".to_string(),
            assigned_technician: "Pedro".to_string(),
            ..Default::default()
        };
        let draft = AssignmentDraft::from_extraction(&fields).matched_against(&roster);
        assert_eq!(draft.technician, "");
        assert!(!draft.is_ready());
    }
}

//! Decoding helpers for rows served by the spreadsheet endpoint.
//!
//! Spreadsheet cells arrive as whatever JSON type the sheet inferred, so a
//! column that is text for one row can be a number for the next.

use serde::Deserialize;
use serde::Deserializer;
use serde_json::Number;
use serde_json::Value;

/// Accepts a string, number, boolean or null and renders it as text.
pub fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.map(render).unwrap_or_default())
}

/// Same as [`string`], but an empty cell becomes `None`.
pub fn optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let text = string(deserializer)?;
    Ok(if text.is_empty() { None } else { Some(text) })
}

pub fn render(value: Value) -> String
{
    match value {
        Value::Null => String::new(),
        Value::String(text) => text,
        Value::Number(number) => render_number(&number),
        Value::Bool(flag) => flag.to_string(),
        other => other.to_string(),
    }
}

fn render_number(number: &Number) -> String
{
    if number.is_i64() || number.is_u64() {
        return number.to_string();
    }

    match number.as_f64() {
        // Sheets hands back integral ids such as 57775.0
        Some(float) if float.is_finite() && float.fract() == 0.0 && float.abs() < 1e15 => format!("{}", float as i64),
        _ => number.to_string(),
    }
}

#[cfg(test)]
mod tests
{
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Deserialize, Debug)]
    struct Row
    {
        #[serde(default, deserialize_with = "super::string")]
        text: String,
        #[serde(default, deserialize_with = "super::optional_string")]
        maybe: Option<String>,
    }

    #[test]
    fn test_lenient_string_accepts_sheet_types()
    {
        let row: Row = serde_json::from_value(json!({ "text": 57775, "maybe": "x" })).unwrap();
        assert_eq!(row.text, "57775");
        assert_eq!(row.maybe.as_deref(), Some("x"));

        let row: Row = serde_json::from_value(json!({ "text": 57775.0, "maybe": "" })).unwrap();
        assert_eq!(row.text, "57775");
        assert_eq!(row.maybe, None);

        let row: Row = serde_json::from_value(json!({ "text": 1.5, "maybe": null })).unwrap();
        assert_eq!(row.text, "1.5");
        assert_eq!(row.maybe, None);

        let row: Row = serde_json::from_value(json!({ "text": true })).unwrap();
        assert_eq!(row.text, "true");
    }

    #[test]
    fn test_lenient_string_missing_fields_default()
    {
        let row: Row = serde_json::from_value(json!({})).unwrap();
        assert_eq!(row.text, "");
        assert_eq!(row.maybe, None);
    }
}

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::Url;
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::Value;
use serde_json::json;
use tracing::debug;
use work_order_records::extraction::ExtractedFields;

use crate::config::ExtractorConfig;
use crate::extractor::Document;
use crate::extractor::DocumentExtractor;
use crate::extractor::ExtractionError;

const EXTRACTION_PROMPT: &str = "\
Act as an industrial maintenance expert. Extract the fields of this maintenance work order.
1. \"numero_ot\": look for \"O/T N°:\", \"Orden:\" or the main order code (e.g. P00057775).
2. \"tipo_ot\": look for \"PREVENTIVA\" or \"CORRECTIVA\".
3. \"nombre_equipo\": look for \"Equipo :\" and return the name.
4. \"codigo_activo\": look for \"Cód.Activo:\" or \"Activo Fijo:\". Prefer short alphanumeric codes (e.g. \"SOL 095\").
5. \"tecnico_asignado\": look for \"PROV. DE SERVICIO:\", \"Técnico:\" or \"Responsable:\". Return ONLY the name.
6. Extract \"area\", \"grupo\" and \"subgrupo\" when present.";

const RESPONSE_FIELDS: [&str; 8] = [
    "numero_ot",
    "tipo_ot",
    "nombre_equipo",
    "area",
    "grupo",
    "subgrupo",
    "codigo_activo",
    "tecnico_asignado",
];

#[derive(Deserialize, Debug, Default)]
struct GenerateContentResponse
{
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize, Debug)]
struct Candidate
{
    content: Option<Content>,
}

#[derive(Deserialize, Debug)]
struct Content
{
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize, Debug)]
struct Part
{
    text: Option<String>,
}

impl GenerateContentResponse
{
    fn first_text(self) -> Option<String>
    {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .find_map(|part| part.text)
    }
}

/// Extracts order fields with a hosted generative model that answers in JSON.
#[derive(Debug, Clone)]
pub struct GenerativeExtractor
{
    url: Url,
    api_key: String,
    client: Client,
}

impl GenerativeExtractor
{
    pub fn new(config: &ExtractorConfig) -> Result<Self, ExtractionError>
    {
        let raw_url = format!("{}/models/{}:generateContent", config.endpoint.trim_end_matches('/'), config.model);
        let url = Url::parse(&raw_url).map_err(|_| ExtractionError::InvalidEndpoint(raw_url.clone()))?;
        let client = Client::builder().timeout(config.timeout()).build()?;

        Ok(Self {
            url,
            api_key: config.api_key.clone(),
            client,
        })
    }

    fn request_body(document: &Document) -> Value
    {
        let properties: serde_json::Map<String, Value> = RESPONSE_FIELDS
            .iter()
            .map(|field| (field.to_string(), json!({ "type": "STRING" })))
            .collect();

        json!({
            "contents": [{
                "parts": [
                    { "inlineData": { "mimeType": document.inline_mime_type(), "data": STANDARD.encode(&document.bytes) } },
                    { "text": EXTRACTION_PROMPT }
                ]
            }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": { "type": "OBJECT", "properties": properties }
            }
        })
    }
}

impl DocumentExtractor for GenerativeExtractor
{
    fn extract(&self, document: &Document) -> Result<ExtractedFields, ExtractionError>
    {
        let response: GenerateContentResponse = self
            .client
            .post(self.url.clone())
            .header("x-goog-api-key", &self.api_key)
            .json(&Self::request_body(document))
            .send()?
            .error_for_status()?
            .json()?;

        let text = response.first_text().ok_or(ExtractionError::EmptyResponse)?;
        debug!(file = %document.file_name, response = %text, "Model answered");

        Ok(ExtractedFields::from_response_text(&text))
    }
}

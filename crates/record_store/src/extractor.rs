use std::fs;
use std::io;
use std::path::Path;

use thiserror::Error;
use tracing::info;
use tracing::warn;
use work_order_records::extraction::AssignmentDraft;
use work_order_records::extraction::ExtractedFields;

pub const PDF_MIME_TYPE: &str = "application/pdf";
pub const IMAGE_MIME_TYPE: &str = "image/jpeg";

#[derive(Debug, Error)]
pub enum ExtractionError
{
    #[error("invalid extractor endpoint `{0}`")]
    InvalidEndpoint(String),
    #[error("extraction request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("the model returned no text")]
    EmptyResponse,
}

/// A scanned work order, either a PDF or a photograph.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Document
{
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl Document
{
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self
    {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// `.pdf` files are sent as PDFs, anything else as a JPEG image.
    pub fn from_path(path: &Path) -> io::Result<Self>
    {
        let bytes = fs::read(path)?;
        let is_pdf = path.extension().is_some_and(|extension| extension.eq_ignore_ascii_case("pdf"));
        let mime_type = if is_pdf { PDF_MIME_TYPE } else { IMAGE_MIME_TYPE };
        let file_name = path.file_name().map(|name| name.to_string_lossy().into_owned()).unwrap_or_default();

        Ok(Self::new(file_name, mime_type, bytes))
    }

    /// The model only receives PDFs or JPEGs.
    pub fn inline_mime_type(&self) -> &'static str
    {
        if self.mime_type == PDF_MIME_TYPE { PDF_MIME_TYPE } else { IMAGE_MIME_TYPE }
    }
}

/// Maps a scanned order to a best-effort guess of its fields.
pub trait DocumentExtractor: Send + Sync
{
    fn extract(&self, document: &Document) -> Result<ExtractedFields, ExtractionError>;
}

/// Never fails: an extraction error becomes an all-empty guess.
pub fn extract_or_empty(extractor: &dyn DocumentExtractor, document: &Document) -> ExtractedFields
{
    match extractor.extract(document) {
        Ok(fields) => fields,
        Err(error) => {
            warn!(file = %document.file_name, %error, "Extraction failed, using empty fields");
            ExtractedFields::default()
        }
    }
}

/// Extracts every document in order. One bad document does not stop the
/// rest of the batch.
pub fn extract_batch(extractor: &dyn DocumentExtractor, documents: &[Document]) -> Vec<ExtractedFields>
{
    let extracted: Vec<ExtractedFields> = documents.iter().map(|document| extract_or_empty(extractor, document)).collect();

    let empty = extracted.iter().filter(|fields| fields.is_empty()).count();
    info!(documents = documents.len(), empty, "Extraction batch finished");

    extracted
}

/// Turns extractions into assignment drafts. With a roster, technician names
/// are replaced by the matching roster entry.
pub fn plan_assignments(extracted: &[ExtractedFields], roster: &[String]) -> Vec<AssignmentDraft>
{
    extracted
        .iter()
        .map(AssignmentDraft::from_extraction)
        .map(|draft| if roster.is_empty() { draft } else { draft.matched_against(roster) })
        .collect()
}

#[cfg(test)]
mod tests
{
    use std::io::Write;

    use super::*;

    /// Fails for any document whose name starts with `bad`.
    struct FakeExtractor;

    impl DocumentExtractor for FakeExtractor
    {
        fn extract(&self, document: &Document) -> Result<ExtractedFields, ExtractionError>
        {
            if document.file_name.starts_with("bad") {
                return Err(ExtractionError::EmptyResponse);
            }

            Ok(ExtractedFields {
                order_number: document.file_name.trim_end_matches(".jpg").to_string(),
                assigned_technician: "ANA diaz".to_string(),
                ..Default::default()
            })
        }
    }

    fn document(name: &str) -> Document
    {
        Document::new(name, IMAGE_MIME_TYPE, vec![0xff, 0xd8])
    }

    #[test]
    fn test_extract_batch_degrades_failures_in_place()
    {
        let documents = vec![document("P1.jpg"), document("bad.jpg"), document("P3.jpg")];

        let extracted = extract_batch(&FakeExtractor, &documents);

        assert_eq!(extracted.len(), 3);
        assert_eq!(extracted[0].order_number, "P1");
        assert!(extracted[1].is_empty());
        assert_eq!(extracted[2].order_number, "P3");
    }

    #[test]
    fn test_plan_assignments_with_and_without_roster()
    {
        let extracted = extract_batch(&FakeExtractor, &[document("P1.jpg")]);

        let drafts = plan_assignments(&extracted, &[]);
        assert_eq!(drafts[0].technician, "Ana Diaz");

        let roster = vec!["Juan Perez".to_string(), "Ana Diaz Soto".to_string()];
        let drafts = plan_assignments(&extracted, &roster);
        assert_eq!(drafts[0].technician, "Ana Diaz Soto");
        assert_eq!(drafts[0].order_number, "P1");
    }

    #[test]
    fn test_document_from_path_detects_pdf()
    {
        let mut pdf = tempfile::Builder::new().suffix(".PDF").tempfile().unwrap();
        pdf.write_all(b"%PDF-1.4").unwrap();
        let document = Document::from_path(pdf.path()).unwrap();
        assert_eq!(document.inline_mime_type(), PDF_MIME_TYPE);
        assert_eq!(document.bytes, b"%PDF-1.4");

        let png = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
        let document = Document::from_path(png.path()).unwrap();
        assert_eq!(document.inline_mime_type(), IMAGE_MIME_TYPE);

        assert!(Document::from_path(Path::new("/definitely/not/here.jpg")).is_err());
    }
}

/*!
 * Text extraction from images.
 *
 * A boundary adapter around a vision-capable model: the image travels as a
 * base64 data URL inside a chat-completion request. There is no local OCR;
 * a failed or malformed upstream response fails the extraction with the
 * upstream detail attached.
 */

use std::sync::Arc;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use bytes::Bytes;

use crate::errors::ProviderError;
use crate::providers::{ChatBackend, ChatRequest, ContentPart, ImageUrl};

/// Extracts text from image payloads via a vision-capable model
#[derive(Debug, Clone)]
pub struct TextExtractor {
    /// Shared chat backend
    backend: Arc<dyn ChatBackend>,
    /// Vision model used for extraction
    model: String,
}

impl TextExtractor {
    /// Create a new extractor using the given backend and model slug
    pub fn new(backend: Arc<dyn ChatBackend>, model: impl Into<String>) -> Self {
        Self {
            backend,
            model: model.into(),
        }
    }

    /// Extract all text from an image given its bytes and declared MIME type
    pub async fn extract_text(&self, image: &Bytes, mime_type: &str) -> Result<String, ProviderError> {
        let encoded = BASE64.encode(image);
        let data_url = format!("data:{};base64,{}", mime_type, encoded);

        let request = ChatRequest::new(&self.model).add_parts_message(
            "user",
            vec![
                ContentPart::ImageUrl {
                    image_url: ImageUrl { url: data_url },
                },
                ContentPart::Text {
                    text: "Extract all text from this image. Return only text.".to_string(),
                },
            ],
        );

        let response = self.backend.complete(request).await?;
        response
            .first_text()
            .map(|text| text.to_string())
            .ok_or_else(|| {
                ProviderError::ParseError("Extraction response contained no completion text".to_string())
            })
    }
}

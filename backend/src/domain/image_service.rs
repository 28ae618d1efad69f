//! Image preparation for memorial writes.
//!
//! There is no object store behind this service: uploads are embedded in the
//! record as `data:` URIs, external URLs are kept as they are. Conversion
//! happens before the store write is issued.

use base64::Engine;
use shared::ImageInput;

use crate::domain::errors::FieldError;

pub const DEFAULT_PLACEHOLDER_IMAGE: &str = "https://picsum.photos/seed/{seed}/600/600";
/// Leaves room for the rest of the document under the store's 1 MiB limit
pub const DEFAULT_MAX_INLINE_IMAGE_BYTES: usize = 700 * 1024;

const IMAGES_FIELD: &str = "images";

#[derive(Debug, Clone, PartialEq)]
pub struct ImageService {
    placeholder_template: Option<String>,
    max_inline_bytes: usize,
}

impl Default for ImageService {
    fn default() -> Self {
        Self::new(
            Some(DEFAULT_PLACEHOLDER_IMAGE.to_string()),
            DEFAULT_MAX_INLINE_IMAGE_BYTES,
        )
    }
}

impl ImageService {
    pub fn new(placeholder_template: Option<String>, max_inline_bytes: usize) -> Self {
        Self {
            placeholder_template,
            max_inline_bytes,
        }
    }

    /// Convert submitted images into storable strings, preserving order.
    ///
    /// Blank URL entries (an empty form row) are dropped.
    pub fn prepare(&self, inputs: &[ImageInput]) -> Result<Vec<String>, Vec<FieldError>> {
        let mut urls = Vec::with_capacity(inputs.len());
        let mut errors = Vec::new();

        for (index, input) in inputs.iter().enumerate() {
            match self.prepare_one(input) {
                Ok(Some(url)) => urls.push(url),
                Ok(None) => {}
                Err(message) => errors.push(FieldError::new(
                    IMAGES_FIELD,
                    format!("image {}: {}", index + 1, message),
                )),
            }
        }

        if errors.is_empty() {
            Ok(urls)
        } else {
            Err(errors)
        }
    }

    fn prepare_one(&self, input: &ImageInput) -> Result<Option<String>, String> {
        match input {
            ImageInput::Url { value } => {
                let value = value.trim();
                if value.is_empty() {
                    return Ok(None);
                }
                if value.starts_with("http://") || value.starts_with("https://") {
                    return Ok(Some(value.to_string()));
                }
                if value.starts_with("data:") {
                    self.check_data_uri(value)?;
                    return Ok(Some(value.to_string()));
                }
                Err("must be an http(s) URL or a data URI".to_string())
            }
            ImageInput::Upload { content_type, data } => {
                let content_type = content_type.trim().to_lowercase();
                if !content_type.starts_with("image/") {
                    return Err(format!("unsupported content type {}", content_type));
                }
                let payload = data.trim();
                self.check_payload(payload)?;
                Ok(Some(format!("data:{};base64,{}", content_type, payload)))
            }
        }
    }

    fn check_data_uri(&self, uri: &str) -> Result<(), String> {
        let rest = &uri["data:".len()..];
        let (media, payload) = rest
            .split_once(";base64,")
            .ok_or_else(|| "data URI must be base64 encoded".to_string())?;
        if !media.to_lowercase().starts_with("image/") {
            return Err(format!("unsupported content type {}", media));
        }
        self.check_payload(payload)
    }

    fn check_payload(&self, payload: &str) -> Result<(), String> {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(payload)
            .map_err(|e| format!("invalid base64 payload: {}", e))?;
        if bytes.is_empty() {
            return Err("upload is empty".to_string());
        }
        if bytes.len() > self.max_inline_bytes {
            return Err(format!(
                "upload is {} bytes, limit is {} bytes",
                bytes.len(),
                self.max_inline_bytes
            ));
        }
        Ok(())
    }

    /// Placeholder cover for a record saved without images, if configured
    pub fn placeholder(&self, seed: i64) -> Option<String> {
        self.placeholder_template
            .as_ref()
            .map(|template| template.replace("{seed}", &seed.to_string()))
    }

    /// Substitute the placeholder when no image survived preparation
    pub fn with_placeholder(&self, urls: Vec<String>, seed: i64) -> Vec<String> {
        if !urls.is_empty() {
            return urls;
        }
        self.placeholder(seed).into_iter().collect()
    }
}

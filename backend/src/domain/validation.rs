//! Form-level validation turning admin requests into memorial fields.
//!
//! Failures are collected per field and never reach the store.

use shared::{CreateMemorialRequest, UpdateMemorialRequest};

use crate::domain::date_format::parse_calendar_date;
use crate::domain::errors::FieldError;
use crate::domain::image_service::ImageService;
use crate::domain::models::{MemorialCode, MemorialFields, MemorialPatch, RecordDate};

pub const MAX_NAME_LENGTH: usize = 100;

/// Trim free text; blank becomes absent
pub fn normalize_text(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

/// Validate and normalize a memorial code
pub fn validate_memorial_code(raw: &str) -> Result<MemorialCode, FieldError> {
    let code = MemorialCode::normalize(raw);
    if code.body().is_empty() {
        return Err(FieldError::new("memorialCode", "is required"));
    }
    if code.body().chars().any(char::is_whitespace) {
        return Err(FieldError::new("memorialCode", "must not contain spaces"));
    }
    Ok(code)
}

fn validate_name(name: &Option<String>) -> Result<(), FieldError> {
    match name {
        Some(name) if name.chars().count() > MAX_NAME_LENGTH => Err(FieldError::new(
            "name",
            format!("cannot exceed {} characters", MAX_NAME_LENGTH),
        )),
        _ => Ok(()),
    }
}

/// A form date: blank means absent, otherwise a real `YYYY-MM-DD` day
pub fn validate_date(field: &'static str, raw: Option<&str>) -> Result<Option<RecordDate>, FieldError> {
    let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return Ok(None);
    };
    match parse_calendar_date(raw) {
        Some(_) => Ok(Some(RecordDate::calendar(raw))),
        None => Err(FieldError::new(field, "must be a valid date in YYYY-MM-DD format")),
    }
}

/// Validate a create request. Images are converted here, placeholders are not applied.
pub fn validate_create(
    request: CreateMemorialRequest,
    images: &ImageService,
) -> Result<MemorialFields, Vec<FieldError>> {
    let mut errors = Vec::new();

    let code = validate_memorial_code(&request.memorial_code).map_err(|e| errors.push(e)).ok();

    let name = normalize_text(request.name);
    if let Err(e) = validate_name(&name) {
        errors.push(e);
    }

    let birth_date = validate_date("birthDate", request.birth_date.as_deref())
        .map_err(|e| errors.push(e))
        .ok()
        .flatten();
    let cremation_date = validate_date("cremationDate", request.cremation_date.as_deref())
        .map_err(|e| errors.push(e))
        .ok()
        .flatten();

    let image_urls = match images.prepare(&request.images) {
        Ok(urls) => urls,
        Err(image_errors) => {
            errors.extend(image_errors);
            Vec::new()
        }
    };

    match code {
        Some(memorial_code) if errors.is_empty() => Ok(MemorialFields {
            memorial_code,
            name,
            tutors: normalize_text(request.tutors),
            animal_type: normalize_text(request.animal_type),
            sex: request.sex,
            breed: normalize_text(request.breed),
            birth_date,
            cremation_date,
            tree: normalize_text(request.tree),
            short_description: normalize_text(request.short_description),
            full_description: normalize_text(request.full_description),
            image_urls,
        }),
        _ => Err(errors),
    }
}

/// Validate an update request into a merge patch
pub fn validate_update(
    request: UpdateMemorialRequest,
    images: &ImageService,
) -> Result<MemorialPatch, Vec<FieldError>> {
    let mut errors = Vec::new();
    let mut patch = MemorialPatch::default();

    if let Some(raw) = request.memorial_code.as_deref() {
        match validate_memorial_code(raw) {
            Ok(code) => patch.memorial_code = Some(code),
            Err(e) => errors.push(e),
        }
    }

    if let Some(name) = request.name {
        let name = normalize_text(Some(name));
        if let Err(e) = validate_name(&name) {
            errors.push(e);
        }
        patch.name = Some(name);
    }

    if let Some(raw) = request.birth_date.as_deref() {
        match validate_date("birthDate", Some(raw)) {
            Ok(date) => patch.birth_date = Some(date),
            Err(e) => errors.push(e),
        }
    }
    if let Some(raw) = request.cremation_date.as_deref() {
        match validate_date("cremationDate", Some(raw)) {
            Ok(date) => patch.cremation_date = Some(date),
            Err(e) => errors.push(e),
        }
    }

    if let Some(inputs) = request.images.as_deref() {
        match images.prepare(inputs) {
            Ok(urls) => patch.image_urls = Some(urls),
            Err(image_errors) => errors.extend(image_errors),
        }
    }

    patch.tutors = request.tutors.map(|v| normalize_text(Some(v)));
    patch.animal_type = request.animal_type.map(|v| normalize_text(Some(v)));
    patch.sex = request.sex;
    patch.breed = request.breed.map(|v| normalize_text(Some(v)));
    patch.tree = request.tree.map(|v| normalize_text(Some(v)));
    patch.short_description = request.short_description.map(|v| normalize_text(Some(v)));
    patch.full_description = request.full_description.map(|v| normalize_text(Some(v)));

    if errors.is_empty() {
        Ok(patch)
    } else {
        Err(errors)
    }
}

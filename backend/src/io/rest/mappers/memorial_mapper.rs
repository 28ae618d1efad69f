//! backend/src/io/rest/mappers/memorial_mapper.rs

use shared::{AdminMemorialListResponse, Memorial, MemorialDetail, MemorialResponse};

use crate::domain::date_format::DateFormatter;
use crate::domain::models::MemorialRecord;

/// Shown on the public page for any text field left blank
pub const NOT_INFORMED: &str = "Não informado";

/// Mapper from domain memorial records to shared DTOs.
pub struct MemorialMapper;

impl MemorialMapper {
    /// Wire form of a record; dates become ISO calendar strings for editing.
    pub fn to_dto(record: MemorialRecord, formatter: &DateFormatter) -> Memorial {
        Memorial {
            birth_date: formatter.to_iso(record.birth_date.as_ref()),
            cremation_date: formatter.to_iso(record.cremation_date.as_ref()),
            id: record.id,
            name: record.name,
            memorial_code: record.memorial_code.into(),
            tutors: record.tutors,
            animal_type: record.animal_type,
            sex: record.sex,
            breed: record.breed,
            tree: record.tree,
            short_description: record.short_description,
            full_description: record.full_description,
            image_urls: record.image_urls,
            created_at: record.created_at.to_rfc3339(),
            updated_at: record.updated_at.to_rfc3339(),
        }
    }

    pub fn to_memorial_response_dto(
        record: MemorialRecord,
        formatter: &DateFormatter,
        message: &str,
    ) -> MemorialResponse {
        MemorialResponse {
            memorial: Self::to_dto(record, formatter),
            success_message: message.to_string(),
        }
    }

    pub fn to_admin_list_dto(records: Vec<MemorialRecord>, formatter: &DateFormatter) -> AdminMemorialListResponse {
        AdminMemorialListResponse {
            memorials: records
                .into_iter()
                .map(|record| Self::to_dto(record, formatter))
                .collect(),
        }
    }

    /// Public memorial page with every field rendered for display
    pub fn to_detail_dto(record: MemorialRecord, formatter: &DateFormatter) -> MemorialDetail {
        let or_placeholder =
            |value: Option<String>| value.filter(|v| !v.trim().is_empty()).unwrap_or_else(|| NOT_INFORMED.to_string());

        MemorialDetail {
            name: record.display_name().unwrap_or(NOT_INFORMED).to_string(),
            birth_date: formatter.format_long(record.birth_date.as_ref()),
            cremation_date: formatter.format_long(record.cremation_date.as_ref()),
            sex: record
                .sex
                .map(|sex| sex.label().to_string())
                .unwrap_or_else(|| NOT_INFORMED.to_string()),
            id: record.id,
            memorial_code: record.memorial_code.into(),
            tutors: or_placeholder(record.tutors),
            animal_type: or_placeholder(record.animal_type),
            breed: or_placeholder(record.breed),
            tree: or_placeholder(record.tree),
            short_description: record.short_description,
            full_description: record.full_description,
            image_urls: record.image_urls,
        }
    }
}

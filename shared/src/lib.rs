use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sex of the memorialized animal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sex {
    Macho,
    #[serde(rename = "Fêmea")]
    Femea,
}

impl Sex {
    pub fn label(&self) -> &'static str {
        match self {
            Sex::Macho => "Macho",
            Sex::Femea => "Fêmea",
        }
    }
}

/// A memorial record as exchanged over the wire.
///
/// Dates are ISO calendar strings (`YYYY-MM-DD`), timestamps are RFC 3339.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Memorial {
    pub id: String,
    pub name: Option<String>,
    /// Public protocol code, always `#`-prefixed
    pub memorial_code: String,
    pub tutors: Option<String>,
    pub animal_type: Option<String>,
    pub sex: Option<Sex>,
    pub breed: Option<String>,
    pub birth_date: Option<String>,
    pub cremation_date: Option<String>,
    pub tree: Option<String>,
    pub short_description: Option<String>,
    pub full_description: Option<String>,
    /// First entry is the cover image
    pub image_urls: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// One image entry submitted by the admin form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ImageInput {
    /// External URL or an already-encoded `data:` URI
    Url { value: String },
    /// Raw binary upload, base64 encoded for transport
    Upload {
        #[serde(rename = "contentType")]
        content_type: String,
        data: String,
    },
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateMemorialRequest {
    pub memorial_code: String,
    pub name: Option<String>,
    pub tutors: Option<String>,
    pub animal_type: Option<String>,
    pub sex: Option<Sex>,
    pub breed: Option<String>,
    pub birth_date: Option<String>,
    pub cremation_date: Option<String>,
    pub tree: Option<String>,
    pub short_description: Option<String>,
    pub full_description: Option<String>,
    pub images: Vec<ImageInput>,
}

/// Merge-style update: absent fields are left untouched, empty strings clear the field
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateMemorialRequest {
    pub memorial_code: Option<String>,
    pub name: Option<String>,
    pub tutors: Option<String>,
    pub animal_type: Option<String>,
    pub sex: Option<Sex>,
    pub breed: Option<String>,
    pub birth_date: Option<String>,
    pub cremation_date: Option<String>,
    pub tree: Option<String>,
    pub short_description: Option<String>,
    pub full_description: Option<String>,
    pub images: Option<Vec<ImageInput>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateMemorialResponse {
    pub id: String,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemorialResponse {
    pub memorial: Memorial,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminMemorialListResponse {
    pub memorials: Vec<Memorial>,
}

/// Sort keys supported by the public memorial listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortOrder {
    #[serde(rename = "name_asc")]
    NameAsc,
    #[serde(rename = "name_desc")]
    NameDesc,
    #[serde(rename = "protocol_asc")]
    ProtocolAsc,
    #[default]
    #[serde(rename = "protocol_desc")]
    ProtocolDesc,
    #[serde(rename = "cremationDate_asc")]
    CremationDateAsc,
    #[serde(rename = "cremationDate_desc")]
    CremationDateDesc,
}

impl SortOrder {
    pub const ALL: [SortOrder; 6] = [
        SortOrder::NameAsc,
        SortOrder::NameDesc,
        SortOrder::ProtocolAsc,
        SortOrder::ProtocolDesc,
        SortOrder::CremationDateAsc,
        SortOrder::CremationDateDesc,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::NameAsc => "name_asc",
            SortOrder::NameDesc => "name_desc",
            SortOrder::ProtocolAsc => "protocol_asc",
            SortOrder::ProtocolDesc => "protocol_desc",
            SortOrder::CremationDateAsc => "cremationDate_asc",
            SortOrder::CremationDateDesc => "cremationDate_desc",
        }
    }

    pub fn is_descending(&self) -> bool {
        matches!(
            self,
            SortOrder::NameDesc | SortOrder::ProtocolDesc | SortOrder::CremationDateDesc
        )
    }

    /// The ascending order this key is derived from
    pub fn ascending(&self) -> SortOrder {
        match self {
            SortOrder::NameDesc => SortOrder::NameAsc,
            SortOrder::ProtocolDesc => SortOrder::ProtocolAsc,
            SortOrder::CremationDateDesc => SortOrder::CremationDateAsc,
            other => *other,
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSortOrder(pub String);

impl fmt::Display for UnknownSortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown sort order: {}", self.0)
    }
}

impl std::error::Error for UnknownSortOrder {}

impl FromStr for SortOrder {
    type Err = UnknownSortOrder;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortOrder::ALL
            .into_iter()
            .find(|order| order.as_str() == s.trim())
            .ok_or_else(|| UnknownSortOrder(s.to_string()))
    }
}

/// Query parameters accepted by the public listing
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MemorialListQuery {
    pub search: Option<String>,
    /// `all` (or absent) disables the animal filter
    pub animal: Option<String>,
    /// Wire name of a [`SortOrder`]; blank means the default order
    pub sort: Option<String>,
}

impl MemorialListQuery {
    pub fn sort_order(&self) -> Result<Option<SortOrder>, UnknownSortOrder> {
        match self.sort.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(value) => value.parse().map(Some),
        }
    }
}

/// Display-ready entry of the public memorial listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemorialCard {
    pub id: String,
    pub name: String,
    pub memorial_code: String,
    pub cover_image: Option<String>,
    pub animal_type: Option<String>,
    pub breed: Option<String>,
    pub tutors: Option<String>,
    pub formatted_cremation_date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemorialListResponse {
    pub memorials: Vec<MemorialCard>,
    pub total: usize,
    pub sort: SortOrder,
}

/// Public memorial page, every field already rendered for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemorialDetail {
    pub id: String,
    pub name: String,
    pub memorial_code: String,
    pub tutors: String,
    pub animal_type: String,
    pub sex: String,
    pub breed: String,
    pub birth_date: String,
    pub cremation_date: String,
    pub tree: String,
    pub short_description: Option<String>,
    pub full_description: Option<String>,
    pub image_urls: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub uid: String,
    pub email: String,
    /// RFC 3339 expiry of the session
    pub expires_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldErrorDto {
    pub field: String,
    pub message: String,
}

/// Error body returned by every failing endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<FieldErrorDto>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub store_available: bool,
}

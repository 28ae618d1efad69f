//! Memorial listing view model.
//!
//! Turns the full fetched record set plus the visitor's search text, animal
//! filter and sort key into the ordered display list. This is a pure
//! recomputation: no I/O, no mutation of the input, no cached state.
//!
//! ## Ordering rules
//!
//! - **name**: accent- and case-folded comparison, raw name as tie breaker
//! - **protocol**: number parsed from the code after `#`; codes without
//!   leading digits sort lowest
//! - **cremationDate**: epoch of the normalized date; absent or unparsable
//!   dates sort earliest
//!
//! Ascending sorts are stable, and every descending order is the exact
//! reverse of its ascending counterpart.

use shared::{MemorialCard, SortOrder};

use crate::domain::date_format::DateFormatter;
use crate::domain::models::MemorialRecord;

/// Animal type filter; `all` disables it
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AnimalFilter {
    #[default]
    All,
    Kind(String),
}

impl AnimalFilter {
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            None | Some("") => AnimalFilter::All,
            Some(value) if value.eq_ignore_ascii_case("all") => AnimalFilter::All,
            Some(value) => AnimalFilter::Kind(value.to_string()),
        }
    }

    pub fn matches(&self, animal_type: Option<&str>) -> bool {
        match self {
            AnimalFilter::All => true,
            AnimalFilter::Kind(kind) => animal_type
                .map(|animal| animal.to_lowercase() == kind.to_lowercase())
                .unwrap_or(false),
        }
    }
}

/// Visitor-supplied listing parameters
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListCriteria {
    pub search: String,
    pub animal: AnimalFilter,
    pub sort: SortOrder,
}

impl ListCriteria {
    pub fn new(search: Option<&str>, animal: Option<&str>, sort: Option<SortOrder>) -> Self {
        Self {
            search: search.unwrap_or_default().to_lowercase(),
            animal: AnimalFilter::parse(animal),
            sort: sort.unwrap_or_default(),
        }
    }
}

/// Fold a name into its collation key: lowercase, accents stripped
pub fn collation_key(value: &str) -> String {
    value
        .chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'á' | 'à' | 'ä' | 'â' | 'ã' | 'å' => 'a',
            'é' | 'è' | 'ë' | 'ê' => 'e',
            'í' | 'ì' | 'ï' | 'î' => 'i',
            'ó' | 'ò' | 'ö' | 'ô' | 'õ' => 'o',
            'ú' | 'ù' | 'ü' | 'û' => 'u',
            'ñ' => 'n',
            'ç' => 'c',
            other => other,
        })
        .collect()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MemorialListView {
    formatter: DateFormatter,
}

impl MemorialListView {
    pub fn new(formatter: DateFormatter) -> Self {
        Self { formatter }
    }

    pub fn formatter(&self) -> &DateFormatter {
        &self.formatter
    }

    /// Filter and sort the full record set
    pub fn apply<'a>(
        &self,
        records: &'a [MemorialRecord],
        criteria: &ListCriteria,
    ) -> Vec<&'a MemorialRecord> {
        let mut visible: Vec<&MemorialRecord> = records
            .iter()
            .filter(|record| self.is_visible(record, criteria))
            .collect();
        self.sort(&mut visible, criteria.sort);
        visible
    }

    /// Filter, sort and render cards for display
    pub fn cards(&self, records: &[MemorialRecord], criteria: &ListCriteria) -> Vec<MemorialCard> {
        self.apply(records, criteria)
            .into_iter()
            .map(|record| self.card(record))
            .collect()
    }

    pub fn is_visible(&self, record: &MemorialRecord, criteria: &ListCriteria) -> bool {
        // Records without a name are never listed
        if record.display_name().is_none() {
            return false;
        }
        self.matches_search(record, &criteria.search)
            && criteria.animal.matches(record.animal_type.as_deref())
    }

    fn matches_search(&self, record: &MemorialRecord, search: &str) -> bool {
        if search.is_empty() {
            return true;
        }
        let cremation_date = match record.cremation_date {
            Some(ref date) => self.formatter.format_long(Some(date)),
            None => String::new(),
        };

        let found = [
            record.name.as_deref(),
            Some(record.memorial_code.as_str()),
            record.breed.as_deref(),
            record.tutors.as_deref(),
            Some(cremation_date.as_str()),
        ]
        .into_iter()
        .flatten()
        .any(|haystack| haystack.to_lowercase().contains(search));
        found
    }

    pub fn sort(&self, records: &mut [&MemorialRecord], order: SortOrder) {
        match order.ascending() {
            SortOrder::NameAsc => records.sort_by_cached_key(|record| {
                let name = record.name.clone().unwrap_or_default();
                (collation_key(&name), name)
            }),
            SortOrder::ProtocolAsc => records.sort_by_key(|record| record.memorial_code.number()),
            _ => records.sort_by_cached_key(|record| {
                self.formatter.epoch_millis(record.cremation_date.as_ref())
            }),
        }
        if order.is_descending() {
            records.reverse();
        }
    }

    pub fn card(&self, record: &MemorialRecord) -> MemorialCard {
        MemorialCard {
            id: record.id.clone(),
            name: record.display_name().unwrap_or_default().to_string(),
            memorial_code: record.memorial_code.to_string(),
            cover_image: record.cover_image().map(str::to_string),
            animal_type: record.animal_type.clone(),
            breed: record.breed.clone(),
            tutors: record.tutors.clone(),
            formatted_cremation_date: self.formatter.format_long(record.cremation_date.as_ref()),
        }
    }
}

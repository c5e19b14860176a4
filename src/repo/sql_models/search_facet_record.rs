use std::str::FromStr;

use crate::{repo, types};

/// A search facet row joined with its field row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SearchFacetRecord {
    pub search_facet_id: i64,
    pub label: String,
    pub show_on_search: bool,
    pub search_display_priority: i32,
    pub multiselect: bool,

    pub field_id: i64,
    pub property_name: String,
    pub abbreviation: Option<String>,
    pub searchable: bool,

    /// Raw entity type string, validated when converting into a
    /// [`types::SearchFacet`]
    pub(super) entity_type: String,
}

impl SearchFacetRecord {
    pub fn entity_type(&self) -> Result<types::FieldEntity, repo::Error> {
        types::FieldEntity::from_str(&self.entity_type).map_err(|e| {
            repo::Error::CorruptedRecord(format!("field `{}`: {e}", self.field_id))
        })
    }
}

impl TryFrom<SearchFacetRecord> for types::SearchFacet {
    type Error = repo::Error;

    fn try_from(value: SearchFacetRecord) -> Result<Self, Self::Error> {
        let entity_type = value.entity_type()?;

        Ok(Self {
            id: value.search_facet_id,
            field: types::Field {
                id: value.field_id,
                entity_type,
                property_name: value.property_name,
                abbreviation: value.abbreviation,
                searchable: value.searchable,
            },
            label: value.label,
            show_on_search: value.show_on_search,
            search_display_priority: value.search_display_priority,
            can_multiselect: value.multiselect,
        })
    }
}

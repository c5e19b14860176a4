use serde::{Deserialize, Serialize};

use super::{Error, UNREGISTERED};

/// Domain entity a catalog field applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FieldEntity {
    Product,
    Sku,
    Customer,
    Order,
    OrderItem,
    Offer,
}

impl FieldEntity {
    /// Type string stored alongside each field
    pub fn as_type(&self) -> &'static str {
        match self {
            Self::Product => "PRODUCT",
            Self::Sku => "SKU",
            Self::Customer => "CUSTOMER",
            Self::Order => "ORDER",
            Self::OrderItem => "ORDER_ITEM",
            Self::Offer => "OFFER",
        }
    }
}

impl std::fmt::Display for FieldEntity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_type())
    }
}

impl std::str::FromStr for FieldEntity {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "PRODUCT" => Ok(Self::Product),
            "SKU" => Ok(Self::Sku),
            "CUSTOMER" => Ok(Self::Customer),
            "ORDER" => Ok(Self::Order),
            "ORDER_ITEM" => Ok(Self::OrderItem),
            "OFFER" => Ok(Self::Offer),
            _ => Err(Error::UnknownFieldEntity(value.to_owned())),
        }
    }
}

impl TryFrom<String> for FieldEntity {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FieldEntity> for String {
    fn from(value: FieldEntity) -> Self {
        value.as_type().to_owned()
    }
}

/// Indexable catalog attribute definition.
///
/// Fields belong to the catalog schema, facets only reference them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub id: i64,
    pub entity_type: FieldEntity,
    pub property_name: String,
    pub abbreviation: Option<String>,
    pub searchable: bool,
}

impl Field {
    pub fn new(entity_type: FieldEntity, property_name: &str) -> Self {
        Self {
            id: UNREGISTERED,
            entity_type,
            property_name: property_name.to_owned(),
            abbreviation: None,
            searchable: false,
        }
    }

    pub fn with_abbreviation(mut self, abbreviation: &str) -> Self {
        self.abbreviation = Some(abbreviation.to_owned());
        self
    }

    pub fn with_searchable(mut self, searchable: bool) -> Self {
        self.searchable = searchable;
        self
    }

    pub fn is_registered(&self) -> bool {
        self.id != UNREGISTERED
    }
}

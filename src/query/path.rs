//! Resolution of dotted catalog field paths.
//!
//! A path such as `defaultSku.size` names the source a facet reads its values
//! from. Paths are resolved once into a [`FieldPath`], so backends never see
//! raw strings and property names can only map onto known columns.

use super::{Error, ValueType};

const DEFAULT_SKU_PREFIX: &str = "defaultSku.";
const PRODUCT_ATTRIBUTES_PREFIX: &str = "productAttributes.";
const PRODUCT_PREFIX: &str = "product.";

/// Addressable product properties and their backing columns
pub const PRODUCT_PROPERTIES: &[(&str, &str)] = &[
    ("id", "product_id"),
    ("manufacturer", "manufacturer"),
    ("model", "model"),
    ("url", "url"),
    ("displayTemplate", "display_template"),
    ("featuredProduct", "featured_product"),
    ("canSellWithoutOptions", "can_sell_without_options"),
];

/// Addressable sku properties and their backing columns
pub const SKU_PROPERTIES: &[(&str, &str)] = &[
    ("id", "sku_id"),
    ("name", "name"),
    ("description", "description"),
    ("size", "size"),
    ("color", "color"),
    ("retailPrice", "retail_price"),
    ("salePrice", "sale_price"),
    ("available", "available"),
    ("quantityAvailable", "quantity_available"),
    ("taxable", "taxable"),
];

/// How path prefixes are recognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PathMatch {
    /// The path must start with the prefix
    #[default]
    Prefix,
    /// The prefix may appear anywhere in the path; the prefix length is then
    /// stripped from the start of the path, whatever it contains.
    Substring,
}

impl std::str::FromStr for PathMatch {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "prefix" => Ok(Self::Prefix),
            "substring" => Ok(Self::Substring),
            _ => Err(Error::BadFieldPath {
                path: value.to_owned(),
            }),
        }
    }
}

impl PathMatch {
    fn strip<'a>(&self, path: &'a str, prefix: &str) -> Option<&'a str> {
        match self {
            Self::Prefix => path.strip_prefix(prefix),
            Self::Substring => {
                if path.contains(prefix) {
                    // an empty remainder is rejected later, as with an
                    // unknown property
                    Some(path.get(prefix.len()..).unwrap_or_default())
                } else {
                    None
                }
            }
        }
    }
}

/// A catalog property validated against one of the property tables.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CatalogProperty {
    property: String,
    column: &'static str,
}

impl CatalogProperty {
    fn resolve(
        path: &str,
        property: &str,
        table: &'static [(&'static str, &'static str)],
    ) -> Result<Self, Error> {
        table
            .iter()
            .find(|(name, _)| *name == property)
            .map(|(name, column)| Self {
                property: (*name).to_owned(),
                column,
            })
            .ok_or_else(|| Error::UnknownProperty {
                path: path.to_owned(),
                property: property.to_owned(),
            })
    }

    pub fn property(&self) -> &str {
        &self.property
    }

    pub fn column(&self) -> &'static str {
        self.column
    }
}

/// Resolved source of distinct facet values.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldPath {
    /// A column of the product's default sku
    DefaultSku(CatalogProperty),
    /// The `value` of the product attributes whose name matches, ignoring case.
    /// The name is stored lowercased.
    ProductAttribute(String),
    /// A column of the product itself
    Product(CatalogProperty),
}

impl FieldPath {
    /// Resolves `path`, checking prefixes in order: `defaultSku.`,
    /// `productAttributes.`, `product.`.
    pub fn parse(path: &str, mode: PathMatch) -> Result<Self, Error> {
        if let Some(rest) = mode.strip(path, DEFAULT_SKU_PREFIX) {
            return CatalogProperty::resolve(path, rest, SKU_PROPERTIES).map(Self::DefaultSku);
        }

        if let Some(rest) = mode.strip(path, PRODUCT_ATTRIBUTES_PREFIX) {
            if rest.is_empty() {
                return Err(Error::BadFieldPath {
                    path: path.to_owned(),
                });
            }
            return Ok(Self::ProductAttribute(rest.to_lowercase()));
        }

        if let Some(rest) = mode.strip(path, PRODUCT_PREFIX) {
            return CatalogProperty::resolve(path, rest, PRODUCT_PROPERTIES).map(Self::Product);
        }

        Err(Error::BadFieldPath {
            path: path.to_owned(),
        })
    }
}

impl std::fmt::Display for FieldPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DefaultSku(p) => write!(f, "{DEFAULT_SKU_PREFIX}{}", p.property),
            Self::ProductAttribute(name) => write!(f, "{PRODUCT_ATTRIBUTES_PREFIX}{name}"),
            Self::Product(p) => write!(f, "{PRODUCT_PREFIX}{}", p.property),
        }
    }
}

/// Request for the distinct non-null values found at a path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DistinctValuesQuery {
    pub path: FieldPath,
    pub value_type: ValueType,
}

impl DistinctValuesQuery {
    pub fn new(path: FieldPath, value_type: ValueType) -> Self {
        Self { path, value_type }
    }
}

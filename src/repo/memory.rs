//! In-memory catalog evaluating backend requests without a database.
//!
//! Rows follow the relational schema: facets reference fields by id and
//! are joined on read, products optionally own a default sku and a list of
//! attributes. Column names are the ones exposed by the property tables in
//! [`crate::query`].

use std::collections::{BTreeMap, HashMap};

use crate::{query, repo, types};

#[derive(Debug, Clone, Default)]
pub struct SkuRow {
    columns: HashMap<String, query::Value>,
}

impl SkuRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `column`; absent columns read as `NULL`.
    pub fn with(mut self, column: &str, value: impl Into<query::Value>) -> Self {
        self.columns.insert(column.to_owned(), value.into());
        self
    }
}

#[derive(Debug, Clone)]
pub struct AttributeRow {
    pub name: String,
    pub value: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ProductRow {
    columns: HashMap<String, query::Value>,
    default_sku: Option<SkuRow>,
    attributes: Vec<AttributeRow>,
}

impl ProductRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `column`; absent columns read as `NULL`.
    pub fn with(mut self, column: &str, value: impl Into<query::Value>) -> Self {
        self.columns.insert(column.to_owned(), value.into());
        self
    }

    pub fn with_default_sku(mut self, sku: SkuRow) -> Self {
        self.default_sku = Some(sku);
        self
    }

    pub fn with_attribute(mut self, name: &str, value: Option<&str>) -> Self {
        self.attributes.push(AttributeRow {
            name: name.to_owned(),
            value: value.map(str::to_owned),
        });
        self
    }
}

#[derive(Debug, Clone)]
struct FacetRow {
    id: i64,
    field_id: i64,
    label: String,
    show_on_search: bool,
    search_display_priority: i32,
    can_multiselect: bool,
}

impl FacetRow {
    fn from_facet(id: i64, facet: &types::SearchFacet) -> Self {
        Self {
            id,
            field_id: facet.field.id,
            label: facet.label.clone(),
            show_on_search: facet.show_on_search,
            search_display_priority: facet.search_display_priority,
            can_multiselect: facet.can_multiselect,
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    fields: BTreeMap<i64, types::Field>,
    facets: Vec<FacetRow>,
    products: Vec<ProductRow>,
    next_id: i64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn generate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    /// Registers `field`, assigning it a new id.
    pub fn insert_field(&mut self, mut field: types::Field) -> types::Field {
        field.id = self.generate_id();
        self.fields.insert(field.id, field.clone());
        field
    }

    pub fn insert_product(&mut self, product: ProductRow) {
        self.products.push(product);
    }

    /// Number of stored facet rows
    pub fn facet_count(&self) -> usize {
        self.facets.len()
    }

    fn join(&self, row: &FacetRow) -> Result<types::SearchFacet, repo::Error> {
        let field = self.fields.get(&row.field_id).ok_or_else(|| {
            repo::Error::CorruptedRecord(format!(
                "facet `{}` references missing field `{}`",
                row.id, row.field_id
            ))
        })?;

        Ok(types::SearchFacet {
            id: row.id,
            field: field.clone(),
            label: row.label.clone(),
            show_on_search: row.show_on_search,
            search_display_priority: row.search_display_priority,
            can_multiselect: row.can_multiselect,
        })
    }

    fn select_facets(
        &self,
        filter: &query::FacetFilter,
    ) -> Result<Vec<types::SearchFacet>, repo::Error> {
        let mut ret = Vec::new();
        for row in &self.facets {
            let facet = self.join(row)?;
            if filter.matches(&facet) {
                ret.push(facet);
            }
        }
        Ok(ret)
    }

    fn select_distinct(
        &self,
        q: &query::DistinctValuesQuery,
    ) -> Result<Vec<query::Value>, repo::Error> {
        let raw: Vec<query::Value> = match &q.path {
            query::FieldPath::DefaultSku(prop) => self
                .products
                .iter()
                .filter_map(|p| p.default_sku.as_ref())
                .filter_map(|sku| sku.columns.get(prop.column()).cloned())
                .collect(),
            query::FieldPath::ProductAttribute(name) => self
                .products
                .iter()
                .flat_map(|p| p.attributes.iter())
                .filter(|a| a.name.to_lowercase() == *name)
                .filter_map(|a| a.value.clone().map(query::Value::Text))
                .collect(),
            query::FieldPath::Product(prop) => self
                .products
                .iter()
                .filter_map(|p| p.columns.get(prop.column()).cloned())
                .collect(),
        };

        let mut ret: Vec<query::Value> = Vec::new();
        for value in raw {
            let value = value.coerce(q.value_type)?;
            if !ret.contains(&value) {
                ret.push(value);
            }
        }
        ret.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        Ok(ret)
    }

    fn merge(&mut self, facet: &types::SearchFacet) -> Result<types::SearchFacet, repo::Error> {
        if !self.fields.contains_key(&facet.field.id) {
            return Err(repo::Error::ConstraintViolation(format!(
                "facet references missing field `{}`",
                facet.field.id
            )));
        }

        let existing = self
            .facets
            .iter()
            .position(|row| facet.is_registered() && row.id == facet.id);

        let idx = match existing {
            Some(idx) => {
                self.facets[idx] = FacetRow::from_facet(facet.id, facet);
                idx
            }
            None => {
                let id = self.generate_id();
                self.facets.push(FacetRow::from_facet(id, facet));
                self.facets.len() - 1
            }
        };

        self.join(&self.facets[idx])
    }
}

impl repo::QueryBackend for MemoryStore {
    async fn facets(
        &mut self,
        filter: &query::FacetFilter,
    ) -> Result<Vec<types::SearchFacet>, repo::Error> {
        self.select_facets(filter)
    }

    async fn distinct_values(
        &mut self,
        q: &query::DistinctValuesQuery,
    ) -> Result<Vec<query::Value>, repo::Error> {
        self.select_distinct(q)
    }

    async fn merge_facet(
        &mut self,
        facet: &types::SearchFacet,
    ) -> Result<types::SearchFacet, repo::Error> {
        self.merge(facet)
    }
}

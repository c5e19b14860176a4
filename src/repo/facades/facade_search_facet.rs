use log::{debug, trace};
use std::sync::Arc;

use super::FacadeError;
use crate::{
    params,
    query::{self, CachePolicy},
    repo::{self, CachedRows, QueryBackend},
    types,
};

/// Facade answering search facet queries.
///
/// Every operation runs on the session handle passed by the caller and never
/// commits it. Reads issued with [`CachePolicy::Cacheable`] may be answered
/// from the query-result cache, which is shared by all clones of the facade
/// and cleared by [`FacadeSearchFacet::save_facet`]. Reads inside a
/// transaction that has not been committed should use [`CachePolicy::Bypass`].
#[derive(Clone)]
pub struct FacadeSearchFacet {
    cache: Arc<repo::QueryCache>,
    path_match: query::PathMatch,
}

impl Default for FacadeSearchFacet {
    fn default() -> Self {
        Self::new()
    }
}

impl FacadeSearchFacet {
    /// Creates a facade configured from [`params::configurables`].
    pub fn new() -> Self {
        let conf = params::configurables();
        Self::with_settings(conf.query_cache_capacity, conf.path_match)
    }

    pub fn with_settings(cache_capacity: usize, path_match: query::PathMatch) -> Self {
        Self::with_cache(Arc::new(repo::QueryCache::new(cache_capacity)), path_match)
    }

    pub fn with_cache(cache: Arc<repo::QueryCache>, path_match: query::PathMatch) -> Self {
        Self { cache, path_match }
    }

    pub fn cache(&self) -> &repo::QueryCache {
        &self.cache
    }

    pub fn path_match(&self) -> query::PathMatch {
        self.path_match
    }

    /// Returns the facets shown on search whose field applies to `entity_type`.
    pub async fn list_visible_facets(
        &self,
        cx: &mut impl QueryBackend,
        entity_type: types::FieldEntity,
        policy: CachePolicy,
    ) -> Result<Vec<types::SearchFacet>, FacadeError> {
        let facets = self
            .facets(cx, query::FacetFilter::visible_for(entity_type), policy)
            .await?;

        debug!("found {} visible facets for `{entity_type}`", facets.len());

        Ok(facets)
    }

    /// Returns the distinct non-null values found at `field_path`, cast to `value_type`.
    ///
    /// The path must start with `defaultSku.`, `productAttributes.` or `product.`
    /// (see [`query::FieldPath::parse`]), otherwise [`FacadeError::InvalidArgument`]
    /// is returned.
    pub async fn list_distinct_values(
        &self,
        cx: &mut impl QueryBackend,
        field_path: &str,
        value_type: query::ValueType,
        policy: CachePolicy,
    ) -> Result<Vec<query::Value>, FacadeError> {
        let path = query::FieldPath::parse(field_path, self.path_match)?;
        let q = query::DistinctValuesQuery::new(path, value_type);

        let fingerprint = policy
            .is_cacheable()
            .then(|| repo::distinct_values_fingerprint(&q));

        if let Some(fp) = &fingerprint {
            if let Some(CachedRows::Values(values)) = self.cache.get(fp) {
                return Ok(values);
            }
        }

        let generation = self.cache.generation();
        let values = cx.distinct_values(&q).await?;
        trace!("found {} distinct values for `{}`", values.len(), q.path);

        if let Some(fp) = fingerprint {
            self.cache.put(fp, CachedRows::Values(values.clone()), generation);
        }

        Ok(values)
    }

    /// Typed variant of [`FacadeSearchFacet::list_distinct_values`].
    pub async fn list_distinct_field_values<T>(
        &self,
        cx: &mut impl QueryBackend,
        field_path: &str,
        policy: CachePolicy,
    ) -> Result<Vec<T>, FacadeError>
    where
        T: query::FacetValue,
    {
        self.list_distinct_values(cx, field_path, T::VALUE_TYPE, policy)
            .await?
            .into_iter()
            .map(|v| T::from_value(v).map_err(|e| FacadeError::StorageFailure(e.into())))
            .collect()
    }

    /// Stores `facet` by identity and returns the stored copy.
    ///
    /// Transient facets are inserted, registered ones are updated in place. A
    /// registered facet whose row is gone is inserted again under a new id.
    pub async fn save_facet(
        &self,
        cx: &mut impl QueryBackend,
        facet: &types::SearchFacet,
    ) -> Result<types::SearchFacet, FacadeError> {
        let saved = cx.merge_facet(facet).await?;

        self.cache.invalidate();

        debug!(
            "saved facet `{}` (id: {}) on field `{}`",
            saved.label, saved.id, saved.field.property_name
        );

        Ok(saved)
    }

    /// Commits `tx` and drops the results cached while its writes were pending.
    ///
    /// Transactions running [`FacadeSearchFacet::save_facet`] should be
    /// committed through here, otherwise reads issued on other sessions before
    /// the commit stay cached.
    pub async fn commit(&self, tx: repo::Tx<'_>) -> Result<(), FacadeError> {
        tx.commit().await?;
        self.cache.invalidate();
        Ok(())
    }

    /// Returns the facet bound to `field`, if any.
    ///
    /// More than one facet on the same field is reported as
    /// [`FacadeError::AmbiguousResult`].
    pub async fn find_facet_for_field(
        &self,
        cx: &mut impl QueryBackend,
        field: &types::Field,
        policy: CachePolicy,
    ) -> Result<Option<types::SearchFacet>, FacadeError> {
        let mut facets = self
            .facets(cx, query::FacetFilter::for_field(field.id), policy)
            .await?;

        match facets.len() {
            0 | 1 => Ok(facets.pop()),
            count => Err(FacadeError::AmbiguousResult {
                what: format!("field `{}`", field.id),
                count,
            }),
        }
    }

    async fn facets(
        &self,
        cx: &mut impl QueryBackend,
        filter: query::FacetFilter,
        policy: CachePolicy,
    ) -> Result<Vec<types::SearchFacet>, FacadeError> {
        let fingerprint = policy
            .is_cacheable()
            .then(|| repo::facets_fingerprint(&filter));

        if let Some(fp) = &fingerprint {
            if let Some(CachedRows::Facets(facets)) = self.cache.get(fp) {
                return Ok(facets);
            }
        }

        let generation = self.cache.generation();
        let facets = cx.facets(&filter).await?;

        if let Some(fp) = fingerprint {
            self.cache.put(fp, CachedRows::Facets(facets.clone()), generation);
        }

        Ok(facets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{PathMatch, Value, ValueType};
    use crate::repo::{MemoryStore, ProductRow, SkuRow};
    use crate::types::{Field, FieldEntity, SearchFacet};

    struct Catalog {
        store: MemoryStore,
        manufacturer: Field,
        size: Field,
        color: Field,
        model: Field,
    }

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    /// Builds a small catalog with three facets, the color one hidden from search.
    async fn catalog(facade: &FacadeSearchFacet) -> Catalog {
        init_logger();

        let mut store = MemoryStore::new();

        let manufacturer = store.insert_field(Field::new(FieldEntity::Product, "manufacturer"));
        let size = store.insert_field(Field::new(FieldEntity::Sku, "size"));
        let color = store.insert_field(Field::new(FieldEntity::Product, "color"));
        let model = store.insert_field(Field::new(FieldEntity::Product, "model"));

        for facet in [
            SearchFacet::new(manufacturer.clone(), "Manufacturer").with_show_on_search(true),
            SearchFacet::new(size.clone(), "Size").with_show_on_search(true),
            SearchFacet::new(color.clone(), "Color"),
        ] {
            facade.save_facet(&mut store, &facet).await.unwrap();
        }

        store.insert_product(
            ProductRow::new()
                .with("manufacturer", "Acme")
                .with("featured_product", true)
                .with_default_sku(SkuRow::new().with("size", "M").with("retail_price", 10.0))
                .with_attribute("Color", Some("Red")),
        );
        store.insert_product(
            ProductRow::new()
                .with("manufacturer", "Acme")
                .with_default_sku(SkuRow::new().with("size", "L").with("retail_price", 12.5))
                .with_attribute("color", Some("Blue"))
                .with_attribute("Color", Some("Red")),
        );
        store.insert_product(
            ProductRow::new()
                .with("manufacturer", "Globex")
                .with_default_sku(SkuRow::new())
                .with_attribute("COLOR", None)
                .with_attribute("material", Some("Wool")),
        );
        store.insert_product(ProductRow::new());

        Catalog {
            store,
            manufacturer,
            size,
            color,
            model,
        }
    }

    fn facade() -> FacadeSearchFacet {
        FacadeSearchFacet::with_settings(16, PathMatch::Prefix)
    }

    fn labels(facets: &[SearchFacet]) -> Vec<&str> {
        facets.iter().map(|f| f.label.as_str()).collect()
    }

    #[tokio::test]
    async fn visible_facets_by_entity_type() {
        let facade = facade();
        let mut c = catalog(&facade).await;

        let product = facade
            .list_visible_facets(&mut c.store, FieldEntity::Product, CachePolicy::Bypass)
            .await
            .unwrap();
        assert_eq!(labels(&product), vec!["Manufacturer"]);

        let sku = facade
            .list_visible_facets(&mut c.store, FieldEntity::Sku, CachePolicy::Bypass)
            .await
            .unwrap();
        assert_eq!(labels(&sku), vec!["Size"]);

        let offer = facade
            .list_visible_facets(&mut c.store, FieldEntity::Offer, CachePolicy::Bypass)
            .await
            .unwrap();
        assert!(offer.is_empty());
    }

    #[tokio::test]
    async fn hidden_facets_are_never_listed() {
        let facade = facade();
        let mut c = catalog(&facade).await;

        for entity in [
            FieldEntity::Product,
            FieldEntity::Sku,
            FieldEntity::Customer,
            FieldEntity::Order,
            FieldEntity::OrderItem,
            FieldEntity::Offer,
        ] {
            let facets = facade
                .list_visible_facets(&mut c.store, entity, CachePolicy::Cacheable)
                .await
                .unwrap();

            assert!(
                facets
                    .iter()
                    .all(|f| f.show_on_search && f.field.entity_type == entity)
            );
            assert!(facets.iter().all(|f| f.field.id != c.color.id));
        }
    }

    #[tokio::test]
    async fn distinct_default_sku_values() {
        let facade = facade();
        let mut c = catalog(&facade).await;

        let sizes: Vec<String> = facade
            .list_distinct_field_values(&mut c.store, "defaultSku.size", CachePolicy::Bypass)
            .await
            .unwrap();
        assert_eq!(sizes, vec!["L", "M"]);

        let prices: Vec<f64> = facade
            .list_distinct_field_values(&mut c.store, "defaultSku.retailPrice", CachePolicy::Bypass)
            .await
            .unwrap();
        assert_eq!(prices, vec![10.0, 12.5]);
    }

    #[tokio::test]
    async fn distinct_attribute_values_ignore_name_case() {
        let facade = facade();
        let mut c = catalog(&facade).await;

        let colors = facade
            .list_distinct_values(
                &mut c.store,
                "productAttributes.Color",
                ValueType::Text,
                CachePolicy::Bypass,
            )
            .await
            .unwrap();

        assert_eq!(colors, vec![Value::from("Blue"), Value::from("Red")]);
    }

    #[tokio::test]
    async fn distinct_product_values() {
        let facade = facade();
        let mut c = catalog(&facade).await;

        let manufacturers: Vec<String> = facade
            .list_distinct_field_values(&mut c.store, "product.manufacturer", CachePolicy::Bypass)
            .await
            .unwrap();
        assert_eq!(manufacturers, vec!["Acme", "Globex"]);

        let featured: Vec<bool> = facade
            .list_distinct_field_values(&mut c.store, "product.featuredProduct", CachePolicy::Bypass)
            .await
            .unwrap();
        assert_eq!(featured, vec![true]);
    }

    #[tokio::test]
    async fn unknown_path_is_invalid_argument() {
        let facade = facade();
        let mut c = catalog(&facade).await;

        for path in ["unknownpath", "product.weight", "sku.product.model"] {
            let res = facade
                .list_distinct_values(&mut c.store, path, ValueType::Text, CachePolicy::Bypass)
                .await;
            assert!(
                matches!(res, Err(FacadeError::InvalidArgument(_))),
                "path `{path}` should be rejected"
            );
        }
    }

    #[tokio::test]
    async fn substring_matching_accepts_embedded_prefix() {
        let facade = FacadeSearchFacet::with_settings(0, PathMatch::Substring);
        let mut c = catalog(&facade).await;

        // the legacy matching strips the prefix length from the start, so
        // a leading `x` shifts the remainder by one character
        let res = facade
            .list_distinct_values(&mut c.store, "xproduct.model", ValueType::Text, CachePolicy::Bypass)
            .await;
        assert!(matches!(res, Err(FacadeError::InvalidArgument(_))));

        let values = facade
            .list_distinct_values(&mut c.store, "product.manufacturer", ValueType::Text, CachePolicy::Bypass)
            .await
            .unwrap();
        assert_eq!(values.len(), 2);
    }

    #[tokio::test]
    async fn saving_twice_updates_a_single_row() {
        let facade = facade();
        let mut c = catalog(&facade).await;
        let before = c.store.facet_count();

        let created = facade
            .save_facet(&mut c.store, &SearchFacet::new(c.model.clone(), "Model"))
            .await
            .unwrap();
        assert!(created.is_registered());

        assert!(created.can_multiselect);

        let changed = created
            .clone()
            .with_show_on_search(true)
            .with_display_priority(5)
            .with_multiselect(false);
        let updated = facade.save_facet(&mut c.store, &changed).await.unwrap();

        assert_eq!(updated.id, created.id);
        assert!(updated.show_on_search);
        assert!(!updated.can_multiselect);
        assert_eq!(updated.search_display_priority, 5);
        assert_eq!(c.store.facet_count(), before + 1);
    }

    #[tokio::test]
    async fn detached_facet_is_inserted_with_new_id() {
        let facade = facade();
        let mut c = catalog(&facade).await;

        let mut detached = SearchFacet::new(c.model.clone(), "Model");
        detached.id = 9_999;

        let saved = facade.save_facet(&mut c.store, &detached).await.unwrap();

        assert_ne!(saved.id, detached.id);
        assert_eq!(saved.label, "Model");
    }

    #[tokio::test]
    async fn save_with_unknown_field_is_storage_failure() {
        let facade = facade();
        let mut c = catalog(&facade).await;

        let mut field = Field::new(FieldEntity::Product, "url");
        field.id = 1_000;
        let res = facade
            .save_facet(&mut c.store, &SearchFacet::new(field, "Url"))
            .await;

        assert!(matches!(
            res,
            Err(FacadeError::StorageFailure(repo::Error::ConstraintViolation(_)))
        ));
    }

    #[tokio::test]
    async fn find_facet_for_field() {
        let facade = facade();
        let mut c = catalog(&facade).await;

        let found = facade
            .find_facet_for_field(&mut c.store, &c.size, CachePolicy::Cacheable)
            .await
            .unwrap()
            .expect("size facet should exist");
        assert_eq!(found.label, "Size");

        // hidden facets are still found by field
        let hidden = facade
            .find_facet_for_field(&mut c.store, &c.color, CachePolicy::Cacheable)
            .await
            .unwrap();
        assert!(hidden.is_some());

        let missing = facade
            .find_facet_for_field(&mut c.store, &c.model, CachePolicy::Cacheable)
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn duplicated_facet_is_ambiguous() {
        let facade = facade();
        let mut c = catalog(&facade).await;

        facade
            .save_facet(&mut c.store, &SearchFacet::new(c.manufacturer.clone(), "Brand"))
            .await
            .unwrap();

        let res = facade
            .find_facet_for_field(&mut c.store, &c.manufacturer, CachePolicy::Bypass)
            .await;

        assert!(matches!(res, Err(FacadeError::AmbiguousResult { count: 2, .. })));
    }

    #[tokio::test]
    async fn cacheable_reads_are_served_until_save() {
        let facade = facade();
        let mut c = catalog(&facade).await;

        let first = facade
            .list_distinct_values(&mut c.store, "product.manufacturer", ValueType::Text, CachePolicy::Cacheable)
            .await
            .unwrap();

        // rows written behind the facade are not seen by cached reads
        c.store.insert_product(ProductRow::new().with("manufacturer", "Initech"));

        let cached = facade
            .list_distinct_values(&mut c.store, "product.manufacturer", ValueType::Text, CachePolicy::Cacheable)
            .await
            .unwrap();
        assert_eq!(cached, first);

        let fresh = facade
            .list_distinct_values(&mut c.store, "product.manufacturer", ValueType::Text, CachePolicy::Bypass)
            .await
            .unwrap();
        assert_eq!(fresh.len(), 3);

        let stats = facade.cache().stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);

        facade
            .save_facet(&mut c.store, &SearchFacet::new(c.model.clone(), "Model"))
            .await
            .unwrap();

        let after_save = facade
            .list_distinct_values(&mut c.store, "product.manufacturer", ValueType::Text, CachePolicy::Cacheable)
            .await
            .unwrap();
        assert_eq!(after_save.len(), 3);
    }

    /// Backend answering facet reads with rows taken before a save that
    /// completes while the read is still running.
    struct SaveWhileReading<'a> {
        facade: &'a FacadeSearchFacet,
        writer: &'a mut MemoryStore,
        snapshot: Vec<SearchFacet>,
        saved: SearchFacet,
    }

    impl QueryBackend for SaveWhileReading<'_> {
        async fn facets(
            &mut self,
            _filter: &query::FacetFilter,
        ) -> Result<Vec<SearchFacet>, repo::Error> {
            self.facade
                .save_facet(&mut *self.writer, &self.saved)
                .await
                .unwrap();
            Ok(self.snapshot.clone())
        }

        async fn distinct_values(
            &mut self,
            _q: &query::DistinctValuesQuery,
        ) -> Result<Vec<Value>, repo::Error> {
            Ok(vec![])
        }

        async fn merge_facet(&mut self, facet: &SearchFacet) -> Result<SearchFacet, repo::Error> {
            self.writer.merge_facet(facet).await
        }
    }

    #[tokio::test]
    async fn read_overlapping_a_save_is_not_cached() {
        let facade = facade();
        let mut c = catalog(&facade).await;

        let snapshot = facade
            .list_visible_facets(&mut c.store, FieldEntity::Product, CachePolicy::Bypass)
            .await
            .unwrap();

        let mut reader = SaveWhileReading {
            facade: &facade,
            writer: &mut c.store,
            snapshot,
            saved: SearchFacet::new(c.model.clone(), "Model").with_show_on_search(true),
        };
        let during = facade
            .list_visible_facets(&mut reader, FieldEntity::Product, CachePolicy::Cacheable)
            .await
            .unwrap();
        assert_eq!(labels(&during), vec!["Manufacturer"]);
        assert_eq!(facade.cache().stats().entries, 0);

        let after = facade
            .list_visible_facets(&mut c.store, FieldEntity::Product, CachePolicy::Cacheable)
            .await
            .unwrap();
        assert_eq!(labels(&after), vec!["Manufacturer", "Model"]);
    }

    #[tokio::test]
    async fn distinct_values_have_no_duplicates() {
        let facade = facade();
        let mut c = catalog(&facade).await;

        for path in [
            "defaultSku.size",
            "defaultSku.retailPrice",
            "productAttributes.color",
            "product.manufacturer",
            "product.model",
        ] {
            let values = facade
                .list_distinct_values(&mut c.store, path, ValueType::Text, CachePolicy::Bypass)
                .await
                .unwrap();

            for (i, v) in values.iter().enumerate() {
                assert!(!values[i + 1..].contains(v), "duplicate `{v}` for `{path}`");
            }
        }
    }

    /// Tests running against Postgres, schema from `migrations/` and rows from
    /// `fixtures/catalog.sql`. They need `DATABASE_URL` to point to a server
    /// where test databases can be created.
    mod pg {
        use super::*;
        use crate::repo::Database;

        fn field(id: i64, entity_type: FieldEntity, name: &str) -> Field {
            let mut field = Field::new(entity_type, name);
            field.id = id;
            field
        }

        async fn facet_rows(pool: &sqlx::Pool<Database>) -> i64 {
            sqlx::query_scalar("SELECT COUNT(*) FROM search_facet_t")
                .fetch_one(pool)
                .await
                .unwrap()
        }

        #[sqlx::test(fixtures("catalog"))]
        #[ignore = "requires a Postgres DATABASE_URL"]
        async fn visible_facets(pool: sqlx::Pool<Database>) -> sqlx::Result<()> {
            let repo = repo::Repository::new(pool);
            let facade = facade();
            let mut cx = repo.connection();

            let facets = facade
                .list_visible_facets(&mut cx, FieldEntity::Product, CachePolicy::Cacheable)
                .await
                .unwrap();
            assert_eq!(labels(&facets), vec!["Manufacturer"]);
            assert_eq!(facets[0].field.property_name, "manufacturer");

            let facets = facade
                .list_visible_facets(&mut cx, FieldEntity::Sku, CachePolicy::Cacheable)
                .await
                .unwrap();
            assert_eq!(labels(&facets), vec!["Size"]);

            Ok(())
        }

        #[sqlx::test(fixtures("catalog"))]
        #[ignore = "requires a Postgres DATABASE_URL"]
        async fn distinct_values(pool: sqlx::Pool<Database>) -> sqlx::Result<()> {
            let repo = repo::Repository::new(pool);
            let facade = facade();
            let mut cx = repo.connection();

            let sizes: Vec<String> = facade
                .list_distinct_field_values(&mut cx, "defaultSku.size", CachePolicy::Bypass)
                .await
                .unwrap();
            assert_eq!(sizes, vec!["L", "M"]);

            let colors: Vec<String> = facade
                .list_distinct_field_values(&mut cx, "productAttributes.Color", CachePolicy::Bypass)
                .await
                .unwrap();
            assert_eq!(colors, vec!["Blue", "Red"]);

            let manufacturers: Vec<String> = facade
                .list_distinct_field_values(&mut cx, "product.manufacturer", CachePolicy::Bypass)
                .await
                .unwrap();
            assert_eq!(manufacturers, vec!["Acme", "Globex"]);

            let prices: Vec<i64> = facade
                .list_distinct_field_values(&mut cx, "defaultSku.retailPrice", CachePolicy::Bypass)
                .await
                .unwrap();
            assert_eq!(prices, vec![10, 13]);

            let res = facade
                .list_distinct_values(&mut cx, "unknownpath", ValueType::Text, CachePolicy::Bypass)
                .await;
            assert!(matches!(res, Err(FacadeError::InvalidArgument(_))));

            Ok(())
        }

        #[sqlx::test(fixtures("catalog"))]
        #[ignore = "requires a Postgres DATABASE_URL"]
        async fn save_is_upsert_by_identity(pool: sqlx::Pool<Database>) -> sqlx::Result<()> {
            let repo = repo::Repository::new(pool.clone());
            let facade = facade();
            let before = facet_rows(&pool).await;

            let mut tx = repo.transaction().await.unwrap();
            let model = field(4, FieldEntity::Product, "model");
            let created = facade
                .save_facet(&mut tx, &SearchFacet::new(model, "Model"))
                .await
                .unwrap();
            let updated = facade
                .save_facet(&mut tx, &created.clone().with_show_on_search(true))
                .await
                .unwrap();
            facade.commit(tx).await.unwrap();

            assert_eq!(created.id, updated.id);
            assert!(updated.show_on_search);
            assert_eq!(facet_rows(&pool).await, before + 1);

            let mut cx = repo.connection();
            let res = facade
                .save_facet(
                    &mut cx,
                    &SearchFacet::new(field(404, FieldEntity::Product, "url"), "Url"),
                )
                .await;
            assert!(matches!(
                res,
                Err(FacadeError::StorageFailure(repo::Error::ConstraintViolation(_)))
            ));

            Ok(())
        }

        #[sqlx::test(fixtures("catalog"))]
        #[ignore = "requires a Postgres DATABASE_URL"]
        async fn commit_drops_results_cached_before_it(
            pool: sqlx::Pool<Database>,
        ) -> sqlx::Result<()> {
            let repo = repo::Repository::new(pool);
            let facade = facade();
            let model = field(4, FieldEntity::Product, "model");

            let mut tx = repo.transaction().await.unwrap();
            facade
                .save_facet(&mut tx, &SearchFacet::new(model, "Model").with_show_on_search(true))
                .await
                .unwrap();

            // another session caches the state the transaction is about to replace
            let mut cx = repo.connection();
            let pending = facade
                .list_visible_facets(&mut cx, FieldEntity::Product, CachePolicy::Cacheable)
                .await
                .unwrap();
            assert_eq!(labels(&pending), vec!["Manufacturer"]);

            facade.commit(tx).await.unwrap();

            let committed = facade
                .list_visible_facets(&mut cx, FieldEntity::Product, CachePolicy::Cacheable)
                .await
                .unwrap();
            assert_eq!(labels(&committed), vec!["Manufacturer", "Model"]);

            Ok(())
        }

        #[sqlx::test(fixtures("catalog"))]
        #[ignore = "requires a Postgres DATABASE_URL"]
        async fn facet_for_field(pool: sqlx::Pool<Database>) -> sqlx::Result<()> {
            let repo = repo::Repository::new(pool);
            let facade = facade();
            let mut cx = repo.connection();

            let color = facade
                .find_facet_for_field(&mut cx, &field(3, FieldEntity::Product, "color"), CachePolicy::Bypass)
                .await
                .unwrap();
            assert_eq!(color.map(|f| f.label), Some("Color".to_owned()));

            let model = facade
                .find_facet_for_field(&mut cx, &field(4, FieldEntity::Product, "model"), CachePolicy::Bypass)
                .await
                .unwrap();
            assert!(model.is_none());

            let manufacturer = field(1, FieldEntity::Product, "manufacturer");
            facade
                .save_facet(&mut cx, &SearchFacet::new(manufacturer.clone(), "Brand"))
                .await
                .unwrap();
            let res = facade
                .find_facet_for_field(&mut cx, &manufacturer, CachePolicy::Bypass)
                .await;
            assert!(matches!(res, Err(FacadeError::AmbiguousResult { count: 2, .. })));

            Ok(())
        }
    }
}

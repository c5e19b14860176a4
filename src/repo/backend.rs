use std::future::Future;

use crate::{query, repo, types};

/// Query execution boundary used by the facades.
///
/// A backend receives structured requests and returns materialized rows. It
/// never caches: result caching is decided per call by the facade.
pub trait QueryBackend {
    /// Facets matching `filter`, in storage order.
    fn facets(
        &mut self,
        filter: &query::FacetFilter,
    ) -> impl Future<Output = Result<Vec<types::SearchFacet>, repo::Error>>;

    /// Distinct, non-null values at the query path.
    fn distinct_values(
        &mut self,
        q: &query::DistinctValuesQuery,
    ) -> impl Future<Output = Result<Vec<query::Value>, repo::Error>>;

    /// Stores `facet` by identity and returns the stored copy.
    fn merge_facet(
        &mut self,
        facet: &types::SearchFacet,
    ) -> impl Future<Output = Result<types::SearchFacet, repo::Error>>;
}

async fn pg_facets(
    exec: &mut impl repo::AsExec,
    filter: &query::FacetFilter,
) -> Result<Vec<types::SearchFacet>, repo::Error> {
    repo::facets_from_filter(exec, filter)
        .await?
        .into_iter()
        .map(types::SearchFacet::try_from)
        .collect()
}

impl QueryBackend for repo::Cx<'_> {
    async fn facets(
        &mut self,
        filter: &query::FacetFilter,
    ) -> Result<Vec<types::SearchFacet>, repo::Error> {
        pg_facets(self, filter).await
    }

    async fn distinct_values(
        &mut self,
        q: &query::DistinctValuesQuery,
    ) -> Result<Vec<query::Value>, repo::Error> {
        repo::distinct_values(self, q).await
    }

    async fn merge_facet(
        &mut self,
        facet: &types::SearchFacet,
    ) -> Result<types::SearchFacet, repo::Error> {
        repo::facet_merge(self, facet).await?.try_into()
    }
}

impl QueryBackend for repo::Tx<'_> {
    async fn facets(
        &mut self,
        filter: &query::FacetFilter,
    ) -> Result<Vec<types::SearchFacet>, repo::Error> {
        pg_facets(self, filter).await
    }

    async fn distinct_values(
        &mut self,
        q: &query::DistinctValuesQuery,
    ) -> Result<Vec<query::Value>, repo::Error> {
        repo::distinct_values(self, q).await
    }

    async fn merge_facet(
        &mut self,
        facet: &types::SearchFacet,
    ) -> Result<types::SearchFacet, repo::Error> {
        repo::facet_merge(self, facet).await?.try_into()
    }
}

use log::trace;

use super::{FACET_SELECT, FacetQueryBuilder};
use crate::{
    query,
    repo::{self, sql_models},
    types,
};

/// Maps foreign key violations to [`repo::Error::ConstraintViolation`].
fn constraint_or_backend(err: sqlx::Error) -> repo::Error {
    match err.as_database_error() {
        Some(db) if db.is_foreign_key_violation() => {
            repo::Error::ConstraintViolation(db.message().to_owned())
        }
        _ => repo::Error::Backend(err),
    }
}

/// Returns the facets (joined with their field) matching `filter`, ordered by id.
pub async fn facets_from_filter(
    exec: &mut impl repo::AsExec,
    filter: &query::FacetFilter,
) -> Result<Vec<sql_models::SearchFacetRecord>, repo::Error> {
    let (query, values) = FacetQueryBuilder::build(filter)?;

    trace!("facet query: {query}");

    let mut r = sqlx::query_as::<_, sql_models::SearchFacetRecord>(&query);

    for v in values {
        match v {
            query::Value::Integer(v) => r = r.bind(v),
            query::Value::Float(v) => r = r.bind(v),
            query::Value::Text(v) => r = r.bind(v),
            query::Value::Boolean(v) => r = r.bind(v),
        }
    }

    Ok(r.fetch_all(exec.as_exec()).await?)
}

pub async fn facet_find_by_id(
    exec: &mut impl repo::AsExec,
    search_facet_id: i64,
) -> Result<Option<sql_models::SearchFacetRecord>, repo::Error> {
    let query = format!("{FACET_SELECT} WHERE f.search_facet_id = $1");

    let res = sqlx::query_as::<_, sql_models::SearchFacetRecord>(&query)
        .bind(search_facet_id)
        .fetch_optional(exec.as_exec())
        .await?;

    Ok(res)
}

/// Inserts `facet` as a new row, ignoring its id. Returns the generated id.
pub async fn facet_create(
    exec: &mut impl repo::AsExec,
    facet: &types::SearchFacet,
) -> Result<i64, repo::Error> {
    let id: i64 = sqlx::query_scalar(
        r#"INSERT INTO search_facet_t(
            field_id, label, show_on_search,
            search_display_priority, multiselect
        )
        VALUES ($1, $2, $3, $4, $5)
        RETURNING search_facet_id"#,
    )
    .bind(facet.field.id)
    .bind(&facet.label)
    .bind(facet.show_on_search)
    .bind(facet.search_display_priority)
    .bind(facet.can_multiselect)
    .fetch_one(exec.as_exec())
    .await
    .map_err(constraint_or_backend)?;

    Ok(id)
}

/// Overwrites the row identified by `facet.id`. Returns [`None`] if no such row exists.
pub async fn facet_update(
    exec: &mut impl repo::AsExec,
    facet: &types::SearchFacet,
) -> Result<Option<i64>, repo::Error> {
    let id: Option<i64> = sqlx::query_scalar(
        r#"UPDATE search_facet_t SET
            field_id = $2,
            label = $3,
            show_on_search = $4,
            search_display_priority = $5,
            multiselect = $6
        WHERE search_facet_id = $1
        RETURNING search_facet_id"#,
    )
    .bind(facet.id)
    .bind(facet.field.id)
    .bind(&facet.label)
    .bind(facet.show_on_search)
    .bind(facet.search_display_priority)
    .bind(facet.can_multiselect)
    .fetch_optional(exec.as_exec())
    .await
    .map_err(constraint_or_backend)?;

    Ok(id)
}

/// Stores `facet` by identity: registered facets are updated in place, while
/// transient ones, or registered ones whose row no longer exists, are inserted.
/// Returns the stored row re-read with its field.
pub async fn facet_merge(
    exec: &mut impl repo::AsExec,
    facet: &types::SearchFacet,
) -> Result<sql_models::SearchFacetRecord, repo::Error> {
    let id = if facet.is_registered() {
        match facet_update(exec, facet).await? {
            Some(id) => id,
            None => {
                trace!("facet `{}` not stored, inserting as new", facet.id);
                facet_create(exec, facet).await?
            }
        }
    } else {
        facet_create(exec, facet).await?
    };

    facet_find_by_id(exec, id)
        .await?
        .ok_or_else(|| repo::Error::CorruptedRecord(format!("facet `{id}` vanished after save")))
}

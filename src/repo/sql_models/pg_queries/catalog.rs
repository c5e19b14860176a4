use log::trace;
use sqlx::{Row, postgres::PgRow};

use super::DistinctValuesQueryBuilder;
use crate::{query, repo};

/// Returns the distinct non-null values found at the query path, cast to
/// the requested type.
pub async fn distinct_values(
    exec: &mut impl repo::AsExec,
    q: &query::DistinctValuesQuery,
) -> Result<Vec<query::Value>, repo::Error> {
    let (query, values) = DistinctValuesQueryBuilder::build(q)?;

    trace!("distinct values query: {query}");

    let mut r = sqlx::query(&query);

    for v in values {
        match v {
            query::Value::Integer(v) => r = r.bind(v),
            query::Value::Float(v) => r = r.bind(v),
            query::Value::Text(v) => r = r.bind(v),
            query::Value::Boolean(v) => r = r.bind(v),
        }
    }

    let rows = r.fetch_all(exec.as_exec()).await?;

    let mut ret = Vec::with_capacity(rows.len());
    for row in rows {
        if let Some(v) = cast_value(&row, q.value_type)? {
            ret.push(v);
        }
    }

    Ok(ret)
}

fn cast_value(row: &PgRow, value_type: query::ValueType) -> Result<Option<query::Value>, repo::Error> {
    let v = match value_type {
        query::ValueType::Integer => row
            .try_get::<Option<i64>, _>("value")?
            .map(query::Value::Integer),
        query::ValueType::Float => row
            .try_get::<Option<f64>, _>("value")?
            .map(query::Value::Float),
        query::ValueType::Text => row
            .try_get::<Option<String>, _>("value")?
            .map(query::Value::Text),
        query::ValueType::Boolean => row
            .try_get::<Option<bool>, _>("value")?
            .map(query::Value::Boolean),
    };
    Ok(v)
}

use crate::query::{
    self, ClausesCompiler, CompileClause, CompiledClause, DistinctValuesQuery, FacetFilter,
    FieldPath, IsSupportedOp, Op, Value, ValueType,
};

/// Facet columns joined with their field, in `SearchFacetRecord` layout
pub const FACET_SELECT: &str = r#"SELECT
            f.search_facet_id, f.label, f.show_on_search,
            f.search_display_priority, f.multiselect,
            fd.field_id, fd.entity_type, fd.property_name,
            fd.abbreviation, fd.searchable
        FROM search_facet_t f
        JOIN field_t fd ON fd.field_id = f.field_id"#;

/// Maps operations to Postgres predicates with numbered placeholders.
pub struct PgClauseMapper {
    next: usize,
}

impl Default for PgClauseMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl PgClauseMapper {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    fn placeholder(&mut self) -> String {
        let p = format!("${}", self.next);
        self.next += 1;
        p
    }
}

impl CompileClause for PgClauseMapper {
    fn compile_clause<V>(&mut self, field: &str, op: Op<V>) -> Result<CompiledClause, query::Error>
    where
        V: Into<Value> + IsSupportedOp + Clone,
    {
        let values = op.values();

        let clause = match &op {
            Op::Eq(_) => format!("{field} = {}", self.placeholder()),
            Op::Neq(_) => format!("{field} <> {}", self.placeholder()),
            Op::In(items) if items.is_empty() => "FALSE".to_owned(),
            Op::In(items) => {
                let placeholders: Vec<String> = items.iter().map(|_| self.placeholder()).collect();
                format!("{field} IN ({})", placeholders.join(", "))
            }
        };

        Ok(CompiledClause::new(clause, values))
    }
}

fn where_clause(clauses: &[String]) -> String {
    if clauses.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", clauses.join(" AND "))
    }
}

pub fn sql_type(value_type: ValueType) -> &'static str {
    match value_type {
        ValueType::Integer => "BIGINT",
        ValueType::Float => "DOUBLE PRECISION",
        ValueType::Text => "TEXT",
        ValueType::Boolean => "BOOLEAN",
    }
}

pub struct FacetQueryBuilder;

impl FacetQueryBuilder {
    pub fn build(filter: &FacetFilter) -> Result<(String, Vec<Value>), query::Error> {
        let mut mapper = PgClauseMapper::new();

        let res = ClausesCompiler::new()
            .opt_expr("f.show_on_search", filter.show_on_search.clone(), &mut mapper)
            .opt_expr("fd.entity_type", filter.entity_type.clone(), &mut mapper)
            .opt_expr("fd.field_id", filter.field_id.clone(), &mut mapper)
            .compile()?;

        let query = format!(
            "{FACET_SELECT}{} ORDER BY f.search_facet_id",
            where_clause(&res.clauses)
        );

        Ok((query, res.values))
    }
}

pub struct DistinctValuesQueryBuilder;

impl DistinctValuesQueryBuilder {
    pub fn build(q: &DistinctValuesQuery) -> Result<(String, Vec<Value>), query::Error> {
        let mut mapper = PgClauseMapper::new();
        let compiler = ClausesCompiler::new();

        // Column names only come from the property tables in `query::path`
        let (from, column, compiler) = match &q.path {
            FieldPath::DefaultSku(prop) => (
                "product_t p JOIN sku_t s ON s.sku_id = p.default_sku_id",
                format!("s.{}", prop.column()),
                compiler,
            ),
            FieldPath::ProductAttribute(name) => (
                "product_t p JOIN product_attribute_t a ON a.product_id = p.product_id",
                "a.value".to_owned(),
                compiler.expr("LOWER(a.name)", Op::Eq(name.clone()), &mut mapper),
            ),
            FieldPath::Product(prop) => ("product_t p", format!("p.{}", prop.column()), compiler),
        };

        let res = compiler.raw(&format!("{column} IS NOT NULL")).compile()?;

        let query = format!(
            "SELECT DISTINCT CAST({column} AS {}) AS value FROM {from}{} ORDER BY 1",
            sql_type(q.value_type),
            where_clause(&res.clauses),
        );

        Ok((query, res.values))
    }
}

mod search_facet_record;
pub use search_facet_record::*;

mod pg_queries;
pub use pg_queries::*;

#[derive(thiserror::Error, Debug)]
pub enum FacadeError {
    #[error("invalid argument :: {0}")]
    InvalidArgument(#[from] crate::query::Error),
    #[error("ambiguous result: {count} rows match {what}")]
    AmbiguousResult { what: String, count: usize },
    #[error("storage failure :: {0}")]
    StorageFailure(#[from] crate::repo::Error),
}

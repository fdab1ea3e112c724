use thiserror::Error;

/// Fatal transform failures. Either one aborts the whole transform; no
/// partially built scene is ever returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    #[error("duplicate id: {0}")]
    DuplicateId(String),

    #[error("a {kind} is missing an id")]
    MissingId { kind: &'static str },
}

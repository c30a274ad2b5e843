use thiserror::Error;

/// Failures surfaced to the caller of source selection and resolution.
///
/// Individual alternate or extractor failures never show up here, they are
/// logged where they happen.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("no source selected to play")]
    NoSourceSelected,

    #[error("could not find a playable link on {host}")]
    UnresolvableSource { host: String },
}

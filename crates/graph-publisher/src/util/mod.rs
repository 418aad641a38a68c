//! Assorted utility functions (missing batteries).
mod std_ext;

pub(crate) mod url;

pub(crate) mod prelude {
    pub(crate) use super::std_ext::ErrorExt as _;
    pub(crate) use super::url::UrlExt as _;
}

pub type DynError = dyn std::error::Error + Send + Sync;

mod cli;
mod config;
mod error;
mod graph;
mod observability;
mod relay;
mod util;

pub mod facebook;
pub mod http;
pub mod instagram;
pub mod reddit;

pub use crate::error::*;
pub use cli::*;
pub use config::*;
pub use observability::*;

mod prelude {
    pub(crate) use crate::error::prelude::*;
    pub(crate) use crate::http::prelude::*;
    pub(crate) use crate::observability::logging::prelude::*;
    pub(crate) use crate::util::prelude::*;
}

use crate::{facebook, instagram, observability, reddit, relay};
use serde::de::DeserializeOwned;

pub struct Config {
    pub(crate) instagram: Option<instagram::Config>,
    pub(crate) facebook: Option<facebook::Config>,
    pub(crate) reddit: reddit::Config,
    pub(crate) relay: relay::Config,
    pub(crate) metrics: observability::metrics::Config,
}

impl Config {
    pub fn load_or_panic() -> Config {
        Self {
            instagram: from_env_opt_or_panic(instagram::Config::ENV_PREFIX),
            facebook: from_env_opt_or_panic(facebook::Config::ENV_PREFIX),
            reddit: from_env_or_panic(reddit::Config::ENV_PREFIX),
            relay: from_env_or_panic(relay::Config::ENV_PREFIX),
            metrics: from_env_or_panic("METRICS_"),
        }
    }

    pub fn metrics(&self) -> &observability::metrics::Config {
        &self.metrics
    }
}

pub(crate) fn from_env_or_panic<T: DeserializeOwned>(prefix: &str) -> T {
    from_vars_or_panic(prefix, std::env::vars())
}

/// Same as [`from_env_or_panic`], but the section is optional. It is considered
/// absent if there are no env vars with the given prefix at all.
pub(crate) fn from_env_opt_or_panic<T: DeserializeOwned>(prefix: &str) -> Option<T> {
    from_vars_opt_or_panic(prefix, std::env::vars())
}

fn from_vars_opt_or_panic<T: DeserializeOwned>(
    prefix: &str,
    vars: impl IntoIterator<Item = (String, String)>,
) -> Option<T> {
    let vars: Vec<_> = vars
        .into_iter()
        .filter(|(key, _)| key.starts_with(prefix))
        .collect();

    if vars.is_empty() {
        return None;
    }

    Some(from_vars_or_panic(prefix, vars))
}

fn from_vars_or_panic<T: DeserializeOwned>(
    prefix: &str,
    vars: impl IntoIterator<Item = (String, String)>,
) -> T {
    envy::prefixed(prefix).from_iter(vars).unwrap_or_else(|err| {
        panic!(
            "BUG: Couldn't load config from environment for {}: {:#?}",
            std::any::type_name::<T>(),
            err
        );
    })
}

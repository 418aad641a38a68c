//! Bits shared by the clients of the Facebook Graph API.
use crate::util;

util::url::def!(graph_facebook_com, "https://graph.facebook.com/v21.0");

/// The Graph API version is pinned in the URL. Every config section that
/// talks to the Graph API may override it (e.g. to point to a mock server).
pub(crate) fn default_api_url() -> url::Url {
    graph_facebook_com::<&str>([])
}

use crate::prelude::*;
use crate::Result;
use easy_ext::ext;

/// Defines a function, that accepts a list of path segments and returns a URL
macro_rules! def {
    ($vis:vis $ident:ident, $url:literal) => {
        $vis fn $ident<T: AsRef<str>>(segments: impl IntoIterator<Item = T>) -> ::url::Url {
            let mut url: ::url::Url = $url.parse().unwrap();
            url.path_segments_mut().unwrap().pop_if_empty().extend(segments);
            url
        }
    };
}

pub(crate) use def;

#[ext(UrlExt)]
pub(crate) impl url::Url {
    /// Appends the given path segments to the URL. Each segment is
    /// percent-encoded, so it can't escape into the parent path.
    fn join_segments<T: AsRef<str>>(&self, segments: impl IntoIterator<Item = T>) -> Result<url::Url> {
        let mut url = self.clone();

        url.path_segments_mut()
            .ok()
            .fatal_ctx(|| format!("URL can't be used as a base: {self}"))?
            .pop_if_empty()
            .extend(segments);

        Ok(url)
    }
}

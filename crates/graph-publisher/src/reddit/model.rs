//! Subset of the reddit listing JSON that is needed to find image posts.
use serde::Deserialize;

/// File extensions of the links that are treated as images
const IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".png", ".gif"];

#[derive(Debug, Deserialize)]
pub(crate) struct Listing {
    pub(crate) data: ListingData,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListingData {
    pub(crate) children: Vec<Thing>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Thing {
    pub(crate) data: RawPost,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawPost {
    /// Self posts and some other kinds of posts have no external URL
    #[serde(default)]
    pub(crate) url: Option<String>,
    pub(crate) title: String,
}

/// A post that links directly to an image file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePost {
    pub url: String,
    pub title: String,
}

impl Listing {
    /// Returns the first post in the listing order that links to an image
    pub(crate) fn first_image_post(self) -> Option<ImagePost> {
        self.data.children.into_iter().find_map(|thing| {
            let RawPost { url, title } = thing.data;
            let url = url?;
            is_image_url(&url).then_some(ImagePost { url, title })
        })
    }
}

fn is_image_url(url: &str) -> bool {
    let url = url.to_lowercase();
    IMAGE_EXTENSIONS.iter().any(|ext| url.ends_with(ext))
}

use chrono::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagePhoto {
    /// Publicly reachable URL of the photo
    pub url: String,
    pub caption: String,

    /// The photo is published right away if this is `None`. Facebook accepts
    /// times between 10 minutes and 30 days in the future.
    pub scheduled_publish_time: Option<DateTime<Utc>>,
}

impl PagePhoto {
    /// Query parameters of the request except for the access token
    pub(crate) fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("caption", self.caption.clone()),
            ("url", self.url.clone()),
            // A photo can't be scheduled if it's already published
            ("published", self.scheduled_publish_time.is_none().to_string()),
        ];

        if let Some(time) = self.scheduled_publish_time {
            query.push(("scheduled_publish_time", time.timestamp().to_string()));
        }

        query
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoPostResult {
    /// ID of the photo object
    pub id: String,

    /// ID of the page post that contains the photo. It is absent for
    /// unpublished photos.
    pub post_id: Option<String>,
}

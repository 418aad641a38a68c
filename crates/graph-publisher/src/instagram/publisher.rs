use super::{
    ContainerHandle, InstagramError, PublishObserver, PublishRequest, PublishResult,
    PublishStage, TracingObserver,
};
use crate::http::{self, ApiPayload};
use crate::prelude::*;
use crate::{err, Error, Result};
use std::sync::Arc;

/// Performs the two-step publishing flow. Keeps no state between the calls,
/// so a single instance may be shared by concurrent publishing tasks.
pub struct MediaPublisher {
    http: http::Client,
    graph_api_url: url::Url,
    observer: Arc<dyn PublishObserver>,
}

impl MediaPublisher {
    pub fn new(http: http::Client, graph_api_url: url::Url) -> Self {
        Self {
            http,
            graph_api_url,
            observer: Arc::new(TracingObserver),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn PublishObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Creates a media container and publishes it. There are no retries.
    /// The publishing isn't idempotent, so retrying the whole flow may
    /// create a duplicate post.
    #[instrument(skip_all, fields(account = %request.instagram_account_id))]
    pub async fn publish(&self, request: &PublishRequest) -> Result<PublishResult> {
        let container = self
            .create_container(request)
            .await
            .map_err(|err| self.report(PublishStage::ContainerCreation, err))?;

        self.publish_container(request, &container)
            .await
            .map_err(|err| self.report(PublishStage::Publish, err))
    }

    /// Step 1. Creates a container for the image
    pub async fn create_container(&self, request: &PublishRequest) -> Result<ContainerHandle> {
        let url = self
            .graph_api_url
            .join_segments([request.instagram_account_id.as_str(), "media"])?;

        let response = self
            .http
            .post(url)
            .form(&[
                ("image_url", request.image_url.as_str()),
                ("caption", request.caption.as_str()),
                ("access_token", request.access_token.as_str()),
            ])
            .send_raw()
            .await?;

        let status = response.status;
        let payload = ApiPayload::from_body(&response.body);

        if !status.is_success() {
            return Err(err!(InstagramError::ContainerCreation { status, payload }));
        }

        let creation_id = payload
            .str_field("id")
            .filter(|id| !id.is_empty())
            .map(ToOwned::to_owned);

        let Some(creation_id) = creation_id else {
            return Err(err!(InstagramError::MalformedContainer { status, payload }));
        };

        info!(%creation_id, "Created Instagram media container");

        Ok(ContainerHandle::new(creation_id))
    }

    /// Step 2. Publishes the container created at step 1
    pub async fn publish_container(
        &self,
        request: &PublishRequest,
        container: &ContainerHandle,
    ) -> Result<PublishResult> {
        let url = self
            .graph_api_url
            .join_segments([request.instagram_account_id.as_str(), "media_publish"])?;

        let response = self
            .http
            .post(url)
            .form(&[
                ("creation_id", container.creation_id()),
                ("access_token", request.access_token.as_str()),
            ])
            .send_raw()
            .await?;

        let status = response.status;

        match ApiPayload::from_body(&response.body) {
            ApiPayload::Json(json) if status.is_success() => {
                let result = PublishResult::new(json);
                info!(media_id = result.media_id(), "Published Instagram media");
                Ok(result)
            }
            payload => Err(err!(InstagramError::Publish { status, payload })),
        }
    }

    fn report(&self, stage: PublishStage, err: Error) -> Error {
        self.observer.on_failure(stage, &err);
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use assert_matches::assert_matches;
    use expect_test::expect;
    use parking_lot::Mutex;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Default)]
    struct RecordingObserver {
        failures: Mutex<Vec<(PublishStage, String)>>,
    }

    impl PublishObserver for RecordingObserver {
        fn on_failure(&self, stage: PublishStage, err: &Error) {
            self.failures.lock().push((stage, err.kind().to_string()));
        }
    }

    struct Fixture {
        server: MockServer,
        observer: Arc<RecordingObserver>,
        publisher: MediaPublisher,
    }

    impl Fixture {
        async fn new() -> Self {
            let server = MockServer::start().await;
            let observer = Arc::new(RecordingObserver::default());
            let graph_api_url = server.uri().parse().unwrap();
            let publisher = MediaPublisher::new(http::create_client().unwrap(), graph_api_url)
                .with_observer(observer.clone());

            Self {
                server,
                observer,
                publisher,
            }
        }

        fn failures(&self) -> Vec<(PublishStage, String)> {
            self.observer.failures.lock().clone()
        }
    }

    fn request() -> PublishRequest {
        PublishRequest {
            image_url: "https://x/img.png".to_owned(),
            caption: "hi".to_owned(),
            access_token: "tok".to_owned(),
            instagram_account_id: "123".to_owned(),
        }
    }

    fn unwrap_instagram_err(err: &Error) -> &InstagramError {
        match err.kind() {
            ErrorKind::Instagram { source } => source,
            kind => panic!("Expected an Instagram error, got: {kind:?}"),
        }
    }

    #[test_log::test(tokio::test)]
    async fn publishes_created_container() {
        let fixture = Fixture::new().await;

        Mock::given(method("POST"))
            .and(path("/123/media"))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .and(body_string_contains("image_url=https%3A%2F%2Fx%2Fimg.png"))
            .and(body_string_contains("caption=hi"))
            .and(body_string_contains("access_token=tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "CID1" })))
            .expect(1)
            .mount(&fixture.server)
            .await;

        Mock::given(method("POST"))
            .and(path("/123/media_publish"))
            .and(body_string_contains("creation_id=CID1"))
            .and(body_string_contains("access_token=tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "POST1" })))
            .expect(1)
            .mount(&fixture.server)
            .await;

        let result = fixture.publisher.publish(&request()).await.unwrap();

        assert_eq!(result.as_json(), &json!({ "id": "POST1" }));
        assert_eq!(result.media_id(), Some("POST1"));
        assert!(fixture.failures().is_empty());
    }

    #[test_log::test(tokio::test(flavor = "multi_thread", worker_threads = 2))]
    async fn concurrent_publishes_share_one_publisher() {
        let fixture = Fixture::new().await;

        Mock::given(method("POST"))
            .and(path("/123/media"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "CID1" })))
            .expect(2)
            .mount(&fixture.server)
            .await;

        Mock::given(method("POST"))
            .and(path("/123/media_publish"))
            .and(body_string_contains("creation_id=CID1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "POST1" })))
            .expect(2)
            .mount(&fixture.server)
            .await;

        let publisher = Arc::new(fixture.publisher);

        let spawn_publish = |publisher: Arc<MediaPublisher>| {
            tokio::spawn(async move { publisher.publish(&request()).await })
        };

        let first = spawn_publish(publisher.clone());
        let second = spawn_publish(publisher);

        let (first, second) = tokio::try_join!(first, second).unwrap();

        assert_eq!(first.unwrap().as_json(), &json!({ "id": "POST1" }));
        assert_eq!(second.unwrap().as_json(), &json!({ "id": "POST1" }));
        assert!(fixture.observer.failures.lock().is_empty());
    }

    #[test_log::test(tokio::test)]
    async fn result_is_passed_through_unchanged() {
        let fixture = Fixture::new().await;

        let publish_response = json!({
            "id": "POST1",
            "extra": { "nested": [1, 2, 3], "flag": null },
        });

        Mock::given(method("POST"))
            .and(path("/123/media"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "CID1" })))
            .mount(&fixture.server)
            .await;

        Mock::given(method("POST"))
            .and(path("/123/media_publish"))
            .respond_with(ResponseTemplate::new(200).set_body_json(publish_response.clone()))
            .mount(&fixture.server)
            .await;

        let result = fixture.publisher.publish(&request()).await.unwrap();

        assert_eq!(result.into_json(), publish_response);
    }

    #[test_log::test(tokio::test)]
    async fn container_creation_failure_skips_publishing() {
        let fixture = Fixture::new().await;

        Mock::given(method("POST"))
            .and(path("/123/media"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(json!({ "error": { "message": "bad image" } })),
            )
            .expect(1)
            .mount(&fixture.server)
            .await;

        Mock::given(method("POST"))
            .and(path("/123/media_publish"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "POST1" })))
            .expect(0)
            .mount(&fixture.server)
            .await;

        let err = fixture.publisher.publish(&request()).await.unwrap_err();

        assert!(err.to_string().contains("bad image"));

        let instagram_err = unwrap_instagram_err(&err);
        assert_eq!(instagram_err.stage(), PublishStage::ContainerCreation);
        assert_matches!(
            instagram_err,
            InstagramError::ContainerCreation { status, .. } if status.as_u16() == 400
        );

        expect![[r#"
            [
                (
                    ContainerCreation,
                    "Container creation failed (HTTP status: 400 Bad Request): {\"error\":{\"message\":\"bad image\"}}",
                ),
            ]
        "#]]
        .assert_debug_eq(&fixture.failures());
    }

    #[test_log::test(tokio::test)]
    async fn publish_failure_is_not_a_container_error() {
        let fixture = Fixture::new().await;

        Mock::given(method("POST"))
            .and(path("/123/media"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "CID1" })))
            .expect(1)
            .mount(&fixture.server)
            .await;

        Mock::given(method("POST"))
            .and(path("/123/media_publish"))
            .and(body_string_contains("creation_id=CID1"))
            .respond_with(
                ResponseTemplate::new(500)
                    .set_body_json(json!({ "error": { "message": "try later" } })),
            )
            .expect(1)
            .mount(&fixture.server)
            .await;

        let err = fixture.publisher.publish(&request()).await.unwrap_err();

        let instagram_err = unwrap_instagram_err(&err);
        assert_eq!(instagram_err.stage(), PublishStage::Publish);
        assert_matches!(instagram_err, InstagramError::Publish { .. });
        assert_eq!(
            instagram_err.payload(),
            &ApiPayload::Json(json!({ "error": { "message": "try later" } }))
        );

        let failures = fixture.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, PublishStage::Publish);
    }

    #[test_log::test(tokio::test)]
    async fn missing_creation_id_is_a_container_error() {
        let fixture = Fixture::new().await;

        Mock::given(method("POST"))
            .and(path("/123/media"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "ok" })))
            .expect(1)
            .mount(&fixture.server)
            .await;

        Mock::given(method("POST"))
            .and(path("/123/media_publish"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&fixture.server)
            .await;

        let err = fixture.publisher.publish(&request()).await.unwrap_err();

        let instagram_err = unwrap_instagram_err(&err);
        assert_eq!(instagram_err.stage(), PublishStage::ContainerCreation);

        expect![[r#"Container creation returned no usable `id` (HTTP status: 200 OK): {"status":"ok"}"#]]
            .assert_eq(&instagram_err.to_string());
    }

    #[test_log::test(tokio::test)]
    async fn empty_creation_id_is_a_container_error() {
        let fixture = Fixture::new().await;

        Mock::given(method("POST"))
            .and(path("/123/media"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "" })))
            .mount(&fixture.server)
            .await;

        Mock::given(method("POST"))
            .and(path("/123/media_publish"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&fixture.server)
            .await;

        let err = fixture.publisher.publish(&request()).await.unwrap_err();

        assert_matches!(
            unwrap_instagram_err(&err),
            InstagramError::MalformedContainer { .. }
        );
    }

    #[test_log::test(tokio::test)]
    async fn non_json_error_body_is_embedded_as_text() {
        let fixture = Fixture::new().await;

        Mock::given(method("POST"))
            .and(path("/123/media"))
            .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
            .mount(&fixture.server)
            .await;

        let err = fixture.publisher.publish(&request()).await.unwrap_err();

        expect!["Container creation failed (HTTP status: 502 Bad Gateway): <html>Bad Gateway</html>"]
            .assert_eq(&unwrap_instagram_err(&err).to_string());
    }

    #[test_log::test(tokio::test)]
    async fn non_json_publish_response_is_a_publish_error() {
        let fixture = Fixture::new().await;

        Mock::given(method("POST"))
            .and(path("/123/media"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "CID1" })))
            .mount(&fixture.server)
            .await;

        Mock::given(method("POST"))
            .and(path("/123/media_publish"))
            .respond_with(ResponseTemplate::new(200).set_body_string("done"))
            .mount(&fixture.server)
            .await;

        let err = fixture.publisher.publish(&request()).await.unwrap_err();

        assert_matches!(
            unwrap_instagram_err(&err),
            InstagramError::Publish { payload: ApiPayload::Text(text), .. } if text == "done"
        );
    }

    #[test_log::test(tokio::test)]
    async fn transport_failure_is_reported_with_the_stage() {
        let fixture = Fixture::new().await;

        // Nothing listens on the discard port
        let publisher = MediaPublisher::new(
            http::create_client().unwrap(),
            "http://127.0.0.1:9".parse().unwrap(),
        )
        .with_observer(fixture.observer.clone());

        let err = publisher.publish(&request()).await.unwrap_err();

        assert_matches!(err.kind(), ErrorKind::HttpClient { .. });

        let failures = fixture.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, PublishStage::ContainerCreation);
    }

    #[test_log::test(tokio::test)]
    async fn account_id_is_escaped_in_the_path() {
        let fixture = Fixture::new().await;

        Mock::given(method("POST"))
            .and(path("/1%2F2/media"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "CID1" })))
            .expect(1)
            .mount(&fixture.server)
            .await;

        let request = PublishRequest {
            instagram_account_id: "1/2".to_owned(),
            ..request()
        };

        let container = fixture.publisher.create_container(&request).await.unwrap();

        assert_eq!(container.creation_id(), "CID1");
    }
}

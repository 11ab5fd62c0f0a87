//! SDKMAN! vendor API announcer
//!
//! A release is published in up to three calls: register the version, make
//! it the candidate's default (major releases only), then broadcast it.

use async_trait::async_trait;
use herald_core::{Layer, ReleaseContext, ReleaseModel, SdkmanConfig, context, keys};
use herald_engine::Engine;
use indexmap::IndexMap;
use serde_json::json;
use std::sync::Arc;

use super::announce;
use crate::error::{SendError, StageError};
use crate::processor::{Delivery, DeliveryOptions, Message, Processor, Rendered, TargetKind};
use crate::sender::{Sender, check_status, endpoint, http_client};

pub struct SdkmanAnnouncer {
    config: SdkmanConfig,
    sender: Arc<dyn Sender>,
}

impl SdkmanAnnouncer {
    pub const NAME: &'static str = "sdkman";

    pub fn new(config: SdkmanConfig) -> Self {
        let sender = Arc::new(SdkmanSender::new(config.clone()));
        Self { config, sender }
    }

    pub fn with_sender(config: SdkmanConfig, sender: Arc<dyn Sender>) -> Self {
        Self { config, sender }
    }
}

#[async_trait]
impl Processor for SdkmanAnnouncer {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn kind(&self) -> TargetKind {
        TargetKind::Announcer
    }

    fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    fn describe(&self) -> IndexMap<String, String> {
        let mut props = IndexMap::new();
        props.insert("enabled".to_string(), self.config.enabled.to_string());
        props.insert(
            "consumerKey".to_string(),
            self.config.resolved_consumer_key().masked().to_string(),
        );
        props.insert(
            "consumerToken".to_string(),
            self.config.resolved_consumer_token().masked().to_string(),
        );
        if let Some(candidate) = &self.config.candidate {
            props.insert("candidate".to_string(), candidate.clone());
        }
        props.insert("major".to_string(), self.config.major.to_string());
        props.insert("apiHost".to_string(), self.config.api_host().to_string());
        if let Some(url) = &self.config.release_notes_url {
            props.insert("releaseNotesUrl".to_string(), url.clone());
        }
        props
    }

    fn build_context(&self, model: &ReleaseModel) -> Result<ReleaseContext, StageError> {
        self.config
            .consumer_key
            .require("sdkman.consumerKey", SdkmanConfig::CONSUMER_KEY_ENV)?;
        self.config
            .consumer_token
            .require("sdkman.consumerToken", SdkmanConfig::CONSUMER_TOKEN_ENV)?;

        let candidate = self
            .config
            .candidate
            .as_deref()
            .unwrap_or(&model.project.name);
        let target = Layer::new(Self::NAME).with(keys::SDKMAN_CANDIDATE, candidate);

        let ctx = context::build(
            &model.project,
            &model.release,
            model.distribution.artifacts.first(),
            &model.distribution.name,
            target,
        );
        ctx.require_keys(&[keys::ARTIFACT_URL])?;
        Ok(ctx)
    }

    fn render(&self, engine: &Engine, context: &ReleaseContext) -> Result<Rendered, StageError> {
        let link = self
            .config
            .release_notes_url
            .as_deref()
            .map(|raw| engine.render_field(raw, context, "releaseNotesUrl"))
            .transpose()
            .map_err(|e| StageError::template("releaseNotesUrl", e))?;

        Ok(Rendered::Message(Message {
            channel: context.require_str(keys::SDKMAN_CANDIDATE)?.to_string(),
            subject: context.require_str(keys::PROJECT_VERSION)?.to_string(),
            body: context.require_str(keys::ARTIFACT_URL)?.to_string(),
            link,
        }))
    }

    async fn deliver(
        &self,
        rendered: Rendered,
        options: &DeliveryOptions,
    ) -> Result<Delivery, StageError> {
        announce(Self::NAME, self.sender.as_ref(), rendered, options).await
    }
}

/// Talks to the SDKMAN! vendor API.
///
/// Expects `channel` = candidate, `subject` = version, `body` = download URL.
/// The announcement links to `link` when present, else to the download URL.
pub struct SdkmanSender {
    config: SdkmanConfig,
}

impl SdkmanSender {
    pub fn new(config: SdkmanConfig) -> Self {
        Self { config }
    }

    async fn call(
        &self,
        request: reqwest::RequestBuilder,
        key: &str,
        token: &str,
        payload: serde_json::Value,
    ) -> Result<(), SendError> {
        let response = request
            .header("Consumer-Key", key)
            .header("Consumer-Token", token)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&payload)
            .send()
            .await?;
        check_status(response).await
    }
}

#[async_trait]
impl Sender for SdkmanSender {
    async fn send(&self, message: &Message) -> Result<(), SendError> {
        let key = self.config.resolved_consumer_key();
        let key = key.expose().ok_or_else(|| SendError::Credentials {
            name: "sdkman.consumerKey".to_string(),
        })?;
        let token = self.config.resolved_consumer_token();
        let token = token.expose().ok_or_else(|| SendError::Credentials {
            name: "sdkman.consumerToken".to_string(),
        })?;

        let client = http_client()?;
        let api_host = self.config.api_host();
        let candidate = &message.channel;
        let version = &message.subject;
        let announced_url = message.link.as_deref().unwrap_or(&message.body);

        self.call(
            client.post(endpoint(api_host, "release")?),
            key,
            token,
            json!({ "candidate": candidate, "version": version, "url": message.body }),
        )
        .await?;

        if self.config.major {
            self.call(
                client.put(endpoint(api_host, "default")?),
                key,
                token,
                json!({ "candidate": candidate, "version": version }),
            )
            .await?;
        }

        self.call(
            client.post(endpoint(api_host, "announce")?),
            key,
            token,
            json!({
                "candidate": candidate,
                "version": version,
                "hashtag": candidate,
                "url": announced_url,
            }),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sender::RecordingSender;
    use herald_core::{Artifact, Distribution, GitHost, Project, ReleaseInfo, Repository, Secret};
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const URL: &str = "https://github.com/acme/app/releases/download/v2.3.0/app-2.3.0.zip";

    fn model() -> ReleaseModel {
        ReleaseModel {
            project: Project::new("app", "2.3.0"),
            release: ReleaseInfo::new(Repository::new(GitHost::Github, "acme", "app"), "v2.3.0"),
            distribution: Distribution {
                name: "app".to_string(),
                artifacts: vec![Artifact::new("dist/app-2.3.0.zip")],
            },
        }
    }

    fn config(api_host: &str, major: bool) -> SdkmanConfig {
        SdkmanConfig {
            enabled: true,
            consumer_key: Secret::new("key"),
            consumer_token: Secret::new("token"),
            candidate: None,
            major,
            api_host: Some(api_host.to_string()),
            release_notes_url: None,
        }
    }

    fn message() -> Message {
        Message {
            channel: "app".to_string(),
            subject: "2.3.0".to_string(),
            body: URL.to_string(),
            link: None,
        }
    }

    #[test]
    fn test_render_maps_release_facts() {
        let announcer = SdkmanAnnouncer::new(config("https://vendors.sdkman.io", true));
        let ctx = announcer.build_context(&model()).unwrap();
        let rendered = announcer.render(&Engine::default(), &ctx).unwrap();
        assert_eq!(rendered, Rendered::Message(message()));
    }

    #[test]
    fn test_release_notes_url_is_rendered() {
        let announcer = SdkmanAnnouncer::new(SdkmanConfig {
            release_notes_url: Some("https://app.acme.io/notes/{{projectVersion}}".to_string()),
            ..config("https://vendors.sdkman.io", true)
        });
        let ctx = announcer.build_context(&model()).unwrap();
        let Rendered::Message(message) = announcer.render(&Engine::default(), &ctx).unwrap() else {
            panic!("sdkman renders a message");
        };
        assert_eq!(message.body, URL);
        assert_eq!(message.link.as_deref(), Some("https://app.acme.io/notes/2.3.0"));
    }

    #[test]
    fn test_candidate_override() {
        let announcer = SdkmanAnnouncer::new(SdkmanConfig {
            candidate: Some("appcli".to_string()),
            ..config("https://vendors.sdkman.io", true)
        });
        let ctx = announcer.build_context(&model()).unwrap();
        assert_eq!(ctx.get_str(keys::SDKMAN_CANDIDATE), Some("appcli"));
    }

    #[test]
    fn test_requires_an_artifact() {
        let mut model = model();
        model.distribution.artifacts.clear();
        let announcer = SdkmanAnnouncer::new(config("https://vendors.sdkman.io", true));
        let err = announcer.build_context(&model).unwrap_err();
        assert!(err.to_string().contains("artifactUrl"));
    }

    #[tokio::test]
    async fn test_dry_run_does_not_send() {
        let recorder = RecordingSender::new();
        let announcer = SdkmanAnnouncer::with_sender(
            config("https://vendors.sdkman.io", true),
            Arc::new(recorder.clone()),
        );
        let options = DeliveryOptions {
            output_dir: "out".into(),
            dry_run: true,
        };

        let delivery = announcer
            .deliver(Rendered::Message(message()), &options)
            .await
            .unwrap();
        assert!(delivery.simulated);
        assert_eq!(recorder.count(), 0);
    }

    #[tokio::test]
    async fn test_major_release_calls() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/release"))
            .and(header("Consumer-Key", "key"))
            .and(header("Consumer-Token", "token"))
            .and(body_json(json!({ "candidate": "app", "version": "2.3.0", "url": URL })))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/default"))
            .respond_with(ResponseTemplate::new(202))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/announce"))
            .and(body_json(json!({
                "candidate": "app",
                "version": "2.3.0",
                "hashtag": "app",
                "url": URL,
            })))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        SdkmanSender::new(config(&server.uri(), true))
            .send(&message())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_announce_links_release_notes() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/release"))
            .and(body_json(json!({ "candidate": "app", "version": "2.3.0", "url": URL })))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/announce"))
            .and(body_json(json!({
                "candidate": "app",
                "version": "2.3.0",
                "hashtag": "app",
                "url": "https://app.acme.io/notes/2.3.0",
            })))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let message = Message {
            link: Some("https://app.acme.io/notes/2.3.0".to_string()),
            ..message()
        };
        SdkmanSender::new(config(&server.uri(), false))
            .send(&message)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_minor_release_keeps_default() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201))
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(202))
            .expect(0)
            .mount(&server)
            .await;

        SdkmanSender::new(config(&server.uri(), false))
            .send(&message())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_rejected_release_stops_early() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/release"))
            .respond_with(ResponseTemplate::new(409).set_body_string("version already exists"))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/announce"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let err = SdkmanSender::new(config(&server.uri(), true))
            .send(&message())
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(409));
    }
}

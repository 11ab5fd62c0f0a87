//! Zulip stream announcer

use async_trait::async_trait;
use herald_core::{Layer, ReleaseContext, ReleaseModel, ZulipConfig, context, keys};
use herald_engine::Engine;
use indexmap::IndexMap;
use std::sync::Arc;

use super::{announce, require_setting};
use crate::error::{SendError, StageError};
use crate::processor::{Delivery, DeliveryOptions, Message, Processor, Rendered, TargetKind};
use crate::sender::{Sender, check_status, endpoint, http_client};

pub struct ZulipAnnouncer {
    config: ZulipConfig,
    sender: Arc<dyn Sender>,
}

impl ZulipAnnouncer {
    pub const NAME: &'static str = "zulip";

    pub fn new(config: ZulipConfig) -> Self {
        let sender = Arc::new(ZulipSender::new(config.clone()));
        Self { config, sender }
    }

    /// Use a custom transport instead of the Zulip REST API
    pub fn with_sender(config: ZulipConfig, sender: Arc<dyn Sender>) -> Self {
        Self { config, sender }
    }
}

#[async_trait]
impl Processor for ZulipAnnouncer {
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
            "account".to_string(),
            self.config.account.clone().unwrap_or_default(),
        );
        props.insert(
            "apiKey".to_string(),
            self.config.resolved_api_key().masked().to_string(),
        );
        props.insert(
            "apiHost".to_string(),
            self.config.api_host.clone().unwrap_or_default(),
        );
        props.insert(
            "channel".to_string(),
            self.config.channel.clone().unwrap_or_default(),
        );
        props.insert("subject".to_string(), self.config.subject().to_string());
        props.insert("message".to_string(), self.config.message().to_string());
        props
    }

    fn build_context(&self, model: &ReleaseModel) -> Result<ReleaseContext, StageError> {
        self.config
            .api_key
            .require("zulip.apiKey", ZulipConfig::API_KEY_ENV)?;
        require_setting(Self::NAME, self.config.account.as_deref(), "account")?;
        let api_host = require_setting(Self::NAME, self.config.api_host.as_deref(), "apiHost")?;
        let channel = require_setting(Self::NAME, self.config.channel.as_deref(), "channel")?;

        let target = Layer::new(Self::NAME)
            .with(keys::ZULIP_CHANNEL, channel)
            .with(keys::ZULIP_API_HOST, api_host);

        Ok(context::build(
            &model.project,
            &model.release,
            model.distribution.artifacts.first(),
            &model.distribution.name,
            target,
        ))
    }

    fn render(&self, engine: &Engine, context: &ReleaseContext) -> Result<Rendered, StageError> {
        let subject = engine
            .render_field(self.config.subject(), context, "subject")
            .map_err(|e| StageError::template("subject", e))?;
        let body = engine
            .render_field(self.config.message(), context, "message")
            .map_err(|e| StageError::template("message", e))?;

        Ok(Rendered::Message(Message {
            channel: context.require_str(keys::ZULIP_CHANNEL)?.to_string(),
            subject,
            body,
            link: None,
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

/// Posts stream messages through the Zulip REST API
pub struct ZulipSender {
    config: ZulipConfig,
}

impl ZulipSender {
    pub fn new(config: ZulipConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Sender for ZulipSender {
    async fn send(&self, message: &Message) -> Result<(), SendError> {
        // resolved now, not when the run was configured
        let api_key = self.config.resolved_api_key();
        let api_key = api_key.expose().ok_or_else(|| SendError::Credentials {
            name: "zulip.apiKey".to_string(),
        })?;
        let account = self.config.account.as_deref().unwrap_or_default();
        let api_host = self.config.api_host.as_deref().unwrap_or_default();

        let response = http_client()?
            .post(endpoint(api_host, "messages")?)
            .basic_auth(account, Some(api_key))
            .form(&[
                ("type", "stream"),
                ("to", message.channel.as_str()),
                ("subject", message.subject.as_str()),
                ("content", message.body.as_str()),
            ])
            .send()
            .await?;

        check_status(response).await
    }
}

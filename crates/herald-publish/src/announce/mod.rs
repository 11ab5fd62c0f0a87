//! Announcers: render a release message and send it to a service

mod sdkman;
mod zulip;

pub use sdkman::{SdkmanAnnouncer, SdkmanSender};
pub use zulip::{ZulipAnnouncer, ZulipSender};

use tracing::{debug, info};

use crate::error::StageError;
use crate::processor::{Delivery, DeliveryOptions, Message, Rendered};
use crate::sender::Sender;

/// A mandatory, non-blank setting
fn require_setting<'a>(
    target: &str,
    value: Option<&'a str>,
    name: &str,
) -> Result<&'a str, StageError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| StageError::configuration(format!("{}.{} must be set", target, name)))
}

/// Send `rendered` through `sender`, or only log it on a dry run
async fn announce(
    target: &str,
    sender: &dyn Sender,
    rendered: Rendered,
    options: &DeliveryOptions,
) -> Result<Delivery, StageError> {
    let Rendered::Message(message) = rendered else {
        return Err(StageError::configuration(format!(
            "{} sends messages, not files",
            target
        )));
    };

    if options.dry_run {
        debug!(
            "[dry-run] {}: would announce to {}: {}\n{}",
            target, message.channel, message.subject, message.body
        );
        return Ok(Delivery {
            simulated: true,
            detail: format!("dry-run, {} not contacted", target),
        });
    }

    info!("{}: announcing to {}", target, message.channel);
    sender.send(&message).await?;
    Ok(Delivery {
        simulated: false,
        detail: describe_sent(&message),
    })
}

fn describe_sent(message: &Message) -> String {
    format!("sent \"{}\" to {}", message.subject, message.channel)
}

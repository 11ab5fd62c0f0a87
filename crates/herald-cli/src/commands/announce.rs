//! Announce command - send release announcements

use crate::error::Result;

use super::{RunSettings, execute};

pub async fn run(settings: &RunSettings) -> Result<()> {
    execute(settings, "Announcing", herald_publish::announcers).await
}

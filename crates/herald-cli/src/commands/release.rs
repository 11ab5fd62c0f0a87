//! Release command - package, then announce, in a single run

use crate::error::Result;

use super::{RunSettings, execute};

/// Tools first, then announcers
pub async fn run(settings: &RunSettings) -> Result<()> {
    execute(settings, "Releasing", herald_publish::registry).await
}

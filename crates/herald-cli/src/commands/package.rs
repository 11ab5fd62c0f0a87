//! Package command - generate package manifests

use crate::error::Result;

use super::{RunSettings, execute};

pub async fn run(settings: &RunSettings) -> Result<()> {
    execute(settings, "Packaging", herald_publish::tools).await
}

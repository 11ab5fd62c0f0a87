//! Building the release model from configuration

use herald_core::{
    ContextBuilder, Distribution, HeraldConfig, ReleaseInfo, ReleaseModel, context, keys,
};
use herald_engine::Engine;

use crate::error::Result;

/// Resolve the read-only model every target works from.
///
/// Tag and release names may be templates over the project facts. Artifact
/// checksums missing from the configuration are computed from the files,
/// relative to the configuration directory.
pub fn resolve_model(config: &HeraldConfig, engine: &Engine) -> Result<ReleaseModel> {
    let project = config.resolve_project()?;
    let (_, git) = config.release.git()?;
    let repository = config.release.repository()?;

    let project_context = ContextBuilder::new()
        .layer(context::project_layer(&project))
        .build();
    let tag_name = engine.render_field(&git.tag_name, &project_context, "tagName")?;
    let release_name = match &git.release_name {
        Some(raw) => engine.render_field(
            raw,
            &project_context.clone().with(keys::TAG_NAME, &tag_name),
            "releaseName",
        )?,
        None => tag_name.clone(),
    };

    let mut release = ReleaseInfo::new(repository, &tag_name);
    release.release_name = release_name;
    release.changelog = git.changelog.clone();

    let artifacts = config
        .distribution
        .artifacts
        .iter()
        .cloned()
        .map(|artifact| artifact.with_computed_checksum(&config.base_dir))
        .collect::<herald_core::Result<Vec<_>>>()?;

    tracing::debug!(
        "resolved {} {} ({}), {} artifact(s)",
        project.name,
        project.version,
        tag_name,
        artifacts.len()
    );

    Ok(ReleaseModel {
        release,
        distribution: Distribution {
            name: config.distribution_name().to_string(),
            artifacts,
        },
        project,
    })
}

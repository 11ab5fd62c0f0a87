//! Layered property context for template rendering
//!
//! A [`ReleaseContext`] is an ordered map of well-known keys to scalar values.
//! It is assembled from [`Layer`]s in a fixed order (project, release,
//! artifact, target); a key present in a later layer replaces the earlier
//! value outright. Once built, a context is never mutated: [`ReleaseContext::with`]
//! consumes it and hands back a derived copy.

use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

use crate::error::{CoreError, Result};
use crate::model::{Artifact, Project, ReleaseInfo};

/// Well-known context keys, as referenced from templates
pub mod keys {
    // project
    pub const PROJECT_NAME: &str = "projectName";
    pub const PROJECT_NAME_CAPITALIZED: &str = "projectNameCapitalized";
    pub const PROJECT_VERSION: &str = "projectVersion";
    pub const PROJECT_EFFECTIVE_VERSION: &str = "projectEffectiveVersion";
    pub const PROJECT_SNAPSHOT: &str = "projectSnapshot";
    pub const PROJECT_DESCRIPTION: &str = "projectDescription";
    pub const PROJECT_WEBSITE: &str = "projectWebsite";
    pub const PROJECT_LICENSE: &str = "projectLicense";
    pub const PROJECT_AUTHORS: &str = "projectAuthors";
    pub const PROJECT_VERSION_MAJOR: &str = "projectVersionMajor";
    pub const PROJECT_VERSION_MINOR: &str = "projectVersionMinor";
    pub const PROJECT_VERSION_PATCH: &str = "projectVersionPatch";

    // release
    pub const TAG_NAME: &str = "tagName";
    pub const RELEASE_NAME: &str = "releaseName";
    pub const REPO_OWNER: &str = "repoOwner";
    pub const REPO_NAME: &str = "repoName";
    pub const REPO_URL: &str = "repoUrl";
    pub const REPO_CLONE_URL: &str = "repoCloneUrl";
    pub const RELEASE_NOTES_URL: &str = "releaseNotesUrl";
    pub const LATEST_RELEASE_URL: &str = "latestReleaseUrl";
    pub const CHANGELOG: &str = "changelog";

    // artifact
    pub const DISTRIBUTION_NAME: &str = "distributionName";
    pub const ARTIFACT_FILE: &str = "artifactFile";
    pub const ARTIFACT_FILE_NAME: &str = "artifactFileName";
    pub const ARTIFACT_PATH: &str = "artifactPath";
    pub const ARTIFACT_PLATFORM: &str = "artifactPlatform";
    pub const ARTIFACT_SHA256: &str = "artifactSha256";
    pub const ARTIFACT_URL: &str = "artifactUrl";

    // scoop
    pub const SCOOP_PACKAGE_NAME: &str = "scoopPackageName";
    pub const SCOOP_BUCKET_REPO_URL: &str = "scoopBucketRepoUrl";
    pub const SCOOP_BUCKET_REPO_CLONE_URL: &str = "scoopBucketRepoCloneUrl";
    pub const SCOOP_CHECKVER_URL: &str = "scoopCheckverUrl";
    pub const SCOOP_AUTOUPDATE_URL: &str = "scoopAutoupdateUrl";
    pub const SCOOP_AUTOUPDATE_EXTRACT_DIR: &str = "scoopAutoupdateExtractDir";

    // announcers
    pub const ZULIP_CHANNEL: &str = "zulipChannel";
    pub const ZULIP_API_HOST: &str = "zulipApiHost";
    pub const SDKMAN_CANDIDATE: &str = "sdkmanCandidate";
}

/// A context value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    String(String),
    Bool(bool),
    Integer(i64),
    Float(f64),
}

impl Scalar {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Integer(i) => write!(f, "{}", i),
            Self::Float(x) => write!(f, "{}", x),
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&String> for Scalar {
    fn from(value: &String) -> Self {
        Self::String(value.clone())
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<u64> for Scalar {
    fn from(value: u64) -> Self {
        i64::try_from(value)
            .map(Self::Integer)
            .unwrap_or(Self::Float(value as f64))
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

/// One flat layer of key/value facts
#[derive(Debug, Clone, Default)]
pub struct Layer {
    name: String,
    entries: IndexMap<String, Scalar>,
}

impl Layer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: IndexMap::new(),
        }
    }

    /// Add an entry (builder style)
    pub fn with(mut self, key: &str, value: impl Into<Scalar>) -> Self {
        self.insert(key, value);
        self
    }

    /// Add an entry only when a value is present
    pub fn with_opt<V: Into<Scalar>>(mut self, key: &str, value: Option<V>) -> Self {
        if let Some(value) = value {
            self.insert(key, value);
        }
        self
    }

    pub fn insert(&mut self, key: &str, value: impl Into<Scalar>) {
        self.entries.insert(key.to_string(), value.into());
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, key: &str) -> Option<&Scalar> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The assembled, immutable property context
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ReleaseContext {
    entries: IndexMap<String, Scalar>,
}

impl ReleaseContext {
    pub fn get(&self, key: &str) -> Option<&Scalar> {
        self.entries.get(key)
    }

    /// String value of `key`, if present and a string
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Scalar::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Scalar)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Derived copy with `key` set to `value`
    pub fn with(mut self, key: &str, value: impl Into<Scalar>) -> Self {
        self.entries.insert(key.to_string(), value.into());
        self
    }

    /// Fail with the first key in `required` that is absent
    pub fn require_keys(&self, required: &[&str]) -> Result<()> {
        match required.iter().find(|k| !self.contains_key(k)) {
            Some(missing) => Err(CoreError::MissingKey {
                key: missing.to_string(),
            }),
            None => Ok(()),
        }
    }

    /// String value of `key`, failing when absent
    pub fn require_str(&self, key: &str) -> Result<&str> {
        self.get_str(key).ok_or_else(|| CoreError::MissingKey {
            key: key.to_string(),
        })
    }
}

/// Overlays layers left to right into a [`ReleaseContext`]
#[derive(Debug, Default)]
pub struct ContextBuilder {
    layers: Vec<Layer>,
}

impl ContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn layer(mut self, layer: Layer) -> Self {
        self.layers.push(layer);
        self
    }

    pub fn build(self) -> ReleaseContext {
        let mut entries = IndexMap::new();
        for layer in self.layers {
            for (key, value) in layer.entries {
                entries.insert(key, value);
            }
        }
        ReleaseContext { entries }
    }
}

/// Assemble the context for one target: project, release, artifact, target
pub fn build(
    project: &Project,
    release: &ReleaseInfo,
    artifact: Option<&Artifact>,
    distribution_name: &str,
    target: Layer,
) -> ReleaseContext {
    let mut builder = ContextBuilder::new()
        .layer(project_layer(project))
        .layer(release_layer(release));

    if let Some(artifact) = artifact {
        builder = builder.layer(artifact_layer(artifact, distribution_name, release));
    }

    builder.layer(target).build()
}

pub fn project_layer(project: &Project) -> Layer {
    let mut layer = Layer::new("project")
        .with(keys::PROJECT_NAME, &project.name)
        .with(keys::PROJECT_NAME_CAPITALIZED, project.capitalized_name())
        .with(keys::PROJECT_VERSION, &project.version)
        .with(keys::PROJECT_EFFECTIVE_VERSION, &project.effective_version)
        .with(keys::PROJECT_SNAPSHOT, project.snapshot)
        .with_opt(keys::PROJECT_DESCRIPTION, project.description.as_deref())
        .with_opt(keys::PROJECT_WEBSITE, project.website.as_deref())
        .with_opt(keys::PROJECT_LICENSE, project.license.as_deref());

    if !project.authors.is_empty() {
        layer.insert(keys::PROJECT_AUTHORS, project.authors.join(", "));
    }

    if let Some(version) = project.semver() {
        layer.insert(keys::PROJECT_VERSION_MAJOR, version.major);
        layer.insert(keys::PROJECT_VERSION_MINOR, version.minor);
        layer.insert(keys::PROJECT_VERSION_PATCH, version.patch);
    }

    layer
}

pub fn release_layer(release: &ReleaseInfo) -> Layer {
    let repo = &release.repository;
    Layer::new("release")
        .with(keys::TAG_NAME, &release.tag_name)
        .with(keys::RELEASE_NAME, &release.release_name)
        .with(keys::REPO_OWNER, &repo.owner)
        .with(keys::REPO_NAME, &repo.name)
        .with(keys::REPO_URL, repo.url())
        .with(keys::REPO_CLONE_URL, repo.clone_url())
        .with(keys::RELEASE_NOTES_URL, repo.release_notes_url(&release.tag_name))
        .with(keys::LATEST_RELEASE_URL, repo.latest_release_url())
        .with_opt(keys::CHANGELOG, release.changelog.as_deref())
}

pub fn artifact_layer(artifact: &Artifact, distribution_name: &str, release: &ReleaseInfo) -> Layer {
    let file = artifact.file_name();
    Layer::new("artifact")
        .with(keys::DISTRIBUTION_NAME, distribution_name)
        .with(
            keys::ARTIFACT_URL,
            release.repository.download_url(&release.tag_name, &file),
        )
        .with(keys::ARTIFACT_FILE_NAME, artifact.base_name())
        .with(keys::ARTIFACT_FILE, file)
        .with(keys::ARTIFACT_PATH, artifact.path.to_string_lossy().to_string())
        .with_opt(keys::ARTIFACT_PLATFORM, artifact.platform.as_deref())
        .with_opt(keys::ARTIFACT_SHA256, artifact.sha256.as_deref())
}

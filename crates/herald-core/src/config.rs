//! Release configuration
//!
//! Herald reads a single YAML file (`herald.yml` by default) describing the
//! project, where it is released, the artifacts to ship, and which packagers
//! and announcers to run.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::credentials::Secret;
use crate::error::{CoreError, Result};
use crate::model::{Artifact, GitHost, Project, Repository};

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "herald.yml";

pub const DEFAULT_TAG_NAME: &str = "v{{projectVersion}}";
pub const DEFAULT_SNAPSHOT_PATTERN: &str = ".*-SNAPSHOT";
pub const DEFAULT_SNAPSHOT_LABEL: &str = "early-access";
pub const DEFAULT_BUCKET_NAME: &str = "scoop-bucket";
pub const DEFAULT_CHECKVER_URL: &str = "{{latestReleaseUrl}}";
pub const DEFAULT_AUTOUPDATE_URL: &str = "{{artifactUrl}}";
pub const DEFAULT_ZULIP_SUBJECT: &str = "{{projectNameCapitalized}} {{projectVersion}} released!";
pub const DEFAULT_ZULIP_MESSAGE: &str =
    "🚀 {{projectNameCapitalized}} {{projectVersion}} has been released! {{releaseNotesUrl}}";
pub const DEFAULT_SDKMAN_API_HOST: &str = "https://vendors.sdkman.io";
pub const DEFAULT_OUTPUT_DIRECTORY: &str = "out/herald";

/// Top-level configuration file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeraldConfig {
    pub project: ProjectConfig,

    #[serde(default)]
    pub release: ReleaseConfig,

    #[serde(default)]
    pub distribution: DistributionConfig,

    #[serde(default)]
    pub packagers: PackagersConfig,

    #[serde(default)]
    pub announce: AnnounceConfig,

    #[serde(default)]
    pub run: RunConfig,

    /// Directory relative paths are resolved against
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl HeraldConfig {
    /// Load configuration from `herald.yml` in the current directory
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(DEFAULT_CONFIG_FILE))
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_yaml(&content)?;
        config.base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Ok(config)
    }

    /// Parse and validate configuration from YAML text
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.project.name.trim().is_empty() {
            return Err(invalid("project.name must not be empty"));
        }
        if self.project.version.trim().is_empty() {
            return Err(invalid("project.version must not be empty"));
        }
        if self.run.jobs == 0 {
            return Err(invalid("run.jobs must be at least 1"));
        }
        self.release.git()?;
        Ok(())
    }

    /// Resolve the project, applying snapshot detection
    pub fn resolve_project(&self) -> Result<Project> {
        let cfg = &self.project;
        let mut project = Project::new(&cfg.name, &cfg.version);
        project.description = cfg.description.clone();
        project.website = cfg.website.clone();
        project.license = cfg.license.clone();
        project.authors = cfg.authors.clone();

        let pattern = Regex::new(&format!("^(?:{})$", cfg.snapshot.pattern))?;
        if pattern.is_match(&cfg.version) {
            project = project.with_snapshot(&cfg.snapshot.label);
        }
        Ok(project)
    }

    /// Distribution name, defaulting to the project name
    pub fn distribution_name(&self) -> &str {
        self.distribution
            .name
            .as_deref()
            .unwrap_or(&self.project.name)
    }
}

fn invalid(message: &str) -> CoreError {
    CoreError::InvalidConfig {
        message: message.to_string(),
    }
}

/// Project section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfig {
    pub name: String,
    pub version: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub website: Option<String>,

    #[serde(default)]
    pub license: Option<String>,

    #[serde(default)]
    pub authors: Vec<String>,

    #[serde(default)]
    pub snapshot: SnapshotConfig,
}

/// Snapshot detection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotConfig {
    /// Regex matched against the whole version
    #[serde(default = "default_snapshot_pattern")]
    pub pattern: String,

    /// Effective version used for snapshots
    #[serde(default = "default_snapshot_label")]
    pub label: String,
}

fn default_snapshot_pattern() -> String {
    DEFAULT_SNAPSHOT_PATTERN.to_string()
}

fn default_snapshot_label() -> String {
    DEFAULT_SNAPSHOT_LABEL.to_string()
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            pattern: default_snapshot_pattern(),
            label: default_snapshot_label(),
        }
    }
}

/// Release section; exactly one git host must be configured
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseConfig {
    #[serde(default)]
    pub github: Option<GitReleaseConfig>,

    #[serde(default)]
    pub gitlab: Option<GitReleaseConfig>,

    #[serde(default)]
    pub gitea: Option<GitReleaseConfig>,
}

impl ReleaseConfig {
    /// The configured git host and its settings
    pub fn git(&self) -> Result<(GitHost, &GitReleaseConfig)> {
        let configured: Vec<(GitHost, &GitReleaseConfig)> = [
            (GitHost::Github, self.github.as_ref()),
            (GitHost::Gitlab, self.gitlab.as_ref()),
            (GitHost::Gitea, self.gitea.as_ref()),
        ]
        .into_iter()
        .filter_map(|(kind, cfg)| cfg.map(|c| (kind, c)))
        .collect();

        match configured.as_slice() {
            [single] => Ok(*single),
            [] => Err(invalid("release must configure one of github, gitlab or gitea")),
            _ => Err(invalid("release must configure only one git host")),
        }
    }

    /// The release repository
    pub fn repository(&self) -> Result<Repository> {
        let (kind, cfg) = self.git()?;
        let mut repo = Repository::new(kind, &cfg.owner, &cfg.name);
        if let Some(host) = &cfg.host {
            repo.host = host.clone();
        }
        Ok(repo)
    }
}

/// Git host release settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitReleaseConfig {
    pub owner: String,
    pub name: String,

    /// Custom host (self-hosted instances)
    #[serde(default)]
    pub host: Option<String>,

    /// Tag name template
    #[serde(default = "default_tag_name")]
    pub tag_name: String,

    /// Release name template, defaults to the tag name
    #[serde(default)]
    pub release_name: Option<String>,

    /// Changelog file
    #[serde(default)]
    pub changelog: Option<String>,
}

fn default_tag_name() -> String {
    DEFAULT_TAG_NAME.to_string()
}

/// Distribution section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionConfig {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub artifacts: Vec<Artifact>,
}

/// Packagers section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackagersConfig {
    #[serde(default)]
    pub scoop: ScoopConfig,
}

/// Scoop packager settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoopConfig {
    #[serde(default)]
    pub enabled: bool,

    /// Manifest name, defaults to the project name
    #[serde(default)]
    pub package_name: Option<String>,

    #[serde(default)]
    pub bucket: BucketConfig,

    /// Literal URL or template
    #[serde(default)]
    pub checkver_url: Option<String>,

    /// Literal URL or template
    #[serde(default)]
    pub autoupdate_url: Option<String>,

    /// Directory with templates overriding the built-in ones
    #[serde(default)]
    pub template_directory: Option<PathBuf>,
}

impl ScoopConfig {
    pub fn checkver_url(&self) -> &str {
        self.checkver_url.as_deref().unwrap_or(DEFAULT_CHECKVER_URL)
    }

    pub fn autoupdate_url(&self) -> &str {
        self.autoupdate_url.as_deref().unwrap_or(DEFAULT_AUTOUPDATE_URL)
    }
}

/// Scoop bucket repository
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketConfig {
    /// Defaults to the release repository owner
    #[serde(default)]
    pub owner: Option<String>,

    #[serde(default = "default_bucket_name")]
    pub name: String,
}

fn default_bucket_name() -> String {
    DEFAULT_BUCKET_NAME.to_string()
}

impl Default for BucketConfig {
    fn default() -> Self {
        Self {
            owner: None,
            name: default_bucket_name(),
        }
    }
}

/// Announce section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnounceConfig {
    #[serde(default)]
    pub zulip: ZulipConfig,

    #[serde(default)]
    pub sdkman: SdkmanConfig,
}

/// Zulip announcer settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZulipConfig {
    #[serde(default)]
    pub enabled: bool,

    /// Bot account e-mail
    #[serde(default)]
    pub account: Option<String>,

    /// Falls back to `ZULIP_API_KEY`
    #[serde(default)]
    pub api_key: Secret,

    /// e.g. `https://zulip.example.com/api/v1`
    #[serde(default)]
    pub api_host: Option<String>,

    #[serde(default)]
    pub channel: Option<String>,

    #[serde(default)]
    pub subject: Option<String>,

    #[serde(default)]
    pub message: Option<String>,
}

impl ZulipConfig {
    pub const API_KEY_ENV: &'static str = "ZULIP_API_KEY";

    pub fn subject(&self) -> &str {
        self.subject.as_deref().unwrap_or(DEFAULT_ZULIP_SUBJECT)
    }

    pub fn message(&self) -> &str {
        self.message.as_deref().unwrap_or(DEFAULT_ZULIP_MESSAGE)
    }

    pub fn resolved_api_key(&self) -> Secret {
        self.api_key.resolve(Self::API_KEY_ENV)
    }
}

/// SDKMAN announcer settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SdkmanConfig {
    #[serde(default)]
    pub enabled: bool,

    /// Falls back to `SDKMAN_CONSUMER_KEY`
    #[serde(default)]
    pub consumer_key: Secret,

    /// Falls back to `SDKMAN_CONSUMER_TOKEN`
    #[serde(default)]
    pub consumer_token: Secret,

    /// Defaults to the project name
    #[serde(default)]
    pub candidate: Option<String>,

    /// Make the release the candidate's default version
    #[serde(default = "default_true")]
    pub major: bool,

    #[serde(default)]
    pub api_host: Option<String>,

    /// Link sent with the announcement, templated; defaults to the download URL
    #[serde(default)]
    pub release_notes_url: Option<String>,
}

fn default_true() -> bool {
    true
}

impl Default for SdkmanConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            consumer_key: Secret::unset(),
            consumer_token: Secret::unset(),
            candidate: None,
            major: true,
            api_host: None,
            release_notes_url: None,
        }
    }
}

impl SdkmanConfig {
    pub const CONSUMER_KEY_ENV: &'static str = "SDKMAN_CONSUMER_KEY";
    pub const CONSUMER_TOKEN_ENV: &'static str = "SDKMAN_CONSUMER_TOKEN";

    pub fn api_host(&self) -> &str {
        self.api_host.as_deref().unwrap_or(DEFAULT_SDKMAN_API_HOST)
    }

    pub fn resolved_consumer_key(&self) -> Secret {
        self.consumer_key.resolve(Self::CONSUMER_KEY_ENV)
    }

    pub fn resolved_consumer_token(&self) -> Secret {
        self.consumer_token.resolve(Self::CONSUMER_TOKEN_ENV)
    }
}

/// Run behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunConfig {
    /// Abort remaining targets after the first failure
    #[serde(default)]
    pub fail_fast: bool,

    /// Targets processed concurrently
    #[serde(default = "default_jobs")]
    pub jobs: usize,

    /// Render and log, but skip network delivery
    #[serde(default)]
    pub dry_run: bool,

    #[serde(default = "default_output_directory")]
    pub output_directory: PathBuf,
}

fn default_jobs() -> usize {
    1
}

fn default_output_directory() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_DIRECTORY)
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            fail_fast: false,
            jobs: default_jobs(),
            dry_run: false,
            output_directory: default_output_directory(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
project:
  name: app
  version: 2.3.0
release:
  github:
    owner: acme
    name: app
"#;

    #[test]
    fn test_minimal_defaults() {
        let config = HeraldConfig::from_yaml(MINIMAL).unwrap();

        assert_eq!(config.project.name, "app");
        assert!(!config.packagers.scoop.enabled);
        assert_eq!(config.packagers.scoop.bucket.name, "scoop-bucket");
        assert_eq!(config.packagers.scoop.checkver_url(), DEFAULT_CHECKVER_URL);
        assert!(config.announce.sdkman.major);
        assert_eq!(config.run.jobs, 1);
        assert!(!config.run.fail_fast);
        assert_eq!(config.distribution_name(), "app");

        let (kind, git) = config.release.git().unwrap();
        assert_eq!(kind, GitHost::Github);
        assert_eq!(git.tag_name, DEFAULT_TAG_NAME);
    }

    #[test]
    fn test_full_config() {
        let yaml = r#"
project:
  name: app
  version: 1.0.0-SNAPSHOT
  authors: [Jane, John]
release:
  gitlab:
    owner: acme
    name: app
    host: gitlab.acme.io
distribution:
  artifacts:
    - path: dist/app-1.0.0.zip
      platform: windows-x86_64
packagers:
  scoop:
    enabled: true
    packageName: app-cli
    bucket:
      owner: acme-tools
    autoupdateUrl: "https://dl.acme.io/app-{{projectVersion}}.zip"
announce:
  zulip:
    enabled: true
    account: bot@acme.io
    apiKey: secret-key
    apiHost: https://zulip.acme.io/api/v1
    channel: announce
  sdkman:
    candidate: appcli
    major: false
    releaseNotesUrl: "https://app.acme.io/notes/{{projectVersion}}"
run:
  failFast: true
  jobs: 4
"#;
        let config = HeraldConfig::from_yaml(yaml).unwrap();

        let project = config.resolve_project().unwrap();
        assert!(project.snapshot);
        assert_eq!(project.effective_version, "early-access");

        let repo = config.release.repository().unwrap();
        assert_eq!(repo.url(), "https://gitlab.acme.io/acme/app");

        assert_eq!(config.packagers.scoop.package_name.as_deref(), Some("app-cli"));
        assert_eq!(config.packagers.scoop.bucket.owner.as_deref(), Some("acme-tools"));
        assert_eq!(config.distribution.artifacts.len(), 1);
        assert_eq!(config.announce.zulip.api_key.expose(), Some("secret-key"));
        assert!(!config.announce.sdkman.major);
        assert_eq!(
            config.announce.sdkman.release_notes_url.as_deref(),
            Some("https://app.acme.io/notes/{{projectVersion}}")
        );
        assert!(config.run.fail_fast);
        assert_eq!(config.run.jobs, 4);
    }

    #[test]
    fn test_release_version_is_not_snapshot() {
        let config = HeraldConfig::from_yaml(MINIMAL).unwrap();
        let project = config.resolve_project().unwrap();
        assert!(!project.snapshot);
        assert_eq!(project.effective_version, "2.3.0");
    }

    #[test]
    fn test_missing_git_host_is_invalid() {
        let yaml = "project:\n  name: app\n  version: 1.0.0\n";
        let err = HeraldConfig::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, CoreError::InvalidConfig { .. }));
    }

    #[test]
    fn test_two_git_hosts_are_invalid() {
        let yaml = r#"
project: { name: app, version: 1.0.0 }
release:
  github: { owner: a, name: b }
  gitea: { owner: a, name: b }
"#;
        assert!(HeraldConfig::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_blank_version_is_invalid() {
        let yaml = "project: { name: app, version: ' ' }\nrelease:\n  github: { owner: a, name: b }\n";
        let err = HeraldConfig::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("project.version"));
    }

    #[test]
    fn test_debug_never_shows_secrets() {
        let yaml = format!("{MINIMAL}announce:\n  zulip:\n    apiKey: hunter2\n");
        let config = HeraldConfig::from_yaml(&yaml).unwrap();
        assert!(!format!("{:?}", config).contains("hunter2"));
    }

    #[test]
    fn test_load_from_sets_base_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("herald.yml");
        std::fs::write(&path, MINIMAL).unwrap();

        let config = HeraldConfig::load_from(&path).unwrap();
        assert_eq!(config.base_dir, dir.path());
    }

    #[test]
    fn test_load_missing_file() {
        let err = HeraldConfig::load_from(Path::new("/nonexistent/herald.yml")).unwrap_err();
        assert!(matches!(err, CoreError::ConfigNotFound { .. }));
    }
}

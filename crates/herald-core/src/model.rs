//! Release model types
//!
//! The model is the resolved, read-only description of one release run:
//! the project, the git release it is published under, and the artifacts of
//! its distribution. It is created once from configuration and shared by
//! every target.

use semver::Version;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Archive suffixes stripped when computing an artifact's base name
const ARCHIVE_EXTENSIONS: &[&str] = &[
    ".tar.gz", ".tar.bz2", ".tar.xz", ".tgz", ".tbz2", ".txz", ".tar", ".zip", ".7z", ".jar",
];

/// Project facts
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub name: String,

    /// Nominal version, as configured
    pub version: String,

    /// Version used for resolution; differs from `version` for snapshots
    pub effective_version: String,

    pub snapshot: bool,

    pub description: Option<String>,

    pub website: Option<String>,

    pub license: Option<String>,

    #[serde(default)]
    pub authors: Vec<String>,
}

impl Project {
    /// Create a release (non-snapshot) project
    pub fn new(name: &str, version: &str) -> Self {
        Self {
            name: name.to_string(),
            version: version.to_string(),
            effective_version: version.to_string(),
            snapshot: false,
            description: None,
            website: None,
            license: None,
            authors: Vec::new(),
        }
    }

    /// Mark as snapshot, resolving the effective version to `label`
    pub fn with_snapshot(mut self, label: &str) -> Self {
        self.snapshot = true;
        self.effective_version = label.to_string();
        self
    }

    /// Name with the first character upper-cased
    pub fn capitalized_name(&self) -> String {
        let mut chars = self.name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    /// Parsed semantic version, if the version is semver-compliant
    pub fn semver(&self) -> Option<Version> {
        Version::parse(self.version.trim_start_matches('v')).ok()
    }
}

/// Supported git hosting services
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GitHost {
    #[default]
    Github,
    Gitlab,
    Gitea,
}

impl GitHost {
    pub fn default_host(&self) -> &'static str {
        match self {
            Self::Github => "github.com",
            Self::Gitlab => "gitlab.com",
            Self::Gitea => "gitea.com",
        }
    }
}

impl std::fmt::Display for GitHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Github => "github",
            Self::Gitlab => "gitlab",
            Self::Gitea => "gitea",
        };
        write!(f, "{}", s)
    }
}

/// A repository at a git host
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Repository {
    pub kind: GitHost,
    pub host: String,
    pub owner: String,
    pub name: String,
}

impl Repository {
    pub fn new(kind: GitHost, owner: &str, name: &str) -> Self {
        Self {
            kind,
            host: kind.default_host().to_string(),
            owner: owner.to_string(),
            name: name.to_string(),
        }
    }

    /// Same host and kind, different owner/name
    pub fn sibling(&self, owner: &str, name: &str) -> Self {
        Self {
            kind: self.kind,
            host: self.host.clone(),
            owner: owner.to_string(),
            name: name.to_string(),
        }
    }

    pub fn url(&self) -> String {
        format!("https://{}/{}/{}", self.host, self.owner, self.name)
    }

    pub fn clone_url(&self) -> String {
        format!("{}.git", self.url())
    }

    pub fn download_url(&self, tag: &str, file: &str) -> String {
        match self.kind {
            GitHost::Github | GitHost::Gitea => {
                format!("{}/releases/download/{}/{}", self.url(), tag, file)
            }
            GitHost::Gitlab => format!("{}/-/releases/{}/downloads/{}", self.url(), tag, file),
        }
    }

    pub fn release_notes_url(&self, tag: &str) -> String {
        match self.kind {
            GitHost::Github | GitHost::Gitea => format!("{}/releases/tag/{}", self.url(), tag),
            GitHost::Gitlab => format!("{}/-/releases/{}", self.url(), tag),
        }
    }

    pub fn latest_release_url(&self) -> String {
        match self.kind {
            GitHost::Github | GitHost::Gitea => format!("{}/releases/latest", self.url()),
            GitHost::Gitlab => format!("{}/-/releases/permalink/latest", self.url()),
        }
    }
}

/// Release facts: where and under which tag the release is published
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseInfo {
    pub repository: Repository,
    pub tag_name: String,
    pub release_name: String,

    /// Changelog file reference
    pub changelog: Option<String>,
}

impl ReleaseInfo {
    pub fn new(repository: Repository, tag_name: &str) -> Self {
        Self {
            repository,
            tag_name: tag_name.to_string(),
            release_name: tag_name.to_string(),
            changelog: None,
        }
    }
}

/// A single distributable file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    pub path: PathBuf,

    #[serde(default)]
    pub platform: Option<String>,

    #[serde(default)]
    pub sha256: Option<String>,
}

impl Artifact {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            platform: None,
            sha256: None,
        }
    }

    /// File name, e.g. `app-2.3.0.zip`
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    /// File name without its archive extension, e.g. `app-2.3.0`
    pub fn base_name(&self) -> String {
        let file_name = self.file_name();
        ARCHIVE_EXTENSIONS
            .iter()
            .find_map(|ext| file_name.strip_suffix(ext))
            .map(str::to_string)
            .unwrap_or(file_name)
    }

    /// Whether this artifact targets Windows (by platform or extension)
    pub fn is_windows(&self) -> bool {
        match &self.platform {
            Some(platform) => platform.to_lowercase().starts_with("windows"),
            None => self.file_name().ends_with(".zip"),
        }
    }

    /// Fill in `sha256` from the file on disk when it is not configured.
    ///
    /// Missing files are left without a checksum.
    pub fn with_computed_checksum(mut self, base_dir: &Path) -> Result<Self> {
        if self.sha256.is_some() {
            return Ok(self);
        }

        let path = base_dir.join(&self.path);
        if path.is_file() {
            let bytes = std::fs::read(&path)?;
            self.sha256 = Some(hex::encode(Sha256::digest(&bytes)));
        } else {
            tracing::debug!("artifact {} not found, checksum left unset", path.display());
        }
        Ok(self)
    }
}

/// The distribution being released
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Distribution {
    pub name: String,

    #[serde(default)]
    pub artifacts: Vec<Artifact>,
}

impl Distribution {
    /// The artifact Windows package managers should use
    pub fn windows_artifact(&self) -> Option<&Artifact> {
        self.artifacts
            .iter()
            .find(|a| a.is_windows())
            .or_else(|| self.artifacts.first())
    }
}

/// Everything known about one release run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseModel {
    pub project: Project,
    pub release: ReleaseInfo,
    pub distribution: Distribution,
}

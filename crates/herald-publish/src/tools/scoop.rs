//! Scoop manifest processor
//!
//! Produces a bucket manifest (`scoop/bucket/<package>.json`) whose
//! `autoupdate` block uses `$version` in place of the concrete version, so
//! Scoop can follow future releases on its own.

use async_trait::async_trait;
use herald_core::{
    Layer, ReleaseContext, ReleaseModel, ScoopConfig, VERSION_PLACEHOLDER, context, keys,
    rewrite_value,
};
use herald_engine::Engine;
use indexmap::IndexMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

use super::resolve_self_updating;
use crate::error::StageError;
use crate::output::{trim_template_extension, write_all};
use crate::processor::{
    Delivery, DeliveryOptions, ManifestFile, Processor, Rendered, TargetKind,
};

const MANIFEST: &str = "manifest.json";

const BUILTIN_TEMPLATES: &[(&str, &str)] = &[(
    "manifest.json.tpl",
    include_str!("../../templates/scoop/manifest.json.tpl"),
)];

/// Keys the manifest cannot be produced without
const REQUIRED_KEYS: &[&str] = &[
    keys::PROJECT_NAME,
    keys::PROJECT_VERSION,
    keys::ARTIFACT_FILE,
    keys::ARTIFACT_URL,
    keys::ARTIFACT_SHA256,
];

pub struct ScoopProcessor {
    config: ScoopConfig,
    base_dir: PathBuf,
}

/// A template ready to render
struct TemplateFile {
    name: String,
    content: String,
}

impl ScoopProcessor {
    pub const NAME: &'static str = "scoop";

    pub fn new(config: ScoopConfig, base_dir: PathBuf) -> Self {
        Self { config, base_dir }
    }

    /// Built-in templates, overridden or extended by the template directory.
    ///
    /// Keyed by output name, so `manifest.json` in the directory replaces the
    /// built-in `manifest.json.tpl`.
    fn templates(&self) -> Result<Vec<TemplateFile>, StageError> {
        let mut templates: IndexMap<String, TemplateFile> = BUILTIN_TEMPLATES
            .iter()
            .map(|(name, content)| {
                (
                    trim_template_extension(name).to_string(),
                    TemplateFile {
                        name: name.to_string(),
                        content: content.to_string(),
                    },
                )
            })
            .collect();

        let Some(directory) = &self.config.template_directory else {
            return Ok(templates.into_values().collect());
        };

        let directory = self.base_dir.join(directory);
        if !directory.is_dir() {
            return Err(StageError::configuration(format!(
                "template directory {} does not exist",
                directory.display()
            )));
        }

        for entry in WalkDir::new(&directory).min_depth(1).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                StageError::configuration(format!("cannot read {}: {}", directory.display(), e))
            })?;
            if !entry.file_type().is_file() {
                continue;
            }

            let name = relative_name(&directory, entry.path());
            let content =
                std::fs::read_to_string(entry.path()).map_err(|source| StageError::Io {
                    path: entry.path().to_path_buf(),
                    source,
                })?;

            debug!("scoop template {} from {}", name, directory.display());
            templates.insert(
                trim_template_extension(&name).to_string(),
                TemplateFile { name, content },
            );
        }

        Ok(templates.into_values().collect())
    }

    fn package_name<'a>(&'a self, model: &'a ReleaseModel) -> &'a str {
        self.config
            .package_name
            .as_deref()
            .unwrap_or(&model.project.name)
    }
}

fn relative_name(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

/// Where a rendered template lands, relative to the output root
fn output_path(output_name: &str, package_name: &str) -> PathBuf {
    if output_name == MANIFEST {
        PathBuf::from("scoop")
            .join("bucket")
            .join(format!("{}.json", package_name))
    } else {
        PathBuf::from("scoop").join(output_name)
    }
}

#[async_trait]
impl Processor for ScoopProcessor {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn kind(&self) -> TargetKind {
        TargetKind::Tool
    }

    fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    fn describe(&self) -> IndexMap<String, String> {
        let mut props = IndexMap::new();
        props.insert("enabled".to_string(), self.config.enabled.to_string());
        if let Some(name) = &self.config.package_name {
            props.insert("packageName".to_string(), name.clone());
        }
        if let Some(owner) = &self.config.bucket.owner {
            props.insert("bucketOwner".to_string(), owner.clone());
        }
        props.insert("bucketName".to_string(), self.config.bucket.name.clone());
        props.insert(
            "checkverUrl".to_string(),
            self.config.checkver_url().to_string(),
        );
        props.insert(
            "autoupdateUrl".to_string(),
            self.config.autoupdate_url().to_string(),
        );
        if let Some(dir) = &self.config.template_directory {
            props.insert(
                "templateDirectory".to_string(),
                dir.display().to_string(),
            );
        }
        props
    }

    fn build_context(&self, model: &ReleaseModel) -> Result<ReleaseContext, StageError> {
        let release = &model.release;
        let owner = self
            .config
            .bucket
            .owner
            .as_deref()
            .unwrap_or(&release.repository.owner);
        let bucket = release.repository.sibling(owner, &self.config.bucket.name);

        let target = Layer::new(Self::NAME)
            .with(keys::SCOOP_PACKAGE_NAME, self.package_name(model))
            .with(keys::SCOOP_BUCKET_REPO_URL, bucket.url())
            .with(keys::SCOOP_BUCKET_REPO_CLONE_URL, bucket.clone_url());

        let ctx = context::build(
            &model.project,
            release,
            model.distribution.windows_artifact(),
            &model.distribution.name,
            target,
        );
        ctx.require_keys(REQUIRED_KEYS)?;
        Ok(ctx)
    }

    fn render(&self, engine: &Engine, context: &ReleaseContext) -> Result<Rendered, StageError> {
        let version = context.require_str(keys::PROJECT_VERSION)?;
        let effective_version = context
            .get_str(keys::PROJECT_EFFECTIVE_VERSION)
            .unwrap_or(version);

        let checkver_url = engine
            .render_field(self.config.checkver_url(), context, "checkverUrl")
            .map_err(|e| StageError::template("checkverUrl", e))?;
        let autoupdate_url = resolve_self_updating(
            engine,
            self.config.autoupdate_url(),
            context,
            version,
            VERSION_PLACEHOLDER,
            "autoupdateUrl",
        )?;
        let extract_dir = rewrite_value(
            context.require_str(keys::ARTIFACT_FILE_NAME)?,
            effective_version,
            VERSION_PLACEHOLDER,
        );

        let context = context
            .clone()
            .with(keys::SCOOP_CHECKVER_URL, checkver_url)
            .with(keys::SCOOP_AUTOUPDATE_URL, autoupdate_url)
            .with(keys::SCOOP_AUTOUPDATE_EXTRACT_DIR, extract_dir);
        let package_name = context.require_str(keys::SCOOP_PACKAGE_NAME)?;

        let mut files = Vec::new();
        for template in self.templates()? {
            let content = engine
                .render(&template.content, &context, &template.name)
                .map_err(|e| StageError::template(&template.name, e))?;
            files.push(ManifestFile {
                path: output_path(trim_template_extension(&template.name), package_name),
                content,
            });
        }

        Ok(Rendered::Files(files))
    }

    async fn deliver(
        &self,
        rendered: Rendered,
        options: &DeliveryOptions,
    ) -> Result<Delivery, StageError> {
        let Rendered::Files(files) = rendered else {
            return Err(StageError::configuration("scoop renders files, not messages"));
        };

        let written = write_all(&options.output_dir, &files)?;
        for path in &written {
            info!("scoop: wrote {}", path.display());
        }

        Ok(Delivery {
            simulated: false,
            detail: format!(
                "wrote {} file(s) to {}",
                written.len(),
                options.output_dir.join("scoop").display()
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use herald_core::{
        Artifact, Distribution, GitHost, Project, ReleaseInfo, Repository,
    };

    fn model() -> ReleaseModel {
        let mut project = Project::new("app", "2.3.0");
        project.description = Some("A \"quoted\" tool".to_string());
        project.license = Some("MIT".to_string());

        let mut artifact = Artifact::new("dist/app-2.3.0.zip");
        artifact.platform = Some("windows-x86_64".to_string());
        artifact.sha256 = Some("abc123".to_string());

        ReleaseModel {
            project,
            release: ReleaseInfo::new(Repository::new(GitHost::Github, "acme", "app"), "v2.3.0"),
            distribution: Distribution {
                name: "app".to_string(),
                artifacts: vec![artifact],
            },
        }
    }

    fn scoop(config: ScoopConfig) -> ScoopProcessor {
        ScoopProcessor::new(
            ScoopConfig {
                enabled: true,
                ..config
            },
            PathBuf::new(),
        )
    }

    fn render_manifest(processor: &ScoopProcessor) -> String {
        let engine = Engine::default();
        let ctx = processor.build_context(&model()).unwrap();
        let Rendered::Files(files) = processor.render(&engine, &ctx).unwrap() else {
            panic!("expected files");
        };
        assert_eq!(files[0].path, PathBuf::from("scoop/bucket/app.json"));
        files[0].content.clone()
    }

    fn manifest_json(processor: &ScoopProcessor) -> serde_json::Value {
        serde_json::from_str(&render_manifest(processor)).unwrap()
    }

    #[test]
    fn test_default_manifest() {
        let content = render_manifest(&scoop(ScoopConfig::default()));
        insta::assert_snapshot!(content.trim_end(), @r#"
        {
          "version": "2.3.0",
          "description": "A \"quoted\" tool",
          "license": "MIT",
          "url": "https://github.com/acme/app/releases/download/v2.3.0/app-2.3.0.zip",
          "hash": "abc123",
          "extract_dir": "app-2.3.0",
          "bin": "bin\\app.cmd",
          "checkver": {
            "url": "https://github.com/acme/app/releases/latest",
            "re": "v([\\d.]+)\\.zip"
          },
          "autoupdate": {
            "url": "https://github.com/acme/app/releases/download/v$version/app-$version.zip",
            "extract_dir": "app-$version"
          }
        }
        "#);
    }

    #[test]
    fn test_templated_autoupdate_url() {
        let processor = scoop(ScoopConfig {
            autoupdate_url: Some("https://host/app-{{projectVersion}}.zip".to_string()),
            ..Default::default()
        });
        let manifest = manifest_json(&processor);
        assert_eq!(manifest["autoupdate"]["url"], "https://host/app-$version.zip");
        assert_eq!(manifest["version"], "2.3.0");
    }

    #[test]
    fn test_literal_urls() {
        let processor = scoop(ScoopConfig {
            checkver_url: Some("https://acme.io/latest?v=2.3.0".to_string()),
            autoupdate_url: Some("https://acme.io/2.3.0/app.zip".to_string()),
            ..Default::default()
        });
        let manifest = manifest_json(&processor);
        // checkver is never rewritten
        assert_eq!(manifest["checkver"]["url"], "https://acme.io/latest?v=2.3.0");
        assert_eq!(manifest["autoupdate"]["url"], "https://acme.io/$version/app.zip");
    }

    #[test]
    fn test_special_characters_stay_valid_json() {
        let mut model = model();
        model.project.description = Some("Fast\n\"tab\"\tseparated".to_string());
        model.project.website = Some("https://acme.io/?q=\"app\"".to_string());
        model.project.license = Some("MIT\\Apache".to_string());

        let processor = scoop(ScoopConfig {
            checkver_url: Some("https://acme.io/\"latest\"".to_string()),
            ..Default::default()
        });
        let ctx = processor.build_context(&model).unwrap();
        let Rendered::Files(files) = processor.render(&Engine::default(), &ctx).unwrap() else {
            panic!("expected files");
        };
        let manifest: serde_json::Value = serde_json::from_str(&files[0].content).unwrap();

        assert_eq!(manifest["description"], "Fast\n\"tab\"\tseparated");
        assert_eq!(manifest["homepage"], "https://acme.io/?q=\"app\"");
        assert_eq!(manifest["license"], "MIT\\Apache");
        assert_eq!(manifest["checkver"]["url"], "https://acme.io/\"latest\"");
        assert_eq!(manifest["bin"], "bin\\app.cmd");
    }

    #[test]
    fn test_package_name_and_bucket() {
        let processor = scoop(ScoopConfig {
            package_name: Some("app-cli".to_string()),
            bucket: herald_core::config::BucketConfig {
                owner: Some("acme-tools".to_string()),
                name: "bucket".to_string(),
            },
            ..Default::default()
        });
        let ctx = processor.build_context(&model()).unwrap();

        assert_eq!(ctx.get_str(keys::SCOOP_PACKAGE_NAME), Some("app-cli"));
        assert_eq!(
            ctx.get_str(keys::SCOOP_BUCKET_REPO_URL),
            Some("https://github.com/acme-tools/bucket")
        );

        let Rendered::Files(files) = processor.render(&Engine::default(), &ctx).unwrap() else {
            panic!("expected files");
        };
        assert_eq!(files[0].path, PathBuf::from("scoop/bucket/app-cli.json"));
    }

    #[test]
    fn test_missing_artifact_is_a_configuration_error() {
        let mut model = model();
        model.distribution.artifacts.clear();

        let err = scoop(ScoopConfig::default())
            .build_context(&model)
            .unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("artifactFile"));
    }

    #[test]
    fn test_missing_checksum_is_a_configuration_error() {
        let mut model = model();
        model.distribution.artifacts[0].sha256 = None;

        let err = scoop(ScoopConfig::default())
            .build_context(&model)
            .unwrap_err();
        assert!(err.to_string().contains("artifactSha256"));
    }

    #[test]
    fn test_undefined_key_in_autoupdate_url() {
        let processor = scoop(ScoopConfig {
            autoupdate_url: Some("https://host/{{ projectVersoin }}.zip".to_string()),
            ..Default::default()
        });
        let ctx = processor.build_context(&model()).unwrap();
        let err = processor.render(&Engine::default(), &ctx).unwrap_err();
        assert!(err.is_template());
        assert!(err.to_string().contains("autoupdateUrl"));
    }

    #[test]
    fn test_template_directory_overrides_and_extends() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("manifest.json"),
            "{\"version\": \"{{ projectVersion }}\"}",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("README.md.j2"),
            "# {{ scoopPackageName }}\n",
        )
        .unwrap();

        // relative to the configuration directory
        let processor = ScoopProcessor::new(
            ScoopConfig {
                enabled: true,
                template_directory: Some(PathBuf::from(".")),
                ..Default::default()
            },
            dir.path().to_path_buf(),
        );

        let ctx = processor.build_context(&model()).unwrap();
        let Rendered::Files(files) = processor.render(&Engine::default(), &ctx).unwrap() else {
            panic!("expected files");
        };

        assert_eq!(files.len(), 2);
        assert_eq!(files[0].path, PathBuf::from("scoop/bucket/app.json"));
        assert_eq!(files[0].content, "{\"version\": \"2.3.0\"}");
        assert_eq!(files[1].path, PathBuf::from("scoop/README.md"));
        assert_eq!(files[1].content, "# app\n");
    }

    #[test]
    fn test_missing_template_directory() {
        let processor = scoop(ScoopConfig {
            template_directory: Some(PathBuf::from("/nonexistent/scoop-templates")),
            ..Default::default()
        });
        let ctx = processor.build_context(&model()).unwrap();
        let err = processor.render(&Engine::default(), &ctx).unwrap_err();
        assert!(err.is_configuration());
    }

    #[tokio::test]
    async fn test_deliver_writes_manifest() {
        let out = tempfile::tempdir().unwrap();
        let processor = scoop(ScoopConfig::default());
        let ctx = processor.build_context(&model()).unwrap();
        let rendered = processor.render(&Engine::default(), &ctx).unwrap();

        let options = DeliveryOptions {
            output_dir: out.path().to_path_buf(),
            dry_run: false,
        };
        let delivery = processor.deliver(rendered, &options).await.unwrap();

        assert!(!delivery.simulated);
        let written = std::fs::read_to_string(out.path().join("scoop/bucket/app.json")).unwrap();
        assert!(written.contains("\"version\": \"2.3.0\""));
    }
}

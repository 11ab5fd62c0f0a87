//! Writing rendered files under the output directory

use std::path::{Path, PathBuf};

use crate::error::StageError;
use crate::processor::ManifestFile;

/// Suffixes that mark a file as a template
const TEMPLATE_EXTENSIONS: &[&str] = &[".tpl", ".j2", ".jinja2"];

/// Output file name for a template: `manifest.json.tpl` becomes `manifest.json`
pub fn trim_template_extension(name: &str) -> &str {
    TEMPLATE_EXTENSIONS
        .iter()
        .find_map(|ext| name.strip_suffix(ext))
        .unwrap_or(name)
}

/// Write `content` to `path`, creating parent directories
pub fn write_file(path: &Path, content: &str) -> Result<(), StageError> {
    let io_err = |source| StageError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    std::fs::write(path, content).map_err(io_err)
}

/// Write every file under `root`, returning the paths written
pub fn write_all(root: &Path, files: &[ManifestFile]) -> Result<Vec<PathBuf>, StageError> {
    let mut written = Vec::with_capacity(files.len());
    for file in files {
        let path = root.join(&file.path);
        write_file(&path, &file.content)?;
        tracing::debug!("wrote {}", path.display());
        written.push(path);
    }
    Ok(written)
}

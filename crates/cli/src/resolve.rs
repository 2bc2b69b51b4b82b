use flamegraph_action_core::{ConfigError, models::UploadTarget};

/// Expand `pattern` into the files to upload. Matching nothing is not an error.
pub fn resolve(pattern: &str) -> Result<Vec<UploadTarget>, ConfigError> {
    let paths = glob::glob(pattern).map_err(|e| ConfigError::Pattern {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })?;
    let mut targets = vec![];
    for entry in paths {
        match entry {
            Ok(path) => match path.to_str() {
                Some(filepath) => targets.push(UploadTarget { filepath: filepath.to_string() }),
                None => tracing::warn!("Skipping non UTF-8 path {}", path.display()),
            },
            Err(e) => tracing::warn!("Skipping {}: {}", e.path().display(), e.error()),
        }
    }
    Ok(targets)
}

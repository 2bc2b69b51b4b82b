use std::path::Path;

use url::Url;

pub trait UrlExt {
    /// Appends `path` to the existing path, dropping any query.
    fn join_path(&self, path: &str) -> Url;
}

impl UrlExt for Url {
    #[inline]
    fn join_path(&self, path: &str) -> Url {
        let mut out = self.clone();
        out.set_path(&format!(
            "{}/{}",
            self.path().trim_end_matches('/'),
            path.trim_start_matches('/')
        ));
        out.set_query(None);
        out
    }
}

/// The final component of `path`, or the whole string when it has none.
pub fn base_name(path: &str) -> &str {
    Path::new(path).file_name().and_then(|name| name.to_str()).unwrap_or(path)
}

/// Format a size in bytes to a human-readable string.
/// Uses SI (kilo = 1000) units, formatted to two decimal places.
pub fn size(value: u64) -> String {
    let units = ["B", "kB", "MB", "GB", "TB"];
    let mut value = value as f64;
    let mut unit = 0;
    while value >= 1000.0 && unit < units.len() - 1 {
        value /= 1000.0;
        unit += 1;
    }
    format!("{:.2} {}", value, units[unit])
}

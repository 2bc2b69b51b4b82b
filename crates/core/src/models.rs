use std::fmt;

pub const DEFAULT_MARKER_ID: &str = "1";
pub const PREVIEW_BASE_URL: &str = "https://flamegraph.com/api/preview";

/// A file selected for upload by the glob pattern.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct UploadTarget {
    pub filepath: String,
}

/// A profile that was accepted by flamegraph.com.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct UploadedFlamegraph {
    pub filepath: String,
    pub url: String,
    pub key: String,
}

impl UploadedFlamegraph {
    pub fn preview_url(&self) -> String { format!("{}/{}", PREVIEW_BASE_URL, self.key) }
}

/// Invisible tag embedded at the end of a PR comment body. Comments carrying the
/// same marker belong to the same report thread.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct MagicMarker(String);

impl MagicMarker {
    /// Builds the marker for `id`, falling back to the default id when it is blank.
    pub fn new(id: &str) -> Self {
        let id = id.trim();
        let id = if id.is_empty() { DEFAULT_MARKER_ID } else { id };
        Self(format!("<!-- flamegraph.com:{id} -->"))
    }

    pub fn as_str(&self) -> &str { &self.0 }

    pub fn is_in(&self, body: &str) -> bool { body.contains(&self.0) }
}

impl Default for MagicMarker {
    fn default() -> Self { Self::new(DEFAULT_MARKER_ID) }
}

impl fmt::Display for MagicMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_format() {
        assert_eq!(MagicMarker::new("abc").as_str(), "<!-- flamegraph.com:abc -->");
        assert_eq!(MagicMarker::new(""), MagicMarker::default());
        assert_eq!(MagicMarker::new("  "), MagicMarker::new("1"));
    }

    #[test]
    fn test_marker_ids_do_not_collide() {
        let one = MagicMarker::new("1");
        let ten = MagicMarker::new("10");
        let body_one = format!("<h1>report</h1>{one}");
        let body_ten = format!("<h1>report</h1>{ten}");
        assert!(one.is_in(&body_one));
        assert!(!one.is_in(&body_ten));
        assert!(!ten.is_in(&body_one));
        assert!(ten.is_in(&body_ten));
    }

    #[test]
    fn test_preview_url() {
        let uploaded = UploadedFlamegraph {
            filepath: "cpu.pprof".to_string(),
            url: "https://flamegraph.com/share/abc".to_string(),
            key: "abc".to_string(),
        };
        assert_eq!(uploaded.preview_url(), "https://flamegraph.com/api/preview/abc");
    }
}

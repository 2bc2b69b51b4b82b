use std::{
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
};

use serde::Deserialize;
use thiserror::Error;
use url::Url;

pub const DEFAULT_UPLOAD_BASE_URL: &str = "https://www.flamegraph.com";
pub const DEFAULT_API_URL: &str = "https://api.github.com";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Input required and not supplied: {0}")]
    MissingInput(&'static str),
    #[error(
        "Input does not meet YAML 1.2 \"Core Schema\" specification: {name} ('{value}'). \
         Supported boolean values: `true | True | TRUE | false | False | FALSE`"
    )]
    InvalidBoolean { name: &'static str, value: String },
    #[error("Invalid glob pattern '{pattern}': {message}")]
    Pattern { pattern: String, message: String },
    #[error("Invalid repository '{0}', expected owner/name")]
    InvalidRepository(String),
    #[error("Invalid URL '{value}'")]
    InvalidUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Failed to parse event payload {path}")]
    EventPayload {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Action inputs given explicitly, e.g. on the command line. Anything left unset
/// falls back to the `INPUT_*` variables GitHub Actions provides.
#[derive(Debug, Clone, Default)]
pub struct InputOverrides {
    pub file: Option<String>,
    pub token: Option<String>,
    pub post_in_pr: Option<String>,
    pub id: Option<String>,
    pub base_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ActionInputs {
    /// Glob pattern selecting the profiles to upload.
    pub file: String,
    pub token: Option<String>,
    pub post_in_pr: bool,
    /// Identifier for the PR comment marker.
    pub id: String,
    pub base_url: Url,
}

impl ActionInputs {
    pub fn resolve<F>(overrides: InputOverrides, lookup: F) -> Result<Self, ConfigError>
    where F: Fn(&str) -> Option<String> {
        let get = |value: Option<String>, name: &str| {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .or_else(|| input(&lookup, name))
        };
        let file = get(overrides.file, "file").ok_or(ConfigError::MissingInput("file"))?;
        let token = get(overrides.token, "token");
        let post_in_pr = match get(overrides.post_in_pr, "postInPR") {
            Some(value) => parse_bool("postInPR", &value)?,
            None => false,
        };
        let id = get(overrides.id, "id").unwrap_or_default();
        let base_url = get(overrides.base_url, "baseUrl")
            .unwrap_or_else(|| DEFAULT_UPLOAD_BASE_URL.to_string());
        let base_url = parse_url(&base_url)?;
        Ok(Self { file, token, post_in_pr, id, base_url })
    }
}

/// Reads an action input the way the Actions toolkit does: `INPUT_<NAME>`, with
/// spaces replaced by underscores, trimmed, and empty treated as unset.
pub fn input<F>(lookup: &F, name: &str) -> Option<String>
where F: Fn(&str) -> Option<String> {
    let key = format!("INPUT_{}", name.replace(' ', "_").to_uppercase());
    lookup(&key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

pub fn parse_bool(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value {
        "true" | "True" | "TRUE" => Ok(true),
        "false" | "False" | "FALSE" => Ok(false),
        _ => Err(ConfigError::InvalidBoolean { name, value: value.to_string() }),
    }
}

fn parse_url(value: &str) -> Result<Url, ConfigError> {
    Url::parse(value).map_err(|source| ConfigError::InvalidUrl { value: value.to_string(), source })
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl FromStr for RepoRef {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
                Ok(Self { owner: owner.to_string(), name: name.to_string() })
            }
            _ => Err(ConfigError::InvalidRepository(s.to_string())),
        }
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// The CI environment the action runs in, detected once at startup.
#[derive(Debug, Clone)]
pub struct CiContext {
    pub repository: Option<RepoRef>,
    /// Set when the triggering event carries a pull request.
    pub pull_request: Option<u64>,
    pub api_url: Url,
    /// Destination of the job summary; `None` when the runner offers none.
    pub step_summary: Option<PathBuf>,
    pub output: Option<PathBuf>,
}

#[derive(Deserialize)]
struct EventPayload {
    pull_request: Option<PullRequestPayload>,
}

#[derive(Deserialize)]
struct PullRequestPayload {
    number: u64,
}

impl CiContext {
    pub fn from_env() -> Result<Self, ConfigError> { Self::from_lookup(|key| std::env::var(key).ok()) }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where F: Fn(&str) -> Option<String> {
        let var = |key: &str| lookup(key).filter(|v| !v.is_empty());
        let repository = var("GITHUB_REPOSITORY").map(|v| v.parse()).transpose()?;
        let pull_request = match var("GITHUB_EVENT_PATH") {
            Some(path) => read_pull_request_number(Path::new(&path))?,
            None => None,
        };
        let api_url =
            parse_url(&var("GITHUB_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()))?;
        Ok(Self {
            repository,
            pull_request,
            api_url,
            step_summary: var("GITHUB_STEP_SUMMARY").map(PathBuf::from),
            output: var("GITHUB_OUTPUT").map(PathBuf::from),
        })
    }

    pub fn is_pull_request(&self) -> bool { self.pull_request.is_some() }
}

fn read_pull_request_number(path: &Path) -> Result<Option<u64>, ConfigError> {
    let data = match std::fs::read(path) {
        Ok(data) => data,
        Err(e) => {
            tracing::warn!("Event payload {} could not be read: {}", path.display(), e);
            return Ok(None);
        }
    };
    let payload: EventPayload = serde_json::from_slice(&data)
        .map_err(|source| ConfigError::EventPayload { path: path.to_path_buf(), source })?;
    Ok(payload.pull_request.map(|pr| pr.number))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + use<> {
        let vars: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_inputs_from_env() {
        let inputs = ActionInputs::resolve(
            InputOverrides::default(),
            lookup(&[
                ("INPUT_FILE", "profiles/*.pprof"),
                ("INPUT_TOKEN", "ghs_abc"),
                ("INPUT_POSTINPR", "true"),
                ("INPUT_ID", " cpu "),
            ]),
        )
        .unwrap();
        assert_eq!(inputs.file, "profiles/*.pprof");
        assert_eq!(inputs.token.as_deref(), Some("ghs_abc"));
        assert!(inputs.post_in_pr);
        assert_eq!(inputs.id, "cpu");
        assert_eq!(inputs.base_url.as_str(), "https://www.flamegraph.com/");
    }

    #[test]
    fn test_overrides_win() {
        let overrides = InputOverrides {
            file: Some("a.json".to_string()),
            post_in_pr: Some("False".to_string()),
            base_url: Some("http://localhost:8080".to_string()),
            ..Default::default()
        };
        let inputs = ActionInputs::resolve(
            overrides,
            lookup(&[("INPUT_FILE", "b.json"), ("INPUT_POSTINPR", "true")]),
        )
        .unwrap();
        assert_eq!(inputs.file, "a.json");
        assert!(!inputs.post_in_pr);
        assert_eq!(inputs.token, None);
        assert_eq!(inputs.id, "");
        assert_eq!(inputs.base_url.as_str(), "http://localhost:8080/");
    }

    #[test]
    fn test_missing_file() {
        let err = ActionInputs::resolve(InputOverrides::default(), lookup(&[("INPUT_FILE", "  ")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingInput("file")));
    }

    #[test]
    fn test_invalid_bool() {
        let err = ActionInputs::resolve(
            InputOverrides::default(),
            lookup(&[("INPUT_FILE", "x"), ("INPUT_POSTINPR", "yes")]),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBoolean { name: "postInPR", .. }));
    }

    #[test]
    fn test_repo_ref() {
        let repo: RepoRef = "pyroscope-io/flamegraph.com".parse().unwrap();
        assert_eq!(repo.owner, "pyroscope-io");
        assert_eq!(repo.name, "flamegraph.com");
        assert_eq!(repo.to_string(), "pyroscope-io/flamegraph.com");
        for invalid in ["", "owner", "owner/", "/name", "a/b/c"] {
            assert!(invalid.parse::<RepoRef>().is_err(), "{invalid}");
        }
    }

    #[test]
    fn test_ci_context_pull_request() {
        let dir = tempfile::tempdir().unwrap();
        let event_path = dir.path().join("event.json");
        std::fs::write(&event_path, r#"{"action":"synchronize","pull_request":{"number":42}}"#)
            .unwrap();
        let event_path = event_path.to_str().unwrap().to_string();
        let ctx = CiContext::from_lookup(lookup(&[
            ("GITHUB_REPOSITORY", "octo/repo"),
            ("GITHUB_EVENT_NAME", "pull_request"),
            ("GITHUB_EVENT_PATH", event_path.as_str()),
            ("GITHUB_STEP_SUMMARY", "/tmp/summary.md"),
        ]))
        .unwrap();
        assert_eq!(ctx.pull_request, Some(42));
        assert!(ctx.is_pull_request());
        assert_eq!(ctx.repository, Some(RepoRef { owner: "octo".into(), name: "repo".into() }));
        assert_eq!(ctx.api_url.as_str(), "https://api.github.com/");
        assert_eq!(ctx.step_summary, Some(PathBuf::from("/tmp/summary.md")));
        assert_eq!(ctx.output, None);
    }

    #[test]
    fn test_ci_context_push_event() {
        let dir = tempfile::tempdir().unwrap();
        let event_path = dir.path().join("event.json");
        std::fs::write(&event_path, r#"{"ref":"refs/heads/main"}"#).unwrap();
        let event_path = event_path.to_str().unwrap().to_string();
        let ctx = CiContext::from_lookup(lookup(&[
            ("GITHUB_EVENT_PATH", event_path.as_str()),
            ("GITHUB_API_URL", "https://ghe.example.com/api/v3"),
        ]))
        .unwrap();
        assert!(!ctx.is_pull_request());
        assert_eq!(ctx.step_summary, None);
        assert_eq!(ctx.api_url.as_str(), "https://ghe.example.com/api/v3");
    }

    #[test]
    fn test_ci_context_outside_actions() {
        let ctx = CiContext::from_lookup(lookup(&[("GITHUB_EVENT_PATH", "/nonexistent/event.json")]))
            .unwrap();
        assert_eq!(ctx.pull_request, None);
        assert_eq!(ctx.repository, None);
    }
}

pub mod comment;
pub mod summary;

use flamegraph_action_core::{
    config::RepoRef,
    models::{MagicMarker, UploadedFlamegraph},
};
use http::StatusCode;
use octocrab::{Octocrab, service::middleware::retry::RetryConfig};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::comment::generate_comment;

const COMMENTS_PER_PAGE: u8 = 100;

#[derive(Error, Debug)]
pub enum PublishError {
    #[error("Not a pull request")]
    NotAPullRequest,
    #[error("Repository is unknown, GITHUB_REPOSITORY is not set")]
    MissingRepository,
    #[error("GitHub rejected the token: {0}")]
    Auth(String),
    #[error("GitHub API request failed")]
    Api(#[source] octocrab::Error),
}

impl From<octocrab::Error> for PublishError {
    fn from(err: octocrab::Error) -> Self {
        if let octocrab::Error::GitHub { source, .. } = &err
            && matches!(source.status_code, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
        {
            return Self::Auth(source.message.clone());
        }
        Self::Api(err)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct IssueComment {
    pub id: u64,
    pub body: Option<String>,
    pub html_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentAction {
    Created,
    Updated,
}

#[derive(Debug, Clone)]
pub struct PublishedComment {
    pub id: u64,
    pub html_url: Option<String>,
    pub action: CommentAction,
}

#[derive(Serialize)]
struct PageParams {
    per_page: u8,
    page: u32,
}

#[derive(Serialize)]
struct CommentBody<'a> {
    body: &'a str,
}

/// Publishes the report as a PR comment, keeping at most one comment per
/// marker on each pull request.
pub struct CommentPublisher {
    client: Octocrab,
    repo: RepoRef,
    marker: MagicMarker,
}

impl CommentPublisher {
    /// The token is passed through untouched; GitHub decides whether it is valid.
    pub fn new(
        api_url: &Url,
        token: Option<String>,
        repo: RepoRef,
        marker: MagicMarker,
    ) -> Result<Self, PublishError> {
        let mut builder =
            Octocrab::builder().base_uri(api_url.as_str())?.add_retry_config(RetryConfig::None);
        if let Some(token) = token {
            builder = builder.personal_token(token);
        }
        let client = builder.build()?;
        Ok(Self { client, repo, marker })
    }

    pub async fn publish(
        &self,
        results: &[UploadedFlamegraph],
        pull_request: Option<u64>,
    ) -> Result<PublishedComment, PublishError> {
        let number = pull_request.ok_or(PublishError::NotAPullRequest)?;
        let body = generate_comment(results, &self.marker);
        let (comment, action) = match self.find_previous_comment(number).await? {
            Some(previous) => {
                tracing::info!("Updating comment {} on {}#{}", previous.id, self.repo, number);
                (self.update_comment(previous.id, &body).await?, CommentAction::Updated)
            }
            None => {
                tracing::info!("Creating comment on {}#{}", self.repo, number);
                (self.create_comment(number, &body).await?, CommentAction::Created)
            }
        };
        Ok(PublishedComment { id: comment.id, html_url: comment.html_url, action })
    }

    /// Walks every page of the PR's comments, stopping at the first one that
    /// carries our marker.
    pub async fn find_previous_comment(
        &self,
        number: u64,
    ) -> Result<Option<IssueComment>, PublishError> {
        let route =
            format!("/repos/{}/{}/issues/{}/comments", self.repo.owner, self.repo.name, number);
        let mut page = 1;
        loop {
            let comments: Vec<IssueComment> = self
                .client
                .get(&route, Some(&PageParams { per_page: COMMENTS_PER_PAGE, page }))
                .await?;
            tracing::debug!("Fetched {} comments from page {}", comments.len(), page);
            let last_page = comments.len() < COMMENTS_PER_PAGE as usize;
            if let Some(comment) = comments
                .into_iter()
                .find(|c| c.body.as_deref().is_some_and(|body| self.marker.is_in(body)))
            {
                return Ok(Some(comment));
            }
            if last_page {
                return Ok(None);
            }
            page += 1;
        }
    }

    async fn create_comment(&self, number: u64, body: &str) -> Result<IssueComment, PublishError> {
        let route =
            format!("/repos/{}/{}/issues/{}/comments", self.repo.owner, self.repo.name, number);
        Ok(self.client.post(route, Some(&CommentBody { body })).await?)
    }

    async fn update_comment(&self, id: u64, body: &str) -> Result<IssueComment, PublishError> {
        let route = format!("/repos/{}/{}/issues/comments/{}", self.repo.owner, self.repo.name, id);
        Ok(self.client.patch(route, Some(&CommentBody { body })).await?)
    }
}

use anyhow::{Context, Result};
use flamegraph_action_core::{
    config::{ActionInputs, CiContext},
    models::{MagicMarker, UploadedFlamegraph},
};
use flamegraph_action_github::{
    CommentPublisher, PublishError, PublishedComment,
    summary::{SummarySink, render_summary},
};
use flamegraph_action_upload::Uploader;

use crate::resolve::resolve;

#[derive(Debug)]
pub enum RunOutcome {
    /// The pattern matched nothing; no summary was written and no comment touched.
    NoFiles,
    Completed { uploaded: Vec<UploadedFlamegraph>, comment: Option<PublishedComment> },
}

/// Resolve, upload, summarize, then publish to the pull request if requested.
///
/// Uploads run one at a time in resolver order. The first failed upload aborts
/// the run before anything is reported.
pub async fn run(
    inputs: &ActionInputs,
    context: &CiContext,
    summary: &mut dyn SummarySink,
) -> Result<RunOutcome> {
    let targets = resolve(&inputs.file)?;
    if targets.is_empty() {
        tracing::info!("No files matched '{}'", inputs.file);
        return Ok(RunOutcome::NoFiles);
    }
    tracing::info!("Found {} files matching '{}'", targets.len(), inputs.file);

    let uploader = Uploader::new(&inputs.base_url).context("Failed to create HTTP client")?;
    let mut uploaded = Vec::with_capacity(targets.len());
    for target in &targets {
        let result = uploader.upload(target).await?;
        tracing::info!("Uploaded {}: {}", result.filepath, result.url);
        uploaded.push(result);
    }

    render_summary(summary, &uploaded).context("Failed to write job summary")?;

    let comment = if !inputs.post_in_pr {
        None
    } else if !context.is_pull_request() {
        tracing::info!("Not running for a pull request, skipping PR comment");
        None
    } else {
        let comment = publish_comment(inputs, context, &uploaded)
            .await
            .context("Failed to publish PR comment")?;
        Some(comment)
    };
    Ok(RunOutcome::Completed { uploaded, comment })
}

async fn publish_comment(
    inputs: &ActionInputs,
    context: &CiContext,
    uploaded: &[UploadedFlamegraph],
) -> Result<PublishedComment, PublishError> {
    let repo = context.repository.clone().ok_or(PublishError::MissingRepository)?;
    let publisher = CommentPublisher::new(
        &context.api_url,
        inputs.token.clone(),
        repo,
        MagicMarker::new(&inputs.id),
    )?;
    publisher.publish(uploaded, context.pull_request).await
}

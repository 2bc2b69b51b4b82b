use std::path::PathBuf;

use anyhow::{Context, Result};
use argp::FromArgs;
use flamegraph_action_core::config::{ActionInputs, CiContext, InputOverrides};
use flamegraph_action_github::summary::summary_sink;

use crate::{
    actions,
    runner::{RunOutcome, run as run_action},
};

#[derive(FromArgs, PartialEq, Eq, Debug)]
/// Upload profiles to flamegraph.com and report the links.
/// Unset options fall back to the INPUT_* variables set by GitHub Actions.
#[argp(subcommand, name = "upload")]
pub struct Args {
    #[argp(option, short = 'f')]
    /// glob pattern selecting the profiles to upload
    file: Option<String>,
    #[argp(option)]
    /// GitHub token used to comment on the pull request
    token: Option<String>,
    #[argp(option)]
    /// post the report as a pull request comment (true/false)
    post_in_pr: Option<String>,
    #[argp(option)]
    /// identifier separating independent reports on the same pull request
    id: Option<String>,
    #[argp(option)]
    /// flamegraph.com base URL
    base_url: Option<String>,
    #[argp(option, short = 'o')]
    /// write the job summary to this file instead of $GITHUB_STEP_SUMMARY
    summary_file: Option<String>,
}

pub async fn run(args: Args) -> Result<()> {
    let overrides = InputOverrides {
        file: args.file,
        token: args.token,
        post_in_pr: args.post_in_pr,
        id: args.id,
        base_url: args.base_url,
    };
    let inputs = ActionInputs::resolve(overrides, |key| std::env::var(key).ok())?;
    let mut context = CiContext::from_env().context("Failed to read the GitHub Actions context")?;
    if let Some(path) = args.summary_file {
        context.step_summary = Some(PathBuf::from(path));
    }

    let mut summary = summary_sink(context.step_summary.as_deref());
    match run_action(&inputs, &context, summary.as_mut()).await? {
        RunOutcome::NoFiles => {}
        RunOutcome::Completed { uploaded, comment } => {
            if let [single] = uploaded.as_slice()
                && let Some(output) = &context.output
            {
                actions::set_output(output, "url", &single.url)?;
            }
            if let Some(comment) = comment {
                tracing::info!(
                    "Report comment {:?}: {}",
                    comment.action,
                    comment.html_url.as_deref().unwrap_or("<unknown>")
                );
            }
        }
    }
    Ok(())
}

use std::{
    fs::OpenOptions,
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use flamegraph_action_core::models::UploadedFlamegraph;

/// Job summary builder, modeled on the GitHub Actions summary API. Content is
/// buffered by the `add_*` calls and only emitted by [`SummarySink::write`].
pub trait SummarySink {
    fn add_heading(&mut self, text: &str, level: u8);
    fn add_link(&mut self, text: &str, href: &str);
    fn add_break(&mut self);
    fn add_raw(&mut self, html: &str);
    fn add_separator(&mut self);
    fn write(&mut self) -> Result<()>;
}

/// Select the sink for the current runner: the summary file when one is
/// available, a [`NullSummary`] otherwise.
pub fn summary_sink(path: Option<&Path>) -> Box<dyn SummarySink> {
    match path {
        Some(path) => Box::new(FileSummary::new(path)),
        None => {
            tracing::debug!("No job summary file available, summary output disabled");
            Box::new(NullSummary::default())
        }
    }
}

pub fn render_summary(sink: &mut dyn SummarySink, results: &[UploadedFlamegraph]) -> Result<()> {
    for result in results {
        sink.add_heading(&result.filepath, 4);
        sink.add_link("View Run in Flamegraph.com", &result.url);
        sink.add_break();
        sink.add_raw(&format!(
            "<a href=\"{}\" target=\"_blank\"><img src=\"{}\" /></a>",
            result.url,
            result.preview_url()
        ));
        sink.add_separator();
    }
    sink.write()
}

/// Appends to the file named by `GITHUB_STEP_SUMMARY`.
pub struct FileSummary {
    path: PathBuf,
    buffer: String,
}

impl FileSummary {
    pub fn new(path: impl Into<PathBuf>) -> Self { Self { path: path.into(), buffer: String::new() } }

    pub fn buffer(&self) -> &str { &self.buffer }

    fn add_element(&mut self, element: String) {
        self.buffer.push_str(&element);
        self.buffer.push('\n');
    }
}

impl SummarySink for FileSummary {
    fn add_heading(&mut self, text: &str, level: u8) {
        let level = if (1..=6).contains(&level) { level } else { 1 };
        self.add_element(format!("<h{level}>{text}</h{level}>"));
    }

    fn add_link(&mut self, text: &str, href: &str) {
        self.add_element(format!("<a href=\"{href}\">{text}</a>"));
    }

    fn add_break(&mut self) { self.add_element("<br>".to_string()) }

    fn add_raw(&mut self, html: &str) { self.buffer.push_str(html) }

    fn add_separator(&mut self) { self.add_element("<hr>".to_string()) }

    fn write(&mut self) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Unable to access summary file '{}'", self.path.display()))?;
        file.write_all(self.buffer.as_bytes())
            .with_context(|| format!("Failed to write summary file '{}'", self.path.display()))?;
        self.buffer.clear();
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryCall {
    Heading { text: String, level: u8 },
    Link { text: String, href: String },
    Break,
    Raw(String),
    Separator,
    Write,
}

/// Stand-in used when the runner offers no job summary: calls are recorded and
/// logged at debug level, nothing is written.
#[derive(Debug, Default)]
pub struct NullSummary {
    calls: Vec<SummaryCall>,
}

impl NullSummary {
    pub fn calls(&self) -> &[SummaryCall] { &self.calls }

    fn record(&mut self, call: SummaryCall) {
        tracing::debug!("summary: {:?}", call);
        self.calls.push(call);
    }
}

impl SummarySink for NullSummary {
    fn add_heading(&mut self, text: &str, level: u8) {
        self.record(SummaryCall::Heading { text: text.to_string(), level });
    }

    fn add_link(&mut self, text: &str, href: &str) {
        self.record(SummaryCall::Link { text: text.to_string(), href: href.to_string() });
    }

    fn add_break(&mut self) { self.record(SummaryCall::Break) }

    fn add_raw(&mut self, html: &str) { self.record(SummaryCall::Raw(html.to_string())) }

    fn add_separator(&mut self) { self.record(SummaryCall::Separator) }

    fn write(&mut self) -> Result<()> {
        self.record(SummaryCall::Write);
        Ok(())
    }
}

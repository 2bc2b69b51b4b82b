use flamegraph_action_core::{
    models::{MagicMarker, UploadedFlamegraph},
    util::base_name,
};

pub const FOOTER: &str = "Created by <a href=\"https://github.com/pyroscope-io/flamegraph.com-github-action\">Flamegraph.com Github Action</a>";

/// Render the PR comment body. The marker always comes last so a later run can
/// find this comment again.
pub fn generate_comment(results: &[UploadedFlamegraph], marker: &MagicMarker) -> String {
    let mut comment = String::from("<h1>Flamegraph.com report</h1>\n");
    for result in results {
        // target="_blank" is stripped by GitHub, so links open in place.
        comment.push_str("<details>\n");
        comment.push_str(&format!("<summary>{}</summary>\n", base_name(&result.filepath)));
        comment.push_str(&format!(
            "<a href=\"{}\"><img src=\"{}\" /></a>\n",
            result.url,
            result.preview_url()
        ));
        comment.push_str("<br />\n");
        comment.push_str(&format!("<a href=\"{}\">See in flamegraph.com</a>\n", result.url));
        comment.push_str("</details>\n");
    }
    comment.push_str("<br/>\n");
    comment.push_str(FOOTER);
    comment.push_str(marker.as_str());
    comment
}

//! GitHub Actions workflow commands.

use std::{fs::OpenOptions, io::Write, path::Path};

use anyhow::{Context, Result, ensure};

/// Report the run as failed. The runner turns this into an error annotation;
/// the caller is responsible for the non-zero exit code.
pub fn set_failed(message: &str) { println!("{}", error_command(message)) }

fn error_command(message: &str) -> String { format!("::error::{}", escape_data(message)) }

fn escape_data(value: &str) -> String {
    value.replace('%', "%25").replace('\r', "%0D").replace('\n', "%0A")
}

/// Append a step output to the `GITHUB_OUTPUT` file.
pub fn set_output(path: &Path, name: &str, value: &str) -> Result<()> {
    ensure!(!value.contains('\n') && !value.contains('\r'), "Output {name} must be a single line");
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open output file '{}'", path.display()))?;
    writeln!(file, "{name}={value}")
        .with_context(|| format!("Failed to write output file '{}'", path.display()))?;
    Ok(())
}

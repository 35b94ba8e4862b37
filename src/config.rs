use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use tracing::debug;

use crate::error::{Result, ToolError};

/// Environment variable holding the default API base URL.
pub const CKAN_URL_ENV: &str = "CKAN_URL";
/// Message shown when the API base URL has to be entered interactively.
pub const URL_PROMPT: &str = "Enter CKAN URL:";
/// Rows shown in the final preview unless overridden.
pub const DEFAULT_PREVIEW_ROWS: usize = 5;

/// Runtime settings for one analysis run.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Site address of the CKAN instance, without `/api/action`.
    pub api_url: String,
    /// Identifier or name of the dataset to combine.
    pub identifier: String,
    /// Number of leading rows printed from the combined table.
    pub preview_rows: usize,
    /// Optional workbook receiving the full combined table.
    pub output: Option<PathBuf>,
}

/// Source of interactively entered configuration values.
pub trait Prompt {
    /// Shows `message` and returns the entered line, or `None` at end of input.
    fn ask(&mut self, message: &str) -> Result<Option<String>>;
}

/// [`Prompt`] reading from standard input.
#[derive(Debug, Default)]
pub struct StdinPrompt;

impl Prompt for StdinPrompt {
    fn ask(&mut self, message: &str) -> Result<Option<String>> {
        let mut stdout = io::stdout();
        write!(stdout, "{message}")?;
        stdout.flush()?;

        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }
}

/// Resolves the API base URL: explicit flag, then the [`CKAN_URL_ENV`]
/// variable looked up through `env`, then `prompt`.
///
/// A flag that is present replaces the environment value entirely, so an
/// empty flag goes straight to the prompt. An empty environment value also
/// falls through to the prompt.
pub fn resolve_api_url<E, P>(explicit: Option<String>, env: E, prompt: &mut P) -> Result<String>
where
    E: Fn(&str) -> Option<String>,
    P: Prompt + ?Sized,
{
    let candidate = match explicit {
        Some(url) => {
            debug!("using API URL from command line");
            url
        }
        None => env(CKAN_URL_ENV).unwrap_or_default(),
    };
    if !candidate.is_empty() {
        return Ok(candidate);
    }
    prompt.ask(URL_PROMPT)?.ok_or(ToolError::MissingApiUrl)
}

/// Reads a variable from the process environment, ignoring non-UTF-8 values.
pub fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

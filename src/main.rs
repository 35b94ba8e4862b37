use std::path::PathBuf;

use clap::Parser;
use idea_tools::ckan::RemoteCkan;
use idea_tools::config::{self, DEFAULT_PREVIEW_ROWS, Settings, StdinPrompt};
use idea_tools::io::http::{self, HttpDownloader};
use idea_tools::{Result, combine, logging};

fn main() {
    let cli = Cli::parse();
    if let Err(error) = run(cli) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let level = config::process_env(logging::LOG_LEVEL_ENV);
    logging::init(level.as_deref())?;

    let api_url = config::resolve_api_url(cli.url, config::process_env, &mut StdinPrompt)?;
    let settings = Settings {
        api_url,
        identifier: cli.identifier,
        preview_rows: cli.preview_rows,
        output: cli.output,
    };

    let client = http::build_client()?;
    let api = RemoteCkan::new(settings.api_url.clone(), client.clone());
    let downloader = HttpDownloader::new(client);

    let mut stdout = std::io::stdout().lock();
    combine::run(&settings, &api, &downloader, &mut stdout)?;
    Ok(())
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Retrieve, combine, and analyze data files in a CKAN instance.",
    after_help = "The program uses the following environment variables:\n  \
        CKAN_URL: The base URL for the API to use (without the trailing \"/api/action\" text).\n  \
        LOGLEVEL: Log threshold (DEBUG, INFO, WARNING, ERROR). Defaults to ERROR."
)]
struct Cli {
    /// The unique identifier for a dataset to use.
    identifier: String,

    /// URL for the CKAN API.
    #[arg(short, long)]
    url: Option<String>,

    /// Number of rows of the combined table to print.
    #[arg(long, default_value_t = DEFAULT_PREVIEW_ROWS)]
    preview_rows: usize,

    /// Also save the combined table as an Excel workbook.
    #[arg(long)]
    output: Option<PathBuf>,
}

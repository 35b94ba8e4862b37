use std::io::Write;

use tracing::{debug, info, instrument};

use crate::ckan::{CkanApi, Resource, get_data_file_list};
use crate::config::Settings;
use crate::error::{Result, ToolError};
use crate::io::excel_write;
use crate::io::http::Downloader;
use crate::loader::retrieve_data;
use crate::model::Table;

/// Suffix a resource URL must end with to be treated as a data file.
pub const SPREADSHEET_SUFFIX: &str = "xlsx";

/// Plain, case-sensitive suffix check on the resource URL.
pub fn is_spreadsheet_url(url: &str) -> bool {
    url.ends_with(SPREADSHEET_SUFFIX)
}

/// Loads every spreadsheet resource and appends the results in listing order.
/// Files that fail to load are skipped.
#[instrument(level = "info", skip_all, fields(resources = resources.len()))]
pub fn combine_resources<D>(resources: &[Resource], downloader: &D) -> Table
where
    D: Downloader + ?Sized,
{
    let mut combined = Table::new();
    for resource in resources {
        let Some(url) = resource.url.as_deref() else {
            continue;
        };
        if !is_spreadsheet_url(url) {
            debug!(url, "skipping resource that is not a spreadsheet");
            continue;
        }
        if let Some(table) = retrieve_data(downloader, url) {
            info!(url, rows = table.row_count(), "appending data file");
            combined.concat(table);
        }
    }
    combined
}

/// Lists the resources of `identifier` and combines its spreadsheets.
#[instrument(level = "info", skip(api, downloader))]
pub fn analyze<C, D>(api: &C, downloader: &D, identifier: &str) -> Result<Table>
where
    C: CkanApi + ?Sized,
    D: Downloader + ?Sized,
{
    let resources = get_data_file_list(api, identifier)?
        .ok_or_else(|| ToolError::MissingResources(identifier.to_string()))?;
    let combined = combine_resources(&resources, downloader);
    info!(
        rows = combined.row_count(),
        columns = combined.columns().len(),
        "combined data files"
    );
    Ok(combined)
}

/// Runs the analysis for `settings`, prints the preview to `out`, and saves
/// the combined table when an output path is configured.
pub fn run<C, D, W>(settings: &Settings, api: &C, downloader: &D, out: &mut W) -> Result<Table>
where
    C: CkanApi + ?Sized,
    D: Downloader + ?Sized,
    W: Write + ?Sized,
{
    let combined = analyze(api, downloader, &settings.identifier)?;
    writeln!(out, "{}", combined.head(settings.preview_rows))?;

    if let Some(path) = &settings.output {
        excel_write::write_table(path, &combined)?;
        info!(output = %path.display(), "combined table written");
    }
    Ok(combined)
}

mod common;

use common::{FakeCkan, FakeDownloader, Fixture, data_file};
use idea_tools::ToolError;
use idea_tools::ckan::Resource;
use idea_tools::combine::{analyze, combine_resources, is_spreadsheet_url, run};
use idea_tools::config::Settings;
use idea_tools::io::excel_read::read_first_sheet;
use idea_tools::loader::SCHOOL_YEAR_COLUMN;
use idea_tools::model::CellValue;
use serde_json::json;
use tempfile::tempdir;

const FIRST: &str = "https://files.example.org/ceis-2018-19.xlsx";
const SECOND: &str = "https://files.example.org/ceis-2019-20.xlsx";
const BROKEN: &str = "https://files.example.org/ceis-2020-21.xlsx";

fn record(state: &'static str, leas: f64) -> [Fixture; 4] {
    [
        Fixture::Text(state),
        Fixture::Number(leas),
        Fixture::Number(leas * 10.0),
        Fixture::Number(leas * 2.0),
    ]
}

fn downloader() -> FakeDownloader {
    FakeDownloader::default()
        .with_file(FIRST, data_file("2018-2019", &[record("Alabama", 130.0), record("Alaska", 50.0)]))
        .with_file(SECOND, data_file("2019-2020", &[record("Arizona", 600.0)]))
        .with_file(BROKEN, b"PK\x03\x04 truncated".to_vec())
}

fn states(table: &idea_tools::model::Table) -> Vec<String> {
    table.rows().iter().map(|row| row[0].to_string()).collect()
}

#[test]
fn suffix_check_is_plain_and_case_sensitive() {
    assert!(is_spreadsheet_url("https://files.example.org/a.xlsx"));
    assert!(is_spreadsheet_url("https://files.example.org/download?format=xlsx"));
    assert!(!is_spreadsheet_url("https://files.example.org/a.XLSX"));
    assert!(!is_spreadsheet_url("https://files.example.org/a.xlsm"));
    assert!(!is_spreadsheet_url("https://files.example.org/a.csv"));
}

#[test]
fn spreadsheets_are_combined_in_listing_order() {
    let resources = vec![
        Resource::with_url(SECOND),
        Resource::with_url("https://files.example.org/readme.csv"),
        Resource::default(),
        Resource::with_url(FIRST),
    ];
    let downloader = downloader();

    let combined = combine_resources(&resources, &downloader);

    assert_eq!(states(&combined), ["Arizona", "Alabama", "Alaska"]);
    let years = combined.column_values(SCHOOL_YEAR_COLUMN).expect("school year column");
    assert_eq!(years, [
        &CellValue::from("2019-2020"),
        &CellValue::from("2018-2019"),
        &CellValue::from("2018-2019"),
    ]);
    assert_eq!(combined.rows()[1][1], CellValue::Int(130));
}

#[test]
fn non_spreadsheet_resources_are_never_downloaded() {
    let resources = vec![
        Resource::with_url("https://files.example.org/a.csv"),
        Resource::with_url("https://files.example.org/a.XLSX"),
        Resource::with_url(FIRST),
    ];
    let downloader = downloader();

    combine_resources(&resources, &downloader);

    assert_eq!(*downloader.requests.borrow(), [FIRST.to_string()]);
}

#[test]
fn failing_file_is_excluded_without_residue() {
    let downloader = downloader();
    let with_broken = vec![
        Resource::with_url(FIRST),
        Resource::with_url(BROKEN),
        Resource::with_url("https://files.example.org/missing.xlsx"),
        Resource::with_url(SECOND),
    ];
    let without_broken = vec![Resource::with_url(FIRST), Resource::with_url(SECOND)];

    let combined = combine_resources(&with_broken, &downloader);

    assert_eq!(combined, combine_resources(&without_broken, &downloader));
    assert_eq!(combined.row_count(), 3);
}

#[test]
fn analyze_fails_when_dataset_is_unknown() {
    let result = analyze(&FakeCkan::default(), &downloader(), "no-such-id");

    assert!(matches!(result, Err(ToolError::MissingResources(id)) if id == "no-such-id"));
}

#[test]
fn run_prints_preview_and_writes_workbook() {
    let api = FakeCkan::default().with_package(
        "idea-ceis",
        json!({"resources": [{"url": FIRST}, {"url": SECOND}]}),
    );
    let temp_dir = tempdir().expect("temporary directory");
    let output = temp_dir.path().join("combined.xlsx");
    let settings = Settings {
        api_url: "https://catalog.example.org".into(),
        identifier: "idea-ceis".into(),
        preview_rows: 2,
        output: Some(output.clone()),
    };
    let mut stdout = Vec::new();

    let combined = run(&settings, &api, &downloader(), &mut stdout).expect("run succeeds");

    let printed = String::from_utf8(stdout).expect("utf-8 preview");
    assert!(printed.contains("Alabama"));
    assert!(printed.contains("Alaska"));
    assert!(!printed.contains("Arizona"));
    assert_eq!(combined.row_count(), 3);

    let bytes = std::fs::read(&output).expect("workbook written");
    let grid = read_first_sheet(&bytes).expect("workbook readable");
    let header: Vec<String> = grid[0].iter().map(CellValue::to_string).collect();
    assert_eq!(header, combined.columns());
    assert_eq!(grid[3][0], CellValue::from("Arizona"));
    assert_eq!(grid[3][1], CellValue::Int(600));
    assert_eq!(grid[3][4], CellValue::from("2019-2020"));
}

#[test]
fn run_without_output_writes_nothing() {
    let api = FakeCkan::default().with_package("idea-ceis", json!({"resources": []}));
    let settings = Settings {
        api_url: "https://catalog.example.org".into(),
        identifier: "idea-ceis".into(),
        preview_rows: 5,
        output: None,
    };
    let mut stdout = Vec::new();

    let combined = run(&settings, &api, &downloader(), &mut stdout).expect("run succeeds");

    assert!(combined.is_empty());
    assert!(String::from_utf8(stdout).expect("utf-8").starts_with("Empty table"));
}

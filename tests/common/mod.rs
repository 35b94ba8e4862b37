#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use idea_tools::ToolError;
use idea_tools::ckan::{CkanApi, PACKAGE_SHOW};
use idea_tools::io::http::Downloader;
use rust_xlsxwriter::Workbook;
use serde_json::Value;

pub const HEADERS: [&str; 4] = ["State name", "LEAs", "Children CEIS", "Children CEIS and SpEd"];

/// Cell written into a fixture workbook.
#[derive(Debug, Clone, Copy)]
pub enum Fixture {
    Text(&'static str),
    Number(f64),
    Blank,
}

/// Builds a data file following the published layout: title rows, the header
/// on sheet row 8, eight descriptive rows (the second one carrying the school
/// year), then one row per record.
pub fn data_file(school_year: &str, records: &[[Fixture; 4]]) -> Vec<u8> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet
        .write_string(0, 0, "Children receiving coordinated early intervening services")
        .expect("title written");
    sheet
        .write_string(2, 0, "Source: annual data collection")
        .expect("source written");

    for (col, header) in HEADERS.iter().enumerate() {
        sheet.write_string(8, col as u16, *header).expect("header written");
    }

    let descriptive = [
        ("Data group", "CEIS"),
        ("School year", school_year),
        ("Collection", "Part B"),
        ("Level", "State"),
        ("Note", "Counts are unduplicated"),
        ("Note", "Suppressed counts are shown as n/a"),
        ("Revised", "No"),
        ("Contact", "data@example.org"),
    ];
    for (offset, (label, value)) in descriptive.iter().enumerate() {
        let row = 9 + offset as u32;
        sheet.write_string(row, 0, *label).expect("label written");
        sheet.write_string(row, 1, *value).expect("value written");
    }

    for (offset, record) in records.iter().enumerate() {
        let row = 17 + offset as u32;
        for (col, cell) in record.iter().enumerate() {
            let col = col as u16;
            match cell {
                Fixture::Text(text) => {
                    sheet.write_string(row, col, *text).expect("text written");
                }
                Fixture::Number(number) => {
                    sheet.write_number(row, col, *number).expect("number written");
                }
                Fixture::Blank => {}
            }
        }
    }

    workbook.save_to_buffer().expect("workbook serialised")
}

/// Serves fixture payloads by URL and records every request.
#[derive(Default)]
pub struct FakeDownloader {
    files: HashMap<String, Vec<u8>>,
    pub requests: RefCell<Vec<String>>,
}

impl FakeDownloader {
    pub fn with_file(mut self, url: &str, bytes: Vec<u8>) -> Self {
        self.files.insert(url.to_string(), bytes);
        self
    }
}

impl Downloader for FakeDownloader {
    fn fetch(&self, url: &str) -> idea_tools::Result<Vec<u8>> {
        self.requests.borrow_mut().push(url.to_string());
        self.files.get(url).cloned().ok_or_else(|| {
            ToolError::Io(io::Error::new(io::ErrorKind::NotFound, url.to_string()))
        })
    }
}

/// Catalog answering `package_show` from a fixed set of packages.
#[derive(Default)]
pub struct FakeCkan {
    packages: HashMap<String, Value>,
}

impl FakeCkan {
    pub fn with_package(mut self, id: &str, package: Value) -> Self {
        self.packages.insert(id.to_string(), package);
        self
    }
}

impl CkanApi for FakeCkan {
    fn call_action(&self, action: &str, data: &Value) -> idea_tools::Result<Value> {
        assert_eq!(action, PACKAGE_SHOW);
        let id = data.get("id").and_then(Value::as_str).unwrap_or_default();
        self.packages
            .get(id)
            .cloned()
            .ok_or_else(|| ToolError::NotFound("Not found".to_string()))
    }
}

/// Writer collecting formatted log output for assertions.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().expect("log buffer")).into_owned()
    }

    /// Runs `body` with a subscriber writing into this buffer.
    pub fn capture<T>(&self, body: impl FnOnce() -> T) -> T {
        let writer = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, body)
    }
}

impl Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().expect("log buffer").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

use rust_xlsxwriter::{Workbook, Worksheet};
use serde::Serialize;

use crate::cuz::Cuz;
use crate::error::ExportError;

/// File name offered for the spreadsheet download.
pub const XLSX_FILE_NAME: &str = "cuzlers.xlsx";
pub const CSV_FILE_NAME: &str = "cuzlers.csv";

const SHEET_NAME: &str = "Cuzlers";
const HEADERS: [&str; 3] = ["Hatim Numarasi", "Cüz numarası", "İsim"];

/// One exported line: hatim number, cüz number and the name (blank if unset).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportRow {
    pub hatim_number: u8,
    pub cuz_number: u32,
    pub name: String,
}

/// Flatten the full record set, one row per record across all hatims.
///
/// Rows keep the order of `records`; the hatim currently selected in a view
/// has no influence on the export.
pub fn export_rows(records: &[Cuz]) -> Vec<ExportRow> {
    records
        .iter()
        .map(|cuz| ExportRow {
            hatim_number: cuz.hatim_number,
            cuz_number: cuz.cuz_number,
            name: cuz.name().to_string(),
        })
        .collect()
}

/// Convert the record set to XLSX format
///
/// Writes a single `Cuzlers` worksheet with a header row followed by one row
/// per record.
///
/// # Arguments
/// * `records` - The full record set
///
/// # Returns
/// * `Result<Vec<u8>, ExportError>` - XLSX file content as bytes or an error
pub fn to_xlsx(records: &[Cuz]) -> Result<Vec<u8>, ExportError> {
    let mut workbook = build_workbook(records)?;
    Ok(workbook.save_to_buffer()?)
}

fn build_workbook(records: &[Cuz]) -> Result<Workbook, ExportError> {
    let mut workbook = Workbook::new();
    let mut worksheet = Worksheet::new();
    worksheet.set_name(SHEET_NAME)?;

    for (col, header) in HEADERS.iter().enumerate() {
        worksheet.write_string(0, col as u16, *header)?;
    }

    for (index, row) in export_rows(records).iter().enumerate() {
        let r = (index + 1) as u32;
        worksheet.write_number(r, 0, row.hatim_number as f64)?;
        worksheet.write_number(r, 1, row.cuz_number as f64)?;
        worksheet.write_string(r, 2, row.name.as_str())?;
    }

    workbook.push_worksheet(worksheet);
    Ok(workbook)
}

/// Convert the record set to CSV format
///
/// Same columns as the XLSX export. Names containing commas, quotes or
/// newlines are quoted.
pub fn to_csv(records: &[Cuz]) -> String {
    let mut csv_content = HEADERS.join(",");
    csv_content.push('\n');

    for row in export_rows(records) {
        csv_content.push_str(&format!(
            "{},{},{}\n",
            row.hatim_number,
            row.cuz_number,
            escape_csv(&row.name)
        ));
    }

    csv_content
}

fn escape_csv(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

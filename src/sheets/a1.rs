/// Quote a sheet title for A1 notation. Embedded single quotes are doubled.
///
/// Titles are always quoted: an unquoted `A1` or `R1C1` would be read as a
/// cell reference rather than a sheet.
pub fn quote_sheet_name(name: &str) -> String {
    format!("'{}'", name.replace('\'', "''"))
}

/// The whole sheet, e.g. `'Responses'`.
pub fn sheet_range(sheet: &str) -> String {
    quote_sheet_name(sheet)
}

/// A single cell, e.g. `'Responses'!A7`.
pub fn cell(sheet: &str, column: &str, row: u32) -> String {
    format!("{}!{column}{row}", quote_sheet_name(sheet))
}

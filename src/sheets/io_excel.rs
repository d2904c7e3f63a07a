use calamine::DataType;
use chrono::{Duration, NaiveDate};

use crate::sheets::{
    io_common::{assemble_records, get_col_indexes, ColumnNames},
    *,
};

pub fn read_excel_roster(
    path: &str,
    worksheet_name: Option<&str>,
    columns: &ColumnNames,
) -> BSheetResult<Vec<Record>> {
    let wrange = get_range(path, worksheet_name)?;

    let mut iter = wrange.rows();
    let header: Vec<String> = iter
        .next()
        .context(EmptyExcelSnafu { path })?
        .iter()
        .map(read_cell)
        .collect();
    debug!("read_excel_roster: header: {:?}", header);
    let indexes = get_col_indexes(columns, &header);

    let mut rows: Vec<Vec<String>> = Vec::new();
    for (idx, row) in iter.enumerate() {
        debug!("read_excel_roster: idx: {:?} row: {:?}", idx, row);
        rows.push(row.iter().map(read_cell).collect());
    }
    Ok(assemble_records(&rows, &indexes))
}

/// The text of a cell, as it would appear in a CSV export.
fn read_cell(cell: &DataType) -> String {
    match cell {
        DataType::String(s) => s.clone(),
        DataType::Int(i) => i.to_string(),
        // Phone numbers and postal codes are often stored as numbers.
        DataType::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        DataType::Float(f) => f.to_string(),
        DataType::Bool(b) => b.to_string(),
        DataType::DateTime(serial) => excel_date(*serial)
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
        DataType::Error(e) => {
            warn!("read_cell: error in cell: {:?}", e);
            "".to_string()
        }
        DataType::Empty => "".to_string(),
    }
}

// Excel counts days from 1899-12-30 (including the 1900 leap year bug).
fn excel_date(serial: f64) -> Option<NaiveDate> {
    if !(1.0..3_000_000.0).contains(&serial) {
        return None;
    }
    NaiveDate::from_ymd_opt(1899, 12, 30)?.checked_add_signed(Duration::days(serial.floor() as i64))
}

fn get_range(path: &str, worksheet_name_o: Option<&str>) -> BSheetResult<calamine::Range<DataType>> {
    debug!(
        "read_excel_roster: path: {:?} worksheet: {:?}",
        &path, &worksheet_name_o
    );
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;

    // A worksheet name was provided, use it.
    if let Some(worksheet_name) = worksheet_name_o {
        let wrange = workbook
            .worksheet_range(worksheet_name)
            .context(MissingWorksheetSnafu {
                path,
                name: worksheet_name,
            })?
            .context(OpeningExcelSnafu { path })?;
        Ok(wrange)
    } else {
        let all_worksheets = workbook.worksheets();
        match all_worksheets.as_slice() {
            [] => Err(Box::new(SheetError::EmptyExcel {
                path: path.to_string(),
            })),
            [(worksheet_name, wrange)] => {
                debug!(
                    "read_excel_roster: path: {:?} worksheet: {:?}",
                    &path, &worksheet_name
                );
                Ok(wrange.clone())
            }
            _ => Err(Box::new(SheetError::TooManyWorksheets {
                path: path.to_string(),
            })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_as_text() {
        assert_eq!(read_cell(&DataType::String("Doe, Jane".to_string())), "Doe, Jane");
        assert_eq!(read_cell(&DataType::Float(9055550101.0)), "9055550101");
        assert_eq!(read_cell(&DataType::Float(1.5)), "1.5");
        assert_eq!(read_cell(&DataType::Int(42)), "42");
        assert_eq!(read_cell(&DataType::Empty), "");
    }

    #[test]
    fn excel_dates() {
        // 33039 is 1990-06-15 in Excel.
        assert_eq!(read_cell(&DataType::DateTime(33039.0)), "1990-06-15");
        assert_eq!(read_cell(&DataType::DateTime(33039.75)), "1990-06-15");
        assert_eq!(read_cell(&DataType::DateTime(-1.0)), "");
    }

    #[test]
    fn missing_workbook() {
        let res = read_excel_roster("/no/such/roster.xlsx", None, &ColumnNames::default());
        assert!(matches!(
            res.map_err(|e| *e),
            Err(SheetError::OpeningExcel { .. })
        ));
    }

    fn workbook(name: &str) -> String {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("testdata/excel")
            .join(name)
            .display()
            .to_string()
    }

    #[test]
    fn single_worksheet() {
        let records = read_excel_roster(&workbook("roster.xlsx"), None, &ColumnNames::default())
            .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0],
            Record {
                name: "Doe, Jane".to_string(),
                street: "1 Main St".to_string(),
                city: "Markham".to_string(),
                postal: "L3P 1A1".to_string(),
                email: "jane@example.com".to_string(),
                phone: "9055550101".to_string(),
                date_of_birth: "1990-06-15".to_string(),
            }
        );
        assert_eq!(records[1].name, "Public, John");
        assert_eq!(records[1].phone, "416-555-0102");
        assert_eq!(records[1].date_of_birth, "");
    }

    #[test]
    fn named_worksheet() {
        let path = workbook("two_sheets.xlsx");
        let records =
            read_excel_roster(&path, Some("Waitlist"), &ColumnNames::default()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Smith");
        assert_eq!(records[0].city, "");

        let records =
            read_excel_roster(&path, Some("Attendees"), &ColumnNames::default()).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn missing_worksheet() {
        let res = read_excel_roster(&workbook("roster.xlsx"), Some("Nope"), &ColumnNames::default());
        assert!(matches!(
            res.map_err(|e| *e),
            Err(SheetError::MissingWorksheet { .. })
        ));
    }

    #[test]
    fn several_worksheets_need_a_name() {
        let res = read_excel_roster(&workbook("two_sheets.xlsx"), None, &ColumnNames::default());
        assert!(matches!(
            res.map_err(|e| *e),
            Err(SheetError::TooManyWorksheets { .. })
        ));
    }
}

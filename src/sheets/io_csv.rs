// Primitives for reading CSV rosters.

use std::fs::File;

use crate::sheets::{
    io_common::{assemble_records, get_col_indexes, ColumnNames},
    *,
};

pub fn read_csv_roster(path: &str, columns: &ColumnNames) -> BSheetResult<Vec<Record>> {
    let mut rdr = get_reader(path)?;
    let header: Vec<String> = rdr
        .headers()
        .context(OpeningCsvSnafu { path })?
        .iter()
        .map(|s| s.trim_start_matches('\u{feff}').to_string())
        .collect();
    debug!("read_csv_roster: header: {:?}", header);
    let indexes = get_col_indexes(columns, &header);

    let mut rows: Vec<Vec<String>> = Vec::new();
    for (idx, line_r) in rdr.records().enumerate() {
        // The header is on line 1.
        let lineno = idx + 2;
        let line = line_r.context(CsvLineParseSnafu { lineno })?;
        debug!("read_csv_roster: lineno: {:?} row: {:?}", lineno, line);
        rows.push(line.iter().map(|s| s.to_string()).collect());
    }
    Ok(assemble_records(&rows, &indexes))
}

fn get_reader(path: &str) -> SheetResult<csv::Reader<File>> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .context(OpeningCsvSnafu { path })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn read_roster_with_quotes_and_short_rows() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(
            f,
            "\u{feff}AttendeeName,Street,City,PostalCode,E-mail,AttendeePhone,DateOfBirth\n\
             \"Doe, Jane\",1 Main St,Markham,L3P 1A1,jane@example.com,905-555-0101,15/06/1990\n\
             ,,,,,,\n\
             \"Public, John\",22 Elm Ave\n"
        )
        .unwrap();
        let path = f.path().display().to_string();
        let records = read_csv_roster(&path, &ColumnNames::default()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "Doe, Jane");
        assert_eq!(records[0].phone, "905-555-0101");
        assert_eq!(records[0].date_of_birth, "15/06/1990");
        assert_eq!(records[1].street, "22 Elm Ave");
        assert_eq!(records[1].city, "");
    }

    #[test]
    fn missing_file() {
        let res = read_csv_roster("/no/such/roster.csv", &ColumnNames::default());
        assert!(matches!(res.map_err(|e| *e), Err(SheetError::OpeningCsv { .. })));
    }
}

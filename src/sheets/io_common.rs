// Helpers shared by the roster readers.

use std::collections::HashSet;
use std::path::Path;

use crate::sheets::*;

/// The roster columns holding each field of a record.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ColumnNames {
    pub name: String,
    pub street: String,
    pub city: String,
    pub postal: String,
    pub email: String,
    pub phone: String,
    pub date_of_birth: String,
}

impl Default for ColumnNames {
    fn default() -> ColumnNames {
        ColumnNames {
            name: "AttendeeName".to_string(),
            street: "Street".to_string(),
            city: "City".to_string(),
            postal: "PostalCode".to_string(),
            email: "E-mail".to_string(),
            phone: "AttendeePhone".to_string(),
            date_of_birth: "DateOfBirth".to_string(),
        }
    }
}

/// The position of each column in a row. None when the column is missing.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ColumnIndexes {
    name: Option<usize>,
    street: Option<usize>,
    city: Option<usize>,
    postal: Option<usize>,
    email: Option<usize>,
    phone: Option<usize>,
    date_of_birth: Option<usize>,
}

pub fn get_col_indexes(columns: &ColumnNames, header: &[String]) -> ColumnIndexes {
    let find = |col: &String| -> Option<usize> {
        let idx = header.iter().position(|h| h.trim() == col.as_str());
        if idx.is_none() {
            warn!(
                "get_col_indexes: column {:?} not found in the header {:?}, it will be left empty",
                col, header
            );
        }
        idx
    };
    ColumnIndexes {
        name: find(&columns.name),
        street: find(&columns.street),
        city: find(&columns.city),
        postal: find(&columns.postal),
        email: find(&columns.email),
        phone: find(&columns.phone),
        date_of_birth: find(&columns.date_of_birth),
    }
}

/// Builds the records from the rows of a roster. Blank rows are skipped.
pub fn assemble_records(rows: &[Vec<String>], indexes: &ColumnIndexes) -> Vec<Record> {
    let cell = |row: &Vec<String>, idx: Option<usize>| -> String {
        idx.and_then(|i| row.get(i).cloned()).unwrap_or_default()
    };
    let mut res: Vec<Record> = Vec::new();
    for (idx, row) in rows.iter().enumerate() {
        if row.iter().all(|c| c.trim().is_empty()) {
            debug!("assemble_records: skipping blank row {}", idx + 2);
            continue;
        }
        res.push(Record {
            name: cell(row, indexes.name),
            street: cell(row, indexes.street),
            city: cell(row, indexes.city),
            postal: cell(row, indexes.postal),
            email: cell(row, indexes.email),
            phone: cell(row, indexes.phone),
            date_of_birth: cell(row, indexes.date_of_birth),
        });
    }
    let distinct: HashSet<&String> = res.iter().map(|r| &r.name).collect();
    if distinct.len() < res.len() {
        warn!("assemble_records: the roster contains duplicate names");
    }
    res
}

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(l: &[&str]) -> Vec<String> {
        l.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn records_from_rows() {
        let header = strings(&[
            "AttendeeName",
            "DateOfBirth",
            "Street",
            "City",
            "PostalCode",
            "E-mail",
            "AttendeePhone",
        ]);
        let indexes = get_col_indexes(&ColumnNames::default(), &header);
        let rows = vec![
            strings(&["Doe, Jane", "15/06/1990", "1 Main St", "Markham"]),
            strings(&["", " ", ""]),
            strings(&["Solo"]),
        ];
        let records = assemble_records(&rows, &indexes);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "Doe, Jane");
        assert_eq!(records[0].date_of_birth, "15/06/1990");
        assert_eq!(records[0].city, "Markham");
        assert_eq!(records[0].email, "");
        assert_eq!(records[1], Record {
            name: "Solo".to_string(),
            ..Default::default()
        });
    }

    #[test]
    fn missing_column_is_empty() {
        let header = strings(&["AttendeeName", "City"]);
        let indexes = get_col_indexes(&ColumnNames::default(), &header);
        let records = assemble_records(&[strings(&["Doe, Jane", "Markham"])], &indexes);
        assert_eq!(records[0].city, "Markham");
        assert_eq!(records[0].phone, "");
        assert_eq!(records[0].date_of_birth, "");
    }

    #[test]
    fn file_names() {
        assert_eq!(simplify_file_name("a/b/roster.csv"), "roster.csv");
        assert_eq!(simplify_file_name("roster.csv"), "roster.csv");
    }
}

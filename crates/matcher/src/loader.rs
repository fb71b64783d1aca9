use crate::error::MarkError;
use crate::model::{RawRow, ReferenceTable};

/// Reference files are written `;`-separated.
pub const DEFAULT_DELIMITER: u8 = b';';

/// Read a reference CSV into raw rows.
///
/// Column names are not interpreted here; see [`crate::schema`]. Transport
/// errors abort the read, a row that cannot be decoded is logged and skipped.
pub fn read_reference_csv(csv_data: &str, delimiter: u8) -> Result<ReferenceTable, MarkError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(csv_data.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| MarkError::Io(e.to_string()))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for (ordinal, record) in reader.records().enumerate() {
        let record = match record {
            Ok(record) => record,
            Err(e) if matches!(e.kind(), csv::ErrorKind::Io(_)) => {
                return Err(MarkError::Io(e.to_string()));
            }
            Err(e) => {
                log::warn!("reference row {} unreadable, skipped: {e}", ordinal + 2);
                continue;
            }
        };
        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(ordinal + 2);
        rows.push(RawRow {
            line,
            cells: record.iter().map(|c| c.to_string()).collect(),
        });
    }

    Ok(ReferenceTable { headers, rows })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn semicolon_file() {
        let csv = "\
name;cores;cpumark;thread;tdp;socket;cat
Intel Core i7-7500U @ 2.70GHz;2;3641;1950;15;FCBGA1356;Laptop
AMD Ryzen 5 3600;6;17800;2600;65;AM4;Desktop
";
        let table = read_reference_csv(csv, DEFAULT_DELIMITER).unwrap();
        assert_eq!(table.headers[0], "name");
        assert_eq!(table.headers[2], "cpumark");
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].line, 2);
        assert_eq!(table.rows[1].line, 3);
        assert_eq!(table.rows[1].cells[0], "AMD Ryzen 5 3600");
        assert_eq!(table.rows[1].cells[2], "17800");
    }

    #[test]
    fn short_rows_kept_for_the_index_to_judge() {
        let csv = "name;cpumark\nIntel Core i3\nAMD Athlon 3000G;4400\n";
        let table = read_reference_csv(csv, DEFAULT_DELIMITER).unwrap();
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].cells.len(), 1);
    }

    #[test]
    fn comma_delimiter_with_quoted_marks() {
        let csv = "CPUNAME,CPUMARK\n\"Intel Core i9-9900K @ 3.60GHz\",\"18,900\"\n";
        let table = read_reference_csv(csv, b',').unwrap();
        assert_eq!(table.rows[0].cells[1], "18,900");
    }

    #[test]
    fn header_only() {
        let table = read_reference_csv("name;cpumark\n", DEFAULT_DELIMITER).unwrap();
        assert!(table.rows.is_empty());
        assert_eq!(table.headers.len(), 2);
    }
}

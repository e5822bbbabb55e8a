use actix_web::web::Bytes;
use parquet::file::reader::{FileReader, SerializedFileReader};
use parquet::record::Field;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TabularError {
    #[error("tabular data is empty")]
    Empty,

    #[error("tabular data is not valid UTF-8 text")]
    NotText,

    #[error("cannot read tabular data: {0}")]
    Csv(#[from] csv::Error),

    #[error("row {line} has {found} fields, but the header has {expected}")]
    TooManyFields {
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("cannot read parquet data: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("cannot write tabular data: {0}")]
    Io(#[from] std::io::Error),
}

const CANDIDATE_DELIMITERS: [u8; 4] = [b',', b';', b'\t', b'|'];

/// Picks the delimiter that splits the header line into the most columns.
/// Comma wins ties and is the fallback.
pub fn sniff_delimiter(data: &[u8]) -> u8 {
    let header = data.split(|b| *b == b'\n').next().unwrap_or_default();

    let mut best = (b',', header.iter().filter(|b| **b == b',').count());
    for delimiter in CANDIDATE_DELIMITERS.iter().skip(1) {
        let count = header.iter().filter(|b| *b == delimiter).count();
        if count > best.1 {
            best = (*delimiter, count);
        }
    }
    best.0
}

/// A parsed table: one header row plus data rows, all cells as text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// What the page shows: shape plus the first rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TablePreview {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub total_rows: usize,
    pub total_columns: usize,
}

impl Table {
    pub fn parse(data: &[u8]) -> Result<Self, TabularError> {
        let data = data.strip_prefix(b"\xEF\xBB\xBF".as_slice()).unwrap_or(data);
        if data.iter().all(|b| b.is_ascii_whitespace()) {
            return Err(TabularError::Empty);
        }
        if std::str::from_utf8(data).is_err() {
            return Err(TabularError::NotText);
        }

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(sniff_delimiter(data))
            .has_headers(true)
            .flexible(true)
            .from_reader(data);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        // Short rows are padded with empty cells; long rows are an error.
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            if record.len() > headers.len() {
                return Err(TabularError::TooManyFields {
                    line: record.position().map(|pos| pos.line()).unwrap_or_default(),
                    expected: headers.len(),
                    found: record.len(),
                });
            }
            let mut row: Vec<String> = record.iter().map(str::to_string).collect();
            row.resize(headers.len(), String::new());
            rows.push(row);
        }

        Ok(Self { headers, rows })
    }

    /// (rows, columns), not counting the header.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.headers.len())
    }

    pub fn preview(&self, max_rows: usize) -> TablePreview {
        TablePreview {
            headers: self.headers.clone(),
            rows: self.rows.iter().take(max_rows).cloned().collect(),
            total_rows: self.rows.len(),
            total_columns: self.headers.len(),
        }
    }

    /// Re-encodes as comma-separated text regardless of the input delimiter.
    pub fn to_csv(&self) -> Result<Vec<u8>, TabularError> {
        let mut csv_data = Vec::new();
        {
            let mut wtr = csv::Writer::from_writer(&mut csv_data);
            wtr.write_record(&self.headers)?;
            for row in &self.rows {
                wtr.write_record(row)?;
            }
            wtr.flush()?;
        }
        Ok(csv_data)
    }
}

/// Shape and first rows of a parquet file. Only `max_rows` rows are decoded;
/// the total row count comes from the file footer.
pub fn preview_parquet(data: &[u8], max_rows: usize) -> Result<TablePreview, TabularError> {
    if data.is_empty() {
        return Err(TabularError::Empty);
    }
    let reader = SerializedFileReader::new(Bytes::copy_from_slice(data))?;
    let metadata = reader.metadata().file_metadata();

    let headers: Vec<String> = metadata
        .schema_descr()
        .root_schema()
        .get_fields()
        .iter()
        .map(|field| field.name().to_string())
        .collect();
    let total_rows = usize::try_from(metadata.num_rows()).unwrap_or_default();

    let mut rows = Vec::new();
    for row in reader.get_row_iter(None)?.take(max_rows) {
        let row = row?;
        rows.push(row.get_column_iter().map(|(_, field)| cell_text(field)).collect());
    }

    Ok(TablePreview {
        total_columns: headers.len(),
        headers,
        rows,
        total_rows,
    })
}

fn cell_text(field: &Field) -> String {
    match field {
        Field::Null => String::new(),
        Field::Str(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_of_comma_separated_dataset() {
        let table = Table::parse(b"a,b,target\n1,2,0\n3,4,1\n").unwrap();
        assert_eq!(table.shape(), (2, 3));
        assert_eq!(table.headers, vec!["a", "b", "target"]);
        assert_eq!(table.rows[1], vec!["3", "4", "1"]);
    }

    #[test]
    fn test_download_reproduces_row_count() {
        let table = Table::parse(b"a,b,target\n1,2,0\n3,4,1\n").unwrap();
        let csv_data = table.to_csv().unwrap();
        let again = Table::parse(&csv_data).unwrap();
        assert_eq!(again.shape(), (2, 3));
        assert_eq!(String::from_utf8(csv_data).unwrap(), "a,b,target\n1,2,0\n3,4,1\n");
    }

    #[test]
    fn test_semicolon_input_is_sniffed_and_reencoded_with_commas() {
        let table = Table::parse(b"id;prediction\n1;0.25\n2;0.75\n").unwrap();
        assert_eq!(table.shape(), (2, 2));
        assert_eq!(
            String::from_utf8(table.to_csv().unwrap()).unwrap(),
            "id,prediction\n1,0.25\n2,0.75\n"
        );
    }

    #[test]
    fn test_sniff_prefers_comma_on_ties() {
        assert_eq!(sniff_delimiter(b"a\tb,c\n"), b',');
        assert_eq!(sniff_delimiter(b"a\tb\tc\n1\t2\t3"), b'\t');
        assert_eq!(sniff_delimiter(b"single"), b',');
    }

    #[test]
    fn test_preview_truncates_rows_but_keeps_shape() {
        let mut data = String::from("x,target\n");
        for i in 0..20 {
            data.push_str(&format!("{},{}\n", i, i % 2));
        }
        let preview = Table::parse(data.as_bytes()).unwrap().preview(5);
        assert_eq!(preview.rows.len(), 5);
        assert_eq!(preview.total_rows, 20);
        assert_eq!(preview.total_columns, 2);
    }

    #[test]
    fn test_empty_and_binary_input_are_rejected() {
        assert!(matches!(Table::parse(b"  \n"), Err(TabularError::Empty)));
        assert!(matches!(Table::parse(&[0xff, 0xfe, 0x00]), Err(TabularError::NotText)));
    }

    #[test]
    fn test_short_rows_are_padded() {
        let table = Table::parse(b"a,b,target\n1,2,0\n3,4\n").unwrap();
        assert_eq!(table.shape(), (2, 3));
        assert_eq!(table.rows[1], vec!["3", "4", ""]);
        assert_eq!(
            String::from_utf8(table.to_csv().unwrap()).unwrap(),
            "a,b,target\n1,2,0\n3,4,\n"
        );
    }

    #[test]
    fn test_long_rows_are_rejected() {
        assert!(matches!(
            Table::parse(b"a,b\n1,2\n1,2,3\n"),
            Err(TabularError::TooManyFields {
                expected: 2,
                found: 3,
                ..
            })
        ));
    }

    fn parquet_fixture(rows: i64) -> Vec<u8> {
        use parquet::data_type::Int64Type;
        use parquet::file::properties::WriterProperties;
        use parquet::file::writer::SerializedFileWriter;
        use parquet::schema::parser::parse_message_type;
        use std::sync::Arc;

        let schema = Arc::new(
            parse_message_type(
                "message schema { REQUIRED INT64 a; REQUIRED INT64 b; REQUIRED INT64 target; }",
            )
            .unwrap(),
        );
        let props = Arc::new(WriterProperties::builder().build());

        let mut buffer = Vec::new();
        let mut writer = SerializedFileWriter::new(&mut buffer, schema, props).unwrap();
        let mut row_group = writer.next_row_group().unwrap();
        let mut column_index = 0;
        while let Some(mut column) = row_group.next_column().unwrap() {
            let values: Vec<i64> = (0..rows)
                .map(|row| match column_index {
                    0 => row + 1,
                    1 => (row + 1) * 10,
                    _ => row % 2,
                })
                .collect();
            column
                .typed::<Int64Type>()
                .write_batch(&values, None, None)
                .unwrap();
            column.close().unwrap();
            column_index += 1;
        }
        row_group.close().unwrap();
        writer.close().unwrap();
        buffer
    }

    #[test]
    fn test_parquet_preview_reads_shape_and_first_rows() {
        let preview = preview_parquet(&parquet_fixture(7), 5).unwrap();
        assert_eq!(preview.headers, vec!["a", "b", "target"]);
        assert_eq!(preview.total_rows, 7);
        assert_eq!(preview.total_columns, 3);
        assert_eq!(preview.rows.len(), 5);
        assert_eq!(preview.rows[0], vec!["1", "10", "0"]);
        assert_eq!(preview.rows[4], vec!["5", "50", "0"]);
    }

    #[test]
    fn test_parquet_preview_rejects_garbage() {
        assert!(matches!(preview_parquet(b"", 5), Err(TabularError::Empty)));
        assert!(matches!(
            preview_parquet(b"a,b,target\n1,2,0\n", 5),
            Err(TabularError::Parquet(_))
        ));
    }

    #[test]
    fn test_bom_is_ignored() {
        let table = Table::parse(b"\xEF\xBB\xBFa,b\n1,2\n").unwrap();
        assert_eq!(table.headers[0], "a");
    }
}

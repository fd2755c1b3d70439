//! Tabular note codec.
//!
//! One note per row, columns `front;back;tags`, UTF-8 with a byte order mark,
//! CRLF line ends. Fields holding `;`, `"` or a line break are quoted and
//! inner quotes doubled; everything else is written bare so files stay easy
//! to edit by hand. Tags are joined by single spaces in the third column.
//!
//! Decoding is best effort: rows that cannot become a note are counted and
//! skipped, never raised.

use std::fs;
use std::path::Path;

use csv::{QuoteStyle, ReaderBuilder, Terminator, WriterBuilder};
use tracing::{debug, warn};

use crate::model::Note;
use crate::model::note::parse_tags;
use crate::sync::file::atomic_write;
use crate::sync::types::SyncResult;

/// Field delimiter.
pub const DELIMITER: u8 = b';';

const BOM: &[u8] = b"\xEF\xBB\xBF";

/// One tabular row.
pub type Row = Vec<String>;

/// Notes recovered from rows, with what had to be dropped.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub notes: Vec<Note>,
    /// Rows with fewer than two columns.
    pub malformed: usize,
    /// Rows whose front and back are both empty.
    pub blank: usize,
}

/// Rows read from a file, with the records that were not valid UTF-8.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RowBatch {
    pub rows: Vec<Row>,
    pub unreadable: usize,
}

/// Turn notes into rows.
///
/// HTML entities coming from the application are decoded so the file holds
/// plain, editable text. Notes blank on both sides are dropped.
#[must_use]
pub fn encode(notes: &[Note]) -> Vec<Row> {
    notes
        .iter()
        .filter_map(|note| {
            let front = html_escape::decode_html_entities(&note.front).into_owned();
            let back = html_escape::decode_html_entities(&note.back).into_owned();
            if front.trim().is_empty() && back.trim().is_empty() {
                return None;
            }
            Some(vec![front, back, note.tags_field()])
        })
        .collect()
}

/// Turn rows back into notes.
///
/// A row needs at least a front and a back column; the optional third column
/// is split on whitespace into tags and extra columns are ignored. Field
/// content is taken as is: quoting was already undone by the reader.
#[must_use]
pub fn decode(rows: &[Row]) -> Decoded {
    let mut decoded = Decoded::default();

    for (index, row) in rows.iter().enumerate() {
        let [front, back, rest @ ..] = row.as_slice() else {
            debug!(row = index + 1, columns = row.len(), "Skipping short row");
            decoded.malformed += 1;
            continue;
        };

        let note = Note {
            front: front.clone(),
            back: back.clone(),
            tags: rest.first().map(|t| parse_tags(t)).unwrap_or_default(),
        };

        if note.is_blank() {
            decoded.blank += 1;
            continue;
        }
        decoded.notes.push(note);
    }

    decoded
}

/// Read every row of a tabular file.
///
/// A leading byte order mark is optional and removed by the reader itself,
/// so a field starting with U+FEFF keeps it. Empty lines are ignored and
/// rows may have any number of columns.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn read_rows(path: &Path) -> SyncResult<RowBatch> {
    let bytes = fs::read(path)?;

    let mut reader = ReaderBuilder::new()
        .delimiter(DELIMITER)
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes.as_slice());

    let mut batch = RowBatch::default();
    for (index, record) in reader.byte_records().enumerate() {
        let row = record.map_err(|e| e.to_string()).and_then(|record| {
            record
                .iter()
                .map(|field| String::from_utf8(field.to_vec()))
                .collect::<Result<Row, _>>()
                .map_err(|e| e.to_string())
        });
        match row {
            Ok(row) => batch.rows.push(row),
            Err(error) => {
                warn!(file = %path.display(), record = index + 1, %error, "Skipping unreadable row");
                batch.unreadable += 1;
            }
        }
    }

    Ok(batch)
}

/// Write rows to a tabular file, replacing it atomically.
///
/// An empty slice still produces a file holding only the byte order mark.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_rows(path: &Path, rows: &[Row]) -> SyncResult<()> {
    let mut buffer = BOM.to_vec();
    {
        let mut writer = WriterBuilder::new()
            .delimiter(DELIMITER)
            .terminator(Terminator::CRLF)
            .quote_style(QuoteStyle::Necessary)
            .flexible(true)
            .from_writer(&mut buffer);
        for row in rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
    }
    atomic_write(path, &buffer)
}

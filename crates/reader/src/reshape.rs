//! Turns a [`TabularResult`] into keyed [`Record`]s.

use crate::{ParserRegistry, ReaderError, Record, TabularResult};

/// Reshapes every row of `result` into a [`Record`].
///
/// The value at column `i` of a row is decoded with the parser registered for
/// `header[i]` (if any) and stored under that name, so each record carries
/// exactly the header's fields in header order. A result without rows yields
/// an empty vector.
///
/// # Errors
///
/// Returns [`ReaderError::Decode`] if any row's length differs from the
/// header's.
pub fn decode_rows(
    result: TabularResult,
    parsers: &ParserRegistry,
) -> Result<Vec<Record>, ReaderError> {
    let TabularResult { header, rows, .. } = result;
    rows.into_iter()
        .enumerate()
        .map(|(index, row)| {
            if row.len() != header.len() {
                return Err(ReaderError::Decode {
                    message: format!(
                        "row {index} has {} values but the header names {} fields",
                        row.len(),
                        header.len()
                    ),
                });
            }
            Ok(header
                .iter()
                .zip(row)
                .map(|(field, raw)| (field.clone(), parsers.apply(field, raw)))
                .collect::<Record>())
        })
        .collect()
}

//! Conversion between column/row indexes and A1-style cell references.
//!
//! Columns use the bijective base-26 numbering of SpreadsheetML: `A`..`Z`,
//! then `AA`..`ZZ`, `AAA` and so on.

use crate::spreadsheet::SpreadsheetError;
use regex::Regex;
use std::sync::LazyLock;

static REFERENCE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\$?([A-Za-z]+)\$?([1-9][0-9]*)$").expect("Hardcode regex pattern"));

/// Renders a 0-based column index as column letters (`0` -> `A`, `26` -> `AA`).
pub fn column_to_letters(col: usize) -> String {
    let mut n = col as u128 + 1;
    let mut letters = Vec::<u8>::new();
    while n > 0 {
        letters.push(b'A' + ((n - 1) % 26) as u8);
        n = (n - 1) / 26;
    }
    letters.iter().rev().map(|&letter| char::from(letter)).collect()
}

/// Parses column letters (case-insensitive) back into a 0-based column index.
pub fn letters_to_column(letters: &str) -> Option<usize> {
    if letters.is_empty() {
        return None;
    }
    let mut col = 0usize;
    for byte in letters.bytes() {
        if !byte.is_ascii_alphabetic() {
            return None;
        }
        let digit = (byte.to_ascii_uppercase() - b'A') as usize + 1;
        col = col.checked_mul(26)?.checked_add(digit)?;
    }
    Some(col - 1)
}

/// Builds the address of a cell from a 0-based column and a 1-based row (`(26, 1)` -> `AA1`).
pub fn coordinate_to_address(col: usize, row: usize) -> String {
    format!("{}{}", column_to_letters(col), row)
}

/// Builds the address of a cell from 0-based row and column indexes.
pub(crate) fn index_to_reference(row: usize, col: usize) -> String {
    coordinate_to_address(col, row + 1)
}

/// Parses a reference such as `B3` or `$B$3` into 0-based `(row, col)`.
pub fn reference_to_index(reference: &str) -> Option<(usize, usize)> {
    let captures = REFERENCE_PATTERN.captures(reference.trim())?;
    let col = letters_to_column(captures.get(1)?.as_str())?;
    let row = captures.get(2)?.as_str().parse::<usize>().ok()?;
    Some((row - 1, col))
}

/// Validates a caller supplied 1-based address and returns its reference.
pub(crate) fn checked_address(column: i64, row: i64) -> Result<String, SpreadsheetError> {
    if column < 1 || row < 1 {
        return Err(SpreadsheetError::ArgumentError { column, row });
    }
    let col = usize::try_from(column - 1).map_err(|_| SpreadsheetError::ArgumentError { column, row })?;
    let row = usize::try_from(row).map_err(|_| SpreadsheetError::ArgumentError { column, row })?;
    Ok(coordinate_to_address(col, row))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_to_address() {
        assert_eq!(coordinate_to_address(0, 1), "A1");
        assert_eq!(coordinate_to_address(25, 1), "Z1");
        assert_eq!(coordinate_to_address(26, 1), "AA1");
        assert_eq!(coordinate_to_address(51, 7), "AZ7");
        assert_eq!(coordinate_to_address(52, 10), "BA10");
        assert_eq!(coordinate_to_address(701, 2), "ZZ2");
        assert_eq!(coordinate_to_address(702, 3), "AAA3");
        assert_eq!(coordinate_to_address(16_383, 1_048_576), "XFD1048576");
    }

    #[test]
    fn test_letters_round_trip() {
        for col in (0..20_000).chain([usize::MAX / 64, 1 << 40]) {
            assert_eq!(letters_to_column(&column_to_letters(col)), Some(col), "column {col}");
        }
    }

    #[test]
    fn test_letters_to_column_rejects_garbage() {
        assert_eq!(letters_to_column(""), None);
        assert_eq!(letters_to_column("A1"), None);
        assert_eq!(letters_to_column("Ж"), None);
        assert_eq!(letters_to_column("xfd"), Some(16_383));
    }

    #[test]
    fn test_reference_to_index() {
        assert_eq!(reference_to_index("A1"), Some((0, 0)));
        assert_eq!(reference_to_index("b3"), Some((2, 1)));
        assert_eq!(reference_to_index("$AA$10"), Some((9, 26)));
        assert_eq!(reference_to_index("A0"), None);
        assert_eq!(reference_to_index("12"), None);
        assert_eq!(reference_to_index("A1:B2"), None);
        assert_eq!(index_to_reference(9, 26), "AA10");
    }

    #[test]
    fn test_checked_address() {
        assert_eq!(checked_address(1, 1).unwrap(), "A1");
        assert_eq!(checked_address(27, 4).unwrap(), "AA4");
        for (column, row) in [(0, 1), (1, 0), (-1, 5), (3, -2), (i64::MIN, 1)] {
            assert!(matches!(
                checked_address(column, row),
                Err(SpreadsheetError::ArgumentError { .. })
            ));
        }
    }
}

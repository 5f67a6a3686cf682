//! A1-style coordinate algebra.
//!
//! Column numbers are 1-based (`A` = 1, `Z` = 26, `AA` = 27), matching how the
//! rest of the system addresses sheets. Parsing strips `$` anchors and is
//! case-insensitive; ranges may carry a `Sheet!` prefix, which is dropped here
//! because the binding's own sheet name governs resolution.

use std::fmt;

use thiserror::Error;

/// Errors returned when parsing coordinates from user-authored text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordError {
    #[error("invalid cell coordinate `{0}`")]
    InvalidCoordinate(String),
    #[error("invalid range `{0}`")]
    InvalidRange(String),
}

/// Convert a 1-based column number to letters. `1` ⇒ `A`, `702` ⇒ `ZZ`.
pub fn column_to_letters(mut col: u32) -> String {
    debug_assert!(col >= 1, "column numbers are 1-based");
    let mut buf = Vec::new();
    while col > 0 {
        col -= 1;
        buf.push(b'A' + (col % 26) as u8);
        col /= 26;
    }
    buf.reverse();
    String::from_utf8(buf).expect("only ASCII A-Z")
}

/// Convert column letters to a 1-based number. Case-insensitive,
/// overflow-checked; `None` for anything that is not pure letters.
pub fn letters_to_column(s: &str) -> Option<u32> {
    if s.is_empty() {
        return None;
    }
    let mut col: u32 = 0;
    for ch in s.bytes() {
        let up = ch.to_ascii_uppercase();
        if !up.is_ascii_uppercase() {
            return None;
        }
        col = col.checked_mul(26)?;
        col = col.checked_add((up - b'A') as u32 + 1)?;
    }
    Some(col)
}

/// Normalize a column reference to bare uppercase letters.
///
/// Accepts `A`, `a`, `$C`, `A:A`, `Sheet1!A` and `Sheet1!A:A`; anything that
/// does not reduce to pure letters yields `None`.
pub fn normalize_column_reference(reference: &str) -> Option<String> {
    let cleaned: String = reference.trim().chars().filter(|c| *c != '$').collect();
    let after_sheet = cleaned
        .rsplit_once('!')
        .map_or(cleaned.as_str(), |(_, rest)| rest);
    let letters = after_sheet
        .split_once(':')
        .map_or(after_sheet, |(first, _)| first)
        .trim();
    if letters.is_empty() || !letters.bytes().all(|b| b.is_ascii_alphabetic()) {
        return None;
    }
    Some(letters.to_ascii_uppercase())
}

/// A single cell position, 1-based on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellAddress {
    pub row: u32,
    pub col: u32,
}

impl CellAddress {
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Parse an A1-style reference such as `C5`, `$B$12` or `aa3`.
    pub fn parse(text: &str) -> Result<Self, CoordError> {
        let cleaned: String = text.trim().chars().filter(|c| *c != '$').collect();
        let invalid = || CoordError::InvalidCoordinate(text.trim().to_string());

        let split = cleaned
            .bytes()
            .position(|b| b.is_ascii_digit())
            .ok_or_else(invalid)?;
        let (letters, digits) = cleaned.split_at(split);
        if letters.is_empty() || digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let col = letters_to_column(letters).ok_or_else(invalid)?;
        let row: u32 = digits.parse().map_err(|_| invalid())?;
        if row < 1 {
            return Err(invalid());
        }
        Ok(Self { row, col })
    }

    pub fn to_a1(&self) -> String {
        format!("{}{}", column_to_letters(self.col), self.row)
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1())
    }
}

/// A rectangular range, normalized so start ≤ end on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RangeAddress {
    pub start_row: u32,
    pub start_col: u32,
    pub end_row: u32,
    pub end_col: u32,
}

impl RangeAddress {
    /// Build from two corner cells, in any order.
    pub fn from_corners(a: CellAddress, b: CellAddress) -> Self {
        Self {
            start_row: a.row.min(b.row),
            start_col: a.col.min(b.col),
            end_row: a.row.max(b.row),
            end_col: a.col.max(b.col),
        }
    }

    /// Parse `A2:C50`, `$A$2:$C$50` or `Sheet1!A2:C50`. The corners may come
    /// in any order; the result is always normalized.
    pub fn parse(text: &str) -> Result<Self, CoordError> {
        let trimmed = text.trim();
        let invalid = || CoordError::InvalidRange(trimmed.to_string());

        let body = match trimmed.split_once('!') {
            Some((sheet, rest)) => {
                if sheet.is_empty() {
                    return Err(invalid());
                }
                rest
            }
            None => trimmed,
        };

        let (first, second) = body.split_once(':').ok_or_else(invalid)?;
        let a = CellAddress::parse(first).map_err(|_| invalid())?;
        let b = CellAddress::parse(second).map_err(|_| invalid())?;
        Ok(Self::from_corners(a, b))
    }

    pub fn start(&self) -> CellAddress {
        CellAddress::new(self.start_row, self.start_col)
    }

    pub fn end(&self) -> CellAddress {
        CellAddress::new(self.end_row, self.end_col)
    }

    pub fn width(&self) -> u32 {
        self.end_col - self.start_col + 1
    }

    pub fn height(&self) -> u32 {
        self.end_row - self.start_row + 1
    }

    /// Canonical `A2:C50` form used in diagnostics and results.
    pub fn normalized(&self) -> String {
        format!("{}:{}", self.start(), self.end())
    }
}

impl fmt::Display for RangeAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.normalized())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_letters_roundtrip_through_zz() {
        for col in 1..=702 {
            let letters = column_to_letters(col);
            assert_eq!(letters_to_column(&letters), Some(col), "col {col}");
        }
        assert_eq!(column_to_letters(1), "A");
        assert_eq!(column_to_letters(26), "Z");
        assert_eq!(column_to_letters(27), "AA");
        assert_eq!(column_to_letters(702), "ZZ");
    }

    #[test]
    fn letters_are_case_insensitive_and_checked() {
        assert_eq!(letters_to_column("c"), Some(3));
        assert_eq!(letters_to_column("aB"), Some(28));
        assert_eq!(letters_to_column(""), None);
        assert_eq!(letters_to_column("A1"), None);
        // Absurdly long references overflow instead of wrapping.
        assert_eq!(letters_to_column("ZZZZZZZZ"), None);
    }

    #[test]
    fn parses_cell_addresses_with_anchors() {
        assert_eq!(CellAddress::parse("C5").unwrap(), CellAddress::new(5, 3));
        assert_eq!(
            CellAddress::parse("$B$12").unwrap(),
            CellAddress::new(12, 2)
        );
        assert_eq!(CellAddress::parse(" aa3 ").unwrap(), CellAddress::new(3, 27));
        assert_eq!(CellAddress::parse("C5").unwrap().to_a1(), "C5");
    }

    #[test]
    fn rejects_malformed_cell_addresses() {
        for bad in ["", "C", "5", "C5C", "A0", "5C", "A-1", "A99999999999"] {
            assert!(
                matches!(
                    CellAddress::parse(bad),
                    Err(CoordError::InvalidCoordinate(_))
                ),
                "expected failure for {bad:?}"
            );
        }
    }

    #[test]
    fn range_parsing_is_corner_order_independent() {
        let range = RangeAddress::parse("C50:A2").unwrap();
        assert_eq!(range.normalized(), "A2:C50");
        assert_eq!(range, RangeAddress::parse("A2:C50").unwrap());
        assert_eq!(range.width(), 3);
        assert_eq!(range.height(), 49);
    }

    #[test]
    fn range_accepts_sheet_prefix_and_anchors() {
        let range = RangeAddress::parse("Data!$B$2:$D$9").unwrap();
        assert_eq!(range.normalized(), "B2:D9");
        let single = RangeAddress::parse("B3:B3").unwrap();
        assert_eq!((single.width(), single.height()), (1, 1));
    }

    #[test]
    fn column_references_normalize_to_bare_letters() {
        assert_eq!(normalize_column_reference("A").as_deref(), Some("A"));
        assert_eq!(normalize_column_reference("a:a").as_deref(), Some("A"));
        assert_eq!(normalize_column_reference("$C").as_deref(), Some("C"));
        assert_eq!(
            normalize_column_reference("Sheet1!D:D").as_deref(),
            Some("D")
        );
        assert_eq!(normalize_column_reference("AB"), Some("AB".to_string()));
        assert_eq!(normalize_column_reference("A1"), None);
        assert_eq!(normalize_column_reference(""), None);
        assert_eq!(normalize_column_reference("!"), None);
    }

    #[test]
    fn rejects_malformed_ranges() {
        for bad in ["", "A1", "A1:", ":B2", "!A1:B2", "A1:B", "A1-B2"] {
            assert!(
                matches!(RangeAddress::parse(bad), Err(CoordError::InvalidRange(_))),
                "expected failure for {bad:?}"
            );
        }
    }
}

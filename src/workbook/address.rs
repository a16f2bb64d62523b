/*!
 * A1-style cell addresses.
 */

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::errors::WorkbookError;

/// Zero-based cell coordinate that renders as an A1 reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellAddress {
    pub row: u32,
    pub col: u32,
}

impl CellAddress {
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Column letters for a zero-based column index (0 -> "A", 26 -> "AA")
    pub fn column_name(col: u32) -> String {
        let mut n = col + 1;
        let mut letters = Vec::new();
        while n > 0 {
            let rem = (n - 1) % 26;
            letters.push((b'A' + rem as u8) as char);
            n = (n - 1) / 26;
        }
        letters.iter().rev().collect()
    }
}

// Row-major ordering
impl Ord for CellAddress {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.row, self.col).cmp(&(other.row, other.col))
    }
}

impl PartialOrd for CellAddress {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", Self::column_name(self.col), self.row + 1)
    }
}

impl FromStr for CellAddress {
    type Err = WorkbookError;

    /// Parses "B12" or "$B$12"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || WorkbookError::InvalidAddress(s.to_string());
        let cleaned: String = s.chars().filter(|c| *c != '$').collect();
        let split = cleaned
            .find(|c: char| c.is_ascii_digit())
            .ok_or_else(invalid)?;
        let (letters, digits) = cleaned.split_at(split);
        if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(invalid());
        }

        let mut col: u32 = 0;
        for c in letters.chars() {
            let v = (c.to_ascii_uppercase() as u8 - b'A') as u32 + 1;
            col = col.checked_mul(26).and_then(|x| x.checked_add(v)).ok_or_else(invalid)?;
        }
        let row: u32 = digits.parse().map_err(|_| invalid())?;
        if row == 0 {
            return Err(invalid());
        }

        Ok(Self { row: row - 1, col: col - 1 })
    }
}

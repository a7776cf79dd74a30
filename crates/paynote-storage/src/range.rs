//! A1 range notation, as far as the ledger needs it: a tab name and optional row bounds.

use crate::{StoreError, StoreResult};

/// Parsed `Tab!A1:G1` / `Tab!A:G` / `Tab` range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRange {
    pub tab: String,
    /// 1-based first row, `None` for an open range
    pub start_row: Option<u32>,
    /// 1-based last row (inclusive), `None` for an open range
    pub end_row: Option<u32>,
}

impl SheetRange {
    pub fn parse(range: &str) -> StoreResult<Self> {
        let (tab, cells) = match range.split_once('!') {
            Some((tab, cells)) => (tab, Some(cells)),
            None => (range, None),
        };

        let tab = tab.trim().trim_matches('\'').replace("''", "'");
        if tab.is_empty() {
            return Err(StoreError::InvalidRange(format!(
                "missing tab name in '{}'",
                range
            )));
        }

        let (start_row, end_row) = match cells {
            None => (None, None),
            Some(cells) => {
                let (start, end) = cells.split_once(':').unwrap_or((cells, cells));
                (Self::row_of(start, range)?, Self::row_of(end, range)?)
            }
        };

        Ok(SheetRange {
            tab,
            start_row,
            end_row,
        })
    }

    /// Row number of a single cell reference such as `A1`, or `None` for a bare column.
    fn row_of(cell: &str, range: &str) -> StoreResult<Option<u32>> {
        let cell = cell.trim();
        let column_len = cell.chars().take_while(|c| c.is_ascii_alphabetic()).count();
        let digits = &cell[column_len..];

        if column_len == 0 && digits.is_empty() {
            return Err(StoreError::InvalidRange(format!(
                "empty cell reference in '{}'",
                range
            )));
        }
        if digits.is_empty() {
            return Ok(None);
        }

        let row: u32 = digits
            .parse()
            .map_err(|_| StoreError::InvalidRange(format!("bad row '{}' in '{}'", digits, range)))?;
        if row == 0 {
            return Err(StoreError::InvalidRange(format!(
                "rows start at 1 in '{}'",
                range
            )));
        }
        Ok(Some(row))
    }

    /// Whether the 1-based `row` falls inside this range.
    pub fn contains_row(&self, row: u32) -> bool {
        self.start_row.map_or(true, |start| row >= start)
            && self.end_row.map_or(true, |end| row <= end)
    }
}

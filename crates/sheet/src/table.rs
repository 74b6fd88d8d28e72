use std::fmt;

/// One spreadsheet cell, keeping the type it was read with so it can be
/// written back unchanged.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    /// Excel serial date number.
    DateTime(f64),
    /// Error value such as `#N/A`, kept as its display text.
    Error(String),
}

impl Cell {
    /// Blank cell or whitespace-only text.
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Text(s) => write!(f, "{}", s),
            Cell::Number(n) => {
                if *n == (*n as i64) as f64 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            Cell::Bool(b) => write!(f, "{}", b),
            Cell::DateTime(d) => write!(f, "{}", d),
            Cell::Error(e) => write!(f, "{}", e),
        }
    }
}

/// A sheet as a header row plus data rows of equal width.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub name: String,
    /// Zero-based (row, column) of the header row's first cell in the sheet.
    pub origin: (u32, u32),
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(name: impl Into<String>, headers: Vec<String>) -> Self {
        Self {
            name: name.into(),
            origin: (0, 0),
            headers,
            rows: Vec::new(),
        }
    }

    /// Append a row, padding or truncating it to the header width.
    pub fn push_row(&mut self, mut row: Vec<Cell>) {
        row.resize(self.headers.len(), Cell::Empty);
        self.rows.push(row);
    }

    /// Index of the column whose header equals `name` after trimming.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.trim() == name.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_row_normalizes_width() {
        let mut table = Table::new("Buques", vec!["BUQUE".into(), "CodigoCFR".into(), "PUERTO".into()]);
        table.push_row(vec![Cell::Text("ARGOS".into())]);
        table.push_row(vec![
            Cell::Text("NUEVO PILAR".into()),
            Cell::Empty,
            Cell::Text("Vigo".into()),
            Cell::Text("extra".into()),
        ]);
        assert_eq!(table.rows[0].len(), 3);
        assert_eq!(table.rows[1].len(), 3);
        assert_eq!(table.rows[0][2], Cell::Empty);
    }

    #[test]
    fn test_column_index_trims_headers() {
        let table = Table::new("Buques", vec![" BUQUE ".into(), "CodigoCFR".into()]);
        assert_eq!(table.column_index("BUQUE"), Some(0));
        assert_eq!(table.column_index("CodigoCFR"), Some(1));
        assert_eq!(table.column_index("CFR"), None);
    }

    #[test]
    fn test_blank_cells() {
        assert!(Cell::Empty.is_blank());
        assert!(Cell::Text("  ".into()).is_blank());
        assert!(!Cell::Text("ESP1".into()).is_blank());
        assert!(!Cell::Number(0.0).is_blank());
    }

    #[test]
    fn test_display_integral_numbers() {
        assert_eq!(Cell::Number(42.0).to_string(), "42");
        assert_eq!(Cell::Number(4.5).to_string(), "4.5");
        assert_eq!(Cell::Empty.to_string(), "");
    }
}

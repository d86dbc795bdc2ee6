/// A loaded tabular source: columns identified by name, rows by position.
///
/// Every row is kept at the header's width; short rows are padded with empty
/// cells and long rows are truncated. Each row also remembers its one-based
/// data row number in the source file, so skipped blank rows do not shift
/// the numbers reported in errors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    source_rows: Vec<usize>,
}

impl Table {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
            source_rows: Vec::new(),
        }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Append a row numbered after the last one.
    pub fn push_row(&mut self, row: Vec<String>) {
        let source_row = self.source_rows.last().map_or(1, |n| n + 1);
        self.push_row_at(row, source_row);
    }

    /// Append a row read from data row `source_row` of its file.
    pub fn push_row_at(&mut self, mut row: Vec<String>, source_row: usize) {
        row.resize(self.headers.len(), String::new());
        self.rows.push(row);
        self.source_rows.push(source_row);
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn row(&self, index: usize) -> Option<RowRef<'_>> {
        (index < self.rows.len()).then_some(RowRef { table: self, index })
    }

    pub fn iter(&self) -> impl Iterator<Item = RowRef<'_>> {
        (0..self.rows.len()).map(move |index| RowRef { table: self, index })
    }

    /// Rows for which `keep` returns true, in their original order.
    pub fn filter_rows<F>(&self, keep: F) -> Table
    where
        F: Fn(&RowRef<'_>) -> bool,
    {
        let mut out = Table::new(self.headers.iter().cloned());
        for row in self.iter().filter(|row| keep(row)) {
            out.push_row_at(row.values().to_vec(), row.source_row());
        }
        out
    }

    /// Drop every column whose header matches `drop`.
    pub fn without_columns<F>(self, drop: F) -> Table
    where
        F: Fn(&str) -> bool,
    {
        let keep: Vec<usize> = (0..self.headers.len())
            .filter(|&i| !drop(&self.headers[i]))
            .collect();
        if keep.len() == self.headers.len() {
            return self;
        }

        let headers = keep.iter().map(|&i| self.headers[i].clone()).collect();
        let rows = self
            .rows
            .into_iter()
            .map(|row| keep.iter().map(|&i| row[i].clone()).collect())
            .collect();
        Table {
            headers,
            rows,
            source_rows: self.source_rows,
        }
    }

    /// Stack `self` on top of `older`.
    ///
    /// The result carries `self`'s columns first, then any columns only
    /// `older` has. Cells a table has no column for are left empty. Rows are
    /// renumbered in their new order.
    pub fn prepend_to(self, older: Table) -> Table {
        let mut headers = self.headers.clone();
        for h in &older.headers {
            if !headers.contains(h) {
                headers.push(h.clone());
            }
        }

        let mut out = Table::new(headers);
        for part in [self, older] {
            let mapping: Vec<Option<usize>> = out
                .headers
                .iter()
                .map(|h| part.column_index(h))
                .collect();
            for row in part.rows {
                let aligned = mapping
                    .iter()
                    .map(|idx| idx.map(|i| row[i].clone()).unwrap_or_default())
                    .collect();
                out.push_row(aligned);
            }
        }
        out
    }
}

/// Borrowed view of one table row.
#[derive(Debug, Clone, Copy)]
pub struct RowRef<'a> {
    table: &'a Table,
    index: usize,
}

impl<'a> RowRef<'a> {
    /// Zero-based position of the row among the data rows.
    pub fn index(&self) -> usize {
        self.index
    }

    /// One-based data row number in the file the row was read from.
    pub fn source_row(&self) -> usize {
        self.table.source_rows[self.index]
    }

    pub fn values(&self) -> &'a [String] {
        &self.table.rows[self.index]
    }

    pub fn get(&self, column: &str) -> Option<&'a str> {
        self.table
            .column_index(column)
            .map(|i| self.table.rows[self.index][i].as_str())
    }
}

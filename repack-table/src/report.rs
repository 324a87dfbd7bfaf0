use repack_compute::RepackOutcome;

/// What happened to one column during a frame repack.
#[derive(Clone, Debug, PartialEq)]
pub struct ColumnReport {
    /// Final (renamed) column name.
    pub name: String,
    /// Type label before repacking, e.g. `Float64` or `Mixed(int, text)`.
    pub source_type: String,
    /// Type label after repacking.
    pub final_type: String,
    pub outcome: RepackOutcome,
    pub bytes_before: usize,
    pub bytes_after: usize,
}

/// Per-column summary of a frame repack, in frame order (index columns first).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RepackReport {
    pub columns: Vec<ColumnReport>,
}

impl RepackReport {
    pub fn total_bytes_before(&self) -> usize {
        self.columns.iter().map(|c| c.bytes_before).sum()
    }

    pub fn total_bytes_after(&self) -> usize {
        self.columns.iter().map(|c| c.bytes_after).sum()
    }

    pub fn column(&self, name: &str) -> Option<&ColumnReport> {
        self.columns.iter().find(|c| c.name == name)
    }
}

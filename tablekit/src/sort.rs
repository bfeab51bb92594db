//! Sort specifications.

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    /// Ascending order (A-Z, 0-9, oldest first).
    Asc,
    /// Descending order (Z-A, 9-0, newest first).
    Desc,
}

impl SortDirection {
    /// Header indicator for this direction.
    pub fn indicator(self) -> &'static str {
        match self {
            Self::Asc => "▲",
            Self::Desc => "▼",
        }
    }
}

/// One sort key: a column and a direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub column_id: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(column_id: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            column_id: column_id.into(),
            direction,
        }
    }
}

/// Ordered list of sort keys. Earlier keys take precedence.
///
/// # Example
///
/// ```
/// use tablekit::SortOrder;
///
/// // Last name, then first name.
/// let order = SortOrder::asc("last_name").then_asc("first_name");
/// assert_eq!(order.specs().len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortOrder {
    specs: Vec<SortSpec>,
}

impl SortOrder {
    /// No sorting; rows keep their input order.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn asc(column_id: impl Into<String>) -> Self {
        Self {
            specs: vec![SortSpec::new(column_id, SortDirection::Asc)],
        }
    }

    pub fn desc(column_id: impl Into<String>) -> Self {
        Self {
            specs: vec![SortSpec::new(column_id, SortDirection::Desc)],
        }
    }

    pub fn then_asc(mut self, column_id: impl Into<String>) -> Self {
        self.specs.push(SortSpec::new(column_id, SortDirection::Asc));
        self
    }

    pub fn then_desc(mut self, column_id: impl Into<String>) -> Self {
        self.specs.push(SortSpec::new(column_id, SortDirection::Desc));
        self
    }

    pub fn specs(&self) -> &[SortSpec] {
        &self.specs
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Direction and precedence of a column, if it is sorted.
    pub fn position(&self, column_id: &str) -> Option<(usize, SortDirection)> {
        self.specs
            .iter()
            .position(|s| s.column_id == column_id)
            .map(|i| (i, self.specs[i].direction))
    }

    /// Replaces the whole order with a single key.
    pub fn set(&mut self, column_id: impl Into<String>, direction: SortDirection) {
        self.specs = vec![SortSpec::new(column_id, direction)];
    }

    /// Adds a key, or updates its direction if the column is already sorted.
    pub fn push(&mut self, column_id: impl Into<String>, direction: SortDirection) {
        let column_id = column_id.into();
        match self.specs.iter_mut().find(|s| s.column_id == column_id) {
            Some(spec) => spec.direction = direction,
            None => self.specs.push(SortSpec::new(column_id, direction)),
        }
    }

    /// Drops a column from the order.
    pub fn remove(&mut self, column_id: &str) {
        self.specs.retain(|s| s.column_id != column_id);
    }

    pub fn clear(&mut self) {
        self.specs.clear();
    }
}

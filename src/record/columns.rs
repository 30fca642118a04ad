use arrow::array::{Array, ArrayRef};

/// Pass-through columns attached to a single record.
///
/// Each entry is a column name and an Arrow array with one value per row of
/// the owning record. The packer stores them verbatim next to the required
/// columns; records that lack a column another record carries get nulls.
#[derive(Debug, Clone, Default)]
pub struct ExtraColumns {
    columns: Vec<(String, ArrayRef)>,
}

impl ExtraColumns {
    /// Create an empty column set
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a column.
    pub fn insert(&mut self, name: impl Into<String>, values: ArrayRef) {
        let name = name.into();
        match self.columns.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = values,
            None => self.columns.push((name, values)),
        }
    }

    /// Builder-style [`insert`](Self::insert)
    pub fn with(mut self, name: impl Into<String>, values: ArrayRef) -> Self {
        self.insert(name, values);
        self
    }

    /// Column by name
    pub fn get(&self, name: &str) -> Option<&ArrayRef> {
        self.columns.iter().find(|(n, _)| n == name).map(|(_, a)| a)
    }

    /// Column names in insertion order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(n, _)| n.as_str())
    }

    /// Iterate over `(name, values)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ArrayRef)> {
        self.columns.iter().map(|(n, a)| (n.as_str(), a))
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// True if no extra columns are attached
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl PartialEq for ExtraColumns {
    fn eq(&self, other: &Self) -> bool {
        if self.columns.len() != other.columns.len() {
            return false;
        }
        self.columns.iter().all(|(name, values)| {
            other
                .get(name)
                .map(|o| o.to_data() == values.to_data())
                .unwrap_or(false)
        })
    }
}

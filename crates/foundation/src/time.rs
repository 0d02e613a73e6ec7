use serde::{Deserialize, Serialize};

/// Ordinal position within the shared timeline shown by the time slider.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimeIndex(pub usize);

impl TimeIndex {
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    pub const fn get(self) -> usize {
        self.0
    }
}

impl From<usize> for TimeIndex {
    fn from(index: usize) -> Self {
        Self(index)
    }
}

impl std::fmt::Display for TimeIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ordered labels of a timeline, one per time index.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimeLabels(Vec<String>);

impl TimeLabels {
    pub fn new(labels: Vec<String>) -> Self {
        Self(labels)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn label(&self, index: TimeIndex) -> Option<&str> {
        self.0.get(index.0).map(String::as_str)
    }

    /// First index carrying `label`.
    pub fn position(&self, label: &str) -> Option<TimeIndex> {
        self.0.iter().position(|l| l == label).map(TimeIndex)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl<S: Into<String>> FromIterator<S> for TimeLabels {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

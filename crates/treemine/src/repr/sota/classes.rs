//! Class frequency counting for tree cells.

/// Counts class labels in first-seen order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClassCounter {
    counts: Vec<(String, u64)>,
}

impl ClassCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counter holding the given `(class, count)` pairs in order.
    pub(crate) fn from_counts(counts: Vec<(String, u64)>) -> Self {
        Self { counts }
    }

    pub fn add(&mut self, class: &str) {
        match self.counts.iter_mut().find(|(c, _)| c == class) {
            Some((_, n)) => *n += 1,
            None => self.counts.push((class.to_string(), 1)),
        }
    }

    /// Class with the highest count; the first-seen class wins ties.
    pub fn most_frequent(&self) -> Option<&str> {
        let mut best: Option<&(String, u64)> = None;
        for entry in &self.counts {
            if best.map_or(true, |b| entry.1 > b.1) {
                best = Some(entry);
            }
        }
        best.map(|(c, _)| c.as_str())
    }

    pub fn count(&self, class: &str) -> u64 {
        self.counts
            .iter()
            .find(|(c, _)| c == class)
            .map_or(0, |(_, n)| *n)
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// `(class, count)` pairs in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(c, n)| (c.as_str(), *n))
    }
}

//! Multi-key, mixed-direction ordering.

use std::cmp::Ordering;

/// Sort direction of one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Smallest first
    Ascending,
    /// Largest first
    Descending,
}

type Comparator<T> = Box<dyn Fn(&T, &T) -> Ordering + Send + Sync>;

/// An ordered list of `(key, direction)` pairs.
///
/// Later keys only break ties left by earlier ones; `sort` is stable, so
/// items equal on every key keep their input order.
pub struct MultiKeyOrder<T> {
    keys: Vec<(Comparator<T>, Direction)>,
}

impl<T: 'static> MultiKeyOrder<T> {
    /// An order with no keys (everything compares equal).
    pub fn new() -> Self {
        Self { keys: Vec::new() }
    }

    /// Append a key.
    pub fn then_by<K, F>(mut self, key: F, direction: Direction) -> Self
    where
        K: Ord + 'static,
        F: Fn(&T) -> K + Send + Sync + 'static,
    {
        self.keys
            .push((Box::new(move |a: &T, b: &T| key(a).cmp(&key(b))), direction));
        self
    }

    /// Compare two values key by key.
    pub fn compare(&self, a: &T, b: &T) -> Ordering {
        for (cmp, direction) in &self.keys {
            let ord = match direction {
                Direction::Ascending => cmp(a, b),
                Direction::Descending => cmp(b, a),
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }

    /// Stable in-place sort.
    pub fn sort(&self, values: &mut [T]) {
        values.sort_by(|a, b| self.compare(a, b));
    }
}

impl<T: 'static> Default for MultiKeyOrder<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        group: u32,
        score: u32,
        tag: &'static str,
    }

    fn row(group: u32, score: u32, tag: &'static str) -> Row {
        Row { group, score, tag }
    }

    #[test]
    fn test_mixed_directions() {
        let mut rows = vec![row(3, 1, "a"), row(4, 3, "b"), row(2, 3, "c"), row(2, 4, "d")];
        let order = MultiKeyOrder::new()
            .then_by(|r: &Row| r.score, Direction::Ascending)
            .then_by(|r: &Row| r.group, Direction::Descending);

        order.sort(&mut rows);
        let tags: Vec<_> = rows.iter().map(|r| r.tag).collect();
        assert_eq!(tags, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_stable_on_full_ties() {
        let mut rows = vec![row(1, 1, "first"), row(0, 0, "zero"), row(1, 1, "second")];
        let order = MultiKeyOrder::new().then_by(|r: &Row| (r.group, r.score), Direction::Ascending);

        order.sort(&mut rows);
        let tags: Vec<_> = rows.iter().map(|r| r.tag).collect();
        assert_eq!(tags, vec!["zero", "first", "second"]);
    }

    #[test]
    fn test_empty_order_keeps_input() {
        let mut rows = vec![row(2, 0, "x"), row(1, 0, "y")];
        MultiKeyOrder::<Row>::new().sort(&mut rows);
        assert_eq!(rows[0].tag, "x");
    }
}

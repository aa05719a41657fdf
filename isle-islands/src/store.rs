//! Per-chromosome stage results.

use fxhash::FxHashMap;

///
/// Values keyed by chromosome, iterated in the genome's chromosome order regardless
/// of the order they were produced in.
///
#[derive(Debug, Clone, PartialEq)]
pub struct PerChrom<T> {
    chroms: Vec<String>,
    values: Vec<T>,
    index: FxHashMap<String, usize>,
}

impl<T> Default for PerChrom<T> {
    fn default() -> Self {
        PerChrom {
            chroms: Vec::new(),
            values: Vec::new(),
            index: FxHashMap::default(),
        }
    }
}

impl<T> PerChrom<T> {
    ///
    /// Build from `(chrom, value)` pairs already in genome order.
    ///
    pub fn from_ordered(entries: Vec<(String, T)>) -> Self {
        let mut store = PerChrom::default();
        for (chrom, value) in entries {
            store.push(chrom, value);
        }
        store
    }

    ///
    /// Append a chromosome at the end of the order. Replaces the value if the
    /// chromosome is already present.
    ///
    pub fn push(&mut self, chrom: String, value: T) {
        match self.index.get(&chrom) {
            Some(&position) => self.values[position] = value,
            None => {
                self.index.insert(chrom.clone(), self.values.len());
                self.chroms.push(chrom);
                self.values.push(value);
            }
        }
    }

    pub fn get(&self, chrom: &str) -> Option<&T> {
        self.index.get(chrom).map(|&position| &self.values[position])
    }

    pub fn get_mut(&mut self, chrom: &str) -> Option<&mut T> {
        self.index
            .get(chrom)
            .map(|&position| &mut self.values[position])
    }

    pub fn chroms(&self) -> &[String] {
        &self.chroms
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.chroms
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut T)> {
        self.chroms
            .iter()
            .map(String::as_str)
            .zip(self.values.iter_mut())
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.values.iter()
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.values.iter_mut()
    }

    pub fn map<U, F>(&self, mut f: F) -> PerChrom<U>
    where
        F: FnMut(&str, &T) -> U,
    {
        PerChrom {
            chroms: self.chroms.clone(),
            values: self.iter().map(|(chrom, value)| f(chrom, value)).collect(),
            index: self.index.clone(),
        }
    }
}

impl<T> PerChrom<Vec<T>> {
    /// Number of items over all chromosomes.
    pub fn total_len(&self) -> usize {
        self.values.iter().map(Vec::len).sum()
    }

    /// All items, chromosome by chromosome in genome order.
    pub fn flatten(&self) -> impl Iterator<Item = &T> {
        self.values.iter().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn test_order_is_insertion_order() {
        let store = PerChrom::from_ordered(vec![
            ("chr2".to_string(), vec![1, 2]),
            ("chr1".to_string(), vec![3]),
            ("chrX".to_string(), vec![]),
        ]);

        let chroms: Vec<&str> = store.iter().map(|(chrom, _)| chrom).collect();
        assert_eq!(chroms, vec!["chr2", "chr1", "chrX"]);
        assert_eq!(store.get("chr1"), Some(&vec![3]));
        assert_eq!(store.get("chr3"), None);
        assert_eq!(store.total_len(), 3);
        assert_eq!(store.flatten().copied().collect::<Vec<i32>>(), vec![1, 2, 3]);
    }

    #[rstest]
    fn test_push_replaces_existing() {
        let mut store = PerChrom::default();
        store.push("chr1".to_string(), 1);
        store.push("chr2".to_string(), 2);
        store.push("chr1".to_string(), 10);

        assert_eq!(store.len(), 2);
        assert_eq!(store.chroms(), &["chr1".to_string(), "chr2".to_string()]);
        assert_eq!(store.get("chr1"), Some(&10));
    }

    #[rstest]
    fn test_map_and_mutation() {
        let mut store = PerChrom::from_ordered(vec![("chr1".to_string(), 2), ("chr2".to_string(), 3)]);
        for value in store.values_mut() {
            *value *= 10;
        }
        if let Some(value) = store.get_mut("chr2") {
            *value += 1;
        }
        let labels = store.map(|chrom, value| format!("{}:{}", chrom, value));
        assert_eq!(
            labels.values().cloned().collect::<Vec<String>>(),
            vec!["chr1:20".to_string(), "chr2:31".to_string()]
        );
    }
}

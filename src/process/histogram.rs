//! Per-dish table occupancy histogram
use crate::traits::RandomSource;
use itertools::Itertools;
use std::collections::btree_map::{self, Entry};
use std::collections::BTreeMap;
use std::fmt;

/// The tables serving a single dish.
///
/// Tables are exchangeable, so only the number of tables at each occupancy
/// is stored: `bins[k]` is the number of tables seating exactly `k`
/// customers. Empty bins are never stored.
///
/// # Example
///
/// ```
/// use pyp::process::TableHistogram;
///
/// let mut rng = rand::thread_rng();
/// let mut hist = TableHistogram::new();
///
/// hist.create_table();
/// hist.share_table(0.5, &mut rng);
/// hist.create_table();
///
/// assert_eq!(hist.n_tables(), 2);
/// assert_eq!(hist.n_customers(), 3);
/// assert_eq!(hist.bins().collect::<Vec<_>>(), vec![(1, 1), (2, 1)]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableHistogram {
    n_tables: usize,
    n_customers: usize,
    bins: BTreeMap<usize, usize>,
}

impl TableHistogram {
    /// An empty histogram
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of occupied tables
    #[inline]
    pub fn n_tables(&self) -> usize {
        self.n_tables
    }

    /// Number of seated customers
    #[inline]
    pub fn n_customers(&self) -> usize {
        self.n_customers
    }

    /// `true` if no customer is seated
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.n_customers == 0
    }

    /// Number of tables seating exactly `occupancy` customers
    pub fn n_tables_with(&self, occupancy: usize) -> usize {
        self.bins.get(&occupancy).copied().unwrap_or(0)
    }

    /// Iterate over `(occupancy, n_tables)` pairs in increasing order of
    /// occupancy.
    pub fn bins(&self) -> Bins<'_> {
        Bins(self.bins.iter())
    }

    /// Seat a customer at a new table
    pub fn create_table(&mut self) {
        self.add_to_bin(1);
        self.n_tables += 1;
        self.n_customers += 1;
    }

    /// Seat a customer at an existing table.
    ///
    /// A table with `k` customers is chosen with probability proportional to
    /// `k - discount`.
    ///
    /// # Panics
    /// If there are no tables.
    pub fn share_table<R: RandomSource + ?Sized>(
        &mut self,
        discount: f64,
        rng: &mut R,
    ) {
        assert!(
            self.n_tables > 0,
            "cannot share a table with no tables open"
        );
        let total = (self.n_tables as f64)
            .mul_add(-discount, self.n_customers as f64);
        let r = rng.uniform_unit() * total;
        let k = self.select_bin(r, |k, n| (k as f64 - discount) * n as f64);

        self.remove_from_bin(k);
        self.add_to_bin(k + 1);
        self.n_customers += 1;
    }

    /// Remove a customer chosen uniformly at random.
    ///
    /// Returns `true` if the customer was alone at their table, which is
    /// then closed.
    ///
    /// # Panics
    /// If there are no customers.
    pub fn remove_customer<R: RandomSource + ?Sized>(
        &mut self,
        rng: &mut R,
    ) -> bool {
        assert!(
            self.n_customers > 0,
            "cannot remove a customer from an empty histogram"
        );
        let r = rng.uniform_unit() * self.n_customers as f64;
        let k = self.select_bin(r, |k, n| (k * n) as f64);

        self.remove_from_bin(k);
        self.n_customers -= 1;
        if k == 1 {
            self.n_tables -= 1;
            true
        } else {
            self.add_to_bin(k - 1);
            false
        }
    }

    /// Walk the bins subtracting each bin's weight from `r` and return the
    /// occupancy of the bin where `r` runs out.
    fn select_bin<W>(&self, mut r: f64, weight: W) -> usize
    where
        W: Fn(usize, usize) -> f64,
    {
        let mut last = 0;
        for (&k, &n) in &self.bins {
            r -= weight(k, n);
            if r < 0.0 {
                return k;
            }
            last = k;
        }
        // round-off can leave r a hair above the total
        last
    }

    fn add_to_bin(&mut self, occupancy: usize) {
        *self.bins.entry(occupancy).or_insert(0) += 1;
    }

    fn remove_from_bin(&mut self, occupancy: usize) {
        match self.bins.entry(occupancy) {
            Entry::Occupied(mut entry) => {
                if *entry.get() > 1 {
                    *entry.get_mut() -= 1;
                } else {
                    entry.remove();
                }
            }
            Entry::Vacant(_) => {
                panic!("no table seats {} customers", occupancy)
            }
        }
    }
}

/// Iterator over the `(occupancy, n_tables)` bins of a [`TableHistogram`]
#[derive(Clone, Debug)]
pub struct Bins<'a>(btree_map::Iter<'a, usize, usize>);

impl<'a> Iterator for Bins<'a> {
    type Item = (usize, usize);

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(&k, &n)| (k, n))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<'a> ExactSizeIterator for Bins<'a> {}

impl<'a> IntoIterator for &'a TableHistogram {
    type Item = (usize, usize);
    type IntoIter = Bins<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.bins()
    }
}

impl fmt::Display for TableHistogram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bins = self.bins().map(|(k, n)| format!("{}:{}", k, n)).join(", ");
        write!(f, "[{}]", bins)
    }
}

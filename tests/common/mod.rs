//! A linear reference model shared by the integration tests.
//!
//! Entries live in a sorted `Vec`; every query is a scan, so the model is slow
//! but obviously correct. It reproduces the maps' return values and error
//! classifications, including the order in which arguments are checked.

#![allow(dead_code)]

use rank_rbtree::Error;

/// One entry of a snapshot: key, value, rank, count.
pub type Record = (i64, i64, isize, isize);

/// The kind of an error, ignoring its message.
pub fn classify(error: &Error) -> &'static str {
    match error {
        Error::NotFound => "NotFound",
        Error::Duplicate => "Duplicate",
        Error::InvalidArgument(_) => "InvalidArgument",
        Error::CapacityExhausted { .. } => "CapacityExhausted",
        Error::ArithmeticOverflow => "ArithmeticOverflow",
        Error::ConcurrentModification => "ConcurrentModification",
        Error::InvariantViolation(_) => "InvariantViolation",
    }
}

pub fn classified<T>(result: Result<T, Error>) -> Result<T, &'static str> {
    result.map_err(|error| classify(&error))
}

#[derive(Clone, Debug, Default)]
pub struct LinearModel {
    entries: Vec<(i64, i64, isize)>,
    /// `true` if every count must be 1.
    single: bool,
    /// Most entries a fixed-capacity map will hold.
    capacity: Option<usize>,
}

impl LinearModel {
    pub fn new(single: bool, capacity: Option<usize>) -> Self {
        Self {
            entries: Vec::new(),
            single,
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn extent(&self) -> isize {
        self.entries.iter().map(|&(_, _, count)| count).sum()
    }

    fn search(&self, key: i64) -> Result<usize, usize> {
        self.entries.binary_search_by_key(&key, |&(k, _, _)| k)
    }

    fn rank_at(&self, index: usize) -> isize {
        self.entries[..index].iter().map(|&(_, _, count)| count).sum()
    }

    pub fn snapshot(&self) -> Vec<Record> {
        let mut rank = 0;
        self.entries
            .iter()
            .map(|&(key, value, count)| {
                let record = (key, value, rank, count);
                rank += count;
                record
            })
            .collect()
    }

    pub fn try_add(&mut self, key: i64, value: i64, count: isize) -> Result<bool, &'static str> {
        if count <= 0 {
            return Err("InvalidArgument");
        }
        let Err(index) = self.search(key) else {
            return Ok(false);
        };
        if self.extent().checked_add(count).is_none() {
            return Err("ArithmeticOverflow");
        }
        if self.capacity.is_some_and(|capacity| self.entries.len() >= capacity) {
            return Err("CapacityExhausted");
        }
        self.entries.insert(index, (key, value, count));
        Ok(true)
    }

    pub fn try_remove(&mut self, key: i64) -> Option<(i64, i64)> {
        let index = self.search(key).ok()?;
        let (key, value, _) = self.entries.remove(index);
        Some((key, value))
    }

    pub fn try_get(&self, key: i64) -> Option<i64> {
        self.search(key).ok().map(|index| self.entries[index].1)
    }

    pub fn try_set(&mut self, key: i64, value: i64) -> bool {
        match self.search(key) {
            Ok(index) => {
                self.entries[index].1 = value;
                true
            }
            Err(_) => false,
        }
    }

    pub fn try_get_rank(&self, key: i64) -> Option<isize> {
        self.search(key).ok().map(|index| self.rank_at(index))
    }

    pub fn try_get_count(&self, key: i64) -> Option<isize> {
        self.search(key).ok().map(|index| self.entries[index].2)
    }

    pub fn try_get_key_by_rank(&self, rank: isize) -> Result<Option<i64>, &'static str> {
        if rank < 0 {
            return Err("InvalidArgument");
        }
        Ok(self
            .snapshot()
            .into_iter()
            .find(|&(_, _, start, count)| start <= rank && rank < start + count)
            .map(|(key, ..)| key))
    }

    /// Greatest entry below `key` (or equal, if `or_equal`), with its rank;
    /// rank 0 if none.
    pub fn nearest_less(&self, key: i64, or_equal: bool) -> (Option<(i64, i64)>, isize) {
        self.snapshot()
            .into_iter()
            .rev()
            .find(|&(k, ..)| k < key || (or_equal && k == key))
            .map_or((None, 0), |(k, v, rank, _)| (Some((k, v)), rank))
    }

    /// Least entry above `key` (or equal, if `or_equal`), with its rank;
    /// the extent if none.
    pub fn nearest_greater(&self, key: i64, or_equal: bool) -> (Option<(i64, i64)>, isize) {
        self.snapshot()
            .into_iter()
            .find(|&(k, ..)| k > key || (or_equal && k == key))
            .map_or((None, self.extent()), |(k, v, rank, _)| (Some((k, v)), rank))
    }

    pub fn adjust_count(&mut self, key: i64, delta: isize) -> Result<isize, &'static str> {
        let Ok(index) = self.search(key) else {
            return match delta {
                d if d < 0 => Err("InvalidArgument"),
                0 => Ok(0),
                d if self.single && d > 1 => Err("InvalidArgument"),
                d => self.try_add(key, 0, d).map(|_| d),
            };
        };
        let count = self.entries[index].2.checked_add(delta).ok_or("ArithmeticOverflow")?;
        if count < 0 || (self.single && count > 1) {
            return Err("InvalidArgument");
        }
        if count == 0 {
            self.entries.remove(index);
            return Ok(0);
        }
        if self.extent().checked_add(delta).is_none() {
            return Err("ArithmeticOverflow");
        }
        self.entries[index].2 = count;
        Ok(count)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

use std::hash::BuildHasher;
use std::hash::Hash;

use fnv::FnvBuildHasher;

use super::RevPool;
use crate::state::TrailedInt;
use crate::state::TrailedValues;

const NO_CELL: i64 = 0;

#[derive(Debug, Clone, Copy)]
struct MapCell<K, V> {
    key: K,
    value: V,
    /// Index + 1 of the next cell in the bucket chain, [`NO_CELL`] for the
    /// chain tail.
    next: i64,
}

/// A reversible immutable multimap.
///
/// Insertion is the only mutation: it prepends an immutable cell to a bucket
/// chain through reversible pointer cells, so backtracking un-inserts.
/// When the number of items exceeds twice the bucket count, the bucket table
/// is doubled; the active table is itself reversible, so rehashing during
/// search is undone like any other mutation.
#[derive(Debug)]
pub struct RevMultiMap<K, V> {
    cells: RevPool<MapCell<K, V>>,
    /// Bucket tables, oldest first. Each bucket holds the index + 1 of the
    /// head cell of its chain. Superseded tables keep their cells so that
    /// backtracking before the rehash finds them untouched.
    tables: Vec<Box<[TrailedInt]>>,
    /// Index into `tables` of the table currently in use.
    active_table: TrailedInt,
    num_items: TrailedInt,
    hasher: FnvBuildHasher,
}

impl<K: Hash + Eq + Copy, V: Copy + PartialEq> RevMultiMap<K, V> {
    pub fn new(trailed: &mut TrailedValues, initial_buckets: usize) -> Self {
        let buckets = Self::new_table(trailed, initial_buckets.max(1));
        RevMultiMap {
            cells: RevPool::new(trailed),
            tables: vec![buckets],
            active_table: trailed.grow(0),
            num_items: trailed.grow(0),
            hasher: FnvBuildHasher::default(),
        }
    }

    fn new_table(trailed: &mut TrailedValues, size: usize) -> Box<[TrailedInt]> {
        (0..size).map(|_| trailed.grow(NO_CELL)).collect()
    }

    pub fn num_items(&self, trailed: &TrailedValues) -> usize {
        trailed.read(self.num_items) as usize
    }

    fn bucket(&self, trailed: &TrailedValues, key: &K) -> TrailedInt {
        let table = &self.tables[trailed.read(self.active_table) as usize];
        let slot = self.hasher.hash_one(key) as usize % table.len();
        table[slot]
    }

    /// Insert `(key, value)`. Multiple values per key are allowed.
    pub fn insert(&mut self, trailed: &mut TrailedValues, key: K, value: V) {
        let bucket = self.bucket(trailed, &key);
        let next = trailed.read(bucket);
        let cell = self.cells.alloc(trailed, MapCell { key, value, next });
        trailed.assign(bucket, cell as i64 + 1);
        trailed.add_assign(self.num_items, 1);

        let buckets = self.tables[trailed.read(self.active_table) as usize].len();
        if self.num_items(trailed) > 2 * buckets {
            self.double(trailed);
        }
    }

    pub fn contains_key(&self, trailed: &TrailedValues, key: &K) -> bool {
        self.find(trailed, key).is_some()
    }

    /// One of the values stored under `key`, or `default` if there is none.
    /// Which value is returned when several are stored is unspecified.
    pub fn find_with_default(&self, trailed: &TrailedValues, key: &K, default: V) -> V {
        self.find(trailed, key).unwrap_or(default)
    }

    fn find(&self, trailed: &TrailedValues, key: &K) -> Option<V> {
        let mut current = trailed.read(self.bucket(trailed, key));
        while current != NO_CELL {
            let cell = self.cells.get(trailed, (current - 1) as u32);
            if cell.key == *key {
                return Some(cell.value);
            }
            current = cell.next;
        }
        None
    }

    /// Double the bucket table. The live cells are re-chained into fresh
    /// cells; the old table and its cells are left alone so that undoing
    /// past this point restores them.
    fn double(&mut self, trailed: &mut TrailedValues) {
        let old_table_index = trailed.read(self.active_table) as usize;
        let old_size = self.tables[old_table_index].len();
        let new_table = Self::new_table(trailed, old_size * 2);

        for slot in 0..old_size {
            let mut current = trailed.read(self.tables[old_table_index][slot]);
            while current != NO_CELL {
                let cell = *self.cells.get(trailed, (current - 1) as u32);
                let new_slot = self.hasher.hash_one(&cell.key) as usize % new_table.len();
                let next = trailed.read(new_table[new_slot]);
                let reinserted = self.cells.alloc(
                    trailed,
                    MapCell {
                        key: cell.key,
                        value: cell.value,
                        next,
                    },
                );
                trailed.assign(new_table[new_slot], reinserted as i64 + 1);
                current = cell.next;
            }
        }

        self.tables.push(new_table);
        trailed.assign(self.active_table, (self.tables.len() - 1) as i64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inserted_values_are_found_until_backtrack() {
        let mut trailed = TrailedValues::default();
        let mut map = RevMultiMap::new(&mut trailed, 4);

        map.insert(&mut trailed, 3, 30);

        trailed.push_level();
        map.insert(&mut trailed, 5, 50);

        assert!(map.contains_key(&trailed, &3));
        assert_eq!(map.find_with_default(&trailed, &5, -1), 50);
        assert_eq!(map.num_items(&trailed), 2);

        trailed.undo_to(0);

        assert!(map.contains_key(&trailed, &3));
        assert!(!map.contains_key(&trailed, &5));
        assert_eq!(map.num_items(&trailed), 1);
    }

    #[test]
    fn several_values_per_key_are_kept() {
        let mut trailed = TrailedValues::default();
        let mut map = RevMultiMap::new(&mut trailed, 4);

        map.insert(&mut trailed, 7, 1);
        map.insert(&mut trailed, 7, 2);

        assert_eq!(map.num_items(&trailed), 2);
        let found = map.find_with_default(&trailed, &7, 0);
        assert!(found == 1 || found == 2);
    }

    #[test]
    fn rehashing_during_search_is_reversible() {
        let mut trailed = TrailedValues::default();
        let mut map = RevMultiMap::new(&mut trailed, 2);

        map.insert(&mut trailed, 0, 0);

        trailed.push_level();
        // Push the map over the rehash threshold inside the level.
        for key in 1..20 {
            map.insert(&mut trailed, key, key * 10);
        }
        for key in 0..20 {
            assert_eq!(map.find_with_default(&trailed, &key, -1), key * 10);
        }

        trailed.undo_to(0);

        assert_eq!(map.num_items(&trailed), 1);
        assert_eq!(map.find_with_default(&trailed, &0, -1), 0);
        for key in 1..20 {
            assert!(!map.contains_key(&trailed, &key), "key {key} should be gone");
        }
    }
}

// Copyright (C) 2015-2025 The Neo Project.
//
// bounded_cache.rs file belongs to the neo project and is free
// software distributed under the MIT software license, see the
// accompanying file LICENSE in the main directory of the
// repository or http://www.opensource.org/licenses/mit-license.php
// for more details.
//
// Redistribution and use in source and binary forms with or without
// modifications are permitted.

use std::collections::VecDeque;

/// Fixed-capacity FIFO cache looked up by predicate.
///
/// Lookups do not refresh an entry; the oldest insertion is always the next
/// to be evicted.
#[derive(Debug, Clone)]
pub struct BoundedCache<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> BoundedCache<T> {
    /// Creates an empty cache. A zero capacity is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// First item matching `predicate`.
    pub fn find<P>(&self, predicate: P) -> Option<&T>
    where
        P: FnMut(&&T) -> bool,
    {
        self.items.iter().find(predicate)
    }

    /// Inserts `item`, evicting the oldest entry when full.
    pub fn insert(&mut self, item: T) {
        if self.items.len() >= self.capacity {
            self.items.pop_front();
        }
        self.items.push_back(item);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Items from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }
}

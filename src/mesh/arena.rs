// SPDX-License-Identifier: MIT
//
// Copyright (c) 2025 Alexandre Severino
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in
// all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.

use std::marker::PhantomData;

use crate::{
    error::{PaveError, PaveResult},
    mesh::basic_types::{Handle, Table},
};

#[derive(Debug, Clone)]
struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// Fixed-capacity slot storage with a free-list. Removing a value bumps the
/// slot generation so handles to it stop resolving.
#[derive(Debug, Clone)]
pub struct Arena<H, T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    live: usize,
    capacity: usize,
    table: Table,
    _handle: PhantomData<H>,
}

impl<H: Handle, T> Arena<H, T> {
    pub fn new(table: Table, capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity.min(1 << 16)),
            free: Vec::new(),
            live: 0,
            capacity,
            table,
            _handle: PhantomData,
        }
    }

    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Slots that can still be filled.
    pub fn available(&self) -> usize {
        self.capacity.saturating_sub(self.live)
    }

    pub fn check_room(&self, wanted: usize) -> PaveResult<()> {
        if wanted > self.available() {
            return Err(PaveError::capacity(self.table, self.capacity));
        }
        Ok(())
    }

    pub fn insert(&mut self, value: T) -> PaveResult<H> {
        self.check_room(1)?;
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.value = Some(value);
            return Ok(H::from_parts(index, slot.generation));
        }
        let index = u32::try_from(self.slots.len())
            .map_err(|_| PaveError::capacity(self.table, self.capacity))?;
        self.slots.push(Slot {
            generation: 0,
            value: Some(value),
        });
        Ok(H::from_parts(index, 0))
    }

    pub fn remove(&mut self, h: H) -> Option<T> {
        let slot = self.slots.get_mut(h.index())?;
        if slot.generation != h.generation() {
            return None;
        }
        let value = slot.value.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(h.index() as u32);
        self.live -= 1;
        Some(value)
    }

    pub fn get(&self, h: H) -> Option<&T> {
        self.slots
            .get(h.index())
            .filter(|s| s.generation == h.generation())
            .and_then(|s| s.value.as_ref())
    }

    pub fn get_mut(&mut self, h: H) -> Option<&mut T> {
        self.slots
            .get_mut(h.index())
            .filter(|s| s.generation == h.generation())
            .and_then(|s| s.value.as_mut())
    }

    pub fn contains(&self, h: H) -> bool {
        self.get(h).is_some()
    }

    /// Live entries in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (H, &T)> + '_ {
        self.slots.iter().enumerate().filter_map(|(i, s)| {
            s.value
                .as_ref()
                .map(|v| (H::from_parts(i as u32, s.generation), v))
        })
    }

    pub fn handles(&self) -> Vec<H> {
        self.iter().map(|(h, _)| h).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::Arena;
    use crate::error::PaveError;
    use crate::mesh::basic_types::{NodeId, Table};

    #[test]
    fn stale_handle_does_not_alias_reused_slot() {
        let mut arena: Arena<NodeId, &str> = Arena::new(Table::Nodes, 2);
        let a = arena.insert("a").unwrap();
        assert_eq!(arena.remove(a), Some("a"));
        let b = arena.insert("b").unwrap();
        assert!(arena.get(a).is_none());
        assert_eq!(arena.get(b), Some(&"b"));
        assert_eq!(arena.remove(a), None);
    }

    #[test]
    fn full_arena_reports_capacity() {
        let mut arena: Arena<NodeId, u8> = Arena::new(Table::Nodes, 1);
        arena.insert(1).unwrap();
        assert_eq!(
            arena.insert(2),
            Err(PaveError::CapacityExceeded {
                table: Table::Nodes,
                capacity: 1
            })
        );
        assert_eq!(arena.len(), 1);
    }
}

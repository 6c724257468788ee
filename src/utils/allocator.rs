use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

/// Unique identifier with generation tracking to prevent stale references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct GenerationalId {
    pub index: usize,
    pub generation: u32,
}

impl GenerationalId {
    pub fn new(index: usize, generation: u32) -> Self {
        Self { index, generation }
    }
}

/// Handle of a body stored in an [`Arena`].
///
/// Bodies are compared by handle, never by value, so two geometrically
/// identical bodies remain distinct members of any body set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct BodyId(pub GenerationalId);

impl BodyId {
    pub fn new(index: usize, generation: u32) -> Self {
        Self(GenerationalId::new(index, generation))
    }

    pub fn from_index(index: u32) -> Self {
        Self::new(index as usize, 0)
    }

    pub fn index(&self) -> usize {
        self.0.index
    }

    pub fn generation(&self) -> u32 {
        self.0.generation
    }
}

impl Default for BodyId {
    fn default() -> Self {
        Self(GenerationalId::new(usize::MAX, 0))
    }
}

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.0.index, self.0.generation)
    }
}

/// Generational arena that hands out stable ids while preventing use-after-free.
///
/// Iteration always follows slot order, which keeps every pass over the
/// bodies deterministic.
#[derive(Debug, Clone)]
pub struct Arena<T> {
    items: Vec<Option<T>>,
    generations: Vec<u32>,
    free_list: VecDeque<usize>,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            generations: Vec::new(),
            free_list: VecDeque::new(),
        }
    }

    /// Returns the id the next call to [`Arena::insert`] will hand out.
    pub fn next_id(&self) -> BodyId {
        match self.free_list.front() {
            Some(&index) => BodyId::new(index, self.generations[index]),
            None => BodyId::new(self.items.len(), 0),
        }
    }

    pub fn insert(&mut self, item: T) -> BodyId {
        if let Some(index) = self.free_list.pop_front() {
            self.items[index] = Some(item);
            return BodyId::new(index, self.generations[index]);
        }

        let index = self.items.len();
        self.items.push(Some(item));
        self.generations.push(0);
        BodyId::new(index, 0)
    }

    pub fn get(&self, id: BodyId) -> Option<&T> {
        if !self.is_valid(id) {
            return None;
        }
        self.items.get(id.index()).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: BodyId) -> Option<&mut T> {
        if !self.is_valid(id) {
            return None;
        }
        self.items.get_mut(id.index()).and_then(Option::as_mut)
    }

    pub fn remove(&mut self, id: BodyId) -> Option<T> {
        if !self.is_valid(id) {
            return None;
        }
        let taken = self.items.get_mut(id.index()).and_then(Option::take);
        if taken.is_some() {
            self.generations[id.index()] = self.generations[id.index()].wrapping_add(1);
            self.free_list.push_back(id.index());
        }
        taken
    }

    pub fn contains(&self, id: BodyId) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (BodyId, &T)> + '_ {
        self.items.iter().enumerate().filter_map(move |(index, slot)| {
            slot.as_ref()
                .map(|item| (BodyId::new(index, self.generations[index]), item))
        })
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (BodyId, &mut T)> + '_ {
        let generations = &self.generations;
        self.items
            .iter_mut()
            .enumerate()
            .filter_map(move |(index, slot)| {
                slot.as_mut()
                    .map(|item| (BodyId::new(index, generations[index]), item))
            })
    }

    pub fn len(&self) -> usize {
        self.items.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn is_valid(&self, id: BodyId) -> bool {
        self.generations
            .get(id.index())
            .is_some_and(|&generation| generation == id.generation())
    }
}

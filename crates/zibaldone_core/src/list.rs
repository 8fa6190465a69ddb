use std::cmp::Reverse;
use std::collections::HashSet;

use engine_logging::engine_warn;

use crate::Item;

/// Client-side item list: unique by id, newest first.
///
/// Only rebuilt wholesale from a fetch or shrunk by one id after a confirmed
/// delete; there is no incremental merge.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ItemList {
    items: Vec<Item>,
}

impl ItemList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole list with a fresh fetch.
    ///
    /// Duplicate ids keep their first occurrence. The sort is stable, so equal
    /// timestamps keep server order; items without a timestamp go last.
    pub fn replace(&mut self, items: Vec<Item>) {
        let mut seen = HashSet::with_capacity(items.len());
        let mut unique: Vec<Item> = items
            .into_iter()
            .filter(|item| {
                let fresh = seen.insert(item.id.clone());
                if !fresh {
                    engine_warn!("Dropping duplicate item id {} from refresh", item.id);
                }
                fresh
            })
            .collect();
        unique.sort_by_key(|item| Reverse(item.created_at));
        self.items = unique;
    }

    pub fn remove(&mut self, id: &str) -> Option<Item> {
        let index = self.items.iter().position(|item| item.id == id)?;
        Some(self.items.remove(index))
    }

    pub fn get(&self, id: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Item> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<'a> IntoIterator for &'a ItemList {
    type Item = &'a Item;
    type IntoIter = std::slice::Iter<'a, Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

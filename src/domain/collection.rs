use std::collections::BTreeMap;

use super::players::Player;
use super::tournaments::Tournament;

/// Something with a stable source id
pub trait Identified {
    fn key(&self) -> &str;
}

impl Identified for Player {
    fn key(&self) -> &str {
        &self.id
    }
}

impl Identified for Tournament {
    fn key(&self) -> &str {
        self.id()
    }
}

/// Assembled aggregates indexed by id. Re-adding an id replaces the entry.
pub struct Collection<T> {
    items: BTreeMap<String, T>,
}

pub type PlayerCollection = Collection<Player>;
pub type TournamentCollection = Collection<Tournament>;

impl<T: Identified> Collection<T> {
    pub fn new() -> Self {
        Self { items: BTreeMap::new() }
    }

    pub fn add(&mut self, item: T) {
        self.items.insert(item.key().to_string(), item);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.items.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.values()
    }

    pub fn into_vec(self) -> Vec<T> {
        self.items.into_values().collect()
    }
}

impl<T: Identified> Default for Collection<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Identified> FromIterator<T> for Collection<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut collection = Self::new();
        for item in iter {
            collection.add(item);
        }
        collection
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::players::PlayerDetail;

    #[test]
    fn test_readding_replaces() {
        let mut collection = PlayerCollection::new();
        collection.add(Player::assemble("p1".into(), None, PlayerDetail::default(), None));
        collection.add(Player::assemble(
            "p1".into(),
            None,
            PlayerDetail {
                ranking: Some(2),
                ..Default::default()
            },
            None,
        ));

        assert_eq!(collection.len(), 1);
        assert_eq!(collection.get("p1").and_then(|p| p.ranking), Some(2));
    }
}

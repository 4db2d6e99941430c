//! In-memory player registry.

use std::sync::RwLock;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use uuid::Uuid;
use wordmon_core::player::level_from_xp;
use wordmon_core::{Player, SpawnEvent};

use super::{PlayerStore, SpawnSink};
use crate::error::StoreError;

/// Player registry backed by sharded concurrent maps.
///
/// Readers (lookup, leaderboard) and writers (creation, updates) lock only
/// the shard holding the player. Name uniqueness is enforced through the
/// name index's entry lock, so two concurrent creations with the same name
/// cannot both succeed.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    players: DashMap<String, Player>,
    names: DashMap<String, String>,
    current_spawn: RwLock<Option<SpawnEvent>>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts players restored from a snapshot, keeping their ids.
    ///
    /// Levels are recomputed from experience.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateName`] if a restored name is already
    /// registered. Players inserted before the conflict are kept.
    pub fn restore(&self, players: impl IntoIterator<Item = Player>) -> Result<usize, StoreError> {
        let mut restored = 0;
        for mut player in players {
            player.level = level_from_xp(player.xp);
            match self.names.entry(player.name.clone()) {
                Entry::Occupied(_) => {
                    return Err(StoreError::DuplicateName { name: player.name });
                }
                Entry::Vacant(slot) => {
                    slot.insert(player.id.clone());
                    self.players.insert(player.id.clone(), player);
                    restored += 1;
                }
            }
        }
        Ok(restored)
    }

    /// Number of registered players.
    #[must_use]
    pub fn len(&self) -> usize {
        self.players.len()
    }

    /// Returns `true` if no player is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Most recent spawn recorded through [`SpawnSink`].
    #[must_use]
    pub fn current_spawn(&self) -> Option<SpawnEvent> {
        self.current_spawn
            .read()
            .ok()
            .and_then(|guard| guard.clone())
    }
}

impl PlayerStore for InMemoryStore {
    fn create_player(&self, name: &str) -> Result<Player, StoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::InvalidName {
                name: name.to_string(),
            });
        }
        match self.names.entry(name.to_string()) {
            Entry::Occupied(_) => Err(StoreError::DuplicateName {
                name: name.to_string(),
            }),
            Entry::Vacant(slot) => {
                let player = Player::new(Uuid::new_v4().to_string(), name);
                self.players.insert(player.id.clone(), player.clone());
                slot.insert(player.id.clone());
                tracing::debug!(id = %player.id, name, "player created");
                Ok(player)
            }
        }
    }

    fn get_player(&self, id: &str) -> Result<Player, StoreError> {
        self.players
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })
    }

    fn find_by_name(&self, name: &str) -> Option<Player> {
        let id = self.names.get(name.trim())?.value().clone();
        self.get_player(&id).ok()
    }

    /// Names are fixed at creation; the stored name is kept. The level is
    /// derived from the new experience.
    fn update_player(&self, player: &Player) -> Result<(), StoreError> {
        let mut entry = self
            .players
            .get_mut(&player.id)
            .ok_or_else(|| StoreError::NotFound {
                id: player.id.clone(),
            })?;
        let stored = entry.value_mut();
        stored.xp = player.xp;
        stored.level = level_from_xp(player.xp);
        stored.inventory.clone_from(&player.inventory);
        Ok(())
    }

    fn list_players(&self) -> Vec<Player> {
        let mut players: Vec<Player> = self.players.iter().map(|e| e.value().clone()).collect();
        players.sort_by(|a, b| b.xp.cmp(&a.xp).then_with(|| a.name.cmp(&b.name)));
        players
    }
}

impl SpawnSink for InMemoryStore {
    fn record_spawn(&self, event: &SpawnEvent) {
        if let Ok(mut current) = self.current_spawn.write() {
            *current = Some(event.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use wordmon_core::{Rarity, Word};

    use super::*;

    #[test]
    fn create_and_get() {
        let store = InMemoryStore::new();
        let player = store.create_player("Ash").unwrap();
        assert_eq!(player.level, 1);
        assert_eq!(store.get_player(&player.id).unwrap(), player);
        assert_eq!(store.find_by_name(" Ash ").unwrap().id, player.id);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn duplicate_name_rejected() {
        let store = InMemoryStore::new();
        store.create_player("Ash").unwrap();
        let err = store.create_player("Ash").unwrap_err();
        assert!(matches!(err, StoreError::DuplicateName { ref name } if name == "Ash"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn blank_name_rejected() {
        let store = InMemoryStore::new();
        assert!(matches!(
            store.create_player("   "),
            Err(StoreError::InvalidName { .. })
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn unknown_id() {
        let store = InMemoryStore::new();
        assert!(matches!(
            store.get_player("nope"),
            Err(StoreError::NotFound { .. })
        ));
        let ghost = Player::new("nope", "Ghost");
        assert!(matches!(
            store.update_player(&ghost),
            Err(StoreError::NotFound { .. })
        ));
    }

    #[test]
    fn update_keeps_name() {
        let store = InMemoryStore::new();
        let mut player = store.create_player("Ash").unwrap();
        player.xp = 120;
        player.level = 2;
        player.inventory.insert("chat".to_string(), 1);
        player.name = "Gary".to_string();
        store.update_player(&player).unwrap();

        let stored = store.get_player(&player.id).unwrap();
        assert_eq!(stored.name, "Ash");
        assert_eq!(stored.xp, 120);
        assert_eq!(stored.captured("chat"), 1);
    }

    #[test]
    fn list_is_leaderboard() {
        let store = InMemoryStore::new();
        let mut misty = store.create_player("Misty").unwrap();
        store.create_player("Brock").unwrap();
        store.create_player("Ash").unwrap();
        misty.xp = 50;
        store.update_player(&misty).unwrap();

        let names: Vec<String> = store.list_players().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["Misty", "Ash", "Brock"]);
    }

    #[test]
    fn restore_keeps_ids() {
        let store = InMemoryStore::new();
        let restored = store
            .restore(vec![Player::new("p1", "Ash"), Player::new("p2", "Misty")])
            .unwrap();
        assert_eq!(restored, 2);
        assert_eq!(store.get_player("p2").unwrap().name, "Misty");
        assert!(store.create_player("Ash").is_err());
        assert!(store.restore(vec![Player::new("p3", "Misty")]).is_err());
    }

    #[test]
    fn levels_follow_experience() {
        let store = InMemoryStore::new();
        let mut edited = Player::new("p1", "Ash");
        edited.xp = 250;
        edited.level = 9;
        store.restore(vec![edited]).unwrap();
        assert_eq!(store.get_player("p1").unwrap().level, 3);

        let mut player = store.get_player("p1").unwrap();
        player.xp = 99;
        player.level = 7;
        store.update_player(&player).unwrap();
        assert_eq!(store.get_player("p1").unwrap().level, 1);
    }

    #[test]
    fn records_current_spawn() {
        let store = InMemoryStore::new();
        assert!(store.current_spawn().is_none());
        let event = SpawnEvent {
            round: 2,
            word: Word::new("c1", "chat", Rarity::Common, 5),
        };
        store.record_spawn(&event);
        assert_eq!(store.current_spawn(), Some(event));
    }

    #[test]
    fn concurrent_creation_same_name() {
        let store = Arc::new(InMemoryStore::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || store.create_player("Ash").is_ok())
            })
            .collect();
        let created = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();
        assert_eq!(created, 1);
        assert_eq!(store.len(), 1);
    }
}

//! Entity repository for JSON storage
//!
//! Categories, accounts, payees, locations and projects share one id space
//! and one file, entities.json.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::TallyError;
use crate::models::{Entity, EntityId, EntityKind};

use super::file_io::{read_json, write_json_atomic};

/// Serializable entity data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct EntityData {
    entities: Vec<Entity>,
}

/// Repository for entity persistence
pub struct EntityRepository {
    path: PathBuf,
    data: RwLock<HashMap<EntityId, Entity>>,
}

impl EntityRepository {
    /// Create a new entity repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    /// Load entities from disk
    pub fn load(&self) -> Result<(), TallyError> {
        let file_data: EntityData = read_json(&self.path)?;
        self.replace_all(file_data.entities)
    }

    /// Save entities to disk
    pub fn save(&self) -> Result<(), TallyError> {
        let data = self
            .data
            .read()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut entities: Vec<_> = data.values().cloned().collect();
        entities.sort_by_key(|e| e.id);
        write_json_atomic(&self.path, &EntityData { entities })
    }

    /// Replace the in-memory contents
    pub fn replace_all(&self, entities: Vec<Entity>) -> Result<(), TallyError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        data.clear();
        for entity in entities {
            data.insert(entity.id, entity);
        }
        Ok(())
    }

    /// Get an entity by ID
    pub fn get(&self, id: EntityId) -> Result<Option<Entity>, TallyError> {
        let data = self
            .data
            .read()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.get(&id).cloned())
    }

    /// Get an entity of `kind` by exact title (case-insensitive)
    pub fn get_by_title(&self, kind: EntityKind, title: &str) -> Result<Option<Entity>, TallyError> {
        let data = self
            .data
            .read()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let title = title.trim().to_lowercase();
        Ok(data
            .values()
            .find(|e| e.kind == kind && e.title.to_lowercase() == title)
            .cloned())
    }

    /// All entities of `kind`, ordered by title
    pub fn list(&self, kind: EntityKind) -> Result<Vec<Entity>, TallyError> {
        self.list_where(|e| e.kind == kind)
    }

    /// Active entities of `kind` without a parent, ordered by title
    ///
    /// Locations and projects skip their reserved id 0.
    pub fn top_level(&self, kind: EntityKind) -> Result<Vec<Entity>, TallyError> {
        self.list_where(|e| {
            e.kind == kind
                && e.active
                && e.parent.is_none()
                && !(kind.has_reserved_zero() && e.id.get() == 0)
        })
    }

    /// Active direct children of `parent`, ordered by title
    pub fn children(&self, kind: EntityKind, parent: EntityId) -> Result<Vec<Entity>, TallyError> {
        self.list_where(|e| e.kind == kind && e.active && e.parent == Some(parent))
    }

    /// `root` and every entity below it in the hierarchy
    pub fn descendants_of(&self, root: EntityId) -> Result<HashSet<EntityId>, TallyError> {
        let data = self
            .data
            .read()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut by_parent: HashMap<EntityId, Vec<EntityId>> = HashMap::new();
        for entity in data.values() {
            if let Some(parent) = entity.parent {
                by_parent.entry(parent).or_default().push(entity.id);
            }
        }

        let mut found = HashSet::from([root]);
        let mut pending = vec![root];
        while let Some(id) = pending.pop() {
            for child in by_parent.get(&id).into_iter().flatten() {
                if found.insert(*child) {
                    pending.push(*child);
                }
            }
        }
        Ok(found)
    }

    fn list_where<F>(&self, predicate: F) -> Result<Vec<Entity>, TallyError>
    where
        F: Fn(&Entity) -> bool,
    {
        let data = self
            .data
            .read()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut entities: Vec<_> = data.values().filter(|e| predicate(e)).cloned().collect();
        entities.sort_by(|a, b| {
            a.title
                .to_lowercase()
                .cmp(&b.title.to_lowercase())
                .then(a.id.cmp(&b.id))
        });
        Ok(entities)
    }

    /// Next free id
    pub fn next_id(&self) -> Result<EntityId, TallyError> {
        let data = self
            .data
            .read()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let max = data.keys().map(|id| id.get()).max().unwrap_or(0);
        Ok(EntityId::new(max + 1))
    }

    /// Insert or update an entity
    pub fn upsert(&self, entity: Entity) -> Result<(), TallyError> {
        entity.validate().map_err(TallyError::Validation)?;

        let mut data = self
            .data
            .write()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        if let Some(parent) = entity.parent {
            match data.get(&parent) {
                Some(p) if p.kind == entity.kind => {}
                _ => {
                    return Err(TallyError::entity_not_found(
                        "Parent category",
                        parent.to_string(),
                    ))
                }
            }
        }

        data.insert(entity.id, entity);
        Ok(())
    }

    /// Count entities
    pub fn count(&self) -> Result<usize, TallyError> {
        let data = self
            .data
            .read()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire read lock: {}", e)))?;
        Ok(data.len())
    }
}

//! In-memory group repository.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use yatube_core::domain::Group;
use yatube_core::error::RepoError;
use yatube_core::ports::{BaseRepository, GroupRepository};

/// Group store enforcing the same unique-slug rule as the `groups` table.
pub struct InMemoryGroupRepository {
    store: RwLock<HashMap<Uuid, Group>>,
}

impl InMemoryGroupRepository {
    pub fn new() -> Self {
        Self {
            store: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryGroupRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseRepository<Group, Uuid> for InMemoryGroupRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Group>, RepoError> {
        Ok(self.store.read().await.get(&id).cloned())
    }

    async fn save(&self, group: Group) -> Result<Group, RepoError> {
        let mut store = self.store.write().await;

        if let Some(existing) = store.get(&group.id) {
            if existing.slug != group.slug {
                return Err(RepoError::Constraint(format!(
                    "slug of group {} cannot change",
                    existing.slug
                )));
            }
        } else if store.values().any(|g| g.slug == group.slug) {
            return Err(RepoError::Constraint(format!(
                "group with slug {} already exists",
                group.slug
            )));
        }

        store.insert(group.id, group.clone());
        Ok(group)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        match self.store.write().await.remove(&id) {
            Some(_) => Ok(()),
            None => Err(RepoError::NotFound),
        }
    }
}

#[async_trait]
impl GroupRepository for InMemoryGroupRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, RepoError> {
        let store = self.store.read().await;
        Ok(store.values().find(|g| g.slug == slug).cloned())
    }

    async fn list(&self) -> Result<Vec<Group>, RepoError> {
        let mut groups: Vec<Group> = self.store.read().await.values().cloned().collect();
        groups.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(groups)
    }
}

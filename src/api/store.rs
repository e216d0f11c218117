use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::core::{GoalParams, GoalPlan};

#[derive(Debug, Clone, PartialEq)]
pub struct NewGoal {
    pub name: String,
    pub params: GoalParams,
    pub plan: GoalPlan,
}

/// A saved goal: its inputs plus the plan the engine produced when it was saved.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredGoal {
    pub id: Uuid,
    pub name: String,
    pub params: GoalParams,
    pub plan: GoalPlan,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Error, PartialEq)]
pub enum StoreError {
    #[error("goal {0} not found")]
    NotFound(Uuid),
    #[error("goal store unavailable")]
    Unavailable,
}

pub trait GoalStore: Send + Sync {
    /// All goals, most recently created first.
    fn list(&self) -> Result<Vec<StoredGoal>, StoreError>;
    fn get(&self, id: Uuid) -> Result<StoredGoal, StoreError>;
    fn insert(&self, goal: NewGoal) -> Result<StoredGoal, StoreError>;
    fn update(&self, id: Uuid, goal: NewGoal) -> Result<StoredGoal, StoreError>;
    fn delete(&self, id: Uuid) -> Result<(), StoreError>;
}

#[derive(Debug, Default)]
struct Entries {
    next_seq: u64,
    goals: HashMap<Uuid, (u64, StoredGoal)>,
}

#[derive(Debug, Default)]
pub struct InMemoryGoalStore {
    inner: RwLock<Entries>,
}

impl GoalStore for InMemoryGoalStore {
    fn list(&self) -> Result<Vec<StoredGoal>, StoreError> {
        let entries = self.inner.read().map_err(|_| StoreError::Unavailable)?;
        let mut goals: Vec<&(u64, StoredGoal)> = entries.goals.values().collect();
        goals.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(goals.into_iter().map(|(_, goal)| goal.clone()).collect())
    }

    fn get(&self, id: Uuid) -> Result<StoredGoal, StoreError> {
        let entries = self.inner.read().map_err(|_| StoreError::Unavailable)?;
        entries
            .goals
            .get(&id)
            .map(|(_, goal)| goal.clone())
            .ok_or(StoreError::NotFound(id))
    }

    fn insert(&self, goal: NewGoal) -> Result<StoredGoal, StoreError> {
        let mut entries = self.inner.write().map_err(|_| StoreError::Unavailable)?;
        let now = Utc::now();
        let stored = StoredGoal {
            id: Uuid::new_v4(),
            name: goal.name,
            params: goal.params,
            plan: goal.plan,
            created_at: now,
            updated_at: now,
        };
        let seq = entries.next_seq;
        entries.next_seq += 1;
        entries.goals.insert(stored.id, (seq, stored.clone()));
        Ok(stored)
    }

    fn update(&self, id: Uuid, goal: NewGoal) -> Result<StoredGoal, StoreError> {
        let mut entries = self.inner.write().map_err(|_| StoreError::Unavailable)?;
        let (_, stored) = entries.goals.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        stored.name = goal.name;
        stored.params = goal.params;
        stored.plan = goal.plan;
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let mut entries = self.inner.write().map_err(|_| StoreError::Unavailable)?;
        entries
            .goals
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound(id))
    }
}

//! 进程内 Interaction 存储

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use vt_core::{Interaction, Result, VeritasError};

use crate::interaction_store::InteractionStore;

/// 基于 `RwLock<HashMap>` 的存储，语义与 SQLite 实现一致
#[derive(Debug, Default)]
pub struct MemoryInteractionStore {
    entries: RwLock<HashMap<String, Interaction>>,
}

impl MemoryInteractionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录总数
    pub async fn count(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[async_trait]
impl InteractionStore for MemoryInteractionStore {
    async fn create(&self, entry: &Interaction) -> Result<()> {
        entry.validate()?;

        let mut entries = self.entries.write().await;
        if entries.contains_key(&entry.id) {
            return Err(VeritasError::DuplicateKey(entry.id.clone()));
        }
        entries.insert(entry.id.clone(), entry.clone());
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Interaction> {
        let entries = self.entries.read().await;
        entries
            .get(id)
            .cloned()
            .ok_or_else(|| VeritasError::NotFound(id.to_string()))
    }

    async fn update_feedback(&self, id: &str, is_correct: bool, feedback: &str) -> Result<()> {
        let mut entries = self.entries.write().await;
        let entry = entries
            .get_mut(id)
            .ok_or_else(|| VeritasError::NotFound(id.to_string()))?;
        entry.is_correct = is_correct;
        entry.feedback = feedback.to_string();
        Ok(())
    }

    async fn list_unresolved(&self) -> Result<Vec<Interaction>> {
        let entries = self.entries.read().await;
        let mut unresolved: Vec<Interaction> = entries
            .values()
            .filter(|e| e.is_unresolved())
            .cloned()
            .collect();
        unresolved.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        Ok(unresolved)
    }
}

//! In-memory cart repository keyed by session.

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCartLine {
    pub id: String,
    pub session_id: String,
    pub product_id: String,
    pub quantity: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Outcome of an add: a new line or a merge into an existing one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    Created(StoredCartLine),
    Merged(StoredCartLine),
}

impl AddOutcome {
    pub fn line(&self) -> &StoredCartLine {
        match self {
            Self::Created(line) | Self::Merged(line) => line,
        }
    }
}

#[derive(Debug, Default)]
pub struct CartRepository {
    lines: RwLock<Vec<StoredCartLine>>,
}

impl CartRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines of a session in insertion order.
    pub async fn list(&self, session_id: &str) -> Vec<StoredCartLine> {
        self.lines
            .read()
            .await
            .iter()
            .filter(|line| line.session_id == session_id)
            .cloned()
            .collect()
    }

    /// Adds `quantity` of a product, incrementing the session's existing line
    /// for that product if there is one.
    pub async fn add(&self, session_id: &str, product_id: &str, quantity: u32) -> AddOutcome {
        let now = Utc::now();
        let mut lines = self.lines.write().await;

        if let Some(line) = lines
            .iter_mut()
            .find(|line| line.session_id == session_id && line.product_id == product_id)
        {
            line.quantity = line.quantity.saturating_add(quantity);
            line.updated_at = now;
            return AddOutcome::Merged(line.clone());
        }

        let line = StoredCartLine {
            id: Uuid::new_v4().to_string(),
            session_id: session_id.to_string(),
            product_id: product_id.to_string(),
            quantity,
            created_at: now,
            updated_at: now,
        };
        lines.push(line.clone());
        AddOutcome::Created(line)
    }

    pub async fn update_quantity(&self, item_id: &str, quantity: u32) -> Option<StoredCartLine> {
        let mut lines = self.lines.write().await;
        let line = lines.iter_mut().find(|line| line.id == item_id)?;
        line.quantity = quantity;
        line.updated_at = Utc::now();
        Some(line.clone())
    }

    /// Returns false if no line had `item_id`.
    pub async fn remove(&self, item_id: &str) -> bool {
        let mut lines = self.lines.write().await;
        let before = lines.len();
        lines.retain(|line| line.id != item_id);
        lines.len() != before
    }

    /// Deletes every line of the session, returning how many were removed.
    pub async fn clear_session(&self, session_id: &str) -> usize {
        let mut lines = self.lines.write().await;
        let before = lines.len();
        lines.retain(|line| line.session_id != session_id);
        before - lines.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn add_merges_by_product_within_a_session() {
        let repo = CartRepository::new();
        let first = repo.add("s1", "p-mug", 1).await;
        let second = repo.add("s1", "p-mug", 2).await;
        let other_session = repo.add("s2", "p-mug", 1).await;

        assert!(matches!(first, AddOutcome::Created(_)));
        assert!(matches!(second, AddOutcome::Merged(_)));
        assert!(matches!(other_session, AddOutcome::Created(_)));
        assert_eq!(second.line().id, first.line().id);

        let lines = repo.list("s1").await;
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity, 3);
    }

    #[tokio::test]
    async fn clear_session_only_touches_that_session() {
        let repo = CartRepository::new();
        repo.add("s1", "p-mug", 1).await;
        repo.add("s1", "p-lamp", 1).await;
        repo.add("s2", "p-lamp", 1).await;

        assert_eq!(repo.clear_session("s1").await, 2);
        assert!(repo.list("s1").await.is_empty());
        assert_eq!(repo.list("s2").await.len(), 1);
    }

    #[tokio::test]
    async fn update_and_remove_report_missing_lines() {
        let repo = CartRepository::new();
        assert!(repo.update_quantity("nope", 2).await.is_none());
        assert!(!repo.remove("nope").await);

        let id = repo.add("s1", "p-rug", 1).await.line().id.clone();
        assert_eq!(repo.update_quantity(&id, 4).await.unwrap().quantity, 4);
        assert!(repo.remove(&id).await);
        assert!(repo.list("s1").await.is_empty());
    }
}

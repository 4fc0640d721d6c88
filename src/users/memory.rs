use std::sync::Mutex;

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::users::{
    repo::{StoreError, UserStore},
    repo_types::User,
};

/// Store used by tests; same id and uniqueness rules as the MySQL table.
#[derive(Default)]
pub struct InMemoryUserStore {
    rows: Mutex<Vec<User>>,
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: u64) -> Result<Option<User>, StoreError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().find(|u| u.id == id).cloned())
    }

    async fn insert(&self, name: &str, email: &str, password_hash: &str) -> Result<u64, StoreError> {
        let mut rows = self.rows.lock().unwrap();
        if rows.iter().any(|u| u.email == email) {
            return Err(StoreError::DuplicateEmail);
        }
        let id = rows.last().map_or(1, |u| u.id + 1);
        rows.push(User {
            id,
            name: name.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: OffsetDateTime::now_utc(),
        });
        Ok(id)
    }

    async fn ensure_schema(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn insert_assigns_increasing_ids() {
        let store = InMemoryUserStore::default();
        let a = store.insert("A", "a@x.com", "h").await.expect("insert a");
        let b = store.insert("B", "b@x.com", "h").await.expect("insert b");
        assert!(b > a);
        assert_eq!(store.find_by_id(b).await.unwrap().unwrap().email, "b@x.com");
    }

    #[tokio::test]
    async fn insert_rejects_duplicate_email() {
        let store = InMemoryUserStore::default();
        store.insert("A", "a@x.com", "h").await.expect("first insert");
        let err = store.insert("Other", "a@x.com", "h2").await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateEmail));
    }

    #[tokio::test]
    async fn email_lookup_is_exact() {
        let store = InMemoryUserStore::default();
        store.insert("A", "a@x.com", "h").await.expect("insert");
        assert!(store.find_by_email("A@X.COM").await.unwrap().is_none());
    }
}

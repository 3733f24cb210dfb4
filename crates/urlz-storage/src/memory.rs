use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use urlz_core::error::{Result, StorageError};
use urlz_core::{ReadRepository, Repository, ShortCode, UrlRecord};

/// In-memory implementation of the Repository trait using DashMap.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    storage: DashMap<String, UrlRecord>,
}

impl InMemoryRepository {
    /// Creates a new in-memory repository.
    pub fn new() -> Self {
        Self {
            storage: DashMap::new(),
        }
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }
}

#[async_trait]
impl ReadRepository for InMemoryRepository {
    async fn get(&self, code: &ShortCode) -> Result<Option<UrlRecord>> {
        Ok(self
            .storage
            .get(code.as_str())
            .map(|entry| entry.value().clone()))
    }

    async fn exists(&self, code: &ShortCode) -> Result<bool> {
        Ok(self.storage.contains_key(code.as_str()))
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn insert(&self, code: &ShortCode, record: UrlRecord) -> Result<()> {
        match self.storage.entry(code.as_str().to_owned()) {
            Entry::Occupied(_) => Err(StorageError::Conflict(code.to_string())),
            Entry::Vacant(slot) => {
                slot.insert(record);
                Ok(())
            }
        }
    }

    async fn update(&self, code: &ShortCode, record: UrlRecord) -> Result<bool> {
        match self.storage.get_mut(code.as_str()) {
            Some(mut entry) => {
                *entry = record;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, code: &ShortCode) -> Result<bool> {
        Ok(self.storage.remove(code.as_str()).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn code(s: &str) -> ShortCode {
        ShortCode::new_unchecked(s)
    }

    #[tokio::test]
    async fn save_and_get() {
        let repo = InMemoryRepository::new();

        repo.insert(&code("abc12"), UrlRecord::new("https://example.com"))
            .await
            .unwrap();

        let result = repo.get(&code("abc12")).await.unwrap().unwrap();
        assert_eq!(result.original_url, "https://example.com");
        assert_eq!(result.updated_at, None);
    }

    #[tokio::test]
    async fn get_nonexistent() {
        let repo = InMemoryRepository::new();

        let result = repo.get(&code("nope")).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn insert_conflict() {
        let repo = InMemoryRepository::new();

        repo.insert(&code("abc12"), UrlRecord::new("https://example.com"))
            .await
            .unwrap();

        let err = repo
            .insert(&code("abc12"), UrlRecord::new("https://other.com"))
            .await
            .unwrap_err();

        assert!(matches!(err, StorageError::Conflict(_)));
        let kept = repo.get(&code("abc12")).await.unwrap().unwrap();
        assert_eq!(kept.original_url, "https://example.com");
    }

    #[tokio::test]
    async fn update_existing() {
        let repo = InMemoryRepository::new();
        let original = UrlRecord::new("https://old.com");
        repo.insert(&code("abc12"), original.clone()).await.unwrap();

        let updated = repo
            .update(&code("abc12"), original.with_url("https://new.com"))
            .await
            .unwrap();
        assert!(updated);

        let result = repo.get(&code("abc12")).await.unwrap().unwrap();
        assert_eq!(result.original_url, "https://new.com");
        assert!(result.updated_at.is_some());
    }

    #[tokio::test]
    async fn update_missing_is_a_no_op() {
        let repo = InMemoryRepository::new();

        let updated = repo
            .update(&code("nope"), UrlRecord::new("https://new.com"))
            .await
            .unwrap();

        assert!(!updated);
        assert!(repo.is_empty());
    }

    #[tokio::test]
    async fn delete_existing() {
        let repo = InMemoryRepository::new();

        repo.insert(&code("abc12"), UrlRecord::new("https://example.com"))
            .await
            .unwrap();

        assert!(repo.delete(&code("abc12")).await.unwrap());
        assert!(repo.get(&code("abc12")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_nonexistent() {
        let repo = InMemoryRepository::new();

        assert!(!repo.delete(&code("nope")).await.unwrap());
    }

    #[tokio::test]
    async fn exists_checks() {
        let repo = InMemoryRepository::new();

        assert!(!repo.exists(&code("abc12")).await.unwrap());

        repo.insert(&code("abc12"), UrlRecord::new("https://example.com"))
            .await
            .unwrap();

        assert!(repo.exists(&code("abc12")).await.unwrap());
    }

    #[tokio::test]
    async fn concurrent_inserts_of_one_code_admit_exactly_one() {
        let repo = Arc::new(InMemoryRepository::new());
        let mut handles = vec![];

        for i in 0..16u64 {
            let repo = Arc::clone(&repo);
            handles.push(tokio::spawn(async move {
                repo.insert(
                    &code("same"),
                    UrlRecord::new(format!("https://example{}.com", i)),
                )
                .await
                .is_ok()
            }));
        }

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap() {
                winners += 1;
            }
        }

        assert_eq!(winners, 1);
        assert_eq!(repo.len(), 1);
    }
}

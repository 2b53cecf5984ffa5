use async_trait::async_trait;
use burrow_core::repository::{ClickRepository, MappingRepository, ReadMappingRepository, Result};
use burrow_core::{
    ClickEvent, ClickId, Mapping, MappingId, NewMapping, OwnerId, ShortCode, StorageError,
    TimeRange,
};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use jiff::Timestamp;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// A mapping row together with the click events that reference it.
#[derive(Debug)]
struct StoredMapping {
    mapping: Mapping,
    clicks: Vec<ClickEvent>,
}

#[derive(Debug, Default)]
struct Tables {
    mappings: DashMap<MappingId, StoredMapping>,
    /// Unique index on the short code.
    codes: DashMap<ShortCode, MappingId>,
    next_mapping_id: AtomicU64,
    next_click_id: AtomicU64,
}

/// In-memory implementation of the mapping and click repositories using DashMap.
///
/// Clones share the same tables. Code uniqueness is enforced through the
/// `codes` index entry API, so two concurrent inserts of the same code can
/// never both succeed. Click events live inside their mapping's entry and
/// are appended under the same shard lock that bumps the counter.
///
/// Lock order is `codes` then `mappings`; no path acquires them the other way.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<Tables>,
}

impl InMemoryStore {
    /// Creates a new, empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReadMappingRepository for InMemoryStore {
    async fn find_by_code(&self, code: &ShortCode) -> Result<Option<Mapping>> {
        let Some(id) = self.tables.codes.get(code).map(|id| *id) else {
            return Ok(None);
        };

        Ok(self
            .tables
            .mappings
            .get(&id)
            .map(|stored| stored.mapping.clone()))
    }

    async fn find_by_id(&self, id: MappingId) -> Result<Option<Mapping>> {
        Ok(self
            .tables
            .mappings
            .get(&id)
            .map(|stored| stored.mapping.clone()))
    }

    async fn list_by_owner(&self, owner: &OwnerId) -> Result<Vec<Mapping>> {
        Ok(self
            .tables
            .mappings
            .iter()
            .filter(|stored| stored.mapping.owner == *owner)
            .map(|stored| stored.mapping.clone())
            .collect())
    }
}

#[async_trait]
impl MappingRepository for InMemoryStore {
    async fn insert(&self, mapping: NewMapping) -> Result<Mapping> {
        match self.tables.codes.entry(mapping.code.clone()) {
            Entry::Occupied(_) => Err(StorageError::Conflict(mapping.code.to_string())),
            Entry::Vacant(slot) => {
                let id = MappingId::new(self.tables.next_mapping_id.fetch_add(1, Ordering::SeqCst) + 1);
                let mapping = mapping.into_mapping(id);

                // The row becomes visible before its code does, so a lookup
                // that finds the code always finds the row.
                self.tables.mappings.insert(
                    id,
                    StoredMapping {
                        mapping: mapping.clone(),
                        clicks: Vec::new(),
                    },
                );
                slot.insert(id);

                Ok(mapping)
            }
        }
    }

    async fn increment_click_count(&self, id: MappingId) -> Result<()> {
        let Some(mut stored) = self.tables.mappings.get_mut(&id) else {
            return Err(StorageError::NotFound(format!("mapping {id}")));
        };
        stored.mapping.click_count += 1;
        Ok(())
    }

    async fn delete(&self, id: MappingId) -> Result<bool> {
        let Some((_, stored)) = self.tables.mappings.remove(&id) else {
            return Ok(false);
        };
        self.tables
            .codes
            .remove_if(&stored.mapping.code, |_, mapped| *mapped == id);
        Ok(true)
    }
}

#[async_trait]
impl ClickRepository for InMemoryStore {
    async fn insert_click(
        &self,
        mapping_id: MappingId,
        clicked_at: Timestamp,
    ) -> Result<ClickEvent> {
        let Some(mut stored) = self.tables.mappings.get_mut(&mapping_id) else {
            return Err(StorageError::UnknownMapping(mapping_id));
        };

        let event = ClickEvent {
            id: ClickId::new(self.tables.next_click_id.fetch_add(1, Ordering::SeqCst) + 1),
            mapping_id,
            clicked_at,
        };
        stored.mapping.click_count += 1;
        stored.clicks.push(event);

        Ok(event)
    }

    async fn click_times(&self, mapping_id: MappingId, range: TimeRange) -> Result<Vec<Timestamp>> {
        Ok(self
            .tables
            .mappings
            .get(&mapping_id)
            .map(|stored| {
                stored
                    .clicks
                    .iter()
                    .map(|click| click.clicked_at)
                    .filter(|at| range.contains(*at))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn owner_click_times(
        &self,
        owner: &OwnerId,
        range: TimeRange,
    ) -> Result<Vec<Timestamp>> {
        Ok(self
            .tables
            .mappings
            .iter()
            .filter(|stored| stored.mapping.owner == *owner)
            .flat_map(|stored| {
                stored
                    .clicks
                    .iter()
                    .map(|click| click.clicked_at)
                    .filter(|at| range.contains(*at))
                    .collect::<Vec<_>>()
            })
            .collect())
    }

    async fn count_clicks(&self, mapping_id: MappingId) -> Result<u64> {
        Ok(self
            .tables
            .mappings
            .get(&mapping_id)
            .map(|stored| stored.clicks.len() as u64)
            .unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::SignedDuration;
    use std::collections::HashSet;

    fn code(s: &str) -> ShortCode {
        ShortCode::new_unchecked(s)
    }

    fn owner(s: &str) -> OwnerId {
        OwnerId::new(s).unwrap()
    }

    fn new_mapping(c: &str, url: &str, o: &str) -> NewMapping {
        NewMapping {
            code: code(c),
            original_url: url.to_string(),
            owner: owner(o),
            created_at: Timestamp::now(),
        }
    }

    fn ts(s: &str) -> Timestamp {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn insert_and_find() {
        let store = InMemoryStore::new();

        let stored = store
            .insert(new_mapping("abc12345", "https://example.com", "alice"))
            .await
            .unwrap();
        assert_eq!(stored.click_count, 0);

        let by_code = store.find_by_code(&code("abc12345")).await.unwrap().unwrap();
        assert_eq!(by_code, stored);

        let by_id = store.find_by_id(stored.id).await.unwrap().unwrap();
        assert_eq!(by_id.original_url, "https://example.com");
    }

    #[tokio::test]
    async fn find_nonexistent() {
        let store = InMemoryStore::new();

        assert!(store.find_by_code(&code("nope1234")).await.unwrap().is_none());
        assert!(store.find_by_id(MappingId::new(9)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn insert_conflict_leaves_original_untouched() {
        let store = InMemoryStore::new();

        store
            .insert(new_mapping("abc12345", "https://example.com", "alice"))
            .await
            .unwrap();

        let err = store
            .insert(new_mapping("abc12345", "https://other.com", "bob"))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Conflict(_)));

        let kept = store.find_by_code(&code("abc12345")).await.unwrap().unwrap();
        assert_eq!(kept.original_url, "https://example.com");
        assert!(store.list_by_owner(&owner("bob")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn short_codes_are_case_sensitive() {
        let store = InMemoryStore::new();

        store
            .insert(new_mapping("abcdefgh", "https://lower.example", "alice"))
            .await
            .unwrap();
        store
            .insert(new_mapping("ABCDEFGH", "https://upper.example", "alice"))
            .await
            .unwrap();

        assert_eq!(store.list_by_owner(&owner("alice")).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn list_by_owner_filters() {
        let store = InMemoryStore::new();

        store
            .insert(new_mapping("aaaaaaa1", "https://a.example", "alice"))
            .await
            .unwrap();
        store
            .insert(new_mapping("aaaaaaa2", "https://b.example", "alice"))
            .await
            .unwrap();
        store
            .insert(new_mapping("bbbbbbb1", "https://c.example", "bob"))
            .await
            .unwrap();

        let mut codes: Vec<_> = store
            .list_by_owner(&owner("alice"))
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.code.to_string())
            .collect();
        codes.sort();
        assert_eq!(codes, vec!["aaaaaaa1", "aaaaaaa2"]);
        assert!(store.list_by_owner(&owner("carol")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_removes_mapping_and_frees_code() {
        let store = InMemoryStore::new();

        let first = store
            .insert(new_mapping("abc12345", "https://example.com", "alice"))
            .await
            .unwrap();
        store
            .insert(new_mapping("keep1234", "https://keep.example", "alice"))
            .await
            .unwrap();
        store.insert_click(first.id, Timestamp::now()).await.unwrap();

        assert!(store.delete(first.id).await.unwrap());
        assert!(!store.delete(first.id).await.unwrap());
        assert!(store.find_by_code(&code("abc12345")).await.unwrap().is_none());
        assert_eq!(store.count_clicks(first.id).await.unwrap(), 0);
        assert!(store.find_by_code(&code("keep1234")).await.unwrap().is_some());

        let reused = store
            .insert(new_mapping("abc12345", "https://new.example", "bob"))
            .await
            .unwrap();
        assert_ne!(reused.id, first.id);
    }

    #[tokio::test]
    async fn increment_click_count() {
        let store = InMemoryStore::new();
        let stored = store
            .insert(new_mapping("abc12345", "https://example.com", "alice"))
            .await
            .unwrap();

        store.increment_click_count(stored.id).await.unwrap();
        store.increment_click_count(stored.id).await.unwrap();

        let got = store.find_by_id(stored.id).await.unwrap().unwrap();
        assert_eq!(got.click_count, 2);

        let err = store
            .increment_click_count(MappingId::new(999))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }

    #[tokio::test]
    async fn insert_click_bumps_counter_and_appends_event() {
        let store = InMemoryStore::new();
        let stored = store
            .insert(new_mapping("abc12345", "https://example.com", "alice"))
            .await
            .unwrap();

        let first = store.insert_click(stored.id, Timestamp::now()).await.unwrap();
        let second = store.insert_click(stored.id, Timestamp::now()).await.unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(first.mapping_id, stored.id);
        assert_eq!(store.count_clicks(stored.id).await.unwrap(), 2);
        assert_eq!(
            store.find_by_id(stored.id).await.unwrap().unwrap().click_count,
            2
        );
    }

    #[tokio::test]
    async fn insert_click_for_unknown_mapping_fails() {
        let store = InMemoryStore::new();

        let err = store
            .insert_click(MappingId::new(42), Timestamp::now())
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::UnknownMapping(id) if id == MappingId::new(42)));
    }

    #[tokio::test]
    async fn click_times_respects_half_open_range() {
        let store = InMemoryStore::new();
        let stored = store
            .insert(new_mapping("abc12345", "https://example.com", "alice"))
            .await
            .unwrap();

        for at in [
            "2024-04-30T23:59:59Z",
            "2024-05-01T00:00:00Z",
            "2024-05-01T12:00:00Z",
            "2024-05-02T00:00:00Z",
        ] {
            store.insert_click(stored.id, ts(at)).await.unwrap();
        }

        let range = TimeRange::new(ts("2024-05-01T00:00:00Z"), ts("2024-05-02T00:00:00Z")).unwrap();
        let mut times = store.click_times(stored.id, range).await.unwrap();
        times.sort();
        assert_eq!(
            times,
            vec![ts("2024-05-01T00:00:00Z"), ts("2024-05-01T12:00:00Z")]
        );
    }

    #[tokio::test]
    async fn owner_click_times_unions_owned_mappings_only() {
        let store = InMemoryStore::new();
        let a = store
            .insert(new_mapping("aaaaaaa1", "https://a.example", "alice"))
            .await
            .unwrap();
        let b = store
            .insert(new_mapping("aaaaaaa2", "https://b.example", "alice"))
            .await
            .unwrap();
        let other = store
            .insert(new_mapping("bbbbbbb1", "https://c.example", "bob"))
            .await
            .unwrap();

        let at = ts("2024-05-01T10:00:00Z");
        store.insert_click(a.id, at).await.unwrap();
        store.insert_click(b.id, at).await.unwrap();
        store
            .insert_click(b.id, at + SignedDuration::from_hours(1))
            .await
            .unwrap();
        store.insert_click(other.id, at).await.unwrap();

        let range = TimeRange::new(ts("2024-05-01T00:00:00Z"), ts("2024-05-02T00:00:00Z")).unwrap();
        let times = store.owner_click_times(&owner("alice"), range).await.unwrap();
        assert_eq!(times.len(), 3);
    }

    #[tokio::test]
    async fn owner_matching_is_exact() {
        let store = InMemoryStore::new();
        let m = store
            .insert(new_mapping("aaaaaaa1", "https://a.example", "alice"))
            .await
            .unwrap();
        store
            .insert_click(m.id, ts("2024-05-01T10:00:00Z"))
            .await
            .unwrap();
        let range = TimeRange::new(ts("2024-05-01T00:00:00Z"), ts("2024-05-02T00:00:00Z")).unwrap();

        for lookalike in ["ALICE", "Alice", "alicé", "alice "] {
            assert!(store.list_by_owner(&owner(lookalike)).await.unwrap().is_empty());
            assert!(store
                .owner_click_times(&owner(lookalike), range)
                .await
                .unwrap()
                .is_empty());
        }
        assert_eq!(store.list_by_owner(&owner("alice")).await.unwrap().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_inserts_of_same_code_have_one_winner() {
        let store = InMemoryStore::new();
        let mut handles = vec![];

        for i in 0..64 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .insert(new_mapping("samecode", &format!("https://{i}.example"), "alice"))
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
        assert_eq!(store.list_by_owner(&owner("alice")).await.unwrap().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_clicks_converge() {
        let store = InMemoryStore::new();
        let stored = store
            .insert(new_mapping("abc12345", "https://example.com", "alice"))
            .await
            .unwrap();

        let mut handles = vec![];
        for _ in 0..200 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.insert_click(stored.id, Timestamp::now()).await.unwrap().id
            }));
        }

        let mut ids = HashSet::new();
        for handle in handles {
            ids.insert(handle.await.unwrap());
        }

        assert_eq!(ids.len(), 200);
        assert_eq!(store.count_clicks(stored.id).await.unwrap(), 200);
        assert_eq!(
            store.find_by_id(stored.id).await.unwrap().unwrap().click_count,
            200
        );
    }
}

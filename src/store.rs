use std::{
    collections::BTreeMap,
    sync::{Mutex, MutexGuard},
};

use anyhow::anyhow;
use time::OffsetDateTime;

use crate::types::{Activity, ActivityKind};

pub const DEFAULT_LIST_LIMIT: usize = 10;

/// Record keeper for QR operations.
///
/// Implementations hand out copies; nothing outside the store can mutate a
/// recorded [`Activity`]. Callers validate `url` before calling [`add`].
///
/// [`add`]: ActivityStore::add
pub trait ActivityStore: Send + Sync {
    /// Records an activity, assigning the next id and the creation time.
    fn add(&self, url: &str, kind: ActivityKind) -> anyhow::Result<Activity>;

    /// Most recent `limit` activities, newest first. A limit of 0 yields nothing.
    fn list(&self, limit: usize) -> anyhow::Result<Vec<Activity>>;

    /// Drops every activity. Ids keep counting from where they were.
    fn clear(&self) -> anyhow::Result<()>;
}

struct Inner {
    activities: BTreeMap<u64, Activity>,
    next_id: u64,
    last_created_at: Option<OffsetDateTime>,
}

pub struct MemStorage {
    inner: Mutex<Inner>,
}

impl MemStorage {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                activities: BTreeMap::new(),
                next_id: 1,
                last_created_at: None,
            }),
        }
    }

    fn lock(&self) -> anyhow::Result<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| anyhow!("activity store lock poisoned"))
    }
}

impl Default for MemStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl ActivityStore for MemStorage {
    fn add(&self, url: &str, kind: ActivityKind) -> anyhow::Result<Activity> {
        let mut inner = self.lock()?;

        let id = inner.next_id;
        inner.next_id += 1;

        // Wall clock can step backwards, createdAt must not.
        let now = OffsetDateTime::now_utc();
        let created_at = match inner.last_created_at {
            Some(last) if last > now => last,
            _ => now,
        };
        inner.last_created_at = Some(created_at);

        let activity = Activity {
            id,
            url: url.to_owned(),
            kind,
            created_at,
        };
        inner.activities.insert(id, activity.clone());

        Ok(activity)
    }

    fn list(&self, limit: usize) -> anyhow::Result<Vec<Activity>> {
        let inner = self.lock()?;

        // Ids grow with createdAt, so id order is (createdAt, id) order.
        Ok(inner
            .activities
            .values()
            .rev()
            .take(limit)
            .cloned()
            .collect())
    }

    fn clear(&self) -> anyhow::Result<()> {
        self.lock()?.activities.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashSet, sync::Arc, thread};

    use super::*;

    fn ids(activities: &[Activity]) -> Vec<u64> {
        activities.iter().map(|a| a.id).collect()
    }

    #[test]
    fn test_add_assigns_sequential_ids() {
        let store = MemStorage::new();

        let first = store.add("https://a.example", ActivityKind::Generate).unwrap();
        let second = store.add("https://b.example", ActivityKind::Decode).unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(first.url, "https://a.example");
        assert_eq!(second.kind, ActivityKind::Decode);
        assert!(second.created_at >= first.created_at);
    }

    #[test]
    fn test_list_newest_first() {
        let store = MemStorage::new();
        for i in 0..5 {
            store
                .add(&format!("https://{i}.example"), ActivityKind::Generate)
                .unwrap();
        }

        let all = store.list(5).unwrap();
        assert_eq!(ids(&all), vec![5, 4, 3, 2, 1]);

        let recent = store.list(2).unwrap();
        assert_eq!(ids(&recent), vec![5, 4]);
        assert_eq!(recent[0].url, "https://4.example");
    }

    #[test]
    fn test_list_created_at_non_increasing() {
        let store = MemStorage::new();
        for _ in 0..20 {
            store.add("https://x.example", ActivityKind::Decode).unwrap();
        }

        let all = store.list(20).unwrap();
        assert!(all.windows(2).all(|w| w[0].created_at >= w[1].created_at));
    }

    #[test]
    fn test_list_limit_larger_than_store() {
        let store = MemStorage::new();
        store.add("https://a.example", ActivityKind::Generate).unwrap();
        store.add("https://b.example", ActivityKind::Generate).unwrap();

        assert_eq!(store.list(DEFAULT_LIST_LIMIT).unwrap().len(), 2);
    }

    #[test]
    fn test_list_zero_limit_is_empty() {
        let store = MemStorage::new();
        store.add("https://a.example", ActivityKind::Generate).unwrap();

        assert!(store.list(0).unwrap().is_empty());
    }

    #[test]
    fn test_list_empty_store() {
        let store = MemStorage::new();
        assert!(store.list(DEFAULT_LIST_LIMIT).unwrap().is_empty());
    }

    #[test]
    fn test_clear_keeps_counter() {
        let store = MemStorage::new();
        store.add("https://a.example", ActivityKind::Generate).unwrap();
        store.add("https://b.example", ActivityKind::Generate).unwrap();

        store.clear().unwrap();
        assert!(store.list(DEFAULT_LIST_LIMIT).unwrap().is_empty());

        let next = store.add("https://c.example", ActivityKind::Decode).unwrap();
        assert_eq!(next.id, 3);
        assert_eq!(ids(&store.list(DEFAULT_LIST_LIMIT).unwrap()), vec![3]);
    }

    #[test]
    fn test_clear_empty_store() {
        let store = MemStorage::new();
        store.clear().unwrap();
        store.clear().unwrap();

        let first = store.add("https://a.example", ActivityKind::Generate).unwrap();
        assert_eq!(first.id, 1);
    }

    #[test]
    fn test_list_returns_copies() {
        let store = MemStorage::new();
        store.add("https://a.example", ActivityKind::Generate).unwrap();

        let mut listed = store.list(1).unwrap();
        listed[0].url = "changed".into();

        assert_eq!(store.list(1).unwrap()[0].url, "https://a.example");
    }

    #[test]
    fn test_concurrent_adds_get_distinct_ids() {
        let store = Arc::new(MemStorage::new());

        let issued: Vec<u64> = thread::scope(|s| {
            let handles: Vec<_> = (0..100)
                .map(|i| {
                    let store = Arc::clone(&store);
                    s.spawn(move || {
                        store
                            .add(&format!("https://{i}.example"), ActivityKind::Generate)
                            .unwrap()
                            .id
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let unique: HashSet<u64> = issued.iter().copied().collect();
        assert_eq!(unique.len(), 100);

        let listed = store.list(100).unwrap();
        assert_eq!(listed.len(), 100);
        assert_eq!(listed[0].id, 100);
        assert_eq!(listed[99].id, 1);
    }
}

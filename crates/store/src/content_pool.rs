//! Content pool: the categorised external corpus agents may consult.
//!
//! Storage location: `<data>/world/content.jsonl`
//!
//! Same write-then-index discipline as the artifact log. A category index
//! (category → entry positions) is maintained in lockstep with insertion.

use copresence_core::content::{ContentCategory, ContentEntry};
use copresence_core::error::StoreError;
use rand::Rng;
use rand::seq::IndexedRandom;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::jsonl;

pub struct ContentPool {
    path: PathBuf,
    entries: Vec<ContentEntry>,
    by_id: HashMap<String, usize>,
    by_category: HashMap<ContentCategory, Vec<usize>>,
}

impl ContentPool {
    /// Open the pool at `path`, replaying any existing entries.
    ///
    /// A replayed id seen twice keeps its first occurrence.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        jsonl::ensure_parent(&path)?;
        let replayed: Vec<ContentEntry> = jsonl::replay(&path)?;

        let mut pool = Self {
            path,
            entries: Vec::with_capacity(replayed.len()),
            by_id: HashMap::new(),
            by_category: HashMap::new(),
        };
        for entry in replayed {
            if pool.by_id.contains_key(&entry.id) {
                warn!(id = %entry.id, "Duplicate content id in pool file, keeping first");
                continue;
            }
            pool.index(entry);
        }

        info!(path = %pool.path.display(), count = pool.entries.len(), "Content pool loaded");
        Ok(pool)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn index(&mut self, entry: ContentEntry) {
        let pos = self.entries.len();
        self.by_id.insert(entry.id.clone(), pos);
        self.by_category.entry(entry.category).or_default().push(pos);
        self.entries.push(entry);
    }

    /// Add an entry. Ids are unique; a repeated id is rejected.
    pub fn add(&mut self, entry: ContentEntry) -> Result<(), StoreError> {
        if self.by_id.contains_key(&entry.id) {
            return Err(StoreError::DuplicateId(entry.id));
        }
        jsonl::append(&self.path, &entry)?;
        debug!(id = %entry.id, category = %entry.category, "Content added");
        self.index(entry);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&ContentEntry> {
        self.by_id.get(id).map(|&pos| &self.entries[pos])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn count_in(&self, category: ContentCategory) -> usize {
        self.by_category.get(&category).map_or(0, Vec::len)
    }

    /// Entry counts for every category, in enumeration order.
    pub fn category_counts(&self) -> Vec<(ContentCategory, usize)> {
        ContentCategory::ALL
            .iter()
            .map(|&c| (c, self.count_in(c)))
            .collect()
    }

    fn candidates(&self, category: Option<ContentCategory>) -> Vec<usize> {
        match category {
            Some(c) => self.by_category.get(&c).cloned().unwrap_or_default(),
            None => (0..self.entries.len()).collect(),
        }
    }

    /// Case-insensitive substring search over title and body.
    ///
    /// Scans in insertion order and stops after `limit` matches.
    pub fn search(&self, text: &str, category: Option<ContentCategory>, limit: usize) -> Vec<&ContentEntry> {
        let needle = text.to_lowercase();
        self.candidates(category)
            .into_iter()
            .map(|pos| &self.entries[pos])
            .filter(|e| e.matches(&needle))
            .take(limit)
            .collect()
    }

    pub fn sample(&self, category: Option<ContentCategory>, n: usize) -> Vec<&ContentEntry> {
        self.sample_with(category, n, &mut rand::rng())
    }

    /// Uniform sample without replacement of `min(n, available)` entries.
    pub fn sample_with<R: Rng + ?Sized>(
        &self,
        category: Option<ContentCategory>,
        n: usize,
        rng: &mut R,
    ) -> Vec<&ContentEntry> {
        let candidates = self.candidates(category);
        candidates
            .choose_multiple(rng, n)
            .map(|&pos| &self.entries[pos])
            .collect()
    }

    /// The least-populated category that holds at least one entry.
    ///
    /// Ties go to the category declared first (text, code, data).
    pub fn rarest_category(&self) -> Option<ContentCategory> {
        self.category_counts()
            .into_iter()
            .filter(|&(_, n)| n > 0)
            .min_by_key(|&(_, n)| n)
            .map(|(c, _)| c)
    }

    pub fn rarest_category_sample(&self) -> Option<&ContentEntry> {
        self.rarest_category_sample_with(&mut rand::rng())
    }

    /// One uniformly random entry from the rarest category, if any.
    pub fn rarest_category_sample_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&ContentEntry> {
        let category = self.rarest_category()?;
        self.sample_with(Some(category), 1, rng).into_iter().next()
    }

    /// Every entry in insertion order.
    pub fn all(&self) -> &[ContentEntry] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    fn temp_pool() -> (tempfile::TempDir, ContentPool) {
        let dir = tempfile::tempdir().unwrap();
        let pool = ContentPool::open(dir.path().join("world").join("content.jsonl")).unwrap();
        (dir, pool)
    }

    fn entry(id: &str, category: ContentCategory, body: &str) -> ContentEntry {
        ContentEntry::new(id, category, format!("Title {id}"), body)
    }

    #[test]
    fn add_persists_and_indexes() {
        let (_dir, mut pool) = temp_pool();
        pool.add(entry("t1", ContentCategory::Text, "observation")).unwrap();
        pool.add(entry("c1", ContentCategory::Code, "fn main() {}")).unwrap();

        assert_eq!(pool.count(), 2);
        assert_eq!(pool.count_in(ContentCategory::Code), 1);
        assert_eq!(pool.count_in(ContentCategory::Data), 0);

        let reopened = ContentPool::open(pool.path()).unwrap();
        assert_eq!(reopened.all(), pool.all());
        assert!(reopened.get("c1").is_some());
    }

    #[test]
    fn duplicate_id_rejected_without_write() {
        let (_dir, mut pool) = temp_pool();
        pool.add(entry("t1", ContentCategory::Text, "a")).unwrap();
        let err = pool.add(entry("t1", ContentCategory::Code, "b")).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateId(id) if id == "t1"));

        let on_disk = std::fs::read_to_string(pool.path()).unwrap();
        assert_eq!(on_disk.lines().count(), 1);
    }

    #[test]
    fn search_is_case_insensitive_ordered_and_limited() {
        let (_dir, mut pool) = temp_pool();
        pool.add(entry("t1", ContentCategory::Text, "The LOOP returns")).unwrap();
        pool.add(entry("c1", ContentCategory::Code, "loop {}")).unwrap();
        pool.add(entry("t2", ContentCategory::Text, "nothing here")).unwrap();
        pool.add(entry("t3", ContentCategory::Text, "a strange loop")).unwrap();

        let ids: Vec<_> = pool.search("loop", None, 10).iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["t1", "c1", "t3"]);

        let ids: Vec<_> = pool.search("loop", None, 2).iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["t1", "c1"]);

        let ids: Vec<_> = pool
            .search("loop", Some(ContentCategory::Text), 10)
            .iter()
            .map(|e| e.id.as_str())
            .collect();
        assert_eq!(ids, vec!["t1", "t3"]);

        // Title matches count too
        assert_eq!(pool.search("title t2", None, 5).len(), 1);
    }

    #[test]
    fn sample_is_without_replacement_and_capped() {
        let (_dir, mut pool) = temp_pool();
        for i in 0..5 {
            pool.add(entry(&format!("t{i}"), ContentCategory::Text, "x")).unwrap();
        }
        pool.add(entry("d0", ContentCategory::Data, "1,2")).unwrap();
        let mut rng = StdRng::seed_from_u64(1);

        let picked = pool.sample_with(None, 4, &mut rng);
        let ids: HashSet<_> = picked.iter().map(|e| e.id.clone()).collect();
        assert_eq!(ids.len(), 4);

        assert_eq!(pool.sample_with(None, 100, &mut rng).len(), 6);
        let data = pool.sample_with(Some(ContentCategory::Data), 3, &mut rng);
        assert_eq!(data.len(), 1);
        assert_eq!(data[0].id, "d0");
        assert!(pool.sample_with(Some(ContentCategory::Code), 3, &mut rng).is_empty());
    }

    #[test]
    fn rarest_category_ignores_empty_and_breaks_ties_by_declaration_order() {
        let (_dir, mut pool) = temp_pool();
        assert_eq!(pool.rarest_category(), None);
        assert!(pool.rarest_category_sample().is_none());

        pool.add(entry("t1", ContentCategory::Text, "a")).unwrap();
        pool.add(entry("t2", ContentCategory::Text, "b")).unwrap();
        pool.add(entry("d1", ContentCategory::Data, "c")).unwrap();
        assert_eq!(pool.rarest_category(), Some(ContentCategory::Data));

        pool.add(entry("c1", ContentCategory::Code, "d")).unwrap();
        // code and data tie at one entry; code is declared first
        assert_eq!(pool.rarest_category(), Some(ContentCategory::Code));

        let mut rng = StdRng::seed_from_u64(3);
        let sample = pool.rarest_category_sample_with(&mut rng).unwrap();
        assert_eq!(sample.id, "c1");
    }

    #[test]
    fn category_counts_in_enumeration_order() {
        let (_dir, mut pool) = temp_pool();
        pool.add(entry("d1", ContentCategory::Data, "c")).unwrap();
        assert_eq!(
            pool.category_counts(),
            vec![
                (ContentCategory::Text, 0),
                (ContentCategory::Code, 0),
                (ContentCategory::Data, 1)
            ]
        );
    }
}

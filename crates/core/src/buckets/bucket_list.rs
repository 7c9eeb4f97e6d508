//! Ordered bucket container with identity lookup.

use std::borrow::Cow;
use std::collections::HashMap;

use super::bucket_model::{Bucket, BucketId, BucketKind};
use crate::history::Window;

#[derive(Debug, Clone, Default)]
pub struct BucketList {
    buckets: Vec<Bucket>,
    index: HashMap<BucketId, usize>,
}

impl BucketList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a bucket, replacing any bucket with the same identity in place.
    pub fn insert(&mut self, bucket: Bucket) {
        match self.index.get(bucket.id()) {
            Some(&i) => self.buckets[i] = bucket,
            None => {
                self.index.insert(bucket.id().clone(), self.buckets.len());
                self.buckets.push(bucket);
            }
        }
    }

    pub fn contains(&self, id: &BucketId) -> bool {
        self.index.contains_key(id)
    }

    pub fn get(&self, id: &BucketId) -> Option<&Bucket> {
        self.index.get(id).map(|i| &self.buckets[*i])
    }

    pub fn get_mut(&mut self, id: &BucketId) -> Option<&mut Bucket> {
        match self.index.get(id) {
            Some(&i) => self.buckets.get_mut(i),
            None => None,
        }
    }

    /// The registered bucket, or a fresh orphan that is not added to the list.
    pub fn get_or_orphan(
        &self,
        id: &BucketId,
        kind: BucketKind,
        currency: &str,
    ) -> Cow<'_, Bucket> {
        match self.get(id) {
            Some(bucket) => Cow::Borrowed(bucket),
            None => Cow::Owned(Bucket::orphan(id.clone(), kind, currency)),
        }
    }

    /// The registered bucket, inserting the one built by `create` when absent.
    /// `create` must build a bucket with identity `id`.
    pub fn ensure(&mut self, id: &BucketId, create: impl FnOnce() -> Bucket) -> &mut Bucket {
        let i = match self.index.get(id) {
            Some(&i) => i,
            None => {
                let i = self.buckets.len();
                self.index.insert(id.clone(), i);
                self.buckets.push(create());
                i
            }
        };
        &mut self.buckets[i]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Bucket> {
        self.buckets.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Bucket> {
        self.buckets.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Every bucket reconstructed for `window`, in the same order.
    pub fn windowed(&self, window: &Window) -> BucketList {
        self.buckets.iter().map(|b| b.windowed(window)).collect()
    }

    /// Orders by sort tag, then name. Untagged buckets come last.
    pub fn sort_by_tag(&mut self) {
        self.buckets.sort_by(|a, b| {
            (a.sort_tag().is_none(), a.sort_tag(), a.name())
                .cmp(&(b.sort_tag().is_none(), b.sort_tag(), b.name()))
        });
        self.reindex();
    }

    fn reindex(&mut self) {
        self.index = self
            .buckets
            .iter()
            .enumerate()
            .map(|(i, b)| (b.id().clone(), i))
            .collect();
    }
}

impl FromIterator<Bucket> for BucketList {
    fn from_iter<I: IntoIterator<Item = Bucket>>(iter: I) -> Self {
        let mut list = BucketList::new();
        for bucket in iter {
            list.insert(bucket);
        }
        list
    }
}

impl<'a> IntoIterator for &'a BucketList {
    type Item = &'a Bucket;
    type IntoIter = std::slice::Iter<'a, Bucket>;

    fn into_iter(self) -> Self::IntoIter {
        self.buckets.iter()
    }
}

//! The ordered collection of images waiting to become pages.

use serde::Serialize;

/// An encoded image waiting in the queue.
///
/// `bytes` is a complete, self-describing image file (JPEG, PNG, …);
/// `width`/`height` were learned when it was decoded at capture or import
/// time and are informational only: the assembler decodes again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingImage {
    pub id: u64,
    pub label: String,
    pub width: u32,
    pub height: u32,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

impl PendingImage {
    pub fn byte_len(&self) -> usize {
        self.bytes.len()
    }
}

/// Insertion-ordered, index-addressable list of [`PendingImage`]s.
///
/// Indices are always `0..len()`; removing an entry shifts every later entry
/// down by one. Duplicate images are allowed.
#[derive(Debug, Default)]
pub struct ImageQueue {
    items: Vec<PendingImage>,
    next_id: u64,
}

impl ImageQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an image, assigning it the next id. Returns the id.
    pub fn push(&mut self, label: impl Into<String>, width: u32, height: u32, bytes: Vec<u8>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.items.push(PendingImage {
            id,
            label: label.into(),
            width,
            height,
            bytes,
        });
        id
    }

    /// Remove the entry at `index`; `None` when out of range.
    pub fn remove(&mut self, index: usize) -> Option<PendingImage> {
        if index < self.items.len() {
            Some(self.items.remove(index))
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn get(&self, index: usize) -> Option<&PendingImage> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PendingImage> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[PendingImage] {
        &self.items
    }
}

impl<'a> IntoIterator for &'a ImageQueue {
    type Item = &'a PendingImage;
    type IntoIter = std::slice::Iter<'a, PendingImage>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

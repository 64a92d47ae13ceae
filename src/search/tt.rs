use cozy_chess::Move;
use crate::search::eval::MATE_BOUND;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bound {
    Exact,
    Lower,
    Upper,
}

#[derive(Clone, Copy, Debug)]
pub struct Entry {
    pub key: u64,
    pub depth: u32,
    pub score: i32,
    pub best: Option<Move>,
    pub bound: Bound,
    pub gen: u32,
}

const WAYS: usize = 4;
// Rough footprint of one slot, used for MB sizing.
const ENTRY_BYTES: usize = 32;

#[derive(Default, Clone, Copy)]
struct Bucket {
    slots: [Option<Entry>; WAYS],
}

/// Bucketed transposition table. Owned by a single searcher; no locking.
#[derive(Default)]
pub struct Tt {
    buckets: Vec<Bucket>,
    gen: u32,
}

impl Tt {
    pub fn with_capacity_mb(mb: usize) -> Self {
        let mut tt = Self::default();
        tt.set_capacity_mb(mb);
        tt
    }

    pub fn set_capacity_entries(&mut self, cap: usize) {
        let buckets = cap.max(WAYS).div_ceil(WAYS);
        self.buckets = vec![Bucket::default(); buckets];
        self.gen = 0;
    }

    pub fn set_capacity_mb(&mut self, mb: usize) {
        let entries = (mb.max(1).saturating_mul(1024 * 1024) / ENTRY_BYTES).max(WAYS);
        self.set_capacity_entries(entries);
    }

    pub fn capacity(&self) -> usize { self.buckets.len() * WAYS }

    pub fn clear(&mut self) {
        self.buckets.iter_mut().for_each(|b| *b = Bucket::default());
        self.gen = 0;
    }

    pub fn len(&self) -> usize {
        self.buckets.iter().map(|b| b.slots.iter().filter(|s| s.is_some()).count()).sum()
    }

    pub fn is_empty(&self) -> bool { self.len() == 0 }

    pub fn bump_generation(&mut self) { self.gen = self.gen.wrapping_add(1); }

    fn bucket_index(&self, key: u64) -> usize {
        let mixed = key ^ (key >> 32);
        (mixed as usize) % self.buckets.len().max(1)
    }

    pub fn get(&self, key: u64) -> Option<Entry> {
        if self.buckets.is_empty() { return None; }
        let b = &self.buckets[self.bucket_index(key)];
        b.slots.iter().flatten().find(|e| e.key == key).copied()
    }

    pub fn put(&mut self, mut e: Entry) {
        if self.buckets.is_empty() { return; }
        e.gen = self.gen;
        let gen = self.gen;
        let idx = self.bucket_index(e.key);
        let b = &mut self.buckets[idx];
        // Same key: keep the deeper result unless the stored one is stale.
        if let Some(slot) = b.slots.iter_mut().find(|s| matches!(s, Some(cur) if cur.key == e.key)) {
            let cur = slot.unwrap_or(e);
            if e.depth >= cur.depth || cur.gen != gen {
                if e.best.is_none() { e.best = cur.best; }
                *slot = Some(e);
            }
            return;
        }
        if let Some(slot) = b.slots.iter_mut().find(|s| s.is_none()) {
            *slot = Some(e);
            return;
        }
        // Evict oldest generation first, then shallowest.
        let victim = b.slots.iter().enumerate()
            .min_by_key(|(_, s)| s.map(|cur| (cur.gen == gen, cur.depth)).unwrap_or((false, 0)))
            .map(|(i, _)| i)
            .unwrap_or(0);
        b.slots[victim] = Some(e);
    }
}

/// Mate scores are stored relative to the node, not the root.
pub fn score_to_tt(score: i32, ply: i32) -> i32 {
    if score >= MATE_BOUND { score + ply } else if score <= -MATE_BOUND { score - ply } else { score }
}

pub fn score_from_tt(score: i32, ply: i32) -> i32 {
    if score >= MATE_BOUND { score - ply } else if score <= -MATE_BOUND { score + ply } else { score }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::eval::MATE_SCORE;

    fn entry(key: u64, depth: u32) -> Entry {
        Entry { key, depth, score: 0, best: None, bound: Bound::Exact, gen: 0 }
    }

    #[test]
    fn mate_scores_survive_ply_shift() {
        let at_root = MATE_SCORE - 5;
        let stored = score_to_tt(at_root - 3, 3);
        assert_eq!(stored, at_root);
        assert_eq!(score_from_tt(stored, 7), at_root - 7);
        assert_eq!(score_to_tt(42, 9), 42);
    }

    #[test]
    fn capacity_rounds_up_to_whole_buckets() {
        let mut tt = Tt::default();
        assert_eq!(tt.capacity(), 0);
        tt.put(entry(1, 1));
        assert!(tt.is_empty());
        tt.set_capacity_entries(10);
        assert_eq!(tt.capacity(), 12);
        assert_eq!(Tt::with_capacity_mb(1).capacity(), 1024 * 1024 / ENTRY_BYTES);
    }

    #[test]
    fn clear_empties_table() {
        let mut tt = Tt::default();
        tt.set_capacity_entries(16);
        tt.put(entry(1, 3));
        tt.put(entry(2, 1));
        assert_eq!(tt.len(), 2);
        tt.clear();
        assert!(tt.is_empty());
        assert!(tt.get(1).is_none());
    }

    #[test]
    fn shallower_same_generation_does_not_replace() {
        let mut tt = Tt::default();
        tt.set_capacity_entries(16);
        tt.put(entry(7, 5));
        let mut shallow = entry(7, 2);
        shallow.bound = Bound::Lower;
        tt.put(shallow);
        assert_eq!(tt.get(7).map(|e| e.depth), Some(5));
    }
}

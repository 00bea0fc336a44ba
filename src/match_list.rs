// Candidates for the noun phrase being matched
//
// Only the best word-count quality survives: offering a longer match
// throws away every shorter one, and shorter offers are ignored.

use crate::world::ObjectId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub obj: ObjectId,
    pub score: i32,
    /// Equivalence class, negative on the first member of a class of several
    pub class: i32,
    /// Already handed out by `best_guess`
    pub taken: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchList {
    entries: Vec<Candidate>,
    capacity: usize,
    /// Words matched by every current candidate
    length: usize,
    /// Word number where the phrase starts
    from: usize,
}

impl Default for MatchList {
    fn default() -> Self {
        MatchList::new(64)
    }
}

impl MatchList {
    pub fn new(capacity: usize) -> Self {
        MatchList {
            entries: Vec::new(),
            capacity,
            length: 0,
            from: 1,
        }
    }

    /// Start a fresh phrase at word `from`.
    pub fn reset(&mut self, from: usize) {
        self.entries.clear();
        self.length = 0;
        self.from = from;
    }

    /// Offer `obj` as matching `quality` words. Returns true if it was kept.
    pub fn offer(&mut self, obj: ObjectId, quality: usize) -> bool {
        if quality < self.length {
            return false;
        }
        if quality > self.length {
            self.length = quality;
            self.entries.clear();
        } else {
            if self.entries.len() >= self.capacity {
                return false;
            }
            if self.entries.iter().any(|c| c.obj == obj) {
                return false;
            }
        }
        self.entries.push(Candidate {
            obj,
            score: 0,
            class: 0,
            taken: false,
        });
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn from(&self) -> usize {
        self.from
    }

    pub fn set_from(&mut self, from: usize) {
        self.from = from;
    }

    pub fn entries(&self) -> &[Candidate] {
        &self.entries
    }

    pub fn entries_mut(&mut self) -> &mut [Candidate] {
        &mut self.entries
    }

    pub fn objects(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.entries.iter().map(|c| c.obj)
    }

    pub fn first(&self) -> Option<ObjectId> {
        self.entries.first().map(|c| c.obj)
    }

    pub fn retain<F: FnMut(&Candidate) -> bool>(&mut self, keep: F) {
        self.entries.retain(keep);
    }

    /// Hand out the highest-scoring candidate not yet taken, earliest first
    /// on ties. Candidates with negative scores are never chosen.
    pub fn best_guess(&mut self) -> Option<(ObjectId, i32)> {
        let mut best = -1;
        let mut earliest = None;
        for (i, c) in self.entries.iter().enumerate() {
            if !c.taken && c.score > best {
                best = c.score;
                earliest = Some(i);
            }
        }
        let i = earliest?;
        self.entries[i].taken = true;
        Some((self.entries[i].obj, best))
    }

    /// The candidate with a strictly higher score than all others, if any.
    pub fn single_best_guess(&self) -> Option<ObjectId> {
        let mut best = i32::MIN;
        let mut chosen = None;
        for c in &self.entries {
            if c.score == best {
                chosen = None;
            }
            if c.score > best {
                best = c.score;
                chosen = Some(c.obj);
            }
        }
        chosen
    }
}

use std::fmt::Display;
use std::fmt::Error;
use std::fmt::Formatter;

use indexmap::IndexMap;

/// Word can start a command
pub const VERB: u8 = 0x01;
/// Verb is out-of-world (score, quit, ...)
pub const META: u8 = 0x02;
/// Word names objects in the plural
pub const PLURAL: u8 = 0x04;
/// Word appears as a preposition in some grammar line
pub const PREPOSITION: u8 = 0x08;
/// Word names some object
pub const NOUN: u8 = 0x80;

/// Reference to a dictionary entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DictWord(pub u16);

#[derive(Debug, Clone)]
pub struct DictEntry {
    pub text: String,
    pub flags: u8,
    /// Index into the grammar's verb table
    pub verb: Option<usize>,
}

/// Words the parser can recognise, with their flags.
///
/// Only the first `resolution` characters of a word are significant, the
/// same truncation a Z-machine story file applies (6 in v3, 9 later).
#[derive(Debug, Clone)]
pub struct Dictionary {
    entries: IndexMap<String, DictEntry>,
    resolution: usize,
}

impl Dictionary {
    pub fn new(resolution: usize) -> Dictionary {
        Dictionary {
            entries: IndexMap::new(),
            resolution,
        }
    }

    pub fn resolution(&self) -> usize {
        self.resolution
    }

    /// Split an Inform-style dictionary word into its text and flags:
    /// `"balls//p"` is the plural word `balls`, `"a//"` is just `a`.
    pub fn split_word(word: &str) -> (&str, u8) {
        match word.find("//") {
            Some(pos) => {
                let flags = if word[pos + 2..].contains('p') { PLURAL } else { 0 };
                (&word[..pos], flags)
            }
            None => (word, 0),
        }
    }

    fn key(&self, word: &str) -> String {
        let (text, _) = Self::split_word(word);
        let lower = text.to_lowercase();
        if self.resolution == 0 {
            lower
        } else {
            lower.chars().take(self.resolution).collect()
        }
    }

    /// Add a word (or merge flags into an existing one).
    pub fn add(&mut self, word: &str, flags: u8) -> DictWord {
        let (text, extra) = Self::split_word(word);
        let key = self.key(word);
        let slot = self.entries.entry(key);
        let index = slot.index();
        let entry = slot.or_insert_with(|| DictEntry {
            text: text.to_lowercase(),
            flags: 0,
            verb: None,
        });
        entry.flags |= flags | extra;
        DictWord(index as u16)
    }

    pub fn lookup(&self, word: &str) -> Option<DictWord> {
        if word.is_empty() {
            return None;
        }
        self.entries
            .get_index_of(&self.key(word))
            .map(|i| DictWord(i as u16))
    }

    pub fn entry(&self, word: DictWord) -> Option<&DictEntry> {
        self.entries.get_index(word.0 as usize).map(|(_, e)| e)
    }

    pub fn text(&self, word: DictWord) -> &str {
        self.entry(word).map(|e| e.text.as_str()).unwrap_or("")
    }

    pub fn flags(&self, word: DictWord) -> u8 {
        self.entry(word).map(|e| e.flags).unwrap_or(0)
    }

    pub fn is_verb(&self, word: DictWord) -> bool {
        self.flags(word) & VERB != 0
    }

    pub fn is_meta(&self, word: DictWord) -> bool {
        self.flags(word) & META != 0
    }

    pub fn verb_number(&self, word: DictWord) -> Option<usize> {
        self.entry(word).and_then(|e| e.verb)
    }

    /// Mark `word` as a verb whose grammar is verb table entry `verb`.
    pub fn set_verb(&mut self, word: &str, verb: usize, meta: bool) -> DictWord {
        let flags = if meta { VERB | META } else { VERB };
        let w = self.add(word, flags);
        if let Some((_, entry)) = self.entries.get_index_mut(w.0 as usize) {
            entry.verb = Some(verb);
        }
        w
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Display for Dictionary {
    fn fmt(&self, f: &mut Formatter) -> Result<(), Error> {
        writeln!(
            f,
            "Resolution: {}, word count: {}",
            self.resolution,
            self.entries.len()
        )?;
        for (i, entry) in self.entries.values().enumerate() {
            write!(f, "{:4} '{}' flags {:#04x}", i, entry.text, entry.flags)?;
            if let Some(v) = entry.verb {
                write!(f, " verb {}", v)?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_truncates_to_resolution() {
        let mut dict = Dictionary::new(6);
        let w = dict.add("lantern", NOUN);
        assert_eq!(dict.lookup("lanter"), Some(w));
        assert_eq!(dict.lookup("lanterns"), Some(w));
        assert_eq!(dict.lookup("lamp"), None);
    }

    #[test]
    fn test_flags_merge_and_plural_suffix() {
        let mut dict = Dictionary::new(9);
        let balls = dict.add("balls//p", NOUN);
        assert_eq!(dict.add("balls", PREPOSITION), balls);
        assert_eq!(dict.flags(balls), NOUN | PLURAL | PREPOSITION);
        assert_eq!(dict.text(balls), "balls");

        let a = dict.add("a//", 0);
        assert_eq!(dict.lookup("a"), Some(a));
    }

    #[test]
    fn test_verb_entries() {
        let mut dict = Dictionary::new(9);
        let score = dict.set_verb("score", 3, true);
        assert!(dict.is_verb(score));
        assert!(dict.is_meta(score));
        assert_eq!(dict.verb_number(score), Some(3));
        let ball = dict.add("ball", NOUN);
        assert!(!dict.is_verb(ball));
        assert_eq!(dict.verb_number(ball), None);
    }
}

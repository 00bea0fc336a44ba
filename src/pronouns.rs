// Pronoun bindings ("it", "him", "her", "them")
//
// Each pronoun carries a mask of the gender/number/animation classes it can
// stand for. Noticing an object rebinds every pronoun whose mask covers the
// object's class.

use crate::dictionary::{DictWord, Dictionary};
use crate::messages::{the_name, LibraryMessages, Message};
use crate::vocabulary::Lexicon;
use crate::world::{Attribute, ObjectId, WorldModel};
use log::debug;

/// Gender/number/animation class of `obj`, 0 to 11.
///
/// 0-2 are animate singular male/female/neuter, 3-5 animate plural,
/// 6-8 inanimate singular and 9-11 inanimate plural.
pub fn gna_of(world: &dyn WorldModel, obj: ObjectId) -> u8 {
    let animate = world.has(obj, Attribute::Animate);
    let mut case = if animate { 0 } else { 6 };

    let gender = if world.has(obj, Attribute::Neuter) {
        Attribute::Neuter
    } else if world.has(obj, Attribute::Female) {
        Attribute::Female
    } else if world.has(obj, Attribute::Male) {
        Attribute::Male
    } else if animate {
        Attribute::Male
    } else {
        Attribute::Neuter
    };
    match gender {
        Attribute::Female => case += 1,
        Attribute::Neuter => case += 2,
        _ => {}
    }
    if world.has(obj, Attribute::PluralName) {
        case += 3;
    }
    case
}

/// The mask bit for GNA class `gna`.
pub fn gna_bit(gna: u8) -> u16 {
    1 << (11 - gna as u16)
}

/// What a word means as a pronoun.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PronounValue {
    NotPronoun,
    Unset,
    Bound(ObjectId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Binding {
    word: DictWord,
    gna: u16,
    value: Option<ObjectId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PronounTable {
    bindings: Vec<Binding>,
}

impl PronounTable {
    pub fn new(lexicon: &Lexicon) -> Self {
        PronounTable {
            bindings: lexicon
                .pronouns
                .iter()
                .map(|p| Binding {
                    word: p.word,
                    gna: p.gna,
                    value: None,
                })
                .collect(),
        }
    }

    /// Bind every suitable pronoun to `obj`. The player is never noticed.
    pub fn notice(&mut self, obj: ObjectId, world: &dyn WorldModel) {
        if obj == world.player() {
            return;
        }
        let bit = gna_bit(gna_of(world, obj));
        for b in self.bindings.iter_mut() {
            if b.gna & bit != 0 {
                b.value = Some(obj);
            }
        }
        debug!("pronouns noticed {}", obj);
    }

    pub fn value(&self, word: Option<DictWord>) -> PronounValue {
        let w = match word {
            Some(w) => w,
            None => return PronounValue::NotPronoun,
        };
        match self.bindings.iter().find(|b| b.word == w) {
            None => PronounValue::NotPronoun,
            Some(Binding { value: None, .. }) => PronounValue::Unset,
            Some(Binding { value: Some(o), .. }) => PronounValue::Bound(*o),
        }
    }

    /// Bind one pronoun directly. Returns false if `word` is not a pronoun.
    pub fn set(&mut self, word: DictWord, value: Option<ObjectId>) -> bool {
        match self.bindings.iter_mut().find(|b| b.word == word) {
            Some(b) => {
                b.value = value;
                true
            }
            None => false,
        }
    }

    /// Unbind every pronoun that refers to `obj`.
    pub fn forget(&mut self, obj: ObjectId) {
        for b in self.bindings.iter_mut() {
            if b.value == Some(obj) {
                b.value = None;
            }
        }
    }

    /// The first pronoun currently bound to `obj`.
    pub fn word_for(&self, obj: ObjectId) -> Option<DictWord> {
        self.bindings
            .iter()
            .find(|b| b.value == Some(obj))
            .map(|b| b.word)
    }

    /// Whether `word` is a pronoun bound to `obj`.
    pub fn refers_to(&self, word: Option<DictWord>, obj: ObjectId) -> bool {
        self.value(word) == PronounValue::Bound(obj)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// The text of the "pronouns" verb.
    pub fn describe(
        &self,
        world: &dyn WorldModel,
        dictionary: &Dictionary,
        messages: &LibraryMessages,
    ) -> String {
        let mut out = String::from(messages.text(Message::PronounsIntro));
        let count = self.bindings.len();
        if count == 0 {
            out.push_str(messages.text(Message::NoPronouns));
            return out;
        }
        for (i, b) in self.bindings.iter().enumerate() {
            out.push('"');
            out.push_str(dictionary.text(b.word));
            out.push_str("\" ");
            match b.value {
                Some(o) => {
                    out.push_str(messages.text(Message::PronounMeans));
                    out.push_str(&the_name(world, o));
                }
                None => out.push_str(messages.text(Message::PronounUnset)),
            }
            if i + 2 < count {
                out.push_str(", ");
            } else if i + 2 == count {
                out.push_str(" and ");
            }
        }
        out.push('.');
        out
    }
}

//! Descriptors: the words in front of a noun
//!
//! Articles, possessives ("my", "his"), "lit"/"unlit", "other", "all" and
//! counts ("two coins") set up an indefinite-mode specification that the
//! adjudicator uses to narrow or widen the objects chosen.

use super::Parser;
use crate::console::Console;
use crate::error::ParseErrorKind;
use crate::pronouns::PronounValue;
use crate::tokenizer::Next;
use crate::vocabulary::{DescriptorKind, Owner, ALL_GNAS};
use crate::world::{ObjectId, WorldModel};

pub(crate) const OTHER_BIT: u8 = 1;
pub(crate) const MY_BIT: u8 = 2;
pub(crate) const THAT_BIT: u8 = 4;
pub(crate) const PLURAL_BIT: u8 = 8;
pub(crate) const LIT_BIT: u8 = 16;
pub(crate) const UNLIT_BIT: u8 = 32;

/// Quantity wanted by "all"
pub(crate) const ALL_WANTED: usize = 100;

/// Whose object a possessive asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum IndefOwner {
    Object(ObjectId),
    /// The possessive's pronoun is unset, so nothing can match
    Nobody,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Indef {
    pub mode: bool,
    pub kind: u8,
    /// How many objects, `ALL_WANTED` for "all", 0 if unspecified
    pub wanted: usize,
    /// A count was read and may have been part of the name instead
    pub guess_p: bool,
    /// A descriptor was read that might also be part of the name
    pub possambig: bool,
    pub owner: Option<IndefOwner>,
    /// Gender/number classes the descriptors allow
    pub cases: u16,
    /// Word holding the count, 0 for none
    pub nspec_at: usize,
}

impl Default for Indef {
    fn default() -> Self {
        Indef {
            mode: false,
            kind: 0,
            wanted: 0,
            guess_p: false,
            possambig: false,
            owner: None,
            cases: ALL_GNAS,
            nspec_at: 0,
        }
    }
}

impl<W: WorldModel, C: Console> Parser<W, C> {
    pub(crate) fn reset_descriptors(&mut self) {
        self.state.indef = Indef::default();
    }

    /// Read descriptors from the marker, leaving it on the first word that
    /// is not one. Counts are only read when `allow_multiple`.
    pub(crate) fn descriptors(&mut self, allow_multiple: bool) -> Option<ParseErrorKind> {
        self.reset_descriptors();
        if self.state.words.wn > self.state.words.num_words() {
            return None;
        }

        let mut flag = true;
        while flag {
            let word = self.state.words.next_word_stopped().word();
            flag = false;

            let found: Vec<_> = self.lexicon.descriptors_for(word).copied().collect();
            for d in found {
                flag = true;
                let indef = &mut self.state.indef;
                if d.kind != DescriptorKind::DefiniteArticle {
                    indef.mode = true;
                }
                indef.possambig = true;
                indef.cases &= d.gna;
                match d.kind {
                    DescriptorKind::Possessive => match d.owner {
                        Some(Owner::Actor) => indef.kind |= MY_BIT,
                        Some(Owner::Location) => indef.kind |= THAT_BIT,
                        Some(Owner::Pronoun(p)) => {
                            indef.owner = match self.state.pronouns.value(Some(p)) {
                                PronounValue::Bound(o) => Some(IndefOwner::Object(o)),
                                PronounValue::Unset => Some(IndefOwner::Nobody),
                                PronounValue::NotPronoun => None,
                            }
                        }
                        None => {}
                    },
                    DescriptorKind::Lit => indef.kind |= LIT_BIT,
                    DescriptorKind::Unlit => indef.kind |= UNLIT_BIT,
                    DescriptorKind::DefiniteArticle | DescriptorKind::IndefiniteArticle => {}
                }
            }

            if self.lexicon.is_other(word) {
                self.state.indef.mode = true;
                self.state.indef.kind |= OTHER_BIT;
                flag = true;
            }
            if self.lexicon.is_all(word) {
                let indef = &mut self.state.indef;
                indef.mode = true;
                indef.wanted = ALL_WANTED;
                indef.kind |= PLURAL_BIT;
                self.state.multi_wanted = ALL_WANTED;
                if self.state.take_all_rule == 1 {
                    self.state.take_all_rule = 2;
                }
                flag = true;
            }
            if self.state.allow_plurals && allow_multiple {
                let at = self.state.words.wn - 1;
                match self.try_number(at) {
                    Some(1) => {
                        self.state.indef.mode = true;
                        flag = true;
                    }
                    Some(n) if n > 1 => {
                        let indef = &mut self.state.indef;
                        indef.guess_p = true;
                        indef.mode = true;
                        indef.wanted = n as usize;
                        indef.nspec_at = at;
                        indef.kind |= PLURAL_BIT;
                        flag = true;
                    }
                    _ => {}
                }
            }
            if flag {
                let next = self.state.words.next_word_stopped();
                let of = match next {
                    Next::Word(w) => self.lexicon.is_of(w),
                    Next::End => false,
                };
                if !of {
                    self.state.words.wn -= 1;
                }
            }
        }
        self.state.words.wn -= 1;

        ptrace!(
            self,
            4,
            "   [Descriptors: mode {} kind {} wanted {} owner {:?}]",
            self.state.indef.mode,
            self.state.indef.kind,
            self.state.indef.wanted,
            self.state.indef.owner
        );
        if self.state.indef.wanted > 0 && !allow_multiple {
            return Some(ParseErrorKind::Multi);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParserConfig;
    use crate::console::ScriptedConsole;
    use crate::object_tree::{ObjectKind, ObjectTree};

    fn parser(line: &str) -> Parser<ObjectTree, ScriptedConsole> {
        let mut tree = ObjectTree::new();
        let room = tree.add("Lab", &["lab"], ObjectKind::Room);
        let me = tree.add("yourself", &["me"], ObjectKind::Person { female: false });
        tree.move_to(me, room);
        tree.set_player(me);
        tree.set_location(room);
        tree.add("coin", &["coin", "coins//p"], ObjectKind::Item);
        let mut p =
            Parser::standard(tree, ScriptedConsole::new(&[line]), ParserConfig::default()).unwrap();
        p.read_command().unwrap();
        p.state.words.wn = 2;
        p
    }

    #[test]
    fn test_article_is_not_indefinite() {
        let mut p = parser("take the coin");
        assert_eq!(p.descriptors(true), None);
        assert!(!p.state.indef.mode);
        assert!(p.state.indef.possambig);
        assert_eq!(p.state.words.wn, 3);
    }

    #[test]
    fn test_all_wants_everything() {
        let mut p = parser("take all coins");
        p.state.take_all_rule = 1;
        assert_eq!(p.descriptors(true), None);
        assert!(p.state.indef.mode);
        assert_eq!(p.state.indef.wanted, ALL_WANTED);
        assert_ne!(p.state.indef.kind & PLURAL_BIT, 0);
        assert_eq!(p.state.take_all_rule, 2);
        assert_eq!(p.state.words.wn, 3);
    }

    #[test]
    fn test_count_and_of() {
        let mut p = parser("take two of the coins");
        assert_eq!(p.descriptors(true), None);
        assert!(p.state.indef.guess_p);
        assert_eq!(p.state.indef.wanted, 2);
        assert_eq!(p.state.indef.nspec_at, 2);
        assert_eq!(p.state.words.wn, 5);
    }

    #[test]
    fn test_my_sets_owner_bit() {
        let mut p = parser("take my coin");
        p.descriptors(false);
        assert_ne!(p.state.indef.kind & MY_BIT, 0);
        assert!(p.state.indef.mode);
    }

    #[test]
    fn test_count_refused_for_single_token() {
        let mut p = parser("take all coins");
        assert_eq!(p.descriptors(false), Some(ParseErrorKind::Multi));
    }

    #[test]
    fn test_past_the_end() {
        let mut p = parser("take");
        assert_eq!(p.descriptors(true), None);
        assert_eq!(p.state.indef, Indef::default());
        assert_eq!(p.state.words.wn, 2);
    }
}

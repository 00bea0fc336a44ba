//! Matching noun phrases
//!
//! `noun_domain` matches the words at the marker against everything in
//! scope. When several objects fit equally well and the adjudicator cannot
//! choose, the player is asked which was meant; when the command stopped
//! short, the player is asked what it should apply to. Either answer is
//! written into the main buffer and the whole command is parsed again.

use super::adjudicate::Verdict;
use super::descriptors::PLURAL_BIT;
use super::{NounResult, Parser, PatternEntry, TokenFilter};
use crate::console::Console;
use crate::dictionary::{DictWord, NOUN, PLURAL};
use crate::error::{ParseErrorKind, ParserError};
use crate::grammar::ElementaryToken;
use crate::messages::{a_name, the_name, Message};
use crate::pronouns::PronounValue;
use crate::world::{Attribute, NameMatch, ObjectId, WorldModel};
use log::debug;

/// What the word at the marker is, for matching purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NounWord {
    /// Past the end, unknown, or not a noun
    Nothing,
    Me,
    Pronoun(DictWord),
    Noun(DictWord),
}

impl<W: WorldModel, C: Console> Parser<W, C> {
    /// Match a noun phrase at the marker against the objects in scope of
    /// the two domains.
    pub(crate) fn noun_domain(
        &mut self,
        domain1: Option<ObjectId>,
        domain2: Option<ObjectId>,
        context: Option<ElementaryToken>,
    ) -> Result<NounResult, ParserError> {
        ptrace!(
            self,
            4,
            "   [NounDomain called at word {}]",
            self.state.words.wn
        );
        self.state.matches.reset(self.state.words.wn);
        self.search_scope(domain1, domain2, context);

        let from = self.state.matches.from();
        self.state.words.wn = from + self.state.matches.length();
        let num = self.state.words.num_words();
        ptrace!(
            self,
            4,
            "   [ND made {} matches of {} words]",
            self.state.matches.len(),
            self.state.matches.length()
        );

        if self.state.matches.is_empty() {
            self.state.words.wn += 1;
            return Ok(NounResult::Nothing);
        }

        if from <= num {
            if self.state.matches.len() == 1 {
                if let Some(o) = self.state.matches.first() {
                    return Ok(NounResult::Object(o));
                }
            }
            let wn = self.state.words.wn;
            if wn <= num {
                let next = self.state.words.dict_at(wn);
                if !self.lexicon.is_connective(next) && self.state.lookahead_end {
                    return Ok(NounResult::Nothing);
                }
            }
        }

        self.state.number_of_classes = 0;
        let chosen = if self.state.matches.len() == 1 {
            self.state.matches.first()
        } else {
            match self.adjudicate(context) {
                Verdict::Fail => return Ok(NounResult::Nothing),
                Verdict::Multiple => return Ok(NounResult::Multiple),
                Verdict::Object(o) => Some(o),
                Verdict::Ask => None,
            }
        };

        if let Some(o) = chosen {
            if !self.state.dont_infer {
                if self.state.inferfrom == 0 {
                    self.state.inferfrom = self.state.pcount;
                }
                let pcount = self.state.pcount;
                self.state.set_pattern(pcount, PatternEntry::Object(o));
            }
            return Ok(NounResult::Object(o));
        }

        if from > num {
            return self.ask_incomplete(context);
        }
        self.ask_which(context)
    }

    /// "Which do you mean, the red ball or the red box?"
    fn ask_which(&mut self, context: Option<ElementaryToken>) -> Result<NounResult, ParserError> {
        let msg = if context == Some(ElementaryToken::Creature) {
            Message::WhoDoYouMean
        } else {
            Message::WhichDoYouMean
        };
        let mut question = self.messages.text(msg).to_string();
        let classes = self.state.number_of_classes as i32;
        let entries = self.state.matches.entries().to_vec();
        let mut marker = 0;
        for i in 1..=classes {
            while marker < entries.len() && entries[marker].class != i && entries[marker].class != -i {
                marker += 1;
            }
            let candidate = match entries.get(marker) {
                Some(c) => c,
                None => break,
            };
            if candidate.class > 0 {
                question.push_str(&the_name(&self.world, candidate.obj));
            } else {
                question.push_str(&a_name(&self.world, candidate.obj));
            }
            if i < classes - 1 {
                question.push_str(", ");
            } else if i == classes - 1 {
                question.push_str(self.messages.text(Message::Or));
            }
        }
        question.push_str("?\n");
        self.print(&question)?;

        let from = self.state.matches.from();
        loop {
            let (answer, words) = self.read_answer()?;
            let first = words.dict_at(1);

            if self.lexicon.is_all(first) {
                if context.map_or(false, |c| c.allows_multiple()) {
                    let all: Vec<ObjectId> = self.state.matches.objects().collect();
                    for o in all {
                        if !self.state.multi.push_raw(o) {
                            break;
                        }
                    }
                    ptrace!(self, 4, "   [Answered \"all\": {} objects]", self.state.multi.len());
                    return Ok(NounResult::Multiple);
                }
                self.say(Message::OnlyOne)?;
                continue;
            }

            if let Some(w) = first {
                if self.grammar.dictionary().is_verb(w) && !self.lexicon.is_mode_word(first) {
                    debug!("answer \"{}\" is a new command", answer.as_str());
                    self.state.buffer = answer;
                    return Ok(NounResult::Reparse);
                }
            }

            let at = self.word_address(from);
            let splice = format!("{} ", answer.as_str().trim());
            self.state.buffer.insert(at, &splice);
            debug!("answer spliced in: \"{}\"", self.state.buffer.as_str());
            return Ok(NounResult::Reparse);
        }
    }

    /// "What do you want to take?"
    fn ask_incomplete(&mut self, context: Option<ElementaryToken>) -> Result<NounResult, ParserError> {
        let msg = if context == Some(ElementaryToken::Creature) {
            Message::WhomDoYouWant
        } else {
            Message::WhatDoYouWant
        };
        let mut question = self.messages.text(msg).to_string();
        if self.state.actor != self.world.player() {
            question.push(' ');
            question.push_str(&the_name(&self.world, self.state.actor));
        }
        question.push_str(" to ");
        question.push_str(&self.print_command(0));
        question.push_str("?\n");
        self.print(&question)?;

        let (answer, words) = self.read_answer()?;
        if let Some(w) = words.dict_at(1) {
            if self.grammar.dictionary().is_verb(w) {
                debug!("answer \"{}\" is a new command", answer.as_str());
                self.state.buffer = answer;
                return Ok(NounResult::Reparse);
            }
        }

        // Put back what was inferred, so "put" + "coin" + "on" keeps "on"
        if self.state.inferfrom != 0 {
            for j in self.state.inferfrom..self.state.pcount {
                let entry = self.state.pattern.get(j).copied().unwrap_or(PatternEntry::Null);
                let glue = match entry {
                    PatternEntry::Null => continue,
                    PatternEntry::Object(o) => {
                        self.state.pronouns.notice(o, &self.world);
                        self.state.pronouns.word_for(o)
                    }
                    PatternEntry::Preposition(w) => w,
                    PatternEntry::Multiple | PatternEntry::Number => None,
                };
                if let Some(w) = glue {
                    let text = self.grammar.dictionary().text(w).to_string();
                    ptrace!(self, 5, "[Gluing in '{}' from token {}]", text, j);
                    self.state.buffer.push_str(" ");
                    self.state.buffer.push_str(&text);
                }
            }
        }
        self.state.buffer.push_str(" ");
        self.state.buffer.push_str(answer.as_str());
        debug!("answer appended: \"{}\"", self.state.buffer.as_str());
        Ok(NounResult::Reparse)
    }

    /// Offer `obj` as matching the words at the marker. Returns the number
    /// of words it matched.
    pub(crate) fn try_given_object(&mut self, obj: ObjectId) -> usize {
        ptrace!(
            self,
            5,
            "    Trying {} ({}) at word {}",
            the_name(&self.world, obj),
            obj,
            self.state.words.wn
        );
        self.state.dict_flags_of_noun = 0;

        if self.state.words.wn > self.state.words.num_words() {
            // Nothing left to match: everything in scope is a candidate
            self.make_match(obj, 0);
            return 1;
        }

        let start = self.state.words.wn;
        if let Some(parser) = self.world.name_parser(obj) {
            let result = parser.parse_name(obj, self.state.words.view_from(start));
            match result {
                NameMatch::Words(k) | NameMatch::Plural(k) if k > 0 => {
                    self.state.words.wn = start + k;
                    return self.match_by_name(obj, k, matches!(result, NameMatch::Plural(_)));
                }
                NameMatch::Default => {}
                _ => return self.no_words_match(obj),
            }
        }

        match self.noun_word() {
            NounWord::Me if obj == self.world.player() => return self.match_by_name(obj, 1, false),
            NounWord::Pronoun(p) if self.state.pronouns.refers_to(Some(p), obj) => {
                return self.match_by_name(obj, 1, false)
            }
            _ => {}
        }

        self.state.words.wn -= 1;
        let start = self.state.words.wn;
        let result = self.hooks.parse_noun(obj, self.state.words.view_from(start));
        match result {
            NameMatch::Words(k) | NameMatch::Plural(k) if k > 0 => {
                self.state.words.wn = start + k;
                return self.match_by_name(obj, k, matches!(result, NameMatch::Plural(_)));
            }
            NameMatch::Default => {}
            _ => return self.no_words_match(obj),
        }

        if !self.refers(obj, start) {
            return self.no_words_match(obj);
        }
        let mut k = 1;
        self.state.dict_flags_of_noun = self.flags_at(start);
        self.state.words.wn = start + 1;
        while self.refers(obj, self.state.words.wn) {
            k += 1;
            self.state.dict_flags_of_noun |= self.flags_at(self.state.words.wn);
            self.state.words.wn += 1;
        }
        self.match_by_name(obj, k, false)
    }

    fn flags_at(&self, n: usize) -> u8 {
        match self.state.words.dict_at(n) {
            Some(w) => self.grammar.dictionary().flags(w),
            None => 0,
        }
    }

    /// `obj` matched `k` words; a plural word makes the phrase indefinite.
    fn match_by_name(&mut self, obj: ObjectId, k: usize, plural: bool) -> usize {
        let mut k = k;
        if plural {
            self.state.dict_flags_of_noun |= PLURAL;
        }
        if self.state.dict_flags_of_noun & PLURAL != 0 {
            if !self.state.allow_plurals {
                k = 0;
            } else {
                let indef = &mut self.state.indef;
                if !indef.mode {
                    indef.mode = true;
                    indef.kind = 0;
                    indef.wanted = 0;
                }
                indef.kind |= PLURAL_BIT;
                if indef.wanted == 0 {
                    indef.wanted = super::descriptors::ALL_WANTED;
                }
            }
        }
        ptrace!(self, 5, "    Matched ({})", k);
        self.make_match(obj, k);
        k
    }

    fn no_words_match(&mut self, obj: ObjectId) -> usize {
        if self.state.indef.mode {
            self.make_match(obj, 0);
        }
        0
    }

    /// Add `obj` to the match list if the token's filter allows it.
    pub(crate) fn make_match(&mut self, obj: ObjectId, quality: usize) {
        let allowed = match self.state.token_filter {
            TokenFilter::None => true,
            TokenFilter::Attr(a) => self.world.has(obj, a),
            TokenFilter::Routine(id) => self
                .grammar
                .filter(id)
                .map_or(true, |f| f.accept(obj, &self.world)),
        };
        if !allowed {
            ptrace!(self, 5, "    Match with quality {} refused by the filter", quality);
            return;
        }
        if self.state.matches.offer(obj, quality) {
            ptrace!(self, 5, "    Match with quality {}", quality);
        }
    }

    /// Whether word `n` is one of `obj`'s names.
    pub(crate) fn refers(&self, obj: ObjectId, n: usize) -> bool {
        let word = match self.state.words.dict_at(n) {
            Some(w) => w,
            None => return false,
        };
        let dict = self.grammar.dictionary();
        self.world
            .name_words(obj)
            .iter()
            .any(|name| dict.lookup(name) == Some(word))
    }

    /// Read the word at the marker as a possible noun.
    pub(crate) fn noun_word(&mut self) -> NounWord {
        let word = match self.state.words.next_word() {
            Some(w) => w,
            None => return NounWord::Nothing,
        };
        if self.lexicon.is_me(Some(word)) {
            return NounWord::Me;
        }
        if self.state.pronouns.value(Some(word)) != PronounValue::NotPronoun {
            return NounWord::Pronoun(word);
        }
        if self.grammar.dictionary().flags(word) & NOUN == 0 {
            return NounWord::Nothing;
        }
        NounWord::Noun(word)
    }

    /// The error for a noun phrase that matched nothing.
    pub(crate) fn cant_see(&mut self) -> ParseErrorKind {
        self.state.saved_oops = self.state.oops_from;
        if let Some(id) = self.state.scope_token {
            self.state.scope_error = Some(id);
            return ParseErrorKind::AskScope;
        }

        self.state.words.wn = self.state.words.wn.saturating_sub(1);
        let word = self.state.words.next_word();
        let mut error = ParseErrorKind::CantSee;
        if self.state.pronoun_word.is_some() && word == self.state.pronoun_word {
            self.state.saved_pronoun_word = self.state.pronoun_word;
            self.state.saved_pronoun_obj = self.state.pronoun_obj;
            error = ParseErrorKind::ItGone;
        }

        let mut top = self.state.actor;
        while let Some(p) = self.world.parent(top) {
            top = p;
        }
        self.state.words.wn -= 1;
        if self.world.has(top, Attribute::Visited) {
            if self.refers(top, self.state.words.wn) {
                error = ParseErrorKind::Scenery;
            } else {
                // "examine the laboratory"
                let _ = self.descriptors(false);
                if self.refers(top, self.state.words.wn) {
                    error = ParseErrorKind::Scenery;
                }
            }
        }
        self.state.words.wn += 1;
        self.state.etype.max(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParserConfig;
    use crate::console::ScriptedConsole;
    use crate::object_tree::{ObjectKind, ObjectTree};
    use crate::tokenizer::WordView;
    use crate::world::NameParser;

    fn parser(tree: ObjectTree, lines: &[&str]) -> Parser<ObjectTree, ScriptedConsole> {
        Parser::standard(tree, ScriptedConsole::new(lines), ParserConfig::default()).unwrap()
    }

    fn room() -> ObjectTree {
        let mut tree = ObjectTree::new();
        let room = tree.add("Lab", &["lab", "laboratory"], ObjectKind::Room);
        let me = tree.add("yourself", &["me"], ObjectKind::Person { female: false });
        tree.move_to(me, room);
        tree.set_player(me);
        tree.set_location(room);
        tree
    }

    #[test]
    fn test_try_given_object_counts_name_words() {
        let mut tree = room();
        let ball = tree.add("red ball", &["red", "ball"], ObjectKind::Item);
        let mut p = parser(tree, &["take red ball now"]);
        p.read_command().unwrap();
        p.state.matches.reset(2);
        p.state.words.wn = 2;
        assert_eq!(p.try_given_object(ball), 2);
        assert_eq!(p.state.words.wn, 4);
        assert_eq!(p.state.matches.objects().collect::<Vec<_>>(), vec![ball]);
        assert_eq!(p.state.matches.length(), 2);
    }

    #[test]
    fn test_plural_name_makes_phrase_indefinite() {
        let mut tree = room();
        let coin = tree.add("coin", &["coin", "coins//p"], ObjectKind::Item);
        let mut p = parser(tree, &["take coins"]);
        p.read_command().unwrap();
        p.state.matches.reset(2);
        p.state.words.wn = 2;
        assert_eq!(p.try_given_object(coin), 1);
        assert!(p.state.indef.mode);
        assert_eq!(p.state.indef.wanted, super::super::descriptors::ALL_WANTED);

        p.reset_descriptors();
        p.state.allow_plurals = false;
        p.state.matches.reset(2);
        p.state.words.wn = 2;
        assert_eq!(p.try_given_object(coin), 0);
    }

    struct Numbered;

    impl NameParser for Numbered {
        fn parse_name(&self, _obj: ObjectId, mut words: WordView<'_>) -> NameMatch {
            match (words.next_word(), words.next_word()) {
                (Some("door"), Some("7")) => NameMatch::Words(2),
                (Some("door"), _) => NameMatch::Words(1),
                _ => NameMatch::NoMatch,
            }
        }
    }

    #[test]
    fn test_name_parser_overrides_name_words() {
        let mut tree = room();
        let door = tree.add("door 7", &["door"], ObjectKind::Item);
        tree.set_name_parser(door, Box::new(Numbered));
        let mut p = parser(tree, &["open door 7"]);
        p.read_command().unwrap();
        p.state.matches.reset(2);
        p.state.words.wn = 2;
        assert_eq!(p.try_given_object(door), 2);
        assert_eq!(p.state.words.wn, 4);
    }

    #[test]
    fn test_refers_and_noun_word() {
        let mut tree = room();
        let ball = tree.add("red ball", &["red", "ball"], ObjectKind::Item);
        let mut p = parser(tree, &["take it me ball xyzzy"]);
        p.read_command().unwrap();
        assert!(!p.refers(ball, 5));
        assert!(p.refers(ball, 4));
        p.state.words.wn = 2;
        assert!(matches!(p.noun_word(), NounWord::Pronoun(_)));
        assert_eq!(p.noun_word(), NounWord::Me);
        assert!(matches!(p.noun_word(), NounWord::Noun(_)));
        assert_eq!(p.noun_word(), NounWord::Nothing);
        assert_eq!(p.noun_word(), NounWord::Nothing);
    }

    #[test]
    fn test_cant_see_scenery_of_a_visited_room() {
        let mut tree = room();
        let lab = tree.find("Lab").unwrap();
        tree.give(lab, Attribute::Visited);
        let mut p = parser(tree, &["examine laboratory"]);
        p.read_command().unwrap();
        p.state.words.wn = 3;
        assert_eq!(p.cant_see(), ParseErrorKind::Scenery);
    }

    #[test]
    fn test_make_match_applies_filter() {
        let mut tree = room();
        let ball = tree.add("ball", &["ball"], ObjectKind::Item);
        let mut p = parser(tree, &[]);
        p.state.matches.reset(1);
        p.state.token_filter = TokenFilter::Attr(Attribute::Animate);
        p.make_match(ball, 1);
        assert!(p.state.matches.is_empty());
        p.state.token_filter = TokenFilter::None;
        p.make_match(ball, 1);
        assert_eq!(p.state.matches.len(), 1);
    }

    #[test]
    fn test_names_compare_at_dictionary_resolution() {
        let mut tree = room();
        let torch = tree.add("torch", &["flashlight"], ObjectKind::Item);
        let config = ParserConfig::from_toml_str("resolution = 6").unwrap();
        let mut p = Parser::standard(tree, ScriptedConsole::new(&["take flashlig"]), config).unwrap();
        p.read_command().unwrap();
        assert!(p.refers(torch, 2));
    }

    #[test]
    fn test_cant_see_after_an_article() {
        let mut tree = room();
        let lab = tree.find("Lab").unwrap();
        tree.give(lab, Attribute::Visited);
        let mut p = parser(tree, &["examine the lab", "examine widget"]);
        p.read_command().unwrap();
        p.state.words.wn = 3;
        assert_eq!(p.cant_see(), ParseErrorKind::Scenery);

        p.read_command().unwrap();
        p.state.words.wn = 3;
        assert_eq!(p.cant_see(), ParseErrorKind::CantSee);
    }
}

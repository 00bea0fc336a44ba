//! Matching one grammar token
//!
//! Prepositions must be the next word (or are inferred at the end of the
//! input). Numbers, special words and topics read words directly.
//! Everything else becomes a list of noun phrases joined by "and", "but"
//! and commas, each matched by `noun_domain`.

use super::descriptors::{ALL_WANTED, PLURAL_BIT};
use super::{NounResult, Parser, PatternEntry, ScopeReason, Special, TokenFilter, TokenResult};
use crate::actions;
use crate::console::Console;
use crate::dictionary::DictWord;
use crate::error::{ParseErrorKind, ParserError};
use crate::grammar::{ElementaryToken, LineToken, RoutineId, TokenKind};
use crate::messages::the_name;
use crate::pronouns::PronounValue;
use crate::routines::{GprContext, GprResult};
use crate::tokenizer::Next;
use crate::vocabulary::DescriptorKind;
use crate::world::{ObjectId, WorldModel};
use log::warn;

/// Where `parse_object_list` goes next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListStep {
    /// Start of a noun phrase
    ObjectList,
    /// Read descriptors, then the noun
    TryAgain,
    /// Read the noun
    TryAgain2,
    /// Move past what matched
    AfterMatch,
    /// Look for a connective
    NextInList,
    PassToken,
    FailToken,
}

impl<W: WorldModel, C: Console> Parser<W, C> {
    /// Match the token at `index` of the current line, starting at the
    /// word marker.
    pub(crate) fn parse_token(&mut self, token: LineToken, index: usize) -> Result<TokenResult, ParserError> {
        self.state.token_filter = TokenFilter::None;

        let elementary = match token.kind {
            TokenKind::Elementary(e) => e,
            TokenKind::Preposition(word) => return Ok(self.parse_preposition(token, word, index)),
            TokenKind::Gpr(id) => return self.parse_with_routine(id, index),
            TokenKind::Scope(id) => {
                self.state.scope_token = Some(id);
                let multiple = self.grammar.scope_routine(id).map_or(false, |r| r.allows_multiple());
                ptrace!(self, 3, "  [Scope routine returned multiple-flag of {}]", multiple);
                if multiple {
                    ElementaryToken::Multi
                } else {
                    ElementaryToken::Noun
                }
            }
            TokenKind::AttrFilter(attr) => {
                self.state.token_filter = TokenFilter::Attr(attr);
                ElementaryToken::Noun
            }
            TokenKind::RoutineFilter(id) => {
                self.state.token_filter = TokenFilter::Routine(id);
                ElementaryToken::Noun
            }
        };
        self.parse_elementary(elementary, index)
    }

    fn parse_elementary(&mut self, token: ElementaryToken, index: usize) -> Result<TokenResult, ParserError> {
        match token {
            ElementaryToken::Special => {
                let wn = self.state.words.wn;
                let number = self.try_number(wn);
                self.state.special_word = self.state.words.next_word();
                let value = match number {
                    Some(n) => {
                        ptrace!(self, 3, "  [Read special as the number {}]", n);
                        Special::Number(n)
                    }
                    None => {
                        ptrace!(self, 3, "  [Read special word at word number {}]", wn);
                        Special::Word(self.state.special_word)
                    }
                };
                self.state.parsed_number = value;
                Ok(TokenResult::Number(value))
            }
            ElementaryToken::Number => {
                let wn = self.state.words.wn;
                self.state.words.wn += 1;
                match self.try_number(wn) {
                    Some(n) => {
                        ptrace!(self, 3, "  [Read number as {}]", n);
                        self.state.parsed_number = Special::Number(n);
                        Ok(TokenResult::Number(Special::Number(n)))
                    }
                    None => {
                        self.state.etype = ParseErrorKind::Number;
                        Ok(TokenResult::Fail)
                    }
                }
            }
            ElementaryToken::Topic => Ok(self.parse_topic(index)),
            ElementaryToken::Creature => {
                if self.is_conversation() {
                    self.state.scope_reason = ScopeReason::Talking;
                }
                self.parse_object_list(token)
            }
            _ => self.parse_object_list(token),
        }
    }

    fn is_conversation(&self) -> bool {
        matches!(
            self.state.action_to_be,
            Some(a) if a == actions::ANSWER || a == actions::ASK || a == actions::ASK_FOR || a == actions::TELL
        )
    }

    fn parse_preposition(&mut self, token: LineToken, word: DictWord, index: usize) -> TokenResult {
        // A later alternative of a chain whose earlier member matched
        if token.chain_next {
            return TokenResult::Preposition;
        }

        let pcount = self.state.pcount;
        if self.state.words.wn > self.state.words.num_words() {
            if self.state.inferfrom == 0 && self.state.results.len() < self.state.params_wanted {
                self.state.inferfrom = pcount;
            }
            if self.state.inferfrom == 0 {
                return TokenResult::Fail;
            }
            self.state.set_pattern(pcount, PatternEntry::Preposition(Some(word)));
            return TokenResult::Preposition;
        }

        let typed = self.state.words.next_word();
        self.state.set_pattern(pcount, PatternEntry::Preposition(typed));
        if typed == Some(word) || self.preposition_chain(typed, index) {
            return TokenResult::Preposition;
        }
        TokenResult::Fail
    }

    /// Whether `word` is the preposition at `index` or one of the
    /// alternatives chained after it ("in/into/inside").
    pub(crate) fn preposition_chain(&self, word: Option<DictWord>, index: usize) -> bool {
        let word = match word {
            Some(w) => w,
            None => return false,
        };
        let line = &self.state.line;
        let first = match line.get(index) {
            Some(t) => t,
            None => return false,
        };
        if first.preposition() == Some(word) {
            return true;
        }
        if !first.chain_first {
            return false;
        }
        line[index..]
            .iter()
            .enumerate()
            .take_while(|(i, t)| *i == 0 || t.chain_next)
            .any(|(_, t)| t.preposition() == Some(word))
    }

    /// Swallow words up to the next preposition of the line, or the end.
    fn parse_topic(&mut self, index: usize) -> TokenResult {
        self.state.consult_from = self.state.words.wn;
        let next = self.state.line.get(index + 1);
        if next.map_or(false, |t| !t.is_preposition()) {
            warn!(
                "topic token must be followed by a preposition or end the line, in '{}'",
                self.grammar.describe_token(&self.state.line[index])
            );
        }
        loop {
            match self.state.words.next_word_stopped() {
                Next::End => break,
                Next::Word(w) => {
                    if self.preposition_chain(w, index + 1) {
                        break;
                    }
                }
            }
        }
        self.state.words.wn -= 1;
        self.state.consult_words = self.state.words.wn - self.state.consult_from;
        if self.state.consult_words == 0 {
            return TokenResult::Fail;
        }

        let action = self.state.action_to_be;
        if action == Some(actions::ASK) || action == Some(actions::ANSWER) || action == Some(actions::TELL) {
            let mut topic = self.state.words.dict_at(self.state.consult_from);
            let leading_the = self
                .lexicon
                .descriptors_for(topic)
                .any(|d| d.kind == DescriptorKind::DefiniteArticle);
            if leading_the && self.state.consult_words > 1 {
                topic = self.state.words.dict_at(self.state.consult_from + 1);
            }
            self.state.parsed_number = Special::Word(topic);
            return TokenResult::Number(Special::Word(topic));
        }
        TokenResult::Preposition
    }

    /// Hand the words to a game-supplied parsing routine.
    fn parse_with_routine(&mut self, id: RoutineId, index: usize) -> Result<TokenResult, ParserError> {
        let (result, wn) = {
            let routine = match self.grammar.general_parser(id) {
                Some(r) => r,
                None => {
                    warn!("no general parsing routine registered as {:?}", id);
                    return Ok(TokenResult::Fail);
                }
            };
            let mut ctx = GprContext::new(
                &self.world,
                self.grammar.dictionary(),
                self.state.words.words(),
                self.state.words.wn,
                self.state.actor,
                self.state.action_to_be,
            );
            let result = routine.parse(&mut ctx);
            (result, ctx.wn)
        };
        self.state.words.wn = wn;
        ptrace!(self, 3, "  [Outside parsing routine returned {:?}]", result);

        Ok(match result {
            GprResult::Fail => TokenResult::Fail,
            GprResult::Preposition => TokenResult::Preposition,
            GprResult::Number(n) => {
                self.state.parsed_number = Special::Number(n);
                TokenResult::Number(Special::Number(n))
            }
            GprResult::Object(o) => TokenResult::Object(o),
            GprResult::Multiple(objs) => {
                for o in objs {
                    self.state.multi.add(o);
                }
                TokenResult::Multiple
            }
            GprResult::Token(e) => return self.parse_elementary(e, index),
        })
    }

    /// Match "the red ball and the cup but not the box", for a noun-like
    /// token.
    fn parse_object_list(&mut self, token: ElementaryToken) -> Result<TokenResult, ParserError> {
        let allows_multiple = token.allows_multiple();
        let player = self.world.player();
        let mut many = false;
        let mut and_parity = true;
        let mut single: Option<ObjectId> = None;
        let mut desc_wn = self.state.words.wn;
        self.state.dont_infer = false;

        let mut step = ListStep::ObjectList;
        loop {
            step = match step {
                ListStep::ObjectList => {
                    let wn = self.state.words.wn;
                    ptrace!(self, 3, "  [Object list from word {}]", wn);
                    let word = self.state.words.dict_at(wn);

                    self.state.pronoun_word = None;
                    self.state.pronoun_obj = None;
                    match self.state.pronouns.value(word) {
                        PronounValue::NotPronoun => {}
                        PronounValue::Bound(o) => {
                            self.state.pronoun_word = word;
                            self.state.pronoun_obj = Some(o);
                        }
                        PronounValue::Unset => {
                            self.state.pronoun_word = word;
                            // "her" might be a possessive rather than a pronoun
                            if !self.lexicon.is_descriptor(word) {
                                self.state.saved_pronoun_word = word;
                                self.state.saved_pronoun_obj = None;
                                self.state.etype = ParseErrorKind::Vague;
                                return Ok(TokenResult::Fail);
                            }
                        }
                    }
                    if self.lexicon.is_me(word) {
                        self.state.pronoun_word = word;
                        self.state.pronoun_obj = Some(player);
                    }
                    self.state.allow_plurals = true;
                    desc_wn = wn;
                    ListStep::TryAgain
                }

                ListStep::TryAgain => match self.descriptors(allows_multiple) {
                    Some(e) => {
                        self.state.etype = e;
                        return Ok(TokenResult::Fail);
                    }
                    None => ListStep::TryAgain2,
                },

                ListStep::TryAgain2 => {
                    self.state.oops_from = self.state.words.wn;
                    let actor = self.state.actor;
                    let location = self.state.actors_location;

                    if token != ElementaryToken::Held {
                        let before = self.state.multi.len();
                        ptrace!(self, 3, "  [Calling NounDomain on location and actor]");
                        match self.noun_domain(Some(location), Some(actor), Some(token))? {
                            NounResult::Reparse => return Ok(TokenResult::Reparse),
                            NounResult::Nothing => {
                                if self.state.indef.possambig {
                                    self.reset_descriptors();
                                    self.state.words.wn = desc_wn;
                                    ListStep::TryAgain2
                                } else {
                                    self.state.etype = self.cant_see();
                                    ListStep::FailToken
                                }
                            }
                            NounResult::Multiple => {
                                ptrace!(
                                    self,
                                    3,
                                    "  [ND appended to the multiple object list: size now {}]",
                                    self.state.multi.len()
                                );
                                if !many {
                                    many = true;
                                } else {
                                    let fresh = self.state.multi.objects()[before..].to_vec();
                                    self.state.multi.truncate(before);
                                    ptrace!(self, 3, "  [Merging {} new objects to the {} old ones]", fresh.len(), before);
                                    for o in fresh {
                                        self.merge(o, and_parity);
                                    }
                                }
                                ListStep::AfterMatch
                            }
                            NounResult::Object(o) => {
                                ptrace!(self, 3, "  [ND returned {}]", the_name(&self.world, o));
                                if self.state.matches.length() == 0 && self.state.indef.possambig {
                                    self.reset_descriptors();
                                    self.state.words.wn = desc_wn;
                                    ListStep::TryAgain2
                                } else if token == ElementaryToken::Creature && !self.creature_test(o) {
                                    self.state.etype = ParseErrorKind::Animate;
                                    ListStep::FailToken
                                } else {
                                    if many {
                                        ptrace!(self, 3, "  [Combining {} with list]", the_name(&self.world, o));
                                        self.merge(o, and_parity);
                                    } else {
                                        single = Some(o);
                                    }
                                    ListStep::AfterMatch
                                }
                            }
                        }
                    } else {
                        match self.noun_domain(Some(actor), Some(location), Some(token))? {
                            NounResult::Reparse => return Ok(TokenResult::Reparse),
                            NounResult::Nothing | NounResult::Multiple => {
                                if self.state.indef.possambig {
                                    self.reset_descriptors();
                                    self.state.words.wn = desc_wn;
                                    ListStep::TryAgain2
                                } else {
                                    self.state.etype = self.cant_see();
                                    return Ok(TokenResult::Fail);
                                }
                            }
                            NounResult::Object(o) => {
                                if self.world.parent(o) != Some(actor) {
                                    if self.state.notheld_mode {
                                        self.state.saved_oops = self.state.oops_from;
                                        self.state.etype = ParseErrorKind::NotHeld;
                                        ListStep::FailToken
                                    } else {
                                        ptrace!(self, 3, "  [Allowing object {} for now]", the_name(&self.world, o));
                                        self.state.not_holding = Some(o);
                                        single = Some(o);
                                        ListStep::AfterMatch
                                    }
                                } else {
                                    single = Some(o);
                                    ListStep::AfterMatch
                                }
                            }
                        }
                    }
                }

                ListStep::AfterMatch => {
                    self.state.words.wn = self.state.oops_from + self.state.matches.length();
                    ListStep::NextInList
                }

                ListStep::NextInList => {
                    let word = self.state.words.next_word();
                    let connective =
                        self.lexicon.is_and(word) || self.lexicon.is_but(word) || self.lexicon.is_comma(word);
                    if connective {
                        ptrace!(self, 3, "  [Read connective '{}']", self.state.words.text_at(self.state.words.wn - 1));
                        if !allows_multiple {
                            self.state.etype = ParseErrorKind::Multi;
                            ListStep::FailToken
                        } else {
                            if self.lexicon.is_but(word) {
                                and_parity = !and_parity;
                            }
                            if !many {
                                self.state.multi.clear();
                                if let Some(o) = single {
                                    ptrace!(self, 3, "  [Making new list from {}]", the_name(&self.world, o));
                                    self.state.multi.add(o);
                                }
                                many = true;
                            }
                            self.state.dont_infer = true;
                            self.state.inferfrom = 0;
                            ListStep::ObjectList
                        }
                    } else {
                        self.state.words.wn -= 1;
                        ListStep::PassToken
                    }
                }

                ListStep::PassToken => {
                    if many {
                        self.state.multi_context = Some(token);
                        return Ok(TokenResult::Multiple);
                    }
                    let indef = self.state.indef;
                    if indef.mode && indef.kind & PLURAL_BIT != 0 && indef.wanted < ALL_WANTED && indef.wanted > 1 {
                        self.state.multi_had = 1;
                        self.state.multi_wanted = indef.wanted;
                        self.state.etype = ParseErrorKind::TooFew;
                        ListStep::FailToken
                    } else {
                        return Ok(match single {
                            Some(o) => TokenResult::Object(o),
                            None => TokenResult::Fail,
                        });
                    }
                }

                ListStep::FailToken => {
                    // "six" may have been part of a name rather than a count
                    if self.state.allow_plurals && self.state.indef.guess_p {
                        self.state.allow_plurals = false;
                        self.state.words.wn = desc_wn;
                        ListStep::TryAgain
                    } else {
                        return Ok(TokenResult::Fail);
                    }
                }
            };
        }
    }

    /// Add to or take from the multiple-object list, as "and" or "but"
    /// asks.
    fn merge(&mut self, obj: ObjectId, and_parity: bool) {
        if and_parity {
            self.state.multi.add(obj);
        } else if self.state.multi.sub(obj).is_err() {
            ptrace!(self, 3, "  [{} was not in the list]", the_name(&self.world, obj));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParserConfig;
    use crate::console::ScriptedConsole;
    use crate::parser::Param;
    use crate::object_tree::{ObjectKind, ObjectTree};

    fn world() -> ObjectTree {
        let mut tree = ObjectTree::new();
        let room = tree.add("Lab", &["lab"], ObjectKind::Room);
        let me = tree.add("yourself", &["me"], ObjectKind::Person { female: false });
        tree.move_to(me, room);
        tree.set_player(me);
        tree.set_location(room);
        let red = tree.add("red ball", &["red", "ball"], ObjectKind::Item);
        let cup = tree.add("cup", &["cup"], ObjectKind::Item);
        let box_ = tree.add("box", &["box"], ObjectKind::Container { open: true });
        tree.move_to(red, room);
        tree.move_to(cup, room);
        tree.move_to(box_, room);
        tree
    }

    /// A parser with `line` read and the marker on word 2.
    fn parser(line: &str) -> Parser<ObjectTree, ScriptedConsole> {
        let mut p = Parser::standard(world(), ScriptedConsole::new(&[line]), ParserConfig::default()).unwrap();
        p.read_command().unwrap();
        let location = p.world().location().unwrap();
        p.state.actors_location = location;
        p.state.words.wn = 2;
        p.state.pcount = 1;
        p
    }

    fn find(p: &Parser<ObjectTree, ScriptedConsole>, name: &str) -> ObjectId {
        p.world().find(name).unwrap()
    }

    #[test]
    fn test_list_with_and_but() {
        let mut p = parser("take ball and cup");
        let result = p.parse_elementary(ElementaryToken::Multi, 0).unwrap();
        assert_eq!(result, TokenResult::Multiple);
        let (red, cup) = (find(&p, "red ball"), find(&p, "cup"));
        assert_eq!(p.state.multi.objects(), &[red, cup]);
        assert_eq!(p.state.multi_context, Some(ElementaryToken::Multi));
        assert_eq!(p.state.words.wn, 5);
    }

    #[test]
    fn test_connective_refused_for_single_noun() {
        let mut p = parser("examine ball and cup");
        let result = p.parse_elementary(ElementaryToken::Noun, 0).unwrap();
        assert_eq!(result, TokenResult::Fail);
        assert_eq!(p.state.etype, ParseErrorKind::Multi);
    }

    #[test]
    fn test_unset_pronoun_is_vague() {
        let mut p = parser("take it");
        let result = p.parse_elementary(ElementaryToken::Noun, 0).unwrap();
        assert_eq!(result, TokenResult::Fail);
        assert_eq!(p.state.etype, ParseErrorKind::Vague);
    }

    #[test]
    fn test_held_allows_an_implicit_take() {
        let mut p = parser("eat cup");
        let cup = find(&p, "cup");
        let result = p.parse_elementary(ElementaryToken::Held, 0).unwrap();
        assert_eq!(result, TokenResult::Object(cup));
        assert_eq!(p.state.not_holding, Some(cup));

        let mut q = parser("eat cup");
        q.state.notheld_mode = true;
        let result = q.parse_elementary(ElementaryToken::Held, 0).unwrap();
        assert_eq!(result, TokenResult::Fail);
        assert_eq!(q.state.etype, ParseErrorKind::NotHeld);
    }

    #[test]
    fn test_number_and_special() {
        let mut p = parser("dial lots");
        assert_eq!(
            p.parse_elementary(ElementaryToken::Number, 0).unwrap(),
            TokenResult::Fail
        );
        assert_eq!(p.state.etype, ParseErrorKind::Number);

        let mut q = parser("dial three");
        assert_eq!(
            q.parse_elementary(ElementaryToken::Number, 0).unwrap(),
            TokenResult::Number(Special::Number(3))
        );

        let mut r = parser("say cup");
        let cup_word = r.dictionary().lookup("cup");
        assert_eq!(
            r.parse_elementary(ElementaryToken::Special, 0).unwrap(),
            TokenResult::Number(Special::Word(cup_word))
        );
        assert_eq!(r.state.special_word, cup_word);
    }

    fn line(p: &mut Parser<ObjectTree, ScriptedConsole>, text: &str) {
        let parsed = p.grammar.parse_line(text).unwrap();
        p.state.line = parsed.tokens;
    }

    #[test]
    fn test_preposition_chain() {
        let mut p = parser("put ball into box");
        line(&mut p, "multiexcept 'in'/'into'/'inside' noun -> Insert");
        let into = p.dictionary().lookup("into");
        let on = p.dictionary().lookup("on");
        assert!(p.preposition_chain(into, 1));
        assert!(!p.preposition_chain(on, 1));
        assert!(!p.preposition_chain(into, 4));

        p.state.words.wn = 3;
        p.state.pcount = 2;
        let token = p.state.line[1];
        assert_eq!(p.parse_token(token, 1).unwrap(), TokenResult::Preposition);
        let second = p.state.line[2];
        assert_eq!(p.parse_token(second, 2).unwrap(), TokenResult::Preposition);
    }

    #[test]
    fn test_preposition_inferred_at_end() {
        let mut p = parser("put ball");
        line(&mut p, "multiexcept 'in' noun -> Insert");
        p.state.params_wanted = 2;
        p.state.results.push(Param::Object(find(&p, "red ball")));
        p.state.words.wn = 3;
        p.state.pcount = 2;
        let token = p.state.line[1];
        assert_eq!(p.parse_token(token, 1).unwrap(), TokenResult::Preposition);
        assert_eq!(p.state.inferfrom, 2);
        let in_word = p.dictionary().lookup("in");
        assert_eq!(p.state.pattern[2], PatternEntry::Preposition(in_word));
    }

    #[test]
    fn test_topic_runs_to_preposition() {
        let mut p = parser("ask me about the red ball please");
        line(&mut p, "creature 'about' topic -> Ask");
        p.state.action_to_be = Some(actions::ASK);
        p.state.words.wn = 4;
        let result = p.parse_topic(2);
        let red = p.dictionary().lookup("red");
        assert_eq!(result, TokenResult::Number(Special::Word(red)));
        assert_eq!(p.state.consult_from, 4);
        assert_eq!(p.state.consult_words, 4);
        assert_eq!(p.state.words.wn, 8);
    }
}

//! Trying the grammar lines of a verb
//!
//! Each line is matched token by token from the word after the verb. The
//! first line to consume the whole command (or stop at "then" or a comma)
//! wins. When every line fails, the most specific error any of them found
//! is the one reported.

use super::{Command, Flow, NounResult, Param, Parser, PatternEntry, ScopeReason, TokenFilter, TokenResult};
use crate::actions::{self, Action};
use crate::console::Console;
use crate::error::{ParseErrorKind, ParserError};
use crate::grammar::{ElementaryToken, GrammarLine};
use crate::messages::{the_name, Message};
use crate::world::{ObjectId, WorldModel};

impl<W: WorldModel, C: Console> Parser<W, C> {
    pub(super) fn match_lines(&mut self, lines: &[GrammarLine]) -> Result<Flow, ParserError> {
        ptrace!(self, 1, "[Parsing for the verb '{}' ({} lines)]", self.verb_text(), lines.len());
        self.state.best_etype = ParseErrorKind::Stuck;
        self.state.nextbest_etype = ParseErrorKind::Stuck;
        self.state.pronoun_word = None;
        self.state.pronoun_obj = None;

        for (n, line) in lines.iter().enumerate() {
            ptrace!(self, 1, "[line {} {}]", n, self.grammar.describe_line(line));
            self.state.line = line.tokens.clone();
            self.state.action_to_be = Some(line.action);
            self.state.action_reversed = line.reversed;
            self.state.params_wanted = line.params_wanted();
            self.reset_line();
            self.state.multi_context = None;

            if let Some(flow) = self.look_ahead()? {
                return Ok(flow);
            }

            let takes_multi = line
                .tokens
                .iter()
                .any(|t| t.elementary() == Some(ElementaryToken::Multi));
            self.state.take_all_rule =
                if takes_multi && self.state.params_wanted == 1 && line.action == actions::TAKE {
                    1
                } else {
                    0
                };

            // Outside code may have run during the look-ahead
            self.reset_line();

            if let Some(flow) = self.match_tokens(line.action)? {
                return Ok(flow);
            }

            let etype = self.state.etype;
            ptrace!(self, 2, " [line {} failed with error {}]", n, etype);
            if etype > self.state.best_etype {
                self.state.best_etype = etype;
            }
            if etype != ParseErrorKind::AskScope && etype > self.state.nextbest_etype {
                self.state.nextbest_etype = etype;
            }
            // "take all" with nothing to take
            if self.state.take_all_rule == 2 && etype == ParseErrorKind::Nothing {
                break;
            }
        }
        Ok(Flow::GiveError)
    }

    fn reset_line(&mut self) {
        let state = &mut self.state;
        state.not_holding = None;
        state.inferfrom = 0;
        state.results.clear();
        state.pattern.clear();
        state.special_word = None;
        state.multi.clear();
        state.multi_wanted = 0;
        state.etype = ParseErrorKind::Stuck;
        state.words.wn = state.verb_wordnum + 1;
    }

    /// "put all in the box": find the box before matching "all", so that
    /// "all" can leave it out.
    fn look_ahead(&mut self) -> Result<Option<Flow>, ParserError> {
        self.state.advance_warning = None;
        self.state.indef.mode = false;
        let line = self.state.line.clone();

        let mut params = 0;
        for (p, token) in line.iter().enumerate() {
            self.state.scope_token = None;
            if !token.is_preposition() {
                params += 1;
            }
            let e = token.elementary();
            if params != 1
                || !matches!(e, Some(ElementaryToken::MultiExcept) | Some(ElementaryToken::MultiInside))
            {
                continue;
            }

            ptrace!(self, 2, " [Trying look-ahead]");
            let mut q = p + 1;
            if line.get(q).map_or(false, |t| t.is_preposition()) {
                while line.get(q).map_or(false, |t| t.is_preposition()) {
                    q += 1;
                }
                if line.get(q).and_then(|t| t.elementary()) == Some(ElementaryToken::Noun) {
                    let prepositions: Vec<_> = line[p + 1..q].iter().filter_map(|t| t.preposition()).collect();
                    let actor = self.state.actor;
                    let location = self.state.actors_location;
                    self.state.token_filter = TokenFilter::None;
                    self.state.lookahead_end = q + 1 >= line.len();
                    self.state.pcount = q + 1;
                    while self.state.words.wn <= self.state.words.num_words() {
                        match self.state.words.next_word() {
                            Some(w) if prepositions.contains(&w) => {}
                            _ => continue,
                        }
                        match self.noun_domain(Some(location), Some(actor), Some(ElementaryToken::Noun))? {
                            NounResult::Reparse => {
                                ptrace!(self, 2, " [Advanced to \"noun\" token: re-parse request]");
                                return Ok(Some(Flow::ReParse));
                            }
                            NounResult::Object(o) => {
                                ptrace!(self, 2, " [Advanced to \"noun\" token: {}]", the_name(&self.world, o));
                                self.state.advance_warning = Some(o);
                            }
                            NounResult::Multiple => {
                                ptrace!(self, 2, " [Advanced to \"noun\" token: but multiple found]");
                            }
                            NounResult::Nothing => {
                                ptrace!(self, 2, " [Advanced to \"noun\" token: error {}]", self.state.etype);
                            }
                        }
                    }
                }
            }
            break;
        }
        Ok(None)
    }

    /// Match every token of the current line. `None` if the line failed,
    /// leaving the reason in `etype`.
    fn match_tokens(&mut self, action: Action) -> Result<Option<Flow>, ParserError> {
        let line = self.state.line.clone();
        let mut pcount = 1;
        loop {
            self.state.pcount = pcount;
            self.state.set_pattern(pcount, PatternEntry::Null);
            self.state.scope_token = None;

            let token = match line.get(pcount - 1) {
                Some(t) => *t,
                None => return self.line_matched(action),
            };
            self.state.lookahead_end = pcount >= line.len();
            ptrace!(
                self,
                2,
                " [line token {} word {} : {}]",
                pcount,
                self.state.words.wn,
                self.grammar.describe_token(&token)
            );

            self.state.scope_reason = ScopeReason::Parsing;
            let result = self.parse_token(token, pcount - 1)?;
            self.state.scope_reason = ScopeReason::Parsing;

            let accepted = match result {
                TokenResult::Reparse => {
                    ptrace!(self, 3, "  [token resulted in re-parse request]");
                    return Ok(Some(Flow::ReParse));
                }
                TokenResult::Fail => false,
                TokenResult::Preposition => {
                    if !token.is_preposition() && token.elementary() != Some(ElementaryToken::Topic) {
                        self.state.params_wanted = self.state.params_wanted.saturating_sub(1);
                    }
                    true
                }
                TokenResult::Number(value) => {
                    self.state.results.push(Param::Number(value));
                    self.state.set_pattern(pcount, PatternEntry::Number);
                    true
                }
                TokenResult::Multiple => {
                    self.state.results.push(Param::Multiple);
                    self.state.set_pattern(pcount, PatternEntry::Multiple);
                    true
                }
                TokenResult::Object(o) => {
                    self.state.results.push(Param::Object(o));
                    self.state.set_pattern(pcount, PatternEntry::Object(o));
                    true
                }
            };
            if !accepted {
                ptrace!(self, 3, "  [token resulted in failure with error type {}]", self.state.etype);
                return Ok(None);
            }
            ptrace!(self, 3, "  [token resulted in success]");
            pcount += 1;
        }
    }

    /// Every token matched: check what is left over and build the command.
    fn line_matched(&mut self, action: Action) -> Result<Option<Flow>, ParserError> {
        if self.state.words.wn <= self.state.words.num_words() {
            let word = self.state.words.next_word();
            if self.lexicon.is_then_or_comma(word) {
                self.state.held_back_mode = true;
                self.state.hb_wn = self.state.words.wn - 1;
            } else {
                self.state.pattern2 = self.state.pattern.clone();
                self.state.pcount2 = self.state.pcount;
                self.state.etype = ParseErrorKind::UpTo;
                return Ok(None);
            }
        }

        let results = self.state.results.clone();
        if results.first() == Some(&Param::Multiple) {
            let second = results.get(1).and_then(Param::object);
            if let Some(e) = self.revise_multi(second) {
                self.state.etype = e;
                return Ok(None);
            }
        }
        if results.get(1) == Some(&Param::Multiple) {
            let first = results.first().and_then(Param::object);
            if let Some(e) = self.revise_multi(first) {
                self.state.etype = e;
                return Ok(None);
            }
        }

        let actor = self.state.actor;
        if self.state.take_all_rule == 2 && results.first() == Some(&Param::Object(actor)) {
            self.state.best_etype = ParseErrorKind::Nothing;
            return Ok(Some(Flow::GiveError));
        }

        ptrace!(self, 1, "[Line successfully parsed]");
        self.state.oops_from = 0;

        if self.state.inferfrom != 0 {
            let inferred = self.print_command(self.state.inferfrom);
            self.print(&format!("({})\n", inferred))?;
        }

        let mut params = results;
        if self.state.action_reversed && params.len() == 2 {
            params.swap(0, 1);
        }
        if let Some(Param::Object(o)) = params.first() {
            self.state.pronouns.notice(*o, &self.world);
        }
        let cmd = self.command(action, params);

        let cmd = match self.state.not_holding {
            Some(o) if actor == self.world.player() => self.implicit_take(cmd, o)?,
            _ => cmd,
        };

        if self.state.held_back_mode {
            self.state.words.wn = self.state.hb_wn;
            return Ok(Some(Flow::LookForMore(cmd)));
        }
        Ok(Some(Flow::Done(cmd)))
    }

    /// Keep `cmd` for the next call and ask for `obj` to be taken first.
    fn implicit_take(&mut self, cmd: Command, obj: ObjectId) -> Result<Command, ParserError> {
        self.state.notheld_mode = true;
        self.state.kept = Some(cmd);
        let name = the_name(&self.world, obj);
        self.say_with(Message::FirstTaking, &[("the", name.as_str())])?;

        let mut take = self.command(actions::TAKE, vec![Param::Object(obj)]);
        take.multiple.clear();
        take.too_many = false;
        Ok(take)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParserConfig;
    use crate::console::ScriptedConsole;
    use crate::object_tree::{ObjectKind, ObjectTree};
    use crate::world::{Attribute, ObjectId};

    struct Lab {
        tree: ObjectTree,
        me: ObjectId,
        room: ObjectId,
    }

    fn lab() -> Lab {
        let mut tree = ObjectTree::new();
        let room = tree.add("Lab", &["lab"], ObjectKind::Room);
        let me = tree.add("yourself", &["me", "self"], ObjectKind::Person { female: false });
        tree.give(me, Attribute::Concealed);
        tree.move_to(me, room);
        tree.set_player(me);
        tree.set_location(room);
        Lab { tree, me, room }
    }

    fn parser(tree: ObjectTree, lines: &[&str]) -> Parser<ObjectTree, ScriptedConsole> {
        Parser::standard(tree, ScriptedConsole::new(lines), ParserConfig::default()).unwrap()
    }

    #[test]
    fn test_put_ball_in_box() {
        let mut lab = lab();
        let ball = lab.tree.add("ball", &["ball"], ObjectKind::Item);
        let box_ = lab.tree.add("box", &["box"], ObjectKind::Container { open: true });
        lab.tree.move_to(ball, lab.me);
        lab.tree.move_to(box_, lab.room);
        let mut p = parser(lab.tree, &["put ball in box"]);
        let cmd = p.parse_input().unwrap();
        assert_eq!(cmd.action, actions::INSERT);
        assert_eq!(cmd.params, vec![Param::Object(ball), Param::Object(box_)]);
    }

    #[test]
    fn test_junk_after_command_is_up_to() {
        let mut lab = lab();
        let ball = lab.tree.add("ball", &["ball"], ObjectKind::Item);
        lab.tree.move_to(ball, lab.room);
        let mut p = parser(lab.tree, &["take ball quickly", "look"]);
        p.parse_input().unwrap();
        assert_eq!(
            p.console().output_lines(),
            vec!["I only understood you as far as wanting to take the ball."]
        );
    }

    #[test]
    fn test_then_holds_back_the_rest() {
        let mut lab = lab();
        let ball = lab.tree.add("ball", &["ball"], ObjectKind::Item);
        lab.tree.move_to(ball, lab.room);
        let mut p = parser(lab.tree, &["take ball then look"]);
        let first = p.parse_input().unwrap();
        assert_eq!(first.action, actions::TAKE);
        assert!(p.held_back());
        let second = p.parse_input().unwrap();
        assert_eq!(second.action, actions::LOOK);
        assert!(!p.held_back());
    }

    #[test]
    fn test_implicit_take_keeps_the_command() {
        let mut lab = lab();
        let apple = lab.tree.add("apple", &["apple"], ObjectKind::Item);
        lab.tree.give(apple, Attribute::Edible);
        lab.tree.move_to(apple, lab.room);
        let mut p = parser(lab.tree, &["eat apple"]);
        let take = p.parse_input().unwrap();
        assert_eq!(take.action, actions::TAKE);
        assert_eq!(take.noun(), Some(apple));
        assert!(p.not_held_pending());
        assert_eq!(p.console().output_lines(), vec!["(first taking the apple)"]);

        let eat = p.parse_input().unwrap();
        assert_eq!(eat.action, actions::EAT);
        assert_eq!(eat.noun(), Some(apple));
        assert!(!p.not_held_pending());
    }

    #[test]
    fn test_take_all_with_nothing_to_take() {
        let lab = lab();
        let mut p = parser(lab.tree, &["take all", "look"]);
        p.parse_input().unwrap();
        assert_eq!(
            p.console().output_lines(),
            vec!["Nothing to do!"]
        );
    }

    #[test]
    fn test_take_all_except() {
        let mut lab = lab();
        let ball = lab.tree.add("ball", &["ball"], ObjectKind::Item);
        let cup = lab.tree.add("cup", &["cup"], ObjectKind::Item);
        lab.tree.move_to(ball, lab.room);
        lab.tree.move_to(cup, lab.room);
        let mut p = parser(lab.tree, &["take all but cup"]);
        let cmd = p.parse_input().unwrap();
        assert_eq!(cmd.action, actions::TAKE);
        assert_eq!(cmd.params, vec![Param::Multiple]);
        assert_eq!(cmd.multiple, vec![ball]);
    }

    #[test]
    fn test_look_ahead_excludes_the_container() {
        let mut lab = lab();
        let ball = lab.tree.add("ball", &["ball"], ObjectKind::Item);
        let box_ = lab.tree.add("box", &["box"], ObjectKind::Container { open: true });
        let coin = lab.tree.add("coin", &["coin"], ObjectKind::Item);
        lab.tree.move_to(ball, lab.me);
        lab.tree.move_to(coin, lab.me);
        lab.tree.move_to(box_, lab.me);
        let mut p = parser(lab.tree, &["put all in box"]);
        let cmd = p.parse_input().unwrap();
        assert_eq!(cmd.action, actions::INSERT);
        let mut multiple = cmd.multiple.clone();
        multiple.sort();
        assert_eq!(multiple, vec![ball, coin]);
        assert_eq!(cmd.second(), Some(box_));
    }

    #[test]
    fn test_inference_is_announced() {
        let mut lab = lab();
        let ball = lab.tree.add("ball", &["ball"], ObjectKind::Item);
        lab.tree.move_to(ball, lab.room);
        let mut p = parser(lab.tree, &["take"]);
        let cmd = p.parse_input().unwrap();
        assert_eq!(cmd.noun(), Some(ball));
        assert_eq!(p.console().output_lines(), vec!["(the ball)"]);
    }
}

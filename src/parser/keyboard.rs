//! Reading input lines for the parser
//!
//! Fresh commands go into the main buffer, where "oops" can correct a word
//! of the previous line. Answers to the parser's own questions are read
//! into a separate buffer and spliced in by the caller.

use super::Parser;
use crate::console::{Console, PromptKind};
use crate::error::ParserError;
use crate::messages::Message;
use crate::tokenizer::{parse_digits, tokenise, InputBuffer, WordStream};
use crate::world::WorldModel;
use log::debug;

impl<W: WorldModel, C: Console> Parser<W, C> {
    /// Read a command into the main buffer and tokenise it.
    pub(crate) fn read_command(&mut self) -> Result<(), ParserError> {
        self.state.oops_workspace = self.state.buffer.clone();
        loop {
            let line = self.read_line(PromptKind::Command)?;
            self.state.buffer.set(&line);
            self.retokenise();

            let num = self.state.words.num_words();
            if num == 0 {
                self.say(Message::Pardon)?;
                continue;
            }
            if !self.lexicon.is_oops(self.state.words.dict_at(1)) {
                return Ok(());
            }

            if self.state.oops_from == 0 {
                self.say(Message::CantCorrect)?;
                continue;
            }
            if num == 1 {
                self.say(Message::ThinkNothing)?;
                continue;
            }
            if num > 2 {
                self.say(Message::OopsOneWord)?;
                continue;
            }

            let replacement = self.state.words.text_at(2).to_string();
            self.state.buffer = self.state.oops_workspace.clone();
            self.retokenise();
            let (start, len) = match self.state.words.word(self.state.oops_from) {
                Some(w) => (w.start, w.len),
                None => {
                    self.say(Message::CantCorrect)?;
                    continue;
                }
            };
            let padded = format!("{:<width$}", replacement, width = len);
            self.state.buffer.replace_range(start, start + len, &padded);
            self.retokenise();
            debug!(
                "oops: word {} now '{}', line \"{}\"",
                self.state.oops_from,
                replacement,
                self.state.buffer.as_str()
            );
            return Ok(());
        }
    }

    /// Read the answer to a question. Empty answers are refused.
    pub(crate) fn read_answer(&mut self) -> Result<(InputBuffer, WordStream), ParserError> {
        loop {
            let line = self.read_line(PromptKind::Question)?;
            let mut answer = InputBuffer::new(self.config.buffer_capacity);
            answer.set(&line);
            let words = WordStream::new(tokenise(
                answer.as_str(),
                self.grammar.dictionary(),
                self.config.max_words,
            ));
            if words.num_words() == 0 {
                self.say(Message::Pardon)?;
                continue;
            }
            return Ok((answer, words));
        }
    }

    fn read_line(&mut self, kind: PromptKind) -> Result<String, ParserError> {
        let prompt = self.messages.text(Message::Prompt).to_string();
        self.console.prompt(&prompt)?;
        match self.console.read_line(kind)? {
            Some(line) => Ok(line),
            None => Err(ParserError::InputClosed),
        }
    }

    /// Rebuild the word stream from the main buffer, with the marker at 1.
    pub(crate) fn retokenise(&mut self) {
        let words = tokenise(
            self.state.buffer.as_str(),
            self.grammar.dictionary(),
            self.config.max_words,
        );
        self.state.words = WordStream::new(words);
    }

    /// Word `n` as a number: a number word, then the game's own number
    /// parser, then plain digits.
    pub(crate) fn try_number(&mut self, n: usize) -> Option<i32> {
        if n == 0 || n > self.state.words.num_words() {
            return None;
        }
        if let Some(v) = self.lexicon.number_word(self.state.words.dict_at(n)) {
            return Some(v);
        }
        let text = self.state.words.text_at(n).to_string();
        if let Some(v) = self.hooks.parse_number(&text) {
            return Some(v);
        }
        parse_digits(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParserConfig;
    use crate::console::ScriptedConsole;
    use crate::object_tree::{ObjectKind, ObjectTree};
    use crate::routines::GameHooks;

    fn parser(lines: &[&str]) -> Parser<ObjectTree, ScriptedConsole> {
        let mut tree = ObjectTree::new();
        let room = tree.add("Lab", &["lab"], ObjectKind::Room);
        let me = tree.add("yourself", &["me"], ObjectKind::Person { female: false });
        tree.move_to(me, room);
        tree.set_player(me);
        tree.set_location(room);
        Parser::standard(tree, ScriptedConsole::new(lines), ParserConfig::default()).unwrap()
    }

    #[test]
    fn test_oops_replaces_marked_word() {
        let mut p = parser(&["take bal", "oops ball"]);
        p.read_command().unwrap();
        p.state.oops_from = 2;
        p.read_command().unwrap();
        assert_eq!(p.state.buffer.as_str(), "take ball");
        assert_eq!(p.state.words.num_words(), 2);
    }

    #[test]
    fn test_oops_pads_a_shorter_replacement() {
        let mut p = parser(&["take ballz now", "oops box"]);
        p.read_command().unwrap();
        p.state.oops_from = 2;
        p.read_command().unwrap();
        assert_eq!(p.state.buffer.as_str(), "take box   now");
        assert_eq!(p.state.words.text_at(3), "now");
    }

    #[test]
    fn test_oops_refusals() {
        let mut p = parser(&["oops ball", "look"]);
        p.read_command().unwrap();
        assert_eq!(
            p.console().output_lines(),
            vec!["Sorry, that can't be corrected."]
        );

        let mut q = parser(&["look", "oops", "oops big ball", "look"]);
        q.read_command().unwrap();
        q.state.oops_from = 1;
        q.read_command().unwrap();
        assert_eq!(
            q.console().output_lines(),
            vec![
                "Think nothing of it.",
                "\"Oops\" can only correct a single word."
            ]
        );
        assert_eq!(q.state.buffer.as_str(), "look");
    }

    struct Coordinates;

    impl GameHooks for Coordinates {
        fn parse_number(&mut self, text: &str) -> Option<i32> {
            let rest = text.strip_prefix('x')?;
            rest.parse::<i32>().ok().map(|n| n * 100)
        }
    }

    #[test]
    fn test_try_number_sources() {
        let mut p = parser(&["dial three x7 42 123456 fish"]);
        p.set_hooks(Box::new(Coordinates));
        p.read_command().unwrap();
        assert_eq!(p.try_number(2), Some(3));
        assert_eq!(p.try_number(3), Some(700));
        assert_eq!(p.try_number(4), Some(42));
        assert_eq!(p.try_number(5), Some(10000));
        assert_eq!(p.try_number(6), None);
        assert_eq!(p.try_number(7), None);
    }

    #[test]
    fn test_empty_answer_is_refused() {
        let mut p = parser(&["  ", "the red one"]);
        let (answer, words) = p.read_answer().unwrap();
        assert_eq!(answer.as_str(), "the red one");
        assert_eq!(words.num_words(), 3);
        assert_eq!(p.console().output_lines(), vec!["I beg your pardon?"]);
    }
}

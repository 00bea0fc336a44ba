// Grammar tables
//
// A verb owns a list of grammar lines; each line is a sequence of tokens and
// the action it produces. Lines are written in Inform's textual form:
//
//     "multiexcept 'in'/'into' noun -> Insert"
//     "creature held -> Give reverse"
//
// The grammar also owns the dictionary, since verb words and prepositions
// enter it as the grammar is built, and the registries of routines that
// lines refer to by name.

use crate::actions::{Action, ActionTable};
use crate::dictionary::{DictWord, Dictionary, PREPOSITION};
use crate::error::GrammarError;
use crate::routines::{a_direction, GeneralParser, NounFilter, ScopeRoutine};
use crate::world::Attribute;
use indexmap::IndexMap;
use log::debug;
use std::fmt;

/// Most tokens a line may carry, not counting the end marker.
pub const MAX_LINE_TOKENS: usize = 31;

/// Index into one of the routine registries.
pub type RoutineId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementaryToken {
    Noun,
    Held,
    Multi,
    MultiHeld,
    MultiExcept,
    MultiInside,
    Creature,
    Special,
    Number,
    Topic,
}

impl ElementaryToken {
    pub fn allows_multiple(self) -> bool {
        matches!(
            self,
            ElementaryToken::Multi
                | ElementaryToken::MultiHeld
                | ElementaryToken::MultiExcept
                | ElementaryToken::MultiInside
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            ElementaryToken::Noun => "noun",
            ElementaryToken::Held => "held",
            ElementaryToken::Multi => "multi",
            ElementaryToken::MultiHeld => "multiheld",
            ElementaryToken::MultiExcept => "multiexcept",
            ElementaryToken::MultiInside => "multiinside",
            ElementaryToken::Creature => "creature",
            ElementaryToken::Special => "special",
            ElementaryToken::Number => "number",
            ElementaryToken::Topic => "topic",
        }
    }

    pub fn from_name(name: &str) -> Option<ElementaryToken> {
        let token = match name {
            "noun" => ElementaryToken::Noun,
            "held" => ElementaryToken::Held,
            "multi" => ElementaryToken::Multi,
            "multiheld" => ElementaryToken::MultiHeld,
            "multiexcept" => ElementaryToken::MultiExcept,
            "multiinside" => ElementaryToken::MultiInside,
            "creature" => ElementaryToken::Creature,
            "special" => ElementaryToken::Special,
            "number" => ElementaryToken::Number,
            "topic" => ElementaryToken::Topic,
            _ => return None,
        };
        Some(token)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Elementary(ElementaryToken),
    Preposition(DictWord),
    AttrFilter(Attribute),
    RoutineFilter(RoutineId),
    Scope(RoutineId),
    Gpr(RoutineId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineToken {
    pub kind: TokenKind,
    /// First of a run of alternative prepositions
    pub chain_first: bool,
    /// Second or later of a run of alternative prepositions
    pub chain_next: bool,
}

impl LineToken {
    pub fn new(kind: TokenKind) -> Self {
        LineToken {
            kind,
            chain_first: false,
            chain_next: false,
        }
    }

    pub fn is_preposition(&self) -> bool {
        matches!(self.kind, TokenKind::Preposition(_))
    }

    pub fn preposition(&self) -> Option<DictWord> {
        match self.kind {
            TokenKind::Preposition(w) => Some(w),
            _ => None,
        }
    }

    pub fn elementary(&self) -> Option<ElementaryToken> {
        match self.kind {
            TokenKind::Elementary(e) => Some(e),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrammarLine {
    pub tokens: Vec<LineToken>,
    pub action: Action,
    pub reversed: bool,
}

impl GrammarLine {
    /// Number of tokens that yield a parameter (everything but prepositions)
    pub fn params_wanted(&self) -> usize {
        self.tokens.iter().filter(|t| !t.is_preposition()).count()
    }
}

#[derive(Debug, Clone)]
pub struct Verb {
    pub words: Vec<String>,
    pub meta: bool,
    pub lines: Vec<GrammarLine>,
}

/// Where `extend` puts the new lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtendMode {
    First,
    Last,
    Replace,
}

pub struct Grammar {
    verbs: Vec<Verb>,
    dictionary: Dictionary,
    actions: ActionTable,
    filters: IndexMap<String, Box<dyn NounFilter>>,
    scopes: IndexMap<String, Box<dyn ScopeRoutine>>,
    parsers: IndexMap<String, Box<dyn GeneralParser>>,
}

impl fmt::Debug for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Grammar")
            .field("verbs", &self.verbs)
            .field("filters", &self.filters.keys().collect::<Vec<_>>())
            .field("scopes", &self.scopes.keys().collect::<Vec<_>>())
            .field("parsers", &self.parsers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Grammar {
    /// An empty grammar whose dictionary keeps `resolution` characters per word.
    pub fn new(resolution: usize) -> Grammar {
        let mut filters: IndexMap<String, Box<dyn NounFilter>> = IndexMap::new();
        filters.insert("ADirection".to_string(), Box::new(a_direction));
        Grammar {
            verbs: Vec::new(),
            dictionary: Dictionary::new(resolution),
            actions: ActionTable::new(),
            filters,
            scopes: IndexMap::new(),
            parsers: IndexMap::new(),
        }
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    pub fn dictionary_mut(&mut self) -> &mut Dictionary {
        &mut self.dictionary
    }

    pub fn actions(&self) -> &ActionTable {
        &self.actions
    }

    pub fn verbs(&self) -> &[Verb] {
        &self.verbs
    }

    pub fn register_filter(
        &mut self,
        name: &str,
        filter: Box<dyn NounFilter>,
    ) -> Result<RoutineId, GrammarError> {
        register(&mut self.filters, name, filter)
    }

    pub fn register_scope(
        &mut self,
        name: &str,
        routine: Box<dyn ScopeRoutine>,
    ) -> Result<RoutineId, GrammarError> {
        register(&mut self.scopes, name, routine)
    }

    pub fn register_parser(
        &mut self,
        name: &str,
        routine: Box<dyn GeneralParser>,
    ) -> Result<RoutineId, GrammarError> {
        register(&mut self.parsers, name, routine)
    }

    pub fn filter(&self, id: RoutineId) -> Option<&dyn NounFilter> {
        self.filters.get_index(id).map(|(_, f)| f.as_ref())
    }

    pub fn scope_routine(&self, id: RoutineId) -> Option<&dyn ScopeRoutine> {
        self.scopes.get_index(id).map(|(_, r)| r.as_ref())
    }

    pub fn general_parser(&self, id: RoutineId) -> Option<&dyn GeneralParser> {
        self.parsers.get_index(id).map(|(_, r)| r.as_ref())
    }

    /// Define a verb with its synonyms and grammar lines. Returns its index.
    pub fn verb(&mut self, words: &[&str], lines: &[&str]) -> Result<usize, GrammarError> {
        self.define(words, false, lines)
    }

    /// Define an out-of-world verb ("score", "quit").
    pub fn meta_verb(&mut self, words: &[&str], lines: &[&str]) -> Result<usize, GrammarError> {
        self.define(words, true, lines)
    }

    fn define(&mut self, words: &[&str], meta: bool, lines: &[&str]) -> Result<usize, GrammarError> {
        let parsed = lines
            .iter()
            .map(|l| self.parse_line(l))
            .collect::<Result<Vec<_>, _>>()?;

        let index = self.verbs.len();
        for w in words {
            self.dictionary.set_verb(w, index, meta);
        }
        debug!(
            "verb {:?}: {} line(s){}",
            words,
            parsed.len(),
            if meta { ", meta" } else { "" }
        );
        self.verbs.push(Verb {
            words: words.iter().map(|w| w.to_string()).collect(),
            meta,
            lines: parsed,
        });
        Ok(index)
    }

    /// Add lines to the verb that `word` already belongs to.
    pub fn extend(&mut self, word: &str, lines: &[&str], mode: ExtendMode) -> Result<(), GrammarError> {
        let index = self
            .dictionary
            .lookup(word)
            .and_then(|w| self.dictionary.verb_number(w))
            .ok_or_else(|| GrammarError::UnknownVerb(word.to_string()))?;
        let parsed = lines
            .iter()
            .map(|l| self.parse_line(l))
            .collect::<Result<Vec<_>, _>>()?;

        let verb = &mut self.verbs[index];
        match mode {
            ExtendMode::First => {
                let mut merged = parsed;
                merged.append(&mut verb.lines);
                verb.lines = merged;
            }
            ExtendMode::Last => verb.lines.extend(parsed),
            ExtendMode::Replace => verb.lines = parsed,
        }
        Ok(())
    }

    /// Grammar for a verb word, with the verb's meta flag.
    pub fn lines_for(&self, word: DictWord) -> Option<&Verb> {
        self.dictionary
            .verb_number(word)
            .and_then(|i| self.verbs.get(i))
    }

    /// Parse one line of grammar text.
    pub fn parse_line(&mut self, text: &str) -> Result<GrammarLine, GrammarError> {
        let (pattern, target) = text
            .split_once("->")
            .ok_or_else(|| GrammarError::MissingAction(text.to_string()))?;

        let mut target = target.split_whitespace();
        let action_name = target
            .next()
            .ok_or_else(|| GrammarError::MissingAction(text.to_string()))?;
        let reversed = match target.next() {
            None => false,
            Some("reverse") => true,
            Some(other) => {
                return Err(GrammarError::UnknownToken(other.to_string(), text.to_string()))
            }
        };
        let action = self.actions.action(action_name);

        let mut tokens = Vec::new();
        for piece in pattern.split_whitespace() {
            if piece == "*" {
                continue;
            }
            if piece.starts_with('\'') {
                let alternatives: Vec<&str> = piece.split('/').collect();
                let chained = alternatives.len() > 1;
                for (i, alt) in alternatives.iter().enumerate() {
                    let word = alt.trim_matches('\'');
                    if word.is_empty() {
                        return Err(GrammarError::EmptyPreposition(text.to_string()));
                    }
                    let w = self.dictionary.add(word, PREPOSITION);
                    tokens.push(LineToken {
                        kind: TokenKind::Preposition(w),
                        chain_first: chained && i == 0,
                        chain_next: chained && i > 0,
                    });
                }
                continue;
            }
            let kind = self.token_kind(piece, text)?;
            tokens.push(LineToken::new(kind));
        }

        if tokens.len() > MAX_LINE_TOKENS {
            return Err(GrammarError::TooManyTokens(text.to_string(), tokens.len()));
        }
        for (i, t) in tokens.iter().enumerate() {
            if t.elementary() == Some(ElementaryToken::Topic) {
                if let Some(next) = tokens.get(i + 1) {
                    if !next.is_preposition() {
                        return Err(GrammarError::TopicNotFollowedByPreposition(
                            text.to_string(),
                        ));
                    }
                }
            }
        }

        Ok(GrammarLine {
            tokens,
            action,
            reversed,
        })
    }

    fn token_kind(&self, piece: &str, line: &str) -> Result<TokenKind, GrammarError> {
        let unknown = || GrammarError::UnknownToken(piece.to_string(), line.to_string());

        if let Some(name) = piece.strip_prefix("noun=") {
            return self
                .filters
                .get_index_of(name)
                .map(TokenKind::RoutineFilter)
                .ok_or_else(unknown);
        }
        if let Some(name) = piece.strip_prefix("scope=") {
            return self
                .scopes
                .get_index_of(name)
                .map(TokenKind::Scope)
                .ok_or_else(unknown);
        }
        if let Some(e) = ElementaryToken::from_name(piece) {
            return Ok(TokenKind::Elementary(e));
        }
        if let Ok(attr) = piece.parse::<Attribute>() {
            return Ok(TokenKind::AttrFilter(attr));
        }
        self.parsers
            .get_index_of(piece)
            .map(TokenKind::Gpr)
            .ok_or_else(unknown)
    }

    /// A token written back in grammar-text form.
    pub fn describe_token(&self, token: &LineToken) -> String {
        match token.kind {
            TokenKind::Elementary(e) => e.name().to_string(),
            TokenKind::Preposition(w) => format!("'{}'", self.dictionary.text(w)),
            TokenKind::AttrFilter(a) => a.name().to_string(),
            TokenKind::RoutineFilter(id) => match self.filters.get_index(id) {
                Some((name, _)) => format!("noun={}", name),
                None => format!("noun=#{}", id),
            },
            TokenKind::Scope(id) => match self.scopes.get_index(id) {
                Some((name, _)) => format!("scope={}", name),
                None => format!("scope=#{}", id),
            },
            TokenKind::Gpr(id) => match self.parsers.get_index(id) {
                Some((name, _)) => name.clone(),
                None => format!("routine#{}", id),
            },
        }
    }

    /// A whole line written back in grammar-text form.
    pub fn describe_line(&self, line: &GrammarLine) -> String {
        let mut out = String::from("*");
        for t in &line.tokens {
            out.push(if t.chain_next { '/' } else { ' ' });
            out.push_str(&self.describe_token(t));
        }
        out.push_str(" -> ");
        out.push_str(self.actions.name(line.action).unwrap_or("?"));
        if line.reversed {
            out.push_str(" reverse");
        }
        out
    }
}

fn register<T: ?Sized>(
    table: &mut IndexMap<String, Box<T>>,
    name: &str,
    routine: Box<T>,
) -> Result<RoutineId, GrammarError> {
    if table.contains_key(name) {
        return Err(GrammarError::DuplicateRoutine(name.to_string()));
    }
    let (index, _) = table.insert_full(name.to_string(), routine);
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions;
    use crate::dictionary::{META, VERB};
    use crate::routines::{GprContext, GprResult};

    #[test]
    fn test_parse_line_with_alternatives() {
        let mut g = Grammar::new(9);
        let line = g.parse_line("* multiexcept 'in'/'into' noun -> Insert").unwrap();
        assert_eq!(line.action, actions::INSERT);
        assert_eq!(line.tokens.len(), 4);
        assert!(line.tokens[1].chain_first && !line.tokens[1].chain_next);
        assert!(line.tokens[2].chain_next && !line.tokens[2].chain_first);
        assert_eq!(line.params_wanted(), 2);
        let into = g.dictionary().lookup("into").unwrap();
        assert_eq!(line.tokens[2].preposition(), Some(into));
        assert_eq!(g.describe_line(&line), "* multiexcept 'in'/'into' noun -> Insert");
    }

    #[test]
    fn test_reverse_and_filters() {
        let mut g = Grammar::new(9);
        let line = g.parse_line("creature held -> Give reverse").unwrap();
        assert!(line.reversed);

        let line = g.parse_line("noun=ADirection -> Go").unwrap();
        assert_eq!(line.tokens[0].kind, TokenKind::RoutineFilter(0));

        let line = g.parse_line("animate -> Kiss").unwrap();
        assert_eq!(line.tokens[0].kind, TokenKind::AttrFilter(Attribute::Animate));
        assert_eq!(g.actions().name(line.action), Some("Kiss"));
    }

    #[test]
    fn test_line_errors() {
        let mut g = Grammar::new(9);
        assert!(matches!(
            g.parse_line("noun"),
            Err(GrammarError::MissingAction(_))
        ));
        assert!(matches!(
            g.parse_line("frobnicate -> Take"),
            Err(GrammarError::UnknownToken(_, _))
        ));
        assert!(matches!(
            g.parse_line("topic noun -> Consult"),
            Err(GrammarError::TopicNotFollowedByPreposition(_))
        ));
        assert!(g.parse_line("'up' topic 'in' noun -> Consult").is_ok());
        assert!(g.parse_line("'about' topic -> Consult").is_ok());

        let long = format!("{} -> Take", vec!["noun"; 32].join(" "));
        assert!(matches!(
            g.parse_line(&long),
            Err(GrammarError::TooManyTokens(_, 32))
        ));
    }

    #[test]
    fn test_verbs_enter_dictionary() {
        let mut g = Grammar::new(9);
        let take = g.verb(&["take", "carry"], &["multi -> Take"]).unwrap();
        let score = g.meta_verb(&["score"], &["-> Score"]).unwrap();
        let d = g.dictionary();
        let carry = d.lookup("carry").unwrap();
        assert_eq!(d.verb_number(carry), Some(take));
        assert_eq!(d.flags(d.lookup("score").unwrap()) & (VERB | META), VERB | META);
        assert!(g.lines_for(carry).is_some());
        assert_eq!(score, 1);
    }

    #[test]
    fn test_extend_modes() {
        let mut g = Grammar::new(9);
        g.verb(&["push"], &["noun -> Push"]).unwrap();
        g.extend("push", &["noun 'to' noun -> PushDir"], ExtendMode::First)
            .unwrap();
        let push = g.dictionary().lookup("push").unwrap();
        assert_eq!(g.lines_for(push).unwrap().lines.len(), 2);
        assert_eq!(g.lines_for(push).unwrap().lines[0].tokens.len(), 3);

        g.extend("push", &["-> Wait"], ExtendMode::Replace).unwrap();
        assert_eq!(g.lines_for(push).unwrap().lines.len(), 1);

        assert!(matches!(
            g.extend("pull", &["-> Wait"], ExtendMode::Last),
            Err(GrammarError::UnknownVerb(_))
        ));
    }

    #[test]
    fn test_registered_parser_token() {
        let mut g = Grammar::new(9);
        let id = g
            .register_parser(
                "Colour",
                Box::new(|_ctx: &mut GprContext<'_>| GprResult::Preposition),
            )
            .unwrap();
        let line = g.parse_line("'paint' noun Colour -> Paint").unwrap();
        assert_eq!(line.tokens[2].kind, TokenKind::Gpr(id));
        assert!(g.general_parser(id).is_some());
        assert!(matches!(
            g.register_parser("Colour", Box::new(|_ctx: &mut GprContext<'_>| GprResult::Fail)),
            Err(GrammarError::DuplicateRoutine(_))
        ));
    }
}

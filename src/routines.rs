//! Extension points: grammar routines and game hooks
//!
//! Grammar lines can name three kinds of routine: noun filters
//! (`noun=Routine`), scope routines (`scope=Routine`) and general parsing
//! routines. Games supply them as trait objects registered with the
//! grammar. [`GameHooks`] collects the game-wide entry points the parser
//! consults, and [`Arbiter`] lets a game weigh in on disambiguation.
//!
//! Every method has a default that reproduces the library's behaviour when
//! the game provides nothing.

use crate::actions::Action;
use crate::dictionary::{DictWord, Dictionary};
use crate::error::ParseErrorKind;
use crate::grammar::ElementaryToken;
use crate::tokenizer::{InputBuffer, Next, Word, WordView};
use crate::world::{NameMatch, ObjectId, WorldModel};

/// A `noun=Routine` token filter.
pub trait NounFilter {
    fn accept(&self, obj: ObjectId, world: &dyn WorldModel) -> bool;
}

impl<F> NounFilter for F
where
    F: Fn(ObjectId, &dyn WorldModel) -> bool,
{
    fn accept(&self, obj: ObjectId, world: &dyn WorldModel) -> bool {
        self(obj, world)
    }
}

/// Objects a scope routine or the `in_scope` hook wants in scope.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeRequest {
    entries: Vec<ScopeEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeEntry {
    /// The object itself (and its add-to-scope extras)
    Place(ObjectId),
    /// Everything inside the object, recursively where visible
    Within(ObjectId),
}

impl ScopeRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn place_in_scope(&mut self, obj: ObjectId) {
        self.entries.push(ScopeEntry::Place(obj));
    }

    pub fn scope_within(&mut self, obj: ObjectId) {
        self.entries.push(ScopeEntry::Within(obj));
    }

    pub fn entries(&self) -> &[ScopeEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A `scope=Routine` token.
pub trait ScopeRoutine {
    /// Whether the token may match several objects
    fn allows_multiple(&self) -> bool {
        false
    }

    /// Put objects in scope. Returning true replaces the usual scope
    /// entirely; false adds to it.
    fn place(&self, world: &dyn WorldModel, actor: ObjectId, request: &mut ScopeRequest) -> bool;

    /// Message to print when nothing in this scope matched. `None` leaves
    /// the parser to report its next best error.
    fn error(&self, _world: &dyn WorldModel) -> Option<String> {
        None
    }
}

/// What a general parsing routine decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GprResult {
    Fail,
    /// Accepted, with no value
    Preposition,
    Number(i32),
    Object(ObjectId),
    /// Accepted, adding these objects to the multiple-object list
    Multiple(Vec<ObjectId>),
    /// Parse this token as the given elementary token instead
    Token(ElementaryToken),
}

/// The word stream as seen by a general parsing routine.
pub struct GprContext<'a> {
    pub world: &'a dyn WorldModel,
    pub dictionary: &'a Dictionary,
    pub actor: ObjectId,
    pub action_to_be: Option<Action>,
    words: &'a [Word],
    /// Word marker, 1-based
    pub wn: usize,
}

impl<'a> GprContext<'a> {
    pub fn new(
        world: &'a dyn WorldModel,
        dictionary: &'a Dictionary,
        words: &'a [Word],
        wn: usize,
        actor: ObjectId,
        action_to_be: Option<Action>,
    ) -> Self {
        GprContext {
            world,
            dictionary,
            actor,
            action_to_be,
            words,
            wn,
        }
    }

    pub fn num_words(&self) -> usize {
        self.words.len()
    }

    fn word(&self, n: usize) -> Option<&'a Word> {
        n.checked_sub(1).and_then(|i| self.words.get(i))
    }

    pub fn next_word(&mut self) -> Option<DictWord> {
        let w = self.word(self.wn).and_then(|w| w.dict);
        self.wn += 1;
        w
    }

    pub fn next_word_stopped(&mut self) -> Next {
        if self.wn > self.words.len() {
            self.wn += 1;
            return Next::End;
        }
        Next::Word(self.next_word())
    }

    /// Text of the word at the marker, without moving it
    pub fn peek_text(&self) -> Option<&'a str> {
        self.word(self.wn).map(|w| w.text.as_str())
    }

    pub fn view(&self) -> WordView<'a> {
        let start = self.wn.saturating_sub(1).min(self.words.len());
        WordView::over(&self.words[start..])
    }
}

/// A general parsing routine, named as a bare token in a grammar line.
pub trait GeneralParser {
    fn parse(&self, ctx: &mut GprContext<'_>) -> GprResult;
}

impl<F> GeneralParser for F
where
    F: Fn(&mut GprContext<'_>) -> GprResult,
{
    fn parse(&self, ctx: &mut GprContext<'_>) -> GprResult {
        self(ctx)
    }
}

/// Outcome of consulting the actor's own grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrammarOverride {
    /// Parse the command as usual
    Continue,
    /// The actor has decided on an action outright
    Action {
        action: Action,
        noun: Option<ObjectId>,
        second: Option<ObjectId>,
    },
    /// Parse the whole command as though it followed this verb
    Verb(DictWord),
    /// As `Verb`, but fall back to the usual grammar if no line matches
    VerbThenUsual(DictWord),
}

/// How an arbiter feels about one candidate in an "all" list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    NoOpinion,
    Accept,
    Reject,
}

/// Game-supplied disambiguation preferences.
pub trait Arbiter {
    /// Extra preference for `obj`, multiplied by the choose-objects weight
    fn score(&mut self, _obj: ObjectId, _world: &dyn WorldModel) -> i32 {
        0
    }

    /// Whether `obj` belongs in a multiple-object list; `accepting` is what
    /// the parser would do left to itself.
    fn include(&mut self, _obj: ObjectId, _accepting: bool, _world: &dyn WorldModel) -> Choice {
        Choice::NoOpinion
    }
}

/// Game-wide entry points.
pub trait GameHooks {
    /// Called before every parse of a fresh or rewritten buffer. Return true
    /// if the buffer was changed.
    fn before_parsing(&mut self, _buffer: &mut InputBuffer) -> bool {
        false
    }

    /// The acting character's own grammar, consulted before the verb table
    fn actor_grammar(
        &mut self,
        _actor: ObjectId,
        _verb: Option<DictWord>,
        _dictionary: &Dictionary,
    ) -> GrammarOverride {
        GrammarOverride::Continue
    }

    /// Offered the first word when it is not a verb. Return a verb to use.
    fn unknown_verb(&mut self, _word: Option<DictWord>, _dictionary: &Dictionary) -> Option<DictWord> {
        None
    }

    /// Add to scope for `actor`. Returning true replaces the usual scope.
    fn in_scope(
        &mut self,
        _actor: ObjectId,
        _request: &mut ScopeRequest,
        _world: &dyn WorldModel,
    ) -> bool {
        false
    }

    /// Return true to suppress the library message for this error.
    fn parser_error(&mut self, _kind: ParseErrorKind) -> bool {
        false
    }

    /// Game-wide name matching, tried after any per-object name parser
    fn parse_noun(&mut self, _obj: ObjectId, _words: WordView<'_>) -> NameMatch {
        NameMatch::Default
    }

    /// Read an unusual number ("x45y12"). Tried before plain digits.
    fn parse_number(&mut self, _text: &str) -> Option<i32> {
        None
    }

    /// Printed form of a verb word when echoing a command back
    fn print_verb(&mut self, _word: DictWord, _text: &str) -> Option<String> {
        None
    }
}

/// Hooks that change nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultHooks;

impl GameHooks for DefaultHooks {}

/// Noun filter for `noun=ADirection`: only the compass directions.
pub fn a_direction(obj: ObjectId, world: &dyn WorldModel) -> bool {
    match world.compass() {
        Some(compass) => world.parent(obj) == Some(compass),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object_tree::{ObjectKind, ObjectTree};
    use crate::tokenizer::tokenise;

    #[test]
    fn test_closures_as_routines() {
        let mut tree = ObjectTree::new();
        let compass = tree.add_compass();
        let ball = tree.add("ball", &["ball"], ObjectKind::Item);
        let north = tree.children(compass)[0];

        let filter: Box<dyn NounFilter> = Box::new(a_direction);
        assert!(filter.accept(north, &tree));
        assert!(!filter.accept(ball, &tree));

        let mut dict = Dictionary::new(9);
        dict.add("xyzzy", 0);
        let words = tokenise("say xyzzy loudly", &dict, 15);
        let gpr: Box<dyn GeneralParser> = Box::new(|ctx: &mut GprContext<'_>| {
            if ctx.next_word() == ctx.dictionary.lookup("xyzzy") {
                GprResult::Number(42)
            } else {
                GprResult::Fail
            }
        });
        let mut ctx = GprContext::new(&tree, &dict, &words, 2, ball, None);
        assert_eq!(gpr.parse(&mut ctx), GprResult::Number(42));
        assert_eq!(ctx.wn, 3);
        assert_eq!(ctx.peek_text(), Some("loudly"));
        assert_eq!(ctx.next_word_stopped(), Next::Word(None));
        assert_eq!(ctx.next_word_stopped(), Next::End);
    }

    #[test]
    fn test_scope_request_keeps_order() {
        let mut req = ScopeRequest::new();
        assert!(req.is_empty());
        req.place_in_scope(ObjectId(3));
        req.scope_within(ObjectId(1));
        assert_eq!(
            req.entries(),
            &[ScopeEntry::Place(ObjectId(3)), ScopeEntry::Within(ObjectId(1))]
        );
    }
}

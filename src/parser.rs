//! The command parser
//!
//! [`Parser::parse_input`] reads a command from the console and returns it
//! resolved against the grammar and the world. The work is split across the
//! submodules, each adding an `impl` block:
//!
//! - `keyboard`: reading lines, "oops" corrections, numbers
//! - `lines`: trying each grammar line of a verb in turn
//! - `tokens`: matching one grammar token
//! - `descriptors`: articles, possessives, "all" and counts
//! - `nouns`: matching a noun phrase and asking which one was meant
//! - `scope`: deciding what the actor can refer to
//! - `adjudicate`: choosing between several matching objects
//!
//! Everything that survives between calls lives in [`ParserState`].

// Narrate one parsing stage when the trace level allows it.
macro_rules! ptrace {
    ($p:expr, $lvl:expr, $($arg:tt)*) => {
        if $p.config.trace_level >= $lvl {
            log::debug!(target: "inparse::trace", $($arg)*);
        }
    };
}

mod adjudicate;
mod descriptors;
mod keyboard;
mod lines;
mod nouns;
mod scope;
mod tokens;

use crate::actions::{self, Action};
use crate::config::ParserConfig;
use crate::console::Console;
use crate::dictionary::{DictWord, Dictionary, NOUN};
use crate::error::{GrammarError, ParseErrorKind, ParserError};
use crate::grammar::{ElementaryToken, Grammar, GrammarLine, LineToken, RoutineId};
use crate::match_list::MatchList;
use crate::messages::{the_name, LibraryMessages, Message};
use crate::multi::MultiList;
use crate::pronouns::PronounTable;
use crate::routines::{Arbiter, DefaultHooks, GameHooks, GrammarOverride};
use crate::standard_grammar::standard_grammar;
use crate::tokenizer::{InputBuffer, Next, WordStream};
use crate::vocabulary::Lexicon;
use crate::world::{Attribute, ObjectId, WorldModel};
use descriptors::Indef;
use indexmap::IndexSet;
use log::{debug, info, warn};

/// Value of a number or special token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Special {
    Number(i32),
    /// A word that was not a number, `None` if it was not in the dictionary
    Word(Option<DictWord>),
}

/// One parameter of a parsed command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Param {
    Object(ObjectId),
    /// Stands for every object in [`Command::multiple`]
    Multiple,
    Number(Special),
}

impl Param {
    pub fn object(&self) -> Option<ObjectId> {
        match self {
            Param::Object(o) => Some(*o),
            _ => None,
        }
    }
}

/// A fully resolved command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub action: Action,
    /// Zero to two parameters, in action order
    pub params: Vec<Param>,
    /// Who is to carry out the action
    pub actor: ObjectId,
    /// The verb is out of world ("score", "quit")
    pub meta: bool,
    /// The objects a [`Param::Multiple`] stands for
    pub multiple: Vec<ObjectId>,
    /// Some objects were left out of `multiple` because it was full
    pub too_many: bool,
    pub special_word: Option<DictWord>,
    /// First word of a topic, 0 if there was none
    pub consult_from: usize,
    pub consult_words: usize,
}

impl Command {
    pub fn noun(&self) -> Option<ObjectId> {
        self.params.first().and_then(Param::object)
    }

    pub fn second(&self) -> Option<ObjectId> {
        self.params.get(1).and_then(Param::object)
    }

    pub fn is_multiple(&self) -> bool {
        self.params.contains(&Param::Multiple)
    }
}

/// What was understood at each grammar token, for echoing a command back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PatternEntry {
    Null,
    Multiple,
    Number,
    Object(ObjectId),
    Preposition(Option<DictWord>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TokenResult {
    Fail,
    /// Accepted with no value
    Preposition,
    Number(Special),
    Multiple,
    Object(ObjectId),
    /// The buffer was rewritten
    Reparse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NounResult {
    Nothing,
    Multiple,
    Object(ObjectId),
    Reparse,
}

/// Why a scope search is being run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ScopeReason {
    Parsing,
    Talking,
    /// Only looking for one object
    Test(ObjectId),
    /// Listing everything in scope
    Collect,
}

/// Restriction placed on a noun token by the grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TokenFilter {
    None,
    Attr(Attribute),
    Routine(RoutineId),
}

/// Where the top-level loop goes next.
#[derive(Debug)]
enum Flow {
    /// Read a fresh line
    ReType,
    /// Tokenise the buffer again and start over
    ReParse,
    /// Start over without resetting the actor
    AlmostReParse,
    BeginCommand,
    Lines(Vec<GrammarLine>),
    GiveError,
    LookForMore(Command),
    Done(Command),
}

/// Everything the parser remembers between and during calls.
#[derive(Debug, Clone)]
pub struct ParserState {
    pub(crate) buffer: InputBuffer,
    pub(crate) again_buffer: InputBuffer,
    pub(crate) oops_workspace: InputBuffer,
    pub(crate) words: WordStream,

    pub(crate) actor: ObjectId,
    pub(crate) actors_location: ObjectId,
    pub(crate) verb_wordnum: usize,
    pub(crate) verb_word: Option<DictWord>,
    pub(crate) usual_grammar_after: usize,
    pub(crate) meta: bool,

    pub(crate) action_to_be: Option<Action>,
    pub(crate) action_reversed: bool,
    pub(crate) line: Vec<LineToken>,
    pub(crate) params_wanted: usize,
    /// Current token, counting from 1
    pub(crate) pcount: usize,
    pub(crate) pattern: Vec<PatternEntry>,
    pub(crate) pattern2: Vec<PatternEntry>,
    pub(crate) pcount2: usize,
    pub(crate) results: Vec<Param>,
    /// Token from which objects were inferred, 0 for none
    pub(crate) inferfrom: usize,
    pub(crate) not_holding: Option<ObjectId>,

    pub(crate) parsed_number: Special,
    pub(crate) special_word: Option<DictWord>,

    /// The token being matched is the last of its line
    pub(crate) lookahead_end: bool,
    pub(crate) advance_warning: Option<ObjectId>,
    /// 1 for "take all" lines, 2 once "all" has been read on one
    pub(crate) take_all_rule: u8,

    pub(crate) etype: ParseErrorKind,
    pub(crate) best_etype: ParseErrorKind,
    pub(crate) nextbest_etype: ParseErrorKind,

    pub(crate) multi: MultiList,
    pub(crate) multi_context: Option<ElementaryToken>,
    pub(crate) multi_wanted: usize,
    pub(crate) multi_had: usize,

    pub(crate) indef: Indef,
    pub(crate) allow_plurals: bool,
    pub(crate) token_filter: TokenFilter,
    pub(crate) scope_token: Option<RoutineId>,
    pub(crate) scope_error: Option<RoutineId>,
    pub(crate) scope_reason: ScopeReason,
    pub(crate) scope_found: bool,
    pub(crate) scope_collected: IndexSet<ObjectId>,
    pub(crate) matches: MatchList,
    pub(crate) number_of_classes: usize,
    pub(crate) dont_infer: bool,
    pub(crate) dict_flags_of_noun: u8,

    pub(crate) pronouns: PronounTable,
    pub(crate) pronoun_word: Option<DictWord>,
    pub(crate) pronoun_obj: Option<ObjectId>,
    pub(crate) saved_pronoun_word: Option<DictWord>,
    pub(crate) saved_pronoun_obj: Option<ObjectId>,

    /// Word an "oops" would replace, 0 for none
    pub(crate) oops_from: usize,
    pub(crate) saved_oops: usize,
    pub(crate) held_back_mode: bool,
    pub(crate) hb_wn: usize,
    pub(crate) notheld_mode: bool,
    pub(crate) kept: Option<Command>,

    pub(crate) consult_from: usize,
    pub(crate) consult_words: usize,
}

impl ParserState {
    pub fn new(player: ObjectId, config: &ParserConfig, lexicon: &Lexicon) -> Self {
        let buffer = InputBuffer::new(config.buffer_capacity);
        ParserState {
            again_buffer: buffer.clone(),
            oops_workspace: buffer.clone(),
            buffer,
            words: WordStream::default(),

            actor: player,
            actors_location: player,
            verb_wordnum: 1,
            verb_word: None,
            usual_grammar_after: 0,
            meta: false,

            action_to_be: None,
            action_reversed: false,
            line: Vec::new(),
            params_wanted: 0,
            pcount: 0,
            pattern: Vec::new(),
            pattern2: Vec::new(),
            pcount2: 0,
            results: Vec::new(),
            inferfrom: 0,
            not_holding: None,

            parsed_number: Special::Number(0),
            special_word: None,

            lookahead_end: false,
            advance_warning: None,
            take_all_rule: 0,

            etype: ParseErrorKind::Stuck,
            best_etype: ParseErrorKind::Stuck,
            nextbest_etype: ParseErrorKind::Stuck,

            multi: MultiList::new(config.multiple_object_capacity),
            multi_context: None,
            multi_wanted: 0,
            multi_had: 0,

            indef: Indef::default(),
            allow_plurals: true,
            token_filter: TokenFilter::None,
            scope_token: None,
            scope_error: None,
            scope_reason: ScopeReason::Parsing,
            scope_found: false,
            scope_collected: IndexSet::new(),
            matches: MatchList::new(config.match_list_size),
            number_of_classes: 0,
            dont_infer: false,
            dict_flags_of_noun: 0,

            pronouns: PronounTable::new(lexicon),
            pronoun_word: None,
            pronoun_obj: None,
            saved_pronoun_word: None,
            saved_pronoun_obj: None,

            oops_from: 0,
            saved_oops: 0,
            held_back_mode: false,
            hb_wn: 0,
            notheld_mode: false,
            kept: None,

            consult_from: 0,
            consult_words: 0,
        }
    }

    pub(crate) fn set_pattern(&mut self, pcount: usize, entry: PatternEntry) {
        if self.pattern.len() <= pcount {
            self.pattern.resize(pcount + 1, PatternEntry::Null);
        }
        self.pattern[pcount] = entry;
    }
}

/// The parser: a world, a console, a grammar and the state between commands.
pub struct Parser<W: WorldModel, C: Console> {
    world: W,
    console: C,
    grammar: Grammar,
    lexicon: Lexicon,
    messages: LibraryMessages,
    hooks: Box<dyn GameHooks>,
    arbiter: Option<Box<dyn Arbiter>>,
    config: ParserConfig,
    state: ParserState,
}

impl<W: WorldModel, C: Console> Parser<W, C> {
    pub fn new(world: W, console: C, mut grammar: Grammar, config: ParserConfig) -> Self {
        let lexicon = Lexicon::resolve(&config.vocabulary, grammar.dictionary_mut());
        let (messages, unknown) = LibraryMessages::with_overrides(config.dialect, &config.messages);
        for key in unknown {
            warn!("no library message is called '{}'; override ignored", key);
        }
        let state = ParserState::new(world.player(), &config, &lexicon);
        let mut parser = Parser {
            world,
            console,
            grammar,
            lexicon,
            messages,
            hooks: Box::new(DefaultHooks),
            arbiter: None,
            config,
            state,
        };
        parser.learn_names();
        info!(
            "parser ready: {} verbs, {} dictionary words",
            parser.grammar.verbs().len(),
            parser.grammar.dictionary().len()
        );
        parser
    }

    /// A parser using the library's standard verbs.
    pub fn standard(world: W, console: C, config: ParserConfig) -> Result<Self, GrammarError> {
        let grammar = standard_grammar(config.resolution)?;
        Ok(Parser::new(world, console, grammar, config))
    }

    pub fn set_hooks(&mut self, hooks: Box<dyn GameHooks>) {
        self.hooks = hooks;
    }

    pub fn set_arbiter(&mut self, arbiter: Box<dyn Arbiter>) {
        self.arbiter = Some(arbiter);
    }

    /// Add every object's name words to the dictionary. Call again after
    /// adding objects with new names to the world.
    pub fn learn_names(&mut self) {
        let dict = self.grammar.dictionary_mut();
        for obj in self.world.objects() {
            for name in self.world.name_words(obj) {
                dict.add(&name, NOUN);
            }
        }
        debug!("dictionary holds {} words after object names", dict.len());
    }

    pub fn world(&self) -> &W {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut W {
        &mut self.world
    }

    pub fn console(&self) -> &C {
        &self.console
    }

    pub fn console_mut(&mut self) -> &mut C {
        &mut self.console
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub fn dictionary(&self) -> &Dictionary {
        self.grammar.dictionary()
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn state(&self) -> &ParserState {
        &self.state
    }

    /// Who the last command was addressed to
    pub fn actor(&self) -> ObjectId {
        self.state.actor
    }

    /// More commands from the same line are waiting ("take ball then drop it")
    pub fn held_back(&self) -> bool {
        self.state.held_back_mode
    }

    /// A command is waiting behind an implicit take
    pub fn not_held_pending(&self) -> bool {
        self.state.notheld_mode
    }

    pub fn meta(&self) -> bool {
        self.state.meta
    }

    pub fn pronouns(&self) -> &PronounTable {
        &self.state.pronouns
    }

    /// The text of the "pronouns" verb.
    pub fn describe_pronouns(&self) -> String {
        self.state
            .pronouns
            .describe(&self.world, self.grammar.dictionary(), &self.messages)
    }

    /// Rebind pronouns to `obj`, as if the player had just referred to it.
    pub fn notice(&mut self, obj: ObjectId) {
        self.state.pronouns.notice(obj, &self.world);
    }

    /// Drop any held-back input and any command waiting behind an
    /// implicit take, for example when the take failed.
    pub fn discard_pending(&mut self) {
        self.state.held_back_mode = false;
        self.state.notheld_mode = false;
        self.state.kept = None;
    }

    /// Read and resolve the next command.
    ///
    /// Errors are reported to the player and a fresh line is read, so this
    /// only returns `Err` when the console fails or runs out of input.
    pub fn parse_input(&mut self) -> Result<Command, ParserError> {
        self.state.multi.reset_too_many();

        if self.state.notheld_mode {
            self.state.notheld_mode = false;
            if let Some(cmd) = self.state.kept.take() {
                debug!("returning the command kept behind an implicit take");
                return Ok(cmd);
            }
        }

        let mut flow = if self.state.held_back_mode {
            self.state.held_back_mode = false;
            Flow::ReParse
        } else {
            Flow::ReType
        };

        loop {
            flow = match flow {
                Flow::ReType => {
                    self.state.held_back_mode = false;
                    self.read_command()?;
                    Flow::ReParse
                }
                Flow::ReParse => {
                    self.reparse();
                    Flow::AlmostReParse
                }
                Flow::AlmostReParse => {
                    self.state.scope_token = None;
                    self.state.action_to_be = None;
                    Flow::BeginCommand
                }
                Flow::BeginCommand => self.begin_command()?,
                Flow::Lines(lines) => self.match_lines(&lines)?,
                Flow::GiveError => self.give_error()?,
                Flow::LookForMore(cmd) => self.look_for_more(cmd)?,
                Flow::Done(cmd) => {
                    debug!(
                        "parsed {} {:?} for {}{}",
                        cmd.action,
                        cmd.params,
                        cmd.actor,
                        if cmd.multiple.is_empty() {
                            String::new()
                        } else {
                            format!(" over {} objects", cmd.multiple.len())
                        }
                    );
                    return Ok(cmd);
                }
            }
        }
    }

    /// Tokenise the buffer and reset the command to start at word 1.
    fn reparse(&mut self) {
        self.retokenise();
        if self.hooks.before_parsing(&mut self.state.buffer) {
            self.retokenise();
        }
        if self.config.trace_level >= 2 {
            let words: Vec<String> = self
                .state
                .words
                .words()
                .iter()
                .map(|w| match w.dict {
                    Some(d) => format!("'{}'", self.grammar.dictionary().text(d)),
                    None => format!("'{}'?", w.text),
                })
                .collect();
            ptrace!(self, 2, "[ \"{}\" {} words: {}]", self.state.buffer.as_str(), words.len(), words.join(" "));
        }
        let player = self.world.player();
        self.state.verb_wordnum = 1;
        self.state.actor = player;
        self.state.actors_location = self.scope_ceiling(player);
        self.state.usual_grammar_after = 0;
        self.state.meta = false;
    }

    /// Build a command from the current parse.
    fn command(&self, action: Action, params: Vec<Param>) -> Command {
        Command {
            action,
            params,
            actor: self.state.actor,
            meta: self.state.meta,
            multiple: self.state.multi.objects().to_vec(),
            too_many: self.state.multi.too_many(),
            special_word: self.state.special_word,
            consult_from: self.state.consult_from,
            consult_words: self.state.consult_words,
        }
    }

    /// Find the verb and who it is addressed to.
    fn begin_command(&mut self) -> Result<Flow, ParserError> {
        let player = self.world.player();
        self.state.words.wn = self.state.verb_wordnum;
        let mut verb = match self.state.words.next_word_stopped() {
            Next::End => {
                self.state.best_etype = ParseErrorKind::Stuck;
                return Ok(Flow::GiveError);
            }
            Next::Word(w) => w,
        };

        if self.lexicon.is_again(verb) {
            if self.state.actor != player {
                self.say(Message::AgainToActor)?;
                return Ok(Flow::ReType);
            }
            if self.state.again_buffer.is_empty() {
                self.say(Message::CantRepeat)?;
                return Ok(Flow::ReType);
            }
            debug!("repeating \"{}\"", self.state.again_buffer.as_str());
            self.state.buffer = self.state.again_buffer.clone();
            return Ok(Flow::ReParse);
        }
        self.state.again_buffer = self.state.buffer.clone();

        if self.state.usual_grammar_after == 0 {
            let actor = self.state.actor;
            match self.hooks.actor_grammar(actor, verb, self.grammar.dictionary()) {
                GrammarOverride::Action { action, noun, second } => {
                    ptrace!(self, 1, "[Actor grammar decided on {}]", action);
                    let params = [noun, second].iter().flatten().map(|o| Param::Object(*o)).collect();
                    return Ok(Flow::Done(self.command(action, params)));
                }
                GrammarOverride::VerbThenUsual(w) => {
                    self.state.usual_grammar_after = self.state.verb_wordnum;
                    verb = self.redirect_verb(w);
                }
                GrammarOverride::Verb(w) => {
                    verb = self.redirect_verb(w);
                }
                GrammarOverride::Continue => {
                    self.state.words.wn = self.state.verb_wordnum;
                    verb = self.state.words.next_word();
                }
            }
        } else {
            self.state.usual_grammar_after = 0;
        }
        self.state.verb_word = verb;

        let is_verb = verb.map_or(false, |w| self.grammar.dictionary().is_verb(w));
        if !is_verb {
            if let Some(compass) = self.world.compass() {
                self.state.words.wn = self.state.verb_wordnum;
                self.state.indef.mode = false;
                self.state.token_filter = TokenFilter::None;
                self.state.lookahead_end = true;
                match self.noun_domain(Some(compass), None, None)? {
                    NounResult::Reparse => return Ok(Flow::ReParse),
                    NounResult::Object(dir) => {
                        ptrace!(self, 1, "[Going {}]", self.world.short_name(dir));
                        self.state.action_to_be = Some(actions::GO);
                        self.state.pcount = 1;
                        let cmd = self.command(actions::GO, vec![Param::Object(dir)]);
                        return Ok(Flow::LookForMore(cmd));
                    }
                    _ => {}
                }
            }

            if self.state.actor == player {
                let num = self.state.words.num_words();
                for _ in 2..=num {
                    if self.lexicon.is_comma(self.state.words.next_word()) {
                        return self.conversation();
                    }
                }
                if let Some(w) = self.hooks.unknown_verb(verb, self.grammar.dictionary()) {
                    debug!("unknown verb replaced by '{}'", self.grammar.dictionary().text(w));
                    self.state.verb_word = Some(w);
                    return self.verb_accepted(w);
                }
            }
            self.state.best_etype = ParseErrorKind::Verb;
            return Ok(Flow::GiveError);
        }

        match verb {
            Some(w) => self.verb_accepted(w),
            None => {
                self.state.best_etype = ParseErrorKind::Verb;
                Ok(Flow::GiveError)
            }
        }
    }

    /// Treat the whole command as following `word`.
    fn redirect_verb(&mut self, word: DictWord) -> Option<DictWord> {
        self.state.words.wn = self.state.words.wn.saturating_sub(1);
        self.state.verb_wordnum = self.state.verb_wordnum.saturating_sub(1);
        Some(word)
    }

    /// "bob, jump": make the named character the actor.
    fn conversation(&mut self) -> Result<Flow, ParserError> {
        let comma_at = self.state.words.wn - 1;
        if comma_at == 1 {
            self.say(Message::LeadingComma)?;
            return Ok(Flow::ReType);
        }

        let player = self.world.player();
        self.state.words.wn = 1;
        self.state.lookahead_end = false;
        self.state.scope_reason = ScopeReason::Talking;
        let found = self.noun_domain(
            Some(player),
            Some(self.state.actors_location),
            Some(ElementaryToken::Creature),
        )?;
        self.state.scope_reason = ScopeReason::Parsing;

        let person = match found {
            NounResult::Reparse => return Ok(Flow::ReParse),
            NounResult::Object(o) => o,
            NounResult::Nothing | NounResult::Multiple => {
                self.say(Message::TalkToWhom)?;
                return Ok(Flow::ReType);
            }
        };
        if !self.world.has(person, Attribute::Animate) && !self.world.has(person, Attribute::Talkable) {
            let name = the_name(&self.world, person);
            self.say_with(Message::CantTalkTo, &[("the", name.as_str())])?;
            return Ok(Flow::ReType);
        }
        if self.state.words.wn != comma_at {
            self.say(Message::TalkHow)?;
            return Ok(Flow::ReType);
        }

        self.state.pronouns.notice(person, &self.world);
        self.state.verb_wordnum = comma_at + 1;
        if person == player {
            self.state.words.wn = self.state.verb_wordnum;
            if self.lexicon.is_again(self.state.words.next_word_stopped().word()) {
                self.say(Message::AgainToActor)?;
                return Ok(Flow::ReType);
            }
        }
        self.state.actor = person;
        self.state.actors_location = self.scope_ceiling(person);
        ptrace!(
            self,
            1,
            "[Actor is {} in {}]",
            self.world.short_name(person),
            self.world.short_name(self.state.actors_location)
        );
        Ok(Flow::BeginCommand)
    }

    fn verb_accepted(&mut self, verb: DictWord) -> Result<Flow, ParserError> {
        self.state.meta = self.grammar.dictionary().is_meta(verb);
        if self.state.meta && self.state.actor != self.world.player() {
            self.state.best_etype = ParseErrorKind::Verb;
            self.state.meta = false;
            return Ok(Flow::GiveError);
        }
        match self.grammar.lines_for(verb) {
            Some(v) => Ok(Flow::Lines(v.lines.clone())),
            None => {
                self.state.best_etype = ParseErrorKind::Verb;
                Ok(Flow::GiveError)
            }
        }
    }

    /// Every grammar line failed: report the most specific error.
    fn give_error(&mut self) -> Result<Flow, ParserError> {
        let etype = self.state.best_etype;
        self.state.etype = etype;
        let player = self.world.player();

        if self.state.actor != player {
            if self.state.usual_grammar_after > 0 {
                self.state.verb_wordnum = self.state.usual_grammar_after;
                return Ok(Flow::AlmostReParse);
            }
            self.state.words.wn = self.state.verb_wordnum;
            let mut word = self.state.words.next_word();
            if self.lexicon.is_comma(word) {
                word = self.state.words.next_word();
                self.state.verb_wordnum += 1;
            }
            self.state.special_word = word;
            self.state.consult_from = self.state.verb_wordnum;
            self.state.consult_words = (self.state.words.num_words() + 1).saturating_sub(self.state.verb_wordnum);
            ptrace!(self, 1, "[Not understood by {}: error {}]", self.world.short_name(self.state.actor), etype);
            let actor = self.state.actor;
            let cmd = self.command(
                actions::NOT_UNDERSTOOD,
                vec![Param::Number(Special::Word(word)), Param::Object(actor)],
            );
            return Ok(Flow::Done(cmd));
        }

        if self.hooks.parser_error(etype) {
            return Ok(Flow::ReType);
        }
        self.state.pronoun_word = self.state.saved_pronoun_word;
        self.state.pronoun_obj = self.state.saved_pronoun_obj;
        let pronoun = self.state.pronoun_word.map(|w| self.grammar.dictionary().text(w).to_string()).unwrap_or_default();

        match etype {
            ParseErrorKind::Stuck => {
                self.say(Message::Stuck)?;
                self.state.oops_from = 1;
            }
            ParseErrorKind::UpTo => {
                self.state.pattern = self.state.pattern2.clone();
                self.state.pcount = self.state.pcount2;
                let understood = self.print_command(0);
                let text = format!("{}{}.\n", self.messages.text(Message::UpTo), understood);
                self.print(&text)?;
            }
            ParseErrorKind::Number => self.say(Message::NotNumber)?,
            ParseErrorKind::CantSee => {
                self.say(Message::CantSee)?;
                self.state.oops_from = self.state.saved_oops;
            }
            ParseErrorKind::TooLittle => self.say(Message::TooLittle)?,
            ParseErrorKind::NotHeld => {
                self.say(Message::NotHeld)?;
                self.state.oops_from = self.state.saved_oops;
            }
            ParseErrorKind::Multi => self.say(Message::NoMultiples)?,
            ParseErrorKind::MultiMulti => self.say(Message::MultiplesOnce)?,
            ParseErrorKind::Vague => self.say_with(Message::Vague, &[("word", pronoun.as_str())])?,
            ParseErrorKind::Except => self.say(Message::Excepted)?,
            ParseErrorKind::Animate => self.say(Message::NotAnimate)?,
            ParseErrorKind::Verb => self.say(Message::NotVerb)?,
            ParseErrorKind::Scenery => self.say(Message::Scenery)?,
            ParseErrorKind::ItGone => match self.state.pronoun_obj {
                None => self.say_with(Message::Vague, &[("word", pronoun.as_str())])?,
                Some(o) => {
                    let name = the_name(&self.world, o);
                    self.say_with(Message::ItGone, &[("word", pronoun.as_str()), ("the", name.as_str())])?
                }
            },
            ParseErrorKind::JunkAfter => self.say(Message::JunkAfter)?,
            ParseErrorKind::TooFew => {
                let text = format!("{}\n", self.messages.too_few(self.state.multi_had));
                self.print(&text)?;
            }
            ParseErrorKind::Nothing => {
                if self.state.multi_wanted == descriptors::ALL_WANTED {
                    self.say(Message::NothingToDo)?;
                } else {
                    self.say(Message::NoneAvailable)?;
                }
            }
            ParseErrorKind::AskScope => {
                let text = self
                    .state
                    .scope_error
                    .and_then(|id| self.grammar.scope_routine(id))
                    .and_then(|r| r.error(&self.world));
                match text {
                    Some(t) => self.print(&format!("{}\n", t))?,
                    None => {
                        self.state.best_etype = self.state.nextbest_etype;
                        return Ok(Flow::GiveError);
                    }
                }
            }
        }
        Ok(Flow::ReType)
    }

    /// After a command, see whether "then" or a comma starts another.
    fn look_for_more(&mut self, cmd: Command) -> Result<Flow, ParserError> {
        let num = self.state.words.num_words();
        if self.state.words.wn > num {
            return Ok(Flow::Done(cmd));
        }
        let word = self.state.words.next_word();
        if self.lexicon.is_then_or_comma(word) {
            if self.state.words.wn > num {
                self.state.held_back_mode = false;
                return Ok(Flow::Done(cmd));
            }
            let start = self.word_address(self.state.verb_wordnum);
            let end = self.word_address(self.state.words.wn);
            self.state.buffer.blank(start, end);

            let next = self.state.words.next_word();
            if self.lexicon.is_again(next) {
                let wn = self.state.words.wn;
                let start = self.word_address(wn.saturating_sub(2));
                let end = if wn > num {
                    self.state.again_buffer.len()
                } else {
                    self.word_address(wn)
                };
                self.state.again_buffer.blank(start, end);
            }
            self.retokenise();
            self.state.held_back_mode = true;
            debug!("holding back \"{}\"", self.state.buffer.as_str().trim());
            return Ok(Flow::Done(cmd));
        }

        self.state.pattern2 = self.state.pattern.clone();
        self.state.pcount2 = self.state.pcount;
        self.state.best_etype = ParseErrorKind::UpTo;
        Ok(Flow::GiveError)
    }

    /// The command as understood so far, from token `from` on. From 0 the
    /// verb is printed first.
    pub(crate) fn print_command(&mut self, from: usize) -> String {
        let mut out = String::new();
        let mut spacing = false;
        let mut from = from;
        if from == 0 {
            out.push_str(&self.verb_text());
            from = 1;
            spacing = true;
        }
        for k in from..self.state.pcount {
            let entry = self.state.pattern.get(k).copied().unwrap_or(PatternEntry::Null);
            if entry == PatternEntry::Null {
                continue;
            }
            if spacing {
                out.push(' ');
            }
            match entry {
                PatternEntry::Multiple => out.push_str(self.messages.text(Message::ThoseThings)),
                PatternEntry::Number => out.push_str(self.messages.text(Message::That)),
                PatternEntry::Object(o) => out.push_str(&the_name(&self.world, o)),
                PatternEntry::Preposition(Some(w)) => out.push_str(self.grammar.dictionary().text(w)),
                PatternEntry::Preposition(None) | PatternEntry::Null => {}
            }
            spacing = true;
        }
        out
    }

    fn verb_text(&mut self) -> String {
        let verb = match self.state.verb_word {
            Some(w) => w,
            None => return String::new(),
        };
        if let Some(printed) = self.lexicon.printed_verb(verb) {
            return printed.to_string();
        }
        let text = self.grammar.dictionary().text(verb).to_string();
        self.hooks.print_verb(verb, &text).unwrap_or(text)
    }

    /// Byte offset of word `n` in the buffer.
    pub(crate) fn word_address(&self, n: usize) -> usize {
        if n == 0 {
            return 0;
        }
        self.state.words.word_address(n, self.state.buffer.len())
    }

    pub(crate) fn print(&mut self, text: &str) -> Result<(), ParserError> {
        self.console.print(text)
    }

    pub(crate) fn say(&mut self, msg: Message) -> Result<(), ParserError> {
        let text = format!("{}\n", self.messages.text(msg));
        self.console.print(&text)
    }

    pub(crate) fn say_with(&mut self, msg: Message, vars: &[(&str, &str)]) -> Result<(), ParserError> {
        let text = format!("{}\n", self.messages.render(msg, vars));
        self.console.print(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::ScriptedConsole;
    use crate::object_tree::{ObjectKind, ObjectTree};

    fn world() -> ObjectTree {
        let mut tree = ObjectTree::new();
        let room = tree.add("Lab", &["lab"], ObjectKind::Room);
        let me = tree.add("yourself", &["me", "self"], ObjectKind::Person { female: false });
        tree.give(me, Attribute::Concealed);
        tree.move_to(me, room);
        tree.set_player(me);
        tree.set_location(room);
        tree.add_compass();
        let ball = tree.add("red ball", &["red", "ball"], ObjectKind::Item);
        tree.move_to(ball, room);
        tree
    }

    fn parser(lines: &[&str]) -> Parser<ObjectTree, ScriptedConsole> {
        Parser::standard(world(), ScriptedConsole::new(lines), ParserConfig::default()).unwrap()
    }

    #[test]
    fn test_take_resolves_noun() {
        let mut p = parser(&["take ball"]);
        let cmd = p.parse_input().unwrap();
        let ball = p.world().find("red ball").unwrap();
        assert_eq!(cmd.action, actions::TAKE);
        assert_eq!(cmd.noun(), Some(ball));
        assert_eq!(cmd.actor, p.world().player());
        assert!(!cmd.meta);
    }

    #[test]
    fn test_direction_without_verb_is_go() {
        let mut p = parser(&["north"]);
        let cmd = p.parse_input().unwrap();
        assert_eq!(cmd.action, actions::GO);
        let north = p.world().find("north wall").unwrap();
        assert_eq!(cmd.noun(), Some(north));
    }

    #[test]
    fn test_empty_line_then_closed_input() {
        let mut p = parser(&[""]);
        assert!(matches!(p.parse_input(), Err(ParserError::InputClosed)));
        assert_eq!(p.console().output_lines(), vec!["I beg your pardon?"]);
    }

    #[test]
    fn test_unknown_verb() {
        let mut p = parser(&["frobnicate ball", "look"]);
        let cmd = p.parse_input().unwrap();
        assert_eq!(cmd.action, actions::LOOK);
        assert_eq!(p.console().output_lines(), vec!["That's not a verb I recognise."]);
    }

    #[test]
    fn test_meta_flag() {
        let mut p = parser(&["score"]);
        let cmd = p.parse_input().unwrap();
        assert_eq!(cmd.action, actions::SCORE);
        assert!(cmd.meta);
        assert!(p.meta());
    }

    #[test]
    fn test_print_command_skips_null_entries() {
        let mut p = parser(&[]);
        let ball = p.world().find("red ball").unwrap();
        p.state.verb_word = p.dictionary().lookup("put");
        p.state.set_pattern(1, PatternEntry::Object(ball));
        p.state.set_pattern(2, PatternEntry::Null);
        let on = p.dictionary().lookup("on");
        p.state.set_pattern(3, PatternEntry::Preposition(on));
        p.state.set_pattern(4, PatternEntry::Multiple);
        p.state.pcount = 5;
        assert_eq!(p.print_command(0), "put the red ball on those things");
        assert_eq!(p.print_command(3), "on those things");
    }
}

// Action identifiers
//
// The standard library actions have fixed numbers so hosts can match on
// them. Games may add their own by naming them in grammar lines; those
// are numbered after the standard set.

use indexmap::IndexMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Action(pub u16);

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match STANDARD_ACTIONS.get(self.0 as usize) {
            Some(name) => write!(f, "##{}", name),
            None => write!(f, "##action{}", self.0),
        }
    }
}

macro_rules! standard_actions {
    ($($konst:ident = $num:expr, $name:expr;)*) => {
        $(pub const $konst: Action = Action($num);)*

        /// Names of the standard actions, indexed by number.
        pub const STANDARD_ACTIONS: &[&str] = &[$($name),*];
    };
}

standard_actions! {
    // Meta actions
    QUIT = 0, "Quit";
    SCORE = 1, "Score";
    PRONOUNS = 2, "Pronouns";
    LMODE1 = 3, "LMode1";
    LMODE2 = 4, "LMode2";
    LMODE3 = 5, "LMode3";
    // Group 1: manipulation and movement
    INV = 6, "Inv";
    INV_TALL = 7, "InvTall";
    INV_WIDE = 8, "InvWide";
    TAKE = 9, "Take";
    DROP = 10, "Drop";
    REMOVE = 11, "Remove";
    PUT_ON = 12, "PutOn";
    INSERT = 13, "Insert";
    EMPTY = 14, "Empty";
    ENTER = 15, "Enter";
    EXIT = 16, "Exit";
    GET_OFF = 17, "GetOff";
    GO = 18, "Go";
    GO_IN = 19, "GoIn";
    VAGUE_GO = 20, "VagueGo";
    LOOK = 21, "Look";
    EXAMINE = 22, "Examine";
    SEARCH = 23, "Search";
    LOOK_UNDER = 24, "LookUnder";
    CONSULT = 25, "Consult";
    WEAR = 26, "Wear";
    DISROBE = 27, "Disrobe";
    EAT = 28, "Eat";
    // Group 2: interaction with other people
    GIVE = 29, "Give";
    SHOW = 30, "Show";
    ANSWER = 31, "Answer";
    ASK = 32, "Ask";
    ASK_FOR = 33, "AskFor";
    TELL = 34, "Tell";
    THROW_AT = 35, "ThrowAt";
    WAIT = 36, "Wait";
    // Fake actions
    NOT_UNDERSTOOD = 37, "NotUnderstood";
}

/// Maps action names used in grammar text to action numbers.
#[derive(Debug, Clone)]
pub struct ActionTable {
    by_name: IndexMap<String, Action>,
}

impl ActionTable {
    pub fn new() -> ActionTable {
        let mut by_name = IndexMap::new();
        for (i, name) in STANDARD_ACTIONS.iter().enumerate() {
            by_name.insert(name.to_string(), Action(i as u16));
        }
        ActionTable { by_name }
    }

    pub fn lookup(&self, name: &str) -> Option<Action> {
        self.by_name.get(name).copied()
    }

    /// Number of the named action, allocating a new one for an unknown name.
    pub fn action(&mut self, name: &str) -> Action {
        if let Some(a) = self.lookup(name) {
            return a;
        }
        let a = Action(self.by_name.len() as u16);
        self.by_name.insert(name.to_string(), a);
        a
    }

    pub fn name(&self, action: Action) -> Option<&str> {
        self.by_name
            .get_index(action.0 as usize)
            .map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

impl Default for ActionTable {
    fn default() -> Self {
        ActionTable::new()
    }
}

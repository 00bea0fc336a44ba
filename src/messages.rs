//! Library messages
//!
//! Every piece of text the parser prints goes through [`LibraryMessages`],
//! so a game can reword any of it by key without touching parser logic.
//! Messages are templates: `{the}`, `{word}`, `{count}` and `{verb}` are
//! replaced by the values the parser supplies.

use crate::world::{Attribute, ObjectId, WorldModel};
use serde::Deserialize;
use std::collections::HashMap;

/// Spelling conventions for the few messages that differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    British,
    American,
}

macro_rules! library_messages {
    ($($variant:ident = $key:expr, $num:expr;)*) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Message {
            $($variant,)*
        }

        impl Message {
            pub const ALL: &'static [Message] = &[$(Message::$variant,)*];

            /// Key used to override the message from configuration
            pub fn key(self) -> &'static str {
                match self {
                    $(Message::$variant => $key,)*
                }
            }

            /// Number of the message in the library's Miscellany group, 0 if it has none
            pub fn number(self) -> u8 {
                match self {
                    $(Message::$variant => $num,)*
                }
            }
        }
    };
}

library_messages! {
    Pardon = "pardon", 10;
    CantCorrect = "cant_correct", 14;
    ThinkNothing = "think_nothing", 15;
    OopsOneWord = "oops_one_word", 16;
    AgainToActor = "again_to_actor", 20;
    CantRepeat = "cant_repeat", 21;
    LeadingComma = "leading_comma", 22;
    TalkToWhom = "talk_to_whom", 23;
    CantTalkTo = "cant_talk_to", 24;
    TalkHow = "talk_how", 25;
    FirstTaking = "first_taking", 26;
    Stuck = "stuck", 27;
    UpTo = "up_to", 28;
    NotNumber = "not_number", 29;
    CantSee = "cant_see", 30;
    TooLittle = "too_little", 31;
    NotHeld = "not_held", 32;
    NoMultiples = "no_multiples", 33;
    MultiplesOnce = "multiples_once", 34;
    Vague = "vague", 35;
    Excepted = "excepted", 36;
    NotAnimate = "not_animate", 37;
    NotVerb = "not_verb", 38;
    Scenery = "scenery", 39;
    ItGone = "it_gone", 40;
    JunkAfter = "junk_after", 41;
    TooFew = "too_few", 42;
    NothingToDo = "nothing_to_do", 43;
    NoneAvailable = "none_available", 44;
    WhoDoYouMean = "who_do_you_mean", 45;
    WhichDoYouMean = "which_do_you_mean", 46;
    OnlyOne = "only_one", 47;
    WhomDoYouWant = "whom_do_you_want", 48;
    WhatDoYouWant = "what_do_you_want", 49;
    Prompt = "prompt", 0;
    PronounsIntro = "pronouns_intro", 0;
    PronounMeans = "pronoun_means", 0;
    PronounUnset = "pronoun_unset", 0;
    NoPronouns = "no_pronouns", 0;
    Or = "or", 0;
    ThoseThings = "those_things", 0;
    That = "that", 0;
}

impl Message {
    fn default_text(self, dialect: Dialect) -> &'static str {
        match self {
            Message::Pardon => "I beg your pardon?",
            Message::CantCorrect => "Sorry, that can't be corrected.",
            Message::ThinkNothing => "Think nothing of it.",
            Message::OopsOneWord => "\"Oops\" can only correct a single word.",
            Message::AgainToActor => {
                "To repeat a command like \"frog, jump\", just say \"again\", not \"frog, again\"."
            }
            Message::CantRepeat => "You can hardly repeat that.",
            Message::LeadingComma => "You can't begin with a comma.",
            Message::TalkToWhom => {
                "You seem to want to talk to someone, but I can't see whom."
            }
            Message::CantTalkTo => "You can't talk to {the}.",
            Message::TalkHow => "To talk to someone, try \"someone, hello\" or some such.",
            Message::FirstTaking => "(first taking {the})",
            Message::Stuck => "I didn't understand that sentence.",
            Message::UpTo => "I only understood you as far as wanting to ",
            Message::NotNumber => "I didn't understand that number.",
            Message::CantSee => "You can't see any such thing.",
            Message::TooLittle => "You seem to have said too little!",
            Message::NotHeld => "You aren't holding that!",
            Message::NoMultiples => "You can't use multiple objects with that verb.",
            Message::MultiplesOnce => "You can only use multiple objects once on a line.",
            Message::Vague => "I'm not sure what \"{word}\" refers to.",
            Message::Excepted => "You excepted something not included anyway!",
            Message::NotAnimate => "You can only do that to something animate.",
            Message::NotVerb => match dialect {
                Dialect::British => "That's not a verb I recognise.",
                Dialect::American => "That's not a verb I recognize.",
            },
            Message::Scenery => {
                "That's not something you need to refer to in the course of this game."
            }
            Message::ItGone => "You can't see \"{word}\" ({the}) at the moment.",
            Message::JunkAfter => "I didn't understand the way that finished.",
            Message::TooFew => "{count} of those {verb} available.",
            Message::NothingToDo => "Nothing to do!",
            Message::NoneAvailable => "There are none at all available!",
            Message::WhoDoYouMean => "Who do you mean, ",
            Message::WhichDoYouMean => "Which do you mean, ",
            Message::OnlyOne => "Sorry, you can only have one item here. Which exactly?",
            Message::WhomDoYouWant => "Whom do you want",
            Message::WhatDoYouWant => "What do you want",
            Message::Prompt => "\n>",
            Message::PronounsIntro => "At the moment, ",
            Message::PronounMeans => "means ",
            Message::PronounUnset => "is unset",
            Message::NoPronouns => "no pronouns are known to the game.",
            Message::Or => " or ",
            Message::ThoseThings => "those things",
            Message::That => "that",
        }
    }
}

/// The message table in use, with any overrides.
#[derive(Debug, Clone, Default)]
pub struct LibraryMessages {
    dialect: Dialect,
    overrides: HashMap<Message, String>,
}

impl LibraryMessages {
    pub fn new(dialect: Dialect) -> Self {
        LibraryMessages {
            dialect,
            overrides: HashMap::new(),
        }
    }

    /// Build from configuration overrides keyed by message key. Unknown
    /// keys are returned so the caller can warn about them.
    pub fn with_overrides(dialect: Dialect, table: &HashMap<String, String>) -> (Self, Vec<String>) {
        let mut msgs = LibraryMessages::new(dialect);
        let mut unknown = Vec::new();
        for (key, text) in table {
            match Message::ALL.iter().find(|m| m.key() == key) {
                Some(m) => msgs.set(*m, text),
                None => unknown.push(key.clone()),
            }
        }
        unknown.sort();
        (msgs, unknown)
    }

    pub fn set(&mut self, msg: Message, text: &str) {
        self.overrides.insert(msg, text.to_string());
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// The message with no substitutions made.
    pub fn text(&self, msg: Message) -> &str {
        match self.overrides.get(&msg) {
            Some(t) => t.as_str(),
            None => msg.default_text(self.dialect),
        }
    }

    /// The message with each `{name}` replaced by its value.
    pub fn render(&self, msg: Message, vars: &[(&str, &str)]) -> String {
        let mut out = self.text(msg).to_string();
        for (name, value) in vars {
            out = out.replace(&format!("{{{}}}", name), value);
        }
        out
    }

    /// The too-few message for `had` objects found.
    pub fn too_few(&self, had: usize) -> String {
        let count = if had == 0 {
            "None".to_string()
        } else {
            format!("Only {}", number_in_words(had))
        };
        let verb = if had == 1 { "is" } else { "are" };
        self.render(Message::TooFew, &[("count", count.as_str()), ("verb", verb)])
    }
}

/// Object name with its definite article.
pub fn the_name(world: &dyn WorldModel, obj: ObjectId) -> String {
    let name = world.short_name(obj);
    if world.has(obj, Attribute::Proper) {
        name
    } else {
        format!("the {}", name)
    }
}

/// Object name with its indefinite article.
pub fn a_name(world: &dyn WorldModel, obj: ObjectId) -> String {
    let name = world.short_name(obj);
    if world.has(obj, Attribute::Proper) {
        return name;
    }
    if let Some(article) = world.article(obj) {
        return format!("{} {}", article, name);
    }
    if world.has(obj, Attribute::PluralName) {
        return format!("some {}", name);
    }
    let vowel = name
        .chars()
        .next()
        .map(|c| "aeiouAEIOU".contains(c))
        .unwrap_or(false);
    if vowel {
        format!("an {}", name)
    } else {
        format!("a {}", name)
    }
}

/// Number spelled out in English, as the library prints counts.
pub fn number_in_words(n: usize) -> String {
    const SMALL: [&str; 20] = [
        "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
        "eleven", "twelve", "thirteen", "fourteen", "fifteen", "sixteen", "seventeen",
        "eighteen", "nineteen",
    ];
    const TENS: [&str; 10] = [
        "", "", "twenty", "thirty", "forty", "fifty", "sixty", "seventy", "eighty", "ninety",
    ];
    match n {
        0..=19 => SMALL[n].to_string(),
        20..=99 => {
            let (t, u) = (n / 10, n % 10);
            if u == 0 {
                TENS[t].to_string()
            } else {
                format!("{}-{}", TENS[t], SMALL[u])
            }
        }
        100..=999 => {
            let (h, rest) = (n / 100, n % 100);
            if rest == 0 {
                format!("{} hundred", SMALL[h])
            } else {
                format!("{} hundred and {}", SMALL[h], number_in_words(rest))
            }
        }
        _ => n.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object_tree::{ObjectKind, ObjectTree};

    #[test]
    fn test_keys_are_unique() {
        for (i, a) in Message::ALL.iter().enumerate() {
            for b in &Message::ALL[i + 1..] {
                assert_ne!(a.key(), b.key());
            }
        }
        assert_eq!(Message::CantSee.number(), 30);
    }

    #[test]
    fn test_dialect_and_overrides() {
        let us = LibraryMessages::new(Dialect::American);
        assert_eq!(us.text(Message::NotVerb), "That's not a verb I recognize.");

        let mut table = HashMap::new();
        table.insert("cant_see".to_string(), "Nope, no {word} here.".to_string());
        table.insert("bogus".to_string(), "x".to_string());
        let (msgs, unknown) = LibraryMessages::with_overrides(Dialect::British, &table);
        assert_eq!(unknown, vec!["bogus".to_string()]);
        assert_eq!(
            msgs.render(Message::CantSee, &[("word", "lamp")]),
            "Nope, no lamp here."
        );
        assert_eq!(msgs.text(Message::NotVerb), "That's not a verb I recognise.");
    }

    #[test]
    fn test_too_few() {
        let msgs = LibraryMessages::default();
        assert_eq!(msgs.too_few(0), "None of those are available.");
        assert_eq!(msgs.too_few(1), "Only one of those is available.");
        assert_eq!(msgs.too_few(3), "Only three of those are available.");
    }

    #[test]
    fn test_articles() {
        let mut tree = ObjectTree::new();
        let apple = tree.add("apple", &["apple"], ObjectKind::Item);
        let ball = tree.add("red ball", &["red", "ball"], ObjectKind::Item);
        let coins = tree.add("coins", &["coins"], ObjectKind::Item);
        tree.give(coins, Attribute::PluralName);
        let mary = tree.add("Mary", &["mary"], ObjectKind::Person { female: true });
        let water = tree.add("water", &["water"], ObjectKind::Item);
        tree.set_article(water, "some");

        assert_eq!(a_name(&tree, apple), "an apple");
        assert_eq!(a_name(&tree, ball), "a red ball");
        assert_eq!(a_name(&tree, coins), "some coins");
        assert_eq!(a_name(&tree, water), "some water");
        assert_eq!(the_name(&tree, ball), "the red ball");
        assert_eq!(the_name(&tree, mary), "Mary");
        assert_eq!(a_name(&tree, mary), "Mary");
    }

    #[test]
    fn test_number_in_words() {
        assert_eq!(number_in_words(7), "seven");
        assert_eq!(number_in_words(42), "forty-two");
        assert_eq!(number_in_words(300), "three hundred");
    }
}

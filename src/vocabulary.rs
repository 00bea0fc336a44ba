// Language tables: pronouns, descriptors, number words and the special
// words the parser reacts to ("all", "and", "then", "oops", ...)
//
// `Vocabulary` is the configuration form (plain strings, deserialisable
// from TOML). `Lexicon` is the same data resolved against a dictionary.

use crate::dictionary::{DictWord, Dictionary};
use serde::Deserialize;

/// Every gender/number/animation combination.
pub const ALL_GNAS: u16 = 0b1111_1111_1111;

/// A pronoun and the GNA mask of objects it can refer to.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PronounDef {
    pub word: String,
    pub gna: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DescriptorKind {
    Possessive,
    DefiniteArticle,
    IndefiniteArticle,
    Lit,
    Unlit,
}

/// Whose possession a possessive descriptor demands.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OwnerDef {
    /// "my", "this": held by the actor
    Actor,
    /// "that", "those": lying in the actor's location
    Location,
    /// "his", "her": owned by whatever the pronoun is bound to
    Pronoun(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DescriptorDef {
    pub word: String,
    pub gna: u16,
    pub kind: DescriptorKind,
    #[serde(default)]
    pub owner: Option<OwnerDef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NumberDef {
    pub word: String,
    pub value: i32,
}

/// How a verb word is spelled out when echoing a command back.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VerbForm {
    pub word: String,
    pub printed: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Vocabulary {
    pub pronouns: Vec<PronounDef>,
    pub descriptors: Vec<DescriptorDef>,
    pub numbers: Vec<NumberDef>,
    pub all_words: Vec<String>,
    pub and_words: Vec<String>,
    pub but_words: Vec<String>,
    pub me_words: Vec<String>,
    pub of_words: Vec<String>,
    pub other_words: Vec<String>,
    pub then_words: Vec<String>,
    pub again_words: Vec<String>,
    pub oops_words: Vec<String>,
    pub comma_word: String,
    /// Verbs that answer a disambiguation question rather than start a new command
    pub mode_words: Vec<String>,
    pub verb_forms: Vec<VerbForm>,
}

fn strings(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

impl Vocabulary {
    /// English tables.
    pub fn english() -> Vocabulary {
        ENGLISH.clone()
    }

    fn english_tables() -> Vocabulary {
        use DescriptorKind::*;
        let pronoun = |word: &str, gna: u16| PronounDef {
            word: word.to_string(),
            gna,
        };
        let desc = |word: &str, gna: u16, kind: DescriptorKind, owner: Option<OwnerDef>| {
            DescriptorDef {
                word: word.to_string(),
                gna,
                kind,
                owner,
            }
        };
        let number_words = [
            "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
            "eleven", "twelve", "thirteen", "fourteen", "fifteen", "sixteen", "seventeen",
            "eighteen", "nineteen", "twenty",
        ];

        Vocabulary {
            pronouns: vec![
                pronoun("it", 0b0010_0011_1000),
                pronoun("him", 0b1000_0000_0000),
                pronoun("her", 0b0100_0000_0000),
                pronoun("them", 0b0001_1100_0111),
            ],
            descriptors: vec![
                desc("my", ALL_GNAS, Possessive, Some(OwnerDef::Actor)),
                desc("this", ALL_GNAS, Possessive, Some(OwnerDef::Actor)),
                desc("these", 0b0001_1100_0111, Possessive, Some(OwnerDef::Actor)),
                desc("that", ALL_GNAS, Possessive, Some(OwnerDef::Location)),
                desc("those", 0b0001_1100_0111, Possessive, Some(OwnerDef::Location)),
                desc("his", ALL_GNAS, Possessive, Some(OwnerDef::Pronoun("him".into()))),
                desc("her", ALL_GNAS, Possessive, Some(OwnerDef::Pronoun("her".into()))),
                desc("their", ALL_GNAS, Possessive, Some(OwnerDef::Pronoun("them".into()))),
                desc("its", ALL_GNAS, Possessive, Some(OwnerDef::Pronoun("it".into()))),
                desc("the", ALL_GNAS, DefiniteArticle, None),
                desc("a", 0b1110_0011_1000, IndefiniteArticle, None),
                desc("an", 0b1110_0011_1000, IndefiniteArticle, None),
                desc("some", 0b0001_1100_0111, IndefiniteArticle, None),
                desc("lit", ALL_GNAS, Lit, None),
                desc("lighted", ALL_GNAS, Lit, None),
                desc("unlit", ALL_GNAS, Unlit, None),
            ],
            numbers: number_words
                .iter()
                .enumerate()
                .map(|(i, w)| NumberDef {
                    word: w.to_string(),
                    value: i as i32 + 1,
                })
                .collect(),
            all_words: strings(&["all", "each", "every", "everything", "both"]),
            and_words: strings(&["and"]),
            but_words: strings(&["but", "except"]),
            me_words: strings(&["me", "myself", "self"]),
            of_words: strings(&["of"]),
            other_words: strings(&["another", "other"]),
            then_words: strings(&["then", "."]),
            again_words: strings(&["again", "g"]),
            oops_words: strings(&["oops", "o"]),
            comma_word: ",".to_string(),
            mode_words: strings(&["long", "short", "normal", "brief", "full", "verbose"]),
            verb_forms: vec![
                VerbForm { word: "l".into(), printed: "look".into() },
                VerbForm { word: "z".into(), printed: "wait".into() },
                VerbForm { word: "x".into(), printed: "examine".into() },
                VerbForm { word: "i".into(), printed: "inventory".into() },
                VerbForm { word: "inv".into(), printed: "inventory".into() },
            ],
        }
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Vocabulary::english()
    }
}

lazy_static! {
    static ref ENGLISH: Vocabulary = Vocabulary::english_tables();
}

/// Owner constraint of a resolved possessive descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Owner {
    Actor,
    Location,
    Pronoun(DictWord),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Descriptor {
    pub word: DictWord,
    pub gna: u16,
    pub kind: DescriptorKind,
    pub owner: Option<Owner>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PronounSlot {
    pub word: DictWord,
    pub gna: u16,
}

/// The vocabulary, resolved to dictionary words.
#[derive(Debug, Clone, Default)]
pub struct Lexicon {
    pub pronouns: Vec<PronounSlot>,
    pub descriptors: Vec<Descriptor>,
    numbers: Vec<(DictWord, i32)>,
    all: Vec<DictWord>,
    and: Vec<DictWord>,
    but: Vec<DictWord>,
    me: Vec<DictWord>,
    of: Vec<DictWord>,
    other: Vec<DictWord>,
    then: Vec<DictWord>,
    again: Vec<DictWord>,
    oops: Vec<DictWord>,
    mode: Vec<DictWord>,
    pub comma: Option<DictWord>,
    verb_forms: Vec<(DictWord, String)>,
}

fn contains(list: &[DictWord], word: Option<DictWord>) -> bool {
    match word {
        Some(w) => list.contains(&w),
        None => false,
    }
}

impl Lexicon {
    /// Add every vocabulary word to `dictionary` and remember its entry.
    pub fn resolve(vocab: &Vocabulary, dictionary: &mut Dictionary) -> Lexicon {
        let mut add_all =
            |words: &[String]| -> Vec<DictWord> { words.iter().map(|w| dictionary.add(w, 0)).collect() };

        let all = add_all(&vocab.all_words);
        let and = add_all(&vocab.and_words);
        let but = add_all(&vocab.but_words);
        let me = add_all(&vocab.me_words);
        let of = add_all(&vocab.of_words);
        let other = add_all(&vocab.other_words);
        let then = add_all(&vocab.then_words);
        let again = add_all(&vocab.again_words);
        let oops = add_all(&vocab.oops_words);
        let mode = add_all(&vocab.mode_words);

        let pronouns = vocab
            .pronouns
            .iter()
            .map(|p| PronounSlot {
                word: dictionary.add(&p.word, 0),
                gna: p.gna,
            })
            .collect();

        let descriptors = vocab
            .descriptors
            .iter()
            .map(|d| Descriptor {
                word: dictionary.add(&d.word, 0),
                gna: d.gna,
                kind: d.kind,
                owner: d.owner.as_ref().map(|o| match o {
                    OwnerDef::Actor => Owner::Actor,
                    OwnerDef::Location => Owner::Location,
                    OwnerDef::Pronoun(p) => Owner::Pronoun(dictionary.add(p, 0)),
                }),
            })
            .collect();

        let numbers = vocab
            .numbers
            .iter()
            .map(|n| (dictionary.add(&n.word, 0), n.value))
            .collect();

        let comma = if vocab.comma_word.is_empty() {
            None
        } else {
            Some(dictionary.add(&vocab.comma_word, 0))
        };

        let verb_forms = vocab
            .verb_forms
            .iter()
            .map(|f| (dictionary.add(&f.word, 0), f.printed.clone()))
            .collect();

        Lexicon {
            pronouns,
            descriptors,
            numbers,
            all,
            and,
            but,
            me,
            of,
            other,
            then,
            again,
            oops,
            mode,
            comma,
            verb_forms,
        }
    }

    pub fn is_all(&self, w: Option<DictWord>) -> bool {
        contains(&self.all, w)
    }

    pub fn is_and(&self, w: Option<DictWord>) -> bool {
        contains(&self.and, w)
    }

    pub fn is_but(&self, w: Option<DictWord>) -> bool {
        contains(&self.but, w)
    }

    pub fn is_me(&self, w: Option<DictWord>) -> bool {
        contains(&self.me, w)
    }

    pub fn is_of(&self, w: Option<DictWord>) -> bool {
        contains(&self.of, w)
    }

    pub fn is_other(&self, w: Option<DictWord>) -> bool {
        contains(&self.other, w)
    }

    pub fn is_then(&self, w: Option<DictWord>) -> bool {
        contains(&self.then, w)
    }

    pub fn is_again(&self, w: Option<DictWord>) -> bool {
        contains(&self.again, w)
    }

    pub fn is_oops(&self, w: Option<DictWord>) -> bool {
        contains(&self.oops, w)
    }

    pub fn is_comma(&self, w: Option<DictWord>) -> bool {
        w.is_some() && w == self.comma
    }

    /// Words that answer a question without being taken as a new command
    pub fn is_mode_word(&self, w: Option<DictWord>) -> bool {
        contains(&self.mode, w)
    }

    /// "then" or a comma: the start of another command
    pub fn is_then_or_comma(&self, w: Option<DictWord>) -> bool {
        self.is_then(w) || self.is_comma(w)
    }

    /// Connectives that may follow a noun phrase
    pub fn is_connective(&self, w: Option<DictWord>) -> bool {
        self.is_and(w) || self.is_but(w) || self.is_comma(w) || self.is_then(w)
    }

    pub fn number_word(&self, w: Option<DictWord>) -> Option<i32> {
        let w = w?;
        self.numbers.iter().find(|(n, _)| *n == w).map(|(_, v)| *v)
    }

    pub fn descriptors_for(&self, w: Option<DictWord>) -> impl Iterator<Item = &Descriptor> {
        self.descriptors.iter().filter(move |d| Some(d.word) == w)
    }

    pub fn is_descriptor(&self, w: Option<DictWord>) -> bool {
        self.descriptors_for(w).next().is_some()
    }

    pub fn pronoun_index(&self, w: Option<DictWord>) -> Option<usize> {
        let w = w?;
        self.pronouns.iter().position(|p| p.word == w)
    }

    pub fn printed_verb(&self, w: DictWord) -> Option<&str> {
        self.verb_forms
            .iter()
            .find(|(v, _)| *v == w)
            .map(|(_, s)| s.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_english_tables_resolve() {
        let mut dict = Dictionary::new(9);
        let lex = Lexicon::resolve(&Vocabulary::english(), &mut dict);

        assert!(lex.is_all(dict.lookup("everything")));
        assert!(lex.is_but(dict.lookup("except")));
        assert!(lex.is_then(dict.lookup(".")));
        assert!(lex.is_comma(dict.lookup(",")));
        assert_eq!(lex.number_word(dict.lookup("twelve")), Some(12));
        assert_eq!(lex.pronoun_index(dict.lookup("them")), Some(3));

        // "her" is both a pronoun and a possessive
        let her = dict.lookup("her");
        assert!(lex.pronoun_index(her).is_some());
        assert!(lex.is_descriptor(her));
        let d = lex.descriptors_for(her).next().unwrap();
        assert_eq!(d.owner, Some(Owner::Pronoun(her.unwrap())));

        assert_eq!(lex.printed_verb(dict.lookup("x").unwrap()), Some("examine"));
    }

    #[test]
    fn test_vocabulary_from_toml_keeps_defaults() {
        let text = r#"
            all_words = ["all", "tout"]

            [[descriptors]]
            word = "le"
            gna = 0b111111111111
            kind = "definite_article"

            [[descriptors]]
            word = "son"
            gna = 0b111111111111
            kind = "possessive"
            owner = { pronoun = "lui" }
        "#;
        let vocab: Vocabulary = toml::from_str(text).unwrap();
        assert_eq!(vocab.all_words, vec!["all", "tout"]);
        assert_eq!(vocab.descriptors.len(), 2);
        assert_eq!(
            vocab.descriptors[1].owner,
            Some(OwnerDef::Pronoun("lui".to_string()))
        );
        // Untouched tables fall back to English
        assert_eq!(vocab.pronouns.len(), 4);
        assert_eq!(vocab.comma_word, ",");
    }
}

// Parser error kinds and host-level failures

use std::fmt;
use std::io;

/// Reasons a grammar line can fail, ranked from least to most specific.
///
/// The derived ordering is the ranking used to pick which message the player
/// sees after every line of a verb has been tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ParseErrorKind {
    Stuck = 1,
    UpTo,
    Number,
    CantSee,
    TooLittle,
    NotHeld,
    Multi,
    MultiMulti,
    Vague,
    Except,
    Animate,
    Verb,
    Scenery,
    ItGone,
    JunkAfter,
    TooFew,
    Nothing,
    AskScope,
}

impl ParseErrorKind {
    pub const ALL: [ParseErrorKind; 18] = [
        ParseErrorKind::Stuck,
        ParseErrorKind::UpTo,
        ParseErrorKind::Number,
        ParseErrorKind::CantSee,
        ParseErrorKind::TooLittle,
        ParseErrorKind::NotHeld,
        ParseErrorKind::Multi,
        ParseErrorKind::MultiMulti,
        ParseErrorKind::Vague,
        ParseErrorKind::Except,
        ParseErrorKind::Animate,
        ParseErrorKind::Verb,
        ParseErrorKind::Scenery,
        ParseErrorKind::ItGone,
        ParseErrorKind::JunkAfter,
        ParseErrorKind::TooFew,
        ParseErrorKind::Nothing,
        ParseErrorKind::AskScope,
    ];

    /// Numeric code, 1 for STUCK up to 18 for ASKSCOPE.
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.code() == code)
    }
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            ParseErrorKind::Stuck => "STUCK_PE",
            ParseErrorKind::UpTo => "UPTO_PE",
            ParseErrorKind::Number => "NUMBER_PE",
            ParseErrorKind::CantSee => "CANTSEE_PE",
            ParseErrorKind::TooLittle => "TOOLIT_PE",
            ParseErrorKind::NotHeld => "NOTHELD_PE",
            ParseErrorKind::Multi => "MULTI_PE",
            ParseErrorKind::MultiMulti => "MMULTI_PE",
            ParseErrorKind::Vague => "VAGUE_PE",
            ParseErrorKind::Except => "EXCEPT_PE",
            ParseErrorKind::Animate => "ANIMA_PE",
            ParseErrorKind::Verb => "VERB_PE",
            ParseErrorKind::Scenery => "SCENERY_PE",
            ParseErrorKind::ItGone => "ITGONE_PE",
            ParseErrorKind::JunkAfter => "JUNKAFTER_PE",
            ParseErrorKind::TooFew => "TOOFEW_PE",
            ParseErrorKind::Nothing => "NOTHING_PE",
            ParseErrorKind::AskScope => "ASKSCOPE_PE",
        };
        write!(f, "{}", name)
    }
}

/// Failures that stop `parse_input` from producing a command at all.
#[derive(Debug, Clone, PartialEq)]
pub enum ParserError {
    /// The input source has no more lines
    InputClosed,
    /// Reading or writing the console failed
    Io(String),
}

impl fmt::Display for ParserError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ParserError::InputClosed => write!(f, "input closed"),
            ParserError::Io(msg) => write!(f, "console error: {}", msg),
        }
    }
}

impl std::error::Error for ParserError {}

impl From<io::Error> for ParserError {
    fn from(err: io::Error) -> Self {
        ParserError::Io(err.to_string())
    }
}

/// Errors raised while building grammar tables from their textual form.
#[derive(Debug, Clone, PartialEq)]
pub enum GrammarError {
    UnknownToken(String, String), // token, line
    MissingAction(String),
    EmptyPreposition(String),
    TopicNotFollowedByPreposition(String),
    TooManyTokens(String, usize),
    UnknownVerb(String),
    DuplicateRoutine(String),
}

impl fmt::Display for GrammarError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            GrammarError::UnknownToken(token, line) => {
                write!(f, "Unknown grammar token '{}' in line '{}'", token, line)
            }
            GrammarError::MissingAction(line) => {
                write!(f, "Grammar line '{}' has no '-> Action'", line)
            }
            GrammarError::EmptyPreposition(line) => {
                write!(f, "Empty preposition in grammar line '{}'", line)
            }
            GrammarError::TopicNotFollowedByPreposition(line) => write!(
                f,
                "A topic token must be followed by a preposition or end the line: '{}'",
                line
            ),
            GrammarError::TooManyTokens(line, count) => {
                write!(f, "Grammar line '{}' has {} tokens (limit 31)", line, count)
            }
            GrammarError::UnknownVerb(word) => write!(f, "No verb '{}' to extend", word),
            GrammarError::DuplicateRoutine(name) => {
                write!(f, "Routine '{}' is already registered", name)
            }
        }
    }
}

impl std::error::Error for GrammarError {}

/// Errors reading a TOML parser configuration.
#[derive(Debug)]
pub enum ConfigError {
    Io(io::Error),
    Toml(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "could not read config: {}", err),
            ConfigError::Toml(err) => write!(f, "invalid config: {}", err),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<io::Error> for ConfigError {
    fn from(err: io::Error) -> Self {
        ConfigError::Io(err)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::Toml(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranking_is_total_and_matches_codes() {
        for pair in ParseErrorKind::ALL.windows(2) {
            assert!(pair[0] < pair[1]);
            assert_eq!(pair[0].code() + 1, pair[1].code());
        }
        assert_eq!(ParseErrorKind::Stuck.code(), 1);
        assert_eq!(ParseErrorKind::AskScope.code(), 18);
    }

    #[test]
    fn test_from_code_round_trip() {
        assert_eq!(ParseErrorKind::from_code(4), Some(ParseErrorKind::CantSee));
        assert_eq!(ParseErrorKind::from_code(0), None);
        assert_eq!(ParseErrorKind::from_code(19), None);
    }

    #[test]
    fn test_best_of_sibling_errors() {
        let seen = [
            ParseErrorKind::CantSee,
            ParseErrorKind::Stuck,
            ParseErrorKind::Verb,
            ParseErrorKind::UpTo,
        ];
        assert_eq!(seen.iter().max(), Some(&ParseErrorKind::Verb));
    }
}

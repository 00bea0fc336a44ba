//! Parser configuration, read from TOML.
//!
//! ```toml
//! trace_level = 2
//! dialect = "american"
//!
//! [vocabulary]
//! again_words = ["again", "g", "encore"]
//!
//! [messages]
//! cant_see = "There's no such thing here."
//! ```

use crate::error::ConfigError;
use crate::messages::Dialect;
use crate::vocabulary::Vocabulary;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ParserConfig {
    /// Parser trace verbosity, 0 (off) to 5
    pub trace_level: u8,
    pub dialect: Dialect,

    /// Most candidates kept while matching one noun phrase
    pub match_list_size: usize,
    /// Most objects in the multiple-object list
    pub multiple_object_capacity: usize,
    /// Tokens per grammar line, end marker included
    pub max_grammar_tokens: usize,
    /// Characters kept from an input line
    pub buffer_capacity: usize,
    /// Words kept from an input line
    pub max_words: usize,
    /// Significant characters per dictionary word
    pub resolution: usize,
    /// Weight given to an arbiter's preference when scoring candidates
    pub choose_objects_weight: i32,

    pub vocabulary: Vocabulary,
    /// Message overrides by key
    pub messages: HashMap<String, String>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        ParserConfig {
            trace_level: 0,
            dialect: Dialect::British,
            match_list_size: 64,
            multiple_object_capacity: 63,
            max_grammar_tokens: 32,
            buffer_capacity: 120,
            max_words: 15,
            resolution: 9,
            choose_objects_weight: 1000,
            vocabulary: Vocabulary::english(),
            messages: HashMap::new(),
        }
    }
}

impl ParserConfig {
    pub fn from_toml_str(text: &str) -> Result<ParserConfig, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn read_toml(path: &Path) -> Result<ParserConfig, ConfigError> {
        let mut file = File::open(path)?;
        let mut text = String::new();
        file.read_to_string(&mut text)?;
        Self::from_toml_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = ParserConfig::default();
        assert_eq!(c.match_list_size, 64);
        assert_eq!(c.multiple_object_capacity, 63);
        assert_eq!(c.resolution, 9);
        assert_eq!(c.choose_objects_weight, 1000);
        assert!(c.vocabulary.again_words.contains(&"g".to_string()));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let c = ParserConfig::from_toml_str(
            r#"
            trace_level = 3
            dialect = "american"
            multiple_object_capacity = 4

            [vocabulary]
            again_words = ["again", "encore"]

            [messages]
            cant_see = "No such thing."
            "#,
        )
        .unwrap();
        assert_eq!(c.trace_level, 3);
        assert_eq!(c.dialect, Dialect::American);
        assert_eq!(c.multiple_object_capacity, 4);
        assert_eq!(c.max_words, 15);
        assert_eq!(c.vocabulary.again_words, vec!["again", "encore"]);
        assert!(c.vocabulary.all_words.contains(&"all".to_string()));
        assert_eq!(c.messages.get("cant_see").map(String::as_str), Some("No such thing."));
    }

    #[test]
    fn test_bad_toml_is_an_error() {
        assert!(matches!(
            ParserConfig::from_toml_str("trace_level = \"loud\""),
            Err(ConfigError::Toml(_))
        ));
    }
}

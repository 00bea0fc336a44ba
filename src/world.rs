//! World model interface consumed by the parser
//!
//! The parser never owns game objects. It asks the host about the object
//! tree, attributes and name words through [`WorldModel`], and reaches the
//! optional per-object capabilities (custom name parsing, custom equality)
//! through the same trait.

use crate::tokenizer::WordView;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Identifier of a game object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
pub struct ObjectId(pub u16);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Attributes the parser tests for, plus a few used by grammar filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Attribute {
    Animate,
    Clothing,
    Concealed,
    Container,
    Edible,
    Enterable,
    Female,
    Light,
    Male,
    Neuter,
    Open,
    PluralName,
    Proper,
    Scenery,
    Static,
    Supporter,
    Talkable,
    Transparent,
    Visited,
    Worn,
}

impl Attribute {
    pub fn name(self) -> &'static str {
        match self {
            Attribute::Animate => "animate",
            Attribute::Clothing => "clothing",
            Attribute::Concealed => "concealed",
            Attribute::Container => "container",
            Attribute::Edible => "edible",
            Attribute::Enterable => "enterable",
            Attribute::Female => "female",
            Attribute::Light => "light",
            Attribute::Male => "male",
            Attribute::Neuter => "neuter",
            Attribute::Open => "open",
            Attribute::PluralName => "pluralname",
            Attribute::Proper => "proper",
            Attribute::Scenery => "scenery",
            Attribute::Static => "static",
            Attribute::Supporter => "supporter",
            Attribute::Talkable => "talkable",
            Attribute::Transparent => "transparent",
            Attribute::Visited => "visited",
            Attribute::Worn => "worn",
        }
    }
}

impl FromStr for Attribute {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "animate" => Ok(Attribute::Animate),
            "clothing" => Ok(Attribute::Clothing),
            "concealed" => Ok(Attribute::Concealed),
            "container" => Ok(Attribute::Container),
            "edible" => Ok(Attribute::Edible),
            "enterable" => Ok(Attribute::Enterable),
            "female" => Ok(Attribute::Female),
            "light" => Ok(Attribute::Light),
            "male" => Ok(Attribute::Male),
            "neuter" => Ok(Attribute::Neuter),
            "open" => Ok(Attribute::Open),
            "pluralname" => Ok(Attribute::PluralName),
            "proper" => Ok(Attribute::Proper),
            "scenery" => Ok(Attribute::Scenery),
            "static" => Ok(Attribute::Static),
            "supporter" => Ok(Attribute::Supporter),
            "talkable" => Ok(Attribute::Talkable),
            "transparent" => Ok(Attribute::Transparent),
            "visited" => Ok(Attribute::Visited),
            "worn" => Ok(Attribute::Worn),
            _ => Err(format!("unknown attribute '{}'", s)),
        }
    }
}

/// Result of a custom name-parsing routine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameMatch {
    /// This many words refer to the object
    Words(usize),
    /// This many words refer to the object, and they name it in the plural
    Plural(usize),
    /// The words do not refer to the object at all
    NoMatch,
    /// Fall back to matching against the object's name words
    Default,
}

/// Custom name parsing for one object.
pub trait NameParser {
    /// Decide how many words, read from `words`, refer to `obj`.
    fn parse_name(&self, obj: ObjectId, words: WordView<'_>) -> NameMatch;
}

/// Custom test for whether two objects can be told apart by anything the
/// player could type.
pub trait EqualityComparer {
    /// `Some(true)` if indistinguishable, `Some(false)` if distinguishable,
    /// `None` to compare name words as usual.
    fn identical(&self, first: ObjectId, second: ObjectId) -> Option<bool>;
}

/// Queries the parser makes of the game world.
pub trait WorldModel {
    fn parent(&self, obj: ObjectId) -> Option<ObjectId>;
    fn child(&self, obj: ObjectId) -> Option<ObjectId>;
    fn sibling(&self, obj: ObjectId) -> Option<ObjectId>;
    fn has(&self, obj: ObjectId, attr: Attribute) -> bool;

    /// Dictionary words naming the object. A `//p` suffix marks a plural.
    fn name_words(&self, obj: ObjectId) -> Vec<String>;

    /// Printed name without article
    fn short_name(&self, obj: ObjectId) -> String;

    /// Indefinite article override ("some", "an", ...)
    fn article(&self, _obj: ObjectId) -> Option<String> {
        None
    }

    /// Objects brought into scope whenever `obj` is
    fn add_to_scope(&self, _obj: ObjectId) -> Vec<ObjectId> {
        Vec::new()
    }

    fn name_parser(&self, _obj: ObjectId) -> Option<&dyn NameParser> {
        None
    }

    fn equality(&self, _obj: ObjectId) -> Option<&dyn EqualityComparer> {
        None
    }

    /// The object the player is currently controlling
    fn player(&self) -> ObjectId;

    /// The room the player is in, or the darkness object when it is dark
    fn location(&self) -> Option<ObjectId>;

    /// The pseudo-room standing in for the location when it is unlit
    fn darkness(&self) -> Option<ObjectId> {
        None
    }

    /// Parent of the direction objects
    fn compass(&self) -> Option<ObjectId> {
        None
    }

    /// Every object, used to seed the dictionary with name words
    fn objects(&self) -> Vec<ObjectId>;

    fn children(&self, obj: ObjectId) -> Vec<ObjectId> {
        let mut out = Vec::new();
        let mut next = self.child(obj);
        while let Some(o) = next {
            out.push(o);
            next = self.sibling(o);
        }
        out
    }

    /// `obj in container`
    fn is_in(&self, obj: ObjectId, container: ObjectId) -> bool {
        self.parent(obj) == Some(container)
    }

    /// Supporters, transparent objects and open containers show their contents.
    fn is_see_through(&self, obj: ObjectId) -> bool {
        self.has(obj, Attribute::Supporter)
            || self.has(obj, Attribute::Transparent)
            || (self.has(obj, Attribute::Container) && self.has(obj, Attribute::Open))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_names_round_trip() {
        for name in ["animate", "pluralname", "worn", "transparent", "talkable"] {
            let attr: Attribute = name.parse().unwrap();
            assert_eq!(attr.name(), name);
        }
        assert!("glowing".parse::<Attribute>().is_err());
    }
}

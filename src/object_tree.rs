// In-memory object tree
//
// A small world model for hosts that do not have their own: objects with
// names, attributes and a parent/child/sibling tree. Used by the demo
// binary and the tests, and a reasonable starting point for simple games.

use crate::world::{Attribute, EqualityComparer, NameParser, ObjectId, WorldModel};
use indexmap::IndexSet;
use std::fmt::{self, Display, Formatter};

/// Broad object kinds, each implying a default set of attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Item,
    Room,
    Container { open: bool },
    Supporter,
    Scenery,
    /// An animate character
    Person { female: bool },
}

pub struct TreeObject {
    pub short_name: String,
    pub names: Vec<String>,
    pub article: Option<String>,
    pub attributes: IndexSet<Attribute>,
    pub add_to_scope: Vec<ObjectId>,
    parent: Option<ObjectId>,
    child: Option<ObjectId>,
    sibling: Option<ObjectId>,
    name_parser: Option<Box<dyn NameParser>>,
    equality: Option<Box<dyn EqualityComparer>>,
}

impl fmt::Debug for TreeObject {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeObject")
            .field("short_name", &self.short_name)
            .field("names", &self.names)
            .field("attributes", &self.attributes)
            .field("parent", &self.parent)
            .finish()
    }
}

#[derive(Debug, Default)]
pub struct ObjectTree {
    objects: Vec<TreeObject>,
    player: Option<ObjectId>,
    location: Option<ObjectId>,
    darkness: Option<ObjectId>,
    compass: Option<ObjectId>,
    dark: bool,
}

impl ObjectTree {
    pub fn new() -> Self {
        Self::default()
    }

    fn get(&self, obj: ObjectId) -> Option<&TreeObject> {
        (obj.0 as usize)
            .checked_sub(1)
            .and_then(|i| self.objects.get(i))
    }

    fn get_mut(&mut self, obj: ObjectId) -> Option<&mut TreeObject> {
        (obj.0 as usize)
            .checked_sub(1)
            .and_then(move |i| self.objects.get_mut(i))
    }

    /// Create an object. Names may carry the `//p` plural marker.
    pub fn add(&mut self, short_name: &str, names: &[&str], kind: ObjectKind) -> ObjectId {
        let mut attributes = IndexSet::new();
        match kind {
            ObjectKind::Item => {}
            ObjectKind::Room => {
                attributes.insert(Attribute::Light);
            }
            ObjectKind::Container { open } => {
                attributes.insert(Attribute::Container);
                if open {
                    attributes.insert(Attribute::Open);
                }
            }
            ObjectKind::Supporter => {
                attributes.insert(Attribute::Supporter);
                attributes.insert(Attribute::Static);
            }
            ObjectKind::Scenery => {
                attributes.insert(Attribute::Scenery);
                attributes.insert(Attribute::Static);
            }
            ObjectKind::Person { female } => {
                attributes.insert(Attribute::Animate);
                attributes.insert(Attribute::Proper);
                attributes.insert(if female {
                    Attribute::Female
                } else {
                    Attribute::Male
                });
            }
        }

        self.objects.push(TreeObject {
            short_name: short_name.to_string(),
            names: names.iter().map(|n| n.to_string()).collect(),
            article: None,
            attributes,
            add_to_scope: Vec::new(),
            parent: None,
            child: None,
            sibling: None,
            name_parser: None,
            equality: None,
        });
        ObjectId(self.objects.len() as u16)
    }

    /// Detach `obj` from its parent.
    pub fn remove(&mut self, obj: ObjectId) {
        let parent = match self.get(obj).and_then(|o| o.parent) {
            Some(p) => p,
            None => return,
        };
        let next = self.get(obj).and_then(|o| o.sibling);

        if self.get(parent).and_then(|p| p.child) == Some(obj) {
            if let Some(p) = self.get_mut(parent) {
                p.child = next;
            }
        } else {
            let mut cursor = self.get(parent).and_then(|p| p.child);
            while let Some(c) = cursor {
                let sib = self.get(c).and_then(|o| o.sibling);
                if sib == Some(obj) {
                    if let Some(o) = self.get_mut(c) {
                        o.sibling = next;
                    }
                    break;
                }
                cursor = sib;
            }
        }

        if let Some(o) = self.get_mut(obj) {
            o.parent = None;
            o.sibling = None;
        }
    }

    /// Move `obj` into `dest`, as its first child.
    pub fn move_to(&mut self, obj: ObjectId, dest: ObjectId) {
        if self.get(obj).is_none() || self.get(dest).is_none() {
            return;
        }
        self.remove(obj);
        let first = self.get(dest).and_then(|d| d.child);
        if let Some(o) = self.get_mut(obj) {
            o.parent = Some(dest);
            o.sibling = first;
        }
        if let Some(d) = self.get_mut(dest) {
            d.child = Some(obj);
        }
    }

    pub fn give(&mut self, obj: ObjectId, attr: Attribute) {
        if let Some(o) = self.get_mut(obj) {
            o.attributes.insert(attr);
        }
    }

    pub fn take_away(&mut self, obj: ObjectId, attr: Attribute) {
        if let Some(o) = self.get_mut(obj) {
            o.attributes.shift_remove(&attr);
        }
    }

    pub fn set_article(&mut self, obj: ObjectId, article: &str) {
        if let Some(o) = self.get_mut(obj) {
            o.article = Some(article.to_string());
        }
    }

    pub fn add_scope_extra(&mut self, obj: ObjectId, extra: ObjectId) {
        if let Some(o) = self.get_mut(obj) {
            o.add_to_scope.push(extra);
        }
    }

    pub fn set_name_parser(&mut self, obj: ObjectId, parser: Box<dyn NameParser>) {
        if let Some(o) = self.get_mut(obj) {
            o.name_parser = Some(parser);
        }
    }

    pub fn set_equality(&mut self, obj: ObjectId, cmp: Box<dyn EqualityComparer>) {
        if let Some(o) = self.get_mut(obj) {
            o.equality = Some(cmp);
        }
    }

    pub fn set_player(&mut self, obj: ObjectId) {
        self.player = Some(obj);
    }

    pub fn set_location(&mut self, room: ObjectId) {
        self.location = Some(room);
    }

    /// The real location, even when it is dark.
    pub fn real_location(&self) -> Option<ObjectId> {
        self.location
    }

    /// Darken or light the player's location. Needs a darkness object.
    pub fn set_dark(&mut self, dark: bool) {
        if dark && self.darkness.is_none() {
            let d = self.add("Darkness", &["dark", "darkness"], ObjectKind::Room);
            self.take_away(d, Attribute::Light);
            self.darkness = Some(d);
        }
        self.dark = dark;
    }

    /// Create the compass and its twelve directions, returning the compass.
    pub fn add_compass(&mut self) -> ObjectId {
        if let Some(c) = self.compass {
            return c;
        }
        let compass = self.add("compass", &[], ObjectKind::Item);
        self.give(compass, Attribute::Concealed);
        let directions: [(&str, &[&str]); 12] = [
            ("north wall", &["n", "north", "wall"]),
            ("south wall", &["s", "south", "wall"]),
            ("east wall", &["e", "east", "wall"]),
            ("west wall", &["w", "west", "wall"]),
            ("northeast wall", &["ne", "northeast", "wall"]),
            ("northwest wall", &["nw", "northwest", "wall"]),
            ("southeast wall", &["se", "southeast", "wall"]),
            ("southwest wall", &["sw", "southwest", "wall"]),
            ("ceiling", &["u", "up", "ceiling"]),
            ("floor", &["d", "down", "floor"]),
            ("outside", &[]),
            ("inside", &[]),
        ];
        // Added in reverse so the compass lists north first
        for (name, words) in directions.iter().rev() {
            let dir = self.add(name, words, ObjectKind::Scenery);
            self.set_article(dir, "the");
            self.move_to(dir, compass);
        }
        self.compass = Some(compass);
        compass
    }

    pub fn object(&self, obj: ObjectId) -> Option<&TreeObject> {
        self.get(obj)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Find an object by its printed name.
    pub fn find(&self, short_name: &str) -> Option<ObjectId> {
        self.objects
            .iter()
            .position(|o| o.short_name == short_name)
            .map(|i| ObjectId(i as u16 + 1))
    }
}

impl WorldModel for ObjectTree {
    fn parent(&self, obj: ObjectId) -> Option<ObjectId> {
        self.get(obj).and_then(|o| o.parent)
    }

    fn child(&self, obj: ObjectId) -> Option<ObjectId> {
        self.get(obj).and_then(|o| o.child)
    }

    fn sibling(&self, obj: ObjectId) -> Option<ObjectId> {
        self.get(obj).and_then(|o| o.sibling)
    }

    fn has(&self, obj: ObjectId, attr: Attribute) -> bool {
        self.get(obj)
            .map(|o| o.attributes.contains(&attr))
            .unwrap_or(false)
    }

    fn name_words(&self, obj: ObjectId) -> Vec<String> {
        self.get(obj).map(|o| o.names.clone()).unwrap_or_default()
    }

    fn short_name(&self, obj: ObjectId) -> String {
        self.get(obj)
            .map(|o| o.short_name.clone())
            .unwrap_or_else(|| format!("object {}", obj))
    }

    fn article(&self, obj: ObjectId) -> Option<String> {
        self.get(obj).and_then(|o| o.article.clone())
    }

    fn add_to_scope(&self, obj: ObjectId) -> Vec<ObjectId> {
        self.get(obj)
            .map(|o| o.add_to_scope.clone())
            .unwrap_or_default()
    }

    fn name_parser(&self, obj: ObjectId) -> Option<&dyn NameParser> {
        self.get(obj).and_then(|o| o.name_parser.as_deref())
    }

    fn equality(&self, obj: ObjectId) -> Option<&dyn EqualityComparer> {
        self.get(obj).and_then(|o| o.equality.as_deref())
    }

    fn player(&self) -> ObjectId {
        self.player.unwrap_or(ObjectId(1))
    }

    fn location(&self) -> Option<ObjectId> {
        if self.dark {
            self.darkness
        } else {
            self.location
        }
    }

    fn darkness(&self) -> Option<ObjectId> {
        self.darkness
    }

    fn compass(&self) -> Option<ObjectId> {
        self.compass
    }

    fn objects(&self) -> Vec<ObjectId> {
        (1..=self.objects.len() as u16).map(ObjectId).collect()
    }
}

impl Display for ObjectTree {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "There are {} objects.", self.objects.len())?;
        for (i, o) in self.objects.iter().enumerate() {
            write!(f, "{:3}: \"{}\"", i + 1, o.short_name)?;
            if let Some(p) = o.parent {
                write!(f, " in {}", p)?;
            }
            let attrs: Vec<&str> = o.attributes.iter().map(|a| a.name()).collect();
            if !attrs.is_empty() {
                write!(f, " has {}", attrs.join(" "))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_inserts_first_child() {
        let mut tree = ObjectTree::new();
        let room = tree.add("Room", &[], ObjectKind::Room);
        let ball = tree.add("red ball", &["red", "ball"], ObjectKind::Item);
        let box_ = tree.add("red box", &["red", "box"], ObjectKind::Container { open: true });
        tree.move_to(ball, room);
        tree.move_to(box_, room);
        assert_eq!(tree.children(room), vec![box_, ball]);
        assert_eq!(tree.parent(ball), Some(room));

        tree.move_to(ball, box_);
        assert_eq!(tree.children(room), vec![box_]);
        assert_eq!(tree.children(box_), vec![ball]);
        assert!(tree.is_see_through(box_));
    }

    #[test]
    fn test_remove_middle_sibling() {
        let mut tree = ObjectTree::new();
        let room = tree.add("Room", &[], ObjectKind::Room);
        let a = tree.add("a", &[], ObjectKind::Item);
        let b = tree.add("b", &[], ObjectKind::Item);
        let c = tree.add("c", &[], ObjectKind::Item);
        for o in [a, b, c] {
            tree.move_to(o, room);
        }
        tree.remove(b);
        assert_eq!(tree.children(room), vec![c, a]);
        assert_eq!(tree.parent(b), None);
    }

    #[test]
    fn test_darkness_replaces_location() {
        let mut tree = ObjectTree::new();
        let room = tree.add("Cellar", &[], ObjectKind::Room);
        tree.set_location(room);
        assert_eq!(tree.location(), Some(room));
        tree.set_dark(true);
        assert_eq!(tree.location(), tree.darkness());
        assert_eq!(tree.real_location(), Some(room));
    }

    #[test]
    fn test_compass_directions() {
        let mut tree = ObjectTree::new();
        let compass = tree.add_compass();
        let dirs = tree.children(compass);
        assert_eq!(dirs.len(), 12);
        assert_eq!(tree.short_name(dirs[0]), "north wall");
        assert!(tree.has(dirs[0], Attribute::Scenery));
        assert!(tree.has(compass, Attribute::Concealed));
    }
}

//! Scope: what the actor can refer to
//!
//! A scope search walks the object tree from the actor's surroundings,
//! offering each object it reaches. While parsing, an offered object is
//! matched against the words at the marker; for the host queries it is just
//! recorded. Scope routines and the game's `in_scope` hook may add to the
//! search or replace it.

use super::nouns::NounWord;
use super::{Parser, ScopeReason};
use crate::console::Console;
use crate::grammar::ElementaryToken;
use crate::routines::{ScopeEntry, ScopeRequest};
use crate::world::{Attribute, ObjectId, WorldModel};
use indexmap::IndexSet;

impl<W: WorldModel, C: Console> Parser<W, C> {
    /// The outermost object `person` can see out to: their room, or the
    /// closed container they are in.
    pub(crate) fn scope_ceiling(&self, person: ObjectId) -> ObjectId {
        let world = &self.world;
        let mut at = match world.parent(person) {
            Some(p) => p,
            None => return person,
        };
        if person == world.player() {
            if let Some(dark) = world.darkness() {
                if world.location() == Some(dark) {
                    return dark;
                }
            }
        }
        while let Some(up) = world.parent(at) {
            if !world.is_see_through(at) {
                break;
            }
            at = up;
        }
        at
    }

    /// Whether `obj` is in scope for `actor` (the player if `None`).
    pub fn test_scope(&mut self, obj: ObjectId, actor: Option<ObjectId>) -> bool {
        let actor = actor.unwrap_or_else(|| self.world.player());
        self.state.scope_found = false;
        self.run_host_scope(actor, ScopeReason::Test(obj));
        self.state.scope_found
    }

    /// Every object in scope for `actor` (the player if `None`), each once,
    /// in the order the search reaches them.
    pub fn objects_in_scope(&mut self, actor: Option<ObjectId>) -> Vec<ObjectId> {
        let actor = actor.unwrap_or_else(|| self.world.player());
        self.state.scope_collected = IndexSet::new();
        self.run_host_scope(actor, ScopeReason::Collect);
        std::mem::take(&mut self.state.scope_collected).into_iter().collect()
    }

    fn run_host_scope(&mut self, actor: ObjectId, reason: ScopeReason) {
        let saved_actor = self.state.actor;
        let saved_location = self.state.actors_location;
        let saved_reason = self.state.scope_reason;
        let saved_token = self.state.scope_token.take();

        self.state.actor = actor;
        self.state.actors_location = self.scope_ceiling(actor);
        self.state.scope_reason = reason;
        let location = self.state.actors_location;
        self.search_scope(Some(location), Some(actor), None);

        self.state.actor = saved_actor;
        self.state.actors_location = saved_location;
        self.state.scope_reason = saved_reason;
        self.state.scope_token = saved_token;
    }

    /// Search the two domains (and whatever the scope routine, the game
    /// and darkness add) for objects matching the marker.
    pub(crate) fn search_scope(
        &mut self,
        domain1: Option<ObjectId>,
        domain2: Option<ObjectId>,
        context: Option<ElementaryToken>,
    ) {
        let actor = self.state.actor;

        if let Some(id) = self.state.scope_token {
            let mut request = ScopeRequest::new();
            let replace = match self.grammar.scope_routine(id) {
                Some(routine) => routine.place(&self.world, actor, &mut request),
                None => false,
            };
            self.process_scope_request(&request, context);
            if replace {
                ptrace!(self, 4, "   [Scope routine replaced the usual scope]");
                return;
            }
        }

        if domain1 == Some(actor) || domain2 == Some(actor) {
            let mut request = ScopeRequest::new();
            let replace = self.hooks.in_scope(actor, &mut request, &self.world);
            self.process_scope_request(&request, context);
            if replace {
                ptrace!(self, 4, "   [Game scope replaced the usual scope]");
                return;
            }
        }

        if context == Some(ElementaryToken::MultiInside) {
            if let Some(aw) = self.state.advance_warning {
                if self.world.is_see_through(aw) {
                    self.scope_within(Some(aw), None, context);
                }
                return;
            }
        }

        for (domain, other) in [(domain1, domain2), (domain2, None)] {
            let d = match domain {
                Some(d) => d,
                None => continue,
            };
            if self.world.has(d, Attribute::Supporter) || self.world.has(d, Attribute::Container) {
                self.scope_within_o(d, Some(d), context);
            }
            self.scope_within(Some(d), other, context);
        }

        if let Some(dark) = self.world.darkness() {
            if domain1 == Some(dark) || domain2 == Some(dark) {
                self.scope_within_o(actor, Some(actor), context);
                if let Some(p) = self.world.parent(actor) {
                    if self.world.has(p, Attribute::Supporter)
                        || self.world.has(p, Attribute::Container)
                    {
                        self.scope_within_o(p, Some(p), context);
                    }
                }
            }
        }
    }

    fn process_scope_request(&mut self, request: &ScopeRequest, context: Option<ElementaryToken>) {
        for entry in request.entries() {
            match *entry {
                ScopeEntry::Place(o) => self.place_in_scope(o),
                ScopeEntry::Within(o) => self.scope_within(Some(o), None, context),
            }
        }
    }

    /// Put one object in scope, without its contents.
    pub(crate) fn place_in_scope(&mut self, obj: ObjectId) {
        match self.state.scope_reason {
            ScopeReason::Parsing | ScopeReason::Talking => {
                self.state.words.wn = self.state.matches.from();
                self.try_given_object(obj);
            }
            _ => self.do_scope_action(obj),
        }
    }

    fn do_scope_action(&mut self, obj: ObjectId) {
        match self.state.scope_reason {
            ScopeReason::Test(wanted) => {
                if obj == wanted {
                    self.state.scope_found = true;
                }
            }
            ScopeReason::Collect => {
                self.state.scope_collected.insert(obj);
            }
            ScopeReason::Parsing | ScopeReason::Talking => {}
        }
    }

    /// Offer everything inside `domain` except the `nosearch` branch.
    pub(crate) fn scope_within(
        &mut self,
        domain: Option<ObjectId>,
        nosearch: Option<ObjectId>,
        context: Option<ElementaryToken>,
    ) {
        let domain = match domain {
            Some(d) => d,
            None => return,
        };

        // Directions are in scope wherever the actor is
        if !self.state.indef.mode
            && domain == self.state.actors_location
            && self.state.scope_reason == ScopeReason::Parsing
            && context != Some(ElementaryToken::Creature)
        {
            if let Some(compass) = self.world.compass() {
                self.scope_within(Some(compass), None, None);
            }
        }

        for child in self.world.children(domain) {
            self.scope_within_o(child, nosearch, context);
        }
    }

    /// Offer `domain` itself, then its visible contents and anything it
    /// adds to scope.
    pub(crate) fn scope_within_o(
        &mut self,
        domain: ObjectId,
        nosearch: Option<ObjectId>,
        context: Option<ElementaryToken>,
    ) {
        let excluded = context == Some(ElementaryToken::MultiExcept)
            && self.state.advance_warning == Some(domain);

        if !excluded {
            match self.state.scope_reason {
                ScopeReason::Test(_) | ScopeReason::Collect => self.do_scope_action(domain),
                ScopeReason::Parsing | ScopeReason::Talking => self.offer_in_scope(domain),
            }
        }

        if self.world.child(domain).is_some()
            && Some(domain) != nosearch
            && self.world.is_see_through(domain)
        {
            self.scope_within(Some(domain), nosearch, context);
        }

        for extra in self.world.add_to_scope(domain) {
            self.scope_within_o(extra, None, context);
        }
    }

    /// Match `domain` against the words of the current phrase.
    fn offer_in_scope(&mut self, domain: ObjectId) {
        let from = self.state.matches.from();
        if from <= self.state.words.num_words() {
            self.state.words.wn = from;
            let matched = match self.noun_word() {
                NounWord::Me => domain == self.world.player(),
                NounWord::Pronoun(p) => self.state.pronouns.refers_to(Some(p), domain),
                _ => false,
            };
            if matched {
                self.make_match(domain, 1);
            }
        }

        self.state.words.wn = from;
        let nspec_at = self.state.indef.nspec_at;
        if self.try_given_object(domain) > 0 && nspec_at > 0 && from != nspec_at {
            // "two coins" may mean the object is called "two coins"
            self.state.words.wn = nspec_at;
            if self.try_given_object(domain) > 0 {
                self.state.matches.set_from(nspec_at);
                self.reset_descriptors();
            }
            self.state.words.wn = self.state.matches.from();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParserConfig;
    use crate::console::ScriptedConsole;
    use crate::object_tree::{ObjectKind, ObjectTree};
    use crate::routines::GameHooks;

    struct Lab {
        tree: ObjectTree,
        room: ObjectId,
        box_: ObjectId,
        gem: ObjectId,
        table: ObjectId,
        cup: ObjectId,
    }

    fn lab() -> Lab {
        let mut tree = ObjectTree::new();
        let room = tree.add("Lab", &["lab"], ObjectKind::Room);
        let me = tree.add("yourself", &["me"], ObjectKind::Person { female: false });
        tree.move_to(me, room);
        tree.set_player(me);
        tree.set_location(room);
        let box_ = tree.add("box", &["box"], ObjectKind::Container { open: false });
        tree.move_to(box_, room);
        let gem = tree.add("gem", &["gem"], ObjectKind::Item);
        tree.move_to(gem, box_);
        let table = tree.add("table", &["table"], ObjectKind::Supporter);
        tree.move_to(table, room);
        let cup = tree.add("cup", &["cup"], ObjectKind::Item);
        tree.move_to(cup, table);
        Lab {
            tree,
            room,
            box_,
            gem,
            table,
            cup,
        }
    }

    fn parser(tree: ObjectTree) -> Parser<ObjectTree, ScriptedConsole> {
        Parser::standard(tree, ScriptedConsole::new(&[]), ParserConfig::default()).unwrap()
    }

    #[test]
    fn test_closed_container_hides_contents() {
        let l = lab();
        let (box_, gem, cup, table) = (l.box_, l.gem, l.cup, l.table);
        let mut p = parser(l.tree);
        assert!(p.test_scope(box_, None));
        assert!(p.test_scope(cup, None));
        assert!(p.test_scope(table, None));
        assert!(!p.test_scope(gem, None));

        p.world_mut().give(box_, Attribute::Open);
        assert!(p.test_scope(gem, None));
    }

    #[test]
    fn test_objects_in_scope_lists_each_once() {
        let l = lab();
        let (room, box_, table, cup) = (l.room, l.box_, l.table, l.cup);
        let mut p = parser(l.tree);
        let player = p.world().player();
        p.world_mut().add_scope_extra(table, cup);
        // moving an object in makes it the first child
        let seen = p.objects_in_scope(None);
        assert_eq!(seen, vec![table, cup, box_, player]);
        assert!(!seen.contains(&room));
    }

    #[test]
    fn test_scope_ceiling_stops_at_closed_container() {
        let l = lab();
        let (room, box_) = (l.room, l.box_);
        let mut p = parser(l.tree);
        let player = p.world().player();
        assert_eq!(p.scope_ceiling(player), room);
        p.world_mut().move_to(player, box_);
        assert_eq!(p.scope_ceiling(player), box_);
        p.world_mut().give(box_, Attribute::Open);
        assert_eq!(p.scope_ceiling(player), room);
    }

    struct SeeEverything;

    impl GameHooks for SeeEverything {
        fn in_scope(
            &mut self,
            _actor: ObjectId,
            request: &mut ScopeRequest,
            world: &dyn WorldModel,
        ) -> bool {
            for o in world.objects() {
                if world.short_name(o) == "gem" {
                    request.place_in_scope(o);
                }
            }
            false
        }
    }

    #[test]
    fn test_in_scope_hook_adds_objects() {
        let l = lab();
        let gem = l.gem;
        let mut p = parser(l.tree);
        assert!(!p.test_scope(gem, None));
        p.set_hooks(Box::new(SeeEverything));
        assert!(p.test_scope(gem, None));
    }

    #[test]
    fn test_dark_room_shows_only_what_is_carried() {
        let l = lab();
        let (cup, table) = (l.cup, l.table);
        let mut p = parser(l.tree);
        let player = p.world().player();
        p.world_mut().move_to(cup, player);
        p.world_mut().set_dark(true);
        assert!(p.test_scope(cup, None));
        assert!(!p.test_scope(table, None));
    }
}

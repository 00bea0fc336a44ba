//! Choosing between objects that matched the same words
//!
//! Every candidate is scored on how plausible it is in context: held
//! objects for "drop", objects in the room for "take", nothing concealed or
//! scenery if something better is around. A clear winner is chosen; a
//! plural or "all" takes the best of them in turn; a tie between objects
//! the player could tell apart by name is referred back as a question.

use super::descriptors::{IndefOwner, ALL_WANTED, LIT_BIT, MY_BIT, PLURAL_BIT, THAT_BIT, UNLIT_BIT};
use super::Parser;
use crate::actions;
use crate::console::Console;
use crate::error::ParseErrorKind;
use crate::grammar::ElementaryToken;
use crate::messages::the_name;
use crate::pronouns::{gna_bit, gna_of};
use crate::routines::Choice;
use crate::world::{Attribute, ObjectId, WorldModel};

const SCORE_IFGOOD: i32 = 500;
const SCORE_UNCONCEALED: i32 = 100;
const SCORE_BESTLOC: i32 = 60;
const SCORE_NEXTBESTLOC: i32 = 40;
const SCORE_NOTCOMPASS: i32 = 20;
const SCORE_NOTSCENERY: i32 = 10;
const SCORE_NOTACTOR: i32 = 5;
const SCORE_GNA: i32 = 1;
/// Scores within the same band of this width count as equally good
/// when taking "all"
const SCORE_DIVISOR: i32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Verdict {
    /// Nothing suitable; `etype` may say why
    Fail,
    /// Ask the player which was meant
    Ask,
    /// The multiple-object list was filled
    Multiple,
    Object(ObjectId),
}

impl<W: WorldModel, C: Console> Parser<W, C> {
    /// Resolve a match list of several objects.
    pub(crate) fn adjudicate(&mut self, context: Option<ElementaryToken>) -> Verdict {
        ptrace!(
            self,
            4,
            "   [Adjudicating match list of size {} in context {}",
            self.state.matches.len(),
            context.map_or("none", |c| c.name())
        );
        let actor = self.state.actor;
        let advance = self.state.advance_warning;

        let objects: Vec<ObjectId> = self.state.matches.objects().collect();
        let mut good_ones = 0;
        let mut last = None;
        for (i, &obj) in objects.iter().enumerate() {
            let good = match context {
                Some(ElementaryToken::Held) | Some(ElementaryToken::MultiHeld) => {
                    self.world.parent(obj) == Some(actor)
                }
                Some(ElementaryToken::MultiExcept) => advance.map_or(true, |a| obj != a),
                Some(ElementaryToken::MultiInside) => match advance {
                    None => self.world.parent(obj) != Some(actor),
                    Some(a) => self.world.is_in(obj, a),
                },
                Some(ElementaryToken::Creature) => self.creature_test(obj),
                _ => true,
            };
            let candidate = &mut self.state.matches.entries_mut()[i];
            candidate.score = if good { SCORE_IFGOOD } else { 0 };
            candidate.class = 0;
            candidate.taken = false;
            if good {
                good_ones += 1;
                last = Some(obj);
            }
        }
        if good_ones == 1 {
            if let Some(o) = last {
                return Verdict::Object(o);
            }
        }

        // Not animate whatever was meant: let the token report it
        if context == Some(ElementaryToken::Creature) && good_ones == 0 {
            return match self.state.matches.first() {
                Some(o) => Verdict::Object(o),
                None => Verdict::Fail,
            };
        }

        if !self.state.indef.mode {
            self.state.indef.kind = 0;
        }
        self.score_match_list(context);
        if self.state.matches.is_empty() {
            return Verdict::Fail;
        }

        if !self.state.indef.mode {
            if let Some(o) = self.state.matches.single_best_guess() {
                ptrace!(self, 4, "   Single best-scoring object returned.]");
                return Verdict::Object(o);
            }
        }

        if self.state.indef.mode && self.state.indef.kind & PLURAL_BIT != 0 {
            return self.take_plural(context);
        }

        let objects: Vec<ObjectId> = self.state.matches.objects().collect();
        let mut classes = vec![0i32; objects.len()];
        let mut next = 1;
        for i in 0..objects.len() {
            if classes[i] != 0 {
                continue;
            }
            classes[i] = next;
            next += 1;
            let mut several = false;
            for j in i + 1..objects.len() {
                if classes[j] == 0 && self.identical(objects[i], objects[j]) {
                    several = true;
                    classes[j] = classes[i];
                }
            }
            if several {
                classes[i] = -classes[i];
            }
        }
        let number_of_classes = (next - 1) as usize;
        self.state.number_of_classes = number_of_classes;
        for (candidate, class) in self.state.matches.entries_mut().iter_mut().zip(&classes) {
            candidate.class = *class;
        }
        ptrace!(self, 4, "   Grouped into {} possibilities by name", number_of_classes);

        if !self.state.indef.mode && number_of_classes > 1 {
            let mut top = -1;
            let mut top_class = 0;
            let mut tied = false;
            for c in self.state.matches.entries() {
                if c.score > top {
                    top = c.score;
                    top_class = c.class.abs();
                    tied = false;
                } else if c.score == top && c.class.abs() != top_class {
                    tied = true;
                }
            }
            if tied {
                ptrace!(self, 4, "   Unable to choose best group, so ask player.]");
                return Verdict::Ask;
            }
            ptrace!(self, 4, "   Best choices are all from the same group.");
        }

        if number_of_classes == 1 {
            self.state.dont_infer = true;
        }
        match self.state.matches.best_guess() {
            Some((o, _)) => Verdict::Object(o),
            None => Verdict::Fail,
        }
    }

    /// Fill the multiple-object list with the best of a plural match.
    fn take_plural(&mut self, context: Option<ElementaryToken>) -> Verdict {
        if !context.map_or(false, |c| c.allows_multiple()) {
            self.state.etype = ParseErrorKind::Multi;
            return Verdict::Fail;
        }
        let actor = self.state.actor;
        let wanted = self.state.indef.wanted;
        let taking = self.state.action_to_be == Some(actions::TAKE)
            || self.state.action_to_be == Some(actions::REMOVE);
        let offset = self.state.multi.len();
        let capacity = self.state.multi.capacity();

        let mut taken = 0;
        let mut band = None;
        while taken < wanted && taken + offset < capacity {
            let (obj, score) = match self.state.matches.best_guess() {
                Some(found) => found,
                None => break,
            };
            let mut accept =
                !self.world.has(obj, Attribute::Concealed) && !self.world.has(obj, Attribute::Worn);
            match band {
                None => band = Some(score / SCORE_DIVISOR),
                Some(b) => {
                    if wanted == ALL_WANTED && score / SCORE_DIVISOR < b {
                        accept = false;
                    }
                }
            }
            let held = self.world.parent(obj) == Some(actor);
            if matches!(
                context,
                Some(ElementaryToken::MultiHeld) | Some(ElementaryToken::MultiExcept)
            ) && !held
            {
                accept = false;
            }
            if taking && held {
                accept = false;
            }
            if let Some(arbiter) = self.arbiter.as_mut() {
                match arbiter.include(obj, accept, &self.world) {
                    Choice::Accept => accept = true,
                    Choice::Reject => accept = false,
                    Choice::NoOpinion => {}
                }
            }
            if accept {
                taken += 1;
                self.state.multi.push_raw(obj);
                ptrace!(self, 4, "   Accepting {}", the_name(&self.world, obj));
            } else {
                ptrace!(self, 4, "   Rejecting {}", the_name(&self.world, obj));
            }
        }

        if taken < wanted && wanted < ALL_WANTED {
            self.state.etype = ParseErrorKind::TooFew;
            self.state.multi_wanted = wanted;
            self.state.multi_had = taken;
            return Verdict::Fail;
        }
        self.state.multi_context = context;
        ptrace!(self, 4, "   Made multiple object of size {}]", taken);
        Verdict::Multiple
    }

    /// Score every candidate, dropping those that fail the descriptors
    /// ("my", "lit", "his").
    pub(crate) fn score_match_list(&mut self, context: Option<ElementaryToken>) {
        let kind = self.state.indef.kind;
        let owner = self.state.indef.owner;
        let cases = self.state.indef.cases;
        let actor = self.state.actor;
        let location = self.state.actors_location;
        let compass = self.world.compass();
        let weight = self.config.choose_objects_weight;

        let mut threshold = 0;
        for bit in [MY_BIT, THAT_BIT, LIT_BIT, UNLIT_BIT] {
            if kind & bit != 0 {
                threshold += 1;
            }
        }
        if owner.is_some() {
            threshold += 1;
        }
        ptrace!(
            self,
            4,
            "   Scoring match list: indef mode {} type {}, satisfying {} requirements:",
            self.state.indef.mode,
            kind,
            threshold
        );

        let (actor_score, location_score) = match context {
            Some(ElementaryToken::Held)
            | Some(ElementaryToken::MultiHeld)
            | Some(ElementaryToken::MultiExcept) => (SCORE_BESTLOC, SCORE_NEXTBESTLOC),
            _ => (SCORE_NEXTBESTLOC, SCORE_BESTLOC),
        };

        let objects: Vec<ObjectId> = self.state.matches.objects().collect();
        let mut rejected = vec![false; objects.len()];
        for (i, &obj) in objects.iter().enumerate() {
            let parent = self.world.parent(obj);
            let mut met = 0;
            if kind & MY_BIT != 0 && parent == Some(actor) {
                met += 1;
            }
            if kind & THAT_BIT != 0 && parent == Some(location) {
                met += 1;
            }
            if kind & LIT_BIT != 0 && self.world.has(obj, Attribute::Light) {
                met += 1;
            }
            if kind & UNLIT_BIT != 0 && !self.world.has(obj, Attribute::Light) {
                met += 1;
            }
            if let (Some(IndefOwner::Object(o)), Some(p)) = (owner, parent) {
                if o == p {
                    met += 1;
                }
            }
            if met < threshold {
                ptrace!(
                    self,
                    4,
                    "   {} ({}) is rejected (doesn't match descriptors)",
                    the_name(&self.world, obj),
                    obj
                );
                rejected[i] = true;
                continue;
            }

            let mut score = 0;
            if !self.world.has(obj, Attribute::Concealed) {
                score = SCORE_UNCONCEALED;
            }
            if parent == Some(actor) {
                score += actor_score;
            } else if parent == Some(location) {
                score += location_score;
            } else if compass.map_or(true, |c| parent != Some(c)) {
                score += SCORE_NOTCOMPASS;
            }
            if let Some(arbiter) = self.arbiter.as_mut() {
                score += weight * arbiter.score(obj, &self.world);
            }
            if !self.world.has(obj, Attribute::Scenery) {
                score += SCORE_NOTSCENERY;
            }
            if obj != actor {
                score += SCORE_NOTACTOR;
            }
            if cases & gna_bit(gna_of(&self.world, obj)) != 0 {
                score += SCORE_GNA;
            }

            let candidate = &mut self.state.matches.entries_mut()[i];
            candidate.score += score;
            let total = candidate.score;
            ptrace!(self, 4, "     {} ({}) : {} points", the_name(&self.world, obj), obj, total);
        }

        let mut index = 0;
        self.state.matches.retain(|_| {
            let keep = !rejected[index];
            index += 1;
            keep
        });
    }

    /// Whether nothing the player could type tells `a` and `b` apart.
    pub(crate) fn identical(&self, a: ObjectId, b: ObjectId) -> bool {
        if a == b {
            return true;
        }
        if let Some(compass) = self.world.compass() {
            if self.world.parent(a) == Some(compass) || self.world.parent(b) == Some(compass) {
                return false;
            }
        }

        let comparer = self.world.equality(a).or_else(|| self.world.equality(b));
        if let Some(verdict) = comparer.and_then(|c| c.identical(a, b)) {
            return verdict;
        }
        if self.world.name_parser(a).is_some() != self.world.name_parser(b).is_some() {
            return false;
        }

        let dict = self.grammar.dictionary();
        let names = |obj| {
            self.world
                .name_words(obj)
                .iter()
                .map(|w| dict.lookup(w))
                .collect::<Vec<_>>()
        };
        let (first, second) = (names(a), names(b));
        first.iter().all(|w| second.contains(w)) && second.iter().all(|w| first.contains(w))
    }

    /// Whether `obj` can be addressed: animate, or talkable when the
    /// action is a conversation.
    pub(crate) fn creature_test(&self, obj: ObjectId) -> bool {
        if self.world.has(obj, Attribute::Animate) {
            return true;
        }
        if !self.world.has(obj, Attribute::Talkable) {
            return false;
        }
        matches!(
            self.state.action_to_be,
            Some(a) if a == actions::ASK || a == actions::ANSWER || a == actions::TELL || a == actions::ASK_FOR
        )
    }

    /// Narrow the multiple-object list now that the other noun is known:
    /// "take all from the box", "drop all except the lamp".
    pub(crate) fn revise_multi(&mut self, second: Option<ObjectId>) -> Option<ParseErrorKind> {
        ptrace!(
            self,
            4,
            "   Revising multiple object list of size {} with 2nd {:?}",
            self.state.multi.len(),
            second
        );
        match self.state.multi_context {
            Some(ElementaryToken::MultiExcept) => self.state.multi.retain(|o| Some(o) != second),
            Some(ElementaryToken::MultiInside) => {
                let world = &self.world;
                self.state
                    .multi
                    .retain(|o| second.map_or(false, |s| world.is_in(o, s)));
            }
            _ => {}
        }

        if self.state.multi_context == Some(ElementaryToken::Multi)
            && self.state.action_to_be == Some(actions::TAKE)
        {
            let ceiling = self.scope_ceiling(self.state.actor);
            let alongside: Vec<ObjectId> = self
                .state
                .multi
                .objects()
                .iter()
                .copied()
                .filter(|&o| self.scope_ceiling(o) == ceiling)
                .collect();
            ptrace!(self, 4, "   Token 2 plural case: number with actor {}", alongside.len());
            if self.state.take_all_rule == 2 || !alongside.is_empty() {
                self.state.multi.retain(|o| alongside.contains(&o));
            }
        }

        ptrace!(self, 4, "   Done: new size {}", self.state.multi.len());
        if self.state.multi.is_empty() {
            return Some(ParseErrorKind::Nothing);
        }
        None
    }
}

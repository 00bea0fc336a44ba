// The library's core verbs

use crate::error::GrammarError;
use crate::grammar::Grammar;

/// A grammar holding the core verb set, with words significant to
/// `resolution` characters.
pub fn standard_grammar(resolution: usize) -> Result<Grammar, GrammarError> {
    let mut g = Grammar::new(resolution);
    install(&mut g)?;
    Ok(g)
}

/// Add the core verb set to an existing grammar.
pub fn install(g: &mut Grammar) -> Result<(), GrammarError> {
    // Out-of-world verbs
    g.meta_verb(&["score"], &["-> Score"])?;
    g.meta_verb(&["q//", "quit", "die"], &["-> Quit"])?;
    g.meta_verb(&["verbose", "long"], &["-> LMode2"])?;
    g.meta_verb(&["brief", "normal"], &["-> LMode1"])?;
    g.meta_verb(&["pronouns", "nouns"], &["-> Pronouns"])?;

    g.verb(
        &["take", "carry", "hold"],
        &[
            "multi -> Take",
            "'off' worn -> Disrobe",
            "multiinside 'from' noun -> Remove",
            "multiinside 'off' noun -> Remove",
            "'inventory' -> Inv",
        ],
    )?;
    g.verb(
        &["get"],
        &[
            "'out'/'off'/'up' -> Exit",
            "multi -> Take",
            "'in'/'into'/'on'/'onto' noun -> Enter",
            "'off' noun -> GetOff",
            "multiinside 'from' noun -> Remove",
        ],
    )?;
    g.verb(&["pick"], &["'up' multi -> Take", "multi 'up' -> Take"])?;
    g.verb(
        &["remove"],
        &[
            "held -> Disrobe",
            "multi -> Take",
            "multiinside 'from' noun -> Remove",
        ],
    )?;
    g.verb(&["wear", "don"], &["held -> Wear"])?;
    g.verb(
        &["put"],
        &[
            "multiexcept 'in'/'inside'/'into' noun -> Insert",
            "multiexcept 'on'/'onto' noun -> PutOn",
            "'on' held -> Wear",
            "'down' multiheld -> Drop",
            "multiheld 'down' -> Drop",
        ],
    )?;
    g.verb(&["insert"], &["multiexcept 'in'/'into' noun -> Insert"])?;
    g.verb(
        &["drop", "throw", "discard"],
        &[
            "multiheld -> Drop",
            "multiexcept 'in'/'into'/'down' noun -> Insert",
            "multiexcept 'on'/'onto' noun -> PutOn",
            "held 'at'/'against'/'on'/'onto' noun -> ThrowAt",
        ],
    )?;
    g.verb(
        &["give", "pay", "offer", "feed"],
        &[
            "held 'to' creature -> Give",
            "creature held -> Give reverse",
            "'over' held 'to' creature -> Give",
        ],
    )?;
    g.verb(
        &["show", "present", "display"],
        &["creature held -> Show reverse", "held 'to' creature -> Show"],
    )?;
    g.verb(
        &["go", "walk", "run"],
        &[
            "-> VagueGo",
            "noun=ADirection -> Go",
            "noun -> Enter",
            "'into'/'in'/'inside'/'through' noun -> Enter",
        ],
    )?;
    g.verb(
        &["inventory", "inv", "i//"],
        &["-> Inv", "'tall' -> InvTall", "'wide' -> InvWide"],
    )?;
    g.verb(
        &["look", "l//"],
        &[
            "-> Look",
            "'at' noun -> Examine",
            "'inside'/'in'/'into'/'through' noun -> Search",
            "'under' noun -> LookUnder",
            "'up' topic 'in' noun -> Consult",
        ],
    )?;
    g.verb(&["enter", "cross"], &["-> GoIn", "noun -> Enter"])?;
    g.verb(&["exit", "out", "outside"], &["-> Exit"])?;
    g.verb(
        &["examine", "x//", "watch", "describe", "check"],
        &["noun -> Examine"],
    )?;
    g.verb(
        &["read"],
        &[
            "noun -> Examine",
            "'about' topic 'in' noun -> Consult",
            "topic 'in' noun -> Consult",
        ],
    )?;
    g.verb(&["wait", "z//"], &["-> Wait"])?;
    g.verb(
        &["answer", "say", "shout", "speak"],
        &["topic 'to' creature -> Answer"],
    )?;
    g.verb(&["tell"], &["creature 'about' topic -> Tell"])?;
    g.verb(
        &["ask"],
        &["creature 'about' topic -> Ask", "creature 'for' noun -> AskFor"],
    )?;
    g.verb(&["eat"], &["held -> Eat"])?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions;

    #[test]
    fn test_standard_grammar_builds() {
        let g = standard_grammar(9).unwrap();
        let d = g.dictionary();

        let put = g.lines_for(d.lookup("put").unwrap()).unwrap();
        assert_eq!(put.lines.len(), 5);
        assert_eq!(put.lines[0].action, actions::INSERT);
        assert_eq!(g.describe_line(&put.lines[1]), "* multiexcept 'on'/'onto' noun -> PutOn");

        let q = d.lookup("q").unwrap();
        assert!(d.is_meta(q));
        assert_eq!(g.lines_for(q).unwrap().lines[0].action, actions::QUIT);

        let x = g.lines_for(d.lookup("x").unwrap()).unwrap();
        assert_eq!(x.lines[0].action, actions::EXAMINE);

        // every standard line names a standard action
        for verb in g.verbs() {
            for line in &verb.lines {
                assert!((line.action.0 as usize) < actions::STANDARD_ACTIONS.len());
            }
        }
    }

    #[test]
    fn test_give_has_reversed_line() {
        let g = standard_grammar(9).unwrap();
        let give = g.lines_for(g.dictionary().lookup("feed").unwrap()).unwrap();
        assert!(!give.lines[0].reversed);
        assert!(give.lines[1].reversed);
        assert_eq!(give.lines[2].params_wanted(), 2);
    }
}

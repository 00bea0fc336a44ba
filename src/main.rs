use inparse::actions;
use inparse::config::ParserConfig;
use inparse::console::{Console, StdConsole};
use inparse::error::ParserError;
use inparse::messages::the_name;
use inparse::object_tree::{ObjectKind, ObjectTree};
use inparse::parser::{Command, Param, Parser, Special};
use inparse::world::{Attribute, WorldModel};
use log::{debug, info};
use std::env;
use std::path::Path;

/// A small world to try the parser against.
fn demo_world() -> ObjectTree {
    let mut tree = ObjectTree::new();
    let study = tree.add("Study", &["study"], ObjectKind::Room);
    tree.give(study, Attribute::Visited);
    let me = tree.add("yourself", &["me", "myself", "self"], ObjectKind::Person { female: false });
    tree.give(me, Attribute::Concealed);
    tree.move_to(me, study);
    tree.set_player(me);
    tree.set_location(study);
    tree.add_compass();

    let desk = tree.add("oak desk", &["oak", "desk"], ObjectKind::Supporter);
    tree.give(desk, Attribute::Static);
    tree.move_to(desk, study);
    let lamp = tree.add("brass lamp", &["brass", "lamp", "lantern"], ObjectKind::Item);
    tree.move_to(lamp, desk);
    let box_ = tree.add("wooden box", &["wooden", "box"], ObjectKind::Container { open: true });
    tree.move_to(box_, study);
    let red = tree.add("red ball", &["red", "ball", "balls//p"], ObjectKind::Item);
    tree.move_to(red, study);
    let blue = tree.add("blue ball", &["blue", "ball", "balls//p"], ObjectKind::Item);
    tree.move_to(blue, box_);
    let coin = tree.add("gold coin", &["gold", "coin", "coins//p"], ObjectKind::Item);
    tree.move_to(coin, me);
    let window = tree.add("window", &["window"], ObjectKind::Scenery);
    tree.move_to(window, study);
    let butler = tree.add("Jeeves", &["jeeves", "butler"], ObjectKind::Person { female: false });
    tree.give(butler, Attribute::Proper);
    tree.move_to(butler, study);
    tree
}

fn describe(world: &ObjectTree, cmd: &Command) -> String {
    let mut out = format!("{}", cmd.action);
    for param in &cmd.params {
        let text = match param {
            Param::Object(o) => the_name(world, *o),
            Param::Multiple => {
                let names: Vec<String> = cmd.multiple.iter().map(|o| the_name(world, *o)).collect();
                format!("[{}]", names.join(", "))
            }
            Param::Number(Special::Number(n)) => n.to_string(),
            Param::Number(Special::Word(_)) => "(word)".to_string(),
        };
        out.push(' ');
        out.push_str(&text);
    }
    if cmd.actor != world.player() {
        out.push_str(&format!(" (asked of {})", the_name(world, cmd.actor)));
    }
    if cmd.meta {
        out.push_str(" [meta]");
    }
    out
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let mut config = ParserConfig::default();
    let mut trace = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" if i + 1 < args.len() => {
                config = ParserConfig::read_toml(Path::new(&args[i + 1]))?;
                info!("configuration read from {}", args[i + 1]);
                i += 2;
            }
            "--trace" if i + 1 < args.len() => {
                let level = args[i + 1]
                    .parse::<u8>()
                    .map_err(|_| format!("Invalid trace level: {}", args[i + 1]))?;
                trace = Some(level);
                i += 2;
            }
            _ => {
                println!("inparse - try the command parser against a small world");
                println!();
                println!("Usage: {} [--config parser.toml] [--trace level]", args[0]);
                println!();
                println!("Parser traces are logged at debug level; run with");
                println!("RUST_LOG=inparse::trace=debug to see them.");
                return Ok(());
            }
        }
    }
    if let Some(level) = trace {
        config.trace_level = level;
    }

    let mut parser = Parser::standard(demo_world(), StdConsole::new(), config)?;
    parser.console_mut().print("Study\nYou are in a cluttered study.\n")?;

    loop {
        let cmd = match parser.parse_input() {
            Ok(cmd) => cmd,
            Err(ParserError::InputClosed) => {
                debug!("input closed");
                break;
            }
            Err(e) => return Err(Box::new(e)),
        };
        let text = describe(parser.world(), &cmd);
        parser.console_mut().print(&format!("{}\n", text))?;
        match cmd.action {
            actions::QUIT => break,
            actions::PRONOUNS => {
                let text = parser.describe_pronouns();
                parser.console_mut().print(&format!("{}\n", text))?;
            }
            _ => {}
        }
    }
    Ok(())
}

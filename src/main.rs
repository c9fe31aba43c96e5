//! Beast Tactics - headless battle driver
//!
//! Loads a level, fills the roster, and reads one command per line from
//! stdin. Every command prints the events it produced.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use beast_tactics::battle::{LevelSpec, TraceSink};
use beast_tactics::content::ContentTable;
use beast_tactics::core::error::{BattleError, Result};
use beast_tactics::core::{ActorId, BattleConfig, Difficulty, SeededDice};
use beast_tactics::grid::Coord;
use beast_tactics::persistence::TeamRecord;
use beast_tactics::Session;
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Headless Beast Tactics battle driver
#[derive(Parser, Debug)]
#[command(name = "beast-tactics")]
#[command(about = "Play a Beast Tactics level from the command line")]
struct Args {
    /// Level file (TOML)
    level: PathBuf,

    /// Battle config file (TOML); defaults apply when left out
    #[arg(long)]
    config: Option<PathBuf>,

    /// Species table (TOML); the built-in table when left out
    #[arg(long)]
    species: Option<PathBuf>,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Ally to bring, as `Species[:Name]`; repeatable
    #[arg(long = "ally")]
    allies: Vec<String>,

    /// Saved team (JSON) to bring instead of `--ally`
    #[arg(long)]
    roster: Option<PathBuf>,

    /// Level of allies created from the command line
    #[arg(long, default_value_t = 5)]
    ally_level: u32,

    /// easy, standard or hard
    #[arg(long, default_value = "standard")]
    difficulty: String,

    /// Saved teams (JSON) for a 2-4 player hotseat game
    #[arg(long, num_args = 2..=4)]
    hotseat: Vec<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("beast_tactics=info")),
        )
        .init();

    let args = Args::parse();
    let seed = args.seed.unwrap_or_else(rand::random);
    tracing::info!("Beast Tactics starting with seed {}", seed);

    let config = match &args.config {
        Some(path) => BattleConfig::load(path)?,
        None => BattleConfig::headless(),
    };
    let content = match &args.species {
        Some(path) => ContentTable::load(path)?,
        None => ContentTable::builtin()?,
    };
    let mut session = Session::new(config, Box::new(content), Box::new(SeededDice::new(seed)))?
        .with_sink(Box::new(TraceSink));
    session.difficulty = parse_difficulty(&args.difficulty)?;

    let spec = LevelSpec::load(&args.level)?;
    if args.hotseat.is_empty() {
        fill_roster(&mut session, &args)?;
        session.load_level(&spec)?;
    } else {
        let records = args
            .hotseat
            .iter()
            .map(|p| read_record(p))
            .collect::<Result<Vec<_>>>()?;
        session.start_hotseat(&spec, &records)?;
    }
    print_events(&mut session);
    print_help();

    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let words: Vec<&str> = line.split_whitespace().collect();
        if words.is_empty() {
            continue;
        }
        if matches!(words[0], "quit" | "q") {
            break;
        }
        if let Err(e) = run_command(&mut session, &words) {
            println!("error: {}", e);
        }
        print_events(&mut session);
        if let Some(outcome) = session.level().ok().and_then(|l| l.outcome.clone()) {
            println!("Battle over: {:?}", outcome);
            break;
        }
    }

    if session.has_level() {
        session.end_level()?;
    }
    println!("Goodbye!");
    Ok(())
}

fn parse_difficulty(name: &str) -> Result<Difficulty> {
    match name.to_ascii_lowercase().as_str() {
        "easy" => Ok(Difficulty::Easy),
        "standard" => Ok(Difficulty::Standard),
        "hard" => Ok(Difficulty::Hard),
        other => Err(BattleError::InvalidConfig(format!("unknown difficulty '{}'", other))),
    }
}

fn read_record(path: &Path) -> Result<TeamRecord> {
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

fn fill_roster(session: &mut Session, args: &Args) -> Result<()> {
    if let Some(path) = &args.roster {
        let record = read_record(path)?;
        for ally in session.reconstruct_team(&record, args.ally_level)? {
            session.recruit(ally);
        }
    }
    for entry in &args.allies {
        let (species, name) = entry.split_once(':').unwrap_or((entry.as_str(), entry.as_str()));
        let ally = session.create_ally(species, name, args.ally_level)?;
        session.recruit(ally);
    }
    Ok(())
}

fn print_help() {
    println!();
    println!("Commands:");
    println!("  units                       - List units on the field");
    println!("  moves <id>                  - Show where a unit can move and strike");
    println!("  move <id> <x> <y>           - Walk a unit");
    println!("  attack <id> <target>        - Attack, walking into range if needed");
    println!("  act <id> <action> <target>  - Use a named action (no spaces: EggCannon)");
    println!("  invoke <id>                 - Invoke a unit's ability");
    println!("  pick <x> <y>                - Answer a tile selection");
    println!("  cancel                      - Drop the pending tile selection");
    println!("  skip <id>                   - End one unit's turn");
    println!("  next                        - End the team's turn");
    println!("  save <file>                 - Save allies to a JSON file");
    println!("  quit                        - Leave");
    println!();
}

fn arg<T: std::str::FromStr>(words: &[&str], index: usize, what: &str) -> Result<T> {
    words
        .get(index)
        .map(|w| w.trim_start_matches('#'))
        .and_then(|w| w.parse().ok())
        .ok_or_else(|| BattleError::InvalidConfig(format!("expected {} at position {}", what, index)))
}

fn id_arg(words: &[&str], index: usize) -> Result<ActorId> {
    arg::<u32>(words, index, "a unit id").map(ActorId)
}

fn coord_arg(words: &[&str], index: usize) -> Result<Coord> {
    Ok(Coord::new(
        arg(words, index, "an x coordinate")?,
        arg(words, index + 1, "a y coordinate")?,
    ))
}

fn run_command(session: &mut Session, words: &[&str]) -> Result<()> {
    match words[0] {
        "units" | "u" => print_units(session)?,
        "moves" => {
            let query = session.move_query(id_arg(words, 1)?)?;
            let moves: Vec<String> = query.move_tiles().iter().map(|c| c.to_string()).collect();
            let attacks: Vec<String> = query.attacks.iter().map(|a| a.coord.to_string()).collect();
            println!("move: {}", moves.join(" "));
            println!("attack: {}", attacks.join(" "));
        }
        "move" => {
            let moved = session.move_unit(id_arg(words, 1)?, coord_arg(words, 2)?)?;
            println!("{}", if moved { "moved" } else { "cannot move there" });
        }
        "attack" | "a" => {
            let outcome = session.engage(id_arg(words, 1)?, id_arg(words, 2)?)?;
            println!("{:?}", outcome);
        }
        "act" => {
            let name = words
                .get(2)
                .ok_or_else(|| BattleError::InvalidConfig("expected an action name".into()))?;
            let used = session.use_action(id_arg(words, 1)?, name, id_arg(words, 3)?)?;
            println!("{}", if used { "done" } else { "cannot do that" });
        }
        "invoke" => {
            let used = session.invoke_ability(id_arg(words, 1)?)?;
            println!("{}", if used { "invoked" } else { "nothing happened" });
        }
        "pick" => {
            let done = session.choose_tile(coord_arg(words, 1)?)?;
            println!("{}", if done { "picked" } else { "not an offered tile" });
        }
        "cancel" => {
            session.cancel_selection();
        }
        "skip" => {
            session.skip(id_arg(words, 1)?)?;
        }
        "next" | "n" => session.end_turn()?,
        "save" => {
            let path = words
                .get(1)
                .ok_or_else(|| BattleError::InvalidConfig("expected a file name".into()))?;
            let record = allies_record(session);
            std::fs::write(path, serde_json::to_string_pretty(&record)?)?;
            println!("saved {} allies to {}", record.animals.len(), path);
        }
        "help" | "?" => print_help(),
        other => println!("unknown command '{}'", other),
    }
    Ok(())
}

/// Allies on the field plus those waiting in the roster
fn allies_record(session: &Session) -> TeamRecord {
    let fielded: Vec<_> = session
        .animal_ids()
        .into_iter()
        .filter_map(|id| session.animal(id))
        .filter(|a| a.is_ally())
        .collect();
    TeamRecord::from_animals("allies", fielded.into_iter().chain(&session.roster))
}

fn print_units(session: &Session) -> Result<()> {
    let level = session.level()?;
    if let Some(team) = level.current_team() {
        println!("Round {} - {} to act", level.turn.round(), team.display_name);
    }
    for id in session.animal_ids() {
        let Some(animal) = session.animal(id) else {
            continue;
        };
        let team = animal.team.as_ref().map(|t| t.as_str()).unwrap_or("-");
        let tile = session
            .tile_of(id)
            .map(|c| c.to_string())
            .unwrap_or_else(|| "-".into());
        let done = if level.turn.has_completed(id) { " (done)" } else { "" };
        println!(
            "  {} {} the {} [{}] lv{} HP {}/{} at {}{}",
            id,
            animal.name,
            animal.species,
            team,
            animal.level,
            animal.hp(),
            animal.max_hp(),
            tile,
            done
        );
    }
    Ok(())
}

fn print_events(session: &mut Session) {
    for event in session.drain_events() {
        println!("  {:?}", event);
    }
}

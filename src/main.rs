// src/main.rs
use lazy_static::lazy_static;
use regex::Regex;
use std::cell::RefCell;
use std::env;
use std::error::Error;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::rc::Rc;

use click_chess::config::DEFAULT_CONFIG_FILENAME;
use click_chess::{CastleSide, Color, Config, Game, GameEvent, MoveNotification, Square};

lazy_static! {
    // "e2e4", "e2 e4", "e2-e4"
    static ref MOVE_RE: Regex = Regex::new(r"(?i)^([a-h][1-8])\s*-?\s*([a-h][1-8])$").unwrap();
    // "save", "load game.txt", "new black"
    static ref COMMAND_RE: Regex = Regex::new(r"^([a-z]+)(?:\s+(\S+))?$").unwrap();
}

// --- Input Parsing ---

#[derive(Debug)]
enum UserInput {
    Move(Square, Square),
    Command(Command),
}

#[derive(Debug)]
enum Command {
    Moves(Square),
    Save(Option<String>),
    Load(Option<String>),
    New(bool),
    Board,
    Help,
    Quit,
}

/// Parses one line of user input, or returns a message explaining what went wrong.
fn parse_user_input(input: &str) -> Result<UserInput, String> {
    let trimmed = input.trim();

    if let Some(caps) = MOVE_RE.captures(trimmed) {
        let from = caps[1].parse::<Square>().map_err(|e| e.to_string())?;
        let to = caps[2].parse::<Square>().map_err(|e| e.to_string())?;
        return Ok(UserInput::Move(from, to));
    }

    let lower = trimmed.to_lowercase();
    let caps = COMMAND_RE.captures(&lower)
        .ok_or_else(|| format!("Unknown input: '{}'. Type 'help' for commands.", trimmed))?;
    let argument = caps.get(2).map(|m| m.as_str().to_string());

    let command = match (&caps[1], argument) {
        ("moves", Some(arg)) => Command::Moves(arg.parse::<Square>().map_err(|e| e.to_string())?),
        ("moves", None) => return Err("Missing argument for 'moves', e.g. 'moves e2'".to_string()),
        ("save", arg) => Command::Save(arg),
        ("load", arg) => Command::Load(arg),
        ("new", None) => Command::New(true),
        ("new", Some(arg)) if arg == "white" => Command::New(true),
        ("new", Some(arg)) if arg == "black" => Command::New(false),
        ("new", Some(arg)) => return Err(format!("Invalid argument for 'new': '{}' (use white or black)", arg)),
        ("board", None) => Command::Board,
        ("help", None) => Command::Help,
        ("quit", None) | ("exit", None) => Command::Quit,
        (word, _) => return Err(format!("Unknown command: '{}'. Type 'help' for commands.", word)),
    };
    // Save/load paths keep the user's original casing.
    let command = match command {
        Command::Save(Some(_)) | Command::Load(Some(_)) => restore_path_case(command, trimmed),
        other => other,
    };
    Ok(UserInput::Command(command))
}

fn restore_path_case(command: Command, original: &str) -> Command {
    let path = original.split_whitespace().nth(1).map(str::to_string);
    match command {
        Command::Save(_) => Command::Save(path),
        Command::Load(_) => Command::Load(path),
        other => other,
    }
}

fn describe_move(n: &MoveNotification, mover: Color) -> String {
    let mut text = if n.is_castle {
        format!("{:?} castles: king to {}, rook to {}",
            mover,
            n.king_after.map_or("?".to_string(), |s| s.to_algebraic()),
            n.rook_after.map_or("?".to_string(), |s| s.to_algebraic()))
    } else {
        format!("{:?} plays {} {} -> {}", mover, n.glyph, n.origin.to_algebraic(), n.destination.to_algebraic())
    };
    if n.is_checkmate {
        text.push_str(" -- checkmate!");
    } else if n.gives_check {
        text.push_str(" -- check!");
    }
    text
}

// --- Main Game Loop ---

fn main() -> Result<(), Box<dyn Error>> {
    let config_path = env::args().nth(1).map(PathBuf::from).unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILENAME));
    let config = match Config::load_or_default(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Warning: {}. Using default settings.", e);
            Config::default()
        }
    };

    let mut game = Game::with_side_to_move(config.white_moves_first);
    game.set_load_policy(config.load_policy());

    // The notification channel: the loop below drains whatever the engine reported.
    let events: Rc<RefCell<Vec<GameEvent>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    game.subscribe(Box::new(move |event| sink.borrow_mut().push(event.clone())));

    println!("==============================");
    println!("|        Click Chess         |");
    println!("==============================");
    print_help();

    let mut game_over = false;
    println!("{}", game.render(config.unicode_glyphs));

    'game_loop: loop {
        if game_over {
            print!("\nGame over. Enter 'new', 'load', 'save' or 'quit': ");
        } else {
            print!("\n{:?}'s turn. Enter move (e.g. e2e4) or command: ", game.side_to_move());
        }
        io::stdout().flush()?;

        let mut input_line = String::new();
        match io::stdin().read_line(&mut input_line) {
            Ok(0) => {
                println!("\nEnd of input detected. Quitting game.");
                break 'game_loop;
            }
            Ok(_) => {}
            Err(e) => {
                eprintln!("Error reading input: {}. Try again or use 'quit'.", e);
                continue 'game_loop;
            }
        }
        if input_line.trim().is_empty() { continue 'game_loop; }

        match parse_user_input(&input_line) {
            Ok(UserInput::Move(from, to)) => {
                if game_over {
                    println!("The game is over. Start a new one with 'new'.");
                    continue 'game_loop;
                }
                let mover = game.side_to_move();
                if !game.try_select_origin(from) {
                    println!("Illegal selection: {} does not hold a {:?} piece.", from.to_algebraic(), mover);
                    continue 'game_loop;
                }
                if let Some(castle) = game.castle_plan(from, to) {
                    let side = match castle.side { CastleSide::Short => "short", CastleSide::Long => "long" };
                    println!("Attempting {} castle...", side);
                }
                if !game.commit_move(from, to) {
                    println!("Illegal move: {} -> {}.", from.to_algebraic(), to.to_algebraic());
                    if config.show_destinations {
                        print_destinations(&game, from);
                    }
                    continue 'game_loop;
                }
            }
            Ok(UserInput::Command(Command::Moves(from))) => {
                if game.try_select_origin(from) {
                    print_destinations(&game, from);
                } else {
                    println!("{} does not hold a {:?} piece.", from.to_algebraic(), game.side_to_move());
                }
            }
            Ok(UserInput::Command(Command::Save(path))) => {
                let path = path.unwrap_or_else(|| config.save_path.clone());
                match fs::write(&path, game.save()) {
                    Ok(()) => println!("Game saved to '{}'.", path),
                    Err(e) => eprintln!("Error: failed to save game to '{}': {}", path, e),
                }
            }
            Ok(UserInput::Command(Command::Load(path))) => {
                let path = path.unwrap_or_else(|| config.save_path.clone());
                if let Err(e) = game.load_file(Some(&path), config.white_moves_first) {
                    eprintln!("Error: could not load '{}': {}", path, e);
                }
            }
            Ok(UserInput::Command(Command::New(white_first))) => game.new_game(white_first),
            Ok(UserInput::Command(Command::Board)) => println!("{}", game.render(config.unicode_glyphs)),
            Ok(UserInput::Command(Command::Help)) => print_help(),
            Ok(UserInput::Command(Command::Quit)) => {
                println!("Goodbye.");
                break 'game_loop;
            }
            Err(message) => {
                println!("{}", message);
                continue 'game_loop;
            }
        }

        // Report whatever the engine announced for this command.
        let drained: Vec<GameEvent> = events.borrow_mut().drain(..).collect();
        for event in drained {
            match event {
                GameEvent::Moved(notification) => {
                    let mover = game.side_to_move().opponent();
                    println!("{}", describe_move(&notification, mover));
                    println!("{}", game.render(config.unicode_glyphs));
                    if notification.is_checkmate {
                        println!("\n=== GAME OVER: {:?} wins by checkmate. ===", mover);
                        game_over = true;
                    }
                }
                GameEvent::Reset => {
                    println!("--- Board reset. ---");
                    println!("{}", game.render(config.unicode_glyphs));
                    game_over = false;
                }
            }
        }
    }

    Ok(())
}

fn print_destinations(game: &Game, from: Square) {
    let destinations: Vec<String> = game.legal_destinations_from(from).iter().map(|s| s.to_algebraic()).collect();
    if destinations.is_empty() {
        println!("{} {} has no legal moves.", game.piece_glyph_at(from), from.to_algebraic());
    } else {
        println!("{} {} can move to: {}", game.piece_glyph_at(from), from.to_algebraic(), destinations.join(" "));
    }
}

fn print_help() {
    println!("\nCommands:");
    println!("  e2e4 | e2 e4     Move the piece on e2 to e4");
    println!("  e1h1             Castle by moving the king onto its rook (or the rook onto its king)");
    println!("  moves <square>   List legal destinations for the piece on <square>");
    println!("  save [file]      Save the game (default from config)");
    println!("  load [file]      Load a saved game");
    println!("  new [white|black] Start a new game with the given side to move");
    println!("  board            Show the board");
    println!("  help             Show this help");
    println!("  quit | exit      Leave the game");
}

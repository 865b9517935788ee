use draughts_core::board::{Color, Square, Variant};
use draughts_core::game::{Algorithm, Game};
use draughts_core::search::{Cancel, SearchOptions};
use std::io::{self, BufRead, Write};

fn print_board(game: &Game) {
    let snapshot = game.current_board();
    println!("side to move: {}", snapshot.side_to_move);
    for piece in &snapshot.pieces {
        println!(
            "  {} {:?} at {}",
            match piece.color {
                Color::White => "White",
                Color::Black => "Black",
            },
            piece.kind,
            piece.square
        );
    }
}

fn parse_square(token: &str) -> Option<Square> {
    let (row, col) = token.split_once(',')?;
    Some(Square::new(row.trim().parse().ok()?, col.trim().parse().ok()?))
}

fn play_self(mut game: Game, max_plies: u32) {
    let mut options = SearchOptions::default();
    options.max_depth = 8;
    let cancel = Cancel::new();

    for ply in 0..max_plies {
        if let Some(winner) = game.is_game_over() {
            println!("game over: {winner:?}");
            break;
        }
        let side = game.current_board().side_to_move;
        let chosen = game.select_ai_move(side, Algorithm::Minimax, &options, None, Some(cancel.clone()));
        let Ok(Some(mv)) = chosen else {
            break;
        };
        let steps: Vec<Square> = mv.steps.iter().copied().collect();
        if game.make_move(mv.start, &steps).is_err() {
            break;
        }
        tracing::info!(ply, %mv, "played move");
    }
}

fn main() {
    #[cfg(feature = "cli")]
    draughts_core::logger::init_logging("logs/cli.log", "info");

    let mut args = std::env::args().skip(1);
    let variant = match args.next().as_deref() {
        Some("international") => Variant::International,
        _ => Variant::British,
    };

    let mut game = Game::new_game(variant);
    println!("draughts-cli — type 'auto' for a self-play demo, or moves as 'r,c r,c ...'");
    print_board(&game);

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let Ok(line) = line else { break };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "quit" {
            break;
        }
        if line == "auto" {
            play_self(game, 200);
            return;
        }

        let tokens: Vec<Square> = line.split_whitespace().filter_map(parse_square).collect();
        let Some((start, steps)) = tokens.split_first() else {
            println!("could not parse move");
            continue;
        };
        match game.make_move(*start, steps) {
            Ok(_) => print_board(&game),
            Err(e) => println!("rejected: {e}"),
        }
        io::stdout().flush().ok();
    }
}

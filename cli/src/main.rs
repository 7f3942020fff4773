//! Terminal Minesweeper.
use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use termsweeper_core::{CellCount, Coord, Game, GameConfig};

mod app;
mod input;
mod render;

const CONTROLS: &str = "\
Controls:
 - WASD or arrow keys to move the cursor
 - ENTER or SPACE to reveal what's under the cursor
 - E or F to flag/unflag the cell under the cursor (only visual)
 - ESC or Ctrl-C to quit

How to win:
 - Uncover all the cells that have no mine without triggering any mine";

#[derive(Parser, Debug)]
#[command(version, about, after_help = CONTROLS)]
struct Args {
    /// Board width in cells
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u8).range(3..))]
    width: Coord,

    /// Board height in cells
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u8).range(3..))]
    height: Coord,

    /// Mine count, 15% of the cells when omitted
    #[arg(short, long, value_parser = clap::value_parser!(u16).range(1..))]
    mines: Option<CellCount>,

    /// Force a seed instead of random
    #[arg(short, long)]
    seed: Option<u64>,

    /// Write logs to this file, nothing is logged without it
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// What log level to use
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,
}

fn init_logging(args: &Args) -> Result<()> {
    let Some(path) = &args.log_file else {
        return Ok(());
    };
    let file = File::create(path)
        .with_context(|| format!("could not create log file {}", path.display()))?;
    simplelog::WriteLogger::init(
        args.verbose.log_level_filter(),
        simplelog::Config::default(),
        file,
    )
    .context("could not install logger")
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args)?;

    let config = GameConfig::new((args.width, args.height), args.mines)
        .context("invalid game configuration")?;
    let seed = args.seed.unwrap_or_else(rand::random);
    log::debug!("seed: {}", seed);
    log::info!(
        "Starting {}x{} game with {} mines",
        config.width(),
        config.height(),
        config.mines()
    );

    app::App::new(Game::new(config, seed)).run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn args_are_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn defaults_give_ten_by_ten_board() {
        let args = Args::try_parse_from(["termsweeper"]).unwrap();

        assert_eq!((args.width, args.height), (10, 10));
        assert_eq!(args.mines, None);
        let config = GameConfig::new((args.width, args.height), args.mines).unwrap();
        assert_eq!(config.mines(), 15);
    }

    #[test]
    fn small_boards_and_zero_mines_are_rejected() {
        assert!(Args::try_parse_from(["termsweeper", "--width", "2"]).is_err());
        assert!(Args::try_parse_from(["termsweeper", "--mines", "0"]).is_err());
        assert!(Args::try_parse_from(["termsweeper", "--height", "300"]).is_err());
    }

    #[test]
    fn seed_and_mines_are_parsed() {
        let args =
            Args::try_parse_from(["termsweeper", "--width", "16", "-m", "40", "-s", "7"]).unwrap();

        assert_eq!(args.width, 16);
        assert_eq!(args.mines, Some(40));
        assert_eq!(args.seed, Some(7));
    }
}

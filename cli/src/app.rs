use std::io::{self, Stdout, Write};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::cursor::{Hide, Show};
use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, SetTitle, disable_raw_mode, enable_raw_mode,
};
use termsweeper_core::{Game, KeyOutcome};

use crate::input::{EndKey, KeyAction, map_end_key, map_key};
use crate::render::Renderer;

/// Confirmations needed on the end screen before a new round starts.
const CONFIRM_PRESSES: u8 = 3;
const END_PAUSE: Duration = Duration::from_millis(300);
const RESTART_PAUSE: Duration = Duration::from_millis(350);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum RoundEnd {
    Finished,
    Quit,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum EndChoice {
    PlayAgain,
    Exit,
}

/// Raw mode and alternate screen for as long as it lives.
pub struct TerminalGuard;

impl TerminalGuard {
    pub fn enter(out: &mut impl Write) -> io::Result<Self> {
        enable_raw_mode()?;
        execute!(
            out,
            EnterAlternateScreen,
            Hide,
            SetTitle(format!("termsweeper @v{}", env!("CARGO_PKG_VERSION")))
        )?;
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if let Err(err) = execute!(io::stdout(), Show, LeaveAlternateScreen) {
            log::warn!("Could not restore screen: {}", err);
        }
        if let Err(err) = disable_raw_mode() {
            log::warn!("Could not leave raw mode: {}", err);
        }
    }
}

pub struct App {
    game: Game,
    renderer: Renderer<Stdout>,
}

impl App {
    pub fn new(game: Game) -> Self {
        Self {
            game,
            renderer: Renderer::new(io::stdout()),
        }
    }

    /// Plays rounds until the player exits.
    pub fn run(mut self) -> Result<()> {
        let _guard = TerminalGuard::enter(&mut io::stdout()).context("could not set up terminal")?;

        loop {
            if self.play_round()? == RoundEnd::Quit {
                log::info!("Player quit mid-round");
                return Ok(());
            }
            match self.end_screen()? {
                EndChoice::Exit => return Ok(()),
                EndChoice::PlayAgain => self.game.reset(),
            }
        }
    }

    fn play_round(&mut self) -> Result<RoundEnd> {
        self.renderer.invalidate();
        self.renderer.draw(&self.game.snapshot())?;

        while !self.game.is_finished() {
            match event::read()? {
                Event::Key(key) => match map_key(key) {
                    KeyAction::Quit => return Ok(RoundEnd::Quit),
                    KeyAction::Press(press) => {
                        // mines shown by the cheat code disappear on the next key
                        let hide_mines = self.game.cheat_reveal();
                        let outcome = self.game.press(press)?;
                        if outcome == KeyOutcome::CheatActivated {
                            log::info!("Cheat mode activated");
                        }
                        log::trace!("{:?} -> {:?}", press, outcome);

                        if outcome.has_update() || hide_mines {
                            self.renderer.draw(&self.game.snapshot())?;
                        }
                    }
                    KeyAction::None => {}
                },
                Event::Resize(width, height) => {
                    log::debug!("Terminal resized to {}x{}", width, height);
                    self.renderer.invalidate();
                    self.renderer.draw(&self.game.snapshot())?;
                }
                _ => {}
            }
        }
        Ok(RoundEnd::Finished)
    }

    fn end_screen(&mut self) -> Result<EndChoice> {
        let summary = self
            .game
            .summary()
            .context("round finished without a summary")?;
        log::info!("Round over: {:?}", summary);

        thread::sleep(END_PAUSE);
        drain_events()?;

        let mut presses = 0;
        self.renderer.draw_summary(&summary, CONFIRM_PRESSES)?;
        loop {
            match event::read()? {
                Event::Key(key) => match map_end_key(key) {
                    EndKey::Exit => return Ok(EndChoice::Exit),
                    EndKey::Again => {
                        presses += 1;
                        self.renderer
                            .draw_summary(&summary, CONFIRM_PRESSES.saturating_sub(presses))?;
                        if presses >= CONFIRM_PRESSES {
                            thread::sleep(RESTART_PAUSE);
                            drain_events()?;
                            return Ok(EndChoice::PlayAgain);
                        }
                    }
                    EndKey::Other => {}
                },
                Event::Resize(..) => {
                    self.renderer.invalidate();
                    self.renderer.draw(&self.game.snapshot())?;
                    self.renderer
                        .draw_summary(&summary, CONFIRM_PRESSES.saturating_sub(presses))?;
                }
                _ => {}
            }
        }
    }
}

/// Throws away keys pressed while the screen was paused.
fn drain_events() -> io::Result<()> {
    while event::poll(Duration::ZERO)? {
        event::read()?;
    }
    Ok(())
}

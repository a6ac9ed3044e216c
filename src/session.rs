use std::fmt;
use std::io::{BufRead, Write};

use colored::Colorize;

use crate::error::SessionError;
use crate::game::{Game, Outcome, PlayerMarker, EMPTY_TOKEN};
use crate::player::{Playable, Player};

/// Choices that hold for the whole session.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionConfig {
    /// Skips the token prompt for the human when set.
    pub human_token: Option<char>,
    /// Skips the token prompt for the computer when set.
    pub computer_token: Option<char>,
    /// Accept "y" as well as "Y" at the replay prompt.
    pub lenient_replay: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Scoreboard {
    pub human_wins: u32,
    pub computer_wins: u32,
    pub draws: u32,
}

impl Scoreboard {
    fn record(&mut self, game: &Game) {
        match game.evaluate_outcome() {
            Outcome::Win(token) if token == game.human_token() => self.human_wins += 1,
            Outcome::Win(_) => self.computer_wins += 1,
            Outcome::Draw => self.draws += 1,
            Outcome::Continue => {}
        }
    }

    pub fn rounds(&self) -> u32 {
        self.human_wins + self.computer_wins + self.draws
    }
}

impl fmt::Display for Scoreboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "You: {} | AI: {} | Draws: {}",
            self.human_wins.to_string().as_str().green(),
            self.computer_wins.to_string().as_str().red(),
            self.draws.to_string().as_str().yellow()
        )
    }
}

enum SessionState {
    AwaitTokens,
    Playing(Game),
    RoundOver(Game),
    Replay(Game),
    End,
}

/// Drives rounds over a line-based console until the player stops or input runs out.
pub struct Session<R, W, P> {
    config: SessionConfig,
    input: R,
    output: W,
    player: P,
    scoreboard: Scoreboard,
}

impl<R: BufRead, W: Write, P: Player> Session<R, W, P> {
    pub fn new(config: SessionConfig, input: R, output: W, player: P) -> Self {
        Session {
            config,
            input,
            output,
            player,
            scoreboard: Scoreboard::default(),
        }
    }

    pub fn run(mut self) -> Result<Scoreboard, SessionError> {
        writeln!(self.output, "Welcome to Tic-Tac-Toe!")?;

        let mut state = SessionState::AwaitTokens;
        loop {
            state = match state {
                SessionState::AwaitTokens => match self.await_tokens()? {
                    Some((human, computer)) => {
                        self.print_instructions()?;
                        SessionState::Playing(Game::new(human, computer))
                    }
                    None => SessionState::End,
                },
                SessionState::Playing(mut game) => {
                    if self.play_round(&mut game)? {
                        SessionState::RoundOver(game)
                    } else {
                        SessionState::End
                    }
                }
                SessionState::RoundOver(game) => {
                    self.announce(&game)?;
                    SessionState::Replay(game)
                }
                SessionState::Replay(game) => {
                    if self.ask_replay()? {
                        log::info!("starting round {}", self.scoreboard.rounds() + 1);
                        let fresh = Game::new(game.human_token(), game.computer_token());
                        writeln!(self.output, "{}", fresh)?;
                        SessionState::Playing(fresh)
                    } else {
                        SessionState::End
                    }
                }
                SessionState::End => break,
            };
        }

        log::info!("session over after {} rounds", self.scoreboard.rounds());
        writeln!(self.output, "{}", self.scoreboard)?;
        self.output.flush()?;
        Ok(self.scoreboard)
    }

    /// Next trimmed input line, `None` once input is exhausted.
    fn read_line(&mut self) -> Result<Option<String>, SessionError> {
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            log::info!("input closed");
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn await_tokens(&mut self) -> Result<Option<(char, char)>, SessionError> {
        let human = self.config.human_token;
        let Some(human) = self.read_token("YOU", human, None)? else {
            return Ok(None);
        };

        let computer = self.config.computer_token;
        let Some(computer) = self.read_token("the AI", computer, Some(human))? else {
            return Ok(None);
        };

        log::info!("human plays {}, computer plays {}", human, computer);
        Ok(Some((human, computer)))
    }

    fn read_token(
        &mut self,
        who: &str,
        preset: Option<char>,
        taken: Option<char>,
    ) -> Result<Option<char>, SessionError> {
        match preset {
            Some(token) if token != EMPTY_TOKEN && Some(token) != taken => return Ok(Some(token)),
            Some(token) => log::warn!("token {} cannot be used, asking instead", token),
            None => {}
        }

        loop {
            writeln!(self.output, "Enter a single character to represent {} in the game ...", who)?;
            let Some(line) = self.read_line()? else {
                return Ok(None);
            };
            match line.chars().next() {
                None => writeln!(self.output, "A token needs at least one character.")?,
                Some(EMPTY_TOKEN) => {
                    let message = "marks empty cells, pick another character.";
                    writeln!(self.output, "{} {}", EMPTY_TOKEN, message)?
                }
                Some(token) if Some(token) == taken => {
                    writeln!(self.output, "{} is already taken, pick another character.", token)?
                }
                Some(token) => return Ok(Some(token)),
            }
        }
    }

    fn print_instructions(&mut self) -> Result<(), SessionError> {
        writeln!(self.output)?;
        writeln!(self.output, "Enter the number of the board position you would like to take!")?;
        writeln!(self.output)?;
        writeln!(self.output, "{}", Game::instruction_board())?;
        Ok(())
    }

    /// Plays until the game reaches a terminal state. Returns false if input ran out first.
    fn play_round(&mut self, game: &mut Game) -> Result<bool, SessionError> {
        while !game.evaluate_outcome().is_terminal() {
            match game.current_player() {
                PlayerMarker::Human => {
                    if !self.human_turn(game)? {
                        return Ok(false);
                    }
                }
                PlayerMarker::Computer => self.computer_turn(game)?,
            }
            writeln!(self.output, "{}", game)?;
        }
        Ok(true)
    }

    fn human_turn(&mut self, game: &mut Game) -> Result<bool, SessionError> {
        loop {
            writeln!(self.output, "Enter your position (1-9) ...")?;
            let Some(line) = self.read_line()? else {
                return Ok(false);
            };
            match line.parse::<usize>() {
                Ok(position) => {
                    if game.apply_move(position) {
                        return Ok(true);
                    }
                    writeln!(
                        self.output,
                        "Position {} is not available, choose an open position.",
                        position
                    )?;
                }
                Err(_) => writeln!(self.output, "Invalid input. Please enter a number.")?,
            }
        }
    }

    fn computer_turn(&mut self, game: &mut dyn Playable) -> Result<(), SessionError> {
        let position = self.player.select_move(&*game)?;
        if !game.apply_move(position) {
            log::warn!("selector picked unavailable position {}", position);
            return Err(SessionError::RejectedMove(position));
        }
        writeln!(self.output, "AI selected: {}", position)?;
        Ok(())
    }

    fn announce(&mut self, game: &Game) -> Result<(), SessionError> {
        let outcome = game.evaluate_outcome();
        log::info!("round over: {}", outcome);
        self.scoreboard.record(game);

        let message = outcome.to_string();
        let message = match outcome {
            Outcome::Win(token) if token == game.human_token() => message.as_str().green(),
            Outcome::Win(_) => message.as_str().red(),
            _ => message.as_str().yellow(),
        };
        writeln!(self.output, "{}", message)?;
        Ok(())
    }

    fn ask_replay(&mut self) -> Result<bool, SessionError> {
        writeln!(self.output, "Play again? - Enter Y or N")?;
        let Some(answer) = self.read_line()? else {
            return Ok(false);
        };
        Ok(answer == "Y" || (self.config.lenient_replay && answer == "y"))
    }
}

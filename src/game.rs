use std::fmt::{self, Write};

use flagset::{flags, FlagSet, Flags};

use crate::error::MoveError;
use crate::player::Playable;

// #############################
// #                           #
// #      Fixed Constants      #
// #                           #
// #############################
pub const BOARD_SIZE: usize = 3;
pub const BOARD_SIZE_SQUARED: usize = BOARD_SIZE * BOARD_SIZE;
pub const EMPTY_TOKEN: char = '-';

flags! {
    /// A cell of the board, numbered row by row from the top left.
    pub enum Square: u16 {
        TopLeft, TopCenter, TopRight,
        MiddleLeft, Center, MiddleRight,
        BottomLeft, BottomCenter, BottomRight,
    }
}

const WINNING_POSITIONS: [[Square; BOARD_SIZE]; 8] = [
    [Square::TopLeft, Square::TopCenter, Square::TopRight], // rows
    [Square::MiddleLeft, Square::Center, Square::MiddleRight],
    [Square::BottomLeft, Square::BottomCenter, Square::BottomRight],
    [Square::TopLeft, Square::MiddleLeft, Square::BottomLeft], // columns
    [Square::TopCenter, Square::Center, Square::BottomCenter],
    [Square::TopRight, Square::MiddleRight, Square::BottomRight],
    [Square::TopLeft, Square::Center, Square::BottomRight], // diagonals
    [Square::TopRight, Square::Center, Square::BottomLeft],
];

impl Square {
    /// Maps a 1-based board position to its square.
    pub fn from_position(position: usize) -> Option<Square> {
        let index = position.checked_sub(1)?;
        Square::LIST.get(index).copied()
    }
}

// #############################
// #                           #
// #       PlayerMarker        #
// #                           #
// #############################

/// Which side owns a cell or holds the turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayerMarker {
    Human,
    Computer,
}

impl PlayerMarker {
    pub fn to_other(&self) -> Self {
        match self {
            PlayerMarker::Human => PlayerMarker::Computer,
            PlayerMarker::Computer => PlayerMarker::Human,
        }
    }
}

// #############################
// #                           #
// #         BitBoard          #
// #                           #
// #############################

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BitBoard {
    human: FlagSet<Square>,
    computer: FlagSet<Square>,
}

impl BitBoard {
    pub fn new() -> Self {
        BitBoard::default()
    }

    fn occupied(&self) -> FlagSet<Square> {
        self.human | self.computer
    }

    pub fn get(&self, square: Square) -> Option<PlayerMarker> {
        if self.human.contains(square) {
            Some(PlayerMarker::Human)
        } else if self.computer.contains(square) {
            Some(PlayerMarker::Computer)
        } else {
            None
        }
    }

    /// Marks `position` (1-based) for `player` and reports the winner afterwards.
    pub fn set(
        &mut self,
        position: usize,
        player: PlayerMarker,
    ) -> Result<Option<PlayerMarker>, MoveError> {
        let square = Square::from_position(position).ok_or(MoveError::OutOfRange(position))?;

        if self.occupied().contains(square) {
            return Err(MoveError::Occupied(position));
        }

        match player {
            PlayerMarker::Human => self.human |= square,
            PlayerMarker::Computer => self.computer |= square,
        }

        Ok(self.get_winner())
    }

    pub fn is_full(&self) -> bool {
        self.occupied() == FlagSet::full()
    }

    pub fn get_empty_positions(&self) -> Vec<usize> {
        let occupied = self.occupied();
        Square::LIST
            .iter()
            .enumerate()
            .filter(|&(_, &square)| !occupied.contains(square))
            .map(|(index, _)| index + 1)
            .collect()
    }

    pub fn get_winner(&self) -> Option<PlayerMarker> {
        let completes = |set: FlagSet<Square>| {
            WINNING_POSITIONS
                .iter()
                .any(|line| line.iter().all(|&square| set.contains(square)))
        };

        if completes(self.human) {
            Some(PlayerMarker::Human)
        } else if completes(self.computer) {
            Some(PlayerMarker::Computer)
        } else {
            None
        }
    }
}

// #############################
// #                           #
// #          Outcome          #
// #                           #
// #############################

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    Win(char),
    Draw,
}

impl Outcome {
    pub fn is_terminal(&self) -> bool {
        *self != Outcome::Continue
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Continue => write!(f, "continue"),
            Outcome::Win(token) => write!(f, "{} wins!", token),
            Outcome::Draw => write!(f, "Draw!"),
        }
    }
}

// #############################
// #                           #
// #           Game            #
// #                           #
// #############################

/// One round of play between the human token and the computer token.
#[derive(Clone, Debug)]
pub struct Game {
    board: BitBoard,
    human_token: char,
    computer_token: char,
    current_player: PlayerMarker,
    winner: Option<PlayerMarker>,
}

impl Game {
    pub fn new(human_token: char, computer_token: char) -> Self {
        Game {
            board: BitBoard::new(),
            human_token,
            computer_token,
            current_player: PlayerMarker::Human,
            winner: None,
        }
    }

    pub fn human_token(&self) -> char {
        self.human_token
    }

    pub fn computer_token(&self) -> char {
        self.computer_token
    }

    pub fn current_player(&self) -> PlayerMarker {
        self.current_player
    }

    pub fn current_token(&self) -> char {
        self.token_of(self.current_player)
    }

    fn token_of(&self, player: PlayerMarker) -> char {
        match player {
            PlayerMarker::Human => self.human_token,
            PlayerMarker::Computer => self.computer_token,
        }
    }

    /// Token occupying a 1-based position, `None` when empty or off the board.
    pub fn cell(&self, position: usize) -> Option<char> {
        let square = Square::from_position(position)?;
        self.board.get(square).map(|player| self.token_of(player))
    }

    /// The winning token, set by the first move that completes a line.
    pub fn winner(&self) -> Option<char> {
        self.winner.map(|player| self.token_of(player))
    }

    /// Places the current token on `position` (1..=9) and passes the turn.
    /// Returns false and leaves the game untouched for off-board or taken cells.
    pub fn apply_move(&mut self, position: usize) -> bool {
        match self.board.set(position, self.current_player) {
            Ok(winner) => {
                log::debug!("{} took position {}", self.current_token(), position);
                if self.winner.is_none() {
                    self.winner = winner;
                }
                self.current_player = self.current_player.to_other();
                true
            }
            Err(e) => {
                log::debug!("{} rejected: {}", self.current_token(), e);
                false
            }
        }
    }

    pub fn evaluate_outcome(&self) -> Outcome {
        if let Some(token) = self.winner() {
            Outcome::Win(token)
        } else if self.board.is_full() {
            Outcome::Draw
        } else {
            Outcome::Continue
        }
    }

    pub fn available_positions(&self) -> Vec<usize> {
        self.board.get_empty_positions()
    }

    /// The board labelled with the numbers a player enters to take each cell.
    pub fn instruction_board() -> String {
        let mut board = String::new();
        let labels = (1..=BOARD_SIZE_SQUARED).map(|position| position.to_string());
        // Writing into a String cannot fail.
        let _ = write_grid(&mut board, labels);
        board
    }
}

impl Playable for Game {
    fn available_positions(&self) -> Vec<usize> {
        Game::available_positions(self)
    }

    fn apply_move(&mut self, position: usize) -> bool {
        Game::apply_move(self, position)
    }
}

// #############################
// #                           #
// #           Display         #
// #                           #
// #############################

fn write_grid<W: Write>(out: &mut W, cells: impl Iterator<Item = String>) -> fmt::Result {
    let separator = "-".repeat(BOARD_SIZE * 4 + 1);
    writeln!(out, "{}", separator)?;
    for (i, cell) in cells.enumerate() {
        write!(out, "| {} ", cell)?;
        if i % BOARD_SIZE == BOARD_SIZE - 1 {
            writeln!(out, "|")?;
            writeln!(out, "{}", separator)?;
        }
    }
    Ok(())
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cells = (1..=BOARD_SIZE_SQUARED)
            .map(|position| self.cell(position).unwrap_or(EMPTY_TOKEN).to_string());
        write_grid(f, cells)
    }
}

// #############################
// #                           #
// #           Tests           #
// #                           #
// #############################

#[cfg(test)]
mod tests {
    use super::*;

    fn play(game: &mut Game, positions: &[usize]) {
        for &position in positions {
            assert!(game.apply_move(position), "move {} was rejected", position);
        }
    }

    #[test]
    fn bitboard_positions() {
        let mut bitboard = BitBoard::new();

        for i in 1..=9 {
            assert_eq!(bitboard.get_empty_positions(), (i..=9).collect::<Vec<usize>>());
            bitboard.set(i, PlayerMarker::Human).unwrap();
        }
        assert!(bitboard.get_empty_positions().is_empty());
    }

    #[test]
    fn bitboard_full() {
        let mut bitboard = BitBoard::new();

        for i in 1..=9 {
            assert!(!bitboard.is_full());
            bitboard.set(i, PlayerMarker::Computer).unwrap();
        }
        assert!(bitboard.is_full());
    }

    #[test]
    fn bitboard_rejects_taken_and_off_board() {
        let mut bitboard = BitBoard::new();
        bitboard.set(5, PlayerMarker::Human).unwrap();

        assert_eq!(bitboard.set(5, PlayerMarker::Computer), Err(MoveError::Occupied(5)));
        assert_eq!(bitboard.set(0, PlayerMarker::Computer), Err(MoveError::OutOfRange(0)));
        assert_eq!(bitboard.set(10, PlayerMarker::Computer), Err(MoveError::OutOfRange(10)));
        assert_eq!(bitboard.get(Square::Center), Some(PlayerMarker::Human));
    }

    #[test]
    fn every_position_can_be_taken_once() {
        for position in 1..=9 {
            let mut game = Game::new('X', 'O');
            assert!(game.apply_move(position));
            assert!(!game.apply_move(position));
            assert_eq!(game.cell(position), Some('X'));
        }
    }

    #[test]
    fn out_of_range_moves_fail() {
        let mut game = Game::new('X', 'O');
        assert!(!game.apply_move(0));
        assert!(!game.apply_move(10));
        assert_eq!(game.current_token(), 'X');
        assert_eq!(game.available_positions().len(), 9);
    }

    #[test]
    fn rejected_move_keeps_turn() {
        let mut game = Game::new('X', 'O');
        play(&mut game, &[1]);
        assert!(!game.apply_move(1));
        assert_eq!(game.current_token(), 'O');
    }

    #[test]
    fn successful_move_flips_turn() {
        let mut game = Game::new('X', 'O');
        for position in [5, 1, 9, 3] {
            let before = game.current_token();
            assert!(game.apply_move(position));
            assert_ne!(game.current_token(), before);
        }
    }

    #[test]
    fn top_row_wins_for_human() {
        let mut game = Game::new('X', 'O');
        play(&mut game, &[1, 5, 2, 9]);
        assert_eq!(game.evaluate_outcome(), Outcome::Continue);
        play(&mut game, &[3]);
        assert_eq!(game.evaluate_outcome(), Outcome::Win('X'));
        assert_eq!(game.winner(), Some('X'));
    }

    #[test]
    fn columns_and_diagonals_win() {
        // X moves first in each list.
        let cases: [(&[usize], char); 3] = [
            (&[1, 2, 4, 3, 7], 'X'),
            (&[2, 3, 4, 5, 9, 7], 'O'),
            (&[1, 2, 5, 3, 9], 'X'),
        ];
        for (moves, token) in cases {
            let mut game = Game::new('X', 'O');
            play(&mut game, moves);
            assert_eq!(game.evaluate_outcome(), Outcome::Win(token), "moves {:?}", moves);
        }
    }

    #[test]
    fn win_takes_priority_over_full_board() {
        let mut game = Game::new('X', 'O');
        // X: 1 2 3 5 8, O: 4 6 7 9. The last move fills the board and a line.
        play(&mut game, &[1, 4, 3, 6, 5, 7, 8, 9, 2]);
        assert!(game.available_positions().is_empty());
        assert_eq!(game.evaluate_outcome(), Outcome::Win('X'));
    }

    #[test]
    fn full_board_without_line_is_draw() {
        // X,O,X,O,X,O,O,X,O by position, with O moving first.
        let mut game = Game::new('O', 'X');
        play(&mut game, &[2, 1, 4, 3, 6, 5, 7, 8, 9]);
        let layout: Vec<char> = (1..=9).filter_map(|p| game.cell(p)).collect();
        assert_eq!(layout, vec!['X', 'O', 'X', 'O', 'X', 'O', 'O', 'X', 'O']);
        assert_eq!(game.evaluate_outcome(), Outcome::Draw);
        assert_eq!(game.winner(), None);
    }

    #[test]
    fn available_positions_skip_taken_cells() {
        let mut game = Game::new('X', 'O');
        assert_eq!(game.available_positions(), (1..=9).collect::<Vec<usize>>());
        play(&mut game, &[5]);
        assert_eq!(game.available_positions(), vec![1, 2, 3, 4, 6, 7, 8, 9]);
    }

    #[test]
    fn renders_instruction_and_game_boards() {
        let expected = "\
-------------
| 1 | 2 | 3 |
-------------
| 4 | 5 | 6 |
-------------
| 7 | 8 | 9 |
-------------
";
        assert_eq!(Game::instruction_board(), expected);

        let mut game = Game::new('X', 'O');
        play(&mut game, &[1, 5]);
        let expected = "\
-------------
| X | - | - |
-------------
| - | O | - |
-------------
| - | - | - |
-------------
";
        assert_eq!(game.to_string(), expected);
    }

    #[test]
    fn outcome_messages() {
        assert_eq!(Outcome::Win('X').to_string(), "X wins!");
        assert_eq!(Outcome::Draw.to_string(), "Draw!");
        assert!(!Outcome::Continue.is_terminal());
        assert!(Outcome::Draw.is_terminal());
    }
}

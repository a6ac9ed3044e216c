use rand::{rngs::StdRng, rngs::ThreadRng, Rng, SeedableRng};

use crate::error::SelectError;

/// What a move selector may see and do on the board.
pub trait Playable {
    /// Open 1-based positions in ascending order.
    fn available_positions(&self) -> Vec<usize>;

    fn apply_move(&mut self, position: usize) -> bool;
}

pub trait Player {
    fn select_move(&mut self, game: &dyn Playable) -> Result<usize, SelectError>;
}

/// Picks uniformly among the open positions.
#[derive(Clone)]
pub struct RandomPlayer<R> {
    rng: R,
}

impl RandomPlayer<ThreadRng> {
    pub fn new() -> Self {
        RandomPlayer {
            rng: rand::thread_rng(),
        }
    }
}

impl Default for RandomPlayer<ThreadRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomPlayer<StdRng> {
    pub fn seeded(seed: u64) -> Self {
        RandomPlayer {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl<R: Rng> Player for RandomPlayer<R> {
    fn select_move(&mut self, game: &dyn Playable) -> Result<usize, SelectError> {
        let moves = game.available_positions();
        if moves.is_empty() {
            return Err(SelectError::NoMovesAvailable);
        }
        Ok(moves[self.rng.gen_range(0..moves.len())])
    }
}

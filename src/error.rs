/// Why a position could not be taken.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    #[error("position {0} is not on the board")]
    OutOfRange(usize),

    #[error("position {0} is already taken")]
    Occupied(usize),
}

/// Errors raised by a move selector.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectError {
    #[error("no open positions left to choose from")]
    NoMovesAvailable,
}

/// Errors that end a console session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("selector failed: {0}")]
    Select(#[from] SelectError),

    #[error("selector chose position {0}, which the game refused")]
    RejectedMove(usize),
}

use thiserror::Error;

use crate::CellIndex;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Cell index is outside the player grid")]
    InvalidIndex,
    #[error("Selected shape or color is not unlocked yet")]
    LockedSelection,
    #[error("Pattern cell {0} is lit but has no mirror target")]
    UnmirrorableLitCell(CellIndex),
    #[error("Board shape does not match the level layout")]
    InvalidBoardShape,
    #[error("Level already ended, no new moves are accepted")]
    AlreadyEnded,
}

pub type Result<T> = core::result::Result<T, GameError>;

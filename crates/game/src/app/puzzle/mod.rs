mod drag;
mod image_source;
mod layout;
mod levels;
mod presenter;
mod session;

pub(crate) use image_source::ImageSource;
pub(crate) use layout::BoardGeometry;
pub(crate) use levels::{LevelTable, LevelTableError};
pub(crate) use presenter::{AckKind, Cue, Presenter};
pub(crate) use session::{PuzzleSession, SessionCommand, SessionRules};

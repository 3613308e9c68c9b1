//! Value objects - immutable types that represent domain concepts

mod ids;
mod stream_key;

pub use ids::{IdParseError, RoomId, UserId};
pub use stream_key::{StreamKey, StreamKeyParseError};

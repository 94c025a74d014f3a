//! Content store entities: videos, comments, reactions, playlists.

pub mod comment;
pub mod playlist;
pub mod reaction;
pub mod video;

pub use comment::Comment;
pub use playlist::Playlist;
pub use reaction::{ReactionToggle, ReactionType};
pub use video::Video;

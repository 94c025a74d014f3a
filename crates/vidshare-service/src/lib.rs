//! # vidshare-service
//!
//! Business logic for the actions that produce notifications. Each action
//! writes its own rows and, when someone other than the actor should hear
//! about it, an outbox entry in the same transaction. The outbox relay turns
//! entries into notifications afterwards.
//!
//! Services follow constructor injection: repositories and the pool are
//! handed in at construction time.

pub mod content;
pub mod context;
pub mod playlist;
pub mod social;

pub use content::{CommentLike, CommentService, ReactionOutcome, VideoService};
pub use context::RequestContext;
pub use playlist::PlaylistService;
pub use social::SocialService;

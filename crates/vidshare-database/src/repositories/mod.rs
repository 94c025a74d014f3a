//! Concrete repository implementations.

pub mod comment;
pub mod notification;
pub mod outbox;
pub mod playlist;
pub mod user;
pub mod video;

pub use comment::CommentRepository;
pub use notification::NotificationRepository;
pub use outbox::OutboxRepository;
pub use playlist::PlaylistRepository;
pub use user::UserRepository;
pub use video::VideoRepository;

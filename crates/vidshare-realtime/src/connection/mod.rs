//! WebSocket connection management: handles, pool, auth, heartbeat.

pub mod authenticator;
pub mod handle;
pub mod heartbeat;
pub mod pool;

pub use authenticator::{AuthenticatedConnection, WsAuthenticator};
pub use handle::{ConnectionHandle, ConnectionId, ConnectionState};
pub use pool::ConnectionPool;

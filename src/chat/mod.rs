//! Live chat over the backend's realtime endpoint.
//!
//! DESIGN
//! ======
//! `session` is the only stateful piece: status, message sequence, input
//! buffer, and the single live `transport::Connection`. `message` holds
//! the wire payloads and `reconnect` the opt-in retry policy.

pub mod message;
pub mod reconnect;
pub mod session;
pub mod transport;

pub use message::{ChatMessage, ConnectionStatus};
pub use reconnect::ReconnectPolicy;
pub use session::{ChatSession, ChatUpdate, EchoPolicy};
pub use transport::{ChatEndpoint, Connection, Connector, TransportEvent, WsConnector};

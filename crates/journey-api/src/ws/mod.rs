pub mod handler;
pub mod registry;
pub mod socket;

pub use handler::{ChannelHandler, HandlerKind, HandlerMap, UnknownHandler};
pub use registry::{ConnectionId, ConnectionRegistry, Outbound, OutboundSender, RegistryError};

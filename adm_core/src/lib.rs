pub mod events;
pub mod keepalive;
pub mod manager;
pub mod storage;
pub mod transport;
pub mod types;

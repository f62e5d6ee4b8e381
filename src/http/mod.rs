pub mod requester;
pub mod transport;

pub mod admission;
pub mod request;
pub mod server;

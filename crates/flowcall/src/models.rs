pub mod file;
pub mod message;
pub mod request;
pub mod response;

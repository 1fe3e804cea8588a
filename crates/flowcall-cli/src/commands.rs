pub mod generate;
pub mod stream;

pub mod chunk;
pub mod fetch;
pub mod parse;
pub mod sentences;

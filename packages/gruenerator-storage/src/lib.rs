pub mod fusion;
pub mod lexical;
pub mod models;
pub mod payload;
pub mod qdrant;

mod error;

pub use error::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

pub mod token;

pub use token::{MemoryTokenStore, TokenColumns, TokenStore};

pub mod r#trait {
    pub use super::trait_::*;
}
#[path = "trait.rs"]
mod trait_;
pub mod columns;
pub mod memory;

pub use columns::{from_columns, to_columns, TokenColumns};
pub use memory::MemoryTokenStore;
pub use r#trait::TokenStore;

#[cfg(test)]
mod tests;

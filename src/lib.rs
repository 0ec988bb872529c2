pub mod logger;
pub mod alias;
pub mod waker;
pub mod config;
pub mod parse;
#[cfg(feature = "cmd")]
pub mod cmd;

pub use alias::{Alias, AliasStore, StoreError};
pub use waker::{ResolvedTarget, WakeOptions, WakeResolver};

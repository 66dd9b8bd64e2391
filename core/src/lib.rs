#![no_std]

extern crate alloc;

pub use action::*;
pub use board::*;
pub use cell::*;
pub use config::*;
pub use economy::*;
pub use error::*;
pub use events::*;
pub use fill::*;
pub use puzzle::*;
pub use room::*;
pub use run::*;
pub use score::*;
pub use selection::*;
pub use snapshot::*;
pub use storage::*;
pub use types::*;

mod action;
mod board;
mod cell;
mod config;
mod economy;
mod error;
mod events;
mod fill;
mod puzzle;
mod room;
mod run;
mod score;
mod selection;
mod snapshot;
mod storage;
mod types;

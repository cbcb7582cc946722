//! Parser for Poser PZ3/CR2 files and skeleton reconstruction from their actor blocks.
//!
//! This crate is host-agnostic: it turns file text into a tree of [`Container`]s and a
//! figure's actors into an [`Armature`] with the matrices and lengths a 3D host needs
//! to create bones. Creating those bones is left to the caller.

#![forbid(unsafe_code)]

mod builder;
mod error;
mod joiner;
mod model;
mod rig;
pub mod token;

#[cfg(feature = "json")]
mod json;

pub use builder::*;
pub use error::*;
pub use joiner::{Joiner, Statement};
pub use model::*;
pub use rig::*;

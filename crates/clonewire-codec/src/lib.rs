//! clonewire-codec - Tagged encoding on top of the host clone
//!
//! This crate provides:
//! - [`Codec`] with `encode` / `decode` / `escape`
//! - [`Encoded`] and [`Escaped`] encoder outputs
//! - [`Registry`] of custom-type reconstruct hooks
//! - Function bridging: encoded functions are served over port pairs and
//!   decoded into callable proxies
//! - [`Kind`] and [`SENTINEL`] describing the tagged array wire form

mod bridge;
mod codec;
mod decoder;
mod encoder;
mod registry;
mod tag;

pub use codec::{Codec, CodecBuilder};
pub use encoder::{Encoded, Escaped};
pub use registry::{ReconstructFn, Registry};
pub use tag::{Kind, SENTINEL};

// Re-export core so downstream crates need a single dependency
pub use clonewire_core;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{Codec, CodecBuilder, Encoded, Escaped, Kind, Registry, SENTINEL};
    pub use clonewire_core::prelude::*;
}

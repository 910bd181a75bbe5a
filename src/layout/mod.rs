//! Tree layout engine.
//!
//! Computes target (x, y) positions for the nodes of a rooted ordered
//! tree. Rendering is a consumer concern: this module only produces the
//! coordinate mapping, which the frontend turns into whatever drawing it
//! needs.

pub mod tidy;

pub use tidy::{Coord, TidyLayout};

//! # Domain Layer
//!
//! Pure, synchronous computation: the exact decimal type, its rounding
//! arithmetic, and the two services built on it.
//!
//! Nothing in this layer performs I/O, reads a clock, or logs.

pub mod services;
pub mod value_objects;

//! Domain layer for Sites

pub mod entities;
pub mod map;

//! Tileworld - thing lifecycle and spatial registration for a tile simulation

pub mod combat;
pub mod core;
pub mod defs;
pub mod entity;
pub mod map;
pub mod world;

//! Spatial - cell stores and boundary topologies

pub mod grid;

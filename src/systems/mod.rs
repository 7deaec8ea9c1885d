//! Systems - relaxation dynamics that act on a grid

pub mod toppling;

pub use toppling::{ToppleReport, Toppling};

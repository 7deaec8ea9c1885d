//! Random streams
//!
//! The engine consumes six independent pseudo-random streams. Each one is
//! seeded exactly once from its own integer "feed" and then advanced for the
//! rest of the run; nothing reseeds per call. Identical feeds plus identical
//! configuration therefore give bit-identical avalanche sequences.
//!
//! ChaCha8 is used instead of `StdRng` because its output is fixed across
//! platforms and `rand` releases.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Generator type used for every stream.
pub type Stream = ChaCha8Rng;

/// Number of feeds a configuration has to supply.
pub const FEED_COUNT: usize = 6;

/// Seeds for the six streams, in configuration order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feeds {
    /// Sweep order of the RandomAll / RandomFraction / FollowActivity strategies.
    pub grid: u64,
    /// Redistribution splits, random neighbour picks, bulk dissipation.
    pub toppling: u64,
    /// Initial cell directions.
    pub direction: u64,
    /// Drive placement.
    pub drive: u64,
    /// Seeding of the dissipation field.
    pub dissipation: u64,
    /// Quenched random-neighbour permutation and fully-connected draws.
    pub neighbour: u64,
}

impl Default for Feeds {
    fn default() -> Self {
        Feeds {
            grid: 230_895,
            toppling: 9_237_593,
            direction: 33_480,
            drive: 233_480,
            dissipation: 1_233_480,
            neighbour: 334_340,
        }
    }
}

impl Feeds {
    /// Build from an ordered feed list: grid, toppling, direction, drive,
    /// dissipation, neighbour. Returns `None` when fewer than six are given;
    /// extra entries are ignored.
    pub fn from_slice(feeds: &[u64]) -> Option<Self> {
        if feeds.len() < FEED_COUNT {
            return None;
        }
        Some(Feeds {
            grid: feeds[0],
            toppling: feeds[1],
            direction: feeds[2],
            drive: feeds[3],
            dissipation: feeds[4],
            neighbour: feeds[5],
        })
    }

    pub fn to_vec(&self) -> Vec<u64> {
        vec![
            self.grid,
            self.toppling,
            self.direction,
            self.drive,
            self.dissipation,
            self.neighbour,
        ]
    }
}

/// The six live generators, owned by the simulation context.
#[derive(Clone, Debug)]
pub struct RngStreams {
    pub grid: Stream,
    pub toppling: Stream,
    pub direction: Stream,
    pub drive: Stream,
    pub dissipation: Stream,
    pub neighbour: Stream,
}

impl RngStreams {
    pub fn new(feeds: &Feeds) -> Self {
        RngStreams {
            grid: Stream::seed_from_u64(feeds.grid),
            toppling: Stream::seed_from_u64(feeds.toppling),
            direction: Stream::seed_from_u64(feeds.direction),
            drive: Stream::seed_from_u64(feeds.drive),
            dissipation: Stream::seed_from_u64(feeds.dissipation),
            neighbour: Stream::seed_from_u64(feeds.neighbour),
        }
    }
}

impl Default for RngStreams {
    fn default() -> Self {
        Self::new(&Feeds::default())
    }
}

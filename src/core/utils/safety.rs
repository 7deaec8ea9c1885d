//! Zero-Cost Safety Macros
//!
//! Cell stores are indexed in the innermost relaxation loops, so indexing
//! goes through `fast!`: bounds-checked in debug builds (clear panic with the
//! offending index), unchecked in release builds.
//!
//! Callers must have validated the index already (see `Grid::cell_at`, which
//! returns `InvariantViolation` for anything out of range).
//!
//! Usage:
//! ```rust
//! use sandpile_engine::fast;
//!
//! let mut heights = vec![0.0, 4.0, 1.0];
//! assert_eq!(*fast!(heights, [1]), 4.0);
//!
//! *fast!(heights, mut [2]) += 1.0;
//! assert_eq!(heights[2], 2.0);
//!
//! fast!(heights, [0] = 3.0);
//! assert_eq!(heights[0], 3.0);
//! ```

/// Indexing that is checked in debug and unchecked in release.
///
/// - `fast!(slice, [i])`         -> `&T`
/// - `fast!(slice, mut [i])`     -> `&mut T`
/// - `fast!(slice, [i] = value)` -> assignment
#[macro_export]
macro_rules! fast {
    ($slice:expr, [$index:expr]) => {{
        #[cfg(debug_assertions)]
        {
            &$slice[$index]
        }
        #[cfg(not(debug_assertions))]
        {
            unsafe { $slice.get_unchecked($index) }
        }
    }};

    ($slice:expr, mut [$index:expr]) => {{
        #[cfg(debug_assertions)]
        {
            &mut $slice[$index]
        }
        #[cfg(not(debug_assertions))]
        {
            unsafe { $slice.get_unchecked_mut($index) }
        }
    }};

    ($slice:expr, [$index:expr] = $val:expr) => {{
        #[cfg(debug_assertions)]
        {
            $slice[$index] = $val;
        }
        #[cfg(not(debug_assertions))]
        {
            unsafe {
                *$slice.get_unchecked_mut($index) = $val;
            }
        }
    }};
}

//! Rayon or plain iterators, depending on the `parallel` feature.
//!
//! Grid evaluation calls `into_par_iter()` unconditionally; without the
//! feature that resolves to `into_iter()` and the chain runs on the calling
//! thread.

#[cfg(feature = "parallel")]
pub use rayon::prelude::*;

#[cfg(not(feature = "parallel"))]
mod sequential {
    /// Sequential stand-in for `rayon::prelude::IntoParallelIterator`.
    pub trait IntoParallelIterator {
        type Iter;
        type Item;
        fn into_par_iter(self) -> Self::Iter;
    }

    impl<I: IntoIterator> IntoParallelIterator for I {
        type Iter = I::IntoIter;
        type Item = I::Item;
        fn into_par_iter(self) -> Self::Iter {
            self.into_iter()
        }
    }
}

#[cfg(not(feature = "parallel"))]
pub use sequential::*;

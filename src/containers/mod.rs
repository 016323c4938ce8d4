//! Reversible data structures and typed storage.
//!
//! The reversible containers revert their modifications when the search
//! backtracks past the point of mutation. They are built on the reversible
//! scalar cells of [`crate::state::TrailedValues`]: payloads live in
//! append-only pools whose live length is itself reversible, so undoing a
//! level releases everything allocated inside it without running any
//! destructors.

mod keyed_vec;
mod rev_bitset;
mod rev_fifo;
mod rev_multimap;
mod rev_pool;

pub use keyed_vec::KeyedVec;
pub use keyed_vec::StorageKey;
pub use rev_bitset::RevBitMatrix;
pub use rev_bitset::RevBitSet;
pub use rev_bitset::SmallRevBitSet;
pub use rev_fifo::RevFifo;
pub use rev_multimap::RevMultiMap;
pub use rev_pool::RevPool;

//! Qentem: arena-allocated memory, growable/ring/pool containers, a
//! single-block hash index, an arithmetic/logic expression evaluator (ALE),
//! and scalar text-search primitives — a Rust port of the header-only C++
//! Qentem toolkit (`original_source/`), built in the idiom of
//! [Skytable](https://github.com/skytable/skytable)'s storage engine (see
//! `TEACHER.txt`, `DESIGN.md`).
//!
//! Every container here borrows an explicit [`mem::Reserver`] handle rather
//! than reaching into ambient global state (§5, Design Notes §9) — there is
//! no process-wide allocator singleton to initialize, just a value the
//! caller owns and threads through.
//!
//! # Layout
//!
//! - [`platform`] — OS primitives (raw reserve/release, page size, core id).
//! - [`mem`] — the `Reserver` arena: [`mem::MemoryBlock`], [`mem::ReserverCore`],
//!   [`mem::Reserver`].
//! - [`container`] — [`container::Array`], [`container::Deque`],
//!   [`container::QPool`].
//! - [`idx`] — [`idx::HashTable`], [`idx::HArray`], [`idx::HList`].
//! - [`ale`] — the arithmetic/logic expression evaluator.
//! - [`engine`] — `find_one`/`find`/`skip_inner_patterns` scanning primitives.
//! - [`config`] — `Reserver` tuning knobs, env-overridable.
//! - [`error`] — the crate's (small) error surface.

pub mod ale;
pub mod config;
pub mod container;
pub mod engine;
pub mod error;
pub mod idx;
pub mod mem;
pub mod platform;

pub use config::ReserverConfig;
pub use container::{Array, Deque, QPool};
pub use error::{Error, QResult};
pub use idx::{HArray, HList, HashKey, HashTable};
pub use mem::Reserver;

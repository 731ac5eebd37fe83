//! §4.F hash-indexed containers: the single-block [`HashTable`] and its two
//! typed faces, [`HArray`] and [`HList`] (§4.F.1).

pub mod harray;
pub mod hash_table;
pub mod hlist;
pub mod key;

pub use harray::HArray;
pub use hash_table::HashTable;
pub use hlist::HList;
pub use key::HashKey;

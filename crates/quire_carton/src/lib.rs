//! Carton - The binder's toolbox for Quire.
//!
//! Shared utilities and re-exported data structures used by every Quire crate:
//! the arena allocator the syntax tree lives in, compact strings for names,
//! fast hash maps, and the string/namespace helpers the tag helper conventions
//! are built on.
//!
//! # Example
//!
//! ```
//! use quire_carton::{Bump, CompactString, FxHashMap};
//!
//! let bump = Bump::new();
//! let name: &str = bump.alloc_str("bind-Value");
//!
//! let mut seen: FxHashMap<CompactString, usize> = FxHashMap::default();
//! *seen.entry(CompactString::new(name)).or_default() += 1;
//! assert_eq!(seen["bind-Value"], 1);
//! ```

pub mod general;
pub mod namespace;

// Re-export bumpalo types for convenience
pub use bumpalo::collections::Vec as BumpVec;
pub use bumpalo::Bump;

// Re-export compact_str for names and generated content
pub use compact_str::CompactString as String;
pub use compact_str::{format_compact, CompactString, ToCompactString};

// Re-export smallvec for stack-optimized collections
pub use smallvec::{smallvec, SmallVec};

// Re-export bitflags for flag types
pub use bitflags::bitflags;

// Re-export rustc-hash for fast hash maps/sets
pub use rustc_hash::{FxHashMap, FxHashSet};

// Re-export phf for compile-time perfect hash functions
pub use phf::{phf_map, phf_set, Map as PhfMap, Set as PhfSet};

pub use general::*;
pub use namespace::*;

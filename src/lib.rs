#![warn(missing_docs)]

//! Banded prefix edit distance for extending seeded overlaps between reads.
//!
//! An exact match seed is extended in both directions with a wavefront search bounded by an
//! error rate, and the result is classified as a dovetail overlap, a branch point on either side
//! of the seed or nothing useful.
//!
//! ```
//! use rs_prefix_edit::{MatchNode, OverlapKind, PrefixEditDistance, ReadView};
//!
//! let s = b"TTACGGATCCAGTACGATTGACCAGTTGCAAGT";
//! let t = b"GATCCAGTACGATTGACCAGTTGCAAGTCCATG";
//! let seed = MatchNode { offset: 10, len: 8, start: 5, next: None };
//!
//! let mut engine = PrefixEditDistance::new(false, 0.06).unwrap();
//! let olap = engine
//!     .extend_alignment(&seed, ReadView::new(1, s), ReadView::new(2, t))
//!     .unwrap();
//! assert_eq!(olap.kind, OverlapKind::Dovetail);
//! assert_eq!((olap.s_lo, olap.s_hi), (5, 33));
//! assert_eq!((olap.t_lo, olap.t_hi), (0, 28));
//! ```

pub mod align;
pub mod bound;
pub mod cigar;
pub mod config;
pub mod delta;
pub mod overlap;
pub mod space;
mod wavefront;

pub use align::{ForwardExtension, PrefixEditDistance, ReverseExtension};
pub use config::ExtendConfig;
pub use overlap::{MatchNode, Overlap, OverlapKind, ReadView};

//! # Goal
//! The main goal of this library is to provide an ordered collection whose
//! positions can be bookmarked and stay correct while the collection is mutated.
//!
//! # Features
//! - Labels, through `Label` handles created by the sequence.
//!      - Responsible for: Which slot do I denote right now?
//! - Renumbering, through the label registry owned by each sequence.
//!      - Responsible for: Keeping every label consistent with each insert, remove, and clear.
//! - Mutation tolerant iteration, through `LabeledIndices`.
//!      - Responsible for: Visiting each element once while the loop body mutates the sequence.
//!
//! # Architecture
//! There are several pieces that interact with one another:
//! - Sequence - backing storage of elements, `Vec` or anything else implementing `Sequence`.
//! - Labeled sequence - wraps the backing storage and owns all labels created from it.
//! - Registry - arena of label records, renumbers them on every mutation.
//! - Label - a key into the registry, denoting a slot or the end of the sequence.
//!
//! ```
//! use labeled_seq::LabeledSequence;
//!
//! let mut seq = LabeledSequence::from(vec!['A', 'B', 'C']);
//! let label = seq.create_label(1).unwrap();
//! let end = seq.create_end_label();
//!
//! seq.insert_at(0, 'X').unwrap();
//! assert_eq!(label.index(&seq), Ok(Some(2)));
//! assert_eq!(seq[label], 'B');
//! assert_eq!(end.index(&seq), Ok(Some(4)));
//!
//! // Removing the slot of a label detaches it.
//! seq.remove_at(2).unwrap();
//! assert_eq!(label.index(&seq), Ok(None));
//! assert!(seq.get_by_label(label).is_err());
//! ```

//? Important decisions:
//? - Labels are keys, never references. Sequence is the only owner of label state.
//? - Single threaded. Callers needing shared access should put the whole sequence behind a lock.
//? - Label whose slot was removed is detached, not rebound to the next element.

pub mod collection;
pub mod core;

pub use crate::collection::{LabeledIndices, LabeledSequence};
pub use crate::core::{Label, LabelChange, LabelError, LabelKind, Result, Sequence};

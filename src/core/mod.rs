mod error;
mod label;
mod sequence;

pub use error::*;
pub use label::*;
pub use sequence::*;

/* NOTES

- Label is a key, not a reference. Sequence owns every label record and is the only
  one mutating them, callers only hold keys and read through the sequence.

- Exact slot removal detaches a label, it's never rebound to the successor.
  It stays detached until relocated, removed, or the sequence is cleared,
  which moves it to 0 like every other item label.

- Listeners are called once the whole registry is renumbered so they always observe
  a consistent state.
*/

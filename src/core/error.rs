use super::Label;
use std::fmt::Display;

pub type Result<T, E = LabelError> = std::result::Result<T, E>;

/// Sequence level errors.
/// Every one of them is raised before anything is mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelError {
    /// Index argument is outside of the allowed range for the operation.
    /// Positions are allowed in `0..=len`, elements in `0..len`.
    OutOfRange { index: usize, len: usize },
    /// Label doesn't belong to the sequence, was removed, or doesn't
    /// denote an element at the moment.
    InvalidLabel { label: Label },
    /// Label doesn't support operation.
    InvalidOperation { label: Label, op: &'static str },
}

impl LabelError {
    pub fn out_of_range(index: usize, len: usize) -> Self {
        Self::OutOfRange { index, len }
    }

    pub fn invalid_label(label: Label) -> Self {
        Self::InvalidLabel { label }
    }

    pub fn invalid_op(label: Label, op: &'static str) -> Self {
        Self::InvalidOperation { label, op }
    }

    pub fn is_invalid_label(&self, label: Label) -> bool {
        match self {
            Self::InvalidLabel { label: other } => *other == label,
            _ => false,
        }
    }

    /// True if the same call could succeed after the sequence or the label changes.
    ///
    /// A detached label can be relocated, and an out of range index can become valid
    /// once the sequence grows. Operations not supported by the label never become valid.
    pub fn recoverable(self) -> bool {
        match self {
            Self::OutOfRange { .. } => true,
            Self::InvalidLabel { .. } => true,
            Self::InvalidOperation { .. } => false,
        }
    }

    pub fn unrecoverable(self) -> bool {
        !self.recoverable()
    }
}

impl Display for LabelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OutOfRange { index, len } => {
                write!(f, "Index {} is out of range for sequence of len {}.", index, len)
            }
            Self::InvalidLabel { label } => {
                write!(f, "Label {} doesn't denote a slot in this sequence.", label)
            }
            Self::InvalidOperation { label, op } => {
                write!(f, "Label {} doesn't support operation '{}'.", label, op)
            }
        }
    }
}

impl std::error::Error for LabelError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SequenceId;

    #[test]
    fn recoverable() {
        let label = Label::new(SequenceId::next(), 0, 0);
        assert!(LabelError::out_of_range(3, 2).recoverable());
        assert!(LabelError::invalid_label(label).recoverable());
        assert!(LabelError::invalid_op(label, "set_index").unrecoverable());
        assert!(!LabelError::out_of_range(3, 2).unrecoverable());
    }

    #[test]
    fn display() {
        let label = Label::new(SequenceId::next(), 1, 2);
        assert_eq!(
            LabelError::out_of_range(3, 2).to_string(),
            "Index 3 is out of range for sequence of len 2."
        );
        assert!(LabelError::invalid_op(label, "set_index")
            .to_string()
            .ends_with("doesn't support operation 'set_index'."));
        assert!(LabelError::invalid_label(label).is_invalid_label(label));
        assert!(!LabelError::out_of_range(0, 0).is_invalid_label(label));
    }
}

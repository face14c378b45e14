//! Shared look-suppression flag between the carry and locomotion sides.

use std::cell::Cell;
use std::rc::Rc;

/// Cloneable handle to a shared "mouse look is suppressed" flag.
///
/// Ownership contract: only the carry controller writes this flag (while
/// the player is rotating a held object), and only the locomotion
/// controller reads it. Single writer, single reader, single thread. A
/// multi-threaded port would need to replace the `Cell` with an atomic
/// and revisit that contract.
#[derive(Clone, Debug, Default)]
pub struct LookSuppression(Rc<Cell<bool>>);

impl LookSuppression {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set by the carry controller when it needs exclusive pointer control.
    pub fn suppress(&self, suppressed: bool) {
        self.0.set(suppressed);
    }

    /// Read by the locomotion controller before applying mouse look.
    pub fn is_suppressed(&self) -> bool {
        self.0.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_state() {
        let writer = LookSuppression::new();
        let reader = writer.clone();
        assert!(!reader.is_suppressed());
        writer.suppress(true);
        assert!(reader.is_suppressed());
        writer.suppress(false);
        assert!(!reader.is_suppressed());
    }
}

use serde::{Deserialize, Serialize};

/// A half-open boundary between two residue positions.
///
/// The value is the index of the residue immediately *after* the boundary, so
/// "before residue N" and "after residue N-1" are the same boundary. Boundaries are
/// totally ordered and subtracting a start boundary from a later stop boundary gives
/// the number of residues between them.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Boundary(u32);

impl Boundary {
    /// The boundary before the first residue of the sequence (position 0)
    #[must_use]
    pub const fn start_of_sequence() -> Self {
        Self(0)
    }

    /// The boundary immediately before the residue with the given index
    #[must_use]
    pub const fn before(residue: u32) -> Self {
        Self(residue)
    }

    /// The boundary immediately after the residue with the given index
    ///
    /// # Panics
    ///
    /// Panics if `residue` is `u32::MAX`; see [`Boundary::checked_after`].
    #[must_use]
    pub const fn after(residue: u32) -> Self {
        Self(residue + 1)
    }

    /// The boundary immediately after `residue`, or `None` if `residue` is the
    /// last representable index
    #[must_use]
    pub const fn checked_after(residue: u32) -> Option<Self> {
        match residue.checked_add(1) {
            Some(value) => Some(Self(value)),
            None => None,
        }
    }

    /// The index of the residue immediately after this boundary
    #[must_use]
    pub const fn res_after(self) -> u32 {
        self.0
    }

    /// The index of the residue immediately before this boundary
    ///
    /// Saturates at zero for the start-of-sequence boundary.
    #[must_use]
    pub const fn res_before(self) -> u32 {
        self.0.saturating_sub(1)
    }

    /// Number of residues from `self` to the later boundary `stop`, or `None` if
    /// `stop` comes before `self`
    #[must_use]
    pub fn residues_until(self, stop: Self) -> Option<u32> {
        stop.0.checked_sub(self.0)
    }

    /// Move the boundary `n` residues towards the end of the sequence
    ///
    /// Saturates at the last representable boundary.
    #[must_use]
    pub const fn shifted_forward(self, n: u32) -> Self {
        Self(self.0.saturating_add(n))
    }

    /// Move the boundary `n` residues towards the start of the sequence
    #[must_use]
    pub const fn shifted_back(self, n: u32) -> Self {
        Self(self.0.saturating_sub(n))
    }
}

impl std::fmt::Display for Boundary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "boundary[before residue {}]", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_residue_neighbours() {
        assert_eq!(Boundary::before(5).res_before(), 4);
        assert_eq!(Boundary::before(5).res_after(), 5);
        assert_eq!(Boundary::after(5).res_before(), 5);
        assert_eq!(Boundary::after(5).res_after(), 6);

        assert_eq!(Boundary::before(0).res_after(), 0);
        assert_eq!(Boundary::after(0).res_before(), 0);
        assert_eq!(Boundary::after(0).res_after(), 1);

        assert_eq!(Boundary::start_of_sequence().res_after(), 0);
    }

    #[test]
    fn test_before_and_after_coincide() {
        for n in 1..200 {
            assert_eq!(Boundary::before(n), Boundary::after(n - 1));
        }
    }

    #[test]
    fn test_after_last_residue() {
        assert_eq!(Boundary::checked_after(9), Some(Boundary::before(10)));
        assert_eq!(Boundary::checked_after(u32::MAX), None);
        assert_eq!(
            Boundary::before(u32::MAX - 1).shifted_forward(5),
            Boundary::before(u32::MAX)
        );
    }

    #[test]
    fn test_residues_until() {
        let start = Boundary::before(3);
        let stop = Boundary::after(9);
        assert_eq!(start.residues_until(stop), Some(7));
        assert_eq!(start.residues_until(start), Some(0));
        assert_eq!(stop.residues_until(start), None);
    }

    #[test]
    fn test_ordering_and_display() {
        assert!(Boundary::before(2) < Boundary::before(3));
        assert!(Boundary::start_of_sequence() <= Boundary::before(0));
        assert_eq!(Boundary::before(7).to_string(), "boundary[before residue 7]");
    }
}

/// Monotonic generation counter for immutable snapshots.
///
/// A new generation is minted every time a derived artifact is rebuilt
/// wholesale; readers compare generations instead of contents.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    pub const ZERO: Generation = Generation(0);

    pub fn get(self) -> u64 {
        self.0
    }

    pub fn next(self) -> Self {
        Generation(self.0.wrapping_add(1))
    }
}

use std::sync::Arc;

use cluster::SpatialIndex;
use foundation::handles::Generation;
use parking_lot::RwLock;

/// One immutable index, tagged with the generation it was installed as.
#[derive(Debug)]
pub struct IndexSnapshot {
    pub generation: Generation,
    pub index: SpatialIndex,
}

/// Holds the current [`IndexSnapshot`].
///
/// Replacing installs a new snapshot behind the lock in one pointer swap.
/// Readers clone the `Arc` and keep querying the snapshot they got, so an
/// index is never observed half-built and never mutated after install.
#[derive(Debug)]
pub struct IndexSlot {
    current: RwLock<Arc<IndexSnapshot>>,
}

impl IndexSlot {
    pub fn new(index: SpatialIndex) -> Self {
        Self {
            current: RwLock::new(Arc::new(IndexSnapshot {
                generation: Generation::ZERO,
                index,
            })),
        }
    }

    pub fn current(&self) -> Arc<IndexSnapshot> {
        self.current.read().clone()
    }

    pub fn generation(&self) -> Generation {
        self.current.read().generation
    }

    /// Install `index` as the next generation. Build it before calling.
    pub fn replace(&self, index: SpatialIndex) -> Generation {
        let mut current = self.current.write();
        let generation = current.generation.next();
        *current = Arc::new(IndexSnapshot { generation, index });
        generation
    }
}

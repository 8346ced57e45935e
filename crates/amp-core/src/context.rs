//! Shared sizing state: the current scale plus the last logical size the
//! content reported. Physical size is always derived from the two.

use crate::geometry::{LogicalSizeStore, PhysicalSize};
use crate::scale::ScaleState;

/// Process-wide geometry state: the current scale plus the last logical size
/// the content reported. Owned by the shell, lent to the window controller.
#[derive(Debug, Clone, Default)]
pub struct ShellContext {
    pub scale: ScaleState,
    pub logical: LogicalSizeStore,
}

impl ShellContext {
    pub fn new(initial_scale: f64) -> Self {
        Self {
            scale: ScaleState::with_initial(initial_scale),
            logical: LogicalSizeStore::default(),
        }
    }

    /// Target window size for the current state, once a usable logical size
    /// has been reported.
    pub fn physical_size(&self) -> Option<PhysicalSize> {
        self.logical
            .known()
            .map(|size| size.to_physical(self.scale.get()))
    }
}

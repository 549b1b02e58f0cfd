use crate::Tank;

/// Core trait that all per-frame systems implement
pub trait System: Send {
    /// Executes the system logic for one frame
    fn run(&mut self, tank: &mut Tank);

    /// Optional name for debugging and profiling
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

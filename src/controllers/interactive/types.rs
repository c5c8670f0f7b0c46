/// Lifecycle of a [`FractalGenerator`](super::FractalGenerator).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorState {
    /// Nothing in flight: disabled, no resolution yet, or held at the
    /// preview level.
    Idle,
    /// Jobs of the given progressive pass are queued or running.
    Computing(u32),
    /// Waiting for in-flight jobs to acknowledge cancellation.
    Draining,
    /// Every pass has committed.
    Converged,
}

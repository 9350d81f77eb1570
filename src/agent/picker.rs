use rand::Rng;

/// Chooses an index among `len` candidates when the caller names no agent.
pub trait AgentPicker: Send + Sync {
    /// `len` is always at least 1. The result must be below `len`.
    fn pick(&self, len: usize) -> usize;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRngPicker;

impl AgentPicker for ThreadRngPicker {
    fn pick(&self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len)
    }
}

/// Pause point between rounds and generations. Interactive front ends block
/// here until the user steps.
pub trait StepGate {
    fn wait_for_next(&mut self);

    /// Checked before every round. True ends the current run early.
    fn should_stop(&mut self) -> bool {
        false
    }
}

/// Batch mode: never blocks.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoGate;

impl StepGate for NoGate {
    fn wait_for_next(&mut self) {}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LoopState {
    #[default]
    Idle,
    Running,
}

/// Idle/Running bookkeeping for the harvest loop.
#[derive(Debug, Default)]
pub struct CycleStateMachine {
    state: LoopState,
    cycles_started: u64,
}

impl CycleStateMachine {
    pub fn new() -> Self {
        CycleStateMachine::default()
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn cycles_started(&self) -> u64 {
        self.cycles_started
    }

    /// Idle -> Running. Returns the 1-based number of the cycle being started.
    pub fn begin_cycle(&mut self) -> u64 {
        if self.state == LoopState::Running {
            tracing::warn!("Cycle {} never returned to idle", self.cycles_started);
        }
        self.state = LoopState::Running;
        self.cycles_started += 1;
        self.cycles_started
    }

    /// Running -> Idle.
    pub fn end_cycle(&mut self) {
        self.state = LoopState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_transitions() {
        let mut machine = CycleStateMachine::new();
        assert_eq!(machine.state(), LoopState::Idle);

        assert_eq!(machine.begin_cycle(), 1);
        assert_eq!(machine.state(), LoopState::Running);

        machine.end_cycle();
        assert_eq!(machine.state(), LoopState::Idle);

        assert_eq!(machine.begin_cycle(), 2);
        assert_eq!(machine.cycles_started(), 2);
    }
}

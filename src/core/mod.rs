pub mod harvester;
pub mod state_machine;
pub mod ticker;

pub use harvester::{CycleReport, Harvester, StageOutcome, SubCycle};
pub use state_machine::{CycleStateMachine, LoopState};
pub use ticker::{SleepTicker, Ticker};

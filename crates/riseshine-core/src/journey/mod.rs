//! The "race to the bus": how far through the morning we are and whether the
//! remaining tasks still fit before departure.

mod budget;
mod progress;
mod simulation;

pub use budget::RoutineBudget;
pub use progress::{aggregate_remaining_sec, evaluate, ActiveTask, JourneyState, JourneyWindow};
pub use simulation::{SimulatedClock, TimeSimulation, MAX_OFFSET_MINUTES};

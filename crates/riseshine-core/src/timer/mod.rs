mod engine;
mod session;

pub use engine::{format_clock, CountdownEngine, CountdownPhase, Sample};
pub use session::{
    CountdownSession, Frame, SessionCommand, SessionExit, SessionObserver, DEFAULT_FRAME_PERIOD,
};

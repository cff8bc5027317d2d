//! Round simulation
//!
//! All gameplay logic for a single round lives here. It must stay
//! deterministic:
//! - Seeded RNG only
//! - Time is supplied by the caller, never sampled
//! - No rendering, audio or platform dependencies

pub mod phase;
pub mod session;
pub mod setup;
pub mod state;

pub use phase::{GamePhase, PhaseMachine};
pub use session::{PingBudget, PingOutcome, PingRecord, PingSession, ReplayBudget};
pub use setup::{CustomConfig, RoundSetup};
pub use state::{PhantomView, RngState, RoundOutcome, RoundState};

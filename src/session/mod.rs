//! One observer connection: read a run config, drive the run, report the result.
mod observer;
mod read;
mod run;
mod state;


pub use observer::WsObserver;
pub use run::{SessionReport, SessionSettings, run_session};
pub use state::SessionState;

//! In-process test doubles
//!
//! Scriptable stand-ins for every external dependency of the actions:
//!
//! - `MockDeviceFarm`: projects, pools, upload/run progressions, call log
//!   and per-operation failure injection
//! - `MockTransfer`: records pre-signed URL PUTs
//! - `RecordingRunner`: records commands, answers with scripted output
//! - `MockSymbolApi`: Crittercism symbol endpoints

mod command;
mod devicefarm;
mod failure;
mod state;
mod symbols;

pub use command::{RecordedCommand, RecordingRunner};
pub use devicefarm::{MockDeviceFarm, MockTransfer, RecordedPut};
pub use failure::{FailureConfig, FailureInjector};
pub use state::{ApiCall, MockState, RunStep, UploadScript};
pub use symbols::{MockSymbolApi, SymbolCall};

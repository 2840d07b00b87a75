//! Mobile Lane - release-lane actions for mobile apps
//!
//! - `devicefarm`: upload app (and test) binaries to AWS Device Farm,
//!   schedule a run and optionally wait for its verdict
//! - `crittercism`: upload a dSYM bundle to Crittercism
//! - `translations`: import translations and commit changed `.strings` files

pub mod command;
pub mod config;
pub mod crittercism;
pub mod devicefarm;
pub mod logging;
pub mod mock;
pub mod poll;
pub mod translations;

pub use command::{CommandOutput, CommandRunner, SystemCommandRunner};
pub use config::{ConfigError, EffectiveConfig};
pub use devicefarm::{DeviceFarmError, DeviceFarmUploader, RunOutcome, UploadConfig};
pub use poll::{poll_until, PollError, PollPolicy};

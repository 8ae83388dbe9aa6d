//! Docking port pump: lifecycle, thermal feedback and link debouncing.
//!
//! Provides:
//! - `Connector`: one pump's Idle/Running state machine and per-tick update
//! - `PumpBank`: owner of every connector; resolves opposite pumps by part ID
//!   and keeps a linked pair's shared heat in step
//! - `PumpSettings`: configuration snapshot with stock defaults
//! - Thermal derating and the debounced link-state detector
//!
//! UI concerns (buttons, part highlighting) are left to observers of the
//! `PumpEvent`s each connector queues.

pub mod bank;
pub mod connector;
pub mod error;
pub mod events;
pub mod link;
pub mod settings;
pub mod thermal;

pub use bank::PumpBank;
pub use connector::{Connector, OppositeView, PumpState, Session, StartOutcome, TickReport};
pub use error::{PumpError, PumpResult};
pub use events::{PumpEvent, PumpObserver, StopReason};
pub use link::LinkDebounce;
pub use settings::{PumpSettings, ResourceOption, parse_resource_option};
pub use thermal::{ThermalState, derated_rate, heat_gain};

//! Stream module - event ingestion feeding the dispatcher queue

pub mod events;
pub mod pumpportal;

pub use events::{CreateEvent, PumpEvent, TradeEvent};
pub use pumpportal::{PumpStreamClient, PumpStreamConfig};

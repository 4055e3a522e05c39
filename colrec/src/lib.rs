pub extern crate vector;

pub mod analyses;
pub mod analysis;
pub mod dijet;
pub mod errors;
pub mod event;
pub mod histogram;
pub mod jets;
pub mod run_card;
pub mod settings_card;

pub use crate::dijet::{DijetCuts, DijetPairSelector, Rejection, SelectionResult};
pub use crate::errors::{Error, Result};
pub use crate::event::{Event, EventReader, Jet, Particle};

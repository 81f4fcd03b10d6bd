//! Type definitions for the term deposit predictor

pub mod client;
pub mod prediction;

pub use client::{AttributeValue, ClientRecord};
pub use prediction::{Outcome, Prediction, UnseenCategory};

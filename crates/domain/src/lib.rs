//! # matterhub-domain
//!
//! Pure domain model for the matterhub lighting controller.
//!
//! ## Responsibilities
//! - Foundational types: node identifiers, error conventions, timestamps
//! - Define **Device records** (paired bulbs and their last commanded state)
//! - Define **Commands** (argument vectors understood by `chip-tool`)
//! - Define **Scenes** (ordered per-device steps applied by the scheduler)
//! - Define the **Pairing** request and its phase state machine
//! - Parse the noisy textual output of the control utility
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or IO crates.
//! Process execution and log delivery are expressed as traits in the `app`
//! crate (ports).

pub mod error;
pub mod id;
pub mod log;

pub mod color;
pub mod command;
pub mod device;
pub mod output;
pub mod pairing;
pub mod scene;

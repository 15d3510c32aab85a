#![cfg_attr(not(test), no_std)]
#![deny(missing_docs)]
//! # onewire-nb
//! A no-std toolkit for building polled 1-Wire bus masters.
//!
//! Everything in this crate advances in single-slot steps: a poll method either
//! performs one time slot of bus activity and reports its progress, or returns
//! [`nb::Error::WouldBlock`] untouched because the current slot has not elapsed
//! yet. The [`OneWireNb`] trait defines the slot-level operations a master must
//! provide (reset pulse, presence detection, bit read/write), and the
//! [`CommandWriter`], [`RomReader`], [`ScratchpadReader`] and [`Transaction`]
//! machines compose those operations into full device exchanges without ever
//! blocking the calling context.
//!
//! The intended caller is a periodic loop or timer interrupt that re-polls the
//! top of the stack once per bus time slot.

mod codec;
mod commands;
mod error;
mod rom;
mod traits;
mod transaction;

pub use codec::{CommandWriter, RomReader, SCRATCHPAD_REPLY_BITS, ScratchpadReader};
pub use commands::Command;
pub use error::OneWireError;
pub use rom::{OneWireCrc, Rom};
pub use traits::{OneWireNb, OneWireStatus};
pub use transaction::{Reply, Transaction};

#[cfg(test)]
pub(crate) mod mock;

/// Result type for 1-Wire operations that complete in a single step.
pub type OneWireResult<T, E> = Result<T, OneWireError<E>>;

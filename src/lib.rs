//! Core engine for a two-sided recyclable-material pickup marketplace.
//!
//! A requester posts a [`domain::WasteRequest`], fulfillers submit competing
//! [`domain::Offer`]s, the requester accepts exactly one (creating a
//! [`domain::Schedule`]), both sides drive the schedule to confirmation, and
//! the reward-points ledger is credited. Points can later be converted to
//! currency through an approval step that restores them on rejection.
//!
//! The crate is transport-agnostic: every operation is a [`tower::Service`]
//! on [`commands::DomainLogic`], backed by storage and collaborator traits in
//! [`ports`] with in-process implementations in [`adapters`].

pub mod adapters;
pub mod commands;
pub mod config;
pub mod domain;
pub mod ports;

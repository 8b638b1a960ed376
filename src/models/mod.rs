//! Domain models for Chronicle.
//!
//! # Core Concepts
//!
//! ## Canonical Records
//!
//! - [`Country`]: The persisted timeline for one country, owning its
//!   presidents and monarchs exclusively.
//! - [`President`]: An office-holder whose terms are described by dated
//!   [`TimelineEvent`]s.
//! - [`Monarch`]: A single-interval role holder described by a reign.
//!
//! ## Inputs and Views
//!
//! - [`CountryInput`]: Create/update payload (a record without server fields).
//! - [`CountrySummary`]: Lightweight list entry.
//! - [`HoldersResponse`]: Answer to "who held each role at instant T".
//!
//! Editable drafts of these records live in [`crate::draft`]; they carry raw
//! operator text rather than typed dates.

mod country;
pub mod dates;
mod event;
mod person;

pub use country::*;
pub use event::*;
pub use person::*;

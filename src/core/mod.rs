//! Registry domain model: descriptions, registers, items and statuses.
//!
//! Every view wraps a detached closure of the store. Typing is taken from
//! `rdf:type` alone: `reg:Register` gives a [`Register`], `reg:RegisterItem`
//! a [`RegisterItem`], anything else a plain [`Description`].

mod description;
mod error;
pub mod item;
pub mod notation;
mod register;
mod status;

pub use description::{Description, DescriptionKind, TypedDescription};
pub use error::{ModelError, ModelResult};
pub use item::RegisterItem;
pub use register::{Membership, Register, RegisterView, ViewOptions};
pub use status::{Status, UnknownStatus};

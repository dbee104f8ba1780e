#![forbid(unsafe_code)]
//! A core library for constructing, inspecting, comparing and laying out
//! the types of a statically-typed, lexically-scoped imperative language
//! in the ISO C family (see `SPEC_FULL.md`).
//!
//! The crate is organised into the four components `SPEC_FULL.md` §2
//! names, leaves first:
//!
//! - [`term`] (component A) — the type term representation and its
//!   constructors.
//! - [`inspect`] (component B) — classification and structural
//!   projection, the read-only surface everything else is built on.
//! - [`equiv`] (component C) — identity, compatibility, composite-type
//!   construction, promotion and the usual arithmetic conversions.
//! - [`abi`] (component D) — `sizeof`/`alignof`/`offsetof`/`widthof`,
//!   parametrised by an [`abi::AbiTable`].
//! - [`printer`] — a pure consumer of `inspect`, included because
//!   spec.md budgets it as a concrete client of the inspection API (see
//!   `SPEC_FULL.md` §1).
//!
//! The crate is single-threaded and allocation-failure is not modelled
//! (§5): every term is plain `Rc`-shared data, malformed use panics
//! rather than returning a `Result` (§7), and the only fallible surface
//! is [`abi::AbiTable::try_new`].

pub mod abi;
pub mod equiv;
pub mod flags;
pub mod inspect;
pub mod kind;
pub mod printer;
pub mod term;

#[cfg(test)]
mod test;

pub use equiv::{compatible, composite, identical, int_promotion, is_modifiable, usual_conversion};
pub use flags::ModFlags;
pub use kind::{Category, Kind};
pub use printer::{format_declaration, format_type};
pub use term::{Dependency, EnumMember, Member, Type};

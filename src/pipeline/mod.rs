//! Pipeline stages for one document conversion.
//!
//! Each submodule implements exactly one step; [`crate::convert`] strings
//! them together and owns the cleanup guarantee.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ workspace ──▶ engine ──▶ retrieve
//! (validate) (stage copy)  (soffice)  (copy / read)
//! ```
//!
//! 1. [`input`]    : check the source exists and has an extension
//! 2. [`workspace`]: create staging + profile dirs, stage `source.<ext>`
//! 3. [`engine`]   : build the `soffice --headless --convert-to` command and
//!    await it; the only stage that spawns a process
//! 4. [`retrieve`] : deliver `source.<format>` to a path or into memory

pub mod engine;
pub mod input;
pub mod retrieve;
pub mod workspace;

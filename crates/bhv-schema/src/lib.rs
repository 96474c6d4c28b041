//! `bhv-schema` — self-describing value codecs for the `rust_bhv` engine.
//!
//! Everything the engine reads from content definitions or sends over the
//! wire goes through a [`SchemaType`]: a named pairing of four codec
//! functions (text encode/decode, binary encode/decode).  [`SchemaSet`]
//! assembles named, typed, optionally-defaulted fields into an ordered
//! record schema, and [`SchemaInstance`] is a bound set of values conforming
//! to one.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                   |
//! |-----------------|------------------------------------------------------------|
//! | [`error`]       | `DecodeError` with breadcrumb path and codec phase         |
//! | [`wire`]        | `WireWriter`/`WireReader` — the compact binary format      |
//! | [`types`]       | `SchemaType<T>` and the `wrap` combinator                  |
//! | [`builtin`]     | Primitive codecs: bool, i32, i64, f32, f64, string         |
//! | [`combinators`] | list, string_map, enumeration, bounded numerics            |
//! | [`weighted`]    | `WeightedList<T>` with a weighted-random draw              |
//! | [`registry`]    | Bidirectional name↔value registries and their codec        |
//! | [`set`]         | `SchemaSet` / `SchemaInstance`                             |
//!
//! # Core contract
//!
//! For every schema type and every supported value,
//! `from_text(to_text(v)) == v` and `from_bytes(to_bytes(v)) == v`.
//! Text decoding fails with a [`DecodeError`] whose path names the exact
//! offending field (`"[3].attribute"`); binary decoding of a stream written
//! by a matching schema always succeeds (the wire carries no field names —
//! order is fixed by the set).

pub mod builtin;
pub mod combinators;
pub mod error;
pub mod registry;
pub mod set;
pub mod types;
pub mod weighted;
pub mod wire;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use combinators::{EnumBuilder, bounded_f64, bounded_i32, list, string_map};
pub use error::{CodecPhase, DecodeError, DecodeErrorKind, DecodeResult};
pub use registry::{Registry, registry_schema};
pub use set::{SchemaInstance, SchemaSet};
pub use types::{Node, SchemaType};
pub use weighted::{WeightedList, weighted_list};
pub use wire::{WireReader, WireWriter};

//! Immutable kana-to-kanji conversion core.
//!
//! Given a hiragana reading and optional surrounding history, builds a
//! conversion lattice over the input, runs forward Viterbi plus backward A*
//! N-best search with a POS-bigram cost model, and fills the caller's
//! [`segments::Segments`] with ranked candidates.
//!
//! The engine is a pure compute core: it holds no mutable state across
//! calls and persists nothing. Dictionaries, the connection-cost matrix,
//! the segmenter and the POS tables are read-only dependencies passed to
//! [`converter::ImmutableConverter::new`]; concurrent conversions on
//! separate converter instances may share them freely.

#[cfg(not(target_endian = "little"))]
compile_error!("henkan-core requires a little-endian platform");

pub mod config;
pub mod converter;
pub mod dict;
pub mod encoding;
pub mod pos;
pub mod request;
pub mod segmenter;
pub mod segments;
pub mod unicode;

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `metadata` holds the leaf helpers shared by both engines:
//!
//! - the quick-check comparator ([`QuickCheck`]) deciding whether a live entry
//!   still matches its snapshot counterpart by size and modification time,
//! - the placeholder link codec ([`encode_target`] / [`decode_target`]) that
//!   reverses the network-path mangling applied to stored link targets,
//! - placeholder link primitives ([`create_placeholder`],
//!   [`read_placeholder`], [`remove_placeholder`]) built on the codec, and the
//!   names of the hidden siblings used to stage replacements,
//! - timestamp transfer ([`copy_mtime`]) used after materializing data.
//!
//! # Invariants
//!
//! - Content is never read when comparing; only `len()` and the modification
//!   time participate.
//! - Directory comparison inspects direct child files only.
//! - [`decode_target`] is the exact inverse of [`encode_target`] for every
//!   path `encode_target` accepts.
//! - No helper in this crate writes below a snapshot root; link creation and
//!   timestamp updates only target live paths passed by the caller.

mod compare;
mod error;
mod link;
mod link_codec;
mod times;

pub use compare::{Comparison, MismatchReason, QuickCheck};
pub use error::MetadataError;
pub use link::{
    LinkKind, PlaceholderError, copy_raw_link, create_placeholder, is_placeholder,
    read_placeholder, remove_placeholder, retired_path, staged_copy_path, staged_link_path,
    staging_path,
};
pub use link_codec::{LinkCodecError, NETWORK_PREFIX_TOKEN, decode_target, encode_target};
pub use times::{copy_mtime, modification_time};

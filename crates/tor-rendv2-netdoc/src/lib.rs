#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]
// @@ begin lint list maintained by maint/add_warning @@
#![allow(renamed_and_removed_lints)] // @@REMOVE_WHEN(ci_arti_stable)
#![allow(unknown_lints)] // @@REMOVE_WHEN(ci_arti_nightly)
#![warn(missing_docs)]
#![warn(noop_method_call)]
#![warn(unreachable_pub)]
#![warn(clippy::all)]
#![deny(clippy::await_holding_lock)]
#![deny(clippy::cast_lossless)]
#![deny(clippy::checked_conversions)]
#![warn(clippy::cognitive_complexity)]
#![deny(clippy::debug_assert_with_mut_call)]
#![deny(clippy::exhaustive_enums)]
#![deny(clippy::exhaustive_structs)]
#![deny(clippy::expl_impl_clone_on_copy)]
#![deny(clippy::fallible_impl_from)]
#![deny(clippy::implicit_clone)]
#![deny(clippy::large_stack_arrays)]
#![warn(clippy::manual_ok_or)]
#![deny(clippy::missing_docs_in_private_items)]
#![warn(clippy::needless_borrow)]
#![warn(clippy::needless_pass_by_value)]
#![warn(clippy::option_option)]
#![deny(clippy::print_stderr)]
#![deny(clippy::print_stdout)]
#![warn(clippy::rc_buffer)]
#![deny(clippy::ref_option_ref)]
#![warn(clippy::semicolon_if_nothing_returned)]
#![warn(clippy::trait_duplication_in_bounds)]
#![deny(clippy::unnecessary_wraps)]
#![warn(clippy::unseparated_literal_suffix)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::mod_module_files)]
#![allow(clippy::let_unit_value)] // This can reasonably be done for explicitness
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::result_large_err)] // temporary workaround for arti#587
#![allow(clippy::needless_raw_string_hashes)] // complained-about code is fine, often best
#![allow(clippy::needless_lifetimes)] // See arti#1765
//! <!-- @@ end lint list maintained by maint/add_warning @@ -->

#[macro_use]
mod parse;

pub mod config;
pub mod doc;
mod encode;
mod err;
pub mod types;

pub use config::{ConfigBuildError, DescriptorConfig, DescriptorConfigBuilder};
pub use doc::intropt::IntroPointDesc;
pub use doc::rendv2::RendDescV2;
pub use doc::ParseOutcome;
pub use err::{EncodeError, Error, NetdocErrorKind, Pos};

/// Alias for the Result type returned by most parsing functions in this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Alias for the Result type returned by encoding and signing functions in
/// this crate.
pub type EncodeResult<T> = std::result::Result<T, EncodeError>;

/// Types that can be parsed from, and written as, a single keyword line
/// argument, using `FromStr` and `Display`.
pub(crate) trait NormalItemArgument: std::str::FromStr + std::fmt::Display {}

impl NormalItemArgument for u16 {}
impl NormalItemArgument for u32 {}

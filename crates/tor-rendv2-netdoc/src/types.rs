//! Various types that can occur in v2 descriptors.
//!
//! Some of the types are parsing adapters: transparent newtypes
//! that can be used for type-driven parsing and encoding.

pub(crate) mod misc;

pub use misc::Iso8601TimeSp;

use crate::NormalItemArgument;
use tor_rendv2_crypto::{DescriptorId, IntroPointId, SecretIdPart};

impl NormalItemArgument for std::net::IpAddr {}
impl NormalItemArgument for DescriptorId {}
impl NormalItemArgument for IntroPointId {}
impl NormalItemArgument for SecretIdPart {}

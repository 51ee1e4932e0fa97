//! Identifier derivation for v2 onion service descriptors.
//!
//! (See rend-spec-v2 section 1.3.)  Every function here is a pure function
//! of its arguments: callers always say what time they mean.

use std::time::SystemTime;

use digest::Digest;
use thiserror::Error;

use crate::d::{DigestAlgorithm, Sha1};
use crate::id::ID_LEN;
use crate::{DescriptorId, PermanentId, SecretIdPart, TimePeriodV2};

/// An error that prevents us from deriving a descriptor identifier.
#[derive(Error, Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum DerivationError {
    /// The time can't be expressed as a 32-bit time period number.
    #[error("Time {0:?} is outside the range of v2 time periods")]
    UnrepresentableTime(SystemTime),
}

/// Compute the secret id part for a given time period and replica.
///
/// This is `H(time-period | replica)`, where the time period is a 4-byte
/// big-endian integer and the replica is a single byte.
pub fn secret_id_part_for_period(period: TimePeriodV2, replica: u8) -> SecretIdPart {
    let mut h = Sha1::new();
    h.update(period.interval_num().to_be_bytes());
    h.update([replica]);
    let a: [u8; ID_LEN] = h.finalize().into();
    a.into()
}

/// Compute the secret id part that the service with permanent id `id` uses
/// for `replica` at time `when`.
pub fn secret_id_part(
    id: &PermanentId,
    when: SystemTime,
    replica: u8,
) -> Result<SecretIdPart, DerivationError> {
    let period =
        TimePeriodV2::new(id, when).ok_or(DerivationError::UnrepresentableTime(when))?;
    Ok(secret_id_part_for_period(period, replica))
}

/// Compute the descriptor id `H(permanent-id | secret-id-part)`.
pub fn descriptor_id(id: &PermanentId, secret_id_part: &SecretIdPart) -> DescriptorId {
    let mut h = Sha1::new();
    h.update(id.as_bytes());
    h.update(secret_id_part.as_bytes());
    let a: [u8; ID_LEN] = h.finalize().into();
    a.into()
}

/// Compute the descriptor ids for every replica in `0..n_replicas`, in
/// replica order.
///
/// These are all the ids under which the service with permanent id `id`
/// publishes at time `when`, and so all the ids a client may look up.
pub fn descriptor_ids(
    id: &PermanentId,
    when: SystemTime,
    n_replicas: u8,
) -> Result<Vec<DescriptorId>, DerivationError> {
    let period =
        TimePeriodV2::new(id, when).ok_or(DerivationError::UnrepresentableTime(when))?;
    Ok((0..n_replicas)
        .map(|replica| descriptor_id(id, &secret_id_part_for_period(period, replica)))
        .collect())
}

/// Compute the digest that a descriptor's signature covers.
///
/// `body` must be the exact bytes of the unsigned document, up to and
/// including the newline after `signature`.
pub fn body_digest(algorithm: DigestAlgorithm, body: &[u8]) -> Vec<u8> {
    algorithm.digest(body)
}

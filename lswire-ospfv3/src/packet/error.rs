//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use bytes::TryGetError;
use serde::{Deserialize, Serialize};

// Type aliases.
pub type DecodeResult<T> = Result<T, DecodeError>;

// OSPFv3 LSA decode errors.
#[derive(Debug, Deserialize, Serialize)]
pub enum DecodeError {
    Truncated,
    BadLength(u16),
    ShortBody(u16),
    PrefixCount(u32),
    PrefixFormat(u8),
}

// ===== impl DecodeError =====

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodeError::Truncated => {
                write!(f, "buffer ended before the field was fully read")
            }
            DecodeError::BadLength(length) => {
                write!(f, "invalid LSA length: {}", length)
            }
            DecodeError::ShortBody(remaining) => {
                write!(f, "trailing octets after the LSA body: {}", remaining)
            }
            DecodeError::PrefixCount(count) => {
                write!(f, "prefix count doesn't match the body: {}", count)
            }
            DecodeError::PrefixFormat(plen) => {
                write!(f, "invalid prefix length: {}", plen)
            }
        }
    }
}

impl std::error::Error for DecodeError {}

impl From<TryGetError> for DecodeError {
    fn from(_error: TryGetError) -> DecodeError {
        DecodeError::Truncated
    }
}

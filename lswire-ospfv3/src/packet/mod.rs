//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

pub mod error;
pub mod lsa;

use bitflags::bitflags;
use bytes::{Bytes, BytesMut};
use lswire_utils::bytes::{BytesExt, BytesMutExt};
use serde::{Deserialize, Serialize};

use crate::packet::error::DecodeResult;

// OSPFv3 Options field.
//
// The field is 24 bits on the wire; only the low bits are registered.
// Unregistered bits are carried verbatim.
//
// IANA registry:
// https://www.iana.org/assignments/ospfv3-parameters/ospfv3-parameters.xhtml#ospfv3-parameters-1
bitflags! {
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    #[derive(Deserialize, Serialize)]
    #[serde(transparent)]
    pub struct Options: u32 {
        const V6 = 0x000001;
        const E = 0x000002;
        const N = 0x000008;
        const R = 0x000010;
        const DC = 0x000020;
        const AF = 0x000100;
        const L = 0x000200;
        const AT = 0x000400;
    }
}

// ===== impl Options =====

impl Options {
    pub(crate) fn decode(buf: &mut Bytes) -> DecodeResult<Self> {
        Ok(Options::from_bits_retain(buf.try_get_u24()?))
    }

    pub(crate) fn encode(&self, buf: &mut BytesMut) {
        buf.put_u24(self.bits());
    }
}

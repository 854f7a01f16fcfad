//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::net::{Ipv4Addr, Ipv6Addr};

use bitflags::bitflags;
use bytes::{Buf, BufMut, Bytes, BytesMut};
use derive_new::new;
use enum_as_inner::EnumAsInner;
use ipnetwork::Ipv6Network;
use lswire_utils::bytes::{BytesExt, BytesMutExt, TLS_BUF};
use lswire_utils::ip::{Ipv4AddrExt, Ipv6AddrExt};
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use serde::{Deserialize, Serialize};
use tracing::debug_span;

use crate::packet::Options;
use crate::packet::error::{DecodeError, DecodeResult};

// The PrefixOptions Field.
//
// Unregistered bits are carried verbatim.
//
// IANA registry:
// https://www.iana.org/assignments/ospfv3-parameters/ospfv3-parameters.xhtml#ospfv3-parameters-4
bitflags! {
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    #[derive(Deserialize, Serialize)]
    #[serde(transparent)]
    pub struct PrefixOptions: u8 {
        const NU = 0x01;
        const LA = 0x02;
        const P = 0x08;
        const DN = 0x10;
        const N = 0x20;
    }
}

// OSPFv3 LSA type.
//
// The U-bit indicates how the LSA should be handled by a router that does
// not recognize the LSA's function code; the S2/S1 bits encode the flooding
// scope; the low 13 bits are the function code.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[derive(Deserialize, Serialize)]
pub struct LsaType(pub u16);

// OSPFv3 LSA flooding scope.
#[derive(Clone, Copy, Debug, Eq, FromPrimitive, Ord, PartialEq, PartialOrd)]
#[derive(Deserialize, Serialize)]
pub enum LsaScopeCode {
    Link = 0x0000,
    Area = 0x2000,
    As = 0x4000,
    Reserved = 0x6000,
}

// OSPFv3 LSA function code.
//
// IANA registry:
// https://www.iana.org/assignments/ospfv3-parameters/ospfv3-parameters.xhtml#ospfv3-parameters-3
#[derive(Clone, Copy, Debug, Eq, FromPrimitive, Ord, PartialEq, PartialOrd)]
#[derive(Deserialize, Serialize)]
pub enum LsaFunctionCode {
    Router = 1,
    Network = 2,
    InterAreaPrefix = 3,
    InterAreaRouter = 4,
    AsExternal = 5,
    Deprecated = 6,
    Nssa = 7,
    Link = 8,
    IntraAreaPrefix = 9,
}

//
// OSPFv3 LSA header.
//
// Encoding format:
//
//  0                   1                   2                   3
//  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |           LS Age              |           LS Type             |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |                       Link State ID                           |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |                    Advertising Router                         |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |                    LS Sequence Number                         |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |        LS Checksum            |             Length            |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct LsaHdr {
    pub age: u16,
    pub lsa_type: LsaType,
    pub lsa_id: Ipv4Addr,
    pub adv_rtr: Ipv4Addr,
    pub seq_no: u32,
    pub cksum: u16,
    pub length: u16,
}

// OSPFv3 LSA.
#[derive(Clone, Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct Lsa {
    // LSA raw bytes.
    pub raw: Bytes,
    // LSA header.
    pub hdr: LsaHdr,
    // LSA body.
    pub body: LsaBody,
}

// OSPF LSA key. It serves both as a global LSA identifier and as a key to
// store LSAs in an LSDB.
//
// Please be aware that modifying the order of the fields will impact
// operations such as iterating over LSDBs.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, new)]
#[derive(Deserialize, Serialize)]
pub struct LsaKey {
    // LSA type.
    pub lsa_type: LsaType,
    // LSA advertising router.
    pub adv_rtr: Ipv4Addr,
    // LSA ID.
    pub lsa_id: Ipv4Addr,
}

// OSPFv3 LSA body.
#[derive(Clone, Debug, Eq, PartialEq, EnumAsInner)]
#[derive(Deserialize, Serialize)]
pub enum LsaBody {
    Router(LsaRouter),
    Network(LsaNetwork),
    InterAreaPrefix(LsaInterAreaPrefix),
    InterAreaRouter(LsaInterAreaRouter),
    AsExternal(LsaAsExternal),
    Nssa(LsaAsExternal),
    Link(LsaLink),
    IntraAreaPrefix(LsaIntraAreaPrefix),
    Unknown(LsaUnknown),
}

//
// OSPFv3 Router-LSA.
//
// Encoding format (LSA body):
//
//  0                   1                   2                   3
//  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
// +-+-+-+--+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |  0  |Nt|x|V|E|B|            Options                            |
// +-+-+-+--+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |     Type       |                Metric                         |
// +-+-+-+--+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |                      Interface ID                              |
// +-+-+-+--+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |                   Neighbor Interface ID                        |
// +-+-+-+--+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |                    Neighbor Router ID                          |
// +-+-+-+--+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |                             ...                                |
//
// The octet between the link type and the 16-bit metric half is reserved
// by the RFC; it is modeled as the high octet of a 24-bit metric so it
// round-trips verbatim.
//
#[derive(Clone, Debug, Eq, new, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct LsaRouter {
    pub flags: LsaRouterFlags,
    pub options: Options,
    pub links: Vec<LsaRouterLink>,
}

// OSPFv3 Router Properties Registry.
//
// IANA registry:
// https://www.iana.org/assignments/ospfv3-parameters/ospfv3-parameters.xhtml#ospfv3-parameters-7
bitflags! {
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    #[derive(Deserialize, Serialize)]
    #[serde(transparent)]
    pub struct LsaRouterFlags: u8 {
        const B = 0x01;
        const E = 0x02;
        const V = 0x04;
        const NT = 0x10;
    }
}

// OSPFv3 Router LSA Link Types.
//
// Values outside the registry (including the reserved value 3) are carried
// verbatim.
//
// IANA registry:
// https://www.iana.org/assignments/ospfv3-parameters/ospfv3-parameters.xhtml#ospfv3-parameters-6
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct LsaRouterLinkType(pub u8);

#[derive(Clone, Debug, Eq, PartialEq, new)]
#[derive(Deserialize, Serialize)]
pub struct LsaRouterLink {
    pub link_type: LsaRouterLinkType,
    pub metric: u32,
    pub iface_id: u32,
    pub nbr_iface_id: u32,
    pub nbr_router_id: Ipv4Addr,
}

//
// OSPFv3 Network-LSA.
//
// Encoding format (LSA body):
//
//  0                   1                   2                   3
//  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |      0        |              Options                          |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |                       Attached Router                         |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |                             ...                               |
//
#[derive(Clone, Debug, Eq, new, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct LsaNetwork {
    pub options: Options,
    // Kept in wire order.
    pub attached_rtrs: Vec<Ipv4Addr>,
}

//
// OSPFv3 Inter-Area-Prefix LSA.
//
// Encoding format (LSA body):
//
//  0                   1                   2                   3
//  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |      0        |                  Metric                       |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// | PrefixLength  | PrefixOptions |              0                |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |                        Address Prefix                         |
// |                             ...                               |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//
#[derive(Clone, Debug, Eq, new, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct LsaInterAreaPrefix {
    pub metric: u32,
    pub prefix: LsaPrefix,
}

//
// OSPFv3 Inter-Area-Router LSA.
//
// Encoding format (LSA body):
//
//  0                   1                   2                   3
//  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |      0        |                 Options                       |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |      0        |                 Metric                        |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |                    Destination Router ID                      |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//
#[derive(Clone, Debug, Eq, new, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct LsaInterAreaRouter {
    pub options: Options,
    pub metric: u32,
    pub router_id: Ipv4Addr,
}

//
// OSPFv3 AS-External-LSA. NSSA-LSAs share the same body format.
//
// Encoding format (LSA body):
//
//  0                   1                   2                   3
//  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |         |E|F|T|                Metric                         |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// | PrefixLength  | PrefixOptions |     Referenced LS Type        |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |                        Address Prefix                         |
// |                             ...                               |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |                                                               |
// +-                                                             -+
// |                                                               |
// +-                Forwarding Address (Optional)                -+
// |                                                               |
// +-                                                             -+
// |                                                               |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |              External Route Tag (Optional)                    |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |               Referenced Link State ID (Optional)             |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//
// The Referenced LS Type is carried in the prefix's 16-bit field; the
// Referenced Link State ID is present iff that field is non-zero.
//
#[derive(Clone, Debug, Eq, new, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct LsaAsExternal {
    pub flags: LsaAsExternalFlags,
    pub metric: u32,
    pub prefix: LsaPrefix,
    pub fwd_addr: Option<Ipv6Addr>,
    pub tag: Option<u32>,
    pub ref_lsa_id: Option<Ipv4Addr>,
}

bitflags! {
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    #[derive(Deserialize, Serialize)]
    #[serde(transparent)]
    pub struct LsaAsExternalFlags: u8 {
        const T = 0x01;
        const F = 0x02;
        const E = 0x04;
    }
}

//
// OSPFv3 Link LSA.
//
// Encoding format (LSA body):
//
//  0                   1                   2                   3
//  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// | Rtr Priority  |                Options                        |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |                                                               |
// +-                                                             -+
// |                                                               |
// +-                Link-local Interface Address                 -+
// |                                                               |
// +-                                                             -+
// |                                                               |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |                         # prefixes                            |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |  PrefixLength | PrefixOptions |             0                 |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |                        Address Prefix                         |
// |                             ...                               |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//
#[derive(Clone, Debug, Eq, new, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct LsaLink {
    pub priority: u8,
    pub options: Options,
    pub linklocal: Ipv6Addr,
    pub prefixes: Vec<LsaPrefix>,
}

//
// OSPFv3 Intra-Area-Prefix LSA.
//
// Encoding format (LSA body):
//
//  0                   1                   2                   3
//  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |         # Prefixes            |     Referenced LS Type        |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |                  Referenced Link State ID                     |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |               Referenced Advertising Router                   |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |  PrefixLength | PrefixOptions |          Metric               |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |                       Address Prefix                          |
// |                             ...                               |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//
// Each prefix carries its metric in the 16-bit field of the prefix
// encoding.
//
#[derive(Clone, Debug, Eq, new, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct LsaIntraAreaPrefix {
    pub ref_lsa_type: LsaType,
    pub ref_lsa_id: Ipv4Addr,
    pub ref_adv_rtr: Ipv4Addr,
    pub prefixes: Vec<LsaPrefix>,
}

//
// LSA prefix.
//
// Encoding format:
//
//  0                   1                   2                   3
//  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// | PrefixLength  | PrefixOptions |      (context dependent)      |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |                        Address Prefix                         |
// |                             ...                               |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//
// The address prefix occupies an integral number of 32-bit words. The
// 16-bit field following the prefix options depends on the enclosing LSA:
// reserved in Link and Inter-Area-Prefix LSAs, the per-prefix metric in
// Intra-Area-Prefix LSAs, and the Referenced LS Type in AS-External and
// NSSA LSAs. It is carried verbatim.
//
#[derive(Clone, Debug, Eq, new, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct LsaPrefix {
    pub options: PrefixOptions,
    pub special: u16,
    pub value: Ipv6Network,
}

//
// OSPFv3 Unknown LSA.
//
// The body octets are kept verbatim so LSAs with unrecognized types can be
// flooded unchanged.
//
#[derive(Clone, Debug, Eq, new, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct LsaUnknown {
    pub lsa_type: LsaType,
    pub data: Bytes,
}

// ===== impl LsaType =====

impl LsaType {
    pub const U_BIT_MASK: u16 = 0x8000;
    pub const SCOPE_MASK: u16 = 0x6000;
    pub const FUNCTION_CODE_MASK: u16 = 0x1fff;

    pub const ROUTER: LsaType =
        LsaType(LsaScopeCode::Area as u16 | LsaFunctionCode::Router as u16);
    pub const NETWORK: LsaType =
        LsaType(LsaScopeCode::Area as u16 | LsaFunctionCode::Network as u16);
    pub const INTER_AREA_PREFIX: LsaType = LsaType(
        LsaScopeCode::Area as u16 | LsaFunctionCode::InterAreaPrefix as u16,
    );
    pub const INTER_AREA_ROUTER: LsaType = LsaType(
        LsaScopeCode::Area as u16 | LsaFunctionCode::InterAreaRouter as u16,
    );
    pub const AS_EXTERNAL: LsaType =
        LsaType(LsaScopeCode::As as u16 | LsaFunctionCode::AsExternal as u16);
    pub const DEPRECATED: LsaType =
        LsaType(LsaScopeCode::Area as u16 | LsaFunctionCode::Deprecated as u16);
    pub const NSSA: LsaType =
        LsaType(LsaScopeCode::Area as u16 | LsaFunctionCode::Nssa as u16);
    pub const LINK: LsaType =
        LsaType(LsaScopeCode::Link as u16 | LsaFunctionCode::Link as u16);
    pub const INTRA_AREA_PREFIX: LsaType = LsaType(
        LsaScopeCode::Area as u16 | LsaFunctionCode::IntraAreaPrefix as u16,
    );

    // Whether the LSA should be flooded by routers that don't recognize
    // its function code.
    pub fn u_bit(&self) -> bool {
        self.0 & Self::U_BIT_MASK != 0
    }

    pub fn scope_code(&self) -> LsaScopeCode {
        LsaScopeCode::from_u16(self.0 & Self::SCOPE_MASK).unwrap()
    }

    pub fn function_code(&self) -> Option<LsaFunctionCode> {
        LsaFunctionCode::from_u16(self.0 & Self::FUNCTION_CODE_MASK)
    }
}

impl std::fmt::Display for LsaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl From<LsaType> for u16 {
    fn from(lsa_type: LsaType) -> u16 {
        lsa_type.0
    }
}

// ===== impl LsaHdr =====

impl LsaHdr {
    pub const LENGTH: u16 = 20;

    pub fn decode(buf: &mut Bytes) -> DecodeResult<Self> {
        let age = buf.try_get_u16()?;
        let lsa_type = LsaType(buf.try_get_u16()?);
        let lsa_id = buf.try_get_ipv4()?;
        let adv_rtr = buf.try_get_ipv4()?;
        let seq_no = buf.try_get_u32()?;
        let cksum = buf.try_get_u16()?;
        let length = buf.try_get_u16()?;

        Ok(LsaHdr {
            age,
            lsa_type,
            lsa_id,
            adv_rtr,
            seq_no,
            cksum,
            length,
        })
    }

    // The caller owns the Length and Checksum fields; both are written
    // verbatim.
    pub fn encode(&self, buf: &mut BytesMut) {
        buf.put_u16(self.age);
        buf.put_u16(self.lsa_type.0);
        buf.put_ipv4(&self.lsa_id);
        buf.put_ipv4(&self.adv_rtr);
        buf.put_u32(self.seq_no);
        buf.put_u16(self.cksum);
        buf.put_u16(self.length);
    }

    pub fn key(&self) -> LsaKey {
        LsaKey {
            lsa_type: self.lsa_type,
            adv_rtr: self.adv_rtr,
            lsa_id: self.lsa_id,
        }
    }
}

// ===== impl Lsa =====

impl Lsa {
    pub fn new(
        age: u16,
        lsa_id: Ipv4Addr,
        adv_rtr: Ipv4Addr,
        seq_no: u32,
        body: LsaBody,
    ) -> Self {
        // Build LSA header (the length is computed later).
        let hdr = LsaHdr {
            age,
            lsa_type: body.lsa_type(),
            lsa_id,
            adv_rtr,
            seq_no,
            cksum: 0,
            length: 0,
        };

        // Build full LSA and encode it.
        let mut lsa = Lsa {
            raw: Default::default(),
            hdr,
            body,
        };
        lsa.encode();
        lsa
    }

    // Decodes LSA from a bytes buffer.
    //
    // On success the buffer is advanced by exactly the header's Length and
    // `raw` holds the consumed octets.
    pub fn decode(buf: &mut Bytes) -> DecodeResult<Self> {
        // Decode LSA header.
        let buf_orig = buf.clone();
        let hdr = LsaHdr::decode(buf)?;
        let span = debug_span!("lsa", r#type = %hdr.lsa_type);
        let _span_guard = span.enter();
        let lsa_len = hdr.length;
        if lsa_len < LsaHdr::LENGTH {
            return Err(DecodeError::BadLength(lsa_len));
        }
        let lsa_body_len = lsa_len - LsaHdr::LENGTH;

        // Decode LSA body.
        if buf.remaining() < lsa_body_len as usize {
            return Err(DecodeError::Truncated);
        }
        let mut buf_lsa = buf.copy_to_bytes(lsa_body_len as usize);
        let body = LsaBody::decode(hdr.lsa_type, &mut buf_lsa)?;

        // The body codec must account for every octet the header claims.
        if buf_lsa.has_remaining() {
            return Err(DecodeError::ShortBody(buf_lsa.remaining() as u16));
        }

        Ok(Lsa {
            raw: buf_orig.slice(0..lsa_len as usize),
            hdr,
            body,
        })
    }

    // Encodes LSA into a bytes buffer.
    pub fn encode(&mut self) {
        // Encode LSA in network byte order.
        TLS_BUF.with(|buf| {
            let mut buf = buf.borrow_mut();
            buf.clear();

            self.hdr.encode(&mut buf);
            self.body.encode(&mut buf);

            // Rewrite LSA length. The checksum is left untouched; it is
            // owned by the enclosing LSA database.
            let lsa_len = buf.len() as u16;
            buf[18..20].copy_from_slice(&lsa_len.to_be_bytes());
            self.hdr.length = lsa_len;

            // Store LSA raw data.
            self.raw = buf.clone().freeze();
        });
    }
}

// ===== impl LsaBody =====

impl LsaBody {
    pub fn decode(lsa_type: LsaType, buf: &mut Bytes) -> DecodeResult<Self> {
        let body = match lsa_type {
            LsaType::ROUTER => LsaBody::Router(LsaRouter::decode(buf)?),
            LsaType::NETWORK => LsaBody::Network(LsaNetwork::decode(buf)?),
            LsaType::INTER_AREA_PREFIX => {
                LsaBody::InterAreaPrefix(LsaInterAreaPrefix::decode(buf)?)
            }
            LsaType::INTER_AREA_ROUTER => {
                LsaBody::InterAreaRouter(LsaInterAreaRouter::decode(buf)?)
            }
            LsaType::AS_EXTERNAL => {
                LsaBody::AsExternal(LsaAsExternal::decode(buf)?)
            }
            // NSSA-LSAs share the AS-External body format.
            LsaType::NSSA => LsaBody::Nssa(LsaAsExternal::decode(buf)?),
            LsaType::LINK => LsaBody::Link(LsaLink::decode(buf)?),
            LsaType::INTRA_AREA_PREFIX => {
                LsaBody::IntraAreaPrefix(LsaIntraAreaPrefix::decode(buf)?)
            }
            // Deprecated and unrecognized types are carried opaquely so
            // they can be flooded unchanged.
            _ => LsaBody::Unknown(LsaUnknown::decode(lsa_type, buf)?),
        };

        Ok(body)
    }

    pub fn encode(&self, buf: &mut BytesMut) {
        match self {
            LsaBody::Router(lsa) => lsa.encode(buf),
            LsaBody::Network(lsa) => lsa.encode(buf),
            LsaBody::InterAreaPrefix(lsa) => lsa.encode(buf),
            LsaBody::InterAreaRouter(lsa) => lsa.encode(buf),
            LsaBody::AsExternal(lsa) => lsa.encode(buf),
            LsaBody::Nssa(lsa) => lsa.encode(buf),
            LsaBody::Link(lsa) => lsa.encode(buf),
            LsaBody::IntraAreaPrefix(lsa) => lsa.encode(buf),
            LsaBody::Unknown(lsa) => lsa.encode(buf),
        }
    }

    pub fn lsa_type(&self) -> LsaType {
        match self {
            LsaBody::Router(_) => LsaType::ROUTER,
            LsaBody::Network(_) => LsaType::NETWORK,
            LsaBody::InterAreaPrefix(_) => LsaType::INTER_AREA_PREFIX,
            LsaBody::InterAreaRouter(_) => LsaType::INTER_AREA_ROUTER,
            LsaBody::AsExternal(_) => LsaType::AS_EXTERNAL,
            LsaBody::Nssa(_) => LsaType::NSSA,
            LsaBody::Link(_) => LsaType::LINK,
            LsaBody::IntraAreaPrefix(_) => LsaType::INTRA_AREA_PREFIX,
            LsaBody::Unknown(lsa) => lsa.lsa_type,
        }
    }

}

// ===== impl LsaRouter =====

impl LsaRouter {
    fn decode(buf: &mut Bytes) -> DecodeResult<Self> {
        let flags = LsaRouterFlags::from_bits_retain(buf.try_get_u8()?);
        let options = Options::decode(buf)?;

        let mut links = vec![];
        let links_cnt = buf.remaining() / LsaRouterLink::LENGTH as usize;
        for _ in 0..links_cnt {
            let link = LsaRouterLink::decode(buf)?;
            links.push(link);
        }

        Ok(LsaRouter::new(flags, options, links))
    }

    fn encode(&self, buf: &mut BytesMut) {
        buf.put_u8(self.flags.bits());
        self.options.encode(buf);
        for link in &self.links {
            link.encode(buf);
        }
    }
}

// ===== impl LsaRouterFlags =====

impl LsaRouterFlags {
    pub fn is_abr(&self) -> bool {
        self.contains(LsaRouterFlags::B)
    }

    pub fn is_asbr(&self) -> bool {
        self.contains(LsaRouterFlags::E)
    }
}

// ===== impl LsaRouterLinkType =====

impl LsaRouterLinkType {
    pub const POINT_TO_POINT: LsaRouterLinkType = LsaRouterLinkType(1);
    pub const TRANSIT_NETWORK: LsaRouterLinkType = LsaRouterLinkType(2);
    pub const VIRTUAL_LINK: LsaRouterLinkType = LsaRouterLinkType(4);
}

// ===== impl LsaRouterLink =====

impl LsaRouterLink {
    pub const LENGTH: u16 = 16;

    fn decode(buf: &mut Bytes) -> DecodeResult<Self> {
        let link_type = LsaRouterLinkType(buf.try_get_u8()?);
        let metric = buf.try_get_u24()?;
        let iface_id = buf.try_get_u32()?;
        let nbr_iface_id = buf.try_get_u32()?;
        let nbr_router_id = buf.try_get_ipv4()?;

        Ok(LsaRouterLink::new(
            link_type,
            metric,
            iface_id,
            nbr_iface_id,
            nbr_router_id,
        ))
    }

    fn encode(&self, buf: &mut BytesMut) {
        buf.put_u8(self.link_type.0);
        buf.put_u24(self.metric);
        buf.put_u32(self.iface_id);
        buf.put_u32(self.nbr_iface_id);
        buf.put_ipv4(&self.nbr_router_id);
    }
}

// ===== impl LsaNetwork =====

impl LsaNetwork {
    fn decode(buf: &mut Bytes) -> DecodeResult<Self> {
        let _ = buf.try_get_u8()?;
        let options = Options::decode(buf)?;

        let mut attached_rtrs = vec![];
        let rtrs_cnt = buf.remaining() / Ipv4Addr::LENGTH;
        for _ in 0..rtrs_cnt {
            let rtr = buf.try_get_ipv4()?;
            attached_rtrs.push(rtr);
        }

        Ok(LsaNetwork::new(options, attached_rtrs))
    }

    fn encode(&self, buf: &mut BytesMut) {
        buf.put_u8(0);
        self.options.encode(buf);
        for rtr in &self.attached_rtrs {
            buf.put_ipv4(rtr);
        }
    }
}

// ===== impl LsaInterAreaPrefix =====

impl LsaInterAreaPrefix {
    fn decode(buf: &mut Bytes) -> DecodeResult<Self> {
        let _ = buf.try_get_u8()?;
        let metric = buf.try_get_u24()?;
        let prefix = LsaPrefix::decode(buf)?;

        Ok(LsaInterAreaPrefix::new(metric, prefix))
    }

    fn encode(&self, buf: &mut BytesMut) {
        buf.put_u8(0);
        buf.put_u24(self.metric);
        self.prefix.encode(buf);
    }
}

// ===== impl LsaInterAreaRouter =====

impl LsaInterAreaRouter {
    fn decode(buf: &mut Bytes) -> DecodeResult<Self> {
        let _ = buf.try_get_u8()?;
        let options = Options::decode(buf)?;
        let _ = buf.try_get_u8()?;
        let metric = buf.try_get_u24()?;
        let router_id = buf.try_get_ipv4()?;

        Ok(LsaInterAreaRouter::new(options, metric, router_id))
    }

    fn encode(&self, buf: &mut BytesMut) {
        buf.put_u8(0);
        self.options.encode(buf);
        buf.put_u8(0);
        buf.put_u24(self.metric);
        buf.put_ipv4(&self.router_id);
    }
}

// ===== impl LsaAsExternal =====

impl LsaAsExternal {
    fn decode(buf: &mut Bytes) -> DecodeResult<Self> {
        let flags = LsaAsExternalFlags::from_bits_retain(buf.try_get_u8()?);
        let metric = buf.try_get_u24()?;
        let prefix = LsaPrefix::decode(buf)?;
        let fwd_addr = if flags.contains(LsaAsExternalFlags::F) {
            Some(buf.try_get_ipv6()?)
        } else {
            None
        };
        let tag = if flags.contains(LsaAsExternalFlags::T) {
            Some(buf.try_get_u32()?)
        } else {
            None
        };
        let ref_lsa_id = if prefix.special != 0 {
            Some(buf.try_get_ipv4()?)
        } else {
            None
        };

        Ok(LsaAsExternal::new(
            flags,
            metric,
            prefix,
            fwd_addr,
            tag,
            ref_lsa_id,
        ))
    }

    fn encode(&self, buf: &mut BytesMut) {
        buf.put_u8(self.wire_flags().bits());
        buf.put_u24(self.metric);
        self.prefix.encode(buf);
        if let Some(fwd_addr) = &self.fwd_addr {
            buf.put_ipv6(fwd_addr);
        }
        if let Some(tag) = self.tag {
            buf.put_u32(tag);
        }
        if let Some(ref_lsa_id) = &self.ref_lsa_id {
            buf.put_ipv4(ref_lsa_id);
        }
    }

    // The F and T bits mirror the presence of the corresponding optional
    // fields.
    fn wire_flags(&self) -> LsaAsExternalFlags {
        let mut flags = self.flags;
        flags.set(LsaAsExternalFlags::F, self.fwd_addr.is_some());
        flags.set(LsaAsExternalFlags::T, self.tag.is_some());
        flags
    }
}

// ===== impl LsaLink =====

impl LsaLink {
    fn decode(buf: &mut Bytes) -> DecodeResult<Self> {
        let priority = buf.try_get_u8()?;
        let options = Options::decode(buf)?;
        let linklocal = buf.try_get_ipv6()?;

        let mut prefixes = vec![];
        let prefixes_cnt = buf.try_get_u32()?;
        for _ in 0..prefixes_cnt {
            if !buf.has_remaining() {
                return Err(DecodeError::PrefixCount(prefixes_cnt));
            }
            let prefix = LsaPrefix::decode(buf)?;
            prefixes.push(prefix);
        }
        if buf.has_remaining() {
            return Err(DecodeError::PrefixCount(prefixes_cnt));
        }

        Ok(LsaLink::new(priority, options, linklocal, prefixes))
    }

    fn encode(&self, buf: &mut BytesMut) {
        buf.put_u8(self.priority);
        self.options.encode(buf);
        buf.put_ipv6(&self.linklocal);
        buf.put_u32(self.prefixes.len() as u32);
        for prefix in &self.prefixes {
            prefix.encode(buf);
        }
    }
}

// ===== impl LsaIntraAreaPrefix =====

impl LsaIntraAreaPrefix {
    fn decode(buf: &mut Bytes) -> DecodeResult<Self> {
        let prefixes_cnt = buf.try_get_u16()?;
        let ref_lsa_type = LsaType(buf.try_get_u16()?);
        let ref_lsa_id = buf.try_get_ipv4()?;
        let ref_adv_rtr = buf.try_get_ipv4()?;

        let mut prefixes = vec![];
        for _ in 0..prefixes_cnt {
            if !buf.has_remaining() {
                return Err(DecodeError::PrefixCount(prefixes_cnt.into()));
            }
            let prefix = LsaPrefix::decode(buf)?;
            prefixes.push(prefix);
        }
        if buf.has_remaining() {
            return Err(DecodeError::PrefixCount(prefixes_cnt.into()));
        }

        Ok(LsaIntraAreaPrefix::new(
            ref_lsa_type,
            ref_lsa_id,
            ref_adv_rtr,
            prefixes,
        ))
    }

    fn encode(&self, buf: &mut BytesMut) {
        buf.put_u16(self.prefixes.len() as u16);
        buf.put_u16(self.ref_lsa_type.0);
        buf.put_ipv4(&self.ref_lsa_id);
        buf.put_ipv4(&self.ref_adv_rtr);
        for prefix in &self.prefixes {
            prefix.encode(buf);
        }
    }
}

// ===== impl LsaPrefix =====

impl LsaPrefix {
    fn decode(buf: &mut Bytes) -> DecodeResult<Self> {
        let plen = buf.try_get_u8()?;
        let options = PrefixOptions::from_bits_retain(buf.try_get_u8()?);
        let special = buf.try_get_u16()?;
        let value = decode_prefix(plen, buf)?;

        Ok(LsaPrefix::new(options, special, value))
    }

    fn encode(&self, buf: &mut BytesMut) {
        buf.put_u8(self.value.prefix());
        buf.put_u8(self.options.bits());
        buf.put_u16(self.special);
        encode_prefix(&self.value, buf);
    }
}

// ===== impl LsaUnknown =====

impl LsaUnknown {
    fn decode(lsa_type: LsaType, buf: &mut Bytes) -> DecodeResult<Self> {
        let data = buf.copy_to_bytes(buf.remaining());

        Ok(LsaUnknown::new(lsa_type, data))
    }

    fn encode(&self, buf: &mut BytesMut) {
        buf.put_slice(&self.data);
    }
}

// ===== global functions =====

// Calculate the number of bytes required to encode a prefix.
fn prefix_wire_len(len: u8) -> usize {
    ((len as usize + 31) / 32) * 4
}

fn decode_prefix(plen: u8, buf: &mut Bytes) -> DecodeResult<Ipv6Network> {
    if plen as usize > Ipv6Addr::LENGTH * 8 {
        return Err(DecodeError::PrefixFormat(plen));
    }
    let plen_wire = prefix_wire_len(plen);
    let mut prefix_bytes = [0; Ipv6Addr::LENGTH];
    buf.try_copy_to_slice(&mut prefix_bytes[..plen_wire])?;
    Ipv6Network::new(Ipv6Addr::from(prefix_bytes), plen)
        .map_err(|_| DecodeError::PrefixFormat(plen))
}

fn encode_prefix(prefix: &Ipv6Network, buf: &mut BytesMut) {
    let prefix_bytes = prefix.ip().octets();
    let plen_wire = prefix_wire_len(prefix.prefix());
    buf.put(&prefix_bytes[0..plen_wire]);
}

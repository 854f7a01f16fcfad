//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::hint::black_box;
use std::net::Ipv4Addr;
use std::str::FromStr;
use std::sync::LazyLock as Lazy;

use bytes::Bytes;
use criterion::{Criterion, criterion_group, criterion_main};
use lswire_ospfv3::packet::Options;
use lswire_ospfv3::packet::lsa::*;

static BYTES: Lazy<Bytes> = Lazy::new(|| {
    Lsa::new(
        49,
        Ipv4Addr::from_str("0.0.0.1").unwrap(),
        Ipv4Addr::from_str("2.2.2.2").unwrap(),
        0x80000002,
        LsaBody::Router(LsaRouter {
            flags: LsaRouterFlags::B,
            options: Options::R | Options::E | Options::V6,
            links: vec![
                LsaRouterLink {
                    link_type: LsaRouterLinkType::POINT_TO_POINT,
                    metric: 10,
                    iface_id: 1,
                    nbr_iface_id: 2,
                    nbr_router_id: Ipv4Addr::from_str("3.3.3.3").unwrap(),
                },
                LsaRouterLink {
                    link_type: LsaRouterLinkType::TRANSIT_NETWORK,
                    metric: 20,
                    iface_id: 3,
                    nbr_iface_id: 4,
                    nbr_router_id: Ipv4Addr::from_str("4.4.4.4").unwrap(),
                },
            ],
        }),
    )
    .raw
});

fn lsa_decode(n: u64) {
    for _ in 0..n {
        let mut buf = BYTES.clone();
        Lsa::decode(&mut buf).unwrap();
    }
}

fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("LSA decode", |b| b.iter(|| lsa_decode(black_box(10000))));
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);

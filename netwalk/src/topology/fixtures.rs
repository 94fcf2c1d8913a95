//! Small hand-built crawl registries shared by the topology tests.

use crate::element::{CrawlResult, NetworkElement};
use crate::payload::{ArpEntry, AssociatedMac, Interface, Port, RemoteHost, Route, TypePayload};

pub(crate) fn port(id: &str, slotport: &str, learned: &[&str]) -> Port {
    Port {
        id: id.into(),
        slotport: slotport.into(),
        operationalstatus: "up".into(),
        associatedmacs: learned
            .iter()
            .map(|m| AssociatedMac {
                mac: m.to_string(),
                ..Default::default()
            })
            .collect(),
        ..Default::default()
    }
}

pub(crate) fn neighbor(localslotport: &str, mac: &str, linked: Option<&str>) -> RemoteHost {
    RemoteHost {
        localslotport: localslotport.into(),
        remotemac: mac.into(),
        remoteips: vec!["10.255.0.1".into()],
        linked_ne_id: linked.map(str::to_string),
        ..Default::default()
    }
}

pub(crate) fn switch(id: &str, mac: &str, address: &str, gateway: &str) -> NetworkElement {
    let mut payload = TypePayload::new("scs");
    payload.interfaces.push(Interface {
        address: address.into(),
        ..Default::default()
    });
    payload.routes.push(Route {
        destination: "0.0.0.0/0".into(),
        gateway: gateway.into(),
        ..Default::default()
    });
    NetworkElement {
        typestring: "scs".into(),
        hostname: format!("sw-{id}\r\n"),
        macs: vec![mac.into()],
        payload: Some(payload),
        typecrawled: true,
        ..NetworkElement::new(id)
    }
}

pub(crate) fn payload_mut(ne: &mut NetworkElement) -> &mut TypePayload {
    ne.payload.as_mut().unwrap()
}

/// R on top, M below R on 1/2, L below M on 1/3.
pub(crate) fn chain() -> CrawlResult {
    let mut r = switch("r1", "aa:00:00:00:00:01", "10.0.0.1", "10.0.0.254");
    payload_mut(&mut r).ports = vec![port("p1", "1/1", &["cc:00:00:00:00:01"]), port("p2", "1/2", &["aa:00:00:00:00:02"])];
    payload_mut(&mut r).arptable.push(ArpEntry {
        ip: "10.0.0.254".into(),
        mac: "cc:00:00:00:00:01".into(),
        slotport: "1/1".into(),
        ..Default::default()
    });
    payload_mut(&mut r).amap.remotehosts = vec![neighbor("1/2", "aa:00:00:00:00:02", Some("m1"))];

    let mut m = switch("m1", "aa:00:00:00:00:02", "10.0.0.2", "10.0.0.1");
    payload_mut(&mut m).ports = vec![port("p3", "1/25", &["aa:00:00:00:00:01"]), port("p4", "1/3", &["aa:00:00:00:00:03"])];
    payload_mut(&mut m).amap.remotehosts = vec![
        neighbor("1/25", "aa:00:00:00:00:01", Some("r1")),
        neighbor("1/3", "aa:00:00:00:00:03", Some("l1")),
    ];

    let mut l = switch("l1", "aa:00:00:00:00:03", "10.0.0.3", "10.0.0.1");
    payload_mut(&mut l).ports = vec![port("p5", "1/25", &["aa:00:00:00:00:01", "aa:00:00:00:00:02"])];
    payload_mut(&mut l).amap.remotehosts = vec![neighbor("1/25", "aa:00:00:00:00:02", Some("m1"))];

    let mut result = CrawlResult::new("1", vec![]);
    result.loo_ne = vec![r, m, l];
    result
}

//! OmniSwitch 6450 command parsers and payload generators.
//!
//! Every parser reads its own command section out of a [`Segmentation`]
//! and tolerates a missing or short section. Generators then assign a
//! session-unique id to every record.

pub mod amap;
pub mod hardware;
pub mod network;
pub mod ports;
pub mod services;

use log::debug;

use crate::parse::segment::Segmentation;
use crate::payload::TypePayload;
use crate::session::CrawlSession;

/// Sentinel written to the MAC list when the chassis MAC is unusable.
pub const NO_CHASSIS_MAC: &str = "NA";

/// Run every parser and generator over a segmented discovery transcript.
pub fn build_payload(typestring: &str, seg: &Segmentation, session: &CrawlSession) -> TypePayload {
    let mut payload = TypePayload::new(typestring);

    payload.ports = ports::generate(ports::parse(seg), session);
    payload.interfaces = network::generate_interfaces(
        network::parse_interfaces(seg.section(network::SHOW_IP_INTERFACE)),
        session,
    );
    payload.chassis = hardware::parse_chassis(seg.section(hardware::SHOW_CHASSIS));
    payload.modules = hardware::generate_modules(hardware::parse_modules(seg), session);
    payload.vlans = services::generate_vlans(
        services::parse_vlans(seg.section(services::SHOW_VLAN)),
        session,
    );
    payload.routes = network::generate_routes(
        network::parse_routes(seg.section(network::SHOW_IP_ROUTER_DATABASE)),
        session,
    );
    payload.dhcp = services::generate_dhcp(services::parse_dhcp(seg), session);
    payload.configuration = services::parse_configuration(seg.section(services::SHOW_CONFIGURATION));
    payload.arptable = network::generate_arp(network::parse_arp(seg.section(network::SHOW_ARP)), session);
    payload.amap = amap::generate(amap::parse(seg.section(amap::SHOW_AMAP)), session);

    debug!(
        "payload: {} ports, {} interfaces, {} modules, {} vlans, {} routes, {} arp, {} remote hosts",
        payload.ports.len(),
        payload.interfaces.len(),
        payload.modules.len(),
        payload.vlans.len(),
        payload.routes.len(),
        payload.arptable.len(),
        payload.amap.remotehosts.len()
    );
    payload
}

/// The identity MAC for an NE: the chassis MAC, or `NA` when it is too
/// short to be one.
pub fn chassis_identity(payload: &TypePayload) -> String {
    if payload.chassis.mac.len() < 12 {
        NO_CHASSIS_MAC.to_string()
    } else {
        payload.chassis.mac.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::segment::segment;
    use crate::platform::vendors::alu_omniswitch::DISCOVERY_COMMANDS;

    fn lines(text: &[&str]) -> Vec<String> {
        text.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_build_payload_from_partial_capture() {
        let capture = lines(&[
            "-> show chassis",
            "  MAC Address:                   e8:e7:32:a3:06:dc,",
            "-> show ip router database",
            " 0.0.0.0/0         10.0.0.1    mgmt       STATIC        1   0",
            "-> show ip interface",
            "mgmt                 10.0.0.20   255.255.255.0     UP      NO vlan 10",
            "->",
        ]);
        let commands: Vec<String> = DISCOVERY_COMMANDS.iter().map(|c| c.to_string()).collect();
        let seg = segment(&capture, &commands);
        assert!(seg.badpull);

        let session = CrawlSession::new();
        let payload = build_payload("scs", &seg, &session);
        assert_eq!(payload.typestring, "scs");
        assert_eq!(payload.default_gateway(), Some("10.0.0.1"));
        assert!(payload.has_interface_address("10.0.0.20"));
        assert!(payload.ports.is_empty());
        assert_eq!(payload.dhcp.serverstatus, "Disabled");
        assert_eq!(chassis_identity(&payload), "e8:e7:32:a3:06:dc");
    }

    #[test]
    fn test_short_chassis_mac_gives_sentinel() {
        let payload = TypePayload::new("scs");
        assert_eq!(chassis_identity(&payload), NO_CHASSIS_MAC);
    }
}

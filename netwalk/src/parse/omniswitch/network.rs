//! Layer 3 tables: `show ip interface`, `show ip router database` and
//! `show arp`.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::parse::field::{Columns, IPV4};
use crate::payload::{ArpEntry, Interface, Route};
use crate::session::CrawlSession;

pub const SHOW_IP_INTERFACE: &str = "show ip interface";
pub const SHOW_IP_ROUTER_DATABASE: &str = "show ip router database";
pub const SHOW_ARP: &str = "show arp";

static IPV4_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(IPV4).expect("IPv4 pattern must compile"));

fn ipv4_rows(section: &[String]) -> impl Iterator<Item = Columns<'_>> {
    section
        .iter()
        .filter(|line| IPV4_TOKEN.is_match(line))
        .map(|line| Columns::new(line))
        .filter(|cols| !cols.is_empty())
}

pub fn parse_interfaces(section: &[String]) -> Vec<Interface> {
    ipv4_rows(section)
        .map(|cols| {
            let device = if cols.get(5) == "vlan" {
                format!("vlan {}", cols.get(6))
            } else {
                cols.get(5)
            };
            Interface {
                id: String::new(),
                name: cols.get(0),
                address: cols.get(1),
                subnetmask: cols.get(2),
                status: cols.get(3),
                device,
            }
        })
        .collect()
}

/// Route rows are the lines carrying a prefix length.
pub fn parse_routes(section: &[String]) -> Vec<Route> {
    section
        .iter()
        .filter(|line| line.contains('/'))
        .map(|line| Columns::new(line))
        .filter(|cols| !cols.is_empty())
        .map(|cols| Route {
            id: String::new(),
            destination: cols.get(0),
            gateway: cols.get(1),
            interface: cols.get(2),
            typestring: cols.get(3),
            metric: cols.get(4),
        })
        .collect()
}

/// The optional flags column shifts port and interface right by one.
pub fn parse_arp(section: &[String]) -> Vec<ArpEntry> {
    ipv4_rows(section)
        .map(|cols| {
            let (slotport, interface) = if cols.get(3).contains('/') {
                (cols.get(3), cols.join(4, 6))
            } else {
                (cols.get(4), cols.join(5, 7))
            };
            ArpEntry {
                id: String::new(),
                ip: cols.get(0),
                mac: cols.get(1),
                typestring: cols.get(2),
                slotport,
                interface,
            }
        })
        .collect()
}

pub fn generate_interfaces(rows: Vec<Interface>, session: &CrawlSession) -> Vec<Interface> {
    rows.into_iter()
        .map(|row| Interface {
            id: session.next_uid(),
            ..row
        })
        .collect()
}

pub fn generate_routes(rows: Vec<Route>, session: &CrawlSession) -> Vec<Route> {
    rows.into_iter()
        .map(|row| Route {
            id: session.next_uid(),
            ..row
        })
        .collect()
}

pub fn generate_arp(rows: Vec<ArpEntry>, session: &CrawlSession) -> Vec<ArpEntry> {
    rows.into_iter()
        .map(|row| ArpEntry {
            id: session.next_uid(),
            ..row
        })
        .collect()
}

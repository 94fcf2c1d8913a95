//! VLANs, DHCP server state and the configuration snapshot.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::parse::field::{Columns, IPV4, LabeledField, builtin_field, table_body};
use crate::parse::segment::Segmentation;
use crate::payload::{Dhcp, Lease, Vlan};
use crate::session::CrawlSession;

pub const SHOW_VLAN: &str = "show vlan";
pub const SHOW_DHCP_STATISTICS: &str = "show dhcp-server statistics";
pub const SHOW_DHCP_LEASES: &str = "show dhcp-server leases";
pub const SHOW_CONFIGURATION: &str = "show configuration snapshot";

const VLAN_TABLE_HEADER: usize = 3;

static SERVER_NAME: Lazy<LabeledField> =
    Lazy::new(|| builtin_field("  DHCP Server Name              : ", ".*"));
static SERVER_STATUS: Lazy<LabeledField> =
    Lazy::new(|| builtin_field("  DHCP Server Status            : ", ".*"));
static SUBNETS_MANAGED: Lazy<LabeledField> =
    Lazy::new(|| builtin_field("  Total Subnets Managed         : ", ".*"));
static IPV4_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(IPV4).expect("IPv4 pattern must compile"));

pub fn parse_vlans(section: &[String]) -> Vec<Vlan> {
    table_body(section, VLAN_TABLE_HEADER)
        .map(|line| {
            let cols = Columns::new(line);
            let ident = cols.get(0);
            Vlan {
                id: String::new(),
                description: format!("vlan {ident}"),
                name: cols.get(10),
                typestring: cols.get(1),
                adminstatus: cols.get(2),
                operstatus: cols.get(3),
                ipstatus: cols.get(7),
                ident,
            }
        })
        .collect()
}

pub fn generate_vlans(rows: Vec<Vlan>, session: &CrawlSession) -> Vec<Vlan> {
    rows.into_iter()
        .map(|row| Vlan {
            id: session.next_uid(),
            ..row
        })
        .collect()
}

/// Server statistics. An empty section means the server is not running.
pub fn parse_dhcp_statistics(section: &[String]) -> Dhcp {
    let mut dhcp = Dhcp::default();
    if section.is_empty() {
        dhcp.serverstatus = "Disabled".to_string();
        return dhcp;
    }
    if section.len() > 1 {
        for line in section {
            if let Some(v) = SERVER_NAME.value(line) {
                dhcp.servername = v;
            } else if let Some(v) = SERVER_STATUS.value(line) {
                dhcp.serverstatus = v;
            } else if let Some(v) = SUBNETS_MANAGED.value(line) {
                dhcp.numsubnetsmanaged = v;
            }
        }
    }
    dhcp
}

/// Lease rows. Timestamps span four columns each.
pub fn parse_dhcp_leases(section: &[String]) -> Vec<Lease> {
    section
        .iter()
        .filter(|line| IPV4_TOKEN.is_match(line))
        .map(|line| Columns::new(line))
        .filter(|cols| !cols.is_empty())
        .map(|cols| Lease {
            id: String::new(),
            ipaddr: cols.get(0),
            mac: cols.get(1),
            timegranted: cols.join(2, 6),
            timeexpires: cols.join(6, 10),
            typestring: cols.get(10),
        })
        .collect()
}

pub fn parse_dhcp(seg: &Segmentation) -> Dhcp {
    let mut dhcp = parse_dhcp_statistics(seg.section(SHOW_DHCP_STATISTICS));
    dhcp.leases = parse_dhcp_leases(seg.section(SHOW_DHCP_LEASES));
    dhcp
}

pub fn generate_dhcp(parsed: Dhcp, session: &CrawlSession) -> Dhcp {
    let leases: Vec<Lease> = parsed
        .leases
        .into_iter()
        .map(|lease| Lease {
            id: session.next_uid(),
            ..lease
        })
        .collect();
    Dhcp {
        numleases: leases.len().to_string(),
        leases,
        ..parsed
    }
}

/// Configuration snapshot as one text block.
pub fn parse_configuration(section: &[String]) -> String {
    section.join("\n\r")
}

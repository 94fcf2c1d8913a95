//! Port inventory from `show interfaces`, `show interfaces status` and
//! `show mac-address-table`.

use log::debug;
use once_cell::sync::Lazy;

use crate::parse::field::{Columns, LabeledField, MAC_VALUE, builtin_field, chunk_lines};
use crate::parse::segment::Segmentation;
use crate::payload::{AssociatedMac, Port, SpeedSetting};
use crate::session::CrawlSession;

pub const SHOW_INTERFACES: &str = "show interfaces";
pub const SHOW_INTERFACES_STATUS: &str = "show interfaces status";
pub const SHOW_MAC_TABLE: &str = "show mac-address-table";

static SLOTPORT: Lazy<LabeledField> = Lazy::new(|| builtin_field(" Slot/Port  ", r"\d*/\d*"));
static OPERSTATUS: Lazy<LabeledField> =
    Lazy::new(|| builtin_field("  Operational Status     : ", r"\w*"));
static SFP: Lazy<LabeledField> = Lazy::new(|| builtin_field(r"  SFP/SFP\+/XFP           : ", ".*"));
static MAC: Lazy<LabeledField> = Lazy::new(|| builtin_field("  MAC address            : ", MAC_VALUE));

/// One row of `show mac-address-table`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MacRow {
    pub vlan: String,
    pub mac: String,
    pub typestring: String,
    pub protocol: String,
    pub operation: String,
    pub slotport: String,
}

/// One row of `show interfaces status`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusRow {
    pub slotport: String,
    pub autonegotiate: String,
    pub detected: SpeedSetting,
    pub configured: SpeedSetting,
    pub traplinkupdown: String,
}

/// One slot/port block of `show interfaces`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InterfaceChunk {
    pub slotport: String,
    pub operstatus: String,
    pub sfp: String,
    pub mac: String,
}

/// A port assembled from the three tables, before ids are assigned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPort {
    pub chunk: InterfaceChunk,
    pub status: Option<StatusRow>,
    pub macs: Vec<MacRow>,
}

pub fn parse_mac_table(section: &[String]) -> Vec<MacRow> {
    section
        .iter()
        .filter(|line| line.contains('/'))
        .map(|line| {
            let cols = Columns::new(line);
            MacRow {
                vlan: cols.get(0),
                mac: cols.get(1),
                typestring: cols.get(2),
                protocol: cols.get(3),
                operation: cols.get(4),
                slotport: cols.get(5),
            }
        })
        .collect()
}

/// The first row with a `/` is the header and is skipped.
pub fn parse_status_table(section: &[String]) -> Vec<StatusRow> {
    section
        .iter()
        .filter(|line| line.contains('/'))
        .skip(1)
        .map(|line| {
            let cols = Columns::new(line);
            StatusRow {
                slotport: cols.get(0),
                autonegotiate: cols.get(1),
                detected: SpeedSetting {
                    speed: cols.get(2),
                    duplex: cols.get(3),
                    hybridtype: cols.get(4),
                },
                configured: SpeedSetting {
                    speed: cols.get(5),
                    duplex: cols.get(6),
                    hybridtype: cols.get(7),
                },
                traplinkupdown: cols.get(8),
            }
        })
        .collect()
}

pub fn parse_interface_chunks(section: &[String]) -> Vec<InterfaceChunk> {
    chunk_lines(section, section.len(), |line| SLOTPORT.is_match(line))
        .into_iter()
        .map(|(start, body)| {
            let mut chunk = InterfaceChunk {
                slotport: SLOTPORT.value(&section[start]).unwrap_or_default(),
                ..Default::default()
            };
            for line in body {
                if let Some(v) = OPERSTATUS.value(line) {
                    chunk.operstatus = v;
                } else if let Some(v) = SFP.value(line) {
                    chunk.sfp = v;
                } else if let Some(v) = MAC.value(line) {
                    chunk.mac = v;
                }
            }
            chunk
        })
        .collect()
}

/// Ports come from the `show interfaces` blocks in order and are enriched
/// from the status and MAC tables by slot/port.
pub fn parse(seg: &Segmentation) -> Vec<ParsedPort> {
    let chunks = parse_interface_chunks(seg.section(SHOW_INTERFACES));
    let status = parse_status_table(seg.section(SHOW_INTERFACES_STATUS));
    let macs = parse_mac_table(seg.section(SHOW_MAC_TABLE));
    debug!(
        "ports: {} interface blocks, {} status rows, {} mac rows",
        chunks.len(),
        status.len(),
        macs.len()
    );

    chunks
        .into_iter()
        .map(|chunk| ParsedPort {
            status: status.iter().rev().find(|s| s.slotport == chunk.slotport).cloned(),
            macs: macs.iter().filter(|m| m.slotport == chunk.slotport).cloned().collect(),
            chunk,
        })
        .collect()
}

pub fn generate(parsed: Vec<ParsedPort>, session: &CrawlSession) -> Vec<Port> {
    parsed
        .into_iter()
        .map(|p| {
            let id = session.next_uid();
            let status = p.status.unwrap_or_default();
            let associatedmacs = p
                .macs
                .into_iter()
                .map(|m| AssociatedMac {
                    id: session.next_uid(),
                    vlan: m.vlan,
                    mac: m.mac,
                    typestring: m.typestring,
                })
                .collect();
            Port {
                id,
                slotport: p.chunk.slotport,
                operationalstatus: p.chunk.operstatus,
                sfp: p.chunk.sfp,
                mac: p.chunk.mac,
                autonegotiate: status.autonegotiate,
                detected: status.detected,
                configured: status.configured,
                associatedmacs,
                macattack: false,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::parse::segment::segment;

    fn lines(text: &[&str]) -> Vec<String> {
        text.iter().map(|s| s.to_string()).collect()
    }

    fn capture() -> Vec<String> {
        lines(&[
            "-> show interfaces",
            " Slot/Port  1/1 :",
            "  Operational Status     : up,",
            "  SFP/SFP+/XFP           : 1000Base-T,",
            "  MAC address            : e8:e7:32:a3:06:de,",
            " Slot/Port  1/2 :",
            "  Operational Status     : down,",
            "  MAC address            : e8:e7:32:a3:06:df,",
            "-> show interfaces status",
            " Slot/   AutoNego  Speed Duplex Hybrid  Speed Duplex Hybrid  Trap",
            " 1/1     Enable    1000   Full   NA     1000   Full   NA      -",
            " 1/2     Enable      -     -     NA     Auto   Auto   NA      -",
            "-> show mac-address-table",
            "  Vlan    Mac Address       Type     Protocol    Operation   Interface",
            "     2    00:30:ab:2b:96:29  learned    ---     bridging      1/1",
            "     2    00:30:ab:2b:96:30  learned    ---     bridging      1/1",
            " Total number of Valid MAC addresses above = 2",
        ])
    }

    #[test]
    fn test_mac_table_rows() {
        let rows = parse_mac_table(&lines(&[
            "     2    00:30:ab:2b:96:29  learned    ---     bridging      1/1",
            "  Vlan    Mac Address",
        ]));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].vlan, "2");
        assert_eq!(rows[0].operation, "bridging");
        assert_eq!(rows[0].slotport, "1/1");
    }

    #[test]
    fn test_ports_joined_across_tables() {
        let capture = capture();
        let commands = lines(&[SHOW_INTERFACES, SHOW_INTERFACES_STATUS, SHOW_MAC_TABLE]);
        let seg = segment(&capture, &commands);
        let session = CrawlSession::new();
        let ports = generate(parse(&seg), &session);

        assert_eq!(ports.len(), 2);
        let first = &ports[0];
        assert_eq!(first.slotport, "1/1");
        assert_eq!(first.operationalstatus, "up");
        assert_eq!(first.sfp, "1000Base-T");
        assert_eq!(first.mac, "e8:e7:32:a3:06:de");
        assert_eq!(first.autonegotiate, "Enable");
        assert_eq!(first.detected.speed, "1000");
        assert_eq!(first.configured.duplex, "Full");
        assert_eq!(first.associatedmacs.len(), 2);
        assert_eq!(first.associatedmacs[1].mac, "00:30:ab:2b:96:30");

        let second = &ports[1];
        assert_eq!(second.operationalstatus, "down");
        assert_eq!(second.sfp, "");
        assert_eq!(second.configured.speed, "Auto");
        assert!(second.associatedmacs.is_empty());

        let mut ids: Vec<&str> = ports.iter().map(|p| p.id.as_str()).collect();
        ids.extend(first.associatedmacs.iter().map(|m| m.id.as_str()));
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 4);
    }
}

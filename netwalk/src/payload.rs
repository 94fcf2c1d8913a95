//! OmniSwitch type payload: the structured inventory pulled from a device.
//!
//! Records are plain structs. XML tag names live in
//! [`crate::document::tags`], not here.

use crate::target::Provenance;

/// Destination written by the device for the default route.
pub const DEFAULT_ROUTE: &str = "0.0.0.0/0";

/// Speed, duplex and hybrid type, as detected or as configured.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpeedSetting {
    pub speed: String,
    pub duplex: String,
    pub hybridtype: String,
}

/// One MAC learned on a port.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssociatedMac {
    pub id: String,
    pub vlan: String,
    pub mac: String,
    pub typestring: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Port {
    pub id: String,
    pub slotport: String,
    pub operationalstatus: String,
    pub sfp: String,
    pub mac: String,
    pub autonegotiate: String,
    pub detected: SpeedSetting,
    pub configured: SpeedSetting,
    pub associatedmacs: Vec<AssociatedMac>,

    /// Set when a neighbor with addresses sits on this port, so its learned
    /// MACs are not turned into leaf devices.
    pub macattack: bool,
}

impl Port {
    pub fn is_up(&self) -> bool {
        self.operationalstatus == "up"
    }

    /// True when any learned MAC contains `mac`.
    pub fn carries(&self, mac: &str) -> bool {
        self.associatedmacs.iter().any(|m| m.mac.contains(mac))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vlan {
    pub id: String,
    pub description: String,
    pub name: String,
    pub typestring: String,
    pub ident: String,
    pub adminstatus: String,
    pub operstatus: String,
    pub ipstatus: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Gbic {
    pub id: String,
    pub ident: String,
    pub modelname: String,
    pub partnumber: String,
    pub serial: String,
    pub adminstatus: String,
    pub operstatus: String,
    pub laserwavelength: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Module {
    pub id: String,
    pub slot: String,
    pub status: String,
    pub description: String,
    pub partnumber: String,
    pub mac: String,
    pub gbics: Vec<Gbic>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Chassis {
    pub model: String,
    pub description: String,
    pub adminstatus: String,
    pub operstatus: String,
    pub mac: String,
    pub serial: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Route {
    pub id: String,
    pub destination: String,
    pub gateway: String,
    pub interface: String,
    pub metric: String,
    pub typestring: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Interface {
    pub id: String,
    pub name: String,
    pub address: String,
    pub subnetmask: String,
    pub status: String,
    pub device: String,
}

/// A neighbor reported by the AMAP table.
#[derive(Debug, Clone, Default)]
pub struct RemoteHost {
    pub id: String,
    pub localslotport: String,
    pub localvlan: String,
    pub remotehostname: String,
    pub remotedevice: String,
    pub remotemac: String,
    pub remoteslotport: String,
    pub remotevlan: String,
    pub remoteips: Vec<String>,

    /// Id of the crawled NE this neighbor turned out to be, if any.
    pub linked_ne_id: Option<String>,

    /// Which NE, entrypoint and credential reported this neighbor.
    pub learned_from: Option<Provenance>,
}

/// Two reports of the same neighbor share MAC and hostname.
impl PartialEq for RemoteHost {
    fn eq(&self, other: &Self) -> bool {
        self.remotemac == other.remotemac && self.remotehostname == other.remotehostname
    }
}

impl Eq for RemoteHost {}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Amap {
    pub amapstatus: String,
    pub remotehosts: Vec<RemoteHost>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArpEntry {
    pub id: String,
    pub ip: String,
    pub mac: String,
    pub typestring: String,
    pub slotport: String,
    pub interface: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lease {
    pub id: String,
    pub ipaddr: String,
    pub mac: String,
    pub timegranted: String,
    pub timeexpires: String,
    pub typestring: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dhcp {
    pub servername: String,
    pub serverstatus: String,
    pub numsubnetsmanaged: String,
    pub numleases: String,
    pub leases: Vec<Lease>,
}

/// Everything a discovery pull yields for one OmniSwitch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypePayload {
    pub typestring: String,
    pub ports: Vec<Port>,
    pub vlans: Vec<Vlan>,
    pub modules: Vec<Module>,
    pub chassis: Chassis,
    pub routes: Vec<Route>,
    pub interfaces: Vec<Interface>,
    pub amap: Amap,
    pub arptable: Vec<ArpEntry>,
    pub dhcp: Dhcp,
    pub configuration: String,
}

impl TypePayload {
    pub fn new(typestring: impl Into<String>) -> Self {
        Self {
            typestring: typestring.into(),
            ..Default::default()
        }
    }

    /// Gateway of the first default route.
    pub fn default_gateway(&self) -> Option<&str> {
        self.routes
            .iter()
            .find(|r| r.destination == DEFAULT_ROUTE)
            .map(|r| r.gateway.as_str())
    }

    /// True when any IP interface carries `address`.
    pub fn has_interface_address(&self, address: &str) -> bool {
        self.interfaces.iter().any(|i| i.address == address)
    }

    pub fn port(&self, slotport: &str) -> Option<&Port> {
        self.ports.iter().find(|p| p.slotport == slotport)
    }

    /// ARP entry for an IP address.
    pub fn arp_for(&self, ip: &str) -> Option<&ArpEntry> {
        self.arptable.iter().find(|a| a.ip == ip)
    }

    /// Neighbor table entries.
    pub fn remote_hosts(&self) -> &[RemoteHost] {
        &self.amap.remotehosts
    }
}

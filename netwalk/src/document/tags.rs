//! XML element names for the input and output documents.
//!
//! The data model carries no naming; every tag the reader and writer use is
//! listed here.

// input document
pub const TARGET: &str = "target";
pub const ENTRYPOINT: &str = "entrypoint";
pub const AUTH: &str = "auth";
pub const POSSIBILITY: &str = "possibility";
pub const USERNAME: &str = "username";
pub const PASSWORD: &str = "password";
pub const MEMBERS: &str = "members";
pub const MEMBER: &str = "member";
pub const IPADDR: &str = "ipaddr";
pub const DEFAULTROUTE: &str = "defaultroute";
pub const DHCPS: &str = "dhcps";
pub const CUSTOM: &str = "custom";

// network elements
pub const ROOT: &str = "root";
pub const NE: &str = "ne";
pub const HOSTNAME: &str = "hostname";
pub const PARENTS: &str = "parents";
pub const CHILDREN: &str = "children";
pub const PORT: &str = "port";
pub const MACS: &str = "macs";
pub const MAC: &str = "mac";
pub const IPS: &str = "ips";
pub const IP: &str = "ip";
pub const ADDRESS: &str = "address";
pub const MASK: &str = "mask";
pub const EVENTLOG: &str = "eventlog";
pub const EVENT: &str = "event";

// type payload
pub const TYPE: &str = "type";
pub const PORTS: &str = "ports";
pub const SLOTPORT: &str = "slotport";
pub const OPERATIONALSTATUS: &str = "operationalstatus";
pub const SFP: &str = "sfp";
pub const AUTONEGOTIATE: &str = "autonegotiate";
pub const DETECTED: &str = "detected";
pub const CONFIGURED: &str = "configured";
pub const SPEED: &str = "speed";
pub const DUPLEX: &str = "duplex";
pub const HYBRIDTYPE: &str = "hybridtype";
pub const ASSOCIATEDMACS: &str = "associatedmacs";
pub const VLAN: &str = "vlan";
pub const VLANS: &str = "vlans";
pub const NAME: &str = "name";
pub const IDENT: &str = "ident";
pub const DESCRIPTION: &str = "description";
pub const ADMINSTATUS: &str = "adminstatus";
pub const OPERSTATUS: &str = "operstatus";
pub const IPSTATUS: &str = "ipstatus";
pub const MODULES: &str = "modules";
pub const MODULE: &str = "module";
pub const SLOT: &str = "slot";
pub const STATUS: &str = "status";
pub const PARTNUMBER: &str = "partnumber";
pub const GBICS: &str = "gbics";
pub const GBIC: &str = "gbic";
pub const MODELNAME: &str = "modelname";
pub const SERIAL: &str = "serial";
pub const LASERWAVELENGTH: &str = "laserwavelength";
pub const CHASSIS: &str = "chassis";
pub const MODEL: &str = "model";
pub const ROUTES: &str = "routes";
pub const ROUTE: &str = "route";
pub const DESTINATION: &str = "destination";
pub const GATEWAY: &str = "gateway";
pub const INTERFACE: &str = "interface";
pub const METRIC: &str = "metric";
pub const INTERFACES: &str = "interfaces";
pub const SUBNETMASK: &str = "subnetmask";
pub const DEVICE: &str = "device";
pub const AMAP: &str = "amap";
pub const AMAPSTATUS: &str = "amapstatus";
pub const REMOTEHOST: &str = "remotehost";
pub const LOCALSLOTPORT: &str = "localslotport";
pub const LOCALVLAN: &str = "localvlan";
pub const REMOTEHOSTNAME: &str = "remotehostname";
pub const REMOTEDEVICE: &str = "remotedevice";
pub const REMOTEMAC: &str = "remotemac";
pub const REMOTESLOTPORT: &str = "remoteslotport";
pub const REMOTEVLAN: &str = "remotevlan";
pub const LINKED_NE_ID: &str = "linkedNEid";
pub const REMOTEIPS: &str = "remoteips";
pub const REMOTEIP: &str = "remoteip";
pub const ARPTABLE: &str = "arptable";
pub const ARP: &str = "arp";
pub const DHCP: &str = "dhcp";
pub const SERVERNAME: &str = "servername";
pub const SERVERSTATUS: &str = "serverstatus";
pub const NUMSUBNETSMANAGED: &str = "numsubnetsmanaged";
pub const NUMLEASES: &str = "numleases";
pub const LEASE: &str = "lease";
pub const TIMEGRANTED: &str = "timegranted";
pub const TIMEEXPIRES: &str = "timeexpires";
pub const CONFIGURATION: &str = "configuration";
pub const TEXT: &str = "text";

// attributes
pub const ATTR_ID: &str = "id";
pub const ATTR_TYPE: &str = "type";
pub const ATTR_HOSTNAME: &str = "hostname";
pub const ATTR_TAG: &str = "tag";
pub const ATTR_LOCAL_PORTID: &str = "local_portid";
pub const ATTR_LOCAL_SLOTPORT: &str = "local_slotport";

//! Writing the topology document, and reading type payloads back from it.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use log::debug;
use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event as XmlEvent};

use super::tags;
use super::tree::{self, Node};
use crate::element::{AssocNe, CrawlResult, NetworkElement};
use crate::error::{InputError, OutputError};
use crate::payload::{
    Amap, ArpEntry, AssociatedMac, Chassis, Dhcp, Gbic, Interface, Lease, Module, Port, RemoteHost, Route,
    SpeedSetting, TypePayload, Vlan,
};
use crate::session::Event;

fn xml_error(e: impl std::fmt::Display) -> OutputError {
    OutputError::Xml(e.to_string())
}

/// Thin element-at-a-time layer over the quick-xml writer.
struct DocWriter<W: Write> {
    inner: Writer<W>,
}

impl<W: Write> DocWriter<W> {
    fn new(out: W) -> Self {
        Self {
            inner: Writer::new_with_indent(out, b' ', 2),
        }
    }

    fn start(&mut self, tag: &str, attrs: &[(&str, &str)]) -> Result<(), OutputError> {
        let start = BytesStart::new(tag).with_attributes(attrs.iter().copied());
        self.inner.write_event(XmlEvent::Start(start)).map_err(xml_error)
    }

    fn end(&mut self, tag: &str) -> Result<(), OutputError> {
        self.inner.write_event(XmlEvent::End(BytesEnd::new(tag))).map_err(xml_error)
    }

    fn empty(&mut self, tag: &str, attrs: &[(&str, &str)]) -> Result<(), OutputError> {
        let start = BytesStart::new(tag).with_attributes(attrs.iter().copied());
        self.inner.write_event(XmlEvent::Empty(start)).map_err(xml_error)
    }

    /// `<tag>text</tag>`, or `<tag/>` for empty text.
    fn leaf(&mut self, tag: &str, text: &str) -> Result<(), OutputError> {
        if text.is_empty() {
            return self.empty(tag, &[]);
        }
        self.start(tag, &[])?;
        self.inner
            .write_event(XmlEvent::Text(BytesText::new(text)))
            .map_err(xml_error)?;
        self.end(tag)
    }

    fn leaf_with(&mut self, tag: &str, attrs: &[(&str, &str)], text: &str) -> Result<(), OutputError> {
        self.start(tag, attrs)?;
        self.inner
            .write_event(XmlEvent::Text(BytesText::new(text)))
            .map_err(xml_error)?;
        self.end(tag)
    }

    fn into_inner(self) -> W {
        self.inner.into_inner()
    }
}

/// Serialize every NE of `results` followed by the event log.
pub fn write_document<W: Write>(out: W, results: &[CrawlResult], events: &[Event]) -> Result<W, OutputError> {
    let mut w = DocWriter::new(out);
    w.start(tags::ROOT, &[])?;
    for result in results {
        for ne in &result.loo_ne {
            debug!("serializing NE {}", ne.id);
            write_ne(&mut w, ne)?;
        }
    }
    w.start(tags::EVENTLOG, &[])?;
    for (index, event) in events.iter().enumerate() {
        let id = (index + 1).to_string();
        w.leaf_with(tags::EVENT, &[(tags::ATTR_ID, id.as_str())], &event.to_string())?;
    }
    w.end(tags::EVENTLOG)?;
    w.end(tags::ROOT)?;
    Ok(w.into_inner())
}

/// Render the document to a string.
pub fn render(results: &[CrawlResult], events: &[Event]) -> Result<String, OutputError> {
    let bytes = write_document(Vec::new(), results, events)?;
    String::from_utf8(bytes).map_err(xml_error)
}

/// Write the document to `path`.
pub fn write_file(path: impl AsRef<Path>, results: &[CrawlResult], events: &[Event]) -> Result<(), OutputError> {
    let path = path.as_ref();
    let io_error = |source| OutputError::Write {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(io_error)?;
    let mut out = write_document(BufWriter::new(file), results, events)?;
    out.flush().map_err(io_error)
}

fn write_assocs<W: Write>(w: &mut DocWriter<W>, tag: &str, assocs: &[AssocNe]) -> Result<(), OutputError> {
    w.start(tag, &[])?;
    for assoc in assocs {
        w.start(
            tags::NE,
            &[
                (tags::ATTR_ID, assoc.id.as_str()),
                (tags::ATTR_TYPE, assoc.typestring.as_str()),
                (tags::ATTR_HOSTNAME, assoc.hostname.as_str()),
            ],
        )?;
        w.empty(
            tags::PORT,
            &[
                (tags::ATTR_LOCAL_PORTID, assoc.portid.as_str()),
                (tags::ATTR_LOCAL_SLOTPORT, assoc.slotport.as_str()),
            ],
        )?;
        w.end(tags::NE)?;
    }
    w.end(tag)
}

fn write_ne<W: Write>(w: &mut DocWriter<W>, ne: &NetworkElement) -> Result<(), OutputError> {
    w.start(tags::NE, &[(tags::ATTR_ID, ne.id.as_str()), (tags::ATTR_TYPE, ne.typestring.as_str())])?;
    w.leaf(tags::HOSTNAME, &ne.hostname)?;
    write_assocs(w, tags::PARENTS, &ne.parents)?;
    write_assocs(w, tags::CHILDREN, &ne.children)?;

    w.start(tags::MACS, &[])?;
    for mac in &ne.macs {
        w.leaf(tags::MAC, mac)?;
    }
    w.end(tags::MACS)?;

    w.start(tags::IPS, &[])?;
    for ip in &ne.ips {
        w.start(tags::IP, &[])?;
        w.leaf(tags::ADDRESS, &ip.address)?;
        w.leaf(tags::MASK, &ip.mask)?;
        w.end(tags::IP)?;
    }
    w.end(tags::IPS)?;

    if ne.typecrawled {
        if let Some(payload) = &ne.payload {
            write_payload(w, payload)?;
        }
    }
    w.end(tags::NE)
}

fn write_speed<W: Write>(w: &mut DocWriter<W>, tag: &str, speed: &SpeedSetting) -> Result<(), OutputError> {
    w.start(tag, &[])?;
    w.leaf(tags::SPEED, &speed.speed)?;
    w.leaf(tags::DUPLEX, &speed.duplex)?;
    w.leaf(tags::HYBRIDTYPE, &speed.hybridtype)?;
    w.end(tag)
}

fn write_payload<W: Write>(w: &mut DocWriter<W>, payload: &TypePayload) -> Result<(), OutputError> {
    w.start(tags::TYPE, &[(tags::ATTR_TYPE, payload.typestring.as_str())])?;

    w.start(tags::PORTS, &[])?;
    for port in &payload.ports {
        w.start(tags::PORT, &[(tags::ATTR_ID, port.id.as_str())])?;
        w.leaf(tags::SLOTPORT, &port.slotport)?;
        w.leaf(tags::OPERATIONALSTATUS, &port.operationalstatus)?;
        w.leaf(tags::SFP, &port.sfp)?;
        w.leaf(tags::MAC, &port.mac)?;
        w.leaf(tags::AUTONEGOTIATE, &port.autonegotiate)?;
        write_speed(w, tags::DETECTED, &port.detected)?;
        write_speed(w, tags::CONFIGURED, &port.configured)?;
        w.start(tags::ASSOCIATEDMACS, &[])?;
        for learned in &port.associatedmacs {
            w.start(tags::MAC, &[(tags::ATTR_ID, learned.id.as_str())])?;
            w.leaf(tags::VLAN, &learned.vlan)?;
            w.leaf(tags::MAC, &learned.mac)?;
            w.leaf(tags::TYPE, &learned.typestring)?;
            w.end(tags::MAC)?;
        }
        w.end(tags::ASSOCIATEDMACS)?;
        w.end(tags::PORT)?;
    }
    w.end(tags::PORTS)?;

    w.start(tags::VLANS, &[])?;
    for vlan in &payload.vlans {
        w.start(tags::VLAN, &[(tags::ATTR_ID, vlan.id.as_str())])?;
        w.leaf(tags::DESCRIPTION, &vlan.description)?;
        w.leaf(tags::NAME, &vlan.name)?;
        w.leaf(tags::TYPE, &vlan.typestring)?;
        w.leaf(tags::IDENT, &vlan.ident)?;
        w.leaf(tags::ADMINSTATUS, &vlan.adminstatus)?;
        w.leaf(tags::OPERSTATUS, &vlan.operstatus)?;
        w.leaf(tags::IPSTATUS, &vlan.ipstatus)?;
        w.end(tags::VLAN)?;
    }
    w.end(tags::VLANS)?;

    w.start(tags::MODULES, &[])?;
    for module in &payload.modules {
        w.start(tags::MODULE, &[(tags::ATTR_ID, module.id.as_str())])?;
        w.leaf(tags::SLOT, &module.slot)?;
        w.leaf(tags::STATUS, &module.status)?;
        w.leaf(tags::DESCRIPTION, &module.description)?;
        w.leaf(tags::PARTNUMBER, &module.partnumber)?;
        w.leaf(tags::MAC, &module.mac)?;
        w.start(tags::GBICS, &[])?;
        for gbic in &module.gbics {
            w.start(tags::GBIC, &[(tags::ATTR_ID, gbic.id.as_str())])?;
            w.leaf(tags::IDENT, &gbic.ident)?;
            w.leaf(tags::MODELNAME, &gbic.modelname)?;
            w.leaf(tags::PARTNUMBER, &gbic.partnumber)?;
            w.leaf(tags::SERIAL, &gbic.serial)?;
            w.leaf(tags::ADMINSTATUS, &gbic.adminstatus)?;
            w.leaf(tags::OPERSTATUS, &gbic.operstatus)?;
            w.leaf(tags::LASERWAVELENGTH, &gbic.laserwavelength)?;
            w.end(tags::GBIC)?;
        }
        w.end(tags::GBICS)?;
        w.end(tags::MODULE)?;
    }
    w.end(tags::MODULES)?;

    let chassis = &payload.chassis;
    w.start(tags::CHASSIS, &[])?;
    w.leaf(tags::MODEL, &chassis.model)?;
    w.leaf(tags::DESCRIPTION, &chassis.description)?;
    w.leaf(tags::ADMINSTATUS, &chassis.adminstatus)?;
    w.leaf(tags::OPERSTATUS, &chassis.operstatus)?;
    w.leaf(tags::MAC, &chassis.mac)?;
    w.leaf(tags::SERIAL, &chassis.serial)?;
    w.end(tags::CHASSIS)?;

    w.start(tags::ROUTES, &[])?;
    for route in &payload.routes {
        w.start(tags::ROUTE, &[(tags::ATTR_ID, route.id.as_str())])?;
        w.leaf(tags::DESTINATION, &route.destination)?;
        w.leaf(tags::GATEWAY, &route.gateway)?;
        w.leaf(tags::INTERFACE, &route.interface)?;
        w.leaf(tags::METRIC, &route.metric)?;
        w.leaf(tags::TYPE, &route.typestring)?;
        w.end(tags::ROUTE)?;
    }
    w.end(tags::ROUTES)?;

    w.start(tags::INTERFACES, &[])?;
    for interface in &payload.interfaces {
        w.start(tags::INTERFACE, &[(tags::ATTR_ID, interface.id.as_str())])?;
        w.leaf(tags::NAME, &interface.name)?;
        w.leaf(tags::ADDRESS, &interface.address)?;
        w.leaf(tags::SUBNETMASK, &interface.subnetmask)?;
        w.leaf(tags::STATUS, &interface.status)?;
        w.leaf(tags::DEVICE, &interface.device)?;
        w.end(tags::INTERFACE)?;
    }
    w.end(tags::INTERFACES)?;

    w.start(tags::AMAP, &[])?;
    w.leaf(tags::AMAPSTATUS, &payload.amap.amapstatus)?;
    for rhost in &payload.amap.remotehosts {
        w.start(tags::REMOTEHOST, &[(tags::ATTR_ID, rhost.id.as_str())])?;
        w.leaf(tags::LOCALSLOTPORT, &rhost.localslotport)?;
        w.leaf(tags::LOCALVLAN, &rhost.localvlan)?;
        w.leaf(tags::REMOTEHOSTNAME, &rhost.remotehostname)?;
        w.leaf(tags::REMOTEDEVICE, &rhost.remotedevice)?;
        w.leaf(tags::REMOTEMAC, &rhost.remotemac)?;
        w.leaf(tags::REMOTESLOTPORT, &rhost.remoteslotport)?;
        w.leaf(tags::REMOTEVLAN, &rhost.remotevlan)?;
        w.leaf(tags::LINKED_NE_ID, rhost.linked_ne_id.as_deref().unwrap_or(""))?;
        w.start(tags::REMOTEIPS, &[])?;
        for ip in &rhost.remoteips {
            w.leaf(tags::REMOTEIP, ip)?;
        }
        w.end(tags::REMOTEIPS)?;
        w.end(tags::REMOTEHOST)?;
    }
    w.end(tags::AMAP)?;

    w.start(tags::ARPTABLE, &[])?;
    for arp in &payload.arptable {
        w.start(tags::ARP, &[(tags::ATTR_ID, arp.id.as_str())])?;
        w.leaf(tags::IP, &arp.ip)?;
        w.leaf(tags::MAC, &arp.mac)?;
        w.leaf(tags::TYPE, &arp.typestring)?;
        w.leaf(tags::SLOTPORT, &arp.slotport)?;
        w.leaf(tags::INTERFACE, &arp.interface)?;
        w.end(tags::ARP)?;
    }
    w.end(tags::ARPTABLE)?;

    let dhcp = &payload.dhcp;
    w.start(tags::DHCP, &[])?;
    w.leaf(tags::SERVERNAME, &dhcp.servername)?;
    w.leaf(tags::SERVERSTATUS, &dhcp.serverstatus)?;
    w.leaf(tags::NUMSUBNETSMANAGED, &dhcp.numsubnetsmanaged)?;
    w.leaf(tags::NUMLEASES, &dhcp.numleases)?;
    for lease in &dhcp.leases {
        w.start(tags::LEASE, &[(tags::ATTR_ID, lease.id.as_str())])?;
        w.leaf(tags::IPADDR, &lease.ipaddr)?;
        w.leaf(tags::MAC, &lease.mac)?;
        w.leaf(tags::TIMEGRANTED, &lease.timegranted)?;
        w.leaf(tags::TIMEEXPIRES, &lease.timeexpires)?;
        w.leaf(tags::TYPE, &lease.typestring)?;
        w.end(tags::LEASE)?;
    }
    w.end(tags::DHCP)?;

    w.start(tags::CONFIGURATION, &[])?;
    w.leaf(tags::TEXT, &payload.configuration)?;
    w.end(tags::CONFIGURATION)?;

    w.end(tags::TYPE)
}

fn id_of(node: &Node) -> String {
    node.attr(tags::ATTR_ID).unwrap_or_default().to_string()
}

/// Children named `item` of the first child named `list`.
fn items<'a>(node: &'a Node, list: &'a str, item: &'a str) -> impl Iterator<Item = &'a Node> + 'a {
    node.child(list).into_iter().flat_map(move |l| l.children_named(item))
}

fn read_speed(node: Option<&Node>) -> SpeedSetting {
    let Some(node) = node else {
        return SpeedSetting::default();
    };
    SpeedSetting {
        speed: node.child_text(tags::SPEED),
        duplex: node.child_text(tags::DUPLEX),
        hybridtype: node.child_text(tags::HYBRIDTYPE),
    }
}

fn read_port(node: &Node) -> Port {
    Port {
        id: id_of(node),
        slotport: node.child_text(tags::SLOTPORT),
        operationalstatus: node.child_text(tags::OPERATIONALSTATUS),
        sfp: node.child_text(tags::SFP),
        mac: node.child_text(tags::MAC),
        autonegotiate: node.child_text(tags::AUTONEGOTIATE),
        detected: read_speed(node.child(tags::DETECTED)),
        configured: read_speed(node.child(tags::CONFIGURED)),
        associatedmacs: items(node, tags::ASSOCIATEDMACS, tags::MAC)
            .map(|m| AssociatedMac {
                id: id_of(m),
                vlan: m.child_text(tags::VLAN),
                mac: m.child_text(tags::MAC),
                typestring: m.child_text(tags::TYPE),
            })
            .collect(),
        macattack: false,
    }
}

fn read_module(node: &Node) -> Module {
    Module {
        id: id_of(node),
        slot: node.child_text(tags::SLOT),
        status: node.child_text(tags::STATUS),
        description: node.child_text(tags::DESCRIPTION),
        partnumber: node.child_text(tags::PARTNUMBER),
        mac: node.child_text(tags::MAC),
        gbics: items(node, tags::GBICS, tags::GBIC)
            .map(|g| Gbic {
                id: id_of(g),
                ident: g.child_text(tags::IDENT),
                modelname: g.child_text(tags::MODELNAME),
                partnumber: g.child_text(tags::PARTNUMBER),
                serial: g.child_text(tags::SERIAL),
                adminstatus: g.child_text(tags::ADMINSTATUS),
                operstatus: g.child_text(tags::OPERSTATUS),
                laserwavelength: g.child_text(tags::LASERWAVELENGTH),
            })
            .collect(),
    }
}

fn read_remote_host(node: &Node) -> RemoteHost {
    let linked = node.child_text(tags::LINKED_NE_ID);
    RemoteHost {
        id: id_of(node),
        localslotport: node.child_text(tags::LOCALSLOTPORT),
        localvlan: node.child_text(tags::LOCALVLAN),
        remotehostname: node.child_text(tags::REMOTEHOSTNAME),
        remotedevice: node.child_text(tags::REMOTEDEVICE),
        remotemac: node.child_text(tags::REMOTEMAC),
        remoteslotport: node.child_text(tags::REMOTESLOTPORT),
        remotevlan: node.child_text(tags::REMOTEVLAN),
        remoteips: items(node, tags::REMOTEIPS, tags::REMOTEIP)
            .filter_map(|ip| ip.text.clone())
            .collect(),
        linked_ne_id: (!linked.is_empty()).then_some(linked),
        learned_from: None,
    }
}

fn read_payload(node: &Node) -> TypePayload {
    let chassis = node.child(tags::CHASSIS);
    let dhcp = node.child(tags::DHCP);
    let amap = node.child(tags::AMAP);
    TypePayload {
        typestring: node.attr(tags::ATTR_TYPE).unwrap_or_default().to_string(),
        ports: items(node, tags::PORTS, tags::PORT).map(read_port).collect(),
        vlans: items(node, tags::VLANS, tags::VLAN)
            .map(|v| Vlan {
                id: id_of(v),
                description: v.child_text(tags::DESCRIPTION),
                name: v.child_text(tags::NAME),
                typestring: v.child_text(tags::TYPE),
                ident: v.child_text(tags::IDENT),
                adminstatus: v.child_text(tags::ADMINSTATUS),
                operstatus: v.child_text(tags::OPERSTATUS),
                ipstatus: v.child_text(tags::IPSTATUS),
            })
            .collect(),
        modules: items(node, tags::MODULES, tags::MODULE).map(read_module).collect(),
        chassis: chassis.map_or_else(Chassis::default, |c| Chassis {
            model: c.child_text(tags::MODEL),
            description: c.child_text(tags::DESCRIPTION),
            adminstatus: c.child_text(tags::ADMINSTATUS),
            operstatus: c.child_text(tags::OPERSTATUS),
            mac: c.child_text(tags::MAC),
            serial: c.child_text(tags::SERIAL),
        }),
        routes: items(node, tags::ROUTES, tags::ROUTE)
            .map(|r| Route {
                id: id_of(r),
                destination: r.child_text(tags::DESTINATION),
                gateway: r.child_text(tags::GATEWAY),
                interface: r.child_text(tags::INTERFACE),
                metric: r.child_text(tags::METRIC),
                typestring: r.child_text(tags::TYPE),
            })
            .collect(),
        interfaces: items(node, tags::INTERFACES, tags::INTERFACE)
            .map(|i| Interface {
                id: id_of(i),
                name: i.child_text(tags::NAME),
                address: i.child_text(tags::ADDRESS),
                subnetmask: i.child_text(tags::SUBNETMASK),
                status: i.child_text(tags::STATUS),
                device: i.child_text(tags::DEVICE),
            })
            .collect(),
        amap: amap.map_or_else(Amap::default, |a| Amap {
            amapstatus: a.child_text(tags::AMAPSTATUS),
            remotehosts: a.children_named(tags::REMOTEHOST).map(read_remote_host).collect(),
        }),
        arptable: items(node, tags::ARPTABLE, tags::ARP)
            .map(|a| ArpEntry {
                id: id_of(a),
                ip: a.child_text(tags::IP),
                mac: a.child_text(tags::MAC),
                typestring: a.child_text(tags::TYPE),
                slotport: a.child_text(tags::SLOTPORT),
                interface: a.child_text(tags::INTERFACE),
            })
            .collect(),
        dhcp: dhcp.map_or_else(Dhcp::default, |d| Dhcp {
            servername: d.child_text(tags::SERVERNAME),
            serverstatus: d.child_text(tags::SERVERSTATUS),
            numsubnetsmanaged: d.child_text(tags::NUMSUBNETSMANAGED),
            numleases: d.child_text(tags::NUMLEASES),
            leases: d
                .children_named(tags::LEASE)
                .map(|l| Lease {
                    id: id_of(l),
                    ipaddr: l.child_text(tags::IPADDR),
                    mac: l.child_text(tags::MAC),
                    timegranted: l.child_text(tags::TIMEGRANTED),
                    timeexpires: l.child_text(tags::TIMEEXPIRES),
                    typestring: l.child_text(tags::TYPE),
                })
                .collect(),
        }),
        configuration: node
            .child(tags::CONFIGURATION)
            .map(|c| c.child_text(tags::TEXT))
            .unwrap_or_default(),
    }
}

/// Every `<type>` payload of a rendered document, in NE order.
pub fn read_type_payload(xml: &str) -> Result<Vec<TypePayload>, InputError> {
    let root = tree::parse(xml)?;
    Ok(root
        .children_named(tags::NE)
        .filter_map(|ne| ne.child(tags::TYPE))
        .map(read_payload)
        .collect())
}

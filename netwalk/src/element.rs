//! Network elements and the crawl result that owns them.
//!
//! NEs live in one registry ([`CrawlResult::loo_ne`]). Parent/child links
//! are [`AssocNe`] records keyed by NE id, resolved by lookup, never by
//! reference.

use chrono::{DateTime, Local};

use crate::payload::TypePayload;
use crate::target::{Entrypoint, Member};

/// MAC given to NEs that reached the audit without any.
pub const SENTINEL_MAC: &str = "00:00:00:00:00:00";

/// Prefix marking NEs reattached from the scratchpad.
pub const PROVISIONAL_PREFIX: &str = "!!-";

/// A parent or child pointer carried on an NE.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssocNe {
    pub id: String,
    pub typestring: String,
    pub hostname: String,

    /// Id of the local port record, or `NA`.
    pub portid: String,

    /// Local slot/port, or `NA`.
    pub slotport: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IpAddress {
    pub address: String,
    pub mask: String,
}

impl IpAddress {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            mask: String::new(),
        }
    }
}

/// A discovered device.
///
/// Two NEs are the same device when their primary MACs match; that is the
/// only thing `==` compares.
#[derive(Debug, Clone, Default)]
pub struct NetworkElement {
    pub id: String,
    pub typestring: String,
    pub hostname: String,
    pub parents: Vec<AssocNe>,
    pub children: Vec<AssocNe>,
    pub macs: Vec<String>,
    pub ips: Vec<IpAddress>,
    pub pulltimestamp: Option<DateTime<Local>>,
    pub payload: Option<TypePayload>,

    /// Entrypoint the NE was crawled through. Synthetic NEs have none.
    pub source_entry: Option<Entrypoint>,

    /// Auth possibility that worked on the source entry.
    pub auth_id: String,

    pub typecrawled: bool,
    pub badpull: bool,
    pub removalflag: bool,

    /// Leaves were synthesized from this NE's MAC tables.
    pub macattack: bool,

    pub hopcount: u32,

    pub islowestchild: bool,
    pub isaparent: bool,
    pub isroot: bool,
    pub realroot: bool,

    pub defaultrouteip: String,
    pub rootupmac: String,
    pub rootnemac: String,
    pub upstream_slotport: String,

    /// Direct children found through neighbor tables, by NE id.
    pub child_ids: Vec<String>,

    /// Direct parents found through neighbor tables, by NE id.
    pub parent_ids: Vec<String>,

    /// Where a synthesized NE was seen on its parent.
    pub parentport: String,
    pub parentportid: String,
    pub parenthostname: String,
}

impl NetworkElement {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Identity MAC, if any was recorded.
    pub fn primary_mac(&self) -> Option<&str> {
        self.macs.first().map(String::as_str)
    }

    /// Source entrypoint id, or an empty string for synthetic NEs.
    pub fn source_entry_id(&self) -> &str {
        self.source_entry.as_ref().map_or("", |e| e.id.as_str())
    }

    /// Payload-less and non-crawled NEs report no default gateway.
    pub fn default_gateway(&self) -> Option<&str> {
        self.payload.as_ref()?.default_gateway()
    }

    /// Association pointing at this NE from a neighbor's port.
    pub fn assoc(&self, portid: impl Into<String>, slotport: impl Into<String>) -> AssocNe {
        AssocNe {
            id: self.id.clone(),
            typestring: self.typestring.clone(),
            hostname: self.hostname.clone(),
            portid: portid.into(),
            slotport: slotport.into(),
        }
    }

    /// One-line summary used in event messages.
    pub fn summary(&self) -> String {
        format!(
            "NE ID: '{}', NE Type: '{}', NE Hostname: '{}'::: from source Entry ID: '{}'",
            self.id,
            self.typestring,
            self.hostname,
            self.source_entry_id()
        )
    }
}

impl PartialEq for NetworkElement {
    fn eq(&self, other: &Self) -> bool {
        self.primary_mac() == other.primary_mac()
    }
}

/// Everything one crawl invocation produced.
#[derive(Debug, Clone, Default)]
pub struct CrawlResult {
    /// Ids of every target crawled, in order.
    pub target_ids: Vec<String>,

    /// Registry of NEs.
    pub loo_ne: Vec<NetworkElement>,

    /// Provisional NEs synthesized from MAC tables.
    pub loo_scratchpad: Vec<NetworkElement>,

    /// Identity hints from the input document.
    pub loo_members: Vec<Member>,

    /// MAC of the device upstream of the detected root.
    pub realrootmac: String,

    /// Rendered tree from the map view.
    pub textmap: Vec<String>,
}

impl CrawlResult {
    pub fn new(target_id: impl Into<String>, members: Vec<Member>) -> Self {
        Self {
            target_ids: vec![target_id.into()],
            loo_members: members,
            ..Default::default()
        }
    }

    pub fn find(&self, id: &str) -> Option<&NetworkElement> {
        self.loo_ne.iter().find(|ne| ne.id == id)
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut NetworkElement> {
        self.loo_ne.iter_mut().find(|ne| ne.id == id)
    }

    /// Registry index of the NE with `id`.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.loo_ne.iter().position(|ne| ne.id == id)
    }

    /// Count of NEs whose type tag contains `typestring`.
    pub fn count_of_type(&self, typestring: &str) -> usize {
        self.loo_ne
            .iter()
            .filter(|ne| ne.typestring.contains(typestring))
            .count()
    }
}

/// Keep the first NE of each primary MAC, preserving order.
pub fn dedup_by_mac(nes: Vec<NetworkElement>) -> Vec<NetworkElement> {
    let mut unique: Vec<NetworkElement> = Vec::with_capacity(nes.len());
    for ne in nes {
        if !unique.contains(&ne) {
            unique.push(ne);
        }
    }
    unique
}

//! Roots, upstream ports and parent/child edges from routes, MAC tables,
//! ARP and neighbor tables.

use log::debug;

use crate::element::{AssocNe, CrawlResult, NetworkElement};

/// Mark roots, find every NE's upstream port and link parents to children.
pub fn family_matters(result: &mut CrawlResult) {
    let rootmac = find_roots(result);
    find_upstream_ports(result, &rootmac);
    find_real_root_uplink(result);
    classify_positions(result);
    link_children(result);
    synthesize_assocs(result);
}

/// Record default routes and flag NEs whose gateway is not an address of
/// any crawled NE. Returns the identity MAC of the last root found.
fn find_roots(result: &mut CrawlResult) -> String {
    let addresses: Vec<String> = result
        .loo_ne
        .iter()
        .filter_map(|ne| ne.payload.as_ref())
        .flat_map(|p| p.interfaces.iter().map(|i| i.address.clone()))
        .collect();

    let mut rootmac = String::new();
    for ne in result.loo_ne.iter_mut() {
        if let Some(gateway) = ne.default_gateway().map(str::to_string) {
            ne.defaultrouteip = gateway;
        }
        let gateway_in_crawl = addresses.iter().any(|a| *a == ne.defaultrouteip);
        if !gateway_in_crawl && ne.typecrawled && !ne.defaultrouteip.is_empty() {
            ne.isroot = true;
            ne.isaparent = true;
            if let Some(mac) = ne.primary_mac() {
                debug!("for '{}' found rootmac of '{}'", ne.hostname, mac);
                rootmac = mac.to_string();
            }
        }
    }
    rootmac
}

/// The upstream port of every NE is the one that learned the root's MAC.
fn find_upstream_ports(result: &mut CrawlResult, rootmac: &str) {
    for ne in result.loo_ne.iter_mut() {
        ne.rootnemac = rootmac.to_string();
        if rootmac.is_empty() {
            continue;
        }
        let upstream = ne
            .payload
            .as_ref()
            .and_then(|p| p.ports.iter().filter(|port| port.carries(rootmac)).last())
            .map(|port| port.slotport.clone());
        if let Some(slotport) = upstream {
            debug!("for '{}' found upstream slotport of '{}'", ne.hostname, slotport);
            ne.upstream_slotport = slotport;
        }
    }
}

/// A root's uplink is where its ARP table puts the default gateway. The
/// gateway's MAC identifies the real root.
fn find_real_root_uplink(result: &mut CrawlResult) {
    for ne in result.loo_ne.iter_mut().filter(|ne| ne.isroot) {
        let Some(arp) = ne
            .payload
            .as_ref()
            .and_then(|p| p.arptable.iter().filter(|a| a.ip == ne.defaultrouteip).last())
        else {
            continue;
        };
        ne.upstream_slotport = arp.slotport.clone();
        ne.rootupmac = arp.mac.clone();
        result.realrootmac = arp.mac.clone();
    }
    debug!("discovered realrootmac: '{}'", result.realrootmac);
}

/// An NE with a single neighbor on its upstream port is a lowest child;
/// any other neighbor makes it a parent.
fn classify_positions(result: &mut CrawlResult) {
    for ne in result.loo_ne.iter_mut() {
        ne.hostname = ne.hostname.trim_end_matches(['\r', '\n', ' ']).to_string();
        let Some(payload) = ne.payload.as_ref() else {
            ne.isaparent = false;
            ne.islowestchild = false;
            continue;
        };
        let rhosts = payload.remote_hosts();
        if rhosts.len() < 2 {
            for rhost in rhosts {
                if rhost.localslotport == ne.upstream_slotport {
                    ne.islowestchild = true;
                } else {
                    ne.isaparent = true;
                }
            }
        } else {
            ne.isaparent = true;
        }
        debug!(
            "isroot: {}, isaparent: {}, islowestchild: {}: {}",
            ne.isroot, ne.isaparent, ne.islowestchild, ne.hostname
        );
    }
}

/// Every linked neighbor of a parent that is not on its upstream port is a
/// child.
fn link_children(result: &mut CrawlResult) {
    let mut links: Vec<(String, String)> = Vec::new();
    for ne in result.loo_ne.iter().filter(|ne| ne.isaparent) {
        let Some(payload) = ne.payload.as_ref() else {
            continue;
        };
        for rhost in payload.remote_hosts() {
            let Some(linked) = rhost.linked_ne_id.as_ref() else {
                continue;
            };
            if result.find(linked).is_some() && rhost.localslotport != ne.upstream_slotport {
                links.push((ne.id.clone(), linked.clone()));
            }
        }
    }

    for (parent, child) in links {
        if let Some(ne) = result.find_mut(&parent) {
            ne.child_ids.push(child.clone());
        }
        if let Some(ne) = result.find_mut(&child) {
            ne.parent_ids.push(parent);
        }
    }
}

/// Associations toward `ids`, located through `ne`'s own neighbor table.
fn assocs_toward(ne: &NetworkElement, ids: &[String], loo_ne: &[NetworkElement]) -> Vec<AssocNe> {
    let Some(payload) = ne.payload.as_ref() else {
        return Vec::new();
    };
    let mut assocs = Vec::new();
    for other in ids.iter().filter_map(|id| loo_ne.iter().find(|n| n.id == *id)) {
        let Some(mac) = other.primary_mac() else {
            continue;
        };
        for rhost in payload.remote_hosts().iter().filter(|r| r.remotemac == mac) {
            let portid = payload
                .ports
                .iter()
                .filter(|p| p.slotport == rhost.localslotport)
                .last()
                .map(|p| p.id.clone())
                .unwrap_or_default();
            assocs.push(AssocNe {
                id: other.id.clone(),
                typestring: other.typestring.clone(),
                hostname: other.hostname.clone(),
                portid,
                slotport: rhost.localslotport.clone(),
            });
        }
    }
    assocs
}

fn synthesize_assocs(result: &mut CrawlResult) {
    let edges: Vec<(Vec<AssocNe>, Vec<AssocNe>)> = result
        .loo_ne
        .iter()
        .map(|ne| {
            (
                assocs_toward(ne, &ne.child_ids, &result.loo_ne),
                assocs_toward(ne, &ne.parent_ids, &result.loo_ne),
            )
        })
        .collect();

    for (ne, (children, parents)) in result.loo_ne.iter_mut().zip(edges) {
        for child in &children {
            debug!("child of '{}': {} on {}", ne.hostname, child.hostname, child.slotport);
        }
        ne.children.extend(children);
        ne.parents.extend(parents);
    }
}

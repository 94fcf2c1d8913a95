//! Growing the crawl: neighbor tables become the next round's entrypoints.

use log::debug;

use crate::element::NetworkElement;
use crate::payload::RemoteHost;
use crate::session::CrawlSession;
use crate::target::{Entrypoint, Provenance, Target};

/// Tag every neighbor with the NE that reported it and link neighbors whose
/// MAC is an already crawled NE.
pub fn link_amaps_to_ne(loo_ne: &mut [NetworkElement]) {
    let index: Vec<(String, String)> = loo_ne
        .iter()
        .filter_map(|ne| Some((ne.id.clone(), ne.primary_mac()?.to_string())))
        .collect();

    for ne in loo_ne.iter_mut() {
        let provenance = ne.source_entry.clone().map(|entry| Provenance {
            ne_id: ne.id.clone(),
            entry,
            auth_id: ne.auth_id.clone(),
        });
        let Some(payload) = ne.payload.as_mut() else {
            continue;
        };
        for rhost in payload.amap.remotehosts.iter_mut() {
            rhost.learned_from = provenance.clone();
            if rhost.remotemac.is_empty() {
                continue;
            }
            if let Some((id, _)) = index.iter().find(|(_, mac)| mac.contains(&rhost.remotemac)) {
                debug!("NE {} neighbor {} is NE {}", ne.id, rhost.remotemac, id);
                rhost.linked_ne_id = Some(id.clone());
            }
        }
    }
}

/// Unique neighbors reported by `nes` that are not crawled NEs yet, first
/// report wins.
fn unlinked_remote_hosts<'a>(nes: &'a [NetworkElement]) -> Vec<&'a RemoteHost> {
    let mut unique: Vec<&RemoteHost> = Vec::new();
    for rhost in nes
        .iter()
        .filter_map(|ne| ne.payload.as_ref())
        .flat_map(|p| p.remote_hosts())
        .filter(|r| r.linked_ne_id.is_none())
    {
        if !unique.contains(&rhost) {
            unique.push(rhost);
        }
    }
    unique
}

/// One entrypoint per neighbor address, carrying the neighbor's provenance.
pub fn remote_hosts_to_entrypoints(
    nes: &[NetworkElement],
    session: &CrawlSession,
    port: u16,
) -> Vec<Entrypoint> {
    let mut entries = Vec::new();
    for rhost in unlinked_remote_hosts(nes) {
        for ip in &rhost.remoteips {
            let mut entry = Entrypoint::new(session.next_uid(), ip.clone(), port)
                .with_hostname(rhost.remotehostname.clone());
            if let Some(provenance) = &rhost.learned_from {
                entry = entry.learned_from(provenance.clone());
            }
            debug!("new entrypoint {}", entry.summary());
            entries.push(entry);
        }
    }
    entries
}

/// Successor of `target` built from the neighbors of this round's NEs.
pub fn next_target(
    target: &Target,
    round: &[NetworkElement],
    session: &CrawlSession,
    port: u16,
) -> Target {
    let entries = remote_hosts_to_entrypoints(round, session, port);
    let next = target.next(session.next_uid(), entries);
    session.event(
        "gen_next_target",
        format!(
            "Examined relationships and generated new target with hopdepth = {}. Number of new Entrypoints = {}",
            next.hopdepth,
            next.entrypoints.len()
        ),
    );
    next
}

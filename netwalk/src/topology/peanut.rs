//! Leaf NEs synthesized from the MACs learned on switch ports.

use log::debug;

use crate::element::{AssocNe, CrawlResult, NetworkElement, dedup_by_mac};
use crate::oui::OuiDatabase;
use crate::session::CrawlSession;
use crate::target::Member;

/// Type tag of a leaf known only by its MAC.
pub const UNKNOWN_TYPE: &str = "UNKNOWN";

const NA: &str = "NA";

/// Leaf hostname: `mac(Manufacturer)` when a database is loaded, the raw
/// MAC when none is.
fn leaf_hostname(mac: &str, oui: Option<&OuiDatabase>) -> String {
    let Some(db) = oui else {
        return mac.to_string();
    };
    db.combo(mac).unwrap_or_else(|e| {
        debug!("OUI lookup on mac '{}' failed: {}", mac, e);
        UNKNOWN_TYPE.to_string()
    })
}

/// Apply a member whose MAC matches the leaf's. The last match wins.
fn apply_members(leaf: &mut NetworkElement, members: &[Member]) {
    let Some(mac) = leaf.primary_mac().map(str::to_lowercase) else {
        return;
    };
    if let Some(member) = members.iter().filter(|m| m.mac.to_lowercase() == mac).last() {
        leaf.hostname = member.hostname.clone();
        leaf.typestring = member.typestring.clone();
    }
}

/// Turn every learned MAC into a leaf NE.
///
/// Every leaf lands in the scratchpad. Leaves on up ports without an
/// addressed neighbor also join the registry as children of the switch
/// that learned them.
pub fn peanut_gallery(result: &mut CrawlResult, session: &CrawlSession, oui: Option<&OuiDatabase>) {
    let mut joined: Vec<NetworkElement> = Vec::new();
    let mut scratch: Vec<NetworkElement> = Vec::new();

    for ne in result.loo_ne.iter_mut() {
        let Some(payload) = ne.payload.as_mut() else {
            debug!("'{}' has no ports to run a macattack on", ne.hostname);
            ne.macattack = true;
            continue;
        };

        for port in payload.ports.iter_mut() {
            if payload
                .amap
                .remotehosts
                .iter()
                .any(|r| r.localslotport == port.slotport && !r.remoteips.is_empty())
            {
                port.macattack = true;
            }

            for learned in &port.associatedmacs {
                let mut leaf = NetworkElement {
                    typestring: UNKNOWN_TYPE.to_string(),
                    hostname: leaf_hostname(&learned.mac, oui),
                    macs: vec![learned.mac.clone()],
                    parentport: port.slotport.clone(),
                    parentportid: port.id.clone(),
                    parenthostname: ne.hostname.clone(),
                    ..NetworkElement::new(session.next_ne_id())
                };
                apply_members(&mut leaf, &result.loo_members);
                leaf.parents.push(AssocNe {
                    id: ne.id.clone(),
                    typestring: ne.typestring.clone(),
                    hostname: ne.hostname.clone(),
                    portid: NA.to_string(),
                    slotport: NA.to_string(),
                });
                scratch.push(leaf.clone());

                if port.is_up() && !port.macattack {
                    ne.children.push(AssocNe {
                        id: leaf.id.clone(),
                        typestring: leaf.typestring.clone(),
                        hostname: leaf.hostname.clone(),
                        portid: port.id.clone(),
                        slotport: port.slotport.clone(),
                    });
                    joined.push(leaf);
                    ne.macattack = true;
                }
            }
            debug!(
                "ran macattack for '{}'. SlotPort= {}. Length of associatedmacs = {}",
                ne.hostname,
                port.slotport,
                port.associatedmacs.len()
            );
        }
    }

    debug!("before removing duplicates we have {} new NEs", joined.len());
    let joined = dedup_by_mac(joined);
    debug!("after removing duplicates we have {} new NEs", joined.len());

    result.loo_scratchpad.extend(scratch);
    result.loo_ne.extend(joined);
    debug!(
        "macattack performed on {} of {} network elements",
        result.loo_ne.iter().filter(|ne| ne.macattack).count(),
        result.loo_ne.len()
    );
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::topology::fixtures::{neighbor, payload_mut, port, switch};

    fn single(learned: &[&str]) -> CrawlResult {
        let mut sw = switch("s1", "aa:00:00:00:00:01", "10.0.0.1", "10.0.0.254");
        sw.hostname = "sw-s1".into();
        payload_mut(&mut sw).ports = vec![port("p1", "1/5", learned), port("p2", "1/9", &["aa:00:00:00:00:09"])];
        payload_mut(&mut sw).amap.remotehosts = vec![neighbor("1/9", "aa:00:00:00:00:09", None)];
        let mut result = CrawlResult::new("1", vec![]);
        result.loo_ne = vec![sw];
        result
    }

    #[test]
    fn test_leaves_join_registry() {
        let session = CrawlSession::new();
        let mut result = single(&["00:30:ab:2b:96:29"]);
        peanut_gallery(&mut result, &session, None);

        assert_eq!(result.loo_ne.len(), 2);
        let leaf = &result.loo_ne[1];
        assert_eq!(leaf.typestring, "UNKNOWN");
        assert_eq!(leaf.hostname, "00:30:ab:2b:96:29");
        assert_eq!(leaf.parentport, "1/5");
        assert_eq!(leaf.parentportid, "p1");
        assert_eq!(leaf.parenthostname, "sw-s1");
        assert_eq!(leaf.parents[0].id, "s1");
        assert_eq!(leaf.parents[0].slotport, "NA");

        let sw = &result.loo_ne[0];
        assert!(sw.macattack);
        assert_eq!(sw.children.len(), 1);
        assert_eq!(sw.children[0].id, leaf.id);
        assert_eq!(sw.children[0].slotport, "1/5");
        assert_eq!(sw.children[0].portid, "p1");
    }

    #[test]
    fn test_neighbor_ports_only_reach_scratchpad() {
        let session = CrawlSession::new();
        let mut result = single(&[]);
        peanut_gallery(&mut result, &session, None);

        assert_eq!(result.loo_ne.len(), 1);
        assert_eq!(result.loo_scratchpad.len(), 1);
        assert_eq!(result.loo_scratchpad[0].primary_mac(), Some("aa:00:00:00:00:09"));
        assert!(result.loo_ne[0].payload.as_ref().unwrap().ports[1].macattack);
        assert!(!result.loo_ne[0].macattack);
    }

    #[test]
    fn test_down_port_is_skipped() {
        let session = CrawlSession::new();
        let mut result = single(&["00:30:ab:2b:96:29"]);
        payload_mut(&mut result.loo_ne[0]).ports[0].operationalstatus = "down".into();
        peanut_gallery(&mut result, &session, None);
        assert_eq!(result.loo_ne.len(), 1);
        assert_eq!(result.loo_scratchpad.len(), 2);
    }

    #[test]
    fn test_member_and_oui_naming() {
        let session = CrawlSession::new();
        let mut result = single(&["00:30:AB:2B:96:29", "e8:e7:32:00:00:01"]);
        result.loo_members.push(Member {
            hostname: "metro-7".into(),
            mac: "00:30:ab:2b:96:29".into(),
            typestring: "metrocell".into(),
            ..Default::default()
        });
        let db = OuiDatabase::from_lines(vec!["E8-E7-32   (hex)\t\tAlcatel-Lucent Enterprise".to_string()]);
        peanut_gallery(&mut result, &session, Some(&db));

        assert_eq!(result.loo_ne[1].hostname, "metro-7");
        assert_eq!(result.loo_ne[1].typestring, "metrocell");
        assert_eq!(result.loo_ne[2].hostname, "e8:e7:32:00:00:01(Alcatel-Lucent)");
    }

    #[test]
    fn test_duplicate_leaves_collapse() {
        let session = CrawlSession::new();
        let mut result = single(&["00:30:ab:2b:96:29", "00:30:ab:2b:96:29"]);
        peanut_gallery(&mut result, &session, None);
        assert_eq!(result.loo_ne.len(), 2);
        assert_eq!(result.loo_ne[0].children.len(), 2);
    }

    #[test]
    fn test_payloadless_ne_is_marked() {
        let session = CrawlSession::new();
        let mut result = CrawlResult::new("1", vec![]);
        result.loo_ne.push(NetworkElement::new("sar"));
        peanut_gallery(&mut result, &session, None);
        assert!(result.loo_ne[0].macattack);
        assert!(result.loo_scratchpad.is_empty());
    }
}

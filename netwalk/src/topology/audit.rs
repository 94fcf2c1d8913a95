//! Registry consistency: one NE per MAC, and provisional NEs for leaves
//! nothing else accounts for.

use log::debug;

use crate::element::{AssocNe, CrawlResult, NetworkElement, PROVISIONAL_PREFIX, SENTINEL_MAC, dedup_by_mac};

fn fill_missing_macs<'a>(nes: impl Iterator<Item = &'a mut NetworkElement>) {
    for ne in nes.filter(|ne| ne.macs.is_empty()) {
        debug!("NE ID '{}' has no macs, assigning {}", ne.id, SENTINEL_MAC);
        ne.macs.push(SENTINEL_MAC.to_string());
    }
}

/// Deduplicate the registry and reattach scratchpad leaves that no
/// registered NE or port owns.
///
/// Reattached leaves get a `!!-` hostname prefix and are added as children
/// of each of their parents.
pub fn ne_audit(result: &mut CrawlResult) {
    fill_missing_macs(result.loo_ne.iter_mut());
    fill_missing_macs(result.loo_scratchpad.iter_mut());

    let before = result.loo_ne.len();
    result.loo_ne = dedup_by_mac(std::mem::take(&mut result.loo_ne))
        .into_iter()
        .filter(|ne| !ne.removalflag)
        .collect();
    debug!("audit kept {} of {} NEs", result.loo_ne.len(), before);

    let port_macs: Vec<String> = result
        .loo_ne
        .iter()
        .filter_map(|ne| ne.payload.as_ref())
        .flat_map(|p| p.ports.iter().map(|port| port.mac.clone()))
        .filter(|mac| !mac.is_empty())
        .collect();

    for leaf in result.loo_scratchpad.iter_mut() {
        if result.loo_ne.contains(leaf) {
            continue;
        }
        if leaf.primary_mac().is_some_and(|mac| port_macs.iter().any(|p| p == mac)) {
            debug!("scratchpad NE '{}' is a port of a known NE", leaf.hostname);
            leaf.removalflag = true;
        }
    }

    let unidentified: Vec<NetworkElement> = dedup_by_mac(
        result
            .loo_scratchpad
            .iter()
            .filter(|leaf| !leaf.removalflag && !result.loo_ne.contains(leaf))
            .cloned()
            .collect(),
    );
    debug!("audit found {} unidentified NEs", unidentified.len());

    for mut leaf in unidentified {
        for parent in &leaf.parents {
            let Some(ne) = result.find_mut(&parent.id) else {
                debug!("parent '{}' of '{}' is not registered", parent.id, leaf.hostname);
                continue;
            };
            ne.children.push(AssocNe {
                id: leaf.id.clone(),
                typestring: leaf.typestring.clone(),
                hostname: leaf.hostname.clone(),
                portid: leaf.parentportid.clone(),
                slotport: leaf.parentport.clone(),
            });
        }
        leaf.hostname = format!("{}{}", PROVISIONAL_PREFIX, leaf.hostname);
        result.loo_ne.push(leaf);
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::topology::fixtures::{payload_mut, port, switch};

    fn leaf(id: &str, mac: &str, parent: &str) -> NetworkElement {
        NetworkElement {
            typestring: "UNKNOWN".into(),
            hostname: mac.into(),
            macs: vec![mac.into()],
            parentport: "1/9".into(),
            parentportid: "p9".into(),
            parents: vec![AssocNe {
                id: parent.into(),
                portid: "NA".into(),
                slotport: "NA".into(),
                ..Default::default()
            }],
            ..NetworkElement::new(id)
        }
    }

    #[test]
    fn test_registry_is_deduplicated() {
        let mut result = CrawlResult::new("1", vec![]);
        let mut flagged = switch("c", "aa:00:00:00:00:0c", "10.0.0.3", "10.0.0.1");
        flagged.removalflag = true;
        result.loo_ne = vec![
            switch("a", "aa:00:00:00:00:0a", "10.0.0.1", "10.0.0.254"),
            switch("b", "aa:00:00:00:00:0a", "10.0.0.2", "10.0.0.1"),
            flagged,
            NetworkElement::new("d"),
        ];
        ne_audit(&mut result);

        let ids: Vec<&str> = result.loo_ne.iter().map(|ne| ne.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "d"]);
        assert_eq!(result.loo_ne[1].macs, vec![SENTINEL_MAC]);
    }

    #[test]
    fn test_unidentified_leaves_are_reattached() {
        let mut result = CrawlResult::new("1", vec![]);
        let mut sw = switch("s", "aa:00:00:00:00:01", "10.0.0.1", "10.0.0.254");
        let mut own = port("p1", "1/1", &[]);
        own.mac = "aa:00:00:00:00:11".into();
        payload_mut(&mut sw).ports = vec![own];
        result.loo_ne = vec![sw];
        result.loo_scratchpad = vec![
            leaf("7", "dd:00:00:00:00:01", "s"),
            leaf("8", "dd:00:00:00:00:01", "s"),
            leaf("9", "aa:00:00:00:00:11", "s"),
            leaf("10", "aa:00:00:00:00:01", "s"),
            leaf("11", "dd:00:00:00:00:02", "gone"),
        ];
        ne_audit(&mut result);

        assert_eq!(result.loo_ne.len(), 3);
        assert_eq!(result.loo_ne[1].hostname, "!!-dd:00:00:00:00:01");
        assert_eq!(result.loo_ne[2].hostname, "!!-dd:00:00:00:00:02");
        assert!(result.loo_scratchpad[2].removalflag);

        let sw = result.find("s").unwrap();
        assert_eq!(
            sw.children,
            vec![AssocNe {
                id: "7".into(),
                typestring: "UNKNOWN".into(),
                hostname: "dd:00:00:00:00:01".into(),
                portid: "p9".into(),
                slotport: "1/9".into(),
            }]
        );
    }

    #[test]
    fn test_empty_registry() {
        let mut result = CrawlResult::new("1", vec![]);
        ne_audit(&mut result);
        assert!(result.loo_ne.is_empty());
    }
}

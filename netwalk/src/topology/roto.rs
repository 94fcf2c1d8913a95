//! Puts the real root on top of the detected roots.

use log::debug;

use crate::element::{AssocNe, CrawlResult};

const NA: &str = "NA";

/// Promote the NE owning the real root MAC and rewire each root's uplink.
///
/// A root's children on its upstream port either are the real root, which
/// then becomes the root's parent, or are folded into the real root as an
/// extra MAC.
pub fn roto_rooter(result: &mut CrawlResult) {
    let realrootmac = result.realrootmac.clone();
    if !realrootmac.is_empty() {
        let roots: Vec<AssocNe> = result
            .loo_ne
            .iter()
            .filter(|ne| ne.isroot)
            .map(|ne| ne.assoc(NA, NA))
            .collect();
        for ne in result
            .loo_ne
            .iter_mut()
            .filter(|ne| ne.primary_mac() == Some(realrootmac.as_str()))
        {
            debug!("'{}' is the real root", ne.hostname);
            ne.realroot = true;
            ne.parents.clear();
            ne.children.extend(roots.iter().cloned());
        }
    }

    let root_ids: Vec<String> = result
        .loo_ne
        .iter()
        .filter(|ne| ne.isroot && !ne.upstream_slotport.is_empty())
        .map(|ne| ne.id.clone())
        .collect();

    for root_id in root_ids {
        let Some(root) = result.find(&root_id) else {
            continue;
        };
        let upstream = root.upstream_slotport.clone();
        let uplinks: Vec<AssocNe> = root
            .children
            .iter()
            .filter(|child| child.slotport == upstream)
            .cloned()
            .collect();

        for uplink in uplinks {
            let Some(pos) = result.position(&uplink.id) else {
                debug!("uplink '{}' of root '{}' is not registered", uplink.id, root_id);
                continue;
            };
            if result.loo_ne[pos].primary_mac() == Some(realrootmac.as_str()) {
                if let Some(root) = result.find_mut(&root_id) {
                    root.parents.push(uplink);
                }
            } else if result.loo_ne.iter().any(|ne| ne.realroot) {
                let oscar = result.loo_ne.remove(pos);
                debug!("folding '{}' into the real root", oscar.hostname);
                if let (Some(mac), Some(real)) = (
                    oscar.primary_mac(),
                    result.loo_ne.iter_mut().find(|ne| ne.realroot),
                ) {
                    real.macs.push(mac.to_string());
                }
            }
        }

        if let Some(root) = result.find_mut(&root_id) {
            root.children.retain(|child| child.slotport != upstream);
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::session::CrawlSession;
    use crate::topology::family::family_matters;
    use crate::topology::fixtures::{chain, payload_mut};
    use crate::topology::peanut::peanut_gallery;

    #[test]
    fn test_real_root_becomes_parent() {
        let session = CrawlSession::new();
        let mut result = chain();
        family_matters(&mut result);
        peanut_gallery(&mut result, &session, None);
        roto_rooter(&mut result);

        let real = result.loo_ne.iter().find(|ne| ne.realroot).unwrap();
        let real_id = real.id.clone();
        assert_eq!(real.primary_mac(), Some("cc:00:00:00:00:01"));
        assert!(real.parents.is_empty());
        assert_eq!(real.children.len(), 1);
        assert_eq!(real.children[0].id, "r1");
        assert_eq!(real.children[0].slotport, "NA");

        let r = result.find("r1").unwrap();
        assert_eq!(r.parents.len(), 1);
        assert_eq!(r.parents[0].id, real_id);
        assert_eq!(r.parents[0].slotport, "1/1");
        assert_eq!(r.parents[0].portid, "p1");
        let children: Vec<&str> = r.children.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(children, vec!["m1"]);
    }

    #[test]
    fn test_other_uplink_devices_fold_into_real_root() {
        let session = CrawlSession::new();
        let mut result = chain();
        payload_mut(&mut result.loo_ne[0]).ports[0]
            .associatedmacs
            .push(crate::payload::AssociatedMac {
                mac: "ee:00:00:00:00:05".into(),
                ..Default::default()
            });
        family_matters(&mut result);
        peanut_gallery(&mut result, &session, None);
        assert_eq!(result.loo_ne.len(), 5);
        roto_rooter(&mut result);

        assert_eq!(result.loo_ne.len(), 4);
        let real = result.loo_ne.iter().find(|ne| ne.realroot).unwrap();
        assert_eq!(real.macs, vec!["cc:00:00:00:00:01", "ee:00:00:00:00:05"]);
        assert!(result.find("r1").unwrap().children.iter().all(|c| c.slotport != "1/1"));
    }

    #[test]
    fn test_folded_macs_go_to_first_real_root() {
        let session = CrawlSession::new();
        let mut result = chain();
        payload_mut(&mut result.loo_ne[0]).ports[0]
            .associatedmacs
            .push(crate::payload::AssociatedMac {
                mac: "ee:00:00:00:00:05".into(),
                ..Default::default()
            });
        family_matters(&mut result);
        peanut_gallery(&mut result, &session, None);
        let mut twin = result
            .loo_ne
            .iter()
            .find(|ne| ne.primary_mac() == Some("cc:00:00:00:00:01"))
            .unwrap()
            .clone();
        twin.id = "twin".into();
        result.loo_ne.push(twin);
        roto_rooter(&mut result);

        let reals: Vec<_> = result.loo_ne.iter().filter(|ne| ne.realroot).collect();
        assert_eq!(reals.len(), 2);
        assert_eq!(reals[0].macs, vec!["cc:00:00:00:00:01", "ee:00:00:00:00:05"]);
        assert_eq!(reals[1].id, "twin");
        assert_eq!(reals[1].macs, vec!["cc:00:00:00:00:01"]);
    }

    #[test]
    fn test_without_real_root_uplinks_stay() {
        let session = CrawlSession::new();
        let mut result = chain();
        family_matters(&mut result);
        peanut_gallery(&mut result, &session, None);
        result.realrootmac.clear();
        let before = result.loo_ne.len();
        roto_rooter(&mut result);

        assert_eq!(result.loo_ne.len(), before);
        assert!(result.loo_ne.iter().all(|ne| !ne.realroot));
        assert!(result.find("r1").unwrap().parents.is_empty());
    }
}

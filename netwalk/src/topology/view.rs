//! Human readable renderings of the inferred tree.

use log::debug;

use crate::element::{AssocNe, CrawlResult, NetworkElement};
use crate::session::CrawlSession;

const TAB: &str = "----";

/// Deepest indentation level rendered under a root.
const MAX_MAP_DEPTH: usize = 5;

const BANNER_WIDTH: usize = 63;

fn row(ne: &NetworkElement) -> String {
    format!(
        "{:<6} {:<10} {:<40} {:<18} root={} parent={} lowest={}",
        ne.id,
        ne.typestring,
        ne.hostname,
        ne.primary_mac().unwrap_or(""),
        ne.isroot,
        ne.isaparent,
        ne.islowestchild
    )
}

fn header() -> String {
    format!("{:<6} {:<10} {:<40} {:<18} flags", "id", "type", "hostname", "mac")
}

fn dump_flagged(result: &CrawlResult, title: &str, flag: impl Fn(&NetworkElement) -> bool) {
    debug!("{}", title);
    debug!("\t{}", header());
    let mut count = 0;
    for ne in result.loo_ne.iter().filter(|ne| flag(ne)) {
        count += 1;
        debug!("\t{}", row(ne));
    }
    debug!("{} of {} are {}", count, result.loo_ne.len(), title.to_lowercase());
}

/// Dump roots, parents, lowest children and every parent/child pairing to
/// the debug log.
pub fn stats_view(result: &CrawlResult) {
    debug!("--------------------------------");
    debug!("       FAMILY MATTERS           ");
    debug!("--------------------------------");
    dump_flagged(result, "LOWEST CHILDREN", |ne| ne.islowestchild);
    dump_flagged(result, "PARENTS", |ne| ne.isaparent);
    dump_flagged(result, "ROOTS", |ne| ne.isroot);

    debug!("CHILDREN");
    for ne in &result.loo_ne {
        debug!("DIRECT CHILDREN OF '{}'", ne.hostname);
        for child in &ne.children {
            match result.find(&child.id) {
                Some(working) => debug!("\t\t{}", row(working)),
                None => debug!("\t\tchild '{}' is not registered", child.id),
            }
        }
    }

    debug!("\tPARENTAL RELATIONSHIPS");
    for ne in &result.loo_ne {
        debug!("\t\tPARENTS OF {}", ne.hostname);
        for parent in result
            .loo_ne
            .iter()
            .filter(|p| ne.parents.iter().any(|a| a.id == p.id))
        {
            debug!("\t\t{}", row(parent));
        }
    }
}

fn render_children(result: &CrawlResult, children: &[AssocNe], depth: usize, lines: &mut Vec<String>) {
    for child in children {
        lines.push(format!(
            "{}{} :: {} :: {}",
            TAB.repeat(depth),
            child.slotport,
            child.typestring,
            child.hostname
        ));
        if depth < MAX_MAP_DEPTH {
            if let Some(working) = result.find(&child.id) {
                render_children(result, &working.children, depth + 1, lines);
            }
        }
    }
}

/// Render the tree under every root into `result.textmap` and the event log.
pub fn map_view(result: &mut CrawlResult, session: &CrawlSession) {
    let mut lines = vec!["(".repeat(BANNER_WIDTH)];
    for ne in result.loo_ne.iter().filter(|ne| ne.realroot) {
        lines.push(format!("{} :: {} :: {}", ne.id, ne.typestring, ne.hostname));
    }
    for ne in result.loo_ne.iter().filter(|ne| ne.isroot) {
        lines.push(format!("{}{} :: {} :: {}", TAB, ne.id, ne.typestring, ne.hostname));
        render_children(result, &ne.children, 2, &mut lines);
    }
    lines.push("-".repeat(22));
    for kind in ["SCS", "metrocell", "UNKNOWN"] {
        let typestring = if kind == "SCS" { "scs" } else { kind };
        lines.push(format!("Number of {}: {}", kind, result.count_of_type(typestring)));
    }
    lines.push(")".repeat(BANNER_WIDTH));

    for line in &lines {
        session.event("map_view", line.clone());
    }
    result.textmap = lines;
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::topology::fixtures::chain;

    fn child(id: &str, slotport: &str, hostname: &str) -> AssocNe {
        AssocNe {
            id: id.into(),
            typestring: "scs".into(),
            hostname: hostname.into(),
            portid: "p".into(),
            slotport: slotport.into(),
        }
    }

    #[test]
    fn test_map_view_depth_limit() {
        let session = CrawlSession::new();
        let mut result = CrawlResult::new("1", vec![]);
        let mut nes: Vec<NetworkElement> = (0..7)
            .map(|i| NetworkElement {
                typestring: "scs".into(),
                hostname: format!("n{i}"),
                ..NetworkElement::new(format!("n{i}"))
            })
            .collect();
        for i in 0..6 {
            let next = format!("n{}", i + 1);
            nes[i].children.push(child(&next, &format!("1/{}", i + 1), &next));
        }
        nes[0].isroot = true;
        nes[2].children.push(child("ghost", "1/99", "ghost"));
        result.loo_ne = nes;

        map_view(&mut result, &session);
        assert_eq!(
            result.textmap[1..7],
            [
                "----n0 :: scs :: n0",
                "--------1/1 :: scs :: n1",
                "------------1/2 :: scs :: n2",
                "----------------1/3 :: scs :: n3",
                "--------------------1/4 :: scs :: n4",
                "----------------1/99 :: scs :: ghost",
            ]
        );
        assert_eq!(result.textmap[7], "----------------------");
        assert_eq!(result.textmap[8], "Number of SCS: 7");
    }

    #[test]
    fn test_map_view_events() {
        let session = CrawlSession::new();
        let mut result = chain();
        result.loo_ne.iter_mut().for_each(|ne| ne.hostname = ne.hostname.trim_end().to_string());
        result.loo_ne[0].isroot = true;
        map_view(&mut result, &session);

        assert_eq!(result.textmap.len(), 7);
        assert_eq!(result.textmap[0].len(), 63);
        assert_eq!(result.textmap[1], "----r1 :: scs :: sw-r1");
        assert_eq!(session.messages(), result.textmap);
        assert!(session.events().iter().all(|e| e.func == "map_view"));
    }

    #[test]
    fn test_stats_view_tolerates_dangling_links() {
        let mut result = chain();
        result.loo_ne[0].children.push(child("ghost", "1/9", "ghost"));
        stats_view(&result);
    }
}

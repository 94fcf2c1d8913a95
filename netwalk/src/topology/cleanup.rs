//! Last passes over the registry before it is reported.

use log::debug;

use crate::element::CrawlResult;
use crate::oui::OuiDatabase;
use crate::session::CrawlSession;

/// Drop NEs that never got a MAC.
pub fn clean_dupes(result: &mut CrawlResult, session: &CrawlSession) {
    result.loo_ne.retain(|ne| {
        if ne.macs.is_empty() {
            session.event(
                "mod_ne_flag_delete",
                format!("Removing NE with partial data: '{}'...", ne.hostname),
            );
            false
        } else {
            true
        }
    });
}

/// Replace MAC-looking hostnames with `mac(Manufacturer)`.
pub fn oui_converter(result: &mut CrawlResult, oui: Option<&OuiDatabase>) {
    let Some(db) = oui else {
        debug!("no OUI database loaded, hostnames left as they are");
        return;
    };
    for ne in result.loo_ne.iter_mut().filter(|ne| ne.hostname.contains(':')) {
        match db.combo(&ne.hostname) {
            Ok(combo) => ne.hostname = combo,
            Err(e) => debug!("hostname '{}' kept: {}", ne.hostname, e),
        }
    }
}

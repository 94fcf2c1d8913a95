//! Topology inference over a finished crawl.
//!
//! The passes run in a fixed order, each one reading what the previous ones
//! left in the [`CrawlResult`]:
//!
//! 1. [`audit::ne_audit`] deduplicates the registry.
//! 2. [`family::family_matters`] finds roots and links parents to children.
//! 3. [`peanut::peanut_gallery`] turns learned MACs into leaf NEs.
//! 4. [`roto::roto_rooter`] puts the real root on top.
//! 5. [`cleanup::clean_dupes`] and [`cleanup::oui_converter`] tidy up.
//! 6. A second audit reattaches leaves nothing else accounts for.
//! 7. [`view::stats_view`] and [`view::map_view`] render the result.

pub mod audit;
pub mod cleanup;
pub mod family;
pub mod peanut;
pub mod roto;
pub mod view;

#[cfg(test)]
mod fixtures;

use log::debug;

use crate::element::CrawlResult;
use crate::oui::OuiDatabase;
use crate::session::CrawlSession;

/// Run every inference pass over `result`.
pub fn pecking_order(result: &mut CrawlResult, session: &CrawlSession, oui: Option<&OuiDatabase>) {
    debug!("inferring topology over {} NEs", result.loo_ne.len());
    audit::ne_audit(result);
    family::family_matters(result);
    peanut::peanut_gallery(result, session, oui);
    roto::roto_rooter(result);
    cleanup::clean_dupes(result, session);
    cleanup::oui_converter(result, oui);
    audit::ne_audit(result);
    view::stats_view(result);
    view::map_view(result, session);
}

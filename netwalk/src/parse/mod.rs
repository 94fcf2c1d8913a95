//! Turning a discovery transcript into a typed payload.
//!
//! [`segment`] splits the transcript by echoed command, and the
//! per-platform parsers read fields out of each section.

mod field;
pub mod omniswitch;
pub mod segment;

pub use segment::{CommandOutput, Segmentation, segment};

use crate::payload::TypePayload;
use crate::platform::vendors::alu_omniswitch;
use crate::session::CrawlSession;

/// Build the type payload for `typestring`, or `None` when the type has
/// no payload parser.
pub fn build_payload(typestring: &str, seg: &Segmentation, session: &CrawlSession) -> Option<TypePayload> {
    match typestring {
        alu_omniswitch::TYPESTRING => Some(omniswitch::build_payload(typestring, seg, session)),
        _ => None,
    }
}

//! Alcatel-Lucent 7705 SAR ("scr", service aggregation router).
//!
//! Admin prompt ends in `#`, e.g. `A:sar-h-01#`. Only identity is crawled;
//! there is no type payload for this family yet.

use crate::platform::PlatformDefinition;

/// Platform name for the 7705 SAR.
pub const PLATFORM_NAME: &str = "alu_sar";

/// Type tag for SAR NEs.
pub const TYPESTRING: &str = "scr";

/// Create the 7705 SAR platform definition.
pub fn platform() -> Result<PlatformDefinition, regex::Error> {
    Ok(PlatformDefinition::new(PLATFORM_NAME, TYPESTRING)
        .with_type_indicator("7705 SAR-H", "sarh")?
        .with_type_indicator("7705", "")?
        .with_hostname_pattern(r"(?P<indicator>System Name            : )(?P<value>.*)")?
        .with_discovery_commands([
            "show system information",
            "show router arp",
            "show service fdb-mac",
            "show time",
            "show version",
        ]))
}

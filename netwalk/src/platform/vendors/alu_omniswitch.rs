//! Alcatel-Lucent OmniSwitch 6450 ("scs", small cell switch).
//!
//! User-mode prompt is `->`. The primer runs `show system` and
//! `show chassis`; the hostname comes from the system block:
//!
//! ```text
//! System:
//!   Description:  Alcatel-Lucent OS6450-P10 6.7.2.191.R04 GA, May 26, 2017.,
//!   Object ID:    1.3.6.1.4.1.6486.800.1.1.2.1.11.2.4,
//!   Up Time:      41 days 2 hours 10 minutes and 25 seconds,
//!   Contact:      Alcatel-Lucent, http://alcatel-lucent.com/wps/portal/enterprise,
//!   Name:         cell-site-12,
//! ```

use crate::platform::PlatformDefinition;

/// Platform name for the OmniSwitch 6450.
pub const PLATFORM_NAME: &str = "alu_omniswitch";

/// Type tag for OmniSwitch NEs.
pub const TYPESTRING: &str = "scs";

/// Commands of a full discovery pull, in send order.
pub const DISCOVERY_COMMANDS: &[&str] = &[
    "show lanpower 1",
    "show interfaces",
    "show interfaces port",
    "show interfaces status",
    "show hardware info",
    "show microcode",
    "show temperature",
    "show system",
    "show running directory",
    "show ni",
    "show module",
    "show module status",
    "show module long",
    "show fan",
    "show cmm",
    "show chassis",
    "show ip router database",
    "show ip service",
    "show ip interface",
    "show ip http",
    "show ip protocols",
    "show ip route-pref",
    "show dhcp-server statistics",
    "show dhcp-server leases count",
    "show dhcp-server leases",
    "show lldp local-system",
    "show lldp remote-system",
    "show health",
    "show arp",
    "show arp summary",
    "show amap",
    "show spantree",
    "show configuration snapshot",
    "show vlan",
    "show mac-address-table",
    "show mac-address-table aging-time",
    "show udld configuration",
];

/// Create the OmniSwitch platform definition.
pub fn platform() -> Result<PlatformDefinition, regex::Error> {
    Ok(PlatformDefinition::new(PLATFORM_NAME, TYPESTRING)
        .with_type_indicator("Omniswitch", "")?
        .with_type_indicator("Omniswitch 6450", "")?
        .with_type_indicator("OS6450-P10", "p10")?
        .with_type_indicator("6450 10", "p10")?
        .with_type_indicator("OS6450-U24", "u24")?
        .with_type_indicator("OS6450-P24", "p24")?
        .with_type_indicator("6450 24 PORT", "u24")?
        .with_hostname_pattern(r"(?P<indicator>  Name:         )(?P<value>.*)")?
        .with_discovery_commands(DISCOVERY_COMMANDS.iter().copied())
        .with_payload())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_builds() {
        let def = platform().unwrap();
        assert_eq!(def.typestring, "scs");
        assert_eq!(def.type_indicators.len(), 7);
        assert_eq!(def.discovery_commands.len(), 37);
        assert!(def.builds_payload);
        assert_eq!(def.discovery_commands[0], "show lanpower 1");
    }
}

//! Chassis and module inventory: `show chassis`, `show module`,
//! `show module status` and `show module long`.

use once_cell::sync::Lazy;

use crate::parse::field::{Columns, LabeledField, MAC_VALUE, builtin_field, chunk_lines, table_body};
use crate::parse::segment::Segmentation;
use crate::payload::{Chassis, Gbic, Module};
use crate::session::CrawlSession;

pub const SHOW_CHASSIS: &str = "show chassis";
pub const SHOW_MODULE: &str = "show module";
pub const SHOW_MODULE_STATUS: &str = "show module status";
pub const SHOW_MODULE_LONG: &str = "show module long";

const MODULE_TABLE_HEADER: usize = 3;

static MODEL: Lazy<LabeledField> = Lazy::new(|| builtin_field("  Model Name:                    ", ".*"));
static DESCRIPTION: Lazy<LabeledField> =
    Lazy::new(|| builtin_field("  Description:                   ", ".*"));
static ADMIN: Lazy<LabeledField> = Lazy::new(|| builtin_field("  Admin Status:                  ", ".*"));
static OPER: Lazy<LabeledField> = Lazy::new(|| builtin_field("  Operational Status:            ", ".*"));
static MAC: Lazy<LabeledField> = Lazy::new(|| builtin_field("  MAC Address:                   ", MAC_VALUE));
static SERIAL: Lazy<LabeledField> = Lazy::new(|| builtin_field("  Serial Number:                 ", ".*"));

static SLOT_SECTION: Lazy<LabeledField> = Lazy::new(|| builtin_field("in slot", ".*"));
static GBIC: Lazy<LabeledField> = Lazy::new(|| builtin_field("  GBIC  ", ".*"));
static GBIC_MODEL: Lazy<LabeledField> =
    Lazy::new(|| builtin_field("        Model Name:                    ", ".*"));
static GBIC_PART: Lazy<LabeledField> =
    Lazy::new(|| builtin_field("        Part Number:                   ", ".*"));
static GBIC_SERIAL: Lazy<LabeledField> =
    Lazy::new(|| builtin_field("        Serial Number:                 ", ".*"));
static GBIC_ADMIN: Lazy<LabeledField> =
    Lazy::new(|| builtin_field("        Admin Status:                  ", ".*"));
static GBIC_OPER: Lazy<LabeledField> =
    Lazy::new(|| builtin_field("        Operational Status:            ", ".*"));
static GBIC_WAVELENGTH: Lazy<LabeledField> =
    Lazy::new(|| builtin_field("        Laser Wave Length:             ", ".*"));

pub fn parse_chassis(section: &[String]) -> Chassis {
    let mut chassis = Chassis::default();
    for line in section {
        if let Some(v) = MODEL.value(line) {
            chassis.model = v;
        } else if let Some(v) = DESCRIPTION.value(line) {
            chassis.description = v;
        } else if let Some(v) = ADMIN.value(line) {
            chassis.adminstatus = v;
        } else if let Some(v) = OPER.value(line) {
            chassis.operstatus = v;
        } else if let Some(v) = MAC.value(line) {
            chassis.mac = v;
        } else if let Some(v) = SERIAL.value(line) {
            chassis.serial = v;
        }
    }
    chassis
}

/// `show module`: slot and part number.
pub fn parse_module_table(section: &[String]) -> Vec<(String, String)> {
    table_body(section, MODULE_TABLE_HEADER)
        .map(|line| {
            let cols = Columns::new(line);
            (cols.get(0), cols.get(1))
        })
        .collect()
}

/// `show module status`: slot and MAC.
pub fn parse_module_status(section: &[String]) -> Vec<(String, String)> {
    table_body(section, MODULE_TABLE_HEADER)
        .map(|line| {
            let cols = Columns::new(line);
            (cols.get(0), cols.get(5))
        })
        .collect()
}

fn parse_gbic(ident: String, block: &[String]) -> Gbic {
    let mut gbic = Gbic {
        ident,
        ..Default::default()
    };
    for line in block {
        if let Some(v) = GBIC_MODEL.value(line) {
            gbic.modelname = v;
        } else if let Some(v) = GBIC_PART.value(line) {
            gbic.partnumber = v;
        } else if let Some(v) = GBIC_SERIAL.value(line) {
            gbic.serial = v;
        } else if let Some(v) = GBIC_ADMIN.value(line) {
            gbic.adminstatus = v;
        } else if let Some(v) = GBIC_OPER.value(line) {
            gbic.operstatus = v;
        } else if let Some(v) = GBIC_WAVELENGTH.value(line) {
            gbic.laserwavelength = v;
        }
    }
    gbic
}

/// `show module long`: one module per `in slot` block, with GBIC
/// sub-blocks. Module labels are matched over the whole block.
pub fn parse_module_long(section: &[String]) -> Vec<Module> {
    chunk_lines(section, section.len(), |line| SLOT_SECTION.is_match(line))
        .into_iter()
        .map(|(_, block)| {
            let mut module = Module::default();
            for line in block {
                if ADMIN.is_match(line) {
                    continue;
                }
                if let Some(v) = OPER.value(line) {
                    module.status = v;
                } else if let Some(v) = MAC.value(line) {
                    module.mac = v;
                } else if let Some(v) = DESCRIPTION.value(line) {
                    module.description = v;
                }
            }

            let starts: Vec<usize> = block
                .iter()
                .enumerate()
                .filter(|(_, line)| GBIC.is_match(line))
                .map(|(i, _)| i)
                .collect();
            for (n, &start) in starts.iter().enumerate() {
                let stop = starts.get(n + 1).copied().unwrap_or(block.len());
                let ident = GBIC.value(&block[start]).unwrap_or_default();
                module.gbics.push(parse_gbic(ident, &block[start..stop]));
            }
            module
        })
        .collect()
}

/// Modules from `show module long`, with slot taken from the status table
/// by MAC and part number from the module table by slot.
pub fn parse_modules(seg: &Segmentation) -> Vec<Module> {
    let table = parse_module_table(seg.section(SHOW_MODULE));
    let status = parse_module_status(seg.section(SHOW_MODULE_STATUS));
    let mut modules = parse_module_long(seg.section(SHOW_MODULE_LONG));

    for module in modules.iter_mut() {
        if let Some((slot, _)) = status.iter().rev().find(|(_, mac)| *mac == module.mac) {
            module.slot = slot.clone();
        }
        if let Some((_, part)) = table.iter().rev().find(|(slot, _)| *slot == module.slot) {
            module.partnumber = part.clone();
        }
    }
    modules
}

pub fn generate_modules(modules: Vec<Module>, session: &CrawlSession) -> Vec<Module> {
    modules
        .into_iter()
        .map(|module| {
            let id = session.next_uid();
            let gbics = module
                .gbics
                .into_iter()
                .map(|gbic| Gbic {
                    id: session.next_uid(),
                    ..gbic
                })
                .collect();
            Module { id, gbics, ..module }
        })
        .collect()
}

//! MAC manufacturer lookup against an IEEE `oui.txt` style database.
//!
//! Database lines look like
//!
//! ```text
//! 00-00-5E   (hex)		ICANN, IANA Department
//! ```
//!
//! The first line containing the OUI wins and its third tab-separated field
//! is the manufacturer.

use std::fs;
use std::path::Path;

use log::debug;

use crate::error::OuiError;

/// Anything this short cannot be a MAC address.
const MIN_MAC_LEN: usize = 12;

/// Manufacturer names are cut to this many characters in combos.
const COMBO_MANUFACTURER_LEN: usize = 14;

/// A loaded manufacturer database.
#[derive(Debug, Clone, Default)]
pub struct OuiDatabase {
    lines: Vec<String>,
}

impl OuiDatabase {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, OuiError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| OuiError::Database {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("loaded OUI database {}", path.display());
        Ok(Self::from_lines(text.lines().map(str::to_string).collect()))
    }

    pub fn from_lines(lines: Vec<String>) -> Self {
        Self { lines }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sanitized manufacturer for `mac`, or an empty string when the OUI
    /// is not in the database.
    pub fn lookup(&self, mac: &str) -> Result<String, OuiError> {
        let pairs = normalize(mac)?;
        let oui = pairs.iter().take(3).cloned().collect::<Vec<_>>().join("-").to_uppercase();

        let manufacturer = self
            .lines
            .iter()
            .find(|line| line.contains(&oui))
            .and_then(|line| line.split('\t').nth(2))
            .map(|field| field.trim_end_matches(['\n', ' ', '\r']))
            .unwrap_or_default();
        debug!("OUI {} resolves to '{}'", oui, manufacturer);
        Ok(sanitize(manufacturer))
    }

    /// `aa:bb:cc:dd:ee:ff(Manufacturer)`, with the manufacturer cut short.
    pub fn combo(&self, mac: &str) -> Result<String, OuiError> {
        let manufacturer = self.lookup(mac)?;
        let short: String = manufacturer.chars().take(COMBO_MANUFACTURER_LEN).collect();
        Ok(format!("{}({})", normalize(mac)?.join(":"), short))
    }
}

/// Validate `mac` and split it into lowercase hex pairs.
fn normalize(mac: &str) -> Result<Vec<String>, OuiError> {
    if mac.len() < MIN_MAC_LEN {
        return Err(OuiError::TooShort(mac.to_string()));
    }
    if mac.chars().any(|c| c.is_ascii_alphabetic() && !c.is_ascii_hexdigit()) {
        return Err(OuiError::InvalidCharacters(mac.to_string()));
    }

    let digits: Vec<char> = mac
        .chars()
        .filter(|c| !matches!(c, '-' | ':' | '.'))
        .map(|c| c.to_ascii_lowercase())
        .collect();
    Ok(digits.chunks(2).map(|pair| pair.iter().collect()).collect())
}

fn sanitize(manufacturer: &str) -> String {
    manufacturer
        .chars()
        .filter(|c| !matches!(c, '&' | ',' | '.'))
        .map(|c| match c {
            '(' | ')' => '-',
            ' ' => '_',
            other => other,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn database() -> OuiDatabase {
        OuiDatabase::from_lines(vec![
            "OUI/MA-L\t\t\tOrganization".to_string(),
            "00-00-5E   (hex)\t\tICANN, IANA Department".to_string(),
            "E8-E7-32   (hex)\t\tAlcatel-Lucent Enterprise".to_string(),
            "00-E0-B1   (hex)\t\tNokia (Alcatel-Lucent) & Co.".to_string(),
        ])
    }

    #[test]
    fn test_lookup_formats() {
        let db = database();
        assert_eq!(db.lookup("e8:e7:32:a3:06:dc").unwrap(), "Alcatel-Lucent_Enterprise");
        assert_eq!(db.lookup("E8-E7-32-A3-06-DC").unwrap(), "Alcatel-Lucent_Enterprise");
        assert_eq!(db.lookup("e8e7.32a3.06dc").unwrap(), "Alcatel-Lucent_Enterprise");
        assert_eq!(db.lookup("00:e0:b1:00:00:01").unwrap(), "Nokia_-Alcatel-Lucent-__Co");
    }

    #[test]
    fn test_combo() {
        let db = database();
        assert_eq!(
            db.combo("00-00-5E-00-01-02").unwrap(),
            "00:00:5e:00:01:02(ICANN_IANA_Dep)"
        );
    }

    #[test]
    fn test_unknown_oui() {
        let db = database();
        assert_eq!(db.lookup("12:34:56:78:9a:bc").unwrap(), "");
        assert_eq!(db.combo("12:34:56:78:9a:bc").unwrap(), "12:34:56:78:9a:bc()");
    }

    #[test]
    fn test_rejects_non_macs() {
        let db = database();
        assert!(matches!(db.lookup("e8:e7:32"), Err(OuiError::TooShort(_))));
        assert!(matches!(db.lookup("cell-site-12-north"), Err(OuiError::InvalidCharacters(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "E8-E7-32   (hex)\t\tAlcatel-Lucent Enterprise").unwrap();
        let db = OuiDatabase::load(file.path()).unwrap();
        assert_eq!(db.len(), 1);
        assert_eq!(db.lookup("e8:e7:32:a3:06:dc").unwrap(), "Alcatel-Lucent_Enterprise");
    }

    #[test]
    fn test_load_missing_file() {
        let err = OuiDatabase::load("/nonexistent/oui.txt").unwrap_err();
        assert!(matches!(err, OuiError::Database { .. }));
    }
}

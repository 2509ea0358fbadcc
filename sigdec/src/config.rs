use std::path::Path;

use serde::Deserialize;

use crate::{ConfigError, Direction};

/// Decoder preferences, usually loaded from TOML.
///
/// ```
/// let opts = sigdec::DecodeOptions::from_toml_str(
///     r#"
///     [sccp]
///     variant = "ansi"
///
///     [gsm_sms]
///     reassemble = false
///     default_direction = "ms_to_sc"
///     "#,
/// )
/// .unwrap();
/// assert_eq!(opts.sccp.variant, sigdec::SccpVariant::Ansi);
/// assert!(opts.sccp.reassemble);
/// assert!(!opts.gsm_sms.reassemble);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DecodeOptions {
    pub sccp: SccpOptions,
    pub gsm_sms: GsmSmsOptions,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SccpOptions {
    pub variant: SccpVariant,
    /// Reassemble segmented XUDT/XUDTS/LUDT/LUDTS messages.
    pub reassemble: bool,
}

impl Default for SccpOptions {
    fn default() -> Self {
        SccpOptions {
            variant: SccpVariant::default(),
            reassemble: true,
        }
    }
}

/// Which flavour of SCCP addressing is on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SccpVariant {
    /// 14-bit point codes, point code before SSN.
    #[default]
    Itu,
    /// 24-bit point codes, SSN before point code.
    Ansi,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GsmSmsOptions {
    /// Reassemble concatenated short messages.
    pub reassemble: bool,
    /// Direction assumed when the decode context does not carry one.
    pub default_direction: Direction,
}

impl Default for GsmSmsOptions {
    fn default() -> Self {
        GsmSmsOptions {
            reassemble: true,
            default_direction: Direction::Downlink,
        }
    }
}

impl DecodeOptions {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let s = std::fs::read_to_string(path)?;
        Self::from_toml_str(&s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let opts = DecodeOptions::from_toml_str("").unwrap();
        assert_eq!(opts, DecodeOptions::default());
        assert_eq!(opts.sccp.variant, SccpVariant::Itu);
        assert!(opts.sccp.reassemble);
        assert!(opts.gsm_sms.reassemble);
        assert_eq!(opts.gsm_sms.default_direction, Direction::Downlink);
    }

    #[test]
    fn direction_accepts_both_spellings() {
        let tests = [
            ("sc_to_ms", Direction::Downlink),
            ("downlink", Direction::Downlink),
            ("ms_to_sc", Direction::Uplink),
            ("uplink", Direction::Uplink),
        ];
        for (spelling, want) in tests {
            let doc = format!("[gsm_sms]\ndefault_direction = \"{spelling}\"");
            let opts = DecodeOptions::from_toml_str(&doc).unwrap();
            assert_eq!(opts.gsm_sms.default_direction, want);
        }
    }

    #[test]
    fn rejects_unknown_keys_and_values() {
        assert!(DecodeOptions::from_toml_str("[sccp]\nvariant = \"japan\"").is_err());
        assert!(DecodeOptions::from_toml_str("[sccp]\ncolour = true").is_err());
        assert!(DecodeOptions::from_toml_str("[mtp3]\nreassemble = true").is_err());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = DecodeOptions::from_path("/nonexistent/sigdec.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}

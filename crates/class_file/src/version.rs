use crate::{ClassFileError, Result};

/// Oldest major version. Any minor version is accepted with it.
pub const OLDEST_MAJOR_VERSION: u16 = 45;
/// Newest major version accepted by default (Java 8).
pub const DEFAULT_MAX_MAJOR_VERSION: u16 = 52;

/// Knobs for a single [`Parser`](crate::Parser) run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Upper end of the band of major versions accepted with minor version 0.
    pub max_major_version: u16,
    /// Fail with [`ClassFileError::TrailingBytes`] instead of ignoring bytes after the
    /// top level attributes.
    pub reject_trailing_bytes: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_major_version: DEFAULT_MAX_MAJOR_VERSION,
            reject_trailing_bytes: false,
        }
    }
}

impl ParseOptions {
    pub fn check_version(&self, major: u16, minor: u16) -> Result<()> {
        match major {
            OLDEST_MAJOR_VERSION => Ok(()),
            m if m > OLDEST_MAJOR_VERSION && m <= self.max_major_version && minor == 0 => Ok(()),
            _ => Err(ClassFileError::UnsupportedVersion { major, minor }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oldest_major_accepts_any_minor() {
        let options = ParseOptions::default();
        assert!(options.check_version(45, 0).is_ok());
        assert!(options.check_version(45, 3).is_ok());
        assert!(options.check_version(45, u16::MAX).is_ok());
    }

    #[test]
    fn newer_majors_need_minor_zero() {
        let options = ParseOptions::default();
        assert!(options.check_version(46, 0).is_ok());
        assert!(options.check_version(52, 0).is_ok());
        assert_eq!(
            Err(ClassFileError::UnsupportedVersion {
                major: 52,
                minor: 3
            }),
            options.check_version(52, 3)
        );
    }

    #[test]
    fn outside_the_band_is_rejected() {
        let options = ParseOptions::default();
        assert!(options.check_version(44, 0).is_err());
        assert!(options.check_version(53, 0).is_err());

        let options = ParseOptions {
            max_major_version: 61,
            ..Default::default()
        };
        assert!(options.check_version(61, 0).is_ok());
        assert!(options.check_version(62, 0).is_err());
    }
}

//! Serial device resolution
//!
//! The door board shows up as a USB CDC device whose name depends on plug
//! order, so the path is resolved again for every door sequence.

use eltis_core::{DeviceConfig, EltisError, Result};
use std::sync::Arc;
use tracing::debug;

/// Source of candidate device paths
///
/// Implemented for [`FixedDevice`], [`GlobDevice`] and for any
/// `Fn() -> Result<Vec<String>>` closure, which lets tests inject a fixed list
/// without touching the filesystem.
pub trait DeviceResolver: Send + Sync {
    /// List every device path that could be the board
    fn candidates(&self) -> Result<Vec<String>>;

    /// Pick the device to use: the lexicographically first candidate.
    ///
    /// Note that ordering is by string, so `ttyACM10` sorts before `ttyACM2`.
    fn resolve(&self) -> Result<String> {
        let mut candidates = self.candidates()?;
        candidates.sort();
        candidates.into_iter().next().ok_or(EltisError::DeviceNotFound)
    }
}

impl<F> DeviceResolver for F
where
    F: Fn() -> Result<Vec<String>> + Send + Sync,
{
    fn candidates(&self) -> Result<Vec<String>> {
        self()
    }
}

/// Explicitly configured device path, used verbatim
#[derive(Debug, Clone)]
pub struct FixedDevice {
    path: String,
}

impl FixedDevice {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

impl DeviceResolver for FixedDevice {
    fn candidates(&self) -> Result<Vec<String>> {
        Ok(vec![self.path.clone()])
    }
}

/// Discover the device by scanning a filesystem glob such as `/dev/ttyACM*`
#[derive(Debug, Clone)]
pub struct GlobDevice {
    pattern: String,
}

impl GlobDevice {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

impl DeviceResolver for GlobDevice {
    fn candidates(&self) -> Result<Vec<String>> {
        debug!("Searching for device interface: {}", self.pattern);

        let entries = glob::glob(&self.pattern).map_err(|e| {
            EltisError::Config(format!(
                "Invalid device pattern '{}': {}",
                self.pattern, e
            ))
        })?;

        let mut found = Vec::new();
        for entry in entries {
            match entry {
                Ok(path) => {
                    debug!("  Candidate: {}", path.display());
                    found.push(path.to_string_lossy().into_owned());
                }
                Err(e) => debug!("  Skipping unreadable entry: {}", e),
            }
        }

        Ok(found)
    }
}

/// Build the resolver described by the device configuration.
///
/// An explicit path takes precedence over the discovery pattern.
pub fn resolver_for(config: &DeviceConfig) -> Arc<dyn DeviceResolver> {
    match &config.path {
        Some(path) => Arc::new(FixedDevice::new(path.clone())),
        None => Arc::new(GlobDevice::new(config.pattern.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    #[test]
    fn test_fixed_device_is_verbatim() {
        let resolver = FixedDevice::new("/dev/does-not-exist");
        assert_eq!(resolver.resolve().unwrap(), "/dev/does-not-exist");
    }

    #[test]
    fn test_closure_resolver_picks_first_sorted() {
        let resolver = || -> Result<Vec<String>> {
            Ok(vec![
                "/dev/ttyACM1".to_string(),
                "/dev/ttyACM0".to_string(),
                "/dev/ttyACM2".to_string(),
            ])
        };
        assert_eq!(resolver.resolve().unwrap(), "/dev/ttyACM0");
    }

    #[test]
    fn test_empty_candidates_is_device_not_found() {
        let resolver = || -> Result<Vec<String>> { Ok(Vec::new()) };
        assert!(matches!(resolver.resolve(), Err(EltisError::DeviceNotFound)));
    }

    #[test]
    fn test_candidate_error_propagates() {
        let resolver =
            || -> Result<Vec<String>> { Err(EltisError::Config("scan failed".to_string())) };
        assert!(matches!(resolver.resolve(), Err(EltisError::Config(_))));
    }

    #[test]
    fn test_glob_device_scans_directory() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["ttyACM1", "ttyACM0", "ttyUSB0"] {
            File::create(dir.path().join(name)).unwrap();
        }

        let pattern = format!("{}/ttyACM*", dir.path().display());
        let resolver = GlobDevice::new(pattern);

        let mut candidates = resolver.candidates().unwrap();
        candidates.sort();
        assert_eq!(candidates.len(), 2);

        let resolved = resolver.resolve().unwrap();
        assert!(resolved.ends_with("ttyACM0"));
    }

    #[test]
    fn test_glob_device_no_match() {
        let dir = tempfile::tempdir().unwrap();
        let pattern = format!("{}/ttyACM*", dir.path().display());

        let result = GlobDevice::new(pattern).resolve();
        assert!(matches!(result, Err(EltisError::DeviceNotFound)));
    }

    #[test]
    fn test_glob_device_invalid_pattern() {
        let result = GlobDevice::new("/dev/tty[").candidates();
        assert!(matches!(result, Err(EltisError::Config(_))));
    }

    #[test]
    fn test_resolver_for_prefers_explicit_path() {
        let config = DeviceConfig {
            path: Some("/dev/ttyS9".to_string()),
            ..Default::default()
        };
        assert_eq!(resolver_for(&config).resolve().unwrap(), "/dev/ttyS9");
    }

    #[test]
    fn test_resolver_for_uses_pattern() {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("ttyACM3")).unwrap();

        let config = DeviceConfig {
            pattern: format!("{}/ttyACM*", dir.path().display()),
            ..Default::default()
        };
        assert!(resolver_for(&config)
            .resolve()
            .unwrap()
            .ends_with("ttyACM3"));
    }
}

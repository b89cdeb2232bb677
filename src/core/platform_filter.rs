//! User selection of target platforms.
//!
//! OS and architecture filters narrow the version-appropriate platform set;
//! explicit OS/arch pairs then override them. Any entry prefixed with `!`
//! is an exclusion. Precedence, lowest to highest:
//!
//! 1. defaults, or every platform matching the positive OS/arch filters;
//!    nothing when only positive pairs are given
//! 2. negated OS/arch filters
//! 3. positive OS/arch pairs
//! 4. negated OS/arch pairs

use std::collections::HashSet;

use super::platform::Platform;

const NEGATION: char = '!';

/// An explicit `os/arch` pair filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairFilter {
    pub platform: Platform,
    pub negated: bool,
}

/// Include/exclude filters over OS, architecture and OS/arch pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlatformFilter {
    include_os: HashSet<String>,
    ignore_os: HashSet<String>,
    include_arch: HashSet<String>,
    ignore_arch: HashSet<String>,
    pairs: Vec<PairFilter>,
}

impl PlatformFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add space separated OS values (`"linux !windows"`).
    pub fn add_os(&mut self, list: &str) {
        for value in list.split_whitespace() {
            match split_negation(value) {
                (true, os) if !os.is_empty() => self.ignore_os.insert(os.to_string()),
                (false, os) => self.include_os.insert(os.to_string()),
                _ => false,
            };
        }
    }

    /// Add space separated architecture values (`"amd64 !386"`).
    pub fn add_arch(&mut self, list: &str) {
        for value in list.split_whitespace() {
            match split_negation(value) {
                (true, arch) if !arch.is_empty() => self.ignore_arch.insert(arch.to_string()),
                (false, arch) => self.include_arch.insert(arch.to_string()),
                _ => false,
            };
        }
    }

    /// Add space separated OS/arch pairs (`"linux/arm !darwin/386"`).
    pub fn add_osarch(&mut self, list: &str) -> Result<(), String> {
        for value in list.split_whitespace() {
            let (negated, pair) = split_negation(value);
            let platform: Platform = pair.parse()?;
            self.pairs.push(PairFilter { platform, negated });
        }
        Ok(())
    }

    /// Whether no filters were given at all.
    pub fn is_empty(&self) -> bool {
        self.include_os.is_empty()
            && self.ignore_os.is_empty()
            && self.include_arch.is_empty()
            && self.ignore_arch.is_empty()
            && self.pairs.is_empty()
    }

    /// Resolve the filters against the platforms a release supports.
    ///
    /// The result keeps the order of `supported`. An empty result is the
    /// caller's problem to report.
    pub fn select(&self, supported: &[Platform]) -> Vec<Platform> {
        let positive_filters = !self.include_os.is_empty() || !self.include_arch.is_empty();
        let os_arch_filters = positive_filters
            || !self.ignore_os.is_empty()
            || !self.ignore_arch.is_empty();
        let pairs_only = !os_arch_filters && self.pairs.iter().any(|f| !f.negated);

        let mut selected: Vec<bool> = supported
            .iter()
            .map(|p| {
                if pairs_only || (!positive_filters && !p.default) {
                    return false;
                }
                if self.ignore_os.contains(&p.os) || self.ignore_arch.contains(&p.arch) {
                    return false;
                }
                if !self.include_os.is_empty() && !self.include_os.contains(&p.os) {
                    return false;
                }
                if !self.include_arch.is_empty() && !self.include_arch.contains(&p.arch) {
                    return false;
                }
                true
            })
            .collect();

        for pair in self.pairs.iter().filter(|f| !f.negated) {
            match supported.iter().position(|p| p.same_target(&pair.platform)) {
                Some(index) => selected[index] = true,
                None => tracing::warn!(
                    "Ignoring {}: not a supported platform for this Go version",
                    pair.platform
                ),
            }
        }

        for pair in self.pairs.iter().filter(|f| f.negated) {
            if let Some(index) = supported.iter().position(|p| p.same_target(&pair.platform)) {
                selected[index] = false;
            }
        }

        supported
            .iter()
            .zip(selected)
            .filter_map(|(p, keep)| keep.then(|| p.clone()))
            .collect()
    }
}

fn split_negation(value: &str) -> (bool, &str) {
    match value.strip_prefix(NEGATION) {
        Some(rest) => (true, rest),
        None => (false, value),
    }
}

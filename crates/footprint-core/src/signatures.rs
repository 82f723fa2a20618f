use std::sync::LazyLock;

use regex::Regex;

#[derive(Debug)]
enum VersionRule {
    Unknown,
    Fixed(&'static str),
    Captured(Regex),
}

#[derive(Debug)]
pub struct Signature {
    tokens: &'static [&'static str],
    excludes: &'static [&'static str],
    name: &'static str,
    version: VersionRule,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureMatch {
    pub name: &'static str,
    pub version: Option<String>,
}

impl Signature {
    fn bare(tokens: &'static [&'static str], name: &'static str) -> Self {
        Self {
            tokens,
            excludes: &[],
            name,
            version: VersionRule::Unknown,
        }
    }

    fn fixed(tokens: &'static [&'static str], name: &'static str, version: &'static str) -> Self {
        Self {
            tokens,
            excludes: &[],
            name,
            version: VersionRule::Fixed(version),
        }
    }

    fn captured(tokens: &'static [&'static str], name: &'static str, pattern: &str) -> Self {
        Self {
            tokens,
            excludes: &[],
            name,
            version: Regex::new(pattern)
                .map(VersionRule::Captured)
                .unwrap_or(VersionRule::Unknown),
        }
    }

    fn excluding(mut self, excludes: &'static [&'static str]) -> Self {
        self.excludes = excludes;
        self
    }

    fn matches(&self, ua: &str) -> bool {
        self.tokens.iter().any(|token| ua.contains(token))
            && !self.excludes.iter().any(|token| ua.contains(token))
    }

    fn version_in(&self, ua: &str) -> Option<String> {
        match &self.version {
            VersionRule::Unknown => None,
            VersionRule::Fixed(version) => Some((*version).to_string()),
            VersionRule::Captured(re) => re
                .captures(ua)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().replace('_', ".")),
        }
    }
}

// Order matters: iOS identifiers carry "like Mac OS X" and Android ones carry
// "Linux", so the specific rows sit above the generic ones.
pub static OS_SIGNATURES: LazyLock<Vec<Signature>> = LazyLock::new(|| {
    vec![
        Signature::fixed(&["Windows NT 10.0"], "Windows", "10/11"),
        Signature::fixed(&["Windows NT 6.3"], "Windows", "8.1"),
        Signature::fixed(&["Windows NT 6.2"], "Windows", "8"),
        Signature::fixed(&["Windows NT 6.1"], "Windows", "7"),
        Signature::captured(&["iPad"], "iPadOS", r"OS ([\d_]+)"),
        Signature::captured(&["iPhone"], "iOS", r"OS ([\d_]+)"),
        Signature::captured(&["Mac OS X"], "macOS", r"Mac OS X ([\d_]+)"),
        Signature::captured(&["Android"], "Android", r"Android ([\d.]+)"),
        Signature::bare(&["CrOS"], "Chrome OS"),
        Signature::bare(&["Linux"], "Linux"),
    ]
});

// Edge advertises Chrome/ and Safari/, Chrome advertises Safari/.
pub static BROWSER_SIGNATURES: LazyLock<Vec<Signature>> = LazyLock::new(|| {
    vec![
        Signature::captured(&["Edg/"], "Edge", r"Edg/([\d.]+)"),
        Signature::captured(&["Chrome/"], "Chrome", r"Chrome/([\d.]+)").excluding(&["Edg/"]),
        Signature::captured(&["Firefox/"], "Firefox", r"Firefox/([\d.]+)"),
        Signature::captured(&["Safari/"], "Safari", r"Version/([\d.]+)").excluding(&["Chrome/"]),
    ]
});

static TABLET_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)ipad|tablet|playbook|silk").ok());

static MOBILE_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)mobile|android|iphone|ipod|blackberry|iemobile|opera mini").ok()
});

pub fn first_match(table: &[Signature], ua: &str) -> Option<SignatureMatch> {
    table.iter().find(|sig| sig.matches(ua)).map(|sig| SignatureMatch {
        name: sig.name,
        version: sig.version_in(ua),
    })
}

pub fn looks_like_tablet(ua: &str) -> bool {
    TABLET_PATTERN.as_ref().is_some_and(|re| re.is_match(ua))
}

pub fn looks_like_mobile(ua: &str) -> bool {
    MOBILE_PATTERN.as_ref().is_some_and(|re| re.is_match(ua))
}

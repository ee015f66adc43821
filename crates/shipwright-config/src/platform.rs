//! Target platforms and their symbol groups

use serde::{Deserialize, Serialize};

/// Target platform a profile builds for
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Platform {
    /// 32-bit Windows standalone player
    Windows,
    /// 64-bit Windows standalone player (default)
    Windows64,
    /// 64-bit Linux standalone player
    Linux64,
    /// macOS standalone application bundle
    MacOs,
    /// Android package
    Android,
    /// iOS project export
    Ios,
    /// WebGL export
    WebGl,
    /// Any other platform identifier; has no symbol group
    Other(String),
}

impl Platform {
    /// Parse a platform identifier (case-insensitive)
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "windows" => Self::Windows,
            "windows64" => Self::Windows64,
            "linux64" => Self::Linux64,
            "macos" => Self::MacOs,
            "android" => Self::Android,
            "ios" => Self::Ios,
            "webgl" => Self::WebGl,
            _ => Self::Other(s.trim().to_string()),
        }
    }

    /// Platform identifier
    pub fn name(&self) -> &str {
        match self {
            Self::Windows => "windows",
            Self::Windows64 => "windows64",
            Self::Linux64 => "linux64",
            Self::MacOs => "macos",
            Self::Android => "android",
            Self::Ios => "ios",
            Self::WebGl => "webgl",
            Self::Other(name) => name,
        }
    }

    /// Symbol group addressed by this platform, if any
    pub fn symbol_group(&self) -> Option<SymbolGroup> {
        match self {
            Self::Windows | Self::Windows64 | Self::Linux64 | Self::MacOs => {
                Some(SymbolGroup::Standalone)
            }
            Self::Android => Some(SymbolGroup::Android),
            Self::Ios => Some(SymbolGroup::Ios),
            Self::WebGl => Some(SymbolGroup::WebGl),
            Self::Other(_) => None,
        }
    }

    /// Whether the compile step writes into the build directory itself rather
    /// than to an executable inside it
    pub fn exports_directory(&self) -> bool {
        matches!(self, Self::Ios | Self::WebGl)
    }

    /// File name of the produced executable for a product name
    pub fn executable_file_name(&self, product: &str) -> String {
        match self {
            Self::Windows | Self::Windows64 => format!("{}.exe", product),
            Self::MacOs => format!("{}.app", product),
            Self::Android => format!("{}.apk", product),
            _ => product.to_string(),
        }
    }
}

#[allow(clippy::derivable_impls)]
impl Default for Platform {
    fn default() -> Self {
        Self::Windows64
    }
}

impl From<String> for Platform {
    fn from(value: String) -> Self {
        Self::from_str(&value)
    }
}

impl From<Platform> for String {
    fn from(value: Platform) -> Self {
        value.name().to_string()
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Group of platforms that share one compile-time symbol list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SymbolGroup {
    Standalone,
    Android,
    Ios,
    WebGl,
}

impl SymbolGroup {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Standalone => "standalone",
            Self::Android => "android",
            Self::Ios => "ios",
            Self::WebGl => "webgl",
        }
    }
}

impl std::fmt::Display for SymbolGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

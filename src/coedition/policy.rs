//! Co-edition policy: the tunable parameters of graph construction.
//!
//! All parameters are discrete (no floats), so `params_hash` is computed
//! over canonical JSON directly.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::fingerprint::fingerprint_hex;
use crate::DEFAULT_POLICY_VERSION;

// Extension catalogs by development activity, lowercased, leading dot.
const MECHANICAL_CAD: &[&str] = &[
    ".123dx", ".3dm", ".art", ".blend", ".blend1", ".crv", ".dft", ".dra", ".dwf", ".dwg",
    ".easm", ".epf", ".fcmacro", ".fcstd", ".fcstd1", ".gcode", ".iam", ".idw", ".iges", ".igs",
    ".ipj", ".ipn", ".ipt", ".makerbot", ".mb", ".nc", ".obj", ".par", ".psm", ".scad", ".skp",
    ".sldasm", ".slddrw", ".sldprt", ".step", ".stl", ".stp", ".thing", ".vert", ".x_t", ".x3g",
];
const ELECTRONIC_CAD: &[&str] = &[
    ".brd", ".drl", ".dsn", ".fzz", ".gbl", ".gbo", ".gbp", ".gbr", ".gbs", ".gml", ".gpi",
    ".gtl", ".gto", ".gtp", ".gts", ".kicad_mod", ".kicad_pcb", ".kicad_pcb-bak", ".pcb", ".pde",
    ".sch",
];
const IMAGES: &[&str] = &[
    ".ai", ".bmp", ".cdr", ".dxf", ".eps", ".gif", ".ico", ".jpeg", ".jpg", ".png", ".psd",
    ".svg", ".tiff", ".xcf", ".xmp",
];
const DOCUMENTS: &[&str] = &[
    ".csv", ".docx", ".gdoc", ".htm", ".html", ".markdown", ".md", ".ods", ".odt", ".pdf",
    ".rtf", ".shtml", ".txt", ".xls", ".xlsx", ".1",
];
const SOFTWARE: &[&str] = &[
    ".bat", ".bin", ".pro", ".c", ".cc", ".cgi", ".class", ".cmp", ".cpp", ".cs", ".csproj",
    ".css", ".d", ".dll", ".do", ".exe", ".go", ".h", ".hex", ".hpp", ".inc", ".ino", ".jar",
    ".java", ".jnilib", ".js", ".lib", ".m", ".mk", ".o", ".pbxproj", ".php", ".pl",
    ".properties", ".py", ".pyc", ".qml", ".r", ".resources", ".resx", ".sh", ".sln", ".so",
    ".vb", ".xib",
];
const DATA: &[&str] = &[
    ".dat", ".json", ".xml", ".ini", ".yml", ".config", ".conf", ".log", ".wav", ".err",
    ".settings", ".ipynb", ".plist", ".xlf", ".zip", ".7z",
];

/// A case-insensitive allow-list of file extensions.
///
/// Changes whose extension is not in the set are skipped by the builders
/// and tallied per extension in the run statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionFilter {
    extensions: BTreeSet<String>,
}

impl ExtensionFilter {
    /// Create a filter from extensions in `.ext` form (case-insensitive).
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            extensions: extensions
                .into_iter()
                .map(|extension| extension.into().to_lowercase())
                .collect(),
        }
    }

    /// The extension of a path in filter form: the final dot suffix of the
    /// basename, lowercased. Dotless names and dotfiles yield "".
    pub fn extension_of(path: &str) -> String {
        let base = crate::lineage::basename(path);
        match base.rfind('.') {
            Some(position) if position > 0 => base[position..].to_lowercase(),
            _ => String::new(),
        }
    }

    /// Whether a path passes the filter.
    pub fn allows(&self, path: &str) -> bool {
        self.extensions.contains(&Self::extension_of(path))
    }

    /// The allowed extensions.
    pub fn extensions(&self) -> &BTreeSet<String> {
        &self.extensions
    }

    /// Merge two filters into one allowing either's extensions.
    pub fn union(mut self, other: Self) -> Self {
        self.extensions.extend(other.extensions);
        self
    }

    /// Mechanical CAD formats (part, assembly, print, toolpath files).
    pub fn mechanical_cad() -> Self {
        Self::new(MECHANICAL_CAD.iter().copied())
    }

    /// Electronic CAD formats (board, schematic, gerber files).
    pub fn electronic_cad() -> Self {
        Self::new(ELECTRONIC_CAD.iter().copied())
    }

    /// Raster and vector image formats.
    pub fn images() -> Self {
        Self::new(IMAGES.iter().copied())
    }

    /// Document formats.
    pub fn documents() -> Self {
        Self::new(DOCUMENTS.iter().copied())
    }

    /// Source code and build artifacts.
    pub fn software() -> Self {
        Self::new(SOFTWARE.iter().copied())
    }

    /// Structured data and configuration formats.
    pub fn data() -> Self {
        Self::new(DATA.iter().copied())
    }

    /// Formats probably involved in hardware development: CAD plus the
    /// images and documents that typically accompany it.
    pub fn hardware_probable() -> Self {
        Self::mechanical_cad()
            .union(Self::electronic_cad())
            .union(Self::images())
            .union(Self::documents())
    }

    /// Formats certainly involved in hardware development: CAD only.
    pub fn hardware_certain() -> Self {
        Self::mechanical_cad().union(Self::electronic_cad())
    }
}

/// Configuration for co-edition graph construction.
///
/// ## Parameters
///
/// - `count_self_edges`: whether editing one's own previous work counts
/// - `credit_committer`: whether a predecessor's committer earns an edge
///   when distinct from its author
/// - `extension_filter`: restrict counted changes by file extension
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoEditionPolicy {
    /// Policy version identifier.
    pub version: String,
    /// Whether an identity editing its own previous work counts as an edge.
    pub count_self_edges: bool,
    /// Whether a predecessor's committer earns an edge when distinct from
    /// its author.
    pub credit_committer: bool,
    /// Restrict counted changes to these extensions; `None` counts all.
    pub extension_filter: Option<ExtensionFilter>,
}

impl CoEditionPolicy {
    /// The policy identifier.
    pub fn policy_id(&self) -> &str {
        &self.version
    }

    /// Deterministic hash of the policy parameters.
    pub fn params_hash(&self) -> String {
        fingerprint_hex(self)
    }

    /// Restrict this policy to the given extension filter.
    pub fn with_filter(mut self, filter: ExtensionFilter) -> Self {
        self.extension_filter = Some(filter);
        self
    }
}

impl Default for CoEditionPolicy {
    fn default() -> Self {
        Self {
            version: DEFAULT_POLICY_VERSION.to_string(),
            count_self_edges: true,
            credit_committer: true,
            extension_filter: None,
        }
    }
}

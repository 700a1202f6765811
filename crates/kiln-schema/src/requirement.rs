//! Build-requirement string parsing.
//!
//! Package definitions list build requirements the way packagers write them,
//! version constraints included (`libtwo-devel >= 3.5`) and sometimes several
//! per line (`libone-devel = 3, libtwo-devel`). Only the artifact names take
//! part in dependency matching, so constraints are recognised and dropped.

use regex::Regex;
use std::sync::LazyLock;

/// One requirement: a name, optionally followed by a comparison operator and
/// a version token.
static REQUIREMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?P<name>[^\s,<>=]+)(?:\s*(?:<=|>=|==|<|>|=)\s*[^\s,]+)?")
        .expect("requirement pattern is valid")
});

/// Extract artifact names from a build-requirement string.
///
/// Names are returned in order of appearance. Version constraints are
/// discarded without being interpreted.
///
/// # Example
///
/// ```
/// use kiln_schema::parse_requirements;
///
/// assert_eq!(
///     parse_requirements("libone-devel = 3, libtwo-devel"),
///     vec!["libone-devel", "libtwo-devel"]
/// );
/// ```
pub fn parse_requirements(input: &str) -> Vec<String> {
    REQUIREMENT_RE
        .captures_iter(input)
        .filter_map(|caps| caps.name("name"))
        .map(|m| m.as_str().to_string())
        .collect()
}

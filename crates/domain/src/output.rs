//! Parsing of the control utility's textual output.
//!
//! `chip-tool` writes coloured, timestamped trace lines. Everything here is a
//! pure function over `&str`; failing to find something is reported as
//! `None`, never as an error.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

/// CSI-style escape: ESC, one byte in `@`..`_`, parameter bytes, intermediate
/// bytes, one final byte.
static ANSI_ESCAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x1B[@-_][0-?]*[ -/]*[@-~]").expect("valid ANSI regex"));

static PRODUCT_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"ProductName.*?:[ \t]*(.*)").expect("valid product-name regex"));

static CODE_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^0x[0-9A-Fa-f]+\s*=\s*").expect("valid code-prefix regex"));

/// Remove every ANSI escape sequence, keeping all other text verbatim.
#[must_use]
pub fn sanitize(text: &str) -> Cow<'_, str> {
    ANSI_ESCAPE.replace_all(text, "")
}

/// Find the advertised product name in the output of a
/// `basicinformation read product-name` invocation.
///
/// The first line containing `ProductName …: value` wins. A leading
/// `0x…=` code is dropped; a quoted value is unwrapped and a trailing quoted
/// annotation after a bare value is discarded. Returns `None` when no such
/// line exists or the value is blank.
#[must_use]
pub fn extract_product_name(output: &str) -> Option<String> {
    let clean = sanitize(output);
    let raw = PRODUCT_NAME.captures(&clean)?.get(1)?.as_str().trim();
    let value = CODE_PREFIX.replace(raw, "");
    let value = value.trim();

    let unquoted = match value.strip_prefix('"') {
        Some(rest) => rest.split('"').next().unwrap_or_default(),
        None => value.split('"').next().unwrap_or_default(),
    };

    let name = unquoted.trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

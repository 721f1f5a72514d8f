//! XML name utilities
//!
//! Validation and decomposition of NCNames, QNames and extended qualified
//! names (`{namespace}local`), plus the shell-wildcard matching used for
//! template name expansion.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Error, Result};

/// The XSD 1.0 namespace
pub const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

static NCNAME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Z_a-z\u{C0}-\u{D6}\u{D8}-\u{F6}][A-Z_a-z\u{C0}-\u{D6}\u{D8}-\u{F6}\-\.0-9]*$")
        .unwrap()
});

static QNAME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:[A-Z_a-z\u{C0}-\u{D6}\u{D8}-\u{F6}][A-Z_a-z\u{C0}-\u{D6}\u{D8}-\u{F6}\-\.0-9]*:)?[A-Z_a-z\u{C0}-\u{D6}\u{D8}-\u{F6}][A-Z_a-z\u{C0}-\u{D6}\u{D8}-\u{F6}\-\.0-9]*$",
    )
    .unwrap()
});

/// Check if a string is a valid NCName (non-colonized name)
pub fn is_valid_ncname(name: &str) -> bool {
    NCNAME_PATTERN.is_match(name)
}

/// Check if a string is a valid QName (`prefix:local` or `local`)
pub fn is_valid_qname(name: &str) -> bool {
    QNAME_PATTERN.is_match(name)
}

/// Validate an NCName and return an error if invalid
pub fn validate_ncname(name: &str) -> Result<()> {
    if is_valid_ncname(name) {
        Ok(())
    } else {
        Err(Error::Name(format!("Invalid NCName: '{}'", name)))
    }
}

/// Build the extended qualified name of an XSD builtin (`{xsd-namespace}local`)
pub fn xsd_qname(local: &str) -> String {
    format!("{{{}}}{}", XSD_NAMESPACE, local)
}

/// Build an extended qualified name from an optional namespace and a local name
pub fn extended_qname(namespace: Option<&str>, local: &str) -> String {
    match namespace {
        Some(ns) if !ns.is_empty() => format!("{{{}}}{}", ns, local),
        _ => local.to_string(),
    }
}

/// Extract the local part of an extended qualified name or prefixed QName.
///
/// Returns `None` for malformed names (an unterminated `{...}` part or an
/// invalid prefix).
pub fn local_part(name: &str) -> Option<&str> {
    if let Some(rest) = name.strip_prefix('{') {
        rest.split_once('}').map(|(_, local)| local)
    } else if let Some((prefix, local)) = name.split_once(':') {
        if is_valid_ncname(prefix) {
            Some(local)
        } else {
            None
        }
    } else {
        Some(name)
    }
}

/// Extract the namespace part of an extended qualified name.
///
/// Returns the empty string for unqualified names and `None` for malformed
/// ones.
pub fn namespace_part(name: &str) -> Option<&str> {
    if let Some(rest) = name.strip_prefix('{') {
        rest.split_once('}').map(|(ns, _)| ns)
    } else {
        Some("")
    }
}

/// Check if a template name contains shell-style wildcard characters
pub fn is_shell_wildcard(name: &str) -> bool {
    name.contains(['*', '?', '['])
}

/// Match a name against a shell-style wildcard pattern (fnmatch semantics:
/// `*` any run, `?` any single character, `[seq]`/`[!seq]` character classes).
pub fn wildcard_match(pattern: &str, name: &str) -> bool {
    let mut regex = String::with_capacity(pattern.len() + 8);
    regex.push('^');
    let mut chars = pattern.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '*' => regex.push_str(".*"),
            '?' => regex.push('.'),
            '[' => {
                let mut class = String::new();
                let mut closed = false;
                if chars.peek() == Some(&'!') {
                    chars.next();
                    class.push('^');
                }
                for c in chars.by_ref() {
                    if c == ']' {
                        closed = true;
                        break;
                    }
                    if c == '\\' {
                        class.push('\\');
                    }
                    class.push(c);
                }
                if closed && !class.is_empty() && class != "^" {
                    regex.push('[');
                    regex.push_str(&class);
                    regex.push(']');
                } else {
                    // Unterminated or empty class matches a literal bracket
                    regex.push_str(&regex::escape("["));
                    regex.push_str(&regex::escape(&class.replace('^', "!")));
                    if closed {
                        regex.push_str(&regex::escape("]"));
                    }
                }
            }
            other => regex.push_str(&regex::escape(&other.to_string())),
        }
    }
    regex.push('$');

    Regex::new(&regex).map(|re| re.is_match(name)).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_ncname() {
        assert!(is_valid_ncname("element"));
        assert!(is_valid_ncname("my-element"));
        assert!(is_valid_ncname("_element"));

        assert!(!is_valid_ncname(""));
        assert!(!is_valid_ncname("123element"));
        assert!(!is_valid_ncname("prefix:element"));
    }

    #[test]
    fn test_is_valid_qname() {
        assert!(is_valid_qname("element"));
        assert!(is_valid_qname("xs:element"));

        assert!(!is_valid_qname(""));
        assert!(!is_valid_qname(":element"));
        assert!(!is_valid_qname("element:"));
    }

    #[test]
    fn test_xsd_qname() {
        assert_eq!(
            xsd_qname("anyType"),
            "{http://www.w3.org/2001/XMLSchema}anyType"
        );
    }

    #[test]
    fn test_local_part() {
        assert_eq!(local_part("{http://example.com}foo"), Some("foo"));
        assert_eq!(local_part("xs:foo"), Some("foo"));
        assert_eq!(local_part("foo"), Some("foo"));
        assert_eq!(local_part("{unterminated"), None);
        assert_eq!(local_part("1bad:foo"), None);
    }

    #[test]
    fn test_namespace_part() {
        assert_eq!(
            namespace_part("{http://example.com}foo"),
            Some("http://example.com")
        );
        assert_eq!(namespace_part("foo"), Some(""));
        assert_eq!(namespace_part("{unterminated"), None);
    }

    #[test]
    fn test_is_shell_wildcard() {
        assert!(is_shell_wildcard("*.f90.jinja"));
        assert!(is_shell_wildcard("type?.jinja"));
        assert!(is_shell_wildcard("[ab].jinja"));
        assert!(!is_shell_wildcard("types.f90.jinja"));
    }

    #[test]
    fn test_wildcard_match() {
        assert!(wildcard_match("*.f90.jinja", "types.f90.jinja"));
        assert!(!wildcard_match("*.f90.jinja", "readme.txt.jinja"));
        assert!(wildcard_match("type?.jinja", "types.jinja"));
        assert!(!wildcard_match("type?.jinja", "type.jinja"));
        assert!(wildcard_match("[ab]*.jinja", "a_file.jinja"));
        assert!(!wildcard_match("[!ab]*.jinja", "a_file.jinja"));
        assert!(wildcard_match("literal.name", "literal.name"));
        // A dot in the pattern is literal, not a regex metacharacter
        assert!(!wildcard_match("a.b", "aXb"));
    }
}

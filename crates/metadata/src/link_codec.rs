//! Placeholder link target encoding.
//!
//! Link targets naming a network share (`\\server\share\...` or
//! `//server/share/...`) are stored with the leading separator pair replaced by
//! [`NETWORK_PREFIX_TOKEN`], the way the live filesystem reports reparse-point
//! targets for UNC paths (`UNC\server\share\...`). Local absolute paths are
//! stored verbatim. Targets read back from the filesystem may additionally
//! carry the verbatim prefix `\\?\`, which decoding strips.
//!
//! [`decode_target`] must be applied to every raw target before it is compared,
//! copied from or logged.

use std::path::PathBuf;

/// Token substituted for the leading separator pair of a network path.
pub const NETWORK_PREFIX_TOKEN: &str = "UNC";

const VERBATIM_PREFIX: &str = r"\\?\";

/// Failure to encode or decode a placeholder link target.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum LinkCodecError {
    /// The target was empty.
    #[error("link target is empty")]
    Empty,
    /// The path is not valid Unicode and cannot be stored as a link target.
    #[error("link target '{0}' is not valid unicode")]
    NotUnicode(String),
    /// The target contains an interior NUL byte.
    #[error("link target '{0}' contains a NUL byte")]
    InteriorNul(String),
    /// The target is not an absolute local or network path.
    #[error("link target '{0}' is not an absolute path")]
    NotAbsolute(String),
    /// A network target is missing its server component.
    #[error("link target '{0}' names a network path without a server")]
    MissingServer(String),
}

fn is_separator(c: char) -> bool {
    c == '/' || c == '\\'
}

/// Reports whether `raw` is a network path (`\\server...` or `//server...`).
fn network_remainder(raw: &str) -> Option<(char, &str)> {
    let mut chars = raw.chars();
    let first = chars.next()?;
    let second = chars.next()?;
    if is_separator(first) && first == second {
        let rest = &raw[2..];
        if rest.starts_with(is_separator) {
            return None;
        }
        return Some((first, rest));
    }
    None
}

fn has_drive_prefix(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    bytes.len() >= 3
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && (bytes[2] == b'\\' || bytes[2] == b'/')
}

fn is_absolute_local(raw: &str) -> bool {
    raw.starts_with(is_separator) || has_drive_prefix(raw)
}

fn validate(raw: &str) -> Result<(), LinkCodecError> {
    if raw.is_empty() {
        return Err(LinkCodecError::Empty);
    }
    if raw.contains('\0') {
        return Err(LinkCodecError::InteriorNul(raw.replace('\0', "\\0")));
    }
    Ok(())
}

/// Encodes an absolute path into the representation stored in a link.
///
/// Network paths have their leading separator pair replaced by
/// [`NETWORK_PREFIX_TOKEN`] followed by the original separator; local
/// absolute paths are returned unchanged.
///
/// # Examples
///
/// ```
/// use metadata::encode_target;
/// use std::path::Path;
///
/// assert_eq!(encode_target(Path::new("/snap/2024/data")).unwrap(), "/snap/2024/data");
/// assert_eq!(
///     encode_target(Path::new(r"\\array\share\.snapshot\daily")).unwrap(),
///     r"UNC\array\share\.snapshot\daily"
/// );
/// ```
pub fn encode_target(path: &std::path::Path) -> Result<String, LinkCodecError> {
    let raw = path
        .to_str()
        .ok_or_else(|| LinkCodecError::NotUnicode(path.display().to_string()))?;
    validate(raw)?;

    if let Some((separator, rest)) = network_remainder(raw) {
        if rest.is_empty() {
            return Err(LinkCodecError::MissingServer(raw.to_owned()));
        }
        let mut encoded = String::with_capacity(NETWORK_PREFIX_TOKEN.len() + 1 + rest.len());
        encoded.push_str(NETWORK_PREFIX_TOKEN);
        encoded.push(separator);
        encoded.push_str(rest);
        return Ok(encoded);
    }

    if is_absolute_local(raw) {
        Ok(raw.to_owned())
    } else {
        Err(LinkCodecError::NotAbsolute(raw.to_owned()))
    }
}

/// Decodes a stored link target back into the real path.
///
/// # Examples
///
/// ```
/// use metadata::decode_target;
/// use std::path::PathBuf;
///
/// assert_eq!(
///     decode_target(r"UNC\array\share\file.txt").unwrap(),
///     PathBuf::from(r"\\array\share\file.txt")
/// );
/// assert_eq!(
///     decode_target(r"\\?\UNC\array\share").unwrap(),
///     PathBuf::from(r"\\array\share")
/// );
/// assert!(decode_target("relative/target").is_err());
/// ```
pub fn decode_target(raw: &str) -> Result<PathBuf, LinkCodecError> {
    validate(raw)?;
    let stripped = raw.strip_prefix(VERBATIM_PREFIX).unwrap_or(raw);

    if let Some(rest) = stripped.strip_prefix(NETWORK_PREFIX_TOKEN)
        && let Some(separator) = rest.chars().next()
        && is_separator(separator)
    {
        let server = &rest[1..];
        if server.is_empty() || server.starts_with(is_separator) {
            return Err(LinkCodecError::MissingServer(raw.to_owned()));
        }
        let mut decoded = String::with_capacity(server.len() + 2);
        decoded.push(separator);
        decoded.push(separator);
        decoded.push_str(server);
        return Ok(PathBuf::from(decoded));
    }

    if is_absolute_local(stripped) {
        Ok(PathBuf::from(stripped))
    } else {
        Err(LinkCodecError::NotAbsolute(raw.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::path::Path;

    #[test]
    fn local_paths_are_stored_verbatim() {
        let encoded = encode_target(Path::new("/snap/2024-01-01/data/file.txt")).expect("encode");
        assert_eq!(encoded, "/snap/2024-01-01/data/file.txt");
    }

    #[test]
    fn network_paths_replace_leading_separators() {
        assert_eq!(
            encode_target(Path::new(r"\\array\share\dir")).expect("encode"),
            r"UNC\array\share\dir"
        );
        assert_eq!(
            encode_target(Path::new("//array/share/dir")).expect("encode"),
            "UNC/array/share/dir"
        );
    }

    #[test]
    fn triple_separator_is_a_local_path() {
        assert_eq!(
            encode_target(Path::new("///srv/data")).expect("encode"),
            "///srv/data"
        );
    }

    #[test]
    fn relative_paths_cannot_be_encoded() {
        assert_eq!(
            encode_target(Path::new("UNC/array/share")),
            Err(LinkCodecError::NotAbsolute("UNC/array/share".to_owned()))
        );
        assert!(encode_target(Path::new("data/file.txt")).is_err());
    }

    #[test]
    fn network_path_without_server_is_rejected() {
        assert_eq!(
            encode_target(Path::new(r"\\")),
            Err(LinkCodecError::MissingServer(r"\\".to_owned()))
        );
    }

    #[test]
    fn decode_restores_network_prefix() {
        assert_eq!(
            decode_target("UNC/array/share/x").expect("decode"),
            PathBuf::from("//array/share/x")
        );
    }

    #[test]
    fn decode_strips_verbatim_prefix() {
        assert_eq!(
            decode_target(r"\\?\C:\restore\data").expect("decode"),
            PathBuf::from(r"C:\restore\data")
        );
        assert_eq!(
            decode_target(r"\\?\UNC\array\share").expect("decode"),
            PathBuf::from(r"\\array\share")
        );
    }

    #[test]
    fn malformed_targets_are_errors() {
        assert_eq!(decode_target(""), Err(LinkCodecError::Empty));
        assert_eq!(
            decode_target(r"UNC\"),
            Err(LinkCodecError::MissingServer(r"UNC\".to_owned()))
        );
        assert!(matches!(
            decode_target("a\0b"),
            Err(LinkCodecError::InteriorNul(_))
        ));
        assert!(matches!(
            decode_target("UNCLE/file"),
            Err(LinkCodecError::NotAbsolute(_))
        ));
    }

    fn segment() -> impl Strategy<Value = String> {
        "[A-Za-z0-9 ._-]{1,12}"
    }

    proptest! {
        #[test]
        fn decode_inverts_encode_for_local_paths(parts in prop::collection::vec(segment(), 0..6)) {
            let path = PathBuf::from(format!("/{}", parts.join("/")));
            let encoded = encode_target(&path).expect("encode local");
            prop_assert_eq!(decode_target(&encoded).expect("decode local"), path);
        }

        #[test]
        fn decode_inverts_encode_for_network_paths(
            server in segment(),
            parts in prop::collection::vec(segment(), 0..6),
            backslash in any::<bool>(),
        ) {
            let separator = if backslash { "\\" } else { "/" };
            let mut raw = format!("{separator}{separator}{server}");
            for part in &parts {
                raw.push_str(separator);
                raw.push_str(part);
            }
            let path = PathBuf::from(&raw);
            let encoded = encode_target(&path).expect("encode network");
            prop_assert!(encoded.starts_with(NETWORK_PREFIX_TOKEN));
            prop_assert_eq!(decode_target(&encoded).expect("decode network"), path);
        }
    }
}

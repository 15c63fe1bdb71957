//! Blob key generation for uploaded images.

use uuid::Uuid;

/// The uploaded file's declared name carries no extension.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("filename {0:?} has no extension")]
pub struct MalformedFilename(pub String);

/// Derives a unique blob key from an uploaded file's declared name.
///
/// The extension is the substring after the first `.`, lower-cased; a name
/// without one (or with nothing after it) is malformed. The produced key
/// is `<uuid-v4>.<ext>`; the upload coordinator prefixes the store path.
/// No existence check is performed before writing under the key, the
/// UUID-v4 space makes collisions negligible.
pub fn generate_blob_key(filename: &str) -> Result<String, MalformedFilename> {
    let (_, extension) = filename
        .split_once('.')
        .filter(|(_, ext)| !ext.is_empty())
        .ok_or_else(|| MalformedFilename(filename.to_string()))?;

    Ok(format!("{}.{}", Uuid::new_v4(), extension.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_carries_lowercased_extension() {
        let key = generate_blob_key("Screenshot.PNG").unwrap();
        assert!(key.ends_with(".png"));
    }

    #[test]
    fn extension_is_everything_after_the_first_dot() {
        let key = generate_blob_key("archive.tar.gz").unwrap();
        assert!(key.ends_with(".tar.gz"));
    }

    #[test]
    fn key_prefix_is_a_valid_uuid() {
        let key = generate_blob_key("photo.jpeg").unwrap();
        let prefix = key.strip_suffix(".jpeg").unwrap();
        assert!(Uuid::parse_str(prefix).is_ok());
    }

    #[test]
    fn keys_are_unique_per_call() {
        let a = generate_blob_key("cat.png").unwrap();
        let b = generate_blob_key("cat.png").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn dotless_filename_is_malformed() {
        let err = generate_blob_key("noextension").unwrap_err();
        assert_eq!(err, MalformedFilename("noextension".into()));
    }

    #[test]
    fn trailing_dot_is_malformed() {
        assert!(generate_blob_key("name.").is_err());
    }

    #[test]
    fn hidden_files_use_their_suffix() {
        let key = generate_blob_key(".gitignore").unwrap();
        assert!(key.ends_with(".gitignore"));
    }
}

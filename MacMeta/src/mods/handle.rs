//! UUIDs and localization handles
//!
//! A handle is `h` followed by the UUID with every `-` replaced by `g`,
//! e.g. `h853caddag9fb3g4690ga2cfg56bb76f8543d`. Hex digits keep their case
//! in both directions, so the transform is reversible for any UUID.

use uuid::Uuid;

use crate::constants::{HANDLE, UUID};
use crate::error::{Error, Result};

/// Convert a UUID to a localization handle.
///
/// # Errors
/// Returns [`Error::InvalidUuid`] if `uuid` is not a hyphenated UUID.
pub fn to_handle(uuid: &str) -> Result<String> {
    let uuid = uuid.trim();
    if !UUID.is_match(uuid) {
        return Err(Error::InvalidUuid(uuid.to_string()));
    }
    Ok(format!("h{}", uuid.replace('-', "g")))
}

/// Convert a localization handle back to its UUID.
///
/// # Errors
/// Returns [`Error::InvalidHandle`] if `handle` is not a handle.
pub fn from_handle(handle: &str) -> Result<String> {
    let trimmed = handle.trim();
    if !HANDLE.is_match(&trimmed.to_ascii_lowercase()) {
        return Err(Error::InvalidHandle(trimmed.to_string()));
    }
    // `g` never occurs in hex digits
    Ok(trimmed[1..].replace(['g', 'G'], "-"))
}

/// A random (v4) UUID in the lowercase hyphenated form used by descriptors.
#[must_use]
pub fn new_uuid() -> String {
    Uuid::new_v4().hyphenated().to_string()
}

/// A random localization handle.
#[must_use]
pub fn new_handle() -> String {
    format!("h{}", new_uuid().replace('-', "g"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_conversion() {
        let uuid = "853cadda-9fb3-4690-a2cf-56bb76f8543d";
        let handle = to_handle(uuid).unwrap();
        assert_eq!(handle, "h853caddag9fb3g4690ga2cfg56bb76f8543d");
        assert_eq!(from_handle(&handle).unwrap(), uuid);
    }

    #[test]
    fn test_handle_keeps_uuid_case() {
        let upper = "853CADDA-9FB3-4690-A2CF-56BB76F8543D";
        let handle = to_handle(upper).unwrap();
        assert_eq!(handle, "h853CADDAg9FB3g4690gA2CFg56BB76F8543D");
        assert_eq!(from_handle(&handle).unwrap(), upper);

        let mixed = "853Cadda-9fB3-4690-a2CF-56bb76F8543d";
        assert_eq!(from_handle(&to_handle(mixed).unwrap()).unwrap(), mixed);
        assert_eq!(
            from_handle("H853CADDAG9FB3G4690GA2CFG56BB76F8543D").unwrap(),
            upper
        );
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(matches!(to_handle("not-a-uuid"), Err(Error::InvalidUuid(_))));
        assert!(matches!(from_handle("853cadda"), Err(Error::InvalidHandle(_))));
        assert!(matches!(
            from_handle("h853cadda-9fb3-4690-a2cf-56bb76f8543d"),
            Err(Error::InvalidHandle(_))
        ));
    }

    #[test]
    fn test_generated_values_are_valid() {
        let uuid = new_uuid();
        assert!(UUID.is_match(&uuid));
        assert_eq!(uuid, uuid.to_lowercase());

        let handle = new_handle();
        assert!(HANDLE.is_match(&handle));
        assert_ne!(new_handle(), handle);
    }
}

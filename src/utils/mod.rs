use regex::Regex;
use uuid::Uuid;

pub mod circuit_breaker;
pub mod logging;
pub mod retry;

lazy_static::lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex");
}

/// Loose shape check performed before an address is sent to the auth backend.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email.trim())
}

pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Object path for an uploaded image: `<folder>/<owner>/<uuid>.jpg`.
pub fn image_object_path(folder: &str, owner_id: &str) -> String {
    format!("{}/{}/{}.jpg", folder, owner_id, Uuid::new_v4())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_email() {
        assert!(is_valid_email("ada@example.com"));
        assert!(is_valid_email("  ada@example.com "));
        assert!(!is_valid_email("ada.example.com"));
        assert!(!is_valid_email("ada@localhost"));
        assert!(!is_valid_email("a da@example.com"));
    }

    #[test]
    fn test_is_blank() {
        assert!(is_blank("   \t"));
        assert!(!is_blank(" Golden Gate "));
    }

    #[test]
    fn test_image_object_path() {
        let path = image_object_path("events", "u1");
        assert!(path.starts_with("events/u1/"));
        assert!(path.ends_with(".jpg"));
        assert_ne!(path, image_object_path("events", "u1"));
    }
}

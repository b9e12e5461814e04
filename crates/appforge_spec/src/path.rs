//! JSON-pointer-like locations used in validation messages.
//!
//! Paths start at `$`; object keys that are plain identifiers are appended
//! with a dot (`$.data.routes`), any other key is quoted in brackets
//! (`$.data.permissions["/admin"]`), and array indices use `[n]`.

/// Root of every document path.
pub const ROOT: &str = "$";

/// Path of an object member.
pub fn key(parent: &str, key: &str) -> String {
    if is_plain_key(key) {
        format!("{}.{}", parent, key)
    } else {
        format!("{}[{:?}]", parent, key)
    }
}

/// Path of an array element.
pub fn index(parent: &str, index: usize) -> String {
    format!("{}[{}]", parent, index)
}

fn is_plain_key(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths() {
        let routes = key(&key(ROOT, "data"), "routes");
        assert_eq!(routes, "$.data.routes");
        assert_eq!(key(&index(&routes, 2), "path"), "$.data.routes[2].path");
        assert_eq!(key("$.data.permissions", "/admin"), "$.data.permissions[\"/admin\"]");
        assert_eq!(key("$.props", "aria-label"), "$.props[\"aria-label\"]");
    }
}

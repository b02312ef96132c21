//! Request payloads
//!
//! Query strings and JSON bodies accepted by the API. Field names are part
//! of the wire format.

use serde::Deserialize;

/// `?path=<rel>`; a missing parameter means the server root.
#[derive(Debug, Default, Deserialize)]
pub struct PathQuery {
    #[serde(default)]
    pub path: String,
}

#[derive(Debug, Deserialize)]
pub struct RenameRequest {
    pub old: String,
    pub new: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteRequest {
    pub path: String,
}

/// Creates `name` inside `path`.
#[derive(Debug, Deserialize)]
pub struct MkdirRequest {
    #[serde(default)]
    pub path: String,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mkdir_path_defaults_to_root() {
        let request: MkdirRequest = serde_json::from_str(r#"{"name":"docs"}"#).unwrap();
        assert_eq!(request.path, "");
        assert_eq!(request.name, "docs");
    }

    #[test]
    fn test_rename_requires_both_fields() {
        assert!(serde_json::from_str::<RenameRequest>(r#"{"old":"a"}"#).is_err());
        let request: RenameRequest =
            serde_json::from_str(r#"{"old":"a/b","new":"a/c"}"#).unwrap();
        assert_eq!((request.old.as_str(), request.new.as_str()), ("a/b", "a/c"));
    }
}

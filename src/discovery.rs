//! Module-file discovery.
//!
//! A file is a module candidate iff its name is exactly `<name>.<ext>`: split
//! on `.`, it yields two segments and the second is the configured extension.
//! `notes`, `a.b.json` and `a.txt` are all rejected for extension `json`.

use std::fs;
use std::path::Path;

use crate::error::{RegistryError, Result};

/// Filename filter shared by discovery and bulk load.
pub fn is_module_file(file_name: &str, extension: &str) -> bool {
    let mut parts = file_name.split('.');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(_), Some(ext), None) => ext == extension,
        _ => false,
    }
}

/// List `dir` and return the names accepted by [`is_module_file`], in the
/// order the operating system returns them.
///
/// Emits one `Checking <name>...` line per directory entry. File contents are
/// never touched.
pub fn scan_directory(dir: &Path, extension: &str, log: &dyn Fn(&str)) -> Result<Vec<String>> {
    let read_dir_err = |source| RegistryError::ReadDir {
        path: dir.to_path_buf(),
        source,
    };

    let mut accepted = Vec::new();
    for entry in fs::read_dir(dir).map_err(read_dir_err)? {
        let entry = entry.map_err(read_dir_err)?;
        let os_name = entry.file_name();
        log(&format!("Checking {}...", os_name.to_string_lossy()));

        // Non-UTF-8 names cannot match a UTF-8 extension token.
        let Some(name) = os_name.to_str() else {
            continue;
        };
        if is_module_file(name, extension) {
            accepted.push(name.to_string());
        }
    }
    Ok(accepted)
}

/// Discoverer entry point: header line plus [`scan_directory`].
pub fn identify_modules(dir: &Path, extension: &str, log: &dyn Fn(&str)) -> Result<Vec<String>> {
    log(&format!("Checking directory: {}", dir.display()));
    scan_directory(dir, extension, log)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_single_dot_matching_extension_accepted() {
        assert!(is_module_file("alpha.json", "json"));
        assert!(is_module_file("x.toml", "toml"));
    }

    #[test]
    fn test_no_dot_rejected() {
        assert!(!is_module_file("json", "json"));
        assert!(!is_module_file("", "json"));
    }

    #[test]
    fn test_two_dots_rejected() {
        assert!(!is_module_file("c.bad.json", "json"));
        assert!(!is_module_file("archive.json.bak", "json"));
    }

    #[test]
    fn test_wrong_extension_rejected() {
        assert!(!is_module_file("notes.txt", "json"));
        assert!(!is_module_file("alpha.JSON", "json"));
    }

    #[test]
    fn test_trailing_dot_rejected() {
        assert!(!is_module_file("alpha.", "json"));
    }

    #[test]
    fn test_scan_logs_every_entry_and_filters() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a.json", "b.txt", "c.d.json"] {
            fs::write(dir.path().join(name), "{}").unwrap();
        }
        let lines = RefCell::new(Vec::new());
        let found =
            scan_directory(dir.path(), "json", &|l: &str| lines.borrow_mut().push(l.to_string())).unwrap();
        assert_eq!(found, vec!["a.json".to_string()]);
        assert_eq!(lines.borrow().len(), 3);
        assert!(lines.borrow().iter().all(|l| l.starts_with("Checking ")));
    }

    #[test]
    fn test_identify_modules_logs_directory_header() {
        let dir = tempfile::tempdir().unwrap();
        let lines = RefCell::new(Vec::new());
        identify_modules(dir.path(), "json", &|l: &str| lines.borrow_mut().push(l.to_string())).unwrap();
        assert_eq!(lines.borrow().len(), 1);
        assert!(lines.borrow()[0].starts_with("Checking directory: "));
    }

    #[test]
    fn test_missing_directory_is_read_dir_error() {
        let err = identify_modules(Path::new("/no/such/modreg/dir"), "json", &|_: &str| {}).unwrap_err();
        assert!(matches!(err, RegistryError::ReadDir { .. }));
    }
}

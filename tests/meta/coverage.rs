//! Checks that `tests/unit` mirrors `src` file for file

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::fs;
    use std::io;
    use std::path::{Path, PathBuf};

    const SRC: &str = "src";
    const UNIT: &str = "tests/unit";

    // Module roots and entry points are wiring, not behaviour
    fn is_wiring(relative: &str) -> bool {
        let name = relative.rsplit('/').next().unwrap_or(relative);
        matches!(name, "main.rs" | "lib.rs" | "mod.rs")
    }

    fn rust_files(root: &Path) -> io::Result<Vec<PathBuf>> {
        let mut found = Vec::new();
        let mut pending = vec![root.to_path_buf()];
        while let Some(dir) = pending.pop() {
            for entry in fs::read_dir(&dir)? {
                let path = entry?.path();
                if path.is_dir() {
                    pending.push(path);
                } else if path.extension().and_then(|ext| ext.to_str()) == Some("rs") {
                    found.push(path);
                }
            }
        }
        Ok(found)
    }

    fn relative_modules(root: &str) -> BTreeSet<String> {
        let root = Path::new(root);
        let files = rust_files(root).unwrap_or_else(|error| {
            assert!(!root.exists(), "Failed to scan {}: {error}", root.display());
            Vec::new()
        });
        files
            .iter()
            .filter_map(|path| path.strip_prefix(root).ok())
            .map(|path| path.to_string_lossy().replace('\\', "/"))
            .filter(|relative| !is_wiring(relative))
            .collect()
    }

    #[test]
    fn test_all_src_files_have_unit_tests() {
        let tests = relative_modules(UNIT);
        let missing: Vec<String> = relative_modules(SRC)
            .into_iter()
            .filter(|module| !tests.contains(module))
            .map(|module| format!("  - src/{module} -> {UNIT}/{module}"))
            .collect();

        assert!(
            missing.is_empty(),
            "Source files without a unit test counterpart:\n{}",
            missing.join("\n")
        );
    }

    #[test]
    fn test_all_unit_tests_have_src_counterparts() {
        let sources = relative_modules(SRC);
        let orphaned: Vec<String> = relative_modules(UNIT)
            .into_iter()
            .filter(|module| !sources.contains(module))
            .map(|module| format!("  - {UNIT}/{module} -> src/{module} (missing)"))
            .collect();

        assert!(
            orphaned.is_empty(),
            "Unit test files with no source file:\n{}",
            orphaned.join("\n")
        );
    }

    #[test]
    fn test_all_unit_modules_are_declared() {
        let mut undeclared = Vec::new();
        for module in relative_modules(UNIT) {
            let path = Path::new(&module);
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let parent_mod = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
                Some(parent) => Path::new(UNIT).join(parent).join("mod.rs"),
                None => Path::new(UNIT).join("main.rs"),
            };
            let declared = fs::read_to_string(&parent_mod)
                .is_ok_and(|content| content.contains(&format!("mod {stem};")));
            if !declared {
                undeclared.push(format!("  - {UNIT}/{module} (not in {})", parent_mod.display()));
            }
        }

        assert!(
            undeclared.is_empty(),
            "Unit test files that are never compiled:\n{}",
            undeclared.join("\n")
        );
    }

    #[test]
    fn test_all_test_files_contain_tests() {
        let files = rust_files(Path::new("tests")).unwrap_or_default();
        let without_tests: Vec<String> = files
            .iter()
            .filter(|path| !is_wiring(&path.to_string_lossy()))
            .filter(|path| {
                fs::read_to_string(path).is_ok_and(|content| !content.contains("#[test]"))
            })
            .map(|path| format!("  - {}", path.display()))
            .collect();

        assert!(
            without_tests.is_empty(),
            "Test files without any #[test] functions:\n{}",
            without_tests.join("\n")
        );
    }
}

//! Boundary checks for files the CLI is about to write.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Build output folders of a .NET project.
const BUILD_OUTPUT_DIRS: &[&str] = &["bin", "obj"];

/// Refuses paths outside the workspace, in the NuGet package cache, or in
/// build output folders.
#[derive(Debug, Clone)]
pub struct WorkspaceGuard {
    workspace_root: PathBuf,
    /// Canonical paths that may never be written
    forbidden_paths: Vec<PathBuf>,
}

#[derive(Error, Debug)]
pub enum SafetyError {
    #[error("path is outside workspace: {path} (workspace: {workspace})")]
    OutsideWorkspace { path: PathBuf, workspace: PathBuf },

    #[error("path is in forbidden directory: {path} (forbidden: {forbidden})")]
    ForbiddenPath { path: PathBuf, forbidden: PathBuf },

    #[error("build output is never edited: {0}")]
    BuildOutput(PathBuf),

    #[error("failed to canonicalize path: {0}")]
    Canonicalize(#[from] std::io::Error),
}

impl WorkspaceGuard {
    pub fn new(workspace_root: impl AsRef<Path>) -> Result<Self, SafetyError> {
        let workspace_root = workspace_root.as_ref().canonicalize()?;
        let mut forbidden_paths = Vec::new();
        if let Some(home) = home::home_dir() {
            if let Ok(packages) = home.join(".nuget/packages").canonicalize() {
                forbidden_paths.push(packages);
            }
        }
        Ok(Self {
            workspace_root,
            forbidden_paths,
        })
    }

    /// Resolve `path` (relative paths against the workspace root) and
    /// return its canonical form if it may be edited.
    pub fn validate_path(&self, path: impl AsRef<Path>) -> Result<PathBuf, SafetyError> {
        let path = path.as_ref();
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.workspace_root.join(path)
        };
        let canonical = absolute.canonicalize()?;
        self.check_canonical(&canonical)?;
        Ok(canonical)
    }

    /// Check again right before writing.
    pub fn revalidate(&self, path: &Path) -> Result<PathBuf, SafetyError> {
        let canonical = path.canonicalize()?;
        self.check_canonical(&canonical)?;
        Ok(canonical)
    }

    fn check_canonical(&self, canonical: &Path) -> Result<(), SafetyError> {
        let Ok(relative) = canonical.strip_prefix(&self.workspace_root) else {
            return Err(SafetyError::OutsideWorkspace {
                path: canonical.to_path_buf(),
                workspace: self.workspace_root.clone(),
            });
        };
        if let Some(forbidden) = self
            .forbidden_paths
            .iter()
            .find(|forbidden| canonical.starts_with(forbidden))
        {
            return Err(SafetyError::ForbiddenPath {
                path: canonical.to_path_buf(),
                forbidden: forbidden.clone(),
            });
        }
        if is_build_output(relative) {
            return Err(SafetyError::BuildOutput(canonical.to_path_buf()));
        }
        Ok(())
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    #[cfg(test)]
    pub fn with_forbidden(
        workspace_root: impl AsRef<Path>,
        forbidden: Vec<PathBuf>,
    ) -> Result<Self, SafetyError> {
        Ok(Self {
            workspace_root: workspace_root.as_ref().canonicalize()?,
            forbidden_paths: forbidden,
        })
    }
}

/// True when a directory component of `relative` is `bin` or `obj`.
pub fn is_build_output(relative: &Path) -> bool {
    let mut components: Vec<_> = relative.components().collect();
    // The file name itself may be called anything.
    components.pop();
    components.iter().any(|component| {
        component
            .as_os_str()
            .to_str()
            .is_some_and(|name| BUILD_OUTPUT_DIRS.contains(&name))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn path_inside_workspace_is_accepted() {
        let temp = tempfile::tempdir().unwrap();
        let guard = WorkspaceGuard::new(temp.path()).unwrap();
        let file = temp.path().join("src/App/Program.cs");
        fs::create_dir_all(file.parent().unwrap()).unwrap();
        fs::write(&file, b"").unwrap();
        assert!(guard.validate_path(&file).is_ok());
        assert!(guard.validate_path("src/App/Program.cs").is_ok());
    }

    #[test]
    fn path_outside_workspace_is_refused() {
        let temp = tempfile::tempdir().unwrap();
        let workspace = temp.path().join("workspace");
        fs::create_dir_all(&workspace).unwrap();
        let guard = WorkspaceGuard::new(&workspace).unwrap();
        let outside = temp.path().join("Outside.cs");
        fs::write(&outside, b"").unwrap();
        assert!(matches!(
            guard.validate_path(&outside),
            Err(SafetyError::OutsideWorkspace { .. })
        ));
    }

    #[test]
    fn forbidden_and_build_output_are_refused() {
        let temp = tempfile::tempdir().unwrap();
        let packages = temp.path().join("packages");
        fs::create_dir_all(&packages).unwrap();
        let guard = WorkspaceGuard::with_forbidden(temp.path(), vec![packages
            .canonicalize()
            .unwrap()])
        .unwrap();

        let cached = packages.join("Lib.cs");
        fs::write(&cached, b"").unwrap();
        assert!(matches!(
            guard.validate_path(&cached),
            Err(SafetyError::ForbiddenPath { .. })
        ));

        let generated = temp.path().join("App/obj/Debug/AssemblyInfo.cs");
        fs::create_dir_all(generated.parent().unwrap()).unwrap();
        fs::write(&generated, b"").unwrap();
        assert!(matches!(
            guard.validate_path(&generated),
            Err(SafetyError::BuildOutput(_))
        ));
    }

    #[test]
    fn build_output_matches_directories_only() {
        assert!(is_build_output(Path::new("App/bin/Release/X.cs")));
        assert!(!is_build_output(Path::new("App/obj.cs")));
        assert!(!is_build_output(Path::new("binary/X.cs")));
    }

    #[test]
    #[cfg(unix)]
    fn symlink_escape_is_refused() {
        use std::os::unix::fs::symlink;

        let temp = tempfile::tempdir().unwrap();
        let workspace = temp.path().join("workspace");
        fs::create_dir_all(&workspace).unwrap();
        let outside = temp.path().join("Outside.cs");
        fs::write(&outside, b"").unwrap();
        let link = workspace.join("Escape.cs");
        symlink(&outside, &link).unwrap();

        let guard = WorkspaceGuard::new(&workspace).unwrap();
        assert!(matches!(
            guard.validate_path(&link),
            Err(SafetyError::OutsideWorkspace { .. })
        ));
    }
}

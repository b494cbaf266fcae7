// Markshelf platform paths
// Resolves the per-user config and data directories for the current OS.

use std::path::PathBuf;

use directories::ProjectDirs;

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("org", "Markshelf", "markshelf")
}

/// Directory holding `settings.json`. Falls back to `./markshelf` when the
/// platform reports no home directory.
pub fn get_config_dir() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("markshelf"))
}

/// Directory holding the bookmark database.
pub fn get_data_dir() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("markshelf"))
}

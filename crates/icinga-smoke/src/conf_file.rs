//! Host definitions dropped into the Icinga 2 `conf.d` directory
//!
//! The object name is substituted verbatim. A name containing `"` produces
//! an invalid definition; generated tokens are hex so this never happens in
//! a normal run.

use crate::error::{Result, SmokeError};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// Render the host object definition for `name`.
pub fn render_host_config(name: &str) -> String {
    format!(
        "object Host \"{name}\" {{\n\t\
         display_name = \"icingaservice\"\n\t\
         check_command = \"dummy\"\n\t\
         enable_active_checks = false\n\t\
         enable_notifications = \"1.000000\"\n}}"
    )
}

/// Absolute path of the definition file for `name` inside `dir`.
pub fn host_config_path(dir: &Path, name: &str) -> Result<PathBuf> {
    let path = dir.join(format!("{name}.conf"));
    std::path::absolute(&path).map_err(|source| SmokeError::ConfigFile { path, source })
}

/// Write `<dir>/<name>.conf` and sync it to disk.
pub fn write_host_config(dir: &Path, name: &str) -> Result<PathBuf> {
    let path = host_config_path(dir, name)?;
    let io_err = |source| SmokeError::ConfigFile {
        path: path.clone(),
        source,
    };

    let mut file = File::create(&path).map_err(io_err)?;
    file.write_all(render_host_config(name).as_bytes())
        .map_err(io_err)?;
    file.sync_all().map_err(io_err)?;

    info!("Icinga 2 '{}' config file successfully created", path.display());
    Ok(path)
}

/// Remove a definition file written by [`write_host_config`].
pub fn remove_host_config(path: &Path) -> Result<()> {
    info!("Removing Icinga 2 {} config file", path.display());
    std::fs::remove_file(path).map_err(|source| SmokeError::ConfigFile {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_matches_template() {
        let expected = "object Host \"0A1B2C3D4E5F\" {\n\
                        \tdisplay_name = \"icingaservice\"\n\
                        \tcheck_command = \"dummy\"\n\
                        \tenable_active_checks = false\n\
                        \tenable_notifications = \"1.000000\"\n\
                        }";
        assert_eq!(render_host_config("0A1B2C3D4E5F"), expected);
    }

    #[test]
    fn test_name_is_not_escaped() {
        let rendered = render_host_config("bad\"name");
        assert!(rendered.starts_with("object Host \"bad\"name\" {"));
    }

    #[test]
    fn test_write_then_remove() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_host_config(dir.path(), "FEEDC0FFEE00").unwrap();

        assert!(path.is_absolute());
        assert_eq!(path.file_name().unwrap(), "FEEDC0FFEE00.conf");
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            render_host_config("FEEDC0FFEE00")
        );

        remove_host_config(&path).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_write_into_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");

        let err = write_host_config(&missing, "ABCDEF012345").unwrap_err();
        assert!(matches!(err, SmokeError::ConfigFile { .. }));
    }

    #[test]
    fn test_remove_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = remove_host_config(&dir.path().join("gone.conf")).unwrap_err();
        assert!(matches!(err, SmokeError::ConfigFile { .. }));
    }
}

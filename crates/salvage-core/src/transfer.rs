use crate::config::Location;
use crate::error::Error;
use crate::merge::sync_file;
use crate::scanner::join_relative;
use std::path::PathBuf;
use tracing::info;

fn find<'a>(locations: &'a [Location], name: &str) -> Result<&'a Location, Error> {
    locations
        .iter()
        .find(|l| l.name == name)
        .ok_or_else(|| Error::UnknownLocation(name.to_string()))
}

/// `(location name, absolute path)` for every location holding `relative_path`.
pub fn location_paths(locations: &[Location], relative_path: &str) -> Vec<(String, PathBuf)> {
    locations
        .iter()
        .map(|l| (l.name.clone(), join_relative(&l.path, relative_path)))
        .filter(|(_, path)| path.is_file())
        .collect()
}

/// Copy one file between two locations, keeping its timestamps.
/// Returns the destination path.
pub fn copy_between_locations(
    locations: &[Location],
    relative_path: &str,
    from: &str,
    to: &str,
) -> Result<PathBuf, Error> {
    if from == to {
        return Err(Error::Other(format!(
            "source and destination are both '{}'",
            from
        )));
    }
    let source = join_relative(&find(locations, from)?.path, relative_path);
    let destination = join_relative(&find(locations, to)?.path, relative_path);

    sync_file(&source, &destination).map_err(Error::File)?;
    info!("Copied {} from {} to {}", relative_path, from, to);
    Ok(destination)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReasonCode;
    use std::fs;
    use tempfile::tempdir;

    fn setup() -> (tempfile::TempDir, Vec<Location>) {
        let dir = tempdir().unwrap();
        let current = dir.path().join("current");
        let merged = dir.path().join("merged");
        fs::create_dir_all(current.join("Views")).unwrap();
        fs::create_dir_all(&merged).unwrap();
        fs::write(current.join("Views").join("Auth.swift"), "auth").unwrap();
        let locations = vec![
            Location::new("current", current),
            Location::new("merged", merged),
        ];
        (dir, locations)
    }

    #[test]
    fn test_copy_between_locations() {
        let (_dir, locations) = setup();
        let dst = copy_between_locations(&locations, "Views/Auth.swift", "current", "merged")
            .unwrap();
        assert_eq!(fs::read_to_string(dst).unwrap(), "auth");
        assert_eq!(location_paths(&locations, "Views/Auth.swift").len(), 2);
    }

    #[test]
    fn test_copy_errors() {
        let (_dir, locations) = setup();
        assert!(matches!(
            copy_between_locations(&locations, "Views/Auth.swift", "current", "nowhere"),
            Err(Error::UnknownLocation(_))
        ));
        assert!(matches!(
            copy_between_locations(&locations, "Views/Auth.swift", "current", "current"),
            Err(Error::Other(_))
        ));
        match copy_between_locations(&locations, "Views/None.swift", "current", "merged") {
            Err(Error::File(issue)) => assert_eq!(issue.reason, ReasonCode::Vanished),
            other => panic!("unexpected {:?}", other),
        }
    }
}

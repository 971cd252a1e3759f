//! Output directory management.
//!
//! Rendered diagrams live in one flat directory as `<stem>_<6 hex>.png`.
//! [`OutputDir`] allocates those names, persists image bytes atomically and
//! applies a [`RetentionPolicy`] on request.
//!
//! Persisting goes through a hidden temporary file in the same directory
//! which is then linked into place without replacing an existing file. A
//! name that is already taken is redrawn, so two calls never return the same
//! path and a failed call leaves no visible file behind.

use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
    time::{Duration, SystemTime},
};

use log::{debug, info, warn};
use rand::Rng;

use crate::error::CloudgramError;

/// Number of name draws before giving up on a persist.
const MAX_NAME_ATTEMPTS: usize = 16;

/// Length of the random hexadecimal suffix.
const SUFFIX_LEN: usize = 6;

/// Upper bound on the slug part of a file name, in characters.
const MAX_SLUG_CHARS: usize = 64;

const EXTENSION: &str = "png";
const TEMP_PREFIX: &str = ".cloudgram-";

/// Turns a diagram title into a filesystem-safe file stem.
///
/// The title is lowercased; anything other than alphanumerics, `-` and `_`
/// (spaces included) becomes `_`. An empty result becomes `diagram`.
///
/// # Examples
///
/// ```
/// use cloudgram::output::slugify;
///
/// assert_eq!(slugify("Basic Web App"), "basic_web_app");
/// assert_eq!(slugify("a/b: c"), "a_b__c");
/// assert_eq!(slugify(""), "diagram");
/// ```
pub fn slugify(title: &str) -> String {
    let slug: String = title
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .take(MAX_SLUG_CHARS)
        .collect();

    if slug.is_empty() {
        "diagram".to_string()
    } else {
        slug
    }
}

/// Returns true if `name` has the `<stem>_<6 lowercase hex>.png` shape of a
/// rendered diagram.
pub fn is_rendered_name(name: &str) -> bool {
    let Some(stem) = name.strip_suffix(EXTENSION).and_then(|s| s.strip_suffix('.')) else {
        return false;
    };
    let Some((prefix, suffix)) = stem.rsplit_once('_') else {
        return false;
    };

    !prefix.is_empty()
        && !prefix.starts_with('.')
        && suffix.len() == SUFFIX_LEN
        && suffix
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
}

fn random_suffix() -> String {
    let value: u32 = rand::rng().random_range(0..1u32 << (SUFFIX_LEN * 4));
    format!("{value:0width$x}", width = SUFFIX_LEN)
}

/// Bounds applied by [`OutputDir::sweep`]. `None` disables a bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    max_files: Option<usize>,
    max_age: Option<Duration>,
}

impl RetentionPolicy {
    pub fn new(max_files: Option<usize>, max_age: Option<Duration>) -> Self {
        Self {
            max_files,
            max_age,
        }
    }

    pub fn max_files(&self) -> Option<usize> {
        self.max_files
    }

    pub fn max_age(&self) -> Option<Duration> {
        self.max_age
    }
}

/// Outcome of one retention sweep.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SweepReport {
    removed: Vec<PathBuf>,
    retained: usize,
}

impl SweepReport {
    /// Paths deleted by the sweep, oldest first.
    pub fn removed(&self) -> &[PathBuf] {
        &self.removed
    }

    /// Number of rendered files left in the directory.
    pub fn retained(&self) -> usize {
        self.retained
    }
}

/// The directory rendered diagrams are written to.
#[derive(Debug, Clone)]
pub struct OutputDir {
    root: PathBuf,
}

impl OutputDir {
    /// Opens `root`, creating it and any missing parents.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the directory cannot be created.
    pub fn create(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        debug!(path:? = root; "Output directory ready");
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes `bytes` to a new `<stem>_<6 hex>.png` file and returns its path.
    ///
    /// # Errors
    ///
    /// Returns [`CloudgramError::Io`] if the temporary file cannot be written
    /// or moved into place, or if every drawn name was already taken.
    pub fn persist(&self, stem: &str, bytes: &[u8]) -> Result<PathBuf, CloudgramError> {
        let mut temp = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .suffix(".tmp")
            .tempfile_in(&self.root)?;
        temp.write_all(bytes)?;
        temp.flush()?;

        for attempt in 1..=MAX_NAME_ATTEMPTS {
            let path = self
                .root
                .join(format!("{stem}_{}.{EXTENSION}", random_suffix()));

            match temp.persist_noclobber(&path) {
                Ok(_) => return Ok(path),
                Err(err) if err.error.kind() == io::ErrorKind::AlreadyExists => {
                    debug!(path:? = path, attempt = attempt; "Output name taken, drawing another");
                    temp = err.file;
                }
                Err(err) => return Err(err.error.into()),
            }
        }

        Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("no free file name for `{stem}` after {MAX_NAME_ATTEMPTS} attempts"),
        )
        .into())
    }

    /// Deletes rendered files that violate `policy`.
    ///
    /// Files older than the age bound go first; then the oldest remaining
    /// files are removed until the count bound holds. Files that do not look
    /// like rendered diagrams are never touched.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the directory cannot be listed. Failures on
    /// individual files are logged and skipped.
    pub fn sweep(&self, policy: &RetentionPolicy) -> io::Result<SweepReport> {
        let mut rendered = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            let name = entry.file_name();
            if !name.to_str().is_some_and(is_rendered_name) {
                continue;
            }

            match entry.metadata().and_then(|meta| {
                if meta.is_file() {
                    meta.modified().map(Some)
                } else {
                    Ok(None)
                }
            }) {
                Ok(Some(modified)) => rendered.push((modified, entry.path())),
                Ok(None) => {}
                Err(err) => warn!(path:? = entry.path(), err:% = err; "Skipping unreadable file"),
            }
        }

        // Oldest first; ties broken by name for a stable order
        rendered.sort();

        let now = SystemTime::now();
        let expired = policy.max_age.map_or(0, |max_age| {
            rendered
                .iter()
                .take_while(|(modified, _)| {
                    now.duration_since(*modified)
                        .is_ok_and(|age| age > max_age)
                })
                .count()
        });
        let remaining = rendered.len() - expired;
        let excess = policy
            .max_files
            .map_or(0, |max_files| remaining.saturating_sub(max_files));

        let mut report = SweepReport::default();
        for (_, path) in rendered.iter().take(expired + excess) {
            match fs::remove_file(path) {
                Ok(()) => report.removed.push(path.clone()),
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(err) => warn!(path:? = path, err:% = err; "Failed to remove expired diagram"),
            }
        }
        report.retained = rendered.len() - report.removed.len();

        if !report.removed.is_empty() {
            info!(
                removed = report.removed.len(),
                retained = report.retained;
                "Retention sweep finished"
            );
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use std::fs::File;

    use proptest::prelude::*;

    use super::*;

    fn touch(dir: &Path, name: &str, age: Duration) -> PathBuf {
        let path = dir.join(name);
        let file = File::create(&path).unwrap();
        file.set_modified(SystemTime::now() - age).unwrap();
        path
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Microservices Architecture"), "microservices_architecture");
        assert_eq!(slugify("edge-cache_v2"), "edge-cache_v2");
        assert_eq!(slugify("../etc/passwd"), "___etc_passwd");
        assert_eq!(slugify("   "), "___");
        assert_eq!(slugify("!!!"), "___");
        assert_eq!(slugify(""), "diagram");
    }

    #[test]
    fn test_slugify_truncates_long_titles() {
        let title = "x".repeat(500);
        assert_eq!(slugify(&title).chars().count(), MAX_SLUG_CHARS);
    }

    #[test]
    fn test_is_rendered_name() {
        assert!(is_rendered_name("basic_web_app_0a9f3c.png"));
        assert!(is_rendered_name("micro_ffffff.png"));
        assert!(!is_rendered_name("micro_FFFFFF.png"));
        assert!(!is_rendered_name("micro_ffff.png"));
        assert!(!is_rendered_name("micro_0a9f3c.svg"));
        assert!(!is_rendered_name("_0a9f3c.png"));
        assert!(!is_rendered_name(".cloudgram-abc_0a9f3c.png"));
        assert!(!is_rendered_name("notes.txt"));
    }

    #[test]
    fn test_random_suffix_shape() {
        for _ in 0..100 {
            let suffix = random_suffix();
            assert_eq!(suffix.len(), SUFFIX_LEN);
            assert!(is_rendered_name(&format!("x_{suffix}.png")));
        }
    }

    #[test]
    fn test_create_is_idempotent() {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path().join("nested").join("outputs");
        OutputDir::create(&root).unwrap();
        OutputDir::create(&root).unwrap();
        assert!(root.is_dir());
    }

    #[test]
    fn test_persist_writes_bytes_and_leaves_no_temp_files() {
        let temp = tempfile::tempdir().unwrap();
        let dir = OutputDir::create(temp.path()).unwrap();

        let path = dir.persist("demo", b"payload").unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"payload");
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("demo_"));
        assert!(is_rendered_name(name));
        assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_persist_into_missing_directory_fails() {
        let temp = tempfile::tempdir().unwrap();
        let dir = OutputDir::create(temp.path().join("gone")).unwrap();
        fs::remove_dir(dir.root()).unwrap();

        let err = dir.persist("demo", b"payload").unwrap_err();
        assert!(matches!(err, CloudgramError::Io(_)));
    }

    #[test]
    fn test_sweep_removes_expired_files() {
        let temp = tempfile::tempdir().unwrap();
        let dir = OutputDir::create(temp.path()).unwrap();
        let old = touch(temp.path(), "old_000001.png", Duration::from_secs(3600));
        let fresh = touch(temp.path(), "fresh_000002.png", Duration::from_secs(1));

        let policy = RetentionPolicy::new(None, Some(Duration::from_secs(600)));
        let report = dir.sweep(&policy).unwrap();

        assert_eq!(report.removed(), [old.clone()]);
        assert_eq!(report.retained(), 1);
        assert!(!old.exists());
        assert!(fresh.exists());
    }

    #[test]
    fn test_sweep_enforces_count_oldest_first() {
        let temp = tempfile::tempdir().unwrap();
        let dir = OutputDir::create(temp.path()).unwrap();
        let oldest = touch(temp.path(), "a_000001.png", Duration::from_secs(300));
        let middle = touch(temp.path(), "b_000002.png", Duration::from_secs(200));
        let newest = touch(temp.path(), "c_000003.png", Duration::from_secs(100));

        let report = dir.sweep(&RetentionPolicy::new(Some(1), None)).unwrap();

        assert_eq!(report.removed(), [oldest, middle]);
        assert_eq!(report.retained(), 1);
        assert!(newest.exists());
    }

    #[test]
    fn test_sweep_ignores_foreign_files() {
        let temp = tempfile::tempdir().unwrap();
        let dir = OutputDir::create(temp.path()).unwrap();
        let notes = touch(temp.path(), "notes.png", Duration::from_secs(10_000));
        let readme = touch(temp.path(), "README.md", Duration::from_secs(10_000));

        let policy = RetentionPolicy::new(Some(0), Some(Duration::from_secs(1)));
        let report = dir.sweep(&policy).unwrap();

        assert!(report.removed().is_empty());
        assert!(notes.exists());
        assert!(readme.exists());
    }

    #[test]
    fn test_sweep_without_bounds_keeps_everything() {
        let temp = tempfile::tempdir().unwrap();
        let dir = OutputDir::create(temp.path()).unwrap();
        touch(temp.path(), "a_000001.png", Duration::from_secs(10_000));

        let report = dir.sweep(&RetentionPolicy::new(None, None)).unwrap();
        assert!(report.removed().is_empty());
        assert_eq!(report.retained(), 1);
    }

    proptest! {
        #[test]
        fn prop_slug_is_filesystem_safe(title in ".*") {
            let slug = slugify(&title);
            prop_assert!(!slug.is_empty());
            prop_assert!(slug.chars().count() <= MAX_SLUG_CHARS);
            prop_assert!(!slug.contains(['/', '\\', '.', ' ', '\0']));
            prop_assert!(slug.chars().all(|c| c.is_alphanumeric() || c == '-' || c == '_'));
        }

        #[test]
        fn prop_slug_names_are_recognised(title in "[A-Za-z0-9 _-]{1,40}") {
            let name = format!("{}_{}.png", slugify(&title), random_suffix());
            prop_assert!(is_rendered_name(&name));
        }
    }
}

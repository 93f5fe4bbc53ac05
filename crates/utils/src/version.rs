use std::sync::LazyLock;

/// Git commit the binary was built from, when the build script could read it.
const COMMIT_SHA: Option<&str> = option_env!("VERGEN_GIT_SHA");

/// Whether the working tree had uncommitted changes at build time.
const GIT_DIRTY: Option<&str> = option_env!("VERGEN_GIT_DIRTY");

/// Defines the application version.
pub static VERSION: LazyLock<String> = LazyLock::new(|| {
    format_version(env!("IMAGE_VERSION"), COMMIT_SHA, GIT_DIRTY)
});

fn format_version(image_version: &str, sha: Option<&str>, dirty: Option<&str>) -> String {
    format!(
        "{}-{}{}",
        image_version,
        sha.unwrap_or("unknown"),
        if dirty == Some("true") { "-dirty" } else { "" }
    )
}

#[cfg(test)]
mod tests {
    use similar_asserts::assert_eq;

    use super::*;

    #[test]
    fn version_without_git_metadata() {
        assert_eq!(format_version("latest", None, None), "latest-unknown");
    }

    #[test]
    fn version_marks_dirty_tree() {
        assert_eq!(
            format_version("1.2.0", Some("abc123"), Some("true")),
            "1.2.0-abc123-dirty"
        );
        assert_eq!(
            format_version("1.2.0", Some("abc123"), Some("false")),
            "1.2.0-abc123"
        );
    }
}

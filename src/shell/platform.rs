//! Platform detection.

/// Check if running in a CI environment.
///
/// Used to force non-interactive output in `main()`, and to suppress
/// spinners in [`NonInteractiveUI`](crate::ui::NonInteractiveUI).
/// Checks common CI environment variables: `CI`, `GITHUB_ACTIONS`,
/// `GITLAB_CI`, `CIRCLECI`, `TRAVIS`, `JENKINS_URL`.
pub fn is_ci() -> bool {
    CI_VARS.iter().any(|var| std::env::var(var).is_ok())
}

const CI_VARS: [&str; 6] = [
    "CI",
    "GITHUB_ACTIONS",
    "GITLAB_CI",
    "CIRCLECI",
    "TRAVIS",
    "JENKINS_URL",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_ci_detects_ci_var() {
        let saved = std::env::var("CI").ok();
        std::env::set_var("CI", "true");
        let detected = is_ci();
        match saved {
            Some(v) => std::env::set_var("CI", v),
            None => std::env::remove_var("CI"),
        }
        assert!(detected);
    }
}

use serde::{Deserialize, Serialize};

use deploy_defs::RepoApp;

/// The closed set of build backends. Selection is a pure function of the
/// detected app facts; each backend implementation stays independently
/// testable behind the `AppBuilder` interface.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BuildBackend {
    Docker,
    Buildpack,
    Static,
}

pub fn select_build_backend(app: &RepoApp) -> BuildBackend {
    if app.is_static() {
        BuildBackend::Static
    } else if app.has_dockerfile {
        BuildBackend::Docker
    } else {
        BuildBackend::Buildpack
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deploy_defs::AppRole;
    use pretty_assertions::assert_eq;

    fn app() -> RepoApp {
        RepoApp {
            role: AppRole::Api,
            language: "python".to_string(),
            framework: Some("flask".to_string()),
            has_dockerfile: false,
            build_command: None,
            start_command: Some("gunicorn app:app".to_string()),
            ports: vec![5000],
            needs_db: false,
            path: ".".to_string(),
        }
    }

    #[test]
    fn test_dockerfile_wins_over_buildpack() {
        let mut a = app();
        a.has_dockerfile = true;
        assert_eq!(select_build_backend(&a), BuildBackend::Docker);
    }

    #[test]
    fn test_no_dockerfile_falls_back_to_buildpack() {
        assert_eq!(select_build_backend(&app()), BuildBackend::Buildpack);
    }

    #[test]
    fn test_static_app_uses_static_backend() {
        let mut a = app();
        a.language = "javascript".to_string();
        a.framework = Some("react".to_string());
        a.start_command = None;
        // A dockerfile does not matter for a static artifact
        a.has_dockerfile = true;
        assert_eq!(select_build_backend(&a), BuildBackend::Static);
    }
}

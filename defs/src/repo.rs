use serde::{Deserialize, Serialize};

// Languages whose apps are served as static files without a runtime process
const STATIC_LANGUAGES: &[&str] = &["html", "css", "static"];

// Front-end frameworks whose production build is a static artifact when the
// analyzer found no start command
const FRONTEND_FRAMEWORKS: &[&str] = &["react", "vue", "svelte", "angular", "gatsby", "vite"];

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AppRole {
    Web,
    Api,
    Worker,
    Cron,
}

/// One deployable unit found in the repository by the external analyzer.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RepoApp {
    pub role: AppRole,
    pub language: String,
    #[serde(default)]
    pub framework: Option<String>,
    #[serde(default)]
    pub has_dockerfile: bool,
    #[serde(default)]
    pub build_command: Option<String>,
    #[serde(default)]
    pub start_command: Option<String>,
    #[serde(default)]
    pub ports: Vec<u16>,
    #[serde(default)]
    pub needs_db: bool,
    pub path: String,
}

impl RepoApp {
    pub fn is_static(&self) -> bool {
        let language = self.language.to_lowercase();
        if STATIC_LANGUAGES.contains(&language.as_str()) {
            return true;
        }
        match &self.framework {
            Some(framework) => {
                FRONTEND_FRAMEWORKS.contains(&framework.to_lowercase().as_str())
                    && self.start_command.is_none()
            }
            None => false,
        }
    }

    pub fn is_http(&self) -> bool {
        matches!(self.role, AppRole::Web | AppRole::Api) && !self.is_static()
    }

    pub fn is_background(&self) -> bool {
        matches!(self.role, AppRole::Worker | AppRole::Cron)
    }

    pub fn has_framework(&self, name: &str) -> bool {
        self.framework
            .as_deref()
            .is_some_and(|f| f.eq_ignore_ascii_case(name))
    }
}

/// Detected repository shape. `path` is unique per app within one `RepoFacts`.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct RepoFacts {
    #[serde(default)]
    pub apps: Vec<RepoApp>,
    #[serde(default)]
    pub monorepo: bool,
}

impl RepoFacts {
    pub fn from_apps(apps: Vec<RepoApp>) -> Self {
        let monorepo = apps.len() > 1;
        RepoFacts { apps, monorepo }
    }

    /// The app the build and variable-patch stages operate on: the first
    /// http app if any, otherwise the first detected app.
    pub fn primary_app(&self) -> Option<&RepoApp> {
        self.apps
            .iter()
            .find(|a| a.is_http())
            .or_else(|| self.apps.first())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn static_app() -> RepoApp {
        RepoApp {
            role: AppRole::Web,
            language: "javascript".to_string(),
            framework: Some("react".to_string()),
            has_dockerfile: false,
            build_command: Some("npm run build".to_string()),
            start_command: None,
            ports: vec![],
            needs_db: false,
            path: "frontend".to_string(),
        }
    }

    #[test]
    fn test_frontend_without_start_command_is_static() {
        let app = static_app();
        assert!(app.is_static());
        assert!(!app.is_http());
    }

    #[test]
    fn test_frontend_with_start_command_is_http() {
        let mut app = static_app();
        app.start_command = Some("npm run start".to_string());
        assert!(!app.is_static());
        assert!(app.is_http());
    }

    #[test]
    fn test_monorepo_flag_follows_app_count() {
        let facts = RepoFacts::from_apps(vec![static_app()]);
        assert!(!facts.monorepo);
        let mut api = static_app();
        api.path = "api".to_string();
        let facts = RepoFacts::from_apps(vec![static_app(), api]);
        assert!(facts.monorepo);
    }

    #[test]
    fn test_primary_app_prefers_http() {
        let mut api = static_app();
        api.framework = Some("flask".to_string());
        api.language = "python".to_string();
        api.path = "api".to_string();
        let facts = RepoFacts::from_apps(vec![static_app(), api]);
        assert_eq!(facts.primary_app().unwrap().path, "api");
    }
}

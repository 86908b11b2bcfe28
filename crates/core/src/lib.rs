pub mod dashboard;
pub mod domain;
pub mod export;
pub mod form;
pub mod llm;
pub mod ratios;
pub mod session;

pub mod config {
    use anyhow::Context;

    #[derive(Debug, Clone, Default)]
    pub struct Settings {
        pub gemini_api_key: Option<String>,
        pub gemini_base_url: Option<String>,
        pub gemini_model: Option<String>,
        pub gemini_timeout_secs: Option<u64>,
        pub gemini_temperature: Option<f32>,
        pub sentry_dsn: Option<String>,
        pub port: Option<u16>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Ok(Self {
                gemini_api_key: non_empty_var("GEMINI_API_KEY")
                    .or_else(|| non_empty_var("GOOGLE_API_KEY"))
                    .or_else(|| non_empty_var("API_KEY")),
                gemini_base_url: non_empty_var("GEMINI_BASE_URL"),
                gemini_model: non_empty_var("GEMINI_MODEL"),
                gemini_timeout_secs: parse_var("GEMINI_TIMEOUT_SECS")?,
                gemini_temperature: parse_var("GEMINI_TEMPERATURE")?,
                sentry_dsn: non_empty_var("SENTRY_DSN"),
                port: parse_var("PORT")?,
            })
        }

        pub fn require_gemini_api_key(&self) -> anyhow::Result<&str> {
            self.gemini_api_key
                .as_deref()
                .context("GEMINI_API_KEY is required")
        }
    }

    fn non_empty_var(key: &str) -> Option<String> {
        std::env::var(key)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    fn parse_var<T>(key: &str) -> anyhow::Result<Option<T>>
    where
        T: std::str::FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        non_empty_var(key)
            .map(|s| {
                s.parse::<T>()
                    .with_context(|| format!("{key} has an invalid value: {s}"))
            })
            .transpose()
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn require_gemini_api_key_reports_missing_key() {
            let settings = Settings::default();
            let err = settings.require_gemini_api_key().unwrap_err();
            assert!(err.to_string().contains("GEMINI_API_KEY"));
        }

        #[test]
        fn require_gemini_api_key_returns_configured_key() {
            let settings = Settings {
                gemini_api_key: Some("k".to_string()),
                ..Default::default()
            };
            assert_eq!(settings.require_gemini_api_key().unwrap(), "k");
        }
    }
}

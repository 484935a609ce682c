//! Application configuration from environment variables.

pub const ENV_BIND_ADDR: &str = "BIND_ADDR";
pub const ENV_AWS_REGION: &str = "AWS_REGION";
pub const ENV_AWS_DEFAULT_REGION: &str = "AWS_DEFAULT_REGION";
pub const ENV_TABLE_NAME: &str = "DYNAMODB_TABLE_NAME";
pub const ENV_CONTROL_PLANE_URL: &str = "CONTROL_PLANE_URL";
pub const ENV_JWT_SECRET: &str = "JWT_SECRET";
pub const ENV_USING_CUSTOM_DOMAIN: &str = "USING_CUSTOM_DOMAIN";

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_TABLE_NAME: &str = "product";
const DEFAULT_CONTROL_PLANE_URL: &str = "http://127.0.0.1:9000";

/// Resolved process configuration.
///
/// Construction never fails: every knob has a dev-friendly default so the
/// binary starts locally with nothing set, and [`AppConfig::missing_env`]
/// reports which production-required variables were defaulted (surfaced by
/// the health endpoint).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: String,
    pub table_name: String,
    pub control_plane_url: String,
    pub jwt_secret: String,
    pub using_custom_domain: bool,
    missing: Vec<&'static str>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary lookup, so tests never touch process env.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut missing = Vec::new();

        if lookup(ENV_AWS_REGION).is_none() && lookup(ENV_AWS_DEFAULT_REGION).is_none() {
            missing.push(ENV_AWS_REGION);
        }

        let table_name = lookup(ENV_TABLE_NAME).unwrap_or_else(|| {
            missing.push(ENV_TABLE_NAME);
            DEFAULT_TABLE_NAME.to_string()
        });

        let control_plane_url = lookup(ENV_CONTROL_PLANE_URL).unwrap_or_else(|| {
            missing.push(ENV_CONTROL_PLANE_URL);
            DEFAULT_CONTROL_PLANE_URL.to_string()
        });

        let jwt_secret = lookup(ENV_JWT_SECRET).unwrap_or_else(|| {
            tracing::warn!("JWT_SECRET not set; using insecure dev default");
            "dev-secret".to_string()
        });

        let using_custom_domain = lookup(ENV_USING_CUSTOM_DOMAIN)
            .map(|v| v == "true")
            .unwrap_or(false);

        Self {
            bind_addr: lookup(ENV_BIND_ADDR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            table_name,
            control_plane_url,
            jwt_secret,
            using_custom_domain,
            missing,
        }
    }

    /// Production-required variables that were absent and defaulted.
    pub fn missing_env(&self) -> &[&'static str] {
        &self.missing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from<'a>(map: &'a HashMap<&'a str, &'a str>) -> impl Fn(&str) -> Option<String> + 'a {
        move |key| map.get(key).map(|v| v.to_string())
    }

    #[test]
    fn full_env_leaves_nothing_missing() {
        let env = HashMap::from([
            (ENV_AWS_REGION, "ap-northeast-2"),
            (ENV_TABLE_NAME, "product"),
            (ENV_CONTROL_PLANE_URL, "https://cp.example.com"),
            (ENV_JWT_SECRET, "s3cret"),
        ]);

        let config = AppConfig::from_lookup(lookup_from(&env));
        assert!(config.missing_env().is_empty());
        assert_eq!(config.control_plane_url, "https://cp.example.com");
        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR);
    }

    #[test]
    fn empty_env_defaults_and_reports_missing() {
        let env = HashMap::new();
        let config = AppConfig::from_lookup(lookup_from(&env));

        assert_eq!(config.table_name, DEFAULT_TABLE_NAME);
        assert_eq!(config.jwt_secret, "dev-secret");
        assert_eq!(
            config.missing_env(),
            &[ENV_AWS_REGION, ENV_TABLE_NAME, ENV_CONTROL_PLANE_URL]
        );
    }

    #[test]
    fn default_region_env_satisfies_the_region_check() {
        let env = HashMap::from([
            (ENV_AWS_DEFAULT_REGION, "ap-northeast-2"),
            (ENV_TABLE_NAME, "product"),
            (ENV_CONTROL_PLANE_URL, "https://cp.example.com"),
        ]);

        let config = AppConfig::from_lookup(lookup_from(&env));
        assert!(config.missing_env().is_empty());
    }

    #[test]
    fn custom_domain_flag_parses_true_only() {
        for (raw, expected) in [("true", true), ("false", false), ("yes", false)] {
            let env = HashMap::from([(ENV_USING_CUSTOM_DOMAIN, raw)]);
            let config = AppConfig::from_lookup(lookup_from(&env));
            assert_eq!(config.using_custom_domain, expected, "raw={raw}");
        }
    }
}

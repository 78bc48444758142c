//! Connection settings for the PostgREST (Supabase) endpoint.

use crate::errors::{EmissionsError, EmissionsResult};

#[derive(Clone, Debug)]
pub struct EmissionsConfig {
    /// Project URL, e.g. `https://xyz.supabase.co`. `/rest/v1` is appended.
    pub base_url: String,
    /// Anon or service key, sent as `apikey` and bearer token.
    pub api_key: String,
    pub timeout_secs: u64,
}

impl EmissionsConfig {
    /// Reads `SUPABASE_URL`, `SUPABASE_KEY` and `EMISSIONS_TIMEOUT_SECS` (default 10).
    pub fn from_env() -> EmissionsResult<Self> {
        let base_url = required("SUPABASE_URL")?;
        let api_key = required("SUPABASE_KEY")?;
        let timeout_secs = match std::env::var("EMISSIONS_TIMEOUT_SECS") {
            Ok(v) if !v.trim().is_empty() => v.trim().parse().map_err(|_| {
                EmissionsError::Config(format!("EMISSIONS_TIMEOUT_SECS must be an integer, got {v:?}"))
            })?,
            _ => 10,
        };

        let cfg = Self {
            base_url,
            api_key,
            timeout_secs,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> EmissionsResult<()> {
        let url = self.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(EmissionsError::Config(
                "SUPABASE_URL must start with http:// or https://".into(),
            ));
        }
        if self.api_key.trim().is_empty() {
            return Err(EmissionsError::Config("SUPABASE_KEY is empty".into()));
        }
        Ok(())
    }

    /// `{base_url}/rest/v1`, tolerant of trailing slashes and an already-present suffix.
    pub fn rest_url(&self) -> String {
        let base = self.base_url.trim().trim_end_matches('/');
        if base.ends_with("/rest/v1") {
            base.to_string()
        } else {
            format!("{base}/rest/v1")
        }
    }
}

fn required(name: &str) -> EmissionsResult<String> {
    match std::env::var(name) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(EmissionsError::Config(format!(
            "missing required environment variable: {name}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(url: &str) -> EmissionsConfig {
        EmissionsConfig {
            base_url: url.into(),
            api_key: "anon".into(),
            timeout_secs: 10,
        }
    }

    #[test]
    fn rest_url_normalization() {
        assert_eq!(cfg("https://x.supabase.co/").rest_url(), "https://x.supabase.co/rest/v1");
        assert_eq!(cfg("https://x.supabase.co/rest/v1/").rest_url(), "https://x.supabase.co/rest/v1");
    }

    #[test]
    fn validate_requires_scheme_and_key() {
        assert!(cfg("x.supabase.co").validate().is_err());
        let mut c = cfg("https://x.supabase.co");
        c.api_key = " ".into();
        assert!(c.validate().is_err());
    }
}

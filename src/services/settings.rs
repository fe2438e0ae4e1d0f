use anyhow::Result;

use super::kv::KvStore;

pub const API_KEY_KEY: &str = "gemini_api_key";
pub const BASE_URL_KEY: &str = "gemini_base_url";

/// The two persisted settings: credential and optional alternate
/// endpoint. Empty strings mean "unset" (use the environment default /
/// the provider's default endpoint).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiSettings {
    pub api_key: String,
    pub base_url: String,
}

impl ApiSettings {
    pub fn load(kv: &dyn KvStore) -> Self {
        Self {
            api_key: kv.get(API_KEY_KEY).ok().flatten().unwrap_or_default(),
            base_url: kv.get(BASE_URL_KEY).ok().flatten().unwrap_or_default(),
        }
    }

    pub fn save(&self, kv: &dyn KvStore) -> Result<()> {
        kv.set(API_KEY_KEY, &self.api_key)?;
        kv.set(BASE_URL_KEY, &self.base_url)?;
        Ok(())
    }

    /// The alternate endpoint, when one is configured.
    pub fn base_url_override(&self) -> Option<String> {
        if self.base_url.is_empty() {
            None
        } else {
            Some(self.base_url.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::kv::MemoryKv;

    #[test]
    fn round_trips_and_defaults_empty() {
        let kv = MemoryKv::new();
        let loaded = ApiSettings::load(&kv);
        assert_eq!(loaded, ApiSettings::default());
        assert_eq!(loaded.base_url_override(), None);

        let settings = ApiSettings {
            api_key: "sk-123".into(),
            base_url: "https://proxy.example/v1beta".into(),
        };
        settings.save(&kv).unwrap();

        let reloaded = ApiSettings::load(&kv);
        assert_eq!(reloaded, settings);
        assert_eq!(
            reloaded.base_url_override().as_deref(),
            Some("https://proxy.example/v1beta")
        );
    }
}

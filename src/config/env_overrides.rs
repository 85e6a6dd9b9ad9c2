use super::Config;

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

impl Config {
    pub fn apply_env_overrides(&mut self) {
        if let Some(key) = non_empty_var("SKYCHAT_API_KEY") {
            self.settings_overrides.api_key = Some(key);
        }

        if let Some(url) = non_empty_var("SKYCHAT_BASE_URL") {
            self.settings_overrides.api_base_url = Some(url);
        }

        if let Some(model) = non_empty_var("SKYCHAT_MODEL") {
            self.settings_overrides.model = Some(model);
        }

        if let Some(dir) = non_empty_var("SKYCHAT_DATA_DIR") {
            self.data_dir = dir;
        }

        if let Some(temp_str) = non_empty_var("SKYCHAT_TEMPERATURE")
            && let Ok(temp) = temp_str.parse::<f64>()
            && (0.0..=2.0).contains(&temp)
        {
            self.temperature = temp;
        }
    }
}

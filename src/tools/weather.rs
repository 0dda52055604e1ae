//! Weather lookup tool backed by wttr.in.

use async_trait::async_trait;

use super::Tool;

pub const DEFAULT_WEATHER_URL: &str = "https://wttr.in";

/// Current conditions for a city, e.g. "The weather in Lisbon is Sunny +20°C.".
pub struct GetWeather {
    base_url: String,
    client: reqwest::Client,
}

impl GetWeather {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn url_for(&self, city: &str) -> String {
        // %C = condition, %t = temperature
        format!(
            "{}/{}?format=%C+%t",
            self.base_url,
            urlencoding::encode(&city.to_lowercase())
        )
    }
}

impl Default for GetWeather {
    fn default() -> Self {
        Self::new(DEFAULT_WEATHER_URL)
    }
}

#[async_trait]
impl Tool for GetWeather {
    fn name(&self) -> &str {
        "get_weather"
    }

    fn description(&self) -> &str {
        "Takes a city name as the input string and returns the current weather in that city."
    }

    async fn execute(&self, input: &str) -> anyhow::Result<String> {
        let city = input.trim();
        if city.is_empty() {
            return Err(anyhow::anyhow!("Missing city name"));
        }

        let response = self.client.get(self.url_for(city)).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(anyhow::anyhow!(
                "Failed to fetch weather for {} (HTTP {})",
                city,
                status.as_u16()
            ));
        }

        let body = response.text().await?;
        Ok(format!("The weather in {} is {}.", city, body.trim()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_lowercases_and_encodes_city() {
        let tool = GetWeather::new("https://wttr.in/");
        assert_eq!(
            tool.url_for("New York"),
            "https://wttr.in/new%20york?format=%C+%t"
        );
    }

    #[tokio::test]
    async fn empty_city_is_an_error() {
        let tool = GetWeather::default();
        let err = tool.execute("   ").await.unwrap_err();
        assert!(err.to_string().contains("Missing city"));
    }
}

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

use crate::tool::{Tool, ToolError, ToolInput, ToolOutput};

const GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";
const FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";

#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    #[serde(default)]
    results: Vec<GeocodingResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodingResult {
    name: String,
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current_weather: Option<CurrentWeather>,
}

#[derive(Debug, Deserialize)]
struct CurrentWeather {
    temperature: f64,
    windspeed: f64,
    weathercode: u32,
    #[serde(default)]
    time: Option<String>,
}

/// Current conditions for a city via the Open-Meteo geocoding and
/// forecast APIs. Unknown cities come back as an error payload rather
/// than a hard failure, so the model can tell the user.
pub struct WeatherTool {
    client: Client,
}

impl WeatherTool {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self { client })
    }

    async fn geocode(&self, city: &str) -> Result<Option<GeocodingResult>> {
        let response = self
            .client
            .get(GEOCODING_URL)
            .query(&[("name", city), ("count", "1")])
            .send()
            .await?
            .error_for_status()?;

        let geocoding: GeocodingResponse = response.json().await?;
        Ok(geocoding.results.into_iter().next())
    }

    async fn current_weather(&self, latitude: f64, longitude: f64) -> Result<Option<CurrentWeather>> {
        let response = self
            .client
            .get(FORECAST_URL)
            .query(&[
                ("latitude", latitude.to_string()),
                ("longitude", longitude.to_string()),
                ("current_weather", "true".to_string()),
            ])
            .send()
            .await?
            .error_for_status()?;

        let forecast: ForecastResponse = response.json().await?;
        Ok(forecast.current_weather)
    }
}

/// Human-readable label for a WMO weather interpretation code.
pub fn describe_weather_code(code: u32) -> &'static str {
    match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 => "Fog",
        48 => "Depositing rime fog",
        51 => "Light drizzle",
        53 => "Drizzle",
        55 => "Dense drizzle",
        56 => "Freezing drizzle",
        57 => "Dense freezing drizzle",
        61 => "Slight rain",
        63 => "Rain",
        65 => "Heavy rain",
        66 => "Freezing rain",
        67 => "Heavy freezing rain",
        71 => "Slight snow",
        73 => "Snow",
        75 => "Heavy snow",
        77 => "Snow grains",
        80 => "Slight rain showers",
        81 => "Rain showers",
        82 => "Violent rain showers",
        85 => "Slight snow showers",
        86 => "Heavy snow showers",
        95 => "Thunderstorm",
        96 => "Thunderstorm with hail",
        99 => "Heavy thunderstorm with hail",
        _ => "Unknown",
    }
}

#[async_trait]
impl Tool for WeatherTool {
    fn name(&self) -> &str {
        "get_weather"
    }

    fn description(&self) -> &str {
        "Gets the current weather for a city: temperature, wind speed and conditions."
    }

    fn parameters(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "city": {
                    "type": "string",
                    "description": "Name of the city"
                }
            },
            "required": ["city"]
        })
    }

    async fn execute(&self, input: ToolInput) -> Result<ToolOutput, ToolError> {
        self.validate_input(&input)?;

        let city: String = input
            .get_argument("city")
            .map_err(|e| ToolError::new(self.name().to_string(), e.to_string(), false))?;

        let location = self
            .geocode(&city)
            .await
            .map_err(|e| ToolError::new(self.name().to_string(), e.to_string(), true))?;

        let Some(location) = location else {
            return ToolOutput::success(json!({"error": "City not found"}))
                .map_err(|e| ToolError::new(self.name().to_string(), e.to_string(), false));
        };

        debug!(city = %location.name, lat = location.latitude, lon = location.longitude, "geocoded city");

        let weather = self
            .current_weather(location.latitude, location.longitude)
            .await
            .map_err(|e| ToolError::new(self.name().to_string(), e.to_string(), true))?;

        let Some(weather) = weather else {
            return ToolOutput::success(json!({"error": "Weather data not found"}))
                .map_err(|e| ToolError::new(self.name().to_string(), e.to_string(), false));
        };

        ToolOutput::success(json!({
            "city": location.name,
            "country": location.country,
            "temp": weather.temperature,
            "wind": weather.windspeed,
            "desc": describe_weather_code(weather.weathercode),
            "time": weather.time,
        }))
        .map_err(|e| ToolError::new(self.name().to_string(), e.to_string(), false))
    }
}

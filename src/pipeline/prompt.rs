use crate::weather::WeatherRecord;

/// Section markers of the crisis report, in the order the model is asked to emit them.
pub const REPORT_SECTIONS: [&str; 6] = [
    "🌾 Crisis Report:",
    "🔍 Current Weather Summary:",
    "🚨 Detected Crisis (if any):",
    "🛡 Suggested Mitigation Strategy:",
    "📢 Emergency Support Instructions:",
    "📦 Recommended Resources:",
];

/// Fills the fixed crisis-report template with `weather`.
///
/// Values are rendered exactly as supplied (`32`, `2.1`) followed by their unit.
pub fn build_prompt(weather: &WeatherRecord) -> String {
    format!(
        "
You're an expert crisis response AI for farmers. Based on this weather data:
- Temperature: {temperature}°C
- Humidity: {humidity}%
- Condition: {condition}
- Wind Speed: {wind_speed} m/s
- Rainfall: {rainfall} mm

Analyze for agricultural emergencies like:
1. Flood
2. Drought
3. Pest Outbreak
4. Cyclone
5. Market Crash

Output should be structured in this format:

🌾 Crisis Report:
-----------------------
🔍 Current Weather Summary:
(temp, humidity, rainfall, etc.)

🚨 Detected Crisis (if any):
[List all that may occur based on data]

🛡 Suggested Mitigation Strategy:
[Details + precautions]

📢 Emergency Support Instructions:
[What the farmer should do]

📦 Recommended Resources:
[List items like pesticides, covers, crop insurance links, etc.]

Make it easy to read and useful.
",
        temperature = weather.temperature,
        humidity = weather.humidity,
        condition = weather.condition,
        wind_speed = weather.wind_speed,
        rainfall = weather.rainfall,
    )
}

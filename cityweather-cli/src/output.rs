use std::fmt::Write;

use cityweather_core::{ForecastResult, HistoryEntry, WeatherObservation};

pub fn render_forecast(forecast: &ForecastResult) -> String {
    let current = forecast.current();
    let mut out = String::new();

    let _ = writeln!(out, "Weather in {} ({})", current.city, current.date);
    let _ = writeln!(out, "  {}", current.condition_text);
    let _ = writeln!(out, "  Temperature: {:.1}°F", current.temperature_f);
    let _ = writeln!(out, "  Wind Speed:  {:.1} m/s", current.wind_speed);
    let _ = writeln!(out, "  Humidity:    {:.0}%", current.humidity);

    if forecast.days().is_empty() {
        let _ = writeln!(out, "\nNo daily forecast available.");
        return out;
    }

    let _ = writeln!(out, "\nForecast:");
    for day in forecast.days() {
        let _ = writeln!(out, "  {}", forecast_line(day));
    }
    out
}

fn forecast_line(day: &WeatherObservation) -> String {
    format!(
        "{:<12} {:>6.1}°F  {:>5.1} m/s  {:>3.0}%  {}",
        day.date, day.temperature_f, day.wind_speed, day.humidity, day.condition_text
    )
}

pub fn render_history(entries: &[HistoryEntry]) -> String {
    if entries.is_empty() {
        return "No cities searched yet.\n".to_string();
    }

    entries
        .iter()
        .map(|entry| format!("{}  {}\n", entry.id, entry.name))
        .collect()
}

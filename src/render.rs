//! Plain-text rendering for command output

use std::fmt::Write;

use crate::cache::CacheStats;
use crate::data::{CurrentWeather, Forecast, HourlyForecast, Location};
use crate::service::Cached;
use crate::units::TemperatureUnit;

/// "(cached, expires in 42s)" or "(live)"
fn cache_note<T>(cached: &Cached<T>) -> String {
    if cached.from_cache {
        format!("(cached, expires in {}s)", cached.cache_time_remaining)
    } else {
        "(live)".to_string()
    }
}

/// Current conditions block
pub fn current(weather: &Cached<CurrentWeather>, unit: TemperatureUnit) -> String {
    let location = &weather.data.location;
    let now = &weather.data.current;
    let mut out = String::new();

    let _ = writeln!(out, "{} {}", location.display_name(), cache_note(weather));
    let _ = writeln!(
        out,
        "  {} (feels like {}), {}",
        unit.format(now.temp_c),
        unit.format(now.feelslike_c),
        now.condition.text
    );
    let _ = writeln!(
        out,
        "  Humidity {}%  Wind {:.0} km/h {}  Pressure {:.0} mb  UV {:.1}",
        now.humidity, now.wind_kph, now.wind_dir, now.pressure_mb, now.uv
    );
    if !now.last_updated.is_empty() {
        let _ = writeln!(out, "  Updated {}", now.last_updated);
    }
    out
}

/// One line per forecast day
pub fn forecast(forecast: &Cached<Forecast>, unit: TemperatureUnit) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}-day forecast for {} {}",
        forecast.data.forecast.forecastday.len(),
        forecast.data.location.display_name(),
        cache_note(forecast)
    );
    for day in &forecast.data.forecast.forecastday {
        let _ = writeln!(
            out,
            "  {}  {:>6} / {:<6} {:>3}% rain  {}",
            day.date,
            unit.format(day.day.maxtemp_c),
            unit.format(day.day.mintemp_c),
            day.day.daily_chance_of_rain,
            day.day.condition.text
        );
    }
    out
}

/// One line per forecast hour
pub fn hourly(hourly: &Cached<HourlyForecast>, unit: TemperatureUnit) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Next {} hours for {} {}",
        hourly.data.hourly.len(),
        hourly.data.location.display_name(),
        cache_note(hourly)
    );
    for hour in &hourly.data.hourly {
        let _ = writeln!(
            out,
            "  {}  {:>6}  {:>3}% rain  {:>3.0} km/h  {}",
            hour.time,
            unit.format(hour.temp_c),
            hour.chance_of_rain,
            hour.wind_kph,
            hour.condition.text
        );
    }
    out
}

/// Numbered list of search matches
pub fn search(query: &str, results: &Cached<Vec<Location>>) -> String {
    let mut out = String::new();
    if results.data.is_empty() {
        let _ = writeln!(out, "No cities found for \"{}\"", query.trim());
        return out;
    }
    let _ = writeln!(out, "Cities matching \"{}\" {}", query.trim(), cache_note(results));
    for (i, location) in results.data.iter().enumerate() {
        let _ = writeln!(
            out,
            "  {}. {} ({:.2}, {:.2})",
            i + 1,
            location.display_name(),
            location.lat,
            location.lon
        );
    }
    out
}

/// Cache summary plus one line per entry
pub fn cache_stats(stats: &CacheStats) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Cache: {} entries ({} valid, {} expired)",
        stats.total_entries,
        stats.valid_count(),
        stats.expired_count()
    );
    for entry in &stats.entries {
        let _ = writeln!(
            out,
            "  {:<40} {:>4}s {}",
            entry.key,
            entry.age_secs,
            if entry.expired { "expired" } else { "valid" }
        );
    }
    out
}

//! Turn a route response into a short, human-readable summary.

use serde::{Deserialize, Serialize};

use crate::locale::{Locale, ManeuverType, Modifier};
use crate::response::{EngineResponse, Step, Waypoint};

/// Readable digest of the best route in a response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSummary {
    pub distance_km: f64,
    pub duration_min: f64,
    pub legs: Vec<LegSummary>,
    /// Total line followed by one line per leg, newline separated.
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegSummary {
    pub origin: String,
    pub destination: String,
    pub distance_km: f64,
    pub duration_min: f64,
    pub summary: String,
    pub steps: Vec<StepSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepSummary {
    pub instruction: String,
    pub distance_km: f64,
    pub duration_min: f64,
}

/// Summarize the first route of `response`.
///
/// Never fails: missing routes produce an empty summary with the localized
/// "no route" message, missing names produce placeholders.
pub fn summarize(response: &EngineResponse, locale: Locale) -> RouteSummary {
    let Some(route) = response.best_route() else {
        return RouteSummary {
            distance_km: 0.0,
            duration_min: 0.0,
            legs: Vec::new(),
            message: locale.no_route().to_string(),
        };
    };

    let names: Vec<String> = response
        .waypoints()
        .iter()
        .enumerate()
        .map(|(index, waypoint)| waypoint_name(waypoint, index + 1, locale))
        .collect();
    let name_or_placeholder = |index: usize| {
        names
            .get(index)
            .cloned()
            .unwrap_or_else(|| locale.point(index + 1))
    };

    let distance_km = meters_to_km(route.distance);
    let duration_min = seconds_to_minutes(route.duration);
    let mut lines = vec![locale.total_line(distance_km, duration_min)];

    let legs: Vec<LegSummary> = route
        .legs
        .iter()
        .enumerate()
        .map(|(index, leg)| {
            let origin = name_or_placeholder(index);
            let destination = name_or_placeholder(index + 1);
            let leg_km = meters_to_km(leg.distance);
            let leg_min = seconds_to_minutes(leg.duration);

            lines.push(locale.leg_line(index + 1, &origin, &destination, leg_km, leg_min));

            let summary = match leg.summary.as_deref() {
                Some(text) if !text.trim().is_empty() => text.to_string(),
                _ => locale.unnamed_segment().to_string(),
            };

            let steps = leg
                .steps
                .iter()
                .map(|step| StepSummary {
                    instruction: describe_step(step, locale),
                    distance_km: meters_to_km(step.distance),
                    duration_min: seconds_to_minutes(step.duration),
                })
                .collect();

            LegSummary {
                origin,
                destination,
                distance_km: leg_km,
                duration_min: leg_min,
                summary,
                steps,
            }
        })
        .collect();

    RouteSummary {
        distance_km,
        duration_min,
        legs,
        message: lines.join("\n"),
    }
}

/// Meters to kilometers, rounded to 2 decimals (ties to even).
pub fn meters_to_km(meters: f64) -> f64 {
    (meters / 1000.0 * 100.0).round_ties_even() / 100.0
}

/// Seconds to minutes, rounded to 1 decimal (ties to even).
pub fn seconds_to_minutes(seconds: f64) -> f64 {
    (seconds / 60.0 * 10.0).round_ties_even() / 10.0
}

/// Display name for a waypoint; `index` is 1-based.
///
/// Unnamed waypoints show their location as `lat,lon` with 5 decimals.
pub fn waypoint_name(waypoint: &Waypoint, index: usize, locale: Locale) -> String {
    if let Some(name) = waypoint.name.as_deref().filter(|n| !n.is_empty()) {
        return name.to_string();
    }
    match waypoint.location.as_slice() {
        [lon, lat, ..] => format!("{:.5},{:.5}", lat, lon),
        _ => locale.point(index),
    }
}

/// One-line instruction for a step.
pub fn describe_step(step: &Step, locale: Locale) -> String {
    let kind = step.maneuver.kind.as_deref().map(ManeuverType::parse);
    let base = match kind {
        Some(Some(maneuver)) => locale.maneuver(maneuver),
        _ => locale.generic(),
    };

    let suffix = step
        .maneuver
        .modifier
        .as_deref()
        .filter(|m| !m.is_empty())
        .map(|m| Modifier::parse(m).map_or(m, |modifier| locale.modifier(modifier)));

    let mut text = match suffix {
        Some(suffix) => capitalize(format!("{} {}", base, suffix).trim()),
        None => capitalize(base.trim()),
    };

    if let Some(name) = step.name.as_deref().filter(|n| !n.is_empty()) {
        let arriving = step.maneuver.kind.as_deref() == Some("arrive");
        text = format!("{} {} {}", text, locale.preposition(arriving), name);
    }

    if text.is_empty() {
        locale.generic().to_string()
    } else {
        text
    }
}

/// Upper-case the first character and lower-case the rest.
fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Map};

    use super::*;
    use crate::response::Maneuver;

    fn step(kind: Option<&str>, modifier: Option<&str>, name: Option<&str>) -> Step {
        Step {
            distance: 0.0,
            duration: 0.0,
            name: name.map(str::to_string),
            maneuver: Maneuver {
                kind: kind.map(str::to_string),
                modifier: modifier.map(str::to_string),
                extra: Map::new(),
            },
            extra: Map::new(),
        }
    }

    #[test]
    fn empty_routes_give_not_found_summary() {
        let response: EngineResponse =
            serde_json::from_value(json!({"code": "Ok", "routes": []})).unwrap();
        let summary = summarize(&response, Locale::Ru);
        assert_eq!(summary.distance_km, 0.0);
        assert_eq!(summary.duration_min, 0.0);
        assert!(summary.legs.is_empty());
        assert_eq!(summary.message, "Маршрут не найден.");

        let english = summarize(&EngineResponse::with_code("NoRoute"), Locale::En);
        assert_eq!(english.message, "No route found.");
    }

    #[test]
    fn totals_are_rounded() {
        let response: EngineResponse = serde_json::from_value(json!({
            "code": "Ok",
            "routes": [{"distance": 3200.0, "duration": 600.0, "legs": []}]
        }))
        .unwrap();
        let summary = summarize(&response, Locale::En);
        assert_eq!(summary.distance_km, 3.2);
        assert_eq!(summary.duration_min, 10.0);
        assert_eq!(summary.message, "Route: 3.2 km · 10 min");
    }

    #[test]
    fn unit_conversions() {
        assert_eq!(meters_to_km(1234.0), 1.23);
        assert_eq!(meters_to_km(0.0), 0.0);
        assert_eq!(seconds_to_minutes(95.0), 1.6);
    }

    #[test]
    fn exact_ties_round_to_even() {
        assert_eq!(meters_to_km(125.0), 0.12);
        assert_eq!(seconds_to_minutes(15.0), 0.2);
        assert_eq!(seconds_to_minutes(75.0), 1.2);
    }

    #[test]
    fn turn_right_with_name() {
        let s = step(Some("turn"), Some("right"), Some("Pushkinskaya"));
        assert_eq!(describe_step(&s, Locale::En), "Turn right onto Pushkinskaya");
        assert_eq!(describe_step(&s, Locale::Ru), "Поверните направо по Pushkinskaya");
    }

    #[test]
    fn arrive_uses_arrival_preposition() {
        let s = step(Some("arrive"), None, Some("Greek Square"));
        assert_eq!(describe_step(&s, Locale::En), "You have arrived at Greek Square");
        assert_eq!(describe_step(&s, Locale::Ru), "Вы прибыли к Greek Square");
    }

    #[test]
    fn unknown_maneuver_and_modifier() {
        let s = step(Some("notification"), Some("backwards"), None);
        assert_eq!(describe_step(&s, Locale::Ru), "Двигайтесь дальше backwards");

        let bare = step(None, None, None);
        assert_eq!(describe_step(&bare, Locale::En), "Keep going");
    }

    #[test]
    fn capitalization_lowers_the_rest() {
        let s = step(Some("end of road"), Some("left"), None);
        assert_eq!(describe_step(&s, Locale::En), "At the end of the road turn left");
        assert_eq!(capitalize("hELLO"), "Hello");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn waypoint_names_fall_back_to_location_then_placeholder() {
        let unnamed = Waypoint {
            name: Some(String::new()),
            location: vec![30.74, 46.5],
            extra: Map::new(),
        };
        assert_eq!(waypoint_name(&unnamed, 1, Locale::Ru), "46.50000,30.74000");

        let nowhere = Waypoint {
            name: None,
            location: vec![],
            extra: Map::new(),
        };
        assert_eq!(waypoint_name(&nowhere, 3, Locale::Ru), "Точка 3");
        assert_eq!(waypoint_name(&nowhere, 3, Locale::En), "Point 3");
    }

    #[test]
    fn legs_without_waypoints_use_placeholders() {
        let response: EngineResponse = serde_json::from_value(json!({
            "code": "Ok",
            "routes": [{"distance": 10.0, "duration": 6.0, "legs": [{"distance": 10.0, "duration": 6.0, "summary": ""}]}]
        }))
        .unwrap();
        let summary = summarize(&response, Locale::Ru);
        let leg = &summary.legs[0];
        assert_eq!(leg.origin, "Точка 1");
        assert_eq!(leg.destination, "Точка 2");
        assert_eq!(leg.summary, "Безымянный участок");
        assert!(summary.message.ends_with("1) Точка 1 → Точка 2: 0.0 км · 0 мин"));
    }
}

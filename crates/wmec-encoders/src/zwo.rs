// ABOUTME: ZWO Encoder (C10) - Zwift workout XML for running and cycling
// ABOUTME: SteadyState/IntervalsT elements with power/pace intensity attributes, auto-detected or forced sport

use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use wmec_core::domain::{DurationType, Step, StepKind};
use wmec_core::{WmecError, WmecResult};

/// Target sport for a ZWO export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZwoSport {
    /// Zwift `run` sport type.
    Run,
    /// Zwift `bike` sport type.
    Bike,
}

impl ZwoSport {
    const fn tag(self) -> &'static str {
        match self {
            Self::Run => "run",
            Self::Bike => "bike",
        }
    }
}

/// A request to encode a compiled step list as Zwift ZWO XML.
#[derive(Debug, Clone)]
pub struct ZwoExportRequest {
    /// Workout title.
    pub title: String,
    /// Compiled steps.
    pub steps: Vec<Step>,
    /// Forced sport; `None` auto-detects from step display names.
    pub force_sport: Option<ZwoSport>,
}

/// A power target scalar range parsed from an exercise's display name (e.g. "50% FTP").
#[derive(Debug, Clone, Copy)]
struct PowerTarget {
    min: f64,
    max: f64,
}

fn extract_power_target(name: &str) -> Option<PowerTarget> {
    let lower = name.to_lowercase();

    // "50% FTP" / "103% FTP"
    if let Some(pct) = parse_single_ftp_percent(&lower) {
        return Some(PowerTarget { min: pct, max: pct });
    }
    // "85-95% FTP"
    if let Some((min, max)) = parse_ftp_percent_range(&lower) {
        return Some(PowerTarget { min, max });
    }
    None
}

fn parse_single_ftp_percent(lower: &str) -> Option<f64> {
    let idx = lower.find("% ftp").or_else(|| lower.find("%ftp"))?;
    let prefix = &lower[..idx];
    let digits: String = prefix
        .chars()
        .rev()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    if digits.is_empty() || prefix.contains('-') && digits_follow_dash(prefix) {
        return None;
    }
    digits.parse::<f64>().ok().map(|v| v / 100.0)
}

fn digits_follow_dash(prefix: &str) -> bool {
    // Heuristic guard: a trailing run of digits directly preceded by a dash
    // means this is actually a range ("85-95% FTP"), handled separately.
    prefix
        .trim_end()
        .rfind('-')
        .map(|dash| dash + 1 < prefix.len() && prefix[dash + 1..].chars().all(|c| c.is_ascii_digit() || c == '.' || c.is_whitespace()))
        .unwrap_or(false)
}

fn parse_ftp_percent_range(lower: &str) -> Option<(f64, f64)> {
    let ftp_idx = lower.find("% ftp").or_else(|| lower.find("%ftp"))?;
    let prefix = lower[..ftp_idx].trim_end();
    let dash_idx = prefix.rfind('-')?;
    let (low_part, high_part) = prefix.split_at(dash_idx);
    let high_part = &high_part[1..];
    let low: f64 = trailing_number(low_part)?;
    let high: f64 = high_part.trim().parse().ok()?;
    Some((low / 100.0, high / 100.0))
}

fn trailing_number(s: &str) -> Option<f64> {
    let digits: String = s
        .chars()
        .rev()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    if digits.is_empty() {
        None
    } else {
        digits.parse().ok()
    }
}

fn avg_scalar(target: Option<PowerTarget>) -> f64 {
    target.map_or(0.70, |t| ((t.min + t.max) / 2.0).clamp(0.10, 1.50))
}

fn duration_seconds(step: &Step) -> u32 {
    match step.duration {
        Some(DurationType::TimeMs(ms)) => (ms / 1000).max(1),
        Some(DurationType::DistanceCm(cm)) => {
            let meters = f64::from(cm) / 100.0;
            (meters * 0.30).round().max(30.0) as u32
        }
        _ => 60,
    }
}

fn power_percent(scalar: f64) -> i64 {
    (scalar * 100.0).round() as i64
}

fn detect_sport(steps: &[Step]) -> ZwoSport {
    let has_bike_keyword = steps.iter().any(|s| {
        let lower = s.display_name.to_lowercase();
        lower.contains("bike") || lower.contains("watt") || lower.contains("ftp") || lower.contains("cycling")
    });
    if has_bike_keyword {
        ZwoSport::Bike
    } else {
        ZwoSport::Run
    }
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn write_steady_state(out: &mut String, duration_sec: u32, sport: ZwoSport, scalar: f64) {
    match sport {
        ZwoSport::Run => {
            let _ = writeln!(out, r#"    <SteadyState Duration="{duration_sec}" Pace="{scalar:.2}"/>"#);
        }
        ZwoSport::Bike => {
            let _ = writeln!(
                out,
                r#"    <SteadyState Duration="{duration_sec}" Power="{}"/>"#,
                power_percent(scalar)
            );
        }
    }
}

/// Encode a compiled step list as Zwift ZWO XML (§4.10, §6).
pub fn encode_zwo(request: &ZwoExportRequest) -> WmecResult<String> {
    if request.steps.is_empty() {
        return Err(WmecError::encoding("cannot encode a workout with zero steps"));
    }

    let sport = request.force_sport.unwrap_or_else(|| detect_sport(&request.steps));

    let mut body = String::new();
    for step in &request.steps {
        match step.kind {
            StepKind::Repeat => {
                // The run between target and this repeat collapses to a single
                // IntervalsT using the first body step's timing as representative.
                let Some(target) = step.repeat_target else { continue };
                let Some(count) = step.repeat_count else { continue };
                let Some(work_step) = request.steps.get(target) else { continue };
                let on_duration = duration_seconds(work_step);
                let rest_duration = request
                    .steps
                    .get(target + 1)
                    .filter(|s| matches!(s.kind, StepKind::Rest))
                    .map_or(30, duration_seconds);
                let power_target = extract_power_target(&work_step.display_name);
                let scalar = avg_scalar(power_target);
                match sport {
                    ZwoSport::Run => {
                        let _ = writeln!(
                            body,
                            r#"    <IntervalsT Repeat="{count}" OnDuration="{on_duration}" OffDuration="{rest_duration}" OnPace="{scalar:.2}" OffPace="0.90"/>"#
                        );
                    }
                    ZwoSport::Bike => {
                        let _ = writeln!(
                            body,
                            r#"    <IntervalsT Repeat="{count}" OnDuration="{on_duration}" OffDuration="{rest_duration}" OnPower="{}" OffPower="40"/>"#,
                            power_percent(scalar)
                        );
                    }
                }
            }
            StepKind::Rest => {
                let duration_sec = step.duration.map(|_| duration_seconds(step)).unwrap_or(30);
                write_steady_state(&mut body, duration_sec, sport, 0.40);
            }
            StepKind::Exercise | StepKind::Warmup => {
                let duration_sec = duration_seconds(step);
                let power_target = extract_power_target(&step.display_name);
                let scalar = avg_scalar(power_target);
                write_steady_state(&mut body, duration_sec, sport, scalar);
            }
        }
    }

    if body.is_empty() {
        write_steady_state(&mut body, 60, sport, 0.60);
    }

    let mut xml = String::new();
    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str("<workout_file>\n");
    let _ = writeln!(xml, "  <name>{}</name>", xml_escape(&request.title));
    let _ = writeln!(xml, "  <sportType>{}</sportType>", sport.tag());
    xml.push_str("  <description></description>\n");
    xml.push_str("  <workout>\n");
    xml.push_str(&body);
    xml.push_str("  </workout>\n");
    xml.push_str("</workout_file>\n");
    Ok(xml)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wmec_core::domain::Intensity;

    #[test]
    fn rejects_empty_step_list() {
        let request = ZwoExportRequest {
            title: "Empty".to_owned(),
            steps: vec![],
            force_sport: None,
        };
        assert!(encode_zwo(&request).is_err());
    }

    #[test]
    fn power_is_integer_percent_not_decimal() {
        let steps = vec![Step::exercise(
            "Bike Erg 70% FTP",
            Intensity::Active,
            DurationType::TimeMs(60_000),
            2,
            None,
        )];
        let request = ZwoExportRequest {
            title: "Bike Test".to_owned(),
            steps,
            force_sport: Some(ZwoSport::Bike),
        };
        let xml = encode_zwo(&request).expect("encodes");
        assert!(xml.contains(r#"Power="70""#));
        assert!(!xml.contains(r#"Power="0.70""#));
    }

    #[test]
    fn distance_heuristic_applies_minimum_30_seconds() {
        let steps = vec![Step::exercise(
            "Row",
            Intensity::Active,
            DurationType::DistanceCm(5_000),
            23,
            None,
        )];
        let request = ZwoExportRequest {
            title: "Row Test".to_owned(),
            steps,
            force_sport: Some(ZwoSport::Run),
        };
        let xml = encode_zwo(&request).expect("encodes");
        assert!(xml.contains(r#"Duration="30""#));
    }

    #[test]
    fn xml_declaration_is_prepended() {
        let steps = vec![Step::exercise("Run", Intensity::Active, DurationType::TimeMs(60_000), 2, None)];
        let request = ZwoExportRequest {
            title: "Easy Run".to_owned(),
            steps,
            force_sport: None,
        };
        let xml = encode_zwo(&request).expect("encodes");
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
    }
}

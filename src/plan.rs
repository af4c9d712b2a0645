use crate::chasi::PeriodRange;
use serde::Serialize;
use serde_json::{json, Value as JsonValue};

pub const KEY_SUBJECT: &str = "교과";
pub const KEY_GRADE: &str = "학년";
pub const KEY_GRADE_BAND: &str = "학년군";
pub const KEY_UNITS: &str = "단원목록";
pub const KEY_UNIT_NO: &str = "단원번호";
pub const KEY_UNIT_NAME: &str = "단원명";
pub const KEY_TOTAL_PERIODS: &str = "차시수";
pub const KEY_DESCRIPTION: &str = "주요_학습_내용_및_활동";
pub const KEY_ASSIGNMENTS: &str = "차시별_주요_활동";
pub const KEY_PERIODS: &str = "차시";
pub const KEY_LABEL: &str = "구분";
pub const KEY_CONTENT: &str = "내용";

/// `1~2학년`, `3~4학년` or `5~6학년`.
pub fn grade_band(grade: i64) -> &'static str {
    if grade <= 2 {
        "1~2학년"
    } else if grade <= 4 {
        "3~4학년"
    } else {
        "5~6학년"
    }
}

/// Integer-prefix reading of a stored period count; anything unusable is 1.
pub fn parse_total_periods(v: Option<&JsonValue>) -> u32 {
    let parsed = match v {
        Some(JsonValue::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Some(JsonValue::String(s)) => leading_int(s),
        _ => None,
    };
    match parsed {
        Some(n) if n >= 1 => u32::try_from(n).unwrap_or(u32::MAX),
        _ => 1,
    }
}

fn leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, s.strip_prefix('+').unwrap_or(s)),
    };
    let end = digits
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}

fn scalar_string(v: Option<&JsonValue>) -> Option<String> {
    match v? {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Read-only view of one unit record inside an entry's `단원목록`.
#[derive(Debug, Clone, Serialize)]
pub struct UnitRecord {
    #[serde(rename = "단원번호")]
    pub unit_no: Option<JsonValue>,
    #[serde(rename = "단원명")]
    pub name: Option<String>,
    #[serde(rename = "차시수")]
    pub total_periods: Option<JsonValue>,
    #[serde(rename = "주요_학습_내용_및_활동")]
    pub description: Option<String>,
}

impl UnitRecord {
    pub fn from_value(unit: &JsonValue) -> Self {
        UnitRecord {
            unit_no: unit.get(KEY_UNIT_NO).filter(|v| !v.is_null()).cloned(),
            name: unit
                .get(KEY_UNIT_NAME)
                .and_then(|v| v.as_str())
                .map(|s| s.to_string()),
            total_periods: unit.get(KEY_TOTAL_PERIODS).filter(|v| !v.is_null()).cloned(),
            description: unit
                .get(KEY_DESCRIPTION)
                .and_then(|v| v.as_str())
                .map(|s| s.to_string()),
        }
    }

    /// How the unit is named in logs: `3 바른 말 사용하기`.
    pub fn display_id(&self) -> String {
        let no = scalar_string(self.unit_no.as_ref());
        match (no, self.name.as_deref()) {
            (Some(no), Some(name)) => format!("{} {}", no, name),
            (Some(no), None) => no,
            (None, Some(name)) => name.to_string(),
            (None, None) => "(unnamed unit)".to_string(),
        }
    }
}

pub fn has_assignments(unit: &JsonValue) -> bool {
    unit.get(KEY_ASSIGNMENTS)
        .and_then(|v| v.as_array())
        .map(|arr| !arr.is_empty())
        .unwrap_or(false)
}

/// Exact `교과`+`학년` match first, then the grade band.
pub fn find_entry<'a>(plan: &'a [JsonValue], subject: &str, grade: i64) -> Option<&'a JsonValue> {
    let grade_str = grade.to_string();
    let band = grade_band(grade);
    let subject_matches = |e: &&JsonValue| e.get(KEY_SUBJECT).and_then(|v| v.as_str()) == Some(subject);
    plan.iter()
        .filter(subject_matches)
        .find(|e| scalar_string(e.get(KEY_GRADE)).as_deref() == Some(grade_str.as_str()))
        .or_else(|| {
            plan.iter()
                .filter(subject_matches)
                .find(|e| e.get(KEY_GRADE_BAND).and_then(|v| v.as_str()) == Some(band))
        })
}

pub fn entry_units(entry: &JsonValue) -> &[JsonValue] {
    entry
        .get(KEY_UNITS)
        .and_then(|v| v.as_array())
        .map(|v| v.as_slice())
        .unwrap_or(&[])
}

pub fn list_units(entry: &JsonValue) -> Vec<UnitRecord> {
    entry_units(entry).iter().map(UnitRecord::from_value).collect()
}

/// By exact name, by unit number, then by partial name.
pub fn find_unit<'a>(entry: &'a JsonValue, name: &str) -> Option<&'a JsonValue> {
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    let units = entry_units(entry);
    units
        .iter()
        .find(|u| u.get(KEY_UNIT_NAME).and_then(|v| v.as_str()) == Some(name))
        .or_else(|| {
            units
                .iter()
                .find(|u| scalar_string(u.get(KEY_UNIT_NO)).as_deref() == Some(name))
        })
        .or_else(|| {
            units.iter().find(|u| {
                u.get(KEY_UNIT_NAME)
                    .and_then(|v| v.as_str())
                    .map(|n| n.contains(name))
                    .unwrap_or(false)
            })
        })
}

/// The stored assignment covering `lesson` with the narrowest range.
pub fn lesson_activity(unit: &JsonValue, lesson: u32) -> Option<JsonValue> {
    let arr = unit.get(KEY_ASSIGNMENTS)?.as_array()?;
    let mut best: Option<(u32, &JsonValue)> = None;
    for item in arr {
        let Some(range) = item
            .get(KEY_PERIODS)
            .and_then(|v| v.as_str())
            .and_then(|s| s.parse::<PeriodRange>().ok())
        else {
            continue;
        };
        if !range.contains(lesson) {
            continue;
        }
        if best.map(|(len, _)| range.len() < len).unwrap_or(true) {
            best = Some((range.len(), item));
        }
    }
    best.map(|(_, item)| {
        json!({
            "lesson": lesson,
            "차시": item.get(KEY_PERIODS).cloned().unwrap_or(JsonValue::Null),
            "구분": item.get(KEY_LABEL).cloned().unwrap_or_else(|| json!("")),
            "내용": item.get(KEY_CONTENT).cloned().unwrap_or_else(|| json!("")),
        })
    })
}

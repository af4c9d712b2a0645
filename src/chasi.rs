use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

static FRAGMENT_DELIMITER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[,·]\s*|및\s+").expect("fragment delimiter pattern"));
static RANGE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)(?:~(\d+))?$").expect("period range pattern"));

pub const DEFAULT_PREPARATION_KEYWORDS: &[&str] =
    &["배울 내용 살펴보기", "단원 도입", "배움 지도 살펴보기", "준비"];
pub const DEFAULT_WRAPUP_KEYWORDS: &[&str] =
    &["배운 내용 실천", "마무리", "실천하기", "돌아보기", "확인", "정리"];

const LABEL_PREPARATION: &str = "준비";
const LABEL_ACTIVITY_PREFIX: &str = "활동";
const LABEL_PRACTICE_WRAPUP: &str = "실천·마무리";
const LABEL_WRAPUP: &str = "마무리";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordSet {
    pub preparation: Vec<String>,
    pub wrapup: Vec<String>,
}

impl Default for KeywordSet {
    fn default() -> Self {
        Self {
            preparation: DEFAULT_PREPARATION_KEYWORDS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            wrapup: DEFAULT_WRAPUP_KEYWORDS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl KeywordSet {
    fn is_preparation(&self, fragment: &str) -> bool {
        self.preparation.iter().any(|k| fragment.contains(k.as_str()))
    }

    fn is_wrapup(&self, fragment: &str) -> bool {
        self.wrapup.iter().any(|k| fragment.contains(k.as_str()))
    }
}

/// When the plain even split replaces the keyword-driven layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FallbackPolicy {
    /// No preparation or wrap-up fragment was recognised, or nothing was emitted.
    #[default]
    Unclassified,
    /// Only when the keyword-driven layout emitted nothing.
    EmptyOnly,
}

impl FallbackPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            FallbackPolicy::Unclassified => "unclassified",
            FallbackPolicy::EmptyOnly => "empty-only",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "unclassified" => Some(FallbackPolicy::Unclassified),
            "empty-only" | "empty_only" | "emptyonly" => Some(FallbackPolicy::EmptyOnly),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DistributorConfig {
    pub keywords: KeywordSet,
    pub fallback: FallbackPolicy,
}

/// Inclusive span of lesson periods. Renders as `3` or `2~4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct PeriodRange {
    pub start: u32,
    pub end: u32,
}

impl PeriodRange {
    pub fn new(start: u32, end: u32) -> Self {
        debug_assert!(start <= end, "period range {start}~{end} is inverted");
        Self { start, end }
    }

    pub fn single(period: u32) -> Self {
        Self::new(period, period)
    }

    pub fn len(&self) -> u32 {
        self.end - self.start + 1
    }

    pub fn contains(&self, period: u32) -> bool {
        self.start <= period && period <= self.end
    }
}

impl fmt::Display for PeriodRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}~{}", self.start, self.end)
        }
    }
}

impl FromStr for PeriodRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = RANGE_PATTERN
            .captures(s.trim())
            .ok_or_else(|| format!("not a period range: {}", s))?;
        let start: u32 = caps[1]
            .parse()
            .map_err(|_| format!("period out of range: {}", s))?;
        let end: u32 = match caps.get(2) {
            Some(m) => m
                .as_str()
                .parse()
                .map_err(|_| format!("period out of range: {}", s))?,
            None => start,
        };
        if end < start {
            return Err(format!("period range ends before it starts: {}", s));
        }
        Ok(Self { start, end })
    }
}

impl From<PeriodRange> for String {
    fn from(r: PeriodRange) -> Self {
        r.to_string()
    }
}

impl TryFrom<String> for PeriodRange {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum ActivityLabel {
    Preparation,
    Activity(usize),
    PracticeWrapup,
    /// Closing slot of the even split.
    Wrapup,
    Other(String),
}

impl fmt::Display for ActivityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActivityLabel::Preparation => f.write_str(LABEL_PREPARATION),
            ActivityLabel::Activity(n) => write!(f, "{}{}", LABEL_ACTIVITY_PREFIX, n),
            ActivityLabel::PracticeWrapup => f.write_str(LABEL_PRACTICE_WRAPUP),
            ActivityLabel::Wrapup => f.write_str(LABEL_WRAPUP),
            ActivityLabel::Other(s) => f.write_str(s),
        }
    }
}

impl From<String> for ActivityLabel {
    fn from(s: String) -> Self {
        match s.as_str() {
            LABEL_PREPARATION => return ActivityLabel::Preparation,
            LABEL_PRACTICE_WRAPUP => return ActivityLabel::PracticeWrapup,
            LABEL_WRAPUP => return ActivityLabel::Wrapup,
            _ => {}
        }
        let index = s
            .strip_prefix(LABEL_ACTIVITY_PREFIX)
            .and_then(|n| n.parse::<usize>().ok());
        match index {
            Some(n) => ActivityLabel::Activity(n),
            None => ActivityLabel::Other(s),
        }
    }
}

impl From<ActivityLabel> for String {
    fn from(label: ActivityLabel) -> Self {
        label.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodAssignment {
    #[serde(rename = "차시")]
    pub periods: PeriodRange,
    #[serde(rename = "구분")]
    pub label: ActivityLabel,
    #[serde(rename = "내용")]
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "role", content = "index", rename_all = "camelCase")]
pub enum FragmentRole {
    Preparation,
    MainActivity(usize),
    WrapUp,
}

/// Splits an activity summary on `,` `·` and `및`, dropping empty pieces.
pub fn split_fragments(text: &str) -> Vec<String> {
    FRAGMENT_DELIMITER
        .split(text)
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

/// One role per fragment. The first preparation match wins; the first other
/// wrap-up match is the wrap-up, and when it is not the last fragment the
/// last fragment is treated as wrap-up too.
pub fn classify(fragments: &[String], keywords: &KeywordSet) -> Vec<FragmentRole> {
    if fragments.is_empty() {
        return Vec::new();
    }
    let prep_idx = fragments.iter().position(|f| keywords.is_preparation(f));
    let wrap_idx = fragments
        .iter()
        .enumerate()
        .find(|(i, f)| Some(*i) != prep_idx && keywords.is_wrapup(f))
        .map(|(i, _)| i);
    let last = fragments.len() - 1;
    let trailing_idx = wrap_idx
        .filter(|w| *w != last)
        .map(|_| last)
        .filter(|l| Some(*l) != prep_idx);

    let mut main_n = 0usize;
    (0..fragments.len())
        .map(|i| {
            if Some(i) == prep_idx {
                FragmentRole::Preparation
            } else if Some(i) == wrap_idx || Some(i) == trailing_idx {
                FragmentRole::WrapUp
            } else {
                main_n += 1;
                FragmentRole::MainActivity(main_n)
            }
        })
        .collect()
}

/// Lays a unit's activity summary out over periods `1..=total_periods`.
///
/// Empty or missing descriptions yield no assignments. A `total_periods` of 0
/// is read as 1. When there are more fragments than periods the trailing
/// fragments are dropped.
pub fn distribute(
    total_periods: u32,
    description: Option<&str>,
    config: &DistributorConfig,
) -> Vec<PeriodAssignment> {
    let total = total_periods.max(1);
    let Some(text) = description else {
        return Vec::new();
    };
    let fragments = split_fragments(text);
    if fragments.is_empty() {
        return Vec::new();
    }

    let roles = classify(&fragments, &config.keywords);
    let classified = roles
        .iter()
        .any(|r| !matches!(r, FragmentRole::MainActivity(_)));
    let laid_out = allocate(total, &fragments, &roles);

    let fall_back = laid_out.is_empty()
        || (config.fallback == FallbackPolicy::Unclassified && !classified);
    if fall_back {
        even_split(total, &fragments)
    } else {
        laid_out
    }
}

fn allocate(total: u32, fragments: &[String], roles: &[FragmentRole]) -> Vec<PeriodAssignment> {
    let prep = roles.iter().position(|r| *r == FragmentRole::Preparation);
    let mains: Vec<(usize, usize)> = roles
        .iter()
        .enumerate()
        .filter_map(|(i, r)| match r {
            FragmentRole::MainActivity(n) => Some((i, *n)),
            _ => None,
        })
        .collect();
    let wraps: Vec<usize> = roles
        .iter()
        .enumerate()
        .filter(|(_, r)| **r == FragmentRole::WrapUp)
        .map(|(i, _)| i)
        .collect();
    let wrap_count = wraps.len() as u32;

    let mut out = Vec::with_capacity(fragments.len());
    let mut cursor = 1u32;
    if let Some(i) = prep {
        out.push(PeriodAssignment {
            periods: PeriodRange::single(1),
            label: ActivityLabel::Preparation,
            content: fragments[i].clone(),
        });
        cursor = 2;
    }

    let middle_budget = total.saturating_sub(cursor - 1).saturating_sub(wrap_count);
    let per = if middle_budget > 0 && !mains.is_empty() {
        (middle_budget / mains.len() as u32).max(1)
    } else {
        1
    };
    let middle_limit = total.saturating_sub(wrap_count);

    for (pos, (i, n)) in mains.iter().enumerate() {
        if cursor > total {
            break;
        }
        // Squeezed units still give each fragment one period, eating into wrap-up.
        let limit = middle_limit.max(cursor);
        let end = if pos + 1 == mains.len() {
            limit
        } else {
            cursor.saturating_add(per - 1).min(limit)
        };
        out.push(PeriodAssignment {
            periods: PeriodRange::new(cursor, end),
            label: ActivityLabel::Activity(*n),
            content: fragments[*i].clone(),
        });
        // A range ending at u32::MAX closes the unit.
        let Some(next) = end.checked_add(1) else {
            return out;
        };
        cursor = next;
    }

    for (pos, i) in wraps.iter().enumerate() {
        if cursor > total {
            break;
        }
        let end = (total.saturating_sub(wrap_count) + pos as u32 + 1).clamp(cursor, total);
        out.push(PeriodAssignment {
            periods: PeriodRange::new(cursor, end),
            label: ActivityLabel::PracticeWrapup,
            content: fragments[*i].clone(),
        });
        let Some(next) = end.checked_add(1) else {
            break;
        };
        cursor = next;
    }

    out
}

fn even_split(total: u32, fragments: &[String]) -> Vec<PeriodAssignment> {
    let per = (total / fragments.len() as u32).max(1);
    let mut out = Vec::with_capacity(fragments.len());
    let mut start = 1u32;
    for (i, content) in fragments.iter().enumerate() {
        if start > total {
            break;
        }
        let last = i + 1 == fragments.len();
        let end = if last {
            total
        } else {
            start.saturating_add(per - 1).min(total)
        };
        let label = if i == 0 {
            ActivityLabel::Preparation
        } else if last {
            ActivityLabel::Wrapup
        } else {
            ActivityLabel::Activity(i)
        };
        out.push(PeriodAssignment {
            periods: PeriodRange::new(start, end),
            label,
            content: content.clone(),
        });
        let Some(next) = end.checked_add(1) else {
            break;
        };
        start = next;
    }
    out
}

#[path = "../src/chasi.rs"]
mod chasi;

use chasi::{
    distribute, ActivityLabel, DistributorConfig, FallbackPolicy, PeriodAssignment, PeriodRange,
};

fn rows(assignments: &[PeriodAssignment]) -> Vec<(String, String, String)> {
    assignments
        .iter()
        .map(|a| (a.periods.to_string(), a.label.to_string(), a.content.clone()))
        .collect()
}

fn row(periods: &str, label: &str, content: &str) -> (String, String, String) {
    (periods.to_string(), label.to_string(), content.to_string())
}

fn assert_covers(assignments: &[PeriodAssignment], total: u32, context: &str) {
    assert!(!assignments.is_empty(), "{}: no assignments", context);
    let mut next = 1u32;
    for a in assignments {
        assert_eq!(
            a.periods.start, next,
            "{}: gap or overlap at {:?}",
            context, assignments
        );
        assert!(a.periods.start <= a.periods.end, "{}: inverted range", context);
        next = a.periods.end + 1;
    }
    assert_eq!(next, total + 1, "{}: does not end at {}", context, total);
}

#[test]
fn unit_with_preparation_and_wrapup_fills_every_period() {
    let out = distribute(
        9,
        Some("단원 도입, 인사말 익히기, 바른 말 연습, 배운 내용 실천"),
        &DistributorConfig::default(),
    );
    assert_eq!(
        rows(&out),
        vec![
            row("1", "준비", "단원 도입"),
            row("2~4", "활동1", "인사말 익히기"),
            row("5~8", "활동2", "바른 말 연습"),
            row("9", "실천·마무리", "배운 내용 실천"),
        ]
    );
    assert_covers(&out, 9, "nine periods");
}

#[test]
fn single_preparation_fragment_takes_the_only_period() {
    let out = distribute(1, Some("준비"), &DistributorConfig::default());
    assert_eq!(rows(&out), vec![row("1", "준비", "준비")]);
}

#[test]
fn empty_descriptions_produce_nothing() {
    let config = DistributorConfig::default();
    assert!(distribute(5, Some(""), &config).is_empty());
    assert!(distribute(5, Some("   "), &config).is_empty());
    assert!(distribute(5, Some(" , · "), &config).is_empty());
    assert!(distribute(5, None, &config).is_empty());
}

#[test]
fn unclassified_fragments_use_even_split() {
    let out = distribute(
        4,
        Some("낱말 읽기, 문장 쓰기, 그림 보고 말하기, 이야기 듣기"),
        &DistributorConfig::default(),
    );
    assert_eq!(
        rows(&out),
        vec![
            row("1", "준비", "낱말 읽기"),
            row("2", "활동1", "문장 쓰기"),
            row("3", "활동2", "그림 보고 말하기"),
            row("4", "마무리", "이야기 듣기"),
        ]
    );
}

#[test]
fn even_split_gives_remainder_to_last_fragment() {
    let out = distribute(8, Some("읽기, 쓰기, 말하기"), &DistributorConfig::default());
    assert_eq!(
        rows(&out),
        vec![
            row("1~2", "준비", "읽기"),
            row("3~4", "활동1", "쓰기"),
            row("5~8", "마무리", "말하기"),
        ]
    );
}

#[test]
fn empty_only_policy_keeps_keyword_layout_for_unclassified_text() {
    let config = DistributorConfig {
        fallback: FallbackPolicy::EmptyOnly,
        ..DistributorConfig::default()
    };
    let out = distribute(
        4,
        Some("낱말 읽기, 문장 쓰기, 그림 보고 말하기, 이야기 듣기"),
        &config,
    );
    let labels: Vec<ActivityLabel> = out.iter().map(|a| a.label.clone()).collect();
    assert_eq!(
        labels,
        vec![
            ActivityLabel::Activity(1),
            ActivityLabel::Activity(2),
            ActivityLabel::Activity(3),
            ActivityLabel::Activity(4),
        ]
    );
    assert_covers(&out, 4, "empty-only");
}

#[test]
fn trailing_fragment_after_wrapup_shares_the_end() {
    let out = distribute(
        7,
        Some("배울 내용 살펴보기, 읽기, 쓰기, 정리하기, 발표회"),
        &DistributorConfig::default(),
    );
    assert_eq!(
        rows(&out),
        vec![
            row("1", "준비", "배울 내용 살펴보기"),
            row("2~3", "활동1", "읽기"),
            row("4~5", "활동2", "쓰기"),
            row("6", "실천·마무리", "정리하기"),
            row("7", "실천·마무리", "발표회"),
        ]
    );
}

#[test]
fn wrapup_only_units_give_slack_to_first_wrapup() {
    let out = distribute(5, Some("마무리, 발표"), &DistributorConfig::default());
    assert_eq!(
        rows(&out),
        vec![
            row("1~4", "실천·마무리", "마무리"),
            row("5", "실천·마무리", "발표"),
        ]
    );
}

#[test]
fn ranges_cover_all_periods_when_fragments_fit() {
    let descriptions = [
        "단원 도입, 인사말 익히기, 바른 말 연습, 배운 내용 실천",
        "배울 내용 살펴보기, 읽기, 쓰기, 정리하기, 발표회",
        "읽기, 쓰기, 말하기",
        "준비, 읽기",
        "읽기, 돌아보기",
        "마무리, 발표",
        "단원 도입, 확인",
        "배움 지도 살펴보기 및 계획 세우기, 조사하기·발표하기, 실천하기",
    ];
    let config = DistributorConfig::default();
    for text in descriptions {
        let fragments = chasi::split_fragments(text).len() as u32;
        for total in fragments..=20 {
            let out = distribute(total, Some(text), &config);
            assert_covers(&out, total, &format!("{} over {}", text, total));
        }
    }
}

#[test]
fn preparation_always_opens_with_period_one() {
    let config = DistributorConfig::default();
    for text in [
        "단원 도입, 읽기",
        "읽기, 준비물 챙기기, 쓰기",
        "배울 내용 살펴보기, 정리",
    ] {
        for total in 1..=10 {
            let out = distribute(total, Some(text), &config);
            assert_eq!(out[0].label, ActivityLabel::Preparation, "{}", text);
            assert_eq!(out[0].periods, PeriodRange::single(1), "{}", text);
        }
    }
}

#[test]
fn activities_follow_source_order() {
    let out = distribute(
        12,
        Some("단원 도입, 가 활동, 나 활동, 다 활동, 라 활동, 정리"),
        &DistributorConfig::default(),
    );
    let activities: Vec<(usize, &str)> = out
        .iter()
        .filter_map(|a| match a.label {
            ActivityLabel::Activity(n) => Some((n, a.content.as_str())),
            _ => None,
        })
        .collect();
    assert_eq!(
        activities,
        vec![(1, "가 활동"), (2, "나 활동"), (3, "다 활동"), (4, "라 활동")]
    );
}

#[test]
fn more_fragments_than_periods_truncates() {
    let out = distribute(
        6,
        Some("배울 내용 살펴보기, 만 알아보기·다섯 자리 수 및 십만, 백만, 천만 알아보기, 정리하기, 탐구 활동"),
        &DistributorConfig::default(),
    );
    assert_eq!(out.len(), 6);
    assert_covers(&out, 6, "truncated");
    assert!(out
        .iter()
        .all(|a| a.label != ActivityLabel::PracticeWrapup));
    assert_eq!(out[5].content, "천만 알아보기");
}

#[test]
fn zero_periods_is_read_as_one() {
    let out = distribute(0, Some("단원 도입, 읽기"), &DistributorConfig::default());
    assert_eq!(rows(&out), vec![row("1", "준비", "단원 도입")]);
}

#[test]
fn lone_preparation_fragment_keeps_single_period() {
    let out = distribute(3, Some("단원 도입"), &DistributorConfig::default());
    assert_eq!(rows(&out), vec![row("1", "준비", "단원 도입")]);
}

#[test]
fn range_rendering() {
    assert_eq!(PeriodRange::single(7).to_string(), "7");
    assert_eq!(PeriodRange::new(7, 7).to_string(), "7");
    assert_eq!(PeriodRange::new(2, 9).to_string(), "2~9");
}

#[test]
fn largest_period_count_closes_without_overflow() {
    let config = DistributorConfig::default();

    let keyword = distribute(u32::MAX, Some("단원 도입, 읽기"), &config);
    assert_eq!(
        rows(&keyword),
        vec![
            row("1", "준비", "단원 도입"),
            row("2~4294967295", "활동1", "읽기"),
        ]
    );

    let with_activity = distribute(u32::MAX, Some("단원 도입, 읽기, 배운 내용 실천"), &config);
    assert_eq!(with_activity.len(), 3);
    assert_eq!(with_activity[1].periods, PeriodRange::new(2, u32::MAX - 1));
    assert_eq!(with_activity[2].periods, PeriodRange::single(u32::MAX));

    let even = distribute(u32::MAX, Some("읽기, 쓰기"), &config);
    assert_eq!(even.len(), 2);
    assert_eq!(even[0].periods, PeriodRange::new(1, u32::MAX / 2));
    assert_eq!(even[1].periods, PeriodRange::new(u32::MAX / 2 + 1, u32::MAX));
    assert_eq!(even[1].label, ActivityLabel::Wrapup);
}

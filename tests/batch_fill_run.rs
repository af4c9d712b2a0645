mod test_support;

use serde_json::json;
use std::path::Path;
use std::process::{Command, Output};
use test_support::{read_json, sample_plan, temp_dir, write_json};

fn run_fill(plan_path: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_plannerd"))
        .arg(plan_path)
        .env_remove("PLANNERD_CONFIG")
        .env("RUST_LOG", "info")
        .output()
        .expect("run plannerd")
}

#[test]
fn batch_fill_updates_plan_and_second_run_is_a_no_op() {
    let dir = temp_dir("plannerd-batch-fill");
    let plan_path = dir.join("연간지도_계획.json");
    write_json(&plan_path, &sample_plan());

    let first = run_fill(&plan_path);
    assert!(first.status.success(), "first run failed: {:?}", first);
    let log = String::from_utf8_lossy(&first.stderr);
    assert!(log.contains("3개 단원"), "missing count in log: {}", log);

    let filled = read_json(&plan_path);
    let math_units = filled[1]["단원목록"].as_array().expect("math units");
    let periods: Vec<&str> = math_units[0]["차시별_주요_활동"]
        .as_array()
        .expect("math assignments")
        .iter()
        .filter_map(|a| a["차시"].as_str())
        .collect();
    assert_eq!(periods, vec!["1", "2", "3", "4", "5", "6"]);

    let before = std::fs::read(&plan_path).expect("read plan");
    let second = run_fill(&plan_path);
    assert!(second.status.success(), "second run failed: {:?}", second);
    assert_eq!(std::fs::read(&plan_path).expect("reread plan"), before);

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn batch_fill_uses_config_beside_plan() {
    let dir = temp_dir("plannerd-batch-config");
    let plan_path = dir.join("plan.json");
    write_json(
        &plan_path,
        &json!([{
            "교과": "국어",
            "학년": "1",
            "단원목록": [{
                "단원번호": 1,
                "단원명": "글자 놀이",
                "차시수": 3,
                "주요_학습_내용_및_활동": "마음 열기, 글자 읽기, 글자 쓰기"
            }]
        }]),
    );
    write_json(
        &dir.join("plannerd.json"),
        &json!({ "preparationKeywords": ["열기"], "wrapupKeywords": ["쓰기"] }),
    );

    let out = run_fill(&plan_path);
    assert!(out.status.success(), "run failed: {:?}", out);
    let filled = read_json(&plan_path);
    assert_eq!(
        filled[0]["단원목록"][0]["차시별_주요_활동"],
        json!([
            { "차시": "1", "구분": "준비", "내용": "마음 열기" },
            { "차시": "2", "구분": "활동1", "내용": "글자 읽기" },
            { "차시": "3", "구분": "실천·마무리", "내용": "글자 쓰기" }
        ])
    );

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn batch_fill_fails_without_touching_bad_plans() {
    let dir = temp_dir("plannerd-batch-bad");

    let missing = run_fill(&dir.join("missing.json"));
    assert!(!missing.status.success());
    assert!(!dir.join("missing.json").exists());

    let object_plan = dir.join("object.json");
    std::fs::write(&object_plan, r#"{"교과":"국어"}"#).expect("write object plan");
    let out = run_fill(&object_plan);
    assert!(!out.status.success());
    assert_eq!(
        std::fs::read_to_string(&object_plan).expect("read object plan"),
        r#"{"교과":"국어"}"#
    );

    let _ = std::fs::remove_dir_all(dir);
}

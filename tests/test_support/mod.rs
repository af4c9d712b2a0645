#![allow(dead_code)]

use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

pub fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

pub fn write_json(path: &PathBuf, value: &serde_json::Value) {
    std::fs::write(
        path,
        serde_json::to_string_pretty(value).expect("serialize fixture"),
    )
    .expect("write fixture");
}

pub fn read_json(path: &PathBuf) -> serde_json::Value {
    let text = std::fs::read_to_string(path).expect("read json");
    serde_json::from_str(&text).expect("parse json")
}

pub fn sample_plan() -> serde_json::Value {
    json!([
        {
            "학기": "1",
            "학년": "3",
            "학년군": "3~4학년",
            "교과": "국어",
            "단원목록": [
                {
                    "단원번호": 1,
                    "단원명": "바른 말 사용하기",
                    "차시수": "9",
                    "주요_학습_내용_및_활동": "단원 도입, 인사말 익히기, 바른 말 연습, 배운 내용 실천",
                    "비고": "교과서 10~35쪽"
                },
                {
                    "단원번호": 2,
                    "단원명": "낱말 놀이",
                    "차시수": 4,
                    "주요_학습_내용_및_활동": "낱말 읽기, 문장 쓰기, 그림 보고 말하기, 이야기 듣기",
                    "차시별_주요_활동": []
                },
                {
                    "단원번호": 3,
                    "단원명": "자료 없음",
                    "차시수": 5,
                    "주요_학습_내용_및_활동": ""
                },
                {
                    "단원번호": 4,
                    "단원명": "이미 계획됨",
                    "차시수": 2,
                    "주요_학습_내용_및_활동": "준비, 정리",
                    "차시별_주요_활동": [
                        { "차시": "1~2", "구분": "직접 작성", "내용": "교사가 쓴 계획" }
                    ]
                }
            ]
        },
        {
            "학기": "1",
            "학년": "4",
            "학년군": "3~4학년",
            "교과": "수학",
            "단원목록": [
                {
                    "단원번호": 1,
                    "단원명": "큰 수",
                    "차시수": "6차시",
                    "주요_학습_내용_및_활동": "배울 내용 살펴보기, 만 알아보기·다섯 자리 수 및 십만, 백만, 천만 알아보기, 정리하기, 탐구 활동"
                }
            ]
        },
        { "교과": "음악", "학년": "3", "학년군": "3~4학년" }
    ])
}

pub fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_plannerd");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .env_remove("PLANNERD_CONFIG")
        .spawn()
        .expect("spawn plannerd");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

pub fn request(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({
        "id": id,
        "method": method,
        "params": params,
    });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    assert!(!line.trim().is_empty(), "empty response for {}", method);
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    value
}

pub fn request_ok(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let value = request(stdin, reader, id, method, params);
    assert!(
        value.get("ok").and_then(|v| v.as_bool()).unwrap_or(false),
        "{} failed: {}",
        method,
        value
    );
    value.get("result").cloned().unwrap_or_else(|| json!({}))
}

/// Returns the error code.
pub fn request_err(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> String {
    let value = request(stdin, reader, id, method, params);
    assert_eq!(
        value.get("ok").and_then(|v| v.as_bool()),
        Some(false),
        "{} unexpectedly succeeded: {}",
        method,
        value
    );
    value
        .get("error")
        .and_then(|e| e.get("code"))
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string()
}

//! 저장 전 JSON 문자열 정리.
//!
//! 저장소에 넘기기 전에 문자열 필드 앞뒤 공백을 재귀적으로 제거해
//! 페이로드 크기를 줄인다. 계층 선택 전에 호출하는 것을 전제로 한다.

use serde_json::{Map, Value};

/// 정리 옵션
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompactOptions {
    /// 객체 필드 중 정리 후 빈 문자열이 된 필드 제거
    pub drop_empty_strings: bool,
    /// 문자열 내부의 연속 공백을 공백 하나로 축약
    pub collapse_whitespace: bool,
}

/// 모든 문자열을 trim (객체/배열은 재귀, 그 외 값은 그대로)
pub fn compact(value: Value) -> Value {
    compact_with(value, CompactOptions::default())
}

/// 옵션을 적용한 정리
pub fn compact_with(value: Value, options: CompactOptions) -> Value {
    match value {
        Value::String(text) => Value::String(compact_text(&text, options)),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| compact_with(item, options))
                .collect(),
        ),
        Value::Object(fields) => {
            let mut out = Map::with_capacity(fields.len());
            for (key, field) in fields {
                let field = compact_with(field, options);
                if options.drop_empty_strings && matches!(&field, Value::String(s) if s.is_empty())
                {
                    continue;
                }
                out.insert(key, field);
            }
            Value::Object(out)
        }
        other => other,
    }
}

fn compact_text(text: &str, options: CompactOptions) -> String {
    let trimmed = text.trim();
    if !options.collapse_whitespace {
        return trimmed.to_string();
    }

    let mut out = String::with_capacity(trimmed.len());
    let mut in_space = false;
    for ch in trimmed.chars() {
        if ch.is_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(ch);
            in_space = false;
        }
    }
    out
}

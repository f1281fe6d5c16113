//! 임시 데이터 키 판별.
//!
//! 빠른 계층 공간 회수와 내구 계층 정리(cleanup)가 같은 규칙을 쓴다:
//! 키의 단어 구간 중 하나가 임시 마커와 일치하고 보호 목록에 없는 경우에만 삭제 대상이다.
//! 마커에 걸리지 않는 키는 아무리 오래되어도 자동 삭제하지 않는다.
//!
//! 단어 구간은 영숫자가 아닌 문자와 camelCase 경계로 나눈다.
//! `post_draft`, `scratchTemp`는 대상이지만 `playbook_templates`, `contemporary_voice`는 아니다.

use std::collections::HashSet;
use stowage_core::config::TransientKeyConfig;

/// 임시 데이터 키 정책
#[derive(Debug, Clone, Default)]
pub struct TransientKeyPolicy {
    /// 단어 구간으로 나눈 소문자 마커 (`_draft` → `["draft"]`)
    markers: Vec<Vec<String>>,
    /// 보호 키 (정확히 일치)
    protected: HashSet<String>,
}

impl TransientKeyPolicy {
    /// 마커와 보호 키로 정책 생성
    pub fn new<M, P>(markers: M, protected_keys: P) -> Self
    where
        M: IntoIterator,
        M::Item: AsRef<str>,
        P: IntoIterator,
        P::Item: Into<String>,
    {
        Self {
            markers: markers
                .into_iter()
                .map(|m| segments(m.as_ref()))
                .filter(|m| !m.is_empty())
                .collect(),
            protected: protected_keys.into_iter().map(Into::into).collect(),
        }
    }

    /// 설정에서 정책 생성
    pub fn from_config(config: &TransientKeyConfig) -> Self {
        Self::new(&config.transient_markers, config.protected_keys.iter().cloned())
    }

    /// 자동 삭제 대상 키인지
    pub fn is_evictable(&self, key: &str) -> bool {
        if self.protected.contains(key) {
            return false;
        }
        let words = segments(key);
        self.markers.iter().any(|marker| {
            words
                .windows(marker.len())
                .any(|window| window == marker.as_slice())
        })
    }

    /// 보호 키인지
    pub fn is_protected(&self, key: &str) -> bool {
        self.protected.contains(key)
    }
}

/// 키를 소문자 단어 구간으로 분리
///
/// `note_0_draft` → `[note, 0, draft]`, `brandKitDraft` → `[brand, kit, draft]`
fn segments(text: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;

    for ch in text.chars() {
        if !ch.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if ch.is_uppercase() && prev_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        prev_lower = ch.is_lowercase() || ch.is_numeric();
        current.extend(ch.to_lowercase());
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local_policy() -> TransientKeyPolicy {
        TransientKeyPolicy::new(["_draft", "_temp", "_cache"], ["brand_kit", "settings"])
    }

    #[test]
    fn transient_suffixes_are_evictable() {
        let policy = local_policy();
        assert!(policy.is_evictable("brand_kit_draft"));
        assert!(policy.is_evictable("playbook_temp"));
        assert!(policy.is_evictable("reddit_cache"));
        assert!(policy.is_evictable("CRO_DRAFT"));
    }

    #[test]
    fn canonical_keys_are_kept() {
        let policy = local_policy();
        assert!(!policy.is_evictable("brand_kit"));
        assert!(!policy.is_evictable("settings"));
        assert!(!policy.is_evictable("saved_playbooks"));
    }

    #[test]
    fn marker_must_match_whole_word() {
        let local = local_policy();
        let cleanup = TransientKeyPolicy::new(["draft", "temp"], Vec::<String>::new());
        for key in [
            "playbook_templates",
            "email_template",
            "contemporary_brand_voice",
            "draftsman_notes",
            "cached_results",
        ] {
            assert!(!local.is_evictable(key), "{key}");
            assert!(!cleanup.is_evictable(key), "{key}");
        }

        assert!(cleanup.is_evictable("temp_upload"));
        assert!(cleanup.is_evictable("note_0_draft"));
        assert!(local.is_evictable("session-cache"));
    }

    #[test]
    fn camel_case_keys_are_split() {
        let policy = local_policy();
        assert!(policy.is_evictable("brandKitDraft"));
        assert!(policy.is_evictable("scratchTemp"));
        assert!(!policy.is_evictable("emailTemplate"));
        assert_eq!(segments("HTTPCache_v2"), ["httpcache", "v2"]);
    }

    #[test]
    fn multi_word_marker_matches_consecutive_words() {
        let policy = TransientKeyPolicy::new(["_tmp_upload"], Vec::<String>::new());
        assert!(policy.is_evictable("avatar_tmp_upload"));
        assert!(!policy.is_evictable("tmp_avatar_upload"));
    }

    #[test]
    fn protect_list_wins_over_marker() {
        let policy = TransientKeyPolicy::new(["draft"], ["draft_settings"]);
        assert!(policy.is_protected("draft_settings"));
        assert!(!policy.is_evictable("draft_settings"));
        assert!(policy.is_evictable("draft_post"));
    }

    #[test]
    fn empty_markers_evict_nothing() {
        let policy = TransientKeyPolicy::new(Vec::<String>::new(), Vec::<String>::new());
        assert!(!policy.is_evictable("anything_draft"));

        let policy = TransientKeyPolicy::new(["", "__"], Vec::<String>::new());
        assert!(!policy.is_evictable("anything"));
        assert!(!policy.is_evictable("a__b"));
    }
}

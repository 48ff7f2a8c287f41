//! 대화 윈도우 - 호출자가 소유하는 최근 N 턴 기록
//!
//! 메모리 전용입니다. 코어는 읽기만 하며, 생성기 프롬프트의 문맥 힌트로만 쓰입니다.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 기본 윈도우 크기
pub const DEFAULT_HISTORY_WINDOW: usize = 10;

/// 한 번의 질의/응답
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub query: String,
    pub response: String,
    pub at: DateTime<Utc>,
}

/// 크기 제한 대화 윈도우
#[derive(Debug, Clone)]
pub struct ConversationWindow {
    turns: VecDeque<Turn>,
    capacity: usize,
}

impl Default for ConversationWindow {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_WINDOW)
    }
}

impl ConversationWindow {
    /// 새 윈도우 (capacity 0 은 1 로 보정)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            turns: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// 턴 추가. 용량을 넘으면 가장 오래된 턴부터 제거합니다.
    pub fn push(&mut self, query: impl Into<String>, response: impl Into<String>) {
        self.push_turn(Turn {
            query: query.into(),
            response: response.into(),
            at: Utc::now(),
        });
    }

    pub fn push_turn(&mut self, turn: Turn) {
        self.turns.push_back(turn);
        while self.turns.len() > self.capacity {
            self.turns.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    /// 오래된 순서로 순회
    pub fn iter(&self) -> impl Iterator<Item = &Turn> {
        self.turns.iter()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// 가장 최근 턴
    pub fn last(&self) -> Option<&Turn> {
        self.turns.back()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_last() {
        let mut window = ConversationWindow::default();
        assert!(window.is_empty());
        window.push("Jambo", "Jambo sana!");
        window.push("Who was Sundiata?", "The Lion of Mali.");

        assert_eq!(window.len(), 2);
        assert_eq!(window.last().map(|t| t.query.as_str()), Some("Who was Sundiata?"));
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut window = ConversationWindow::new(DEFAULT_HISTORY_WINDOW);
        for i in 0..15 {
            window.push(format!("q{}", i), format!("r{}", i));
        }

        assert_eq!(window.len(), 10);
        let queries: Vec<&str> = window.iter().map(|t| t.query.as_str()).collect();
        assert_eq!(queries.first(), Some(&"q5"));
        assert_eq!(queries.last(), Some(&"q14"));
    }

    #[test]
    fn test_zero_capacity_keeps_one() {
        let mut window = ConversationWindow::new(0);
        window.push("a", "1");
        window.push("b", "2");
        assert_eq!(window.capacity(), 1);
        assert_eq!(window.len(), 1);
        assert_eq!(window.last().map(|t| t.response.as_str()), Some("2"));
    }

    #[test]
    fn test_clear() {
        let mut window = ConversationWindow::new(3);
        window.push("a", "1");
        window.clear();
        assert!(window.is_empty());
        assert!(window.last().is_none());
    }

    #[test]
    fn test_turn_serializes() {
        let mut window = ConversationWindow::new(2);
        window.push("Hello", "Greetings");
        let json = serde_json::to_string(window.last().unwrap()).unwrap();
        assert!(json.contains("\"query\":\"Hello\""));
        assert!(json.contains("\"at\""));
    }
}

// 新增词卡表单：四个纯文本缓冲 + 一个焦点下标
// “是否聚焦”由 focus 下标推导，不在字段里单独存标志；
// focus 只在新增模式下有意义，界面判断走 App::field_focused

use crate::deck::WordCard;

pub const FIELD_COUNT: usize = 4;
pub const FIELD_CHAR_LIMIT: usize = 50;

pub const FIELD_LABELS: [&str; FIELD_COUNT] = [
    "Chinese Characters:",
    "Pinyin:",
    "Definition:",
    "Example (optional):",
];

pub const FIELD_PLACEHOLDERS: [&str; FIELD_COUNT] = [
    "Chinese Characters (e.g. 你好)",
    "Pinyin (e.g. ni hao)",
    "Definition (e.g. Hello)",
    "Example Sentence (optional)",
];

#[derive(Debug, Clone, Default)]
pub struct FormState {
    fields: [String; FIELD_COUNT],
    focus: usize,
    // 聚焦字段内的字符位置（按 char 计）
    cursor: usize,
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn focus_index(&self) -> usize {
        self.focus
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// 越界下标直接忽略
    pub fn focus(&mut self, i: usize) {
        if i < FIELD_COUNT {
            self.focus = i;
            self.cursor = self.fields[i].chars().count();
        }
    }

    /// direction 取 +1 / -1，按 4 取模循环
    pub fn advance_focus(&mut self, direction: isize) {
        let n = FIELD_COUNT as isize;
        let next = (self.focus as isize + direction).rem_euclid(n) as usize;
        self.focus(next);
    }

    pub fn value(&self, i: usize) -> &str {
        self.fields.get(i).map(String::as_str).unwrap_or("")
    }

    #[cfg(test)]
    pub fn set_value(&mut self, i: usize, value: &str) {
        if let Some(f) = self.fields.get_mut(i) {
            *f = value.chars().take(FIELD_CHAR_LIMIT).collect();
            if i == self.focus {
                self.cursor = f.chars().count();
            }
        }
    }

    pub fn reset(&mut self) {
        self.fields = Default::default();
        self.focus = 0;
        self.cursor = 0;
    }

    /// 前三项必填，例句可空
    pub fn is_complete(&self) -> bool {
        self.fields[..3].iter().all(|f| !f.is_empty())
    }

    pub fn build_card(&self) -> Option<WordCard> {
        if !self.is_complete() {
            return None;
        }
        Some(WordCard {
            chinese: self.fields[0].clone(),
            pinyin: self.fields[1].clone(),
            definition: self.fields[2].clone(),
            example: self.fields[3].clone(),
        })
    }

    pub fn insert_char(&mut self, ch: char) {
        let field = &mut self.fields[self.focus];
        let mut v: Vec<char> = field.chars().collect();
        if v.len() >= FIELD_CHAR_LIMIT {
            return;
        }
        let pos = self.cursor.min(v.len());
        v.insert(pos, ch);
        self.cursor = pos + 1;
        *field = v.into_iter().collect();
    }

    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let field = &mut self.fields[self.focus];
        let mut v: Vec<char> = field.chars().collect();
        let pos = self.cursor - 1;
        if pos < v.len() {
            v.remove(pos);
        }
        self.cursor = pos;
        *field = v.into_iter().collect();
    }

    pub fn cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        let len = self.fields[self.focus].chars().count();
        if self.cursor < len {
            self.cursor += 1;
        }
    }

    pub fn cursor_home(&mut self) {
        self.cursor = 0;
    }

    pub fn cursor_end(&mut self) {
        self.cursor = self.fields[self.focus].chars().count();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_str(form: &mut FormState, s: &str) {
        for ch in s.chars() {
            form.insert_char(ch);
        }
    }

    #[test]
    fn advance_focus_wraps_both_ways() {
        let mut form = FormState::new();
        form.advance_focus(-1);
        assert_eq!(form.focus_index(), 3);
        form.advance_focus(1);
        assert_eq!(form.focus_index(), 0);
    }

    #[test]
    fn advance_focus_has_period_four() {
        for start in 0..FIELD_COUNT {
            for dir in [1, -1] {
                let mut form = FormState::new();
                form.focus(start);
                for _ in 0..FIELD_COUNT {
                    form.advance_focus(dir);
                }
                assert_eq!(form.focus_index(), start);
            }
        }
    }

    #[test]
    fn focus_ignores_out_of_range_index() {
        let mut form = FormState::new();
        form.focus(2);
        assert_eq!(form.focus_index(), 2);
        form.focus(9);
        assert_eq!(form.focus_index(), 2);
    }

    #[test]
    fn typing_goes_to_focused_field() {
        let mut form = FormState::new();
        type_str(&mut form, "你好");
        form.advance_focus(1);
        type_str(&mut form, "ni hao");
        assert_eq!(form.value(0), "你好");
        assert_eq!(form.value(1), "ni hao");
        assert_eq!(form.value(2), "");
    }

    #[test]
    fn cursor_editing_inside_field() {
        let mut form = FormState::new();
        type_str(&mut form, "nhao");
        form.cursor_home();
        form.cursor_right();
        form.insert_char('i');
        assert_eq!(form.value(0), "nihao");
        form.cursor_end();
        form.backspace();
        assert_eq!(form.value(0), "niha");
        form.cursor_home();
        form.backspace();
        assert_eq!(form.value(0), "niha");
    }

    #[test]
    fn char_limit_is_enforced() {
        let mut form = FormState::new();
        type_str(&mut form, &"字".repeat(FIELD_CHAR_LIMIT + 5));
        assert_eq!(form.value(0).chars().count(), FIELD_CHAR_LIMIT);
        form.set_value(1, &"x".repeat(80));
        assert_eq!(form.value(1).len(), FIELD_CHAR_LIMIT);
    }

    #[test]
    fn completeness_ignores_example() {
        let mut form = FormState::new();
        form.set_value(0, "水");
        form.set_value(1, "shuǐ");
        assert!(!form.is_complete());
        assert!(form.build_card().is_none());
        form.set_value(2, "Water");
        assert!(form.is_complete());
        let card = form.build_card().unwrap();
        assert_eq!(card, WordCard::new("水", "shuǐ", "Water", ""));
    }

    #[test]
    fn reset_clears_everything() {
        let mut form = FormState::new();
        form.set_value(0, "a");
        form.set_value(3, "b");
        form.focus(3);
        form.reset();
        assert!((0..FIELD_COUNT).all(|i| form.value(i).is_empty()));
        assert_eq!(form.focus_index(), 0);
        assert_eq!(form.cursor(), 0);
    }
}

// 交互状态机：唯一持有并修改 Deck / FormState / 会话状态的地方
// 所有按键与例句结果都经同一事件队列逐个送到 handle_event

use std::collections::HashMap;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{debug, info, warn};

use crate::{
    config::{default_keymap, BrowseAction},
    deck::{Deck, WordCard},
    fetcher::FetchResult,
    form::FormState,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Browsing,
    Adding,
}

#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize,
    Example(FetchResult),
}

/// 需要主循环执行的副作用
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    None,
    Quit,
    FetchExample { card: WordCard, index: usize },
}

#[derive(Debug)]
pub struct App {
    pub deck: Deck,
    pub mode: Mode,
    pub current: usize,
    pub show_details: bool,
    pub loading_example: bool,
    pub form: FormState,
    keymap: HashMap<char, BrowseAction>,
}

impl App {
    pub fn new(deck: Deck, keymap: HashMap<char, BrowseAction>) -> Self {
        Self {
            deck,
            mode: Mode::Browsing,
            current: 0,
            show_details: false,
            loading_example: false,
            form: FormState::new(),
            keymap,
        }
    }

    #[cfg(test)]
    pub fn with_default_keys(deck: Deck) -> Self {
        Self::new(deck, default_keymap())
    }

    pub fn current_card(&self) -> Option<&WordCard> {
        self.deck.get(self.current).ok()
    }

    /// 浏览模式下没有任何字段聚焦
    pub fn field_focused(&self, i: usize) -> bool {
        self.mode == Mode::Adding && self.form.focus_index() == i
    }

    pub fn handle_event(&mut self, ev: AppEvent) -> Effect {
        match ev {
            AppEvent::Key(k) => self.handle_key(k),
            AppEvent::Resize => Effect::None,
            AppEvent::Example(r) => {
                self.apply_fetch_result(r);
                Effect::None
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Effect {
        // 新增模式优先
        match self.mode {
            Mode::Adding => {
                self.handle_adding_key(key);
                Effect::None
            }
            Mode::Browsing => self.handle_browsing_key(key),
        }
    }

    fn handle_adding_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => self.cancel_adding(),
            KeyCode::Char('c') if ctrl => self.cancel_adding(),
            KeyCode::Tab => self.form.advance_focus(1),
            KeyCode::BackTab => self.form.advance_focus(-1),
            KeyCode::Enter => self.save_card(),
            KeyCode::Backspace => self.form.backspace(),
            KeyCode::Left => self.form.cursor_left(),
            KeyCode::Right => self.form.cursor_right(),
            KeyCode::Home => self.form.cursor_home(),
            KeyCode::End => self.form.cursor_end(),
            KeyCode::Char(ch) if !ctrl => self.form.insert_char(ch),
            _ => {}
        }
    }

    fn handle_browsing_key(&mut self, key: KeyEvent) -> Effect {
        let action = match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(BrowseAction::Quit)
            }
            KeyCode::Right => Some(BrowseAction::Next),
            KeyCode::Left => Some(BrowseAction::Previous),
            KeyCode::Enter => Some(BrowseAction::ToggleDetails),
            KeyCode::Char(ch) => self.keymap.get(&ch).copied(),
            _ => None,
        };
        match action {
            Some(a) => self.apply_action(a),
            None => Effect::None,
        }
    }

    pub fn apply_action(&mut self, action: BrowseAction) -> Effect {
        match action {
            BrowseAction::Quit => return Effect::Quit,
            BrowseAction::Next => self.next_card(),
            BrowseAction::Previous => self.prev_card(),
            BrowseAction::ToggleDetails => return self.toggle_details(),
            BrowseAction::AddCard => self.start_adding(),
        }
        Effect::None
    }

    fn next_card(&mut self) {
        if self.deck.is_empty() {
            return;
        }
        let n = self.deck.size();
        self.current = (self.current + 1) % n;
        self.show_details = false;
        self.loading_example = false;
        debug!(index = self.current, "next card");
    }

    fn prev_card(&mut self) {
        if self.deck.is_empty() {
            return;
        }
        let n = self.deck.size();
        self.current = (self.current + n - 1) % n;
        self.show_details = false;
        self.loading_example = false;
        debug!(index = self.current, "previous card");
    }

    /// 打开详情时发起获取；关闭时不取消已发出的请求
    fn toggle_details(&mut self) -> Effect {
        if self.show_details {
            self.show_details = false;
            self.loading_example = false;
            return Effect::None;
        }
        let Some(card) = self.current_card().cloned() else {
            return Effect::None;
        };
        self.show_details = true;
        self.loading_example = true;
        Effect::FetchExample {
            card,
            index: self.current,
        }
    }

    fn start_adding(&mut self) {
        // 取消后重新进入时保留已填内容
        self.mode = Mode::Adding;
        self.form.focus(0);
    }

    fn cancel_adding(&mut self) {
        self.mode = Mode::Browsing;
    }

    fn save_card(&mut self) {
        let Some(card) = self.form.build_card() else {
            return;
        };
        info!(word = %card.chinese, "card added");
        self.deck.append(card);
        self.current = self.deck.size() - 1;
        self.mode = Mode::Browsing;
        self.form.reset();
    }

    /// 结果按原下标写回，即使用户已翻到别的卡
    pub fn apply_fetch_result(&mut self, result: FetchResult) {
        self.loading_example = false;
        let index = result.index;
        if let Err(e) = self.deck.set_example(index, result.into_example_text()) {
            warn!(error = %e, "dropping example for missing card");
        }
    }
}

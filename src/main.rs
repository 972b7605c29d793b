// 基于 ratatui + crossterm 的拼音词卡 TUI
// 功能：
// - 翻看内置或 JSON 卡组中的词卡，切换释义/例句显示
// - 打开详情时通过 chat completion 接口生成例句（后台线程，结果回投事件队列）
// - 在界面内新增词卡（不回写文件）

mod app;
mod config;
mod deck;
mod fetcher;
mod form;
mod logging;
mod ui;

use std::{
    io,
    sync::{
        mpsc::{self, Receiver, Sender},
        Arc,
    },
    thread,
    time::Duration,
};

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;

use crate::{
    app::{App, AppEvent, Effect},
    config::{parse_keymap, Cli, Settings, API_KEY_ENV},
    deck::{load_deck, seed_deck},
    fetcher::{ExampleFetcher, OpenAiClient},
    ui::{theme_of, Theme},
};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(m) = &cli.model {
        settings.api.model = m.clone();
    }
    if let Some(p) = &cli.log_file {
        logging::init_logging(p, settings.log_level.as_deref())?;
    }

    // 凭据缺失在进入终端之前直接退出
    let api_key = settings.resolve_api_key(std::env::var(API_KEY_ENV).ok())?;
    let deck = match &cli.deck {
        Some(p) => load_deck(p)?,
        None => seed_deck(),
    };
    info!(cards = deck.size(), model = %settings.api.model, "starting");

    let source = Arc::new(OpenAiClient::new(&settings.api, api_key)?);
    let (tx, rx) = mpsc::channel();
    let fetcher = ExampleFetcher::new(source, tx.clone());
    let mut app = App::new(deck, parse_keymap(&settings.keys));
    spawn_input_thread(tx);

    // TUI 初始化
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app, &rx, &fetcher, theme_of(cli.theme));

    // 退出还原
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    info!("exiting");
    res
}

/// 按键与窗口变化转发到事件队列；主循环退出后 send 失败即结束
fn spawn_input_thread(tx: Sender<AppEvent>) {
    thread::spawn(move || loop {
        let ev = match event::poll(Duration::from_millis(200)) {
            Ok(true) => match event::read() {
                Ok(Event::Key(k)) if k.kind == KeyEventKind::Press => AppEvent::Key(k),
                Ok(Event::Resize(..)) => AppEvent::Resize,
                Ok(_) => continue,
                Err(_) => break,
            },
            Ok(false) => continue,
            Err(_) => break,
        };
        if tx.send(ev).is_err() {
            break;
        }
    });
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    events: &Receiver<AppEvent>,
    fetcher: &ExampleFetcher,
    theme: Theme,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui::ui(f, app, theme))?;
        let Ok(ev) = events.recv() else {
            return Ok(());
        };
        match app.handle_event(ev) {
            Effect::None => {}
            Effect::Quit => return Ok(()),
            Effect::FetchExample { card, index } => {
                fetcher.fetch(card, index);
            }
        }
    }
}

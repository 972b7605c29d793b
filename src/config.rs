// 命令行、vocab.toml 设置与按键映射

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::Deserialize;

pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
const SETTINGS_FILE: &str = "vocab.toml";

#[derive(Debug, Clone, Parser)]
#[command(name = "pinyin-vocab", about = "Pinyin 词卡复习 TUI", version)]
pub struct Cli {
    /// JSON 卡组文件，缺省使用内置卡组；也可用环境变量 VOCAB_DECK
    #[arg(long, short = 'd', env = "VOCAB_DECK")]
    pub deck: Option<PathBuf>,

    /// 设置文件，缺省在当前目录及上级目录查找 vocab.toml
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// 覆盖设置中的模型名
    #[arg(long)]
    pub model: Option<String>,

    /// 主题（外观）：dark | light
    #[arg(long = "theme", value_enum, default_value_t = ThemeKind::Dark)]
    pub theme: ThemeKind,

    /// 日志文件；不指定则不记录日志
    #[arg(long = "log-file")]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ThemeKind {
    Dark,
    Light,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    pub api_key: Option<String>,
    pub model: String,
    pub endpoint: String,
    pub timeout_secs: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gpt-3.5-turbo".into(),
            endpoint: "https://api.openai.com/v1/chat/completions".into(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api: ApiSettings,
    pub keys: HashMap<String, String>,
    pub log_level: Option<String>,
}

impl Settings {
    /// 显式路径必须存在；否则探测，找不到就用默认值
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(p) = explicit {
            if !p.exists() {
                return Err(anyhow::anyhow!("设置文件不存在: {}", p.display()));
            }
            return Self::from_file(p);
        }
        match find_settings_file() {
            Some(p) => Self::from_file(&p),
            None => Ok(Self::default()),
        }
    }

    fn from_file(p: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(p).with_context(|| format!("读取设置失败: {}", p.display()))?;
        toml::from_str(&content).with_context(|| format!("解析 {} 失败", p.display()))
    }

    /// 环境变量优先，其次设置文件；空串视为未设置
    pub fn resolve_api_key(&self, env_value: Option<String>) -> Result<String> {
        env_value
            .filter(|k| !k.trim().is_empty())
            .or_else(|| {
                self.api
                    .api_key
                    .clone()
                    .filter(|k| !k.trim().is_empty())
            })
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "{} not set in environment variables\n提示: 导出该变量，或在 vocab.toml 的 [api] 中设置 api_key。",
                    API_KEY_ENV
                )
            })
    }
}

fn find_settings_file() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    cwd.ancestors()
        .map(|anc| anc.join(SETTINGS_FILE))
        .find(|p| p.exists())
}

// ---------------- Keymap ----------------
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowseAction {
    Next,
    Previous,
    ToggleDetails,
    AddCard,
    Quit,
}

pub fn parse_keymap(map: &HashMap<String, String>) -> HashMap<char, BrowseAction> {
    let mut out = HashMap::new();
    for (k, v) in map {
        let mut chars = k.chars();
        if let (Some(ch), None) = (chars.next(), chars.next()) {
            if let Some(act) = action_from_str(v) {
                out.insert(ch, act);
            }
        }
    }
    if out.is_empty() {
        out = default_keymap();
    }
    out
}

fn action_from_str(s: &str) -> Option<BrowseAction> {
    use BrowseAction::*;
    Some(match s {
        "next" => Next,
        "previous" => Previous,
        "toggle_details" => ToggleDetails,
        "add_card" => AddCard,
        "quit" => Quit,
        _ => return None,
    })
}

pub fn default_keymap() -> HashMap<char, BrowseAction> {
    use BrowseAction::*;
    HashMap::from([
        ('l', Next),
        ('h', Previous),
        (' ', ToggleDetails),
        ('a', AddCard),
        ('q', Quit),
    ])
}

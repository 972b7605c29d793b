// 词卡与卡组：有序存储，只追加、按下标读写例句

use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordCard {
    pub chinese: String,
    pub pinyin: String,
    pub definition: String,
    /// 为空表示尚未获取；获取失败时存放 "Error: ..." 文本
    #[serde(default)]
    pub example: String,
}

impl WordCard {
    pub fn new(chinese: &str, pinyin: &str, definition: &str, example: &str) -> Self {
        Self {
            chinese: chinese.into(),
            pinyin: pinyin.into(),
            definition: definition.into(),
            example: example.into(),
        }
    }

    /// 进入卡组的前提：汉字、拼音、释义均非空
    pub fn is_valid(&self) -> bool {
        !self.chinese.is_empty() && !self.pinyin.is_empty() && !self.definition.is_empty()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeckError {
    #[error("card index {index} out of range (deck has {len} cards)")]
    IndexOutOfRange { index: usize, len: usize },
}

#[derive(Debug, Clone, Default)]
pub struct Deck {
    cards: Vec<WordCard>,
}

impl Deck {
    pub fn new(cards: Vec<WordCard>) -> Self {
        Self { cards }
    }

    pub fn append(&mut self, card: WordCard) {
        self.cards.push(card);
    }

    pub fn get(&self, index: usize) -> Result<&WordCard, DeckError> {
        self.cards.get(index).ok_or(DeckError::IndexOutOfRange {
            index,
            len: self.cards.len(),
        })
    }

    /// 只改 example，其他字段不动
    pub fn set_example(&mut self, index: usize, text: String) -> Result<(), DeckError> {
        let len = self.cards.len();
        let card = self
            .cards
            .get_mut(index)
            .ok_or(DeckError::IndexOutOfRange { index, len })?;
        card.example = text;
        Ok(())
    }

    pub fn size(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

// ---------------- 内置卡组 ----------------
pub fn seed_deck() -> Deck {
    Deck::new(vec![
        WordCard::new("你好", "nǐ hǎo", "Hello", ""),
        WordCard::new("谢谢", "xiè xiè", "Thank you", ""),
        WordCard::new("早", "zǎo", "Morning", "Zǎo, good morning!"),
        WordCard::new("朋友", "péngyou", "Friend", "Wǒ de péngyou hěn hǎo."),
        WordCard::new("吃饭", "chī fàn", "Eat meal", "Wǒmen qù chī fàn."),
        WordCard::new("好", "hǎo", "Good", "Hěn hǎo, that's good!"),
        WordCard::new("水", "shuǐ", "Water", "Wǒ yào yī bēi shuǐ."),
        WordCard::new("爱", "ài", "Love", "Wǒ ài nǐ means I love you."),
        WordCard::new("人", "rén", "Person", "Měi gè rén dōu bù tóng."),
        WordCard::new("家", "jiā", "Home/Family", "Wǒ de jiā zài Běijīng."),
    ])
}

pub fn load_deck(path: &Path) -> Result<Deck> {
    if !path.exists() {
        return Err(anyhow::anyhow!(
            "读取卡组文件失败: {}\n提示: 使用 --deck 或设置环境变量 VOCAB_DECK 指向 JSON 卡组。",
            path.display()
        ));
    }
    let s = fs::read_to_string(path)
        .with_context(|| format!("读取卡组文件失败: {}", path.display()))?;
    parse_deck(&s).with_context(|| format!("卡组文件无效: {}", path.display()))
}

fn parse_deck(s: &str) -> Result<Deck> {
    let cards: Vec<WordCard> = serde_json::from_str(s).context("解析 JSON 失败")?;
    if let Some(i) = cards.iter().position(|c| !c.is_valid()) {
        return Err(anyhow::anyhow!(
            "第 {} 张卡缺少 chinese/pinyin/definition",
            i + 1
        ));
    }
    Ok(Deck::new(cards))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn set_example_touches_only_example() {
        let mut deck = Deck::new(vec![WordCard::new("你好", "ni hao", "Hello", "")]);
        deck.set_example(0, "你好 means hello".into()).unwrap();
        let card = deck.get(0).unwrap();
        assert_eq!(card.example, "你好 means hello");
        assert_eq!(card.chinese, "你好");
        assert_eq!(card.pinyin, "ni hao");
        assert_eq!(card.definition, "Hello");
    }

    #[test]
    fn out_of_range_access_is_an_error() {
        let mut deck = seed_deck();
        let len = deck.size();
        assert_eq!(
            deck.get(len).unwrap_err(),
            DeckError::IndexOutOfRange { index: len, len }
        );
        assert!(deck.set_example(len + 3, "x".into()).is_err());
    }

    #[test]
    fn append_keeps_insertion_order() {
        let mut deck = Deck::default();
        assert!(deck.is_empty());
        deck.append(WordCard::new("水", "shuǐ", "Water", ""));
        deck.append(WordCard::new("家", "jiā", "Home", ""));
        assert_eq!(deck.size(), 2);
        assert_eq!(deck.get(1).unwrap().chinese, "家");
    }

    #[test]
    fn seed_deck_cards_are_valid() {
        let deck = seed_deck();
        assert_eq!(deck.size(), 10);
        assert!((0..deck.size()).all(|i| deck.get(i).unwrap().is_valid()));
    }

    #[test]
    fn parse_deck_defaults_missing_example() {
        let deck = parse_deck(r#"[{"chinese":"猫","pinyin":"māo","definition":"Cat"}]"#).unwrap();
        assert_eq!(deck.get(0).unwrap().example, "");
    }

    #[test]
    fn parse_deck_rejects_incomplete_card() {
        let err = parse_deck(
            r#"[{"chinese":"猫","pinyin":"māo","definition":"Cat"},
                {"chinese":"狗","pinyin":"","definition":"Dog"}]"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("第 2 张卡"));
    }

    #[test]
    fn load_deck_reads_file() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, r#"[{{"chinese":"书","pinyin":"shū","definition":"Book","example":"一本书"}}]"#)
            .unwrap();
        let deck = load_deck(f.path()).unwrap();
        assert_eq!(deck.size(), 1);
        assert_eq!(deck.get(0).unwrap().example, "一本书");
    }

    #[test]
    fn load_deck_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_deck(&dir.path().join("nope.json")).is_err());
    }
}

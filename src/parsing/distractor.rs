//! 错误选项（干扰项）解析
//!
//! 在错误选项分析段落里，为每个非正确选项找出对应的说明：
//! 从该选项的标题之后一直截取到下一个选项标题（或文本末尾）。

use regex::Regex;

use crate::error::ProfileError;
use crate::models::fields::OptionLetter;

/// 选项标题在文本中的位置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OptionHeading {
    letter: OptionLetter,
    start: usize,
    end: usize,
}

/// 干扰项解析器
#[derive(Debug, Clone)]
pub struct DistractorResolver {
    heading: Regex,
    not_found: String,
}

impl DistractorResolver {
    /// 使用选项标题正则创建解析器
    ///
    /// 正则必须包含命名分组 `letter`。
    pub fn new(pattern: &str, not_found: impl Into<String>) -> Result<Self, ProfileError> {
        let heading = Regex::new(pattern)?;
        if !heading.capture_names().any(|name| name == Some("letter")) {
            return Err(ProfileError::MissingLetterGroup {
                pattern: pattern.to_string(),
            });
        }

        Ok(Self {
            heading,
            not_found: not_found.into(),
        })
    }

    /// 为 A–D 每个选项各生成一段说明
    ///
    /// 正确选项直接使用正确路径文本；其余选项从 `block` 中截取。
    pub fn resolve(
        &self,
        block: &str,
        key: Option<OptionLetter>,
        correct_path: &str,
    ) -> [String; 4] {
        let headings = self.headings(block);

        OptionLetter::ALL.map(|letter| {
            if Some(letter) == key {
                return correct_path.to_string();
            }
            self.extract(block, &headings, letter)
                .unwrap_or_else(|| self.not_found.clone())
        })
    }

    /// 截取某个选项的说明（取该字母第一次出现的标题）
    fn extract(&self, block: &str, headings: &[OptionHeading], letter: OptionLetter) -> Option<String> {
        let position = headings.iter().position(|h| h.letter == letter)?;
        let heading = headings[position];
        let boundary = headings
            .get(position + 1)
            .map(|next| next.start)
            .unwrap_or(block.len());

        Some(block[heading.end..boundary].trim().to_string())
    }

    /// 找出文本中所有选项标题，按出现顺序排列
    fn headings(&self, block: &str) -> Vec<OptionHeading> {
        self.heading
            .captures_iter(block)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let letter = OptionLetter::parse(caps.name("letter")?.as_str())?;
                Some(OptionHeading {
                    letter,
                    start: whole.start(),
                    end: whole.end(),
                })
            })
            .collect()
    }
}

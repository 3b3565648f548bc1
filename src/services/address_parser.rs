//! 地址解析服务 - 业务能力层
//!
//! 只负责"从结果页 HTML 中取出地址"，不关心请求和并发

use crate::error::{AppError, AppResult};
use regex::Regex;

/// 地址元素的 class 名称
const ADDRESS_CLASS: &str = "address";

/// 地址解析器
///
/// 在所有 class 含 `address` 的元素中收集 `<dd>` 文本，
/// 跳过空白片段，以 `", "` 拼接
pub struct AddressParser {
    open_tag: Regex,
    any_tag: Regex,
    class_attr: Regex,
    detail_open: Regex,
    detail_end: Regex,
    markup: Regex,
    numeric_entity: Regex,
    whitespace: Regex,
}

impl AddressParser {
    /// 创建解析器（编译所有正则）
    pub fn new() -> AppResult<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|e| AppError::Other(format!("正则编译失败: {}", e)))
        };

        Ok(Self {
            open_tag: compile(r"(?is)<([a-z][a-z0-9]*)\b([^>]*)>")?,
            any_tag: compile(r"(?is)<(/?)([a-z][a-z0-9]*)\b[^>]*?(/?)>")?,
            class_attr: compile(r#"(?is)(?:^|\s)class\s*=\s*(?:"([^"]*)"|'([^']*)')"#)?,
            detail_open: compile(r"(?is)<dd\b[^>]*>")?,
            detail_end: compile(r"(?is)</dd\s*>|<dd\b[^>]*>|</dl\s*>")?,
            markup: compile(r"(?s)<[^>]*>")?,
            numeric_entity: compile(r"&#(x[0-9a-fA-F]+|[0-9]+);")?,
            whitespace: compile(r"\s+")?,
        })
    }

    /// 提取地址
    ///
    /// # 返回
    /// 页面中没有地址元素时返回 `None`；有地址元素但没有可用片段时返回空字符串
    pub fn extract_address(&self, html: &str) -> Option<String> {
        let sections = self.address_sections(html);
        if sections.is_empty() {
            return None;
        }

        let fragments: Vec<String> = sections
            .iter()
            .flat_map(|section| self.details(section))
            .map(|detail| self.text_of(detail))
            .filter(|text| !text.is_empty())
            .collect();

        Some(fragments.join(", "))
    }

    /// 取出 `section` 中每个 `<dd>` 的内容
    ///
    /// `</dd>` 可以省略，此时内容到下一个 `<dd>` 或 `</dl>` 为止
    fn details<'a>(&self, section: &'a str) -> Vec<&'a str> {
        self.detail_open
            .find_iter(section)
            .map(|open| {
                let end = self
                    .detail_end
                    .find_at(section, open.end())
                    .map(|m| m.start())
                    .unwrap_or(section.len());
                &section[open.end()..end]
            })
            .collect()
    }

    /// 找出所有地址元素的内部 HTML（按文档顺序，嵌套的只取最外层）
    fn address_sections<'a>(&self, html: &'a str) -> Vec<&'a str> {
        let mut sections = Vec::new();
        let mut cursor = 0;

        while cursor < html.len() {
            let Some(caps) = self.open_tag.captures_at(html, cursor) else {
                break;
            };
            let whole = match caps.get(0) {
                Some(m) => m,
                None => break,
            };
            let attrs = caps.get(2).map(|m| m.as_str()).unwrap_or_default();

            if !self.has_address_class(attrs) {
                cursor = whole.end();
                continue;
            }

            let tag = caps
                .get(1)
                .map(|m| m.as_str().to_ascii_lowercase())
                .unwrap_or_default();
            let inner_start = whole.end();

            if attrs.trim_end().ends_with('/') {
                cursor = inner_start;
                continue;
            }

            match self.matching_close(html, &tag, inner_start) {
                Some((inner_end, after)) => {
                    sections.push(&html[inner_start..inner_end]);
                    cursor = after;
                }
                None => {
                    sections.push(&html[inner_start..]);
                    break;
                }
            }
        }

        sections
    }

    fn has_address_class(&self, attrs: &str) -> bool {
        self.class_attr
            .captures(attrs)
            .and_then(|caps| caps.get(1).or_else(|| caps.get(2)))
            .map(|m| m.as_str().split_whitespace().any(|c| c == ADDRESS_CLASS))
            .unwrap_or(false)
    }

    /// 从 `from` 开始寻找与 `tag` 配对的闭合标签，返回（闭合标签起点，闭合标签终点）
    fn matching_close(&self, html: &str, tag: &str, from: usize) -> Option<(usize, usize)> {
        let mut depth = 1usize;

        for caps in self.any_tag.captures_iter(&html[from..]) {
            let name = caps.get(2)?.as_str();
            if !name.eq_ignore_ascii_case(tag) {
                continue;
            }
            let whole = caps.get(0)?;
            let closing = caps.get(1).is_some_and(|m| !m.as_str().is_empty());
            let self_closing = caps.get(3).is_some_and(|m| !m.as_str().is_empty());

            if closing {
                depth -= 1;
                if depth == 0 {
                    return Some((from + whole.start(), from + whole.end()));
                }
            } else if !self_closing {
                depth += 1;
            }
        }

        None
    }

    /// 去标签、解码实体、合并空白
    fn text_of(&self, fragment: &str) -> String {
        let stripped = self.markup.replace_all(fragment, "");
        let decoded = self.decode_entities(&stripped);
        self.whitespace
            .replace_all(&decoded, " ")
            .trim()
            .to_string()
    }

    fn decode_entities(&self, text: &str) -> String {
        let numeric = self.numeric_entity.replace_all(text, |caps: &regex::Captures| {
            let raw = &caps[1];
            let code = match raw.strip_prefix('x').or_else(|| raw.strip_prefix('X')) {
                Some(hex) => u32::from_str_radix(hex, 16).ok(),
                None => raw.parse::<u32>().ok(),
            };
            code.and_then(char::from_u32)
                .map(String::from)
                .unwrap_or_else(|| caps[0].to_string())
        });

        numeric
            .replace("&nbsp;", " ")
            .replace("&quot;", "\"")
            .replace("&apos;", "'")
            .replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&amp;", "&")
    }
}

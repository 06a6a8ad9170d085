//! 响应分段
//!
//! 按一组预先约定的标题字面量（大小写不敏感）把一次生成的原始文本切成若干命名段落。
//! 结果总是每个字段一个非空引用的字符串：标题缺失时用兜底文本代替，而不是报错。

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ProfileError;

/// 标题布局：第一个标题是主标题，其余为次级标题
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadingLayout {
    pub headings: Vec<String>,
    /// 次级标题缺失时，该字段的值
    pub missing_sentinel: String,
    /// 主标题缺失时，除第一个字段外其余字段的值
    pub parse_error_sentinel: String,
}

impl HeadingLayout {
    pub fn new<const N: usize>(
        headings: [&str; N],
        missing_sentinel: &str,
        parse_error_sentinel: &str,
    ) -> Self {
        Self {
            headings: headings.iter().map(|h| h.to_string()).collect(),
            missing_sentinel: missing_sentinel.to_string(),
            parse_error_sentinel: parse_error_sentinel.to_string(),
        }
    }
}

/// 分段结果的完整程度
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentStatus {
    /// 所有标题都找到了
    Complete,
    /// 主标题找到，部分次级标题缺失（下标对应布局中的标题）
    Partial { missing: Vec<usize> },
    /// 主标题缺失，整段文本归入第一个字段
    PrimaryMissing,
}

/// 分段结果，`bodies[i]` 对应布局中的第 i 个标题
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segments {
    pub bodies: Vec<String>,
    pub status: SegmentStatus,
}

impl Segments {
    pub fn body(&self, index: usize) -> &str {
        self.bodies.get(index).map(String::as_str).unwrap_or("")
    }

    /// 取出全部段落
    pub fn into_bodies(self) -> Vec<String> {
        self.bodies
    }
}

/// 编译后的分段器
#[derive(Debug, Clone)]
pub struct Segmenter {
    layout: HeadingLayout,
    patterns: Vec<Regex>,
}

impl Segmenter {
    pub fn new(layout: &HeadingLayout) -> Result<Self, ProfileError> {
        let patterns = layout
            .headings
            .iter()
            .map(|heading| Regex::new(&heading_pattern(heading)))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            layout: layout.clone(),
            patterns,
        })
    }

    /// 把原始文本切成布局定义的各个字段
    pub fn segment(&self, text: &str) -> Segments {
        let field_count = self.patterns.len();
        if field_count == 0 {
            return Segments {
                bodies: Vec::new(),
                status: SegmentStatus::Complete,
            };
        }

        let Some(primary) = self.patterns[0].find(text) else {
            let mut bodies = vec![text.trim().to_string()];
            bodies.extend((1..field_count).map(|_| self.layout.parse_error_sentinel.clone()));
            return Segments {
                bodies,
                status: SegmentStatus::PrimaryMissing,
            };
        };

        // (字段下标, 标题起点, 标题终点)，次级标题只在主标题之后查找
        let mut found = vec![(0usize, primary.start(), primary.end())];
        for (index, pattern) in self.patterns.iter().enumerate().skip(1) {
            if let Some(m) = pattern.find_at(text, primary.end()) {
                found.push((index, m.start(), m.end()));
            }
        }
        found.sort_by_key(|&(_, start, _)| start);

        let mut bodies: Vec<Option<String>> = vec![None; field_count];
        for (position, &(index, _, end)) in found.iter().enumerate() {
            let boundary = found
                .get(position + 1)
                .map(|&(_, next_start, _)| next_start)
                .unwrap_or(text.len());
            let body = if boundary > end { &text[end..boundary] } else { "" };
            bodies[index] = Some(body.trim().to_string());
        }

        let missing: Vec<usize> = (0..field_count).filter(|&i| bodies[i].is_none()).collect();
        let bodies = bodies
            .into_iter()
            .map(|body| body.unwrap_or_else(|| self.layout.missing_sentinel.clone()))
            .collect();

        let status = if missing.is_empty() {
            SegmentStatus::Complete
        } else {
            SegmentStatus::Partial { missing }
        };

        Segments { bodies, status }
    }
}

/// 标题字面量 → 正则
///
/// 标题前的 `#` 和 `*` 视为标题的一部分。以 `*` 开头的标题连同收尾的 `*` 一起吞掉；
/// 没有开头 `*` 的标题，只有在收尾 `*` 之后紧跟换行时才吞掉，避免吃掉正文开头的加粗标记。
fn heading_pattern(heading: &str) -> String {
    let literal = regex::escape(heading.trim());
    format!(
        r"(?i)(?:#+[ \t]*)?(?:\*+[ \t]*{literal}(?:[ \t]*\*+)?|{literal}(?:[ \t]*\*+[ \t]*(?:\r?\n|$))?)"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analysis() -> Segmenter {
        Segmenter::new(&HeadingLayout::new(
            ["Ruta Cognitiva Correcta:", "Análisis de Opciones No Válidas:"],
            "Error al parsear distractores",
            "Error al parsear el análisis",
        ))
        .unwrap()
    }

    fn recommendations() -> Segmenter {
        Segmenter::new(&HeadingLayout::new(
            [
                "RECOMENDACIÓN PARA FORTALECER",
                "RECOMENDACIÓN PARA AVANZAR",
                "OPORTUNIDAD DE MEJORA",
            ],
            "No generada.",
            "Error al parsear recomendaciones",
        ))
        .unwrap()
    }

    #[test]
    fn test_both_headings_present() {
        let text = "Ruta Cognitiva Correcta:\n  El estudiante identifica.  \n\nAnálisis de Opciones No Válidas:\n- Opción A: error\n";
        let segments = analysis().segment(text);

        assert_eq!(segments.status, SegmentStatus::Complete);
        assert_eq!(segments.body(0), "El estudiante identifica.");
        assert_eq!(segments.body(1), "- Opción A: error");
    }

    #[test]
    fn test_headings_are_case_insensitive() {
        let text = "ruta cognitiva correcta: uno\nANÁLISIS DE OPCIONES NO VÁLIDAS: dos";
        let segments = analysis().segment(text);

        assert_eq!(segments.body(0), "uno");
        assert_eq!(segments.body(1), "dos");
    }

    #[test]
    fn test_secondary_missing_uses_sentinel() {
        let text = "Ruta Cognitiva Correcta:\nTodo el texto restante.\n- Opción A: algo";
        let segments = analysis().segment(text);

        assert_eq!(segments.status, SegmentStatus::Partial { missing: vec![1] });
        assert_eq!(segments.body(0), "Todo el texto restante.\n- Opción A: algo");
        assert_eq!(segments.body(1), "Error al parsear distractores");
    }

    #[test]
    fn test_primary_missing_assigns_whole_text() {
        let text = "  Respuesta sin formato.  ";
        let segments = analysis().segment(text);

        assert_eq!(segments.status, SegmentStatus::PrimaryMissing);
        assert_eq!(segments.body(0), "Respuesta sin formato.");
        assert_eq!(segments.body(1), "Error al parsear el análisis");
    }

    #[test]
    fn test_markdown_decoration_stays_out_of_bodies() {
        let text = "**Ruta Cognitiva Correcta:**\nX.\n\n## Análisis de Opciones No Válidas:\n- Opción A: err A";
        let segments = analysis().segment(text);

        assert_eq!(segments.body(0), "X.");
        assert_eq!(segments.body(1), "- Opción A: err A");
    }

    #[test]
    fn test_bold_text_opening_the_body_is_kept() {
        let text = "Ruta Cognitiva Correcta: **Para** responder, el estudiante compara.\nAnálisis de Opciones No Válidas:\n- Opción A: err A";
        let segments = analysis().segment(text);

        assert_eq!(segments.body(0), "**Para** responder, el estudiante compara.");
        assert_eq!(segments.body(1), "- Opción A: err A");
    }

    #[test]
    fn test_trailing_stars_before_line_break_are_dropped() {
        let text = "Ruta Cognitiva Correcta: **\nX.\nAnálisis de Opciones No Válidas:\n- Opción A: err A";
        let segments = analysis().segment(text);

        assert_eq!(segments.body(0), "X.");
    }

    #[test]
    fn test_three_field_layout_with_middle_missing() {
        let text = "RECOMENDACIÓN PARA FORTALECER\nJugar.\nOPORTUNIDAD DE MEJORA\nSe recomienda que...";
        let segments = recommendations().segment(text);

        assert_eq!(segments.body(0), "Jugar.");
        assert_eq!(segments.body(1), "No generada.");
        assert_eq!(segments.body(2), "Se recomienda que...");
        assert_eq!(segments.status, SegmentStatus::Partial { missing: vec![1] });
    }

    #[test]
    fn test_secondary_before_primary_is_ignored() {
        let text = "Intro OPORTUNIDAD DE MEJORA previa.\nRECOMENDACIÓN PARA FORTALECER\nA\nRECOMENDACIÓN PARA AVANZAR\nB";
        let segments = recommendations().segment(text);

        assert_eq!(segments.body(0), "A");
        assert_eq!(segments.body(1), "B");
        assert_eq!(segments.body(2), "No generada.");
    }
}

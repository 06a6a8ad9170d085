//! 字段提取与提示词构建

use std::collections::HashMap;

use crate::error::TemplateError;
use crate::models::fields::SOURCE_FIELDS;
use crate::models::record::Record;

/// 模板变量上下文：变量名 → 字符串值
///
/// 每次构建提示词时重新生成，不跨阶段共享。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldContext {
    values: HashMap<String, String>,
}

impl FieldContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加（或覆盖）一个计算得到的变量
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }
}

/// 从记录中提取全部源字段，缺失的列映射为空字符串
pub fn extract_fields(record: &Record) -> FieldContext {
    let mut context = FieldContext::new();
    for &name in SOURCE_FIELDS {
        context.insert(name, record.get_or_empty(name));
    }
    context
}

/// 用上下文替换模板中的全部 `{name}` 占位符
///
/// 模板引用了上下文中不存在的变量时返回 [`TemplateError::MissingVariable`]。
pub fn build_prompt(template: &str, context: &FieldContext) -> Result<String, TemplateError> {
    let mut prompt = String::with_capacity(template.len());
    for piece in scan(template)? {
        match piece {
            Piece::Literal(text) => prompt.push_str(text),
            Piece::Placeholder(name) => {
                let value = context
                    .get(name)
                    .ok_or_else(|| TemplateError::MissingVariable {
                        name: name.to_string(),
                    })?;
                prompt.push_str(value);
            }
        }
    }
    Ok(prompt)
}

/// 模板中引用的全部变量名（按出现顺序，去重）
pub fn placeholders(template: &str) -> Result<Vec<String>, TemplateError> {
    let mut names: Vec<String> = Vec::new();
    for piece in scan(template)? {
        if let Piece::Placeholder(name) = piece {
            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
    }
    Ok(names)
}

/// 检查模板只引用了 `available` 中的变量
pub fn check_template(template: &str, available: &[&str]) -> Result<(), TemplateError> {
    for name in placeholders(template)? {
        if !available.contains(&name.as_str()) {
            return Err(TemplateError::MissingVariable { name });
        }
    }
    Ok(())
}

enum Piece<'a> {
    Literal(&'a str),
    Placeholder(&'a str),
}

fn scan(template: &str) -> Result<Vec<Piece<'_>>, TemplateError> {
    let mut pieces = Vec::new();
    let bytes = template.as_bytes();
    let mut literal_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'{' if bytes.get(i + 1) == Some(&b'{') => {
                pieces.push(Piece::Literal(&template[literal_start..i + 1]));
                i += 2;
                literal_start = i;
            }
            b'}' if bytes.get(i + 1) == Some(&b'}') => {
                pieces.push(Piece::Literal(&template[literal_start..i + 1]));
                i += 2;
                literal_start = i;
            }
            b'{' => {
                let close = template[i + 1..]
                    .find(['{', '}'])
                    .filter(|&offset| bytes[i + 1 + offset] == b'}')
                    .ok_or(TemplateError::UnclosedPlaceholder { position: i })?;
                pieces.push(Piece::Literal(&template[literal_start..i]));
                pieces.push(Piece::Placeholder(&template[i + 1..i + 1 + close]));
                i += close + 2;
                literal_start = i;
            }
            _ => i += 1,
        }
    }
    pieces.push(Piece::Literal(&template[literal_start..]));

    Ok(pieces)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompts::templates;

    #[test]
    fn test_extract_fields_fills_missing_with_empty() {
        let record = Record::from_iter([("OpcionA", "uno"), ("Columna extra", "x")]);
        let context = extract_fields(&record);

        assert_eq!(context.get("OpcionA"), Some("uno"));
        assert_eq!(context.get("OpcionB"), Some(""));
        assert_eq!(context.get("Tipologia Textual"), Some(""));
        assert_eq!(context.get("Columna extra"), None);
        for name in SOURCE_FIELDS {
            assert!(context.contains(name));
        }
    }

    #[test]
    fn test_build_prompt_substitutes_and_unescapes() {
        let context = FieldContext::new().with("a", "1").with("b c", "2");
        let prompt = build_prompt("x={a}, y={b c}, json={{\"k\": {a}}}", &context).unwrap();
        assert_eq!(prompt, "x=1, y=2, json={\"k\": 1}");
    }

    #[test]
    fn test_build_prompt_missing_variable() {
        let context = FieldContext::new().with("a", "1");
        let err = build_prompt("{a} {b}", &context).unwrap_err();
        assert!(matches!(err, TemplateError::MissingVariable { ref name } if name == "b"));
    }

    #[test]
    fn test_unclosed_placeholder() {
        let context = FieldContext::new();
        let err = build_prompt("hola {nombre", &context).unwrap_err();
        assert!(matches!(err, TemplateError::UnclosedPlaceholder { position: 5 }));
    }

    #[test]
    fn test_values_are_not_rescanned() {
        let context = FieldContext::new().with("a", "{b}");
        assert_eq!(build_prompt("{a}", &context).unwrap(), "{b}");
    }

    #[test]
    fn test_builtin_analysis_template_uses_only_source_fields() {
        check_template(templates::ANALYSIS, SOURCE_FIELDS).unwrap();

        let names = placeholders(templates::ANALYSIS).unwrap();
        assert!(names.contains(&"AlternativaClave".to_string()));
        assert!(!names.iter().any(|n| n.contains("Letra")));
    }

    #[test]
    fn test_builtin_templates_build_from_record() {
        let record = Record::from_iter([("ItemEnunciado", "¿Cuál?"), ("AlternativaClave", "B")]);
        let prompt = build_prompt(templates::ANALYSIS, &extract_fields(&record)).unwrap();

        assert!(prompt.contains("- Enunciado: ¿Cuál?"));
        assert!(prompt.contains("la opción B es la correcta"));
        assert!(!prompt.contains('{'));
    }
}

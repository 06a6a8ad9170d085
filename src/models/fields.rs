//! 源字段与派生字段定义

use std::fmt;

/// 提示词模板可以引用的源字段
///
/// 缺失的列或空值一律视为空字符串。
pub const SOURCE_FIELDS: &[&str] = &[
    "ItemContexto",
    "ItemEnunciado",
    "ComponenteNombre",
    "CompetenciaNombre",
    "AfirmacionNombre",
    "EvidenciaNombre",
    "Tipologia Textual",
    "ItemGradoId",
    "Analisis_Errores",
    "AlternativaClave",
    "OpcionA",
    "OpcionB",
    "OpcionC",
    "OpcionD",
];

/// 正确选项所在的列
pub const KEY_COLUMN: &str = "AlternativaClave";

/// 选项字母
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OptionLetter {
    A,
    B,
    C,
    D,
}

impl OptionLetter {
    pub const ALL: [OptionLetter; 4] = [
        OptionLetter::A,
        OptionLetter::B,
        OptionLetter::C,
        OptionLetter::D,
    ];

    pub fn as_char(self) -> char {
        match self {
            OptionLetter::A => 'A',
            OptionLetter::B => 'B',
            OptionLetter::C => 'C',
            OptionLetter::D => 'D',
        }
    }

    /// 解析字母（忽略大小写和首尾空白）
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "A" => Some(OptionLetter::A),
            "B" => Some(OptionLetter::B),
            "C" => Some(OptionLetter::C),
            "D" => Some(OptionLetter::D),
            _ => None,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for OptionLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// 流水线写入的派生列
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DerivedField {
    QueEvalua,
    JustificacionCorrecta,
    AnalisisDistractores,
    Justificacion(OptionLetter),
    RecomendacionFortalecer,
    RecomendacionAvanzar,
    OportunidadDeMejora,
}

impl DerivedField {
    /// 全部派生列，按输出表中的列顺序排列
    pub const ALL: [DerivedField; 10] = [
        DerivedField::QueEvalua,
        DerivedField::JustificacionCorrecta,
        DerivedField::AnalisisDistractores,
        DerivedField::Justificacion(OptionLetter::A),
        DerivedField::Justificacion(OptionLetter::B),
        DerivedField::Justificacion(OptionLetter::C),
        DerivedField::Justificacion(OptionLetter::D),
        DerivedField::RecomendacionFortalecer,
        DerivedField::RecomendacionAvanzar,
        DerivedField::OportunidadDeMejora,
    ];

    /// 输出表中的列名
    pub fn column(self) -> &'static str {
        match self {
            DerivedField::QueEvalua => "Que_Evalua",
            DerivedField::JustificacionCorrecta => "Justificacion_Correcta",
            DerivedField::AnalisisDistractores => "Analisis_Distractores",
            DerivedField::Justificacion(OptionLetter::A) => "Justificacion_A",
            DerivedField::Justificacion(OptionLetter::B) => "Justificacion_B",
            DerivedField::Justificacion(OptionLetter::C) => "Justificacion_C",
            DerivedField::Justificacion(OptionLetter::D) => "Justificacion_D",
            DerivedField::RecomendacionFortalecer => "Recomendacion_Fortalecer",
            DerivedField::RecomendacionAvanzar => "Recomendacion_Avanzar",
            DerivedField::OportunidadDeMejora => "oportunidad_de_mejora",
        }
    }

    /// 全部派生列名
    pub fn columns() -> impl Iterator<Item = &'static str> {
        Self::ALL.iter().map(|field| field.column())
    }
}

/// 单条记录的派生字段集合
///
/// 每个字段都有值；初始为空字符串，由各阶段覆盖。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DerivedFields {
    pub que_evalua: String,
    pub justificacion_correcta: String,
    pub analisis_distractores: String,
    pub justificaciones: [String; 4],
    pub recomendacion_fortalecer: String,
    pub recomendacion_avanzar: String,
    pub oportunidad_de_mejora: String,
}

impl DerivedFields {
    /// 所有字段都设为同一个值（用于失败标记）
    pub fn uniform(value: &str) -> Self {
        let mut fields = Self::default();
        for field in DerivedField::ALL {
            fields.set(field, value.to_string());
        }
        fields
    }

    pub fn get(&self, field: DerivedField) -> &str {
        match field {
            DerivedField::QueEvalua => &self.que_evalua,
            DerivedField::JustificacionCorrecta => &self.justificacion_correcta,
            DerivedField::AnalisisDistractores => &self.analisis_distractores,
            DerivedField::Justificacion(letter) => &self.justificaciones[letter.index()],
            DerivedField::RecomendacionFortalecer => &self.recomendacion_fortalecer,
            DerivedField::RecomendacionAvanzar => &self.recomendacion_avanzar,
            DerivedField::OportunidadDeMejora => &self.oportunidad_de_mejora,
        }
    }

    pub fn set(&mut self, field: DerivedField, value: String) {
        match field {
            DerivedField::QueEvalua => self.que_evalua = value,
            DerivedField::JustificacionCorrecta => self.justificacion_correcta = value,
            DerivedField::AnalisisDistractores => self.analisis_distractores = value,
            DerivedField::Justificacion(letter) => self.justificaciones[letter.index()] = value,
            DerivedField::RecomendacionFortalecer => self.recomendacion_fortalecer = value,
            DerivedField::RecomendacionAvanzar => self.recomendacion_avanzar = value,
            DerivedField::OportunidadDeMejora => self.oportunidad_de_mejora = value,
        }
    }

    pub fn justificacion(&self, letter: OptionLetter) -> &str {
        &self.justificaciones[letter.index()]
    }

    /// 按列顺序遍历 (列名, 值)
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        DerivedField::ALL
            .iter()
            .map(move |field| (field.column(), self.get(*field)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_letter_parse() {
        assert_eq!(OptionLetter::parse(" b "), Some(OptionLetter::B));
        assert_eq!(OptionLetter::parse("D"), Some(OptionLetter::D));
        assert_eq!(OptionLetter::parse(""), None);
        assert_eq!(OptionLetter::parse("E"), None);
    }

    #[test]
    fn test_derived_columns_are_unique_and_ordered() {
        let columns: Vec<&str> = DerivedField::columns().collect();
        assert_eq!(columns.len(), 10);
        assert_eq!(columns[0], "Que_Evalua");
        assert_eq!(columns[9], "oportunidad_de_mejora");
        let mut sorted = columns.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), columns.len());
    }

    #[test]
    fn test_uniform_sets_every_field() {
        let fields = DerivedFields::uniform("ERROR: x");
        assert!(fields.iter().all(|(_, value)| value == "ERROR: x"));
    }
}

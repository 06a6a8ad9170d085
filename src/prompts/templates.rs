//! 内置提示词模板
//!
//! 占位符写作 `{字段名}`，字面花括号写作 `{{` / `}}`。

/// 第一阶段：正确认知路径 + 错误选项分析
pub const ANALYSIS: &str = r#"
Actúa como un experto en psicometría y pedagogía. Tu misión es deconstruir un ítem de evaluación.

--- INSUMOS DEL ÍTEM ---
- Grado: {ItemGradoId}
- Competencia: {CompetenciaNombre}
- Evidencia: {EvidenciaNombre}
- Contexto: {ItemContexto}
- Enunciado: {ItemEnunciado}
- Opción A: {OpcionA}
- Opción B: {OpcionB}
- Opción C: {OpcionC}
- Opción D: {OpcionD}
- Respuesta Clave: {AlternativaClave}

--- INSTRUCCIONES ---

FASE 1: RUTA COGNITIVA
Describe, en un párrafo continuo y de forma impersonal, el procedimiento mental que un estudiante debe ejecutar para llegar a la respuesta correcta.
1. Genera la Ruta Cognitiva usando verbos que representen procesos cognitivos.
2. Revisa que la ruta se alinee con la Competencia ('{CompetenciaNombre}') y la Evidencia ('{EvidenciaNombre}').
3. El último paso debe justificar la elección de la respuesta correcta.

FASE 2: ANÁLISIS DE OPCIONES NO VÁLIDAS
- Para cada opción incorrecta, identifica la naturaleza del error y explica el razonamiento fallido.
- Explica el posible razonamiento que lleva al estudiante a cometer ese error.
- Clarifica por qué esa opción es incorrecta en el contexto de la tarea evaluativa.

--- FORMATO DE SALIDA (REGLA CRÍTICA) ---
Responde únicamente con los dos títulos siguientes, en este orden y sin añadir texto adicional.

Ruta Cognitiva Correcta:
[Párrafo continuo que termina concluyendo que la opción {AlternativaClave} es la correcta y por qué.]

Análisis de Opciones No Válidas:
- **Opción [Letra del distractor]:** El estudiante podría escoger esta opción si comete un error de [naturaleza del error], lo que lo lleva a pensar que [razonamiento erróneo]. Sin embargo, esto es incorrecto porque [razón clara y concisa].
"#;

/// 第二阶段：一句话概括"该题考查什么"
pub const SYNTHESIS: &str = r#"
Actúa como un experto en evaluación. Basado en la siguiente Ruta Cognitiva, redacta una única frase (máximo 2 renglones) que resuma la habilidad principal que se está evaluando.
Reglas:
1. Comienza obligatoriamente con "Este ítem evalúa la capacidad del estudiante para...".
2. Describe procesos cognitivos genéricos, no menciones detalles específicos del ítem.
3. Usa la taxonomía de referencia para que el lenguaje sea preciso.

RUTA COGNITIVA:
---
{ruta_cognitiva_texto}
---

TAXONOMÍA DE REFERENCIA:
- Competencia: {CompetenciaNombre}
- Evidencia de Aprendizaje: {EvidenciaNombre}

RESPUESTA:
"#;

/// 第三阶段（paraphrase 模式）：加强 / 进阶两段建议
pub const RECOMMENDATIONS: &str = r#"
Actúa como un diseñador instruccional experto. Basado en la información del ítem, genera dos recomendaciones distintas.

--- FORMATO DE SALIDA (REGLA CRÍTICA) ---
Usa obligatoriamente la siguiente estructura de encabezados.

RECOMENDACIÓN PARA FORTALECER
[Describe una actividad de aprendizaje creativa y no tradicional para un estudiante que respondió incorrectamente, enfocada en remediar los errores conceptuales.]

RECOMENDACIÓN PARA AVANZAR
[Describe una actividad de profundización o un desafío para un estudiante que respondió correctamente, para llevar su habilidad al siguiente nivel.]

--- INFORMACIÓN DEL ÍTEM Y ANÁLISIS ---
- Qué Evalúa: {que_evalua_sintetizado}
- Análisis completo: {analisis_central_generado}
- Competencia: {CompetenciaNombre}
- Grado: {ItemGradoId}
"#;

/// 第三阶段（combined 模式）：三段建议一次生成
pub const RECOMMENDATIONS_COMBINED: &str = r#"
Actúa como un diseñador instruccional experto. Basado en la información del ítem, genera tres recomendaciones distintas.

--- FORMATO DE SALIDA (REGLA CRÍTICA) ---
Usa obligatoriamente la siguiente estructura de encabezados.

RECOMENDACIÓN PARA FORTALECER
[Describe una actividad de aprendizaje creativa y no tradicional para un estudiante que respondió incorrectamente, enfocada en remediar los errores conceptuales.]

RECOMENDACIÓN PARA AVANZAR
[Describe una actividad de profundización o un desafío para un estudiante que respondió correctamente, para llevar su habilidad al siguiente nivel.]

OPORTUNIDAD DE MEJORA
[Proporciona un consejo práctico y directo basado en el apartado RECOMENDACIÓN PARA FORTALECER. Usa redacción como "Se recomienda que...". Usa lenguaje impersonal.]

--- INFORMACIÓN DEL ÍTEM Y ANÁLISIS ---
- Qué Evalúa: {que_evalua_sintetizado}
- Análisis completo: {analisis_central_generado}
- Competencia: {CompetenciaNombre}
- Grado: {ItemGradoId}
"#;

/// 第四阶段：把"加强"建议改写成改进机会
pub const PARAPHRASE: &str = r#"
Actúa como un asesor pedagógico. Reescribe la siguiente recomendación como un consejo práctico y directo dirigido al docente.
Reglas:
1. Comienza con "Se recomienda que...".
2. Usa lenguaje impersonal y un único párrafo breve.
3. Conserva la actividad propuesta; no agregues información nueva.

RECOMENDACIÓN ORIGINAL:
---
{recomendacion_fortalecer}
---

RESPUESTA:
"#;

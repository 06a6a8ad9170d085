//! 记录流程与批量处理的集成测试
//!
//! 生成服务用按顺序返回预设文本的桩替代，不访问网络，也不等待。

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use item_enricher::error::GenerationError;
use item_enricher::models::{DerivedField, DerivedFields, OptionLetter, RecommendationMode};
use item_enricher::orchestrator::{BatchProcessor, BatchProgress, NoProgress, ProgressReporter};
use item_enricher::services::{GenerationService, NoPacing, Pacer};
use item_enricher::workflow::PipelineState;
use item_enricher::{PromptProfile, Record, RecordCtx, RecordFlow, RecordOutcome, Table};

const ANALYSIS: &str = "Ruta Cognitiva Correcta:\nX.\nAnálisis de Opciones No Válidas:\n- Opción A: err A\n- Opción C: err C\n- Opción D: err D";
const SYNTHESIS: &str = "  Inferir información implícita en un texto narrativo.\n";
const RECOMMENDATIONS: &str = "**RECOMENDACIÓN PARA FORTALECER**\nPracticar inferencias con textos cortos.\n\n**RECOMENDACIÓN PARA AVANZAR**\nComparar dos textos sobre el mismo tema.";
const PARAPHRASE: &str = "Se recomienda practicar inferencias con textos cortos.";

/// 按顺序返回预设结果的生成服务
struct ScriptedGenerator {
    responses: Mutex<VecDeque<Result<String, GenerationError>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    fn new(responses: Vec<Result<String, GenerationError>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn ok(texts: &[&str]) -> Arc<Self> {
        Self::new(texts.iter().map(|t| Ok(t.to_string())).collect())
    }

    fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    fn prompt(&self, index: usize) -> String {
        self.prompts.lock().unwrap()[index].clone()
    }
}

#[async_trait]
impl GenerationService for ScriptedGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(GenerationError::InvalidRequest("脚本已用完".to_string())))
    }

    fn model_name(&self) -> &str {
        "stub"
    }
}

/// 只计数的节奏控制器
#[derive(Default)]
struct CountingPacer {
    waits: AtomicUsize,
}

#[async_trait]
impl Pacer for CountingPacer {
    async fn wait(&self) {
        self.waits.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
struct CollectingReporter {
    seen: Mutex<Vec<BatchProgress>>,
}

impl ProgressReporter for CollectingReporter {
    fn report(&self, progress: BatchProgress, _label: &str) {
        self.seen.lock().unwrap().push(progress);
    }
}

fn record(id: &str, key: &str) -> Record {
    Record::from_iter([
        ("ItemId", id),
        ("ItemEnunciado", "¿Qué se puede inferir del texto?"),
        ("CompetenciaNombre", "Lectura crítica"),
        ("EvidenciaNombre", "Infiere información implícita"),
        ("ItemGradoId", "5"),
        ("AlternativaClave", key),
        ("OpcionA", "El autor miente."),
        ("OpcionB", "El personaje duda."),
        ("OpcionC", "El narrador es un niño."),
        ("OpcionD", "La historia es real."),
    ])
}

fn flow_with(generator: Arc<ScriptedGenerator>, profile: PromptProfile) -> RecordFlow {
    RecordFlow::new(generator, Arc::new(NoPacing), profile).unwrap()
}

fn flow(generator: Arc<ScriptedGenerator>) -> RecordFlow {
    flow_with(generator, PromptProfile::default())
}

fn completed(outcome: RecordOutcome) -> DerivedFields {
    match outcome {
        RecordOutcome::Completed(fields) => fields,
        RecordOutcome::Failed { state, reason } => {
            panic!("记录在「{}」之后失败: {}", state, reason)
        }
    }
}

#[tokio::test]
async fn test_correct_option_copies_cognitive_path() {
    let generator = ScriptedGenerator::ok(&[ANALYSIS, SYNTHESIS, RECOMMENDATIONS, PARAPHRASE]);
    let flow = flow(generator.clone());

    let outcome = flow.run(&record("IT-1", "B"), &RecordCtx::new(1, "IT-1")).await;
    let fields = completed(outcome);

    assert_eq!(fields.justificacion_correcta, "X.");
    assert_eq!(fields.justificacion(OptionLetter::B), "X.");
    assert_eq!(fields.justificacion(OptionLetter::A), "err A");
    assert_eq!(fields.justificacion(OptionLetter::C), "err C");
    assert_eq!(fields.justificacion(OptionLetter::D), "err D");
    assert_eq!(
        fields.analisis_distractores,
        "- Opción A: err A\n- Opción C: err C\n- Opción D: err D"
    );
    assert_eq!(
        fields.que_evalua,
        "Inferir información implícita en un texto narrativo."
    );
    assert_eq!(
        fields.recomendacion_fortalecer,
        "Practicar inferencias con textos cortos."
    );
    assert_eq!(
        fields.recomendacion_avanzar,
        "Comparar dos textos sobre el mismo tema."
    );
    assert_eq!(fields.oportunidad_de_mejora, PARAPHRASE);
    assert_eq!(generator.calls(), 4);
}

#[tokio::test]
async fn test_each_stage_receives_previous_output() {
    let generator = ScriptedGenerator::ok(&[ANALYSIS, SYNTHESIS, RECOMMENDATIONS, PARAPHRASE]);
    let flow = flow(generator.clone());

    flow.run(&record("IT-1", "B"), &RecordCtx::new(1, "IT-1")).await;

    // 第一阶段使用源字段
    assert!(generator.prompt(0).contains("¿Qué se puede inferir del texto?"));
    // 第二阶段使用正确路径
    assert!(generator.prompt(1).contains("X."));
    // 第三阶段使用第一阶段的完整文本和第二阶段的概括
    assert!(generator.prompt(2).contains("- Opción C: err C"));
    assert!(generator.prompt(2).contains("Inferir información implícita"));
    // 第四阶段使用"加强"建议
    assert!(generator.prompt(3).contains("Practicar inferencias con textos cortos."));
}

#[tokio::test]
async fn test_canned_responses_give_identical_fields() {
    let run = || async {
        let generator = ScriptedGenerator::ok(&[ANALYSIS, SYNTHESIS, RECOMMENDATIONS, PARAPHRASE]);
        flow(generator)
            .run(&record("IT-1", "B"), &RecordCtx::new(1, "IT-1"))
            .await
    };

    let first = run().await;
    let second = run().await;
    assert!(first.is_completed());
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_not_generated_strengthen_skips_paraphrase() {
    let recommendations =
        "RECOMENDACIÓN PARA FORTALECER\nNo generada.\nRECOMENDACIÓN PARA AVANZAR\nLeer ensayos.";
    let generator = ScriptedGenerator::ok(&[ANALYSIS, SYNTHESIS, recommendations, PARAPHRASE]);
    let flow = flow(generator.clone());

    let outcome = flow.run(&record("IT-2", "A"), &RecordCtx::new(1, "IT-2")).await;
    let fields = completed(outcome);

    assert_eq!(generator.calls(), 3);
    assert_eq!(
        fields.oportunidad_de_mejora,
        "No hay recomendación para parafrasear."
    );
    assert_eq!(fields.recomendacion_avanzar, "Leer ensayos.");
}

#[tokio::test]
async fn test_empty_strengthen_skips_paraphrase() {
    let recommendations =
        "RECOMENDACIÓN PARA FORTALECER\n\nRECOMENDACIÓN PARA AVANZAR\nLeer ensayos.";
    let generator = ScriptedGenerator::ok(&[ANALYSIS, SYNTHESIS, recommendations]);
    let flow = flow(generator.clone());

    let fields = completed(flow.run(&record("IT-2", "A"), &RecordCtx::new(1, "IT-2")).await);

    assert_eq!(generator.calls(), 3);
    assert_eq!(fields.recomendacion_fortalecer, "");
    assert_eq!(
        fields.oportunidad_de_mejora,
        "No hay recomendación para parafrasear."
    );
}

#[tokio::test]
async fn test_missing_secondary_headings_use_sentinels() {
    let analysis = "Ruta Cognitiva Correcta:\nSolo la ruta.";
    let recommendations = "RECOMENDACIÓN PARA FORTALECER\nRepasar.";
    let generator =
        ScriptedGenerator::ok(&[analysis, SYNTHESIS, recommendations, PARAPHRASE]);
    let flow = flow(generator);

    let fields = completed(flow.run(&record("IT-3", "C"), &RecordCtx::new(1, "IT-3")).await);

    assert_eq!(fields.justificacion_correcta, "Solo la ruta.");
    assert_eq!(fields.analisis_distractores, "Error al parsear distractores");
    assert_eq!(fields.justificacion(OptionLetter::C), "Solo la ruta.");
    assert_eq!(
        fields.justificacion(OptionLetter::A),
        "Análisis del distractor no encontrado."
    );
    assert_eq!(fields.recomendacion_fortalecer, "Repasar.");
    assert_eq!(fields.recomendacion_avanzar, "No generada.");
}

#[tokio::test]
async fn test_combined_mode_takes_improvement_from_third_heading() {
    let recommendations = "RECOMENDACIÓN PARA FORTALECER\nUno.\nRECOMENDACIÓN PARA AVANZAR\nDos.\nOPORTUNIDAD DE MEJORA\nTres.";
    let generator = ScriptedGenerator::ok(&[ANALYSIS, SYNTHESIS, recommendations]);
    let profile = PromptProfile {
        recommendation_mode: RecommendationMode::Combined,
        ..PromptProfile::default()
    };
    let flow = flow_with(generator.clone(), profile);

    let fields = completed(flow.run(&record("IT-4", "B"), &RecordCtx::new(1, "IT-4")).await);

    assert_eq!(generator.calls(), 3);
    assert_eq!(fields.recomendacion_fortalecer, "Uno.");
    assert_eq!(fields.recomendacion_avanzar, "Dos.");
    assert_eq!(fields.oportunidad_de_mejora, "Tres.");
}

#[tokio::test]
async fn test_pacing_between_calls_within_record() {
    let generator = ScriptedGenerator::ok(&[ANALYSIS, SYNTHESIS, RECOMMENDATIONS, PARAPHRASE]);
    let pacer = Arc::new(CountingPacer::default());
    let flow = RecordFlow::new(generator, pacer.clone(), PromptProfile::default()).unwrap();

    flow.run(&record("IT-1", "B"), &RecordCtx::new(1, "IT-1")).await;

    assert_eq!(pacer.waits.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_stage_two_failure_overwrites_every_field() {
    let generator = ScriptedGenerator::new(vec![
        Ok(ANALYSIS.to_string()),
        Err(GenerationError::BadStatus {
            model: "stub".to_string(),
            status: 429,
            body: "quota".to_string(),
        }),
    ]);
    let flow = flow(generator.clone());

    let outcome = flow.run(&record("IT-5", "B"), &RecordCtx::new(1, "IT-5")).await;

    match &outcome {
        RecordOutcome::Failed { state, reason } => {
            assert_eq!(*state, PipelineState::AnalysisDone);
            assert!(reason.starts_with("el servicio respondió con el estado 429"));
        }
        RecordOutcome::Completed(_) => panic!("应当失败"),
    }
    assert_eq!(generator.calls(), 2);

    let fields = outcome.into_fields("ERROR: ");
    let values: Vec<&str> = fields.iter().map(|(_, value)| value).collect();
    assert_eq!(values.len(), DerivedField::ALL.len());
    assert!(values[0].starts_with("ERROR: "));
    assert!(values.iter().all(|value| *value == values[0]));
    // 第一阶段已经得到的内容不保留
    assert_ne!(fields.justificacion_correcta, "X.");
}

#[tokio::test]
async fn test_batch_continues_after_failure_and_fills_every_column() {
    let generator = ScriptedGenerator::new(vec![
        // 第一条：第二阶段失败
        Ok(ANALYSIS.to_string()),
        Err(GenerationError::EmptyResponse {
            model: "stub".to_string(),
        }),
        // 第二条：成功
        Ok(ANALYSIS.to_string()),
        Ok(SYNTHESIS.to_string()),
        Ok(RECOMMENDATIONS.to_string()),
        Ok(PARAPHRASE.to_string()),
    ]);
    let flow = flow(generator);
    let table = Table::new(
        vec!["ItemId".to_string(), "AlternativaClave".to_string()],
        vec![record("IT-1", "B"), record("IT-2", "B")],
    );
    let reporter = CollectingReporter::default();

    let (table, stats) = BatchProcessor::new(&flow, "ItemId")
        .process(table, &reporter)
        .await;

    assert_eq!((stats.success, stats.failed, stats.total), (1, 1, 2));

    for column in DerivedField::columns() {
        assert!(table.has_column(column), "缺少列 {}", column);
        for row in &table.rows {
            assert!(row.get(column).is_some(), "行缺少字段 {}", column);
        }
    }

    assert!(table.rows[0]
        .get_or_empty("Que_Evalua")
        .starts_with("ERROR: "));
    assert_eq!(table.rows[1].get_or_empty("Justificacion_B"), "X.");

    let seen = reporter.seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen.last().map(BatchProgress::fraction), Some(1.0));
}

#[tokio::test]
async fn test_empty_table_gets_derived_columns() {
    let generator = ScriptedGenerator::ok(&[]);
    let flow = flow(generator.clone());

    let (table, stats) = BatchProcessor::new(&flow, "ItemId")
        .process(Table::new(vec!["ItemId".to_string()], vec![]), &NoProgress)
        .await;

    assert_eq!(stats.total, 0);
    assert_eq!(generator.calls(), 0);
    assert_eq!(table.columns.len(), 1 + DerivedField::ALL.len());
}

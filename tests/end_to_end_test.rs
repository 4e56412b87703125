//! End-to-end integration tests for fuelstat
//!
//! These tests run complete workflows against a mock FULTec deployment:
//! authentication, filtered fetch, aggregation, and final output.

mod common;

use chrono::NaiveDate;
use clap::Parser;
use common::{mount_token, mount_transactions, sample_records};
use fuelstat::cli::Cli;
use fuelstat::dashboard::{Dashboard, WindowSpec};
use fuelstat_assistant::{CommandInterpreter, DashboardAction, ExtraFilters};
use fuelstat_core::FuelstatError;
use fuelstat_core::config::AssistantSettings;
use fuelstat_core::types::{ChartMode, TimeWindow};
use fuelstat_terminal::export::export_to_path;
use fuelstat_terminal::{ChartRenderer, JsonFormatter, OutputFormatter, TableFormatter};
use serde_json::{Value, json};
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn march(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
}

/// 2024-03-01 00:00 through 2024-03-03 23:59
fn first_three_days() -> TimeWindow {
    WindowSpec {
        end_date: Some(march(3)),
        ..Default::default()
    }
    .resolve(march(3))
    .unwrap()
}

fn table_formatter() -> TableFormatter {
    TableFormatter::new(ChartRenderer::with_size(70, 10))
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[tokio::test]
async fn test_filtered_fetch_to_snapshot() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/abastecimento"))
        .and(header("authorization", "Bearer tok-integration"))
        .and(query_param(
            "$filter",
            "dhRegistro ge 2024-03-01T00:00:00 and dhRegistro lt 2024-03-04T00:00:00 \
             and contains(nivel, 'Pista')",
        ))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "abastecimentos": sample_records() })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dashboard = Dashboard::new(common::client(&server));
    let extras = ExtraFilters {
        level: Some("Pista".to_string()),
        ..Default::default()
    };
    let snapshot = dashboard
        .snapshot(first_three_days(), &extras)
        .await
        .unwrap();

    assert_eq!(snapshot.kpis.count, 6);
    assert!(approx(snapshot.kpis.total_value, 600.0));
    assert!(approx(snapshot.kpis.total_liters, 100.0));
    assert!(approx(snapshot.kpis.average_ticket, 100.0));

    let days: Vec<(NaiveDate, f64)> = snapshot
        .trend
        .iter()
        .map(|d| (d.day, d.total_value))
        .collect();
    assert_eq!(
        days,
        vec![(march(1), 210.0), (march(2), 240.0), (march(3), 150.0)]
    );

    let names: Vec<&str> = snapshot
        .employees
        .iter()
        .map(|e| e.employee_name.as_str())
        .collect();
    assert_eq!(names, common::TEST_EMPLOYEES);
    assert!(approx(snapshot.employees[0].total_value, 330.0));
}

#[tokio::test]
async fn test_dashboard_table_output() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    mount_transactions(&server, sample_records()).await;

    let snapshot = Dashboard::new(common::client(&server))
        .snapshot(first_three_days(), &ExtraFilters::default())
        .await
        .unwrap();
    let output = table_formatter().format_dashboard(&snapshot.view(ChartMode::Bars, 2, true));

    assert!(output.contains("Período: 01/03/2024 00:00 até 03/03/2024 23:59"));
    assert!(output.contains("R$ 600,00"));
    assert!(output.contains("100,00 L"));
    assert!(output.contains("=== Top 2 colaboradores ==="));
    assert!(output.contains("Outros"));
    assert!(output.contains("R$ 330,00"));
}

#[tokio::test]
async fn test_dashboard_json_output() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    mount_transactions(&server, sample_records()).await;

    let snapshot = Dashboard::new(common::client(&server))
        .snapshot(first_three_days(), &ExtraFilters::default())
        .await
        .unwrap();
    let output = JsonFormatter.format_dashboard(&snapshot.view(ChartMode::Area, 10, true));
    let value: Value = serde_json::from_str(&output).unwrap();

    assert_eq!(value["window"]["start"], "2024-03-01T00:00:00");
    assert_eq!(value["window"]["end"], "2024-03-04T00:00:00");
    assert_eq!(value["kpis"]["count"], 6);
    assert_eq!(value["trend"]["mode"], "area");
    assert_eq!(value["trend"]["daily"].as_array().unwrap().len(), 3);
    assert_eq!(
        value["top_employees"]["employees"].as_array().unwrap().len(),
        3
    );
}

#[tokio::test]
async fn test_empty_period() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    mount_transactions(&server, json!([])).await;

    let snapshot = Dashboard::new(common::client(&server))
        .snapshot(first_three_days(), &ExtraFilters::default())
        .await
        .unwrap();

    assert_eq!(snapshot.kpis.count, 0);
    assert!(approx(snapshot.kpis.average_ticket, 0.0));
    assert!(snapshot.trend.is_empty());
    assert!(snapshot.employees.is_empty());

    let output = table_formatter().format_dashboard(&snapshot.view(ChartMode::Line, 10, true));
    assert!(output.contains("Sem dados para o período selecionado."));
}

#[tokio::test]
async fn test_cached_source_fetches_once() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    Mock::given(method("GET"))
        .and(path("/abastecimento"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "abastecimentos": sample_records() })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dashboard = Dashboard::new(common::cached_client(&server, Duration::from_secs(60)));
    let window = first_three_days();
    let first = dashboard.snapshot(window, &ExtraFilters::default()).await.unwrap();
    let second = dashboard.snapshot(window, &ExtraFilters::default()).await.unwrap();
    assert_eq!(first.kpis, second.kpis);
}

#[tokio::test]
async fn test_export_loaded_table() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    mount_transactions(&server, sample_records()).await;

    let table = Dashboard::new(common::client(&server))
        .load(first_three_days(), &ExtraFilters::default())
        .await
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("abastecimentos.csv");
    export_to_path(&table, &path).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    let mut lines = text.lines();
    let header = lines.next().unwrap();
    assert!(header.starts_with("dhRegistro,"));
    assert!(header.contains("nomeVendedor"));
    assert_eq!(lines.count(), 6);
    assert!(text.contains("Carla Dias"));
}

#[tokio::test]
async fn test_unreachable_api_is_a_network_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let result = Dashboard::new(common::client(&server))
        .snapshot(first_three_days(), &ExtraFilters::default())
        .await;
    assert!(matches!(result, Err(FuelstatError::Network(_))));
}

#[tokio::test]
async fn test_assistant_command_drives_dashboard() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    mount_transactions(&server, sample_records()).await;

    let reply = json!({
        "acao": "mostrar_top_colaboradores",
        "filtros": {
            "data_inicial": "2024-03-01",
            "hora_inicial": "00:00",
            "data_final": "2024-03-03",
            "hora_final": "23:59"
        },
        "filtros_extras": {"produto": "", "colaborador": "", "nivel": ""},
        "parametros": {"top_n": 1}
    })
    .to_string();
    Mock::given(method("POST"))
        .and(path("/responses"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"output_text": reply})))
        .mount(&server)
        .await;

    let interpreter = CommandInterpreter::new(AssistantSettings {
        api_key: "sk-test".to_string(),
        base_url: server.uri(),
        model: "gpt-4o-mini".to_string(),
    });
    let command = interpreter
        .interpret("melhor frentista do mês", march(3))
        .await
        .unwrap();
    assert_eq!(command.action, DashboardAction::ShowTopEmployees { top_n: 1 });
    assert_eq!(command.window, first_three_days());

    let snapshot = Dashboard::new(common::client(&server))
        .snapshot(command.window, &command.extras)
        .await
        .unwrap();
    let output = snapshot.render_command(&table_formatter(), &command);
    assert!(output.contains("=== Top 1 colaboradores ==="));
    assert!(!output.contains("=== Tendência diária ==="));
}

#[tokio::test]
async fn test_invalid_assistant_reply_falls_back_to_line_trend() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    mount_transactions(&server, sample_records()).await;
    Mock::given(method("POST"))
        .and(path("/responses"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"output_text": "Desculpe, não sei."})),
        )
        .mount(&server)
        .await;

    let interpreter = CommandInterpreter::new(AssistantSettings {
        api_key: "sk-test".to_string(),
        base_url: server.uri(),
        model: "gpt-4o-mini".to_string(),
    });
    let err = interpreter.interpret("???", march(3)).await.unwrap_err();
    assert!(err.to_string().contains("Desculpe, não sei."));

    let cli = Cli::parse_from(["fuelstat", "--end-date", "2024-03-03", "ask", "???"]);
    let window = cli.window_spec().unwrap().resolve(march(3)).unwrap();
    let command = cli.fallback_command(window);
    let snapshot = Dashboard::new(common::client(&server))
        .snapshot(command.window, &command.extras)
        .await
        .unwrap();
    let output = snapshot.render_command(&table_formatter(), &command);
    assert!(output.contains("=== Tendência diária ==="));
    assert!(output.contains("=== Top 10 colaboradores ==="));
}

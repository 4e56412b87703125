//! Dashboard commands and validation of the model's JSON reply
//!
//! The reply is first deserialized into a loose mirror of the prompt's
//! schema, then converted into a [`DashboardCommand`]. Any failure in either
//! step becomes [`FuelstatError::AssistantResponse`] carrying the raw text.

use chrono::{NaiveDate, NaiveTime};
use fuelstat_core::error::{FuelstatError, Result};
use fuelstat_core::types::{ChartMode, TimeWindow};
use serde::Deserialize;
use serde_json::Value;

/// Ranking size when the reply does not set `top_n`
pub const DEFAULT_TOP_N: usize = 10;

pub const ACTION_KPIS: &str = "mostrar_kpis";
pub const ACTION_TREND: &str = "mostrar_tendencia";
pub const ACTION_TOP_EMPLOYEES: &str = "mostrar_top_colaboradores";

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M";

/// What the dashboard should emphasise
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardAction {
    ShowKpis,
    ShowTrend { mode: ChartMode },
    ShowTopEmployees { top_n: usize },
}

/// Substring filters requested alongside the action
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtraFilters {
    pub product: Option<String>,
    pub employee: Option<String>,
    pub level: Option<String>,
}

/// A validated command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardCommand {
    pub action: DashboardAction,
    pub window: TimeWindow,
    pub extras: ExtraFilters,
    /// `parametros.top_n` as sent, whatever the action
    pub top_n: Option<usize>,
}

impl DashboardCommand {
    /// Ranking size for the always-visible employee section
    pub fn ranking_size(&self) -> usize {
        match self.action {
            DashboardAction::ShowTopEmployees { top_n } => top_n,
            _ => self.top_n.unwrap_or(DEFAULT_TOP_N),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawCommand {
    acao: String,
    filtros: RawWindow,
    #[serde(default)]
    filtros_extras: RawExtras,
    #[serde(default)]
    parametros: RawParams,
}

#[derive(Debug, Deserialize)]
struct RawWindow {
    data_inicial: String,
    hora_inicial: String,
    data_final: String,
    hora_final: String,
}

#[derive(Debug, Default, Deserialize)]
struct RawExtras {
    produto: Option<String>,
    colaborador: Option<String>,
    nivel: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawParams {
    top_n: Option<Value>,
    modo: Option<String>,
}

impl TryFrom<RawCommand> for DashboardCommand {
    type Error = String;

    fn try_from(raw: RawCommand) -> std::result::Result<Self, Self::Error> {
        let window = raw.filtros.into_window()?;
        let top_n = raw.parametros.top_n.as_ref().map(parse_top_n).transpose()?;

        let action = match raw.acao.trim() {
            ACTION_KPIS => DashboardAction::ShowKpis,
            ACTION_TREND => DashboardAction::ShowTrend {
                mode: raw
                    .parametros
                    .modo
                    .as_deref()
                    .filter(|m| !m.trim().is_empty())
                    .map(ChartMode::from_name_or_bars)
                    .unwrap_or_default(),
            },
            ACTION_TOP_EMPLOYEES => DashboardAction::ShowTopEmployees {
                top_n: top_n.unwrap_or(DEFAULT_TOP_N),
            },
            other => return Err(format!("unknown action '{other}'")),
        };

        Ok(Self {
            action,
            window,
            extras: ExtraFilters {
                product: non_blank(raw.filtros_extras.produto),
                employee: non_blank(raw.filtros_extras.colaborador),
                level: non_blank(raw.filtros_extras.nivel),
            },
            top_n,
        })
    }
}

impl RawWindow {
    fn into_window(self) -> std::result::Result<TimeWindow, String> {
        let start_date = parse_date(&self.data_inicial, "data_inicial")?;
        let start_time = parse_time(&self.hora_inicial, "hora_inicial")?;
        let end_date = parse_date(&self.data_final, "data_final")?;
        let end_time = parse_time(&self.hora_final, "hora_final")?;
        TimeWindow::from_inclusive_minutes(start_date, start_time, end_date, end_time)
            .map_err(|e| e.to_string())
    }
}

fn parse_date(value: &str, field: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|_| format!("{field} '{value}' is not YYYY-MM-DD"))
}

fn parse_time(value: &str, field: &str) -> std::result::Result<NaiveTime, String> {
    NaiveTime::parse_from_str(value.trim(), TIME_FORMAT)
        .map_err(|_| format!("{field} '{value}' is not HH:MM"))
}

fn parse_top_n(value: &Value) -> std::result::Result<usize, String> {
    let n = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    match n {
        Some(n) if n > 0 => Ok(n as usize),
        _ => Err(format!("top_n must be a positive integer, got {value}")),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Remove a surrounding markdown code fence, if any
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Parse and validate the model's reply
pub fn parse_command(raw: &str) -> Result<DashboardCommand> {
    let invalid = |reason: String| FuelstatError::AssistantResponse {
        reason,
        raw: raw.to_string(),
    };

    let parsed: RawCommand = serde_json::from_str(strip_code_fence(raw))
        .map_err(|e| invalid(format!("not valid command JSON: {e}")))?;
    DashboardCommand::try_from(parsed).map_err(invalid)
}

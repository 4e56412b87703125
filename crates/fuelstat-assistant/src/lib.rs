//! Natural-language commands for the fuelstat dashboard
//!
//! Free text is sent to a language-model API that answers with a small JSON
//! schema; the reply is validated into a [`DashboardCommand`].

pub mod command;
pub mod interpreter;

pub use command::{DashboardAction, DashboardCommand, ExtraFilters, parse_command};
pub use interpreter::CommandInterpreter;

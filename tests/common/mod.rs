//! Common test utilities and helpers for fuelstat tests
//!
//! Provides a mock FULTec deployment (token and transaction endpoints on a
//! wiremock server) and a small month of sample transactions.

use fuelstat_api::{FetchCache, FuelApiClient};
use fuelstat_core::config::{ApiSettings, Credentials};
use fuelstat_core::timezone::TimezoneConfig;
use serde_json::{Value, json};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TEST_TOKEN: &str = "tok-integration";

/// Employees appearing in [`sample_records`]
#[allow(dead_code)]
pub const TEST_EMPLOYEES: &[&str] = &["Ana Souza", "Bruno Lima", "Carla Dias"];

/// Settings pointing at the mock server, with caching disabled
pub fn settings(server: &MockServer) -> ApiSettings {
    ApiSettings::new(
        server.uri(),
        Credentials::new("posto", "segredo", "12345678000199"),
    )
    .with_timeout(Duration::from_secs(5))
    .with_cache_ttl(Duration::ZERO)
}

#[allow(dead_code)]
pub fn client(server: &MockServer) -> FuelApiClient {
    FuelApiClient::new(&settings(server), TimezoneConfig::default())
}

#[allow(dead_code)]
pub fn cached_client(server: &MockServer, ttl: Duration) -> FetchCache<FuelApiClient> {
    FetchCache::new(client(server), ttl)
}

/// Token endpoint answering with [`TEST_TOKEN`]
pub async fn mount_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"token": TEST_TOKEN, "expires_in": 3600})),
        )
        .mount(server)
        .await;
}

/// Transaction endpoint answering every request with `records`
#[allow(dead_code)]
pub async fn mount_transactions(server: &MockServer, records: Value) {
    Mock::given(method("GET"))
        .and(path("/abastecimento"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "abastecimentos": records })))
        .mount(server)
        .await;
}

/// Six transactions over three days in March 2024
///
/// Totals: 600.00 in value and 100.0 liters. Ana 330.00, Bruno 180.00,
/// Carla 90.00 (recorded only as seller).
pub fn sample_records() -> Value {
    json!([
        {
            "dhRegistro": "2024-03-01T07:10:00",
            "valor": 120.0,
            "litragem": 20.0,
            "produto": "GASOLINA COMUM",
            "idFuncionario": 1,
            "nomeFuncionario": "Ana Souza",
            "idNivel": 1,
            "nivel": "Pista"
        },
        {
            "dhRegistro": "2024-03-01T12:45:00",
            "valor": "90,00",
            "litragem": "15,0",
            "produto": "ETANOL",
            "idFuncionario": 2,
            "nomeFuncionario": "Bruno Lima",
            "idNivel": 1,
            "nivel": "Pista"
        },
        {
            "dhRegistro": "2024-03-02T09:00:00",
            "valor": 150.0,
            "litragem": 25.0,
            "produto": "DIESEL S10",
            "idFuncionario": 1,
            "nomeFuncionario": "Ana Souza",
            "idNivel": 2,
            "nivel": "Conveniencia"
        },
        {
            "dhRegistro": "2024-03-02T18:30:00",
            "valor": 90.0,
            "litragem": 15.0,
            "produto": "GASOLINA COMUM",
            "idFuncionario": 2,
            "nomeFuncionario": "Bruno Lima",
            "idNivel": 1,
            "nivel": "Pista"
        },
        {
            "dhRegistro": "2024-03-03T08:05:00",
            "valor": 90.0,
            "litragem": 15.0,
            "produto": "ETANOL",
            "nomeVendedor": "Carla Dias",
            "idNivel": 1,
            "nivel": "Pista"
        },
        {
            "dhRegistro": "2024-03-03T21:15:00",
            "data": "2024-03-03",
            "valor": 60.0,
            "litragem": 10.0,
            "produto": "GASOLINA ADITIVADA",
            "idFuncionario": 1,
            "nomeFuncionario": "Ana Souza",
            "idNivel": 1,
            "nivel": "Pista"
        }
    ])
}

mod common;

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use sous_chef::client::{self, DirectClient, ProxiedClient, RecipeService};
use sous_chef::config::{ClientMode, Config, ConfigError};
use sous_chef::schema::{DifficultyTier, Operation};

use common::*;

fn pantry() -> Vec<String> {
    vec!["egg".to_string(), "onion".to_string()]
}

/// Builds both transports over the same kind of stub; each gets its own stub so call
/// records can be compared afterwards.
async fn both_modes(make_stub: impl Fn() -> Arc<StubProvider>) -> (DirectClient, ProxiedClient, Arc<StubProvider>, Arc<StubProvider>) {
    let direct_stub = make_stub();
    let proxied_stub = make_stub();
    let direct = DirectClient::new(chef_with(direct_stub.clone()));
    let addr = spawn(app_with(proxied_stub.clone())).await;
    let proxied = ProxiedClient::new(&format!("http://{addr}/api"), Duration::from_secs(10)).unwrap();
    (direct, proxied, direct_stub, proxied_stub)
}

#[tokio::test]
async fn recipes_are_identical_in_both_modes() {
    let (direct, proxied, direct_stub, proxied_stub) =
        both_modes(|| StubProvider::text(&three_recipes("Atelier"))).await;

    let from_direct = direct.generate_recipes(&pantry(), DifficultyTier::Atelier).await.unwrap();
    let from_proxy = proxied.generate_recipes(&pantry(), DifficultyTier::Atelier).await.unwrap();

    assert_eq!(from_direct.recipes.len(), 3);
    assert_eq!(
        serde_json::to_vec(&from_direct).unwrap(),
        serde_json::to_vec(&from_proxy).unwrap()
    );

    // The provider saw byte-identical calls whichever path was taken.
    let direct_calls = serde_json::to_vec(&direct_stub.recorded()).unwrap();
    let proxied_calls = serde_json::to_vec(&proxied_stub.recorded()).unwrap();
    assert_eq!(direct_calls, proxied_calls);
}

#[tokio::test]
async fn ingredients_are_identical_in_both_modes() {
    let (direct, proxied, direct_stub, proxied_stub) =
        both_modes(|| StubProvider::text("[\"egg\", \"leek\"]")).await;

    let from_direct = direct.analyze_image(PNG_B64).await.unwrap();
    let from_proxy = proxied.analyze_image(PNG_B64).await.unwrap();
    assert_eq!(from_direct, vec!["egg", "leek"]);
    assert_eq!(from_direct, from_proxy);
    assert_eq!(
        serde_json::to_vec(&direct_stub.recorded()).unwrap(),
        serde_json::to_vec(&proxied_stub.recorded()).unwrap()
    );
}

#[tokio::test]
async fn images_are_identical_in_both_modes() {
    let (direct, proxied, _, _) =
        both_modes(|| StubProvider::replying(image_response("image/jpeg", "/9j/4AAQ"))).await;

    let from_direct = direct.generate_image("Onion Veil", "Silken").await.unwrap();
    let from_proxy = proxied.generate_image("Onion Veil", "Silken").await.unwrap();
    assert_eq!(from_direct.as_deref(), Some("data:image/jpeg;base64,/9j/4AAQ"));
    assert_eq!(from_direct, from_proxy);

    let (direct, proxied, _, _) = both_modes(|| StubProvider::text("no picture")).await;
    assert_eq!(direct.generate_image("Onion Veil", "Silken").await.unwrap(), None);
    assert_eq!(proxied.generate_image("Onion Veil", "Silken").await.unwrap(), None);
}

#[tokio::test]
async fn failures_look_the_same_in_both_modes() {
    let (direct, proxied, _, _) = both_modes(StubProvider::failing).await;

    let direct_err = direct.generate_recipes(&pantry(), DifficultyTier::Atelier).await.unwrap_err();
    let proxied_err = proxied.generate_recipes(&pantry(), DifficultyTier::Atelier).await.unwrap_err();

    assert_eq!(direct_err.operation, Operation::GenerateRecipes);
    assert_eq!(proxied_err.operation, Operation::GenerateRecipes);
    assert_eq!(direct_err.to_string(), proxied_err.to_string());
    assert_eq!(direct_err.to_string(), Operation::GenerateRecipes.failure_message());

    // The cause is kept for logs, and the proxy never forwards the provider's text.
    assert!(direct_err.source().unwrap().to_string().contains("quota"));
    assert!(!proxied_err.source().unwrap().to_string().contains("quota"));
}

#[tokio::test]
async fn validation_errors_are_operation_failures_in_both_modes() {
    let (direct, proxied, direct_stub, proxied_stub) =
        both_modes(|| StubProvider::text(&three_recipes("Atelier"))).await;

    let direct_err = direct.generate_recipes(&[], DifficultyTier::Atelier).await.unwrap_err();
    let proxied_err = proxied.generate_recipes(&[], DifficultyTier::Atelier).await.unwrap_err();
    assert_eq!(direct_err.to_string(), proxied_err.to_string());

    let direct_err = direct.analyze_image("").await.unwrap_err();
    assert_eq!(direct_err.operation, Operation::AnalyzeImage);
    assert!(proxied.analyze_image("").await.is_err());

    assert_eq!(direct_stub.calls(), 0);
    assert_eq!(proxied_stub.calls(), 0);
}

#[tokio::test]
async fn unreachable_proxy_is_an_operation_failure() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let proxied = ProxiedClient::new(&format!("http://{addr}/api"), Duration::from_secs(2)).unwrap();
    let err = proxied.analyze_image(PNG_B64).await.unwrap_err();
    assert_eq!(err.to_string(), Operation::AnalyzeImage.failure_message());
}

fn config(pairs: &[(&str, &str)]) -> Config {
    let pairs: Vec<(String, String)> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Config::from_lookup(|key| {
        pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    })
    .unwrap()
}

#[tokio::test]
async fn mode_is_chosen_from_configuration() {
    let proxied = config(&[("SOUSCHEF_MODE", "proxied")]);
    assert_eq!(proxied.mode, ClientMode::Proxied);
    assert!(client::from_config(&proxied).is_ok(), "proxied mode needs no provider key");

    let direct_without_key = config(&[("SOUSCHEF_MODE", "direct")]);
    assert!(matches!(
        client::from_config(&direct_without_key),
        Err(ConfigError::MissingApiKey)
    ));

    let direct = config(&[("SOUSCHEF_MODE", "direct"), ("GEMINI_API_KEY", "test-key")]);
    assert!(client::from_config(&direct).is_ok());
}

#[tokio::test]
async fn proxied_mode_from_configuration_talks_to_the_server() {
    let stub = StubProvider::text(&three_recipes("Haute Couture"));
    let addr = spawn(app_with(stub.clone())).await;
    let base_url = format!("http://{addr}/api");
    let config = config(&[("SOUSCHEF_MODE", "proxied"), ("SOUSCHEF_API_URL", base_url.as_str())]);

    let service: Arc<dyn RecipeService> = client::from_config(&config).unwrap();
    let generated = service
        .generate_recipes(&pantry(), DifficultyTier::HauteCouture)
        .await
        .unwrap();
    assert_eq!(generated.recipes.len(), 3);
    assert_eq!(stub.calls(), 1);
}

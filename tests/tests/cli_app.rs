use infrastructure::config::{Config, CATALOG_PATH, SESSION_TTL_MINUTES, TICKETS_PATH};
use presentation::cli::CliApp;
use presentation::render::render_outcome;
use std::collections::HashMap;
use tempfile::TempDir;
use tests::CATALOG_JSON;

fn config_in(dir: &TempDir, tickets_file: &str) -> Config {
    let catalog = dir.path().join("catalog.json");
    std::fs::write(&catalog, CATALOG_JSON).unwrap();
    let vars: HashMap<&str, String> = HashMap::from([
        (CATALOG_PATH, catalog.display().to_string()),
        (TICKETS_PATH, dir.path().join(tickets_file).display().to_string()),
        (SESSION_TTL_MINUTES, "30".to_string()),
    ]);
    Config::from_lookup(|key| vars.get(key).cloned()).unwrap()
}

#[tokio::test]
async fn app_answers_from_files_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let app = CliApp::new(&config_in(&dir, "tickets.json")).unwrap();

    let result = app.router().process("Tell me about A Borboleta", Some("cli")).await;
    let text = render_outcome(&result.outcome);
    assert!(text.contains("Carla Mendes"));
    assert!(text.contains("20/10/2022"));

    let followup = app.router().process("where can I buy it in Fortaleza?", Some("cli")).await;
    let text = render_outcome(&followup.outcome);
    assert!(text.contains("Fortaleza"));
    assert!(text.contains("Magazine Luiza"));
}

#[tokio::test]
async fn sqlite_ticket_store_is_selected_by_extension() {
    let dir = tempfile::tempdir().unwrap();
    let app = CliApp::new(&config_in(&dir, "tickets.sqlite")).unwrap();

    app.router()
        .process(
            "support please. name: Ana; email: ana@example.com; subject: Order; message: Missing",
            None,
        )
        .await;

    assert!(dir.path().join("tickets.sqlite").exists());
    assert_eq!(app.router().tickets().list().unwrap().len(), 1);
}

#[tokio::test]
async fn unknown_message_renders_help() {
    let dir = tempfile::tempdir().unwrap();
    let app = CliApp::new(&config_in(&dir, "tickets.json")).unwrap();

    let result = app.router().process("good evening", None).await;
    let text = render_outcome(&result.outcome);
    assert!(text.contains("Tell me about A Abelha"));
    assert!(text.contains("support ticket"));
}

#[test]
fn missing_catalog_is_a_startup_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(&dir, "tickets.json");
    config.catalog_path = dir.path().join("absent.json");
    assert!(CliApp::new(&config).is_err());
}

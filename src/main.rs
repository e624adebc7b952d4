use shuttle_lib::{init_logging, ssh_command, DataStore};

#[tokio::main]
async fn main() {
    init_logging();

    tracing::info!("Starting Shuttle...");

    let store = match DataStore::open().await {
        Ok(store) => store,
        Err(e) => {
            tracing::error!("Failed to open store: {}", e);
            std::process::exit(1);
        }
    };
    tracing::info!("Store file: {:?}", store.path());

    for provider in store.providers() {
        for project in &provider.projects {
            for element in &project.elements {
                tracing::info!(
                    "{} / {} / {}: {}",
                    provider.name,
                    project.name,
                    element.name,
                    ssh_command(element)
                );
            }
        }
    }
}

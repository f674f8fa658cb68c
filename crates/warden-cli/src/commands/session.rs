use super::load_settings;
use crate::cli::{Cli, SessionAction};
use console::style;
use warden_session::SessionStore;

pub async fn run(cli: &Cli, action: &SessionAction) -> anyhow::Result<()> {
    let store = SessionStore::new();
    let cwd = std::env::current_dir()?;

    match action {
        SessionAction::New => {
            let settings = load_settings(cli)?;
            let session = store
                .create(&cwd, &settings.default_model, &settings.default_provider)
                .await?;
            println!("{}", session.id);
        }
        SessionAction::List { limit } => {
            let sessions = store.list_recent(&cwd, *limit).await?;
            if sessions.is_empty() {
                println!("{}", style("No sessions for this directory.").dim());
            }
            for meta in sessions {
                println!(
                    "{}  {}/{}  {} event(s)",
                    meta.id, meta.provider, meta.model, meta.event_count
                );
            }
        }
        SessionAction::Search { id, query, limit } => {
            store.load(&cwd, id).await?;
            let hits = store.memory(id).search(query, *limit);
            if hits.is_empty() {
                println!("{}", style("No matches.").dim());
            }
            for hit in hits {
                println!("{} {}", style(format!("[{}]", hit.author)).cyan(), hit.text);
            }
        }
    }

    Ok(())
}

//! Uploader view: submit spreadsheets and follow their import jobs.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use sheetport_client::api::ApiClient;
use sheetport_client::session::ImportSession;

use crate::render;

pub async fn run(
    client: Arc<ApiClient>,
    files: &[PathBuf],
    interval: Duration,
    watch: bool,
) -> anyhow::Result<()> {
    let mut session = ImportSession::new(client, interval);
    let mut updates = session.submit(files).await?.subscribe();

    let ids: Vec<String> = updates.borrow().jobs.iter().map(|j| j.id.clone()).collect();
    println!("Submitted {} file(s), job(s): {}", files.len(), ids.join(", "));

    if !watch {
        session.stop_polling();
        return Ok(());
    }

    loop {
        let snapshot = updates.borrow_and_update().clone();
        println!("{}\n", render::jobs(&snapshot.jobs));
        if !snapshot.polling {
            break;
        }

        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                session.stop_polling();
                println!("Polling stopped.");
                break;
            }
        }
    }

    let snapshot = match session.poll_mut() {
        Some(poll) => poll.finished().await,
        None => return Ok(()),
    };
    if let Some(error) = snapshot.error {
        anyhow::bail!("{error}");
    }
    if snapshot.jobs.iter().all(|j| j.is_terminal()) {
        println!("All imports finished.");
    }
    Ok(())
}

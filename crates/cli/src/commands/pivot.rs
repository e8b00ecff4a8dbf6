use std::path::{Path, PathBuf};

use sheetport_client::api::ApiClient;

use super::read_uploads;

/// Send spreadsheets to the pivot transform and write the returned
/// workbook into `out_dir`.
pub async fn run(client: &ApiClient, files: &[PathBuf], out_dir: &Path) -> anyhow::Result<()> {
    let uploads = read_uploads(files).await?;
    let pivot = client.pivot(uploads).await?;
    let path = pivot.save_into(out_dir).await?;
    println!("Pivot saved to {}", path.display());
    Ok(())
}

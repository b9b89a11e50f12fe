use std::sync::Arc;

use anyhow::Result;
use chrono::NaiveDate;

use gymdash_core::overlay::OverlayService;
use gymdash_core::repository::Store;

/// Run the weekly progression job once for `today`.
pub async fn run_progress(store: Arc<dyn Store>, today: NaiveDate) -> Result<()> {
    let run = OverlayService::new(store).run_progression(today).await?;

    println!(
        "Progression for {today}: {} advanced, {} unchanged",
        run.advanced.len(),
        run.unchanged
    );
    for id in &run.advanced {
        println!("  {id}");
    }
    Ok(())
}

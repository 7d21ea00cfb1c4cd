use std::sync::Arc;

use tokio::time::{interval, Duration};

use crate::repositories::token::TokenDenylist;

pub async fn start_denylist_sweep(denylist: Arc<dyn TokenDenylist>) {
    let mut interval = interval(Duration::from_secs(60 * 60));

    loop {
        interval.tick().await;

        match denylist.purge_expired().await {
            Ok(0) => {}
            Ok(count) => tracing::info!("Purged {} expired session revocations", count),
            Err(e) => tracing::error!("Denylist sweep failed: {}", e)
        }
    }
}

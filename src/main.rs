mod auction;
mod clock;
mod config;
mod error;
mod id;
mod service;
mod store;

use anyhow::{format_err, Result};
use tokio::{runtime::Runtime, sync::oneshot};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::auction::Item;
use crate::service::BiddingEngine;

fn main() -> Result<()> {
    let config = config::Config::from_env()?;

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(EnvFilter::try_new(&config.log_filter)?)
        .try_init()
        .map_err(|e| format_err!("failed to initialize logging: {e}"))?;

    let engine = BiddingEngine::new_shared(
        store::InMemoryAuctionStore::new_shared(),
        clock::SystemClock::new_shared(),
        id::UuidGenerator::new_shared(),
    );
    prepopulate_items(&engine);

    let (stop_tx, stop_rx) = oneshot::channel();
    let mut stop_tx = Some(stop_tx);

    ctrlc::set_handler(move || {
        info!("stopping http server");
        if let Some(stop_tx) = stop_tx.take() {
            // the receiver is gone only once the server is already down
            let _ = stop_tx.send(());
        }
    })?;

    Runtime::new()?.block_on(service::serve(engine, config.listen_addr, async move {
        // a dropped sender stops the server too
        let _ = stop_rx.await;
    }))
}

fn prepopulate_items(engine: &BiddingEngine) {
    for (item_id, title, description, starting_price) in [
        ("item1", "title1", "description1", 100.0),
        ("item2", "title2", "description2", 200.0),
        ("item3", "title3", "description3", 150.0),
    ] {
        engine.add_item(Item {
            item_id: item_id.to_owned(),
            title: title.to_owned(),
            description: description.to_owned(),
            starting_price,
        });
    }
}

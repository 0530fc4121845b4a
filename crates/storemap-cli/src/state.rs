//! `state`: the persisted viewer keys in the configured state file.

use clap::Subcommand;
use serde_json::{json, Value};
use storemap_core::persist::{clear_persisted, load_persisted, open_state_store};
use storemap_core::{AppConfig, KeyValueStore, PersistedState};

#[derive(Debug, Subcommand)]
pub enum StateCommands {
    /// Print the restored view and filter selectors
    Show,
    /// Remove every persisted key
    Clear,
}

pub(crate) fn describe(state: &PersistedState) -> Value {
    json!({
        "view": state.view,
        "filters": {
            "brand": state.filters.brand.as_selector(),
            "codes": state.filters.codes.as_selector(),
        },
    })
}

pub(crate) fn show(store: &impl KeyValueStore) -> anyhow::Result<String> {
    let state = load_persisted(store)?;
    Ok(serde_json::to_string_pretty(&describe(&state))?)
}

pub(crate) fn run_state(config: &AppConfig, command: &StateCommands) -> anyhow::Result<()> {
    let mut store = open_state_store(&config.state_path, config.state_ttl_days)?;
    match command {
        StateCommands::Show => println!("{}", show(&store)?),
        StateCommands::Clear => {
            clear_persisted(&mut store)?;
            tracing::info!(path = %config.state_path.display(), "cleared viewer state");
        }
    }
    Ok(())
}

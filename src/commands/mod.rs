//! Command handlers
//!
//! Each handler drives the reconciler for one subcommand and returns the
//! document to print, if any.

mod add;
mod smoke;

pub use add::run as run_add;
pub use smoke::run as run_smoke_test;

use serde_json::Value;
use tracing::info;

use crate::cli::Command;
use crate::client::Transport;
use crate::error::{Error, Result};
use crate::reconcilers::Reconciler;

/// Run one subcommand
pub async fn execute<T: Transport>(
    reconciler: &Reconciler<T>,
    command: &Command,
) -> Result<Option<Value>> {
    match command {
        Command::Get(select) => {
            let (kind, name) = select
                .target()
                .ok_or_else(|| Error::config("Nothing to get"))?;
            Ok(Some(reconciler.fetch(kind, name).await?))
        }
        Command::Add(args) => add::run(reconciler, args).await.map(Some),
        Command::Delete(select) => {
            let (kind, name) = select
                .target()
                .ok_or_else(|| Error::config("Nothing to delete"))?;
            info!(kind = %kind, name = %name, "Deleting");
            reconciler.delete(kind, name).await?;
            Ok(None)
        }
        Command::SmokeTest(args) => smoke::run(reconciler, &args.prefix).await.map(Some),
    }
}

use gloss_core::{GlossError, Lookup};

use crate::app::AppContext;
use crate::cli::RecordSubcommand;
use crate::errors::CliError;
use crate::helpers::parse_json_arg;
use crate::ui::{kv, print, receipt};

pub async fn handle_record(ctx: &AppContext<'_>, command: &RecordSubcommand) -> anyhow::Result<()> {
    match command {
        RecordSubcommand::Get { name } => handle_get(ctx, name).await,
        RecordSubcommand::Put { name, value } => handle_put(ctx, name, value).await,
        RecordSubcommand::Delete { name } => handle_delete(ctx, name).await,
        RecordSubcommand::List { prefix, json } => handle_list(ctx, prefix, *json).await,
    }
}

async fn handle_get(ctx: &AppContext<'_>, name: &str) -> anyhow::Result<()> {
    let gloss = ctx.open().await?;
    match gloss.store().fetch(name).await? {
        Lookup::Found(value) => {
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(())
        }
        Lookup::Missing => Err(CliError::not_found(
            format!("Record '{}' not found", name),
            "Run `gloss record list` to see stored names.",
        )
        .into()),
        Lookup::Locked => Err(GlossError::DecryptionUnavailable.into()),
        Lookup::Mismatched => Err(GlossError::AuthenticationFailure.into()),
    }
}

async fn handle_put(ctx: &AppContext<'_>, name: &str, value: &str) -> anyhow::Result<()> {
    let value = parse_json_arg(value)?;
    let gloss = ctx.open().await?;
    gloss.put_record(name, &value).await?;
    if !ctx.quiet() {
        let ui = ctx.ui(false);
        let mode = if gloss.keys().has_key() {
            "encrypted"
        } else {
            "plaintext"
        };
        print(
            &ui,
            &receipt(
                &ui,
                "Record saved",
                &[("Name", name.to_string()), ("Mode", mode.to_string())],
            ),
        );
    }
    Ok(())
}

async fn handle_delete(ctx: &AppContext<'_>, name: &str) -> anyhow::Result<()> {
    let gloss = ctx.open().await?;
    gloss.delete_record(name).await?;
    if !ctx.quiet() {
        let ui = ctx.ui(false);
        print(&ui, &receipt(&ui, "Record deleted", &[("Name", name.to_string())]));
    }
    Ok(())
}

async fn handle_list(ctx: &AppContext<'_>, prefix: &str, json: bool) -> anyhow::Result<()> {
    let gloss = ctx.open().await?;
    let names = gloss.store().list_names(prefix).await?;
    let ui = ctx.ui(json);
    if ui.mode.is_json() {
        println!("{}", serde_json::to_string_pretty(&names)?);
        return Ok(());
    }
    if names.is_empty() {
        if !ctx.quiet() {
            print(&ui, &kv(&ui, "Records", "none"));
        }
        return Ok(());
    }
    for name in names {
        println!("{}", name);
    }
    Ok(())
}

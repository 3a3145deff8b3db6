//! `appdesc init` command

use std::path::PathBuf;

use anyhow::Result;

use crate::cli::InitArgs;
use appdesc::core::descriptor::DocumentFormat;
use appdesc::ops::init::{default_application_id, init_descriptor, InitOptions};
use appdesc::util::shell::{Shell, Status};
use appdesc::GlobalContext;

/// Builds the operation options from the arguments.
pub fn init_options(args: &InitArgs) -> InitOptions {
    InitOptions {
        application_id: args.application_id.clone(),
        framework: args.framework.clone(),
        format: if args.json {
            DocumentFormat::Json
        } else {
            DocumentFormat::Toml
        },
    }
}

pub fn execute(args: InitArgs, ctx: &GlobalContext, shell: &Shell) -> Result<()> {
    let path = ctx.resolve(&args.path.clone().unwrap_or_else(|| PathBuf::from(".")));
    let opts = init_options(&args);

    let written = init_descriptor(&path, &opts)?;
    let application_id = opts
        .application_id
        .unwrap_or_else(|| default_application_id(&path));

    shell.status(
        Status::Created,
        format!("descriptor for `{}` at {}", application_id, written.display()),
    );
    shell.json_event(&serde_json::json!({
        "reason": "descriptor-created",
        "path": written.display().to_string(),
        "application_id": application_id,
    }));

    Ok(())
}

//! `appdesc check` command

use anyhow::Result;

use crate::cli::CheckArgs;
use appdesc::util::hash::short;
use appdesc::util::shell::{Shell, Status};
use appdesc::GlobalContext;

pub fn execute(args: CheckArgs, ctx: &GlobalContext, shell: &Shell) -> Result<()> {
    let (path, descriptor) = super::load(ctx, shell, &args.descriptor)?;
    let fingerprint = descriptor.fingerprint()?;

    if shell.is_json() {
        shell.json_event(&serde_json::json!({
            "reason": "descriptor-checked",
            "path": path.display().to_string(),
            "application_id": descriptor.app().application_id().as_str(),
            "plugins": descriptor.plugins().len(),
            "dependencies": descriptor.dependencies().len(),
            "variants": descriptor.variants().len(),
            "fingerprint": fingerprint,
        }));
        return Ok(());
    }

    shell.status(
        Status::Checked,
        format!(
            "{} v{} ({})",
            descriptor.app().application_id(),
            descriptor.app().version_name(),
            path.display()
        ),
    );
    shell.status(
        Status::Finished,
        format!(
            "{} plugin(s), {} dependency binding(s), {} variant(s) [{}]",
            descriptor.plugins().len(),
            descriptor.dependencies().len(),
            descriptor.variants().len(),
            short(&fingerprint)
        ),
    );

    Ok(())
}

//! `appdesc deps` command

use anyhow::{anyhow, Result};

use crate::cli::DepsArgs;
use appdesc::core::dependency::Configuration;
use appdesc::util::shell::Shell;
use appdesc::GlobalContext;

pub fn execute(args: DepsArgs, ctx: &GlobalContext, shell: &Shell) -> Result<()> {
    let configuration = args
        .configuration
        .as_deref()
        .map(|c| c.parse::<Configuration>().map_err(|e| anyhow!(e)))
        .transpose()?;

    let (_, descriptor) = super::load(ctx, shell, &args.descriptor)?;

    let versions = descriptor.effective_versions();
    let selected = versions
        .iter()
        .filter(|(b, _)| configuration.map_or(true, |c| b.configuration() == c));

    let mut out = String::new();
    for (binding, version) in selected {
        if shell.is_json() {
            shell.json_event(&serde_json::json!({
                "reason": "dependency",
                "coordinate": binding.coordinate().to_string(),
                "configuration": binding.configuration(),
                "platform": binding.is_platform(),
                "version": version.to_string(),
            }));
            continue;
        }
        let kind = if binding.is_platform() { "platform " } else { "" };
        out.push_str(&format!(
            "{}{} {} ({})\n",
            kind,
            binding.coordinate(),
            version,
            binding.configuration()
        ));
    }

    shell.print_out(out);
    Ok(())
}

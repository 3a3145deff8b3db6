//! `appdesc normalize` command

use anyhow::{Context, Result};

use crate::cli::{FormatArg, NormalizeArgs};
use appdesc::core::descriptor::DocumentFormat;
use appdesc::util::shell::{Shell, Status};
use appdesc::GlobalContext;

impl From<FormatArg> for DocumentFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Toml => DocumentFormat::Toml,
            FormatArg::Json => DocumentFormat::Json,
        }
    }
}

pub fn execute(args: NormalizeArgs, ctx: &GlobalContext, shell: &Shell) -> Result<()> {
    let (path, descriptor) = super::load(ctx, shell, &args.descriptor)?;
    let format = args
        .format
        .map(DocumentFormat::from)
        .unwrap_or_else(|| DocumentFormat::from_path(&path));

    if args.write {
        let content = descriptor.render(format)?;
        let current = std::fs::read_to_string(&path).unwrap_or_default();
        if current == content {
            shell.note(format!("{} is already normalized", path.display()));
        } else {
            std::fs::write(&path, content)
                .with_context(|| format!("failed to write {}", path.display()))?;
            shell.status(Status::Normalized, path.display());
        }
        shell.json_event(&serde_json::json!({
            "reason": "descriptor-normalized",
            "path": path.display().to_string(),
        }));
        return Ok(());
    }

    if shell.is_json() {
        shell.json_event(&serde_json::json!({
            "reason": "normalized-document",
            "path": path.display().to_string(),
            "document": serde_json::to_value(descriptor.to_document())?,
        }));
    } else {
        shell.print_out(descriptor.render(format)?);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn parse_args(args: &[&str]) -> NormalizeArgs {
        #[derive(Parser)]
        struct TestCli {
            #[command(flatten)]
            normalize: NormalizeArgs,
        }
        TestCli::parse_from(args).normalize
    }

    #[test]
    fn test_normalize_args() {
        let args = parse_args(&["test", "--format", "json", "--identity", "upload"]);
        assert_eq!(args.format, Some(FormatArg::Json));
        assert!(!args.write);
        assert_eq!(args.descriptor.identities, vec!["upload".to_string()]);
    }

    #[test]
    fn test_write_conflicts_with_format() {
        #[derive(Parser)]
        struct TestCli {
            #[command(flatten)]
            normalize: NormalizeArgs,
        }
        assert!(TestCli::try_parse_from(["test", "--write", "--format", "toml"]).is_err());
    }

    #[test]
    fn test_format_conversion() {
        assert_eq!(DocumentFormat::from(FormatArg::Json), DocumentFormat::Json);
        assert_eq!(DocumentFormat::from(FormatArg::Toml), DocumentFormat::Toml);
    }
}

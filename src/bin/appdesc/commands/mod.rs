//! Command implementations

pub mod check;
pub mod completions;
pub mod deps;
pub mod init;
pub mod normalize;
pub mod show;

use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Result};

use appdesc::core::descriptor::{Descriptor, DescriptorError};
use appdesc::core::signing::{SigningIdentity, SigningStore, DEBUG_IDENTITY, SIGNING_STORE_NAME};
use appdesc::ops::load::{descriptor_root, load_file, LoadOptions};
use appdesc::util::config::Config;
use appdesc::util::diagnostic::{render_violation, suggestions, ValidationError};
use appdesc::util::shell::Shell;
use appdesc::GlobalContext;

use crate::cli::DescriptorArgs;

/// Locate the descriptor named on the command line or found from cwd.
pub fn descriptor_path(ctx: &GlobalContext, args: &DescriptorArgs) -> Result<PathBuf> {
    if let Some(ref path) = args.manifest_path {
        return Ok(ctx.resolve(path));
    }
    ctx.find_descriptor().map_err(|e| {
        let help = match e {
            DescriptorError::NotFound { .. } => suggestions::NO_DESCRIPTOR,
            DescriptorError::Ambiguous { .. } => suggestions::AMBIGUOUS_DESCRIPTOR,
        };
        anyhow!("{}\nhelp: {}", e, help)
    })
}

/// Assemble the known signing identities.
///
/// Sources, later ones winning: the implicit `debug` identity, the store
/// file (`--signing-store`, then config, then `signing.toml` beside the
/// descriptor when present), then `--identity` names.
pub fn signing_store(
    ctx: &GlobalContext,
    args: &DescriptorArgs,
    config: &Config,
    root: &Path,
) -> Result<SigningStore> {
    let mut store = SigningStore::new();
    if config.signing.implicit_debug() {
        store.insert(SigningIdentity::named(DEBUG_IDENTITY));
    }

    let explicit = args
        .signing_store
        .as_deref()
        .map(|p| ctx.resolve(p))
        .or_else(|| config.signing.store.clone());
    match explicit {
        Some(path) => store.merge(SigningStore::load(&path)?),
        None => {
            let beside = root.join(SIGNING_STORE_NAME);
            if beside.is_file() {
                store.merge(SigningStore::load(&beside)?);
            }
        }
    }

    store.merge(SigningStore::from_names(args.identities.iter().cloned()));
    tracing::debug!(
        "known signing identities: {}",
        store.names().collect::<Vec<_>>().join(", ")
    );
    Ok(store)
}

/// Resolve the descriptor path and everything needed to load it.
pub fn prepare(ctx: &GlobalContext, args: &DescriptorArgs) -> Result<(PathBuf, LoadOptions)> {
    let path = descriptor_path(ctx, args)?;
    let root = descriptor_root(&path);
    let config = ctx.config(&root);
    let identities = signing_store(ctx, args, &config, &root)?;
    Ok((
        path,
        LoadOptions {
            defaults: config.defaults,
            identities,
        },
    ))
}

/// Print every violation of a failed load.
pub fn report(shell: &Shell, err: &ValidationError) {
    if shell.is_json() {
        for violation in &err.violations {
            let mut event = violation.to_json();
            event["reason"] = "violation".into();
            event["origin"] = err.origin.as_str().into();
            shell.json_event(&event);
        }
        return;
    }

    for violation in &err.violations {
        shell.print_err(render_violation(violation, &err.origin, shell.use_color()));
    }
}

/// Load the descriptor, reporting violations if it is invalid.
pub fn load(ctx: &GlobalContext, shell: &Shell, args: &DescriptorArgs) -> Result<(PathBuf, Descriptor)> {
    let (path, opts) = prepare(ctx, args)?;
    match load_file(&path, &opts) {
        Ok(descriptor) => Ok((path, descriptor)),
        Err(e) => match e.downcast_ref::<ValidationError>() {
            Some(validation) => {
                report(shell, validation);
                bail!(
                    "could not load `{}` due to {} previous violation(s)",
                    path.display(),
                    validation.violations.len()
                )
            }
            None => Err(e),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn context(dir: &Path) -> GlobalContext {
        GlobalContext::with_cwd(dir.to_path_buf())
            .unwrap()
            .with_home(dir.join("home"))
    }

    #[test]
    fn test_signing_store_sources() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(
            tmp.path().join("signing.toml"),
            "[identities.upload]\nkey-alias = \"upload\"\n",
        )
        .unwrap();
        let ctx = context(tmp.path());
        let args = DescriptorArgs {
            identities: vec!["ci".into()],
            ..Default::default()
        };

        let store = signing_store(&ctx, &args, &Config::default(), tmp.path()).unwrap();
        assert_eq!(store.names().collect::<Vec<_>>(), vec!["ci", "debug", "upload"]);
    }

    #[test]
    fn test_signing_store_without_implicit_debug() {
        let tmp = TempDir::new().unwrap();
        let ctx = context(tmp.path());
        let mut config = Config::default();
        config.signing.implicit_debug = Some(false);

        let store = signing_store(&ctx, &DescriptorArgs::default(), &config, tmp.path()).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_explicit_signing_store_must_exist() {
        let tmp = TempDir::new().unwrap();
        let ctx = context(tmp.path());
        let args = DescriptorArgs {
            signing_store: Some(PathBuf::from("missing.toml")),
            ..Default::default()
        };
        assert!(signing_store(&ctx, &args, &Config::default(), tmp.path()).is_err());
    }

    #[test]
    fn test_descriptor_path_prefers_flag() {
        let tmp = TempDir::new().unwrap();
        let ctx = context(tmp.path());
        let args = DescriptorArgs {
            manifest_path: Some(PathBuf::from("app/App.json")),
            ..Default::default()
        };
        assert_eq!(descriptor_path(&ctx, &args).unwrap(), tmp.path().join("app/App.json"));
    }
}

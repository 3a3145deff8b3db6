//! `appdesc show` command

use std::fmt::Write;

use anyhow::{anyhow, Result};

use crate::cli::ShowArgs;
use appdesc::core::descriptor::Descriptor;
use appdesc::core::variant::BuildVariantPolicy;
use appdesc::util::hash::short;
use appdesc::util::shell::Shell;
use appdesc::GlobalContext;

pub fn execute(args: ShowArgs, ctx: &GlobalContext, shell: &Shell) -> Result<()> {
    let (_, descriptor) = super::load(ctx, shell, &args.descriptor)?;
    let fingerprint = descriptor.fingerprint()?;

    if let Some(ref name) = args.variant {
        let variant = descriptor.variant(name).ok_or_else(|| {
            anyhow!(
                "no variant named `{}`; declared: {}",
                name,
                variant_names(&descriptor)
            )
        })?;
        let resolved = variant_json(&descriptor, variant)?;
        if shell.is_json() {
            shell.json_event(&serde_json::json!({
                "reason": "variant",
                "variant": resolved,
            }));
        } else {
            shell.print_out(format_variant(&descriptor, variant)?);
        }
        return Ok(());
    }

    if shell.is_json() {
        shell.json_event(&summary_json(&descriptor, &fingerprint)?);
    } else {
        shell.print_out(format_summary(&descriptor, &fingerprint)?);
    }
    Ok(())
}

fn variant_names(descriptor: &Descriptor) -> String {
    if descriptor.variants().is_empty() {
        return "none".to_string();
    }
    descriptor
        .variants()
        .keys()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

fn signing_label(variant: &BuildVariantPolicy) -> String {
    match variant.signing_ref() {
        Some(identity) => format!("signed with `{}`", identity),
        None => "unsigned".to_string(),
    }
}

/// Human-readable overview of a descriptor.
pub fn format_summary(descriptor: &Descriptor, fingerprint: &str) -> Result<String> {
    let app = descriptor.app();
    let mut out = String::new();

    writeln!(out, "{} v{} ({})", app.application_id(), app.version_name(), app.version_code())?;
    writeln!(out, "  namespace:   {}", app.namespace())?;
    match app.compile_platform_version() {
        Some(compile) => writeln!(
            out,
            "  sdk:         min {}, target {}, compile {}",
            app.min_platform_version(),
            app.target_platform_version(),
            compile
        )?,
        None => writeln!(
            out,
            "  sdk:         min {}, target {}",
            app.min_platform_version(),
            app.target_platform_version()
        )?,
    }
    writeln!(out, "  multidex:    {}", app.multidex())?;
    if let Some(framework) = descriptor.framework() {
        writeln!(out, "  framework:   {} ({})", framework.name, framework.source)?;
    }
    writeln!(out, "  fingerprint: {}", short(fingerprint))?;

    if !descriptor.plugins().is_empty() {
        writeln!(out, "\nplugins (apply order):")?;
        for (i, plugin) in descriptor.plugins().iter().enumerate() {
            if plugin.after().is_empty() {
                writeln!(out, "  {}. {}", i + 1, plugin.name())?;
            } else {
                writeln!(out, "  {}. {} (after {})", i + 1, plugin.name(), plugin.after().join(", "))?;
            }
        }
    }

    if !descriptor.dependencies().is_empty() {
        writeln!(out, "\ndependencies:")?;
        for (binding, version) in descriptor.effective_versions() {
            let platform = if binding.is_platform() { " [platform]" } else { "" };
            writeln!(
                out,
                "  {:<24} {} {}{}",
                binding.configuration().as_str(),
                binding.coordinate(),
                version,
                platform
            )?;
        }
    }

    let compile = descriptor.compile_options();
    if let Some(raw) = compile.to_raw() {
        writeln!(out, "\ncompile:")?;
        if let Some(ref v) = raw.source_compatibility {
            writeln!(out, "  source-compatibility: {}", v)?;
        }
        if let Some(ref v) = raw.target_compatibility {
            writeln!(out, "  target-compatibility: {}", v)?;
        }
        if let Some(ref v) = raw.jvm_target {
            writeln!(out, "  jvm-target:           {}", v)?;
        }
        writeln!(out, "  desugaring:           {}", compile.core_library_desugaring)?;
    }

    if !descriptor.variants().is_empty() {
        writeln!(out, "\nvariants:")?;
        for variant in descriptor.variants().values() {
            writeln!(
                out,
                "  {:<10} {}{}",
                variant.name(),
                signing_label(variant),
                if variant.is_debuggable() { ", debuggable" } else { "" }
            )?;
        }
    }

    Ok(out)
}

fn format_variant(descriptor: &Descriptor, variant: &BuildVariantPolicy) -> Result<String> {
    let app = descriptor.app();
    let mut out = String::new();
    writeln!(out, "{}", variant.name())?;
    writeln!(out, "  application-id: {}", variant.application_id(app.application_id())?)?;
    writeln!(out, "  version-name:   {}", variant.version_name(app.version_name()))?;
    writeln!(out, "  signing:        {}", signing_label(variant))?;
    writeln!(out, "  debuggable:     {}", variant.is_debuggable())?;
    writeln!(out, "  minify:         {}", variant.is_minified())?;
    Ok(out)
}

fn variant_json(descriptor: &Descriptor, variant: &BuildVariantPolicy) -> Result<serde_json::Value> {
    let app = descriptor.app();
    Ok(serde_json::json!({
        "name": variant.name(),
        "application_id": variant.application_id(app.application_id())?.as_str(),
        "version_name": variant.version_name(app.version_name()),
        "signing_ref": variant.signing_ref(),
        "debuggable": variant.is_debuggable(),
        "minify": variant.is_minified(),
    }))
}

/// Machine-readable overview of a descriptor.
pub fn summary_json(descriptor: &Descriptor, fingerprint: &str) -> Result<serde_json::Value> {
    let app = descriptor.app();
    let variants = descriptor
        .variants()
        .values()
        .map(|v| variant_json(descriptor, v))
        .collect::<Result<Vec<_>>>()?;

    Ok(serde_json::json!({
        "reason": "descriptor",
        "application_id": app.application_id().as_str(),
        "namespace": app.namespace().as_str(),
        "version_code": app.version_code(),
        "version_name": app.version_name(),
        "min_sdk": app.min_platform_version(),
        "target_sdk": app.target_platform_version(),
        "compile_sdk": app.compile_platform_version(),
        "multidex": app.multidex(),
        "plugins": descriptor.plugins().iter().map(|p| p.name()).collect::<Vec<_>>(),
        "dependencies": descriptor
            .effective_versions()
            .iter()
            .map(|(b, v)| serde_json::json!({
                "coordinate": b.coordinate().to_string(),
                "configuration": b.configuration(),
                "platform": b.is_platform(),
                "version": v.to_string(),
            }))
            .collect::<Vec<_>>(),
        "variants": variants,
        "framework": descriptor.framework(),
        "fingerprint": fingerprint,
    }))
}

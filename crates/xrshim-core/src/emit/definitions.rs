//! Definitions unit: trampolines, the substitution table, the creation hook
//! and layer activation.
//!
//! Every `extern "system"` entry point emitted here is a containment boundary:
//! a panic raised by the layer is caught and turned into the generic failure
//! status, or logged and suppressed for commands without a status.

use super::EmitContext;
use super::signature::{args, ident, params, pfn, ret};
use super::writer::SourceWriter;
use crate::model::Command;
use crate::select::Role;

pub(super) fn emit(ctx: &EmitContext<'_>) -> String {
    let mut w = SourceWriter::new();
    ctx.banner(&mut w, "definitions");
    globals(&mut w, ctx);
    for selected in ctx.selected.iter().filter(|s| s.role.has_trampoline()) {
        trampoline(&mut w, ctx, selected.command, selected.role);
    }
    resolver_trampoline(&mut w, ctx);
    substitution_table(&mut w, ctx);
    creation_hook(&mut w, ctx);
    discard_instance(&mut w, ctx);
    activate_layer(&mut w, ctx);
    w.finish()
}

fn globals(w: &mut SourceWriter, ctx: &EmitContext<'_>) {
    let rt = ctx.rt();
    let resolver_pfn = pfn(&ctx.boot.get_instance_proc_addr.name);
    let layer = &ctx.profile.trait_name;

    w.line("/// Layer namespace, fixed by the including build.");
    w.line(&format!(
        "pub const LAYER_NAMESPACE: &str = env!(\"{}\");",
        ctx.profile.namespace_token
    ));
    w.blank();
    w.line("/// Layer instance the trampolines dispatch to.");
    w.line(&format!(
        "static ACTIVE_LAYER: {rt}::ActiveLayer<dyn {layer}> = {rt}::ActiveLayer::new();"
    ));
    w.blank();
    w.line("/// Resolver every lookup is forwarded to once the layer is bypassed.");
    w.line(&format!(
        "static BYPASS: {rt}::UpstreamSlot<{resolver_pfn}> = {rt}::UpstreamSlot::new();"
    ));
    w.blank();
    w.open(&format!(
        "pub fn active_layer() -> Option<::std::sync::Arc<dyn {layer}>> {{"
    ));
    w.line("ACTIVE_LAYER.current()");
    w.close("}");
    w.blank();
    w.line("/// Bypasses the layer for this process: the exported resolver forwards to");
    w.line("/// `next` untouched. Returns `false` if a bypass was already installed.");
    w.open(&format!("pub fn install_bypass(next: {resolver_pfn}) -> bool {{"));
    w.line("BYPASS.capture(next)");
    w.close("}");
    w.blank();
}

fn trampoline(w: &mut SourceWriter, ctx: &EmitContext<'_>, command: &Command, role: Role) {
    let rt = ctx.rt();
    let name = &command.name;

    w.line("#[allow(non_snake_case)]");
    w.open(&format!(
        "pub unsafe extern \"system\" fn {name}({}){} {{",
        params(command),
        ret(command, ctx.status())
    ));
    w.line(&format!("{rt}::debug_log!(LAYER_NAMESPACE, \"--> {name}\");"));
    let barrier = if command.returns_status() {
        format!("let result = {rt}::contain_status(LAYER_NAMESPACE, \"{name}\", move || {{")
    } else {
        format!("{rt}::contain_void(LAYER_NAMESPACE, \"{name}\", move || {{")
    };
    w.open(&barrier);
    w.line(&format!("let layer = ACTIVE_LAYER.expect_current(\"{name}\");"));
    w.line(&format!("unsafe {{ layer.{name}({}) }}", args(command)));
    w.close("});");

    if role == Role::BootstrapDestroy {
        w.open(&format!("if {} {{", ctx.succeeded("result")));
        w.line("ACTIVE_LAYER.retire();");
        w.close("}");
    }

    if command.returns_status() {
        w.line(&format!(
            "{rt}::debug_log!(LAYER_NAMESPACE, \"<-- {name} {{:?}}\", result);"
        ));
        w.line("result");
    } else {
        w.line(&format!("{rt}::debug_log!(LAYER_NAMESPACE, \"<-- {name}\");"));
    }
    w.close("}");
    w.blank();
}

fn resolver_trampoline(w: &mut SourceWriter, ctx: &EmitContext<'_>) {
    let rt = ctx.rt();
    let resolver = ctx.boot.get_instance_proc_addr;
    let name = &resolver.name;
    let forwarded = args(resolver);

    w.line("/// Address resolver handed to the loader.");
    w.line("#[allow(non_snake_case)]");
    w.open(&format!(
        "pub unsafe extern \"system\" fn {name}({}){} {{",
        params(resolver),
        ret(resolver, ctx.status())
    ));
    w.open("if let Some(bypass) = BYPASS.get() {");
    w.line(&format!("return unsafe {{ bypass({forwarded}) }};"));
    w.close("}");
    w.line(&format!("{rt}::debug_log!(LAYER_NAMESPACE, \"--> {name}\");"));
    w.open(&format!(
        "let result = {rt}::contain_status(LAYER_NAMESPACE, \"{name}\", move || {{"
    ));
    w.line(&format!("let layer = ACTIVE_LAYER.expect_current(\"{name}\");"));
    w.line(&format!("unsafe {{ layer.{name}({forwarded}) }}"));
    w.close("});");
    w.line(&format!(
        "{rt}::debug_log!(LAYER_NAMESPACE, \"<-- {name} {{:?}}\", result);"
    ));
    w.line("result");
    w.close("}");
    w.blank();
}

fn substitution_table(w: &mut SourceWriter, ctx: &EmitContext<'_>) {
    let rt = ctx.rt();
    let resolver = ctx.boot.get_instance_proc_addr;
    let name_arg = ident(&resolver.parameters[1].name);
    let out_arg = ident(&resolver.parameters[2].name);

    w.line("/// Delegates to the next resolver, then captures the real address of every");
    w.line("/// intercepted command and hands out its trampoline instead.");
    w.line("#[allow(non_snake_case)]");
    w.open(&format!(
        "pub unsafe fn substitute_proc_addr(upstream: &Upstream, {}){} {{",
        params(resolver),
        ret(resolver, ctx.status())
    ));
    w.line(&format!(
        "let result = unsafe {{ upstream.{}({}) }};",
        resolver.name,
        args(resolver)
    ));
    w.open(&format!(
        "if !{} || {name_arg}.is_null() || {out_arg}.is_null() {{",
        ctx.succeeded("result")
    ));
    w.line("return result;");
    w.close("}");
    w.open(&format!("let Some(address) = (unsafe {{ *{out_arg} }}) else {{"));
    w.line("return result;");
    w.close("};");
    w.open(&format!(
        "match unsafe {{ ::std::ffi::CStr::from_ptr({name_arg}) }}.to_bytes() {{"
    ));
    for selected in ctx.selected.iter().filter(|s| s.role.has_trampoline()) {
        let name = selected.name();
        let alias = pfn(name);
        w.open(&format!("b\"{name}\" => {{"));
        w.line(&format!(
            "upstream.{name}.capture(unsafe {{ ::std::mem::transmute::<{rt}::VoidFunction, {alias}>(address) }});"
        ));
        w.line(&format!(
            "unsafe {{ *{out_arg} = Some(::std::mem::transmute::<{alias}, {rt}::VoidFunction>({name})) }};"
        ));
        w.close("}");
    }
    w.line("_ => {}");
    w.close("}");
    w.line("result");
    w.close("}");
    w.blank();
}

fn creation_hook(w: &mut SourceWriter, ctx: &EmitContext<'_>) {
    let rt = ctx.rt();
    let create = ctx.boot.create_instance;
    let create_info = &create.parameters[0];
    let eager: Vec<_> = ctx
        .selected
        .iter()
        .filter(|s| s.role.resolves_eagerly())
        .collect();

    w.line("/// Resolves every requested command against the new instance. A single");
    w.line("/// failed resolution fails the whole creation.");
    w.line("#[allow(non_snake_case)]");
    w.open(&format!(
        "pub unsafe fn create_instance_hook(upstream: &Upstream, {}: {}) -> {} {{",
        ident(&create_info.name),
        create_info.type_descriptor,
        ctx.status()
    ));
    w.line(&format!("let _ = {};", ident(&create_info.name)));

    if eager.is_empty() {
        w.line("let _ = upstream;");
        w.line(&ctx.success());
        w.close("}");
        w.blank();
        return;
    }

    w.open("let (Some(resolver), Some(instance)) = (upstream.next_get_instance_proc_addr(), upstream.instance()) else {");
    w.line(&format!(
        "{rt}::log!(LAYER_NAMESPACE, \"{} hook ran before the layer was bound\");",
        create.name
    ));
    w.line(&format!("return {};", ctx.generic_failure()));
    w.close("};");

    for selected in eager {
        let name = selected.name();
        w.open(&format!(
            "match unsafe {{ {rt}::resolve(resolver, instance, c\"{name}\") }} {{"
        ));
        w.open("Ok(address) => {");
        w.line(&format!(
            "{rt}::debug_log!(LAYER_NAMESPACE, \"resolved {name} at {{:p}}\", address as *const ());"
        ));
        w.line(&format!(
            "upstream.{name}.capture(unsafe {{ ::std::mem::transmute::<{rt}::VoidFunction, {}>(address) }});",
            pfn(name)
        ));
        w.close("}");
        w.open("Err(err) => {");
        w.line(&format!("{rt}::log!(LAYER_NAMESPACE, \"{{}}\", err);"));
        w.line("return err.status();");
        w.close("}");
        w.close("}");
    }
    w.line(&ctx.success());
    w.close("}");
    w.blank();
}

fn discard_instance(w: &mut SourceWriter, ctx: &EmitContext<'_>) {
    let rt = ctx.rt();
    let resolver = &ctx.boot.get_instance_proc_addr.name;
    let destroy = &ctx.boot.destroy_instance.name;

    w.line("/// Destroys an instance the layer could not take over.");
    w.open(&format!(
        "unsafe fn discard_instance(next_get_instance_proc_addr: {}, instance: {}) {{",
        pfn(resolver),
        ctx.instance_type()
    ));
    w.open(&format!(
        "match unsafe {{ {rt}::resolve(next_get_instance_proc_addr, instance, c\"{destroy}\") }} {{"
    ));
    w.open("Ok(address) => {");
    w.line(&format!(
        "let destroy = unsafe {{ ::std::mem::transmute::<{rt}::VoidFunction, {}>(address) }};",
        pfn(destroy)
    ));
    w.line("let _ = unsafe { destroy(instance) };");
    w.close("}");
    w.line(&format!(
        "Err(err) => {rt}::log!(LAYER_NAMESPACE, \"cannot destroy the new instance: {{}}\", err),"
    ));
    w.close("}");
    w.close("}");
    w.blank();
}

fn activate_layer(w: &mut SourceWriter, ctx: &EmitContext<'_>) {
    let rt = ctx.rt();
    let create = ctx.boot.create_instance;
    let create_info = ident(&create.parameters[0].name);
    let layer = &ctx.profile.trait_name;

    w.lines([
        "/// Creation bootstrap. Call after the next layer created `instance`.",
        "///",
        "/// Binds `layer` to the next resolver and the instance, runs its creation",
        "/// hook and makes it the active layer. On failure the new instance is",
        "/// destroyed through the next resolver and the failure is returned.",
        "#[allow(non_snake_case)]",
    ]);
    w.open(&format!(
        "pub unsafe fn activate_layer(layer: ::std::sync::Arc<dyn {layer}>, next_get_instance_proc_addr: {}, instance: {}, {create_info}: {}) -> {} {{",
        pfn(&ctx.boot.get_instance_proc_addr.name),
        ctx.instance_type(),
        create.parameters[0].type_descriptor,
        ctx.status()
    ));
    w.open("if !layer.upstream().bind(next_get_instance_proc_addr, instance) {");
    w.line(&format!(
        "{rt}::log!(LAYER_NAMESPACE, \"layer instance is already bound to another instance\");"
    ));
    w.line("unsafe { discard_instance(next_get_instance_proc_addr, instance) };");
    w.line(&format!("return {};", ctx.generic_failure()));
    w.close("}");
    w.open(&format!(
        "let result = {rt}::contain_status(LAYER_NAMESPACE, \"{}\", || unsafe {{",
        create.name
    ));
    w.line(&format!("layer.{}({create_info})", create.name));
    w.close("});");
    w.open(&format!("if !{} {{", ctx.succeeded("result")));
    w.line(&format!(
        "{rt}::log!(LAYER_NAMESPACE, \"{} failed with {{:?}}, destroying the new instance\", result);",
        create.name
    ));
    w.line("unsafe { discard_instance(next_get_instance_proc_addr, instance) };");
    w.line("return result;");
    w.close("}");
    w.open("if let Err(err) = ACTIVE_LAYER.install(layer) {");
    w.line(&format!("{rt}::log!(LAYER_NAMESPACE, \"{{}}\", err);"));
    w.line("unsafe { discard_instance(next_get_instance_proc_addr, instance) };");
    w.line(&format!("return {};", ctx.generic_failure()));
    w.close("}");
    w.line("result");
    w.close("}");
}

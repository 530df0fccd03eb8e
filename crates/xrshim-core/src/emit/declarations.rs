//! Declarations unit: function-pointer aliases, the upstream table and the
//! base trait with one default-forwarding method per selected command.

use super::EmitContext;
use super::signature::{args, fn_pointer, ident, method_params, params, pfn, ret};
use super::writer::SourceWriter;
use crate::model::Command;

pub(super) fn emit(ctx: &EmitContext<'_>) -> String {
    let mut w = SourceWriter::new();
    ctx.banner(&mut w, "declarations");
    pfn_aliases(&mut w, ctx);
    upstream_struct(&mut w, ctx);
    upstream_impl(&mut w, ctx);
    base_trait(&mut w, ctx);
    w.finish()
}

fn pfn_aliases(w: &mut SourceWriter, ctx: &EmitContext<'_>) {
    let resolver = ctx.boot.get_instance_proc_addr;
    for command in std::iter::once(resolver).chain(ctx.selected.iter().map(|s| s.command)) {
        w.line("#[allow(non_camel_case_types)]");
        w.line(&format!(
            "pub type {} = {};",
            pfn(&command.name),
            fn_pointer(command, ctx.status())
        ));
    }
    w.blank();
}

fn upstream_struct(w: &mut SourceWriter, ctx: &EmitContext<'_>) {
    let rt = ctx.rt();
    let resolver = &ctx.boot.get_instance_proc_addr.name;
    w.lines([
        "/// Upstream entry points captured for one layer instance.",
        "///",
        "/// Every slot is written at most once: the resolver and the instance handle",
        "/// when the layer is bound, requested commands while the instance is created,",
        "/// intercepted commands when their address is first handed out.",
        "#[allow(non_snake_case)]",
    ]);
    w.open("pub struct Upstream {");
    w.line(&format!(
        "next_get_instance_proc_addr: {rt}::UpstreamSlot<{}>,",
        pfn(resolver)
    ));
    w.line(&format!(
        "instance_handle: {rt}::UpstreamSlot<{}>,",
        ctx.instance_type()
    ));
    for selected in ctx.selected {
        w.line(&format!(
            "{}: {rt}::UpstreamSlot<{}>,",
            selected.name(),
            pfn(selected.name())
        ));
    }
    w.close("}");
    w.blank();
}

fn upstream_impl(w: &mut SourceWriter, ctx: &EmitContext<'_>) {
    let rt = ctx.rt();
    let resolver = ctx.boot.get_instance_proc_addr;

    w.line("#[allow(non_snake_case)]");
    w.open("impl Upstream {");

    w.line("/// Creates a table with every slot unset.");
    w.open("pub const fn new() -> Self {");
    w.open("Self {");
    w.line(&format!("next_get_instance_proc_addr: {rt}::UpstreamSlot::new(),"));
    w.line(&format!("instance_handle: {rt}::UpstreamSlot::new(),"));
    for selected in ctx.selected {
        w.line(&format!("{}: {rt}::UpstreamSlot::new(),", selected.name()));
    }
    w.close("}");
    w.close("}");
    w.blank();

    w.line("/// Binds the next resolver in the chain and the instance handle.");
    w.line("/// Returns `false` if either was already bound.");
    w.open(&format!(
        "pub fn bind(&self, next_get_instance_proc_addr: {}, instance: {}) -> bool {{",
        pfn(&resolver.name),
        ctx.instance_type()
    ));
    w.line("let resolver_bound = self.next_get_instance_proc_addr.capture(next_get_instance_proc_addr);");
    w.line("let instance_bound = self.instance_handle.capture(instance);");
    w.line("resolver_bound && instance_bound");
    w.close("}");
    w.blank();

    w.open(&format!(
        "pub fn instance(&self) -> Option<{}> {{",
        ctx.instance_type()
    ));
    w.line("self.instance_handle.get()");
    w.close("}");
    w.blank();

    w.open(&format!(
        "pub fn next_get_instance_proc_addr(&self) -> Option<{}> {{",
        pfn(&resolver.name)
    ));
    w.line("self.next_get_instance_proc_addr.get()");
    w.close("}");
    w.blank();

    w.line("/// Calls the next resolver in the chain.");
    forwarding_method(w, resolver, "next_get_instance_proc_addr", ctx.status());

    for selected in ctx.selected {
        w.blank();
        forwarding_method(w, selected.command, selected.name(), ctx.status());
    }
    w.close("}");
    w.blank();

    w.open("impl Default for Upstream {");
    w.open("fn default() -> Self {");
    w.line("Self::new()");
    w.close("}");
    w.close("}");
    w.blank();
}

fn forwarding_method(w: &mut SourceWriter, command: &Command, slot: &str, status: &str) {
    w.open(&format!(
        "pub unsafe fn {}({}){} {{",
        command.name,
        method_params(command),
        ret(command, status)
    ));
    w.line(&format!(
        "let upstream_fn = self.{slot}.expect_captured(\"{}\");",
        command.name
    ));
    w.line(&format!("unsafe {{ upstream_fn({}) }}", args(command)));
    w.close("}");
}

fn base_trait(w: &mut SourceWriter, ctx: &EmitContext<'_>) {
    let resolver = ctx.boot.get_instance_proc_addr;
    let create = ctx.boot.create_instance;
    let create_info = &create.parameters[0];

    w.lines([
        "/// Base interface of the layer.",
        "///",
        "/// Every method defaults to the next implementation in the chain. A layer",
        "/// overrides the methods it intercepts and chains explicitly through",
        "/// `self.upstream()`.",
        "#[allow(non_snake_case)]",
    ]);
    w.open(&format!("pub trait {}: Send + Sync {{", ctx.profile.trait_name));
    w.line("/// Upstream table owned by this layer instance.");
    w.line("fn upstream(&self) -> &Upstream;");
    w.blank();

    w.line("/// Delegates to the next resolver, then swaps in trampolines.");
    w.open(&format!(
        "unsafe fn {}({}){} {{",
        resolver.name,
        method_params(resolver),
        ret(resolver, ctx.status())
    ));
    w.line(&format!(
        "unsafe {{ substitute_proc_addr(self.upstream(), {}) }}",
        args(resolver)
    ));
    w.close("}");
    w.blank();

    w.line("/// Runs once the new instance exists; resolves every requested command.");
    w.open(&format!(
        "unsafe fn {}(&self, {}: {}){} {{",
        create.name,
        ident(&create_info.name),
        create_info.type_descriptor,
        ret(create, ctx.status())
    ));
    w.line(&format!(
        "unsafe {{ create_instance_hook(self.upstream(), {}) }}",
        ident(&create_info.name)
    ));
    w.close("}");

    for selected in ctx.selected {
        let command = selected.command;
        w.blank();
        w.open(&format!(
            "unsafe fn {}({}){} {{",
            command.name,
            method_params(command),
            ret(command, ctx.status())
        ));
        w.line(&format!(
            "unsafe {{ self.upstream().{}({}) }}",
            command.name,
            args(command)
        ));
        w.close("}");
    }
    w.close("}");
}

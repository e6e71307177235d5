use crate::gfx::{GraphicsContext, ShaderHandle};

use super::ShaderStage;

/// Compile state of a [`ShaderUnit`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum CompileStatus {
    /// No source assigned (or destroyed).
    Uninitialized,
    /// Source assigned; ready to compile.
    Uncompiled,
    CompiledSuccess,
    CompiledFailure,
    /// The context could not allocate a shader object.
    CannotCreateObject,
}

/// One compiled shader stage: source text, native object, status and log.
#[derive(Debug)]
pub struct ShaderUnit {
    handle: Option<ShaderHandle>,
    stage: ShaderStage,
    name: String,
    source: Vec<String>,
    status: CompileStatus,
    log: String,
}

impl ShaderUnit {
    pub fn new(stage: ShaderStage, name: impl Into<String>) -> Self {
        Self {
            handle: None,
            stage,
            name: name.into(),
            source: Vec::new(),
            status: CompileStatus::Uninitialized,
            log: String::new(),
        }
    }

    /// Convenience: a unit with a single source fragment already assigned.
    pub fn with_source(stage: ShaderStage, name: impl Into<String>, source: impl Into<String>) -> Self {
        let mut unit = Self::new(stage, name);
        unit.set_source(Some(vec![source.into()]));
        unit
    }

    /// Replaces the source and marks the unit `Uncompiled`.
    ///
    /// `None` is a no-op: the previous source and status are kept.
    pub fn set_source(&mut self, lines: Option<Vec<String>>) -> &mut Self {
        if let Some(lines) = lines {
            self.source = lines;
            self.status = CompileStatus::Uncompiled;
        }
        self
    }

    /// Compiles the current source. Only runs from `Uncompiled`; otherwise returns
    /// immediately.
    pub fn compile(&mut self, ctx: &mut dyn GraphicsContext) {
        if self.status != CompileStatus::Uncompiled {
            return;
        }

        self.log.clear();

        let handle = match self.handle {
            Some(h) => h,
            None => match ctx.create_shader(self.stage) {
                Some(h) => {
                    self.handle = Some(h);
                    h
                }
                None => {
                    self.status = CompileStatus::CannotCreateObject;
                    self.log.push_str(&format!(
                        "Error creating {} shader '{}'\n",
                        self.stage, self.name
                    ));
                    log::error!("could not allocate {} shader '{}'", self.stage, self.name);
                    return;
                }
            },
        };

        ctx.shader_source(handle, &self.source);
        ctx.compile_shader(handle);

        let ok = ctx.shader_compile_status(handle);
        self.status = if ok {
            CompileStatus::CompiledSuccess
        } else {
            CompileStatus::CompiledFailure
        };

        self.log.push_str(&format!(
            "{} shader '{}' compilation status: {}\n",
            self.stage,
            self.name,
            if ok { "Success" } else { "Failure" }
        ));
        self.log.push_str(&ctx.shader_info_log(handle));
        self.log.push('\n');

        if ok {
            log::debug!("{} shader '{}' compiled", self.stage, self.name);
        } else {
            log::error!("{} shader '{}' failed to compile", self.stage, self.name);
        }
    }

    /// Releases the native object and returns to `Uninitialized`. Idempotent.
    pub fn destroy(&mut self, ctx: &mut dyn GraphicsContext) {
        if let Some(h) = self.handle.take() {
            ctx.delete_shader(h);
        }
        self.status = CompileStatus::Uninitialized;
    }

    pub fn handle(&self) -> Option<ShaderHandle> {
        self.handle
    }

    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> &[String] {
        &self.source
    }

    pub fn status(&self) -> CompileStatus {
        self.status
    }

    pub fn log(&self) -> &str {
        &self.log
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::fake::FakeContext;

    fn unit(src: &str) -> ShaderUnit {
        ShaderUnit::with_source(ShaderStage::Fragment, "frag", src)
    }

    // ── set_source ────────────────────────────────────────────────────────

    #[test]
    fn new_unit_is_uninitialized() {
        let u = ShaderUnit::new(ShaderStage::Vertex, "v");
        assert_eq!(u.status(), CompileStatus::Uninitialized);
        assert!(u.handle().is_none());
    }

    #[test]
    fn set_source_marks_uncompiled() {
        let mut u = ShaderUnit::new(ShaderStage::Vertex, "v");
        u.set_source(Some(vec!["a".into(), "b".into()]));
        assert_eq!(u.status(), CompileStatus::Uncompiled);
        assert_eq!(u.source(), ["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn set_source_none_keeps_every_status() {
        let mut ctx = FakeContext::default();

        let mut ok = unit("fine");
        ok.compile(&mut ctx);
        ok.set_source(None);
        assert_eq!(ok.status(), CompileStatus::CompiledSuccess);

        let mut bad = unit("#error");
        bad.compile(&mut ctx);
        bad.set_source(None);
        assert_eq!(bad.status(), CompileStatus::CompiledFailure);

        let mut pending = unit("pending");
        pending.set_source(None);
        assert_eq!(pending.status(), CompileStatus::Uncompiled);
        assert_eq!(pending.source(), ["pending".to_string()]);
    }

    // ── compile ───────────────────────────────────────────────────────────

    #[test]
    fn compile_success_logs_status_line() {
        let mut ctx = FakeContext::default();
        let mut u = unit("fine");
        u.compile(&mut ctx);

        assert_eq!(u.status(), CompileStatus::CompiledSuccess);
        assert!(u.handle().is_some());
        assert!(u.log().starts_with("Fragment shader 'frag' compilation status: Success"));
    }

    #[test]
    fn compile_failure_records_native_log() {
        let mut ctx = FakeContext::default();
        let mut u = unit("#error");
        u.compile(&mut ctx);

        assert_eq!(u.status(), CompileStatus::CompiledFailure);
        assert!(u.log().contains("Failure"));
        assert!(u.log().contains("unexpected `#error`"));
    }

    #[test]
    fn compile_without_source_is_noop() {
        let mut ctx = FakeContext::default();
        let mut u = ShaderUnit::new(ShaderStage::Vertex, "v");
        u.compile(&mut ctx);

        assert_eq!(ctx.calls, 0);
        assert_eq!(u.status(), CompileStatus::Uninitialized);
    }

    #[test]
    fn compile_twice_is_noop() {
        let mut ctx = FakeContext::default();
        let mut u = unit("fine");
        u.compile(&mut ctx);
        let calls = ctx.calls;

        u.compile(&mut ctx);
        assert_eq!(ctx.calls, calls);
    }

    #[test]
    fn allocation_failure_is_recorded() {
        let mut ctx = FakeContext {
            fail_shader_alloc: true,
            ..Default::default()
        };
        let mut u = unit("fine");
        u.compile(&mut ctx);

        assert_eq!(u.status(), CompileStatus::CannotCreateObject);
        assert!(u.handle().is_none());
        assert!(u.log().contains("Error creating Fragment shader 'frag'"));
    }

    #[test]
    fn recompile_after_new_source_reuses_object() {
        let mut ctx = FakeContext::default();
        let mut u = unit("#error");
        u.compile(&mut ctx);
        let first = u.handle();

        u.set_source(Some(vec!["fixed".into()]));
        u.compile(&mut ctx);

        assert_eq!(u.status(), CompileStatus::CompiledSuccess);
        assert_eq!(u.handle(), first);
        assert!(!u.log().contains("Failure"));
    }

    // ── destroy ───────────────────────────────────────────────────────────

    #[test]
    fn destroy_is_idempotent() {
        let mut ctx = FakeContext::default();
        let mut u = unit("fine");
        u.compile(&mut ctx);

        u.destroy(&mut ctx);
        u.destroy(&mut ctx);

        assert_eq!(ctx.deleted_shaders, 1);
        assert!(u.handle().is_none());
        assert_eq!(u.status(), CompileStatus::Uninitialized);
    }
}

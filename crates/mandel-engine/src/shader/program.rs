use std::collections::HashMap;

use crate::gfx::{GraphicsContext, ProgramHandle, UniformLocation};

use super::ShaderUnit;

/// Link state of a [`ShaderProgram`].
///
/// `LinkedFailure` and `Deleted` are terminal for the instance: build a new
/// program to retry.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LinkStatus {
    Unbuilt,
    Linking,
    LinkedSuccess,
    LinkedFailure,
    /// Native objects released by [`ShaderProgram::delete`].
    Deleted,
}

/// A linked set of shader units plus the uniform locations it resolved.
#[derive(Debug)]
pub struct ShaderProgram {
    handle: Option<ProgramHandle>,
    name: String,
    units: Vec<ShaderUnit>,
    uniforms: HashMap<String, Option<UniformLocation>>,
    status: LinkStatus,
    build_log: String,
}

impl ShaderProgram {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            handle: None,
            name: name.into(),
            units: Vec::new(),
            uniforms: HashMap::new(),
            status: LinkStatus::Unbuilt,
            build_log: String::new(),
        }
    }

    /// Appends a unit. The program owns it from here on.
    pub fn add_unit(mut self, unit: ShaderUnit) -> Self {
        if self.units.iter().any(|u| u.stage() == unit.stage()) {
            log::warn!(
                "program '{}' already has a {} unit; '{}' added anyway",
                self.name,
                unit.stage(),
                unit.name()
            );
        }
        self.units.push(unit);
        self
    }

    /// Compiles every unit, links, and resolves `uniform_names`.
    ///
    /// Runs once per instance: later calls return the recorded status without
    /// touching the context.
    pub fn build(&mut self, ctx: &mut dyn GraphicsContext, uniform_names: &[&str]) -> LinkStatus {
        match self.status {
            LinkStatus::Unbuilt => {}
            LinkStatus::Deleted => {
                log::warn!("program '{}' was deleted; build ignored", self.name);
                return self.status;
            }
            status => return status,
        }
        self.status = LinkStatus::Linking;

        for unit in &mut self.units {
            unit.compile(ctx);
            self.build_log.push_str(unit.log());
        }

        let handle = match self.handle {
            Some(h) => h,
            None => match ctx.create_program() {
                Some(h) => {
                    self.handle = Some(h);
                    h
                }
                None => {
                    self.build_log
                        .push_str(&format!("Error creating program '{}'\n", self.name));
                    log::error!("could not allocate program '{}'", self.name);
                    self.status = LinkStatus::LinkedFailure;
                    return self.status;
                }
            },
        };

        for unit in &self.units {
            if let Some(shader) = unit.handle() {
                ctx.attach_shader(handle, shader);
            }
        }

        ctx.link_program(handle);
        let linked = ctx.program_link_status(handle);

        self.build_log.push_str(&format!(
            "Program '{}' link status: {}\n",
            self.name,
            if linked { "Success" } else { "Failure" }
        ));
        self.build_log.push_str(&ctx.program_info_log(handle));
        self.build_log.push('\n');

        if !linked {
            log::error!("program '{}' failed to link", self.name);
            self.status = LinkStatus::LinkedFailure;
            return self.status;
        }

        for name in uniform_names {
            let location = ctx.uniform_location(handle, name);
            if location.is_none() {
                log::debug!("uniform '{}' not found in program '{}'", name, self.name);
            }
            self.uniforms.insert(name.to_string(), location);
        }

        self.status = LinkStatus::LinkedSuccess;
        self.status
    }

    /// Cached location of `name`; `None` when unregistered or unresolved.
    pub fn uniform_location(&self, name: &str) -> Option<UniformLocation> {
        self.uniforms.get(name).copied().flatten()
    }

    /// Destroys every unit and the program object. The program cannot be built again.
    pub fn delete(&mut self, ctx: &mut dyn GraphicsContext) {
        for unit in &mut self.units {
            unit.destroy(ctx);
        }
        if let Some(h) = self.handle.take() {
            ctx.delete_program(h);
        }
        self.uniforms.clear();
        self.status = LinkStatus::Deleted;
    }

    pub fn handle(&self) -> Option<ProgramHandle> {
        self.handle
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn units(&self) -> &[ShaderUnit] {
        &self.units
    }

    pub fn status(&self) -> LinkStatus {
        self.status
    }

    pub fn is_linked(&self) -> bool {
        self.status == LinkStatus::LinkedSuccess && self.handle.is_some()
    }

    /// Unit compile logs followed by the link log.
    pub fn build_log(&self) -> &str {
        &self.build_log
    }

    pub fn uniforms(&self) -> &HashMap<String, Option<UniformLocation>> {
        &self.uniforms
    }
}

impl Drop for ShaderProgram {
    fn drop(&mut self) {
        if let Some(h) = self.handle {
            log::warn!(
                "program '{}' dropped with live native object {}; call delete() first",
                self.name,
                h.get()
            );
        }
    }
}

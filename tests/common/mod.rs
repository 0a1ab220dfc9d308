use docnav::{
    build::render::{RenderContext, Renderer},
    config::Config,
    error::Result,
    model::Navigation,
};
use std::{cell::RefCell, path::PathBuf, rc::Rc};

/// Path of a fixture site under `tests/data`.
#[allow(dead_code)] // Avoid a false positive on the dead code analysis.
pub fn test_dir(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

/// Records what it was asked to render.
#[derive(Clone, Default)]
pub struct TestRenderer(Rc<RefCell<Option<Navigation>>>, Rc<RefCell<Option<Config>>>);

impl TestRenderer {
    #[allow(dead_code)] // Avoid a false positive on the dead code analysis.
    pub fn navigation(&self) -> Navigation {
        self.0.borrow_mut().take().expect("result was not set")
    }

    #[allow(dead_code)] // Avoid a false positive on the dead code analysis.
    pub fn config(&self) -> Config {
        self.1.borrow_mut().take().expect("result was not set")
    }
}

impl Renderer for TestRenderer {
    fn name(&self) -> &str {
        "test_renderer"
    }

    fn render(&self, ctx: &RenderContext<'_>) -> Result<()> {
        *self.0.borrow_mut() = Some(ctx.navigation.clone());
        *self.1.borrow_mut() = Some(ctx.config.clone());

        Ok(())
    }
}

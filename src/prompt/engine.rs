use tera::Tera;

/// Tera-backed template engine holding every prompt the pipeline renders.
///
/// Templates are registered once at construction, so a single engine can be
/// shared across concurrent turns.
pub struct PromptEngine {
    tera: Tera,
}

impl PromptEngine {
    /// Engine with the built-in pipeline templates.
    pub fn new() -> anyhow::Result<Self> {
        let mut engine = Self::empty();
        for (name, content) in super::builder::TEMPLATES {
            engine.add_template(name, content)?;
        }
        Ok(engine)
    }

    /// Engine with no templates (no filesystem).
    pub fn empty() -> Self {
        Self {
            tera: Tera::default(),
        }
    }

    /// Register a template from a string, replacing any with the same name.
    pub fn add_template(&mut self, name: &str, content: &str) -> anyhow::Result<()> {
        self.tera.add_raw_template(name, content)?;
        Ok(())
    }

    pub fn render(&self, template_name: &str, context: &tera::Context) -> anyhow::Result<String> {
        let rendered = self.tera.render(template_name, context)?;
        Ok(rendered)
    }
}

use anyhow::{Context as _, Result};
use std::path::Path;
use tera::{Context, Tera};

use crate::models::RenderedConfig;

pub const L2VPN_TEMPLATE: &str = "l2vpn-template";
pub const ACCESS_TEMPLATE: &str = "access-python-template";

const BUILTIN_TEMPLATES: &[(&str, &str)] = &[
    (L2VPN_TEMPLATE, include_str!("../../templates/l2vpn-template.tera")),
    (ACCESS_TEMPLATE, include_str!("../../templates/access-python-template.tera")),
];

/// Ordered template variables. Adding an existing name replaces its value.
#[derive(Debug, Clone, Default)]
pub struct TemplateVariables {
    vars: Vec<(String, String)>,
}

impl TemplateVariables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: &str, value: impl ToString) {
        let value = value.to_string();
        match self.vars.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = value,
            None => self.vars.push((name.to_string(), value)),
        }
    }

    #[cfg(test)]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.iter().find(|(n, _)| n == name).map(|(_, v)| v.as_str())
    }

    fn to_context(&self) -> Context {
        let mut context = Context::new();
        for (name, value) in &self.vars {
            context.insert(name.as_str(), value);
        }
        context
    }
}

/// TemplateEngine renders named device configuration templates
pub struct TemplateEngine {
    tera: Tera,
}

impl TemplateEngine {
    /// Engine with only the templates compiled into the binary
    pub fn builtin() -> Result<Self> {
        let mut tera = Tera::default();
        for (name, content) in BUILTIN_TEMPLATES {
            tera.add_raw_template(name, content)
                .map_err(|e| anyhow::anyhow!("Invalid built-in template {}: {}", name, e))?;
        }
        Ok(Self { tera })
    }

    /// Built-in templates, overridden or extended by `<name>.tera` files in `dir`
    pub fn load(dir: &str) -> Result<Self> {
        let mut engine = Self::builtin()?;
        let path = Path::new(dir);
        if !path.is_dir() {
            tracing::debug!("Templates dir {} not found, using built-in templates", dir);
            return Ok(engine);
        }

        for entry in std::fs::read_dir(path).with_context(|| format!("Failed to read {}", dir))? {
            let file = entry?.path();
            if file.extension().and_then(|e| e.to_str()) != Some("tera") {
                continue;
            }
            let Some(name) = file.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let content = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read template {}", file.display()))?;
            engine.tera.add_raw_template(name, &content)
                .map_err(|e| anyhow::anyhow!("Invalid template {}: {}", file.display(), e))?;
            tracing::info!("Loaded template {} from {}", name, file.display());
        }
        Ok(engine)
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tera.get_template_names().map(str::to_string).collect();
        names.sort();
        names
    }

    /// Render template `name` for `device`
    pub fn apply(&self, name: &str, device: &str, vars: &TemplateVariables) -> Result<RenderedConfig> {
        let config = self.tera
            .render(name, &vars.to_context())
            .map_err(|e| anyhow::anyhow!("Template {} rendering failed: {}", name, e))?;
        Ok(RenderedConfig {
            device: device.to_string(),
            template: name.to_string(),
            config,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variables_overwrite_in_place() {
        let mut vars = TemplateVariables::new();
        vars.add("VC_CLASS", "gold");
        vars.add("VLAN_ID", 10);
        vars.add("VC_CLASS", "silver");
        assert_eq!(vars.get("VC_CLASS"), Some("silver"));
        assert_eq!(vars.get("VLAN_ID"), Some("10"));
        assert_eq!(vars.vars.len(), 2);
        assert_eq!(vars.vars[0].0, "VC_CLASS");
    }

    #[test]
    fn test_builtin_templates_registered() {
        let engine = TemplateEngine::builtin().unwrap();
        assert_eq!(engine.names(), vec![ACCESS_TEMPLATE.to_string(), L2VPN_TEMPLATE.to_string()]);
    }

    #[test]
    fn test_apply_access_template() {
        let engine = TemplateEngine::builtin().unwrap();
        let mut vars = TemplateVariables::new();
        vars.add("VLAN", 100);
        vars.add("ACCESS_GE_INTERFACE", "0/1");
        vars.add("TRUNK_GE_INTERFACE", "0/24");
        vars.add("ACCESS_INT_DESCRIPTION", "Building 4");
        let rendered = engine.apply(ACCESS_TEMPLATE, "sw0", &vars).unwrap();
        assert_eq!(rendered.device, "sw0");
        assert_eq!(rendered.template, ACCESS_TEMPLATE);
        assert!(rendered.config.starts_with("vlan 100\n"));
        assert!(rendered.config.contains(" description Building 4\n"));
        assert!(rendered.config.contains("switchport trunk allowed vlan add 100"));
    }

    #[test]
    fn test_missing_variable_is_an_error() {
        let engine = TemplateEngine::builtin().unwrap();
        let vars = TemplateVariables::new();
        assert!(engine.apply(ACCESS_TEMPLATE, "sw0", &vars).is_err());
    }

    #[test]
    fn test_unknown_template_is_an_error() {
        let engine = TemplateEngine::builtin().unwrap();
        assert!(engine.apply("nope", "sw0", &TemplateVariables::new()).is_err());
    }

    #[test]
    fn test_load_without_dir_falls_back() {
        let engine = TemplateEngine::load("/nonexistent/templates").unwrap();
        assert_eq!(engine.names().len(), 2);
    }

    #[test]
    fn test_load_overrides_from_dir() {
        let dir = std::env::temp_dir().join(format!("service-packs-tmpl-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("access-python-template.tera"), "vlan {{ VLAN }} only").unwrap();
        std::fs::write(dir.join("README.md"), "ignored").unwrap();

        let engine = TemplateEngine::load(dir.to_str().unwrap()).unwrap();
        let mut vars = TemplateVariables::new();
        vars.add("VLAN", 7);
        let rendered = engine.apply(ACCESS_TEMPLATE, "sw0", &vars).unwrap();
        assert_eq!(rendered.config, "vlan 7 only");
        assert_eq!(engine.names().len(), 2);

        std::fs::remove_dir_all(&dir).ok();
    }
}

use std::fmt;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::{Config, ModulesSetting};
use crate::errors::{PresetError, Result};
use crate::plan::{transform_includes_and_excludes, InclusionPlan};
use crate::registry::{is_built_in, Registry, DEFAULT_WEB_BUILT_INS};
use crate::requirement::{is_plugin_required, unsupported_environments};
use crate::targets::{TargetResolver, Targets};

/// Plugin that rewrites `import`/`export` for a module system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleType {
    Amd,
    Umd,
    Systemjs,
    Commonjs,
}

impl ModuleType {
    /// `None` when module transformation is disabled.
    pub fn from_setting(setting: &ModulesSetting) -> Result<Option<Self>> {
        match setting {
            ModulesSetting::Flag(false) => Ok(None),
            ModulesSetting::Flag(true) => Err(invalid_modules("true")),
            ModulesSetting::Name(name) => match name.as_str() {
                "amd" => Ok(Some(Self::Amd)),
                "umd" => Ok(Some(Self::Umd)),
                "systemjs" => Ok(Some(Self::Systemjs)),
                "commonjs" => Ok(Some(Self::Commonjs)),
                other => Err(invalid_modules(other)),
            },
        }
    }

    pub fn plugin_name(self) -> &'static str {
        match self {
            Self::Amd => "transform-es2015-modules-amd",
            Self::Umd => "transform-es2015-modules-umd",
            Self::Systemjs => "transform-es2015-modules-systemjs",
            Self::Commonjs => "transform-es2015-modules-commonjs",
        }
    }
}

impl fmt::Display for ModuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Amd => "amd",
            Self::Umd => "umd",
            Self::Systemjs => "systemjs",
            Self::Commonjs => "commonjs",
        };
        f.write_str(name)
    }
}

fn invalid_modules(value: &str) -> PresetError {
    PresetError::invalid_option(
        "modules",
        format!("`{}` is not one of amd, umd, systemjs, commonjs or false", value),
    )
}

/// What to apply for a configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PresetResult {
    pub targets: Targets,
    pub modules: Option<ModuleType>,
    pub loose: bool,
    /// Syntax plugins, module transform first
    pub plugins: Vec<String>,
    /// Polyfills, empty unless built-ins are enabled
    #[serde(rename = "builtIns")]
    pub built_ins: Vec<String>,
    /// Whether the polyfills need the regenerator runtime
    pub regenerator: bool,
}

/// Validated `include`/`exclude` options.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Inclusions {
    pub include: InclusionPlan,
    pub exclude: InclusionPlan,
}

/// Selects plugins and built-ins for resolved targets.
pub struct Preset {
    registry: Registry,
    resolver: TargetResolver,
}

impl Preset {
    pub fn new() -> Result<Self> {
        Ok(Self {
            registry: Registry::bundled()?,
            resolver: TargetResolver::new()?,
        })
    }

    pub fn with_parts(registry: Registry, resolver: TargetResolver) -> Self {
        Self { registry, resolver }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn resolver(&self) -> &TargetResolver {
        &self.resolver
    }

    /// Check `include` and `exclude` against the registry and split them.
    pub fn validate_inclusions(&self, include: &[String], exclude: &[String]) -> Result<Inclusions> {
        let mut unknown: Vec<String> = Vec::new();
        for name in include.iter().chain(exclude) {
            if !self.registry.is_known(name) && !unknown.contains(name) {
                unknown.push(name.clone());
            }
        }
        if !unknown.is_empty() {
            return Err(PresetError::UnknownPlugin { names: unknown });
        }

        let duplicates: Vec<String> = include
            .iter()
            .filter(|name| exclude.contains(name))
            .cloned()
            .collect();
        if !duplicates.is_empty() {
            return Err(PresetError::DuplicateInclusion { names: duplicates });
        }

        Ok(Inclusions {
            include: transform_includes_and_excludes(include, is_built_in),
            exclude: transform_includes_and_excludes(exclude, is_built_in),
        })
    }

    /// Whether one plugin or built-in is required for `targets`.
    pub fn is_required(&self, name: &str, targets: &Targets) -> Result<bool> {
        if DEFAULT_WEB_BUILT_INS.contains(&name) {
            return Ok(true);
        }

        let support = self
            .registry
            .support(name)
            .ok_or_else(|| PresetError::UnknownPlugin { names: vec![name.to_string()] })?;

        Ok(is_plugin_required(targets, support))
    }

    pub fn build(&self, config: &Config) -> Result<PresetResult> {
        let inclusions = self.validate_inclusions(&config.include, &config.exclude)?;
        let modules = ModuleType::from_setting(&config.modules)?;
        let targets = self.resolver.resolve(&config.targets)?;

        if !config.use_built_ins {
            let ignored: Vec<&String> = inclusions
                .include
                .built_ins
                .iter()
                .chain(&inclusions.exclude.built_ins)
                .collect();
            if !ignored.is_empty() {
                warn!("Built-ins {:?} ignored because use_built_ins is off", ignored);
            }
        }

        let mut plugins: Vec<String> = modules
            .map(|m| m.plugin_name().to_string())
            .into_iter()
            .collect();

        let required = self
            .registry
            .plugins()
            .filter(|(_, support)| is_plugin_required(&targets, support))
            .map(|(name, _)| name.to_string());

        for name in required.chain(inclusions.include.plugins.iter().cloned()) {
            if !inclusions.exclude.contains_plugin(&name) && !plugins.contains(&name) {
                plugins.push(name);
            }
        }

        let mut built_ins = Vec::new();
        if config.use_built_ins {
            let required = self
                .registry
                .built_ins()
                .filter(|(_, support)| is_plugin_required(&targets, support))
                .map(|(name, _)| name.to_string())
                .chain(DEFAULT_WEB_BUILT_INS.iter().map(|name| name.to_string()))
                .filter(|name| !inclusions.exclude.contains_built_in(name));

            for name in required.chain(inclusions.include.built_ins.iter().cloned()) {
                if !built_ins.contains(&name) {
                    built_ins.push(name);
                }
            }
        }

        let regenerator = config.use_built_ins && plugins.iter().any(|p| p == "transform-regenerator");

        let result = PresetResult {
            targets,
            modules,
            loose: config.loose,
            plugins,
            built_ins,
            regenerator,
        };

        if config.debug {
            self.log_debug(&result);
        }

        Ok(result)
    }

    fn log_debug(&self, result: &PresetResult) {
        info!("presetenv: `DEBUG` option");
        match serde_json::to_string(&result.targets) {
            Ok(targets) => info!("Using targets: {}", targets),
            Err(e) => warn!("Unable to render targets: {}", e),
        }
        match result.modules {
            Some(modules) => info!("Modules transform: {}", modules),
            None => info!("Modules transform: false"),
        }

        info!("Using plugins:");
        for name in &result.plugins {
            self.log_selection(name, &result.targets);
        }

        if !result.built_ins.is_empty() {
            info!("Using polyfills:");
            for name in &result.built_ins {
                self.log_selection(name, &result.targets);
            }
        }
    }

    fn log_selection(&self, name: &str, targets: &Targets) {
        match self.registry.support(name) {
            Some(support) => {
                let environments: Vec<String> = unsupported_environments(targets, support)
                    .iter()
                    .map(ToString::to_string)
                    .collect();
                info!("  {} {{{}}}", name, environments.join(", "));
            }
            None => info!("  {}", name),
        }
    }
}

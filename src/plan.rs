use serde::Serialize;

/// Plugin and built-in names split by kind, each in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InclusionPlan {
    pub all: Vec<String>,
    pub plugins: Vec<String>,
    #[serde(rename = "builtIns")]
    pub built_ins: Vec<String>,
}

impl InclusionPlan {
    pub fn contains_plugin(&self, name: &str) -> bool {
        self.plugins.iter().any(|p| p == name)
    }

    pub fn contains_built_in(&self, name: &str) -> bool {
        self.built_ins.iter().any(|b| b == name)
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }
}

/// Split `names` into syntax plugins and built-ins.
pub fn transform_includes_and_excludes<S, F>(names: &[S], is_built_in: F) -> InclusionPlan
where
    S: AsRef<str>,
    F: Fn(&str) -> bool,
{
    let mut plan = InclusionPlan::default();

    for name in names {
        let name: &str = name.as_ref();
        plan.all.push(name.to_string());
        if is_built_in(name) {
            plan.built_ins.push(name.to_string());
        } else {
            plan.plugins.push(name.to_string());
        }
    }

    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::is_built_in;

    #[test]
    fn test_plugin_goes_to_plugins() {
        let plan = transform_includes_and_excludes(&["transform-es2015-arrow-functions"], is_built_in);
        assert_eq!(plan.all, vec!["transform-es2015-arrow-functions"]);
        assert_eq!(plan.plugins, vec!["transform-es2015-arrow-functions"]);
        assert!(plan.built_ins.is_empty());
    }

    #[test]
    fn test_built_in_goes_to_built_ins() {
        let plan = transform_includes_and_excludes(&["es6.map"], is_built_in);
        assert_eq!(plan.all, vec!["es6.map"]);
        assert!(plan.plugins.is_empty());
        assert_eq!(plan.built_ins, vec!["es6.map"]);
    }

    #[test]
    fn test_predicate_decides() {
        let plan = transform_includes_and_excludes(&["transform-a"], |_| true);
        assert_eq!(plan.built_ins, vec!["transform-a"]);
        let plan = transform_includes_and_excludes(&["es6.map"], |_| false);
        assert_eq!(plan.plugins, vec!["es6.map"]);
    }

    #[test]
    fn test_order_is_preserved() {
        let names = vec![
            "es6.set".to_string(),
            "transform-regenerator".to_string(),
            "es6.map".to_string(),
            "transform-es2015-classes".to_string(),
        ];
        let plan = transform_includes_and_excludes(&names, is_built_in);
        assert_eq!(plan.all, names);
        assert_eq!(plan.plugins, vec!["transform-regenerator", "transform-es2015-classes"]);
        assert_eq!(plan.built_ins, vec!["es6.set", "es6.map"]);
    }

    #[test]
    fn test_empty_input() {
        let plan = transform_includes_and_excludes::<&str, _>(&[], is_built_in);
        assert!(plan.is_empty());
        assert_eq!(plan, InclusionPlan::default());
    }

    #[test]
    fn test_serialized_shape() {
        let plan = transform_includes_and_excludes(&["es6.map"], is_built_in);
        assert_eq!(
            serde_json::to_value(&plan).unwrap(),
            serde_json::json!({"all": ["es6.map"], "plugins": [], "builtIns": ["es6.map"]})
        );
    }
}

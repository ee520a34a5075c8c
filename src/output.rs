//! Rendering documents for stdout

use serde_json::Value;

use crate::cli::OutputFormat;
use crate::error::Result;

pub fn render(value: &Value, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Yaml => Ok(serde_yaml::to_string(value)?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_yaml() {
        let doc = json!({"repositories": ["r1"]});
        let rendered = render(&doc, OutputFormat::Yaml).unwrap();
        assert!(rendered.contains("repositories:"));
        assert!(rendered.contains("- r1"));
    }

    #[test]
    fn test_render_json() {
        let rendered = render(&json!({"a": 1}), OutputFormat::Json).unwrap();
        assert_eq!(rendered, "{\n  \"a\": 1\n}");
    }
}

//! Split a whole single-file component into its three editor buffers, and
//! join them back.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    static ref TEMPLATE_OPEN_RE: Regex = Regex::new(r"(?i)<template\b[^>]*>").unwrap();
    static ref TEMPLATE_CLOSE_RE: Regex = Regex::new(r"(?i)</template\s*>").unwrap();
    static ref SCRIPT_REGEX: Regex =
        Regex::new(r"(?is)<script\b[^>]*>(.*?)</script\s*>").unwrap();
    static ref STYLE_REGEX: Regex = Regex::new(r"(?is)<style\b[^>]*>(.*?)</style\s*>").unwrap();
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SfcParts {
    pub template: String,
    pub script: String,
    pub style: String,
}

impl SfcParts {
    pub fn new(
        template: impl Into<String>,
        script: impl Into<String>,
        style: impl Into<String>,
    ) -> Self {
        Self {
            template: template.into(),
            script: script.into(),
            style: style.into(),
        }
    }

    /// Render as one `.vue`-style document.
    pub fn to_source(&self) -> String {
        format!(
            "<template>\n{}\n</template>\n\n<script setup>\n{}\n</script>\n\n<style>\n{}\n</style>",
            self.template, self.script, self.style
        )
    }
}

/// Outermost `<template>` block; every `<script>` and `<style>` block,
/// each group joined by a blank line. Missing blocks come back empty.
pub fn parse_sfc(source: &str) -> SfcParts {
    SfcParts {
        template: extract_template(source),
        script: join_blocks(&SCRIPT_REGEX, source),
        style: join_blocks(&STYLE_REGEX, source),
    }
}

fn extract_template(source: &str) -> String {
    let Some(open) = TEMPLATE_OPEN_RE.find(source) else {
        return String::new();
    };
    // Nested <template v-if> blocks close before the outer one.
    let close = TEMPLATE_CLOSE_RE
        .find_iter(&source[open.end()..])
        .last()
        .map(|m| open.end() + m.start());

    match close {
        Some(close) => source[open.end()..close].trim().to_string(),
        None => String::new(),
    }
}

fn join_blocks(re: &Regex, source: &str) -> String {
    re.captures_iter(source)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|content| !content.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_sfc() {
        let source = r#"
<template>
  <div>{{ msg }}</div>
</template>

<script setup lang="ts">
const msg = ref('hi')
</script>

<style scoped>
div { color: red; }
</style>
"#;
        let parts = parse_sfc(source);
        assert_eq!(parts.template, "<div>{{ msg }}</div>");
        assert_eq!(parts.script, "const msg = ref('hi')");
        assert_eq!(parts.style, "div { color: red; }");
    }

    #[test]
    fn test_nested_template_blocks() {
        let source = "<template><div><template v-if=\"ok\"><p>a</p></template></div></template>";
        let parts = parse_sfc(source);
        assert_eq!(
            parts.template,
            "<div><template v-if=\"ok\"><p>a</p></template></div>"
        );
    }

    #[test]
    fn test_multiple_scripts_joined() {
        let source = "<script>export default {}</script><template><p></p></template><script setup>const a = 1</script>";
        let parts = parse_sfc(source);
        assert_eq!(parts.script, "export default {}\n\nconst a = 1");
        assert_eq!(parts.style, "");
    }

    #[test]
    fn test_missing_blocks() {
        assert_eq!(parse_sfc("just text"), SfcParts::default());
        assert_eq!(parse_sfc("<template><p>unterminated").template, "");
    }

    #[test]
    fn test_to_source_and_back() {
        let parts = SfcParts::new("<p>{{ a }}</p>", "const a = ref(1)", "p { margin: 0 }");
        let source = parts.to_source();
        assert!(source.starts_with("<template>\n<p>{{ a }}</p>\n</template>"));
        assert!(source.contains("<script setup>\nconst a = ref(1)\n</script>"));
        assert_eq!(parse_sfc(&source), parts);
    }
}

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::diagram::Diagram;

pub fn escape_xml(input: &str) -> String {
    let mut escaped = String::new();
    for ch in input.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}

pub fn read_diagram_file(path: &Path) -> Result<Diagram> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read '{}'", path.display()))?;
    Diagram::from_json(&contents)
        .with_context(|| format!("failed to load diagram from '{}'", path.display()))
}

pub fn write_diagram_file(path: &Path, diagram: &Diagram) -> Result<()> {
    let json = diagram.to_json()?;
    fs::write(path, json.as_bytes())
        .with_context(|| format!("failed to write '{}'", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagram::{Node, NodeShape};
    use crate::geometry::Point;

    #[test]
    fn escapes_markup_characters() {
        assert_eq!(
            escape_xml(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &apos;Jerry&apos;&lt;/a&gt;"
        );
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn diagram_files_round_trip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flow.json");

        let mut diagram = Diagram::new();
        diagram
            .add_node(Node::new("a", NodeShape::Diamond, Point::new(5.0, 5.0), "Start"))
            .unwrap();
        write_diagram_file(&path, &diagram).unwrap();

        let loaded = read_diagram_file(&path).unwrap();
        assert_eq!(loaded.nodes, diagram.nodes);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn missing_file_reports_path() {
        let err = read_diagram_file(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.json"));
    }
}

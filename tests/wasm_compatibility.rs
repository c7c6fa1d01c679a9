#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use oxflow::{Diagram, DiagramEditor, EdgeType, Point, PointerEvent, Rect, Viewport};
    use wasm_bindgen_test::*;

    const DOCUMENT: &str = r#"{
        "nodes": [
            {"id": "a", "type": "ellipse", "position": {"x": 0, "y": 0}, "data": {"label": "Start"}},
            {"id": "b", "type": "diamond", "position": {"x": 0, "y": 200}, "data": {"label": "Great!"}}
        ],
        "edges": [
            {"id": "e1", "source": "a", "target": "b", "type": "smoothstep"}
        ]
    }"#;

    #[wasm_bindgen_test]
    fn test_diagram_parse_and_render() {
        let diagram = Diagram::from_json(DOCUMENT).expect("Failed to parse diagram");

        let svg = diagram
            .render_svg("white", None)
            .expect("Failed to render SVG");

        assert!(svg.contains("<svg"));
        assert!(svg.contains("Start"));
        assert!(svg.contains("Great!"));
    }

    #[wasm_bindgen_test]
    fn test_drag_round_trip() {
        let diagram = Diagram::from_json(DOCUMENT).expect("Failed to parse diagram");
        let mut editor = DiagramEditor::new(diagram);
        editor.set_viewport(Viewport::measured(Rect::from_origin_size(
            Point::new(0.0, 0.0),
            400.0,
            400.0,
        )));

        editor
            .dispatch("e1", PointerEvent::PathClick { x: 75.0, y: 120.0 })
            .expect("click");
        editor.dispatch("e1", PointerEvent::HandleDown).expect("down");
        editor
            .dispatch("e1", PointerEvent::Move { x: 30.0, y: 90.0 })
            .expect("move");
        let geometry = editor.dispatch("e1", PointerEvent::Up).expect("up");

        assert!(geometry.route.crossed);
        assert_eq!(
            editor.diagram().edge("e1").and_then(|e| e.data.control_point),
            Some(Point::new(30.0, 90.0))
        );
    }

    #[wasm_bindgen_test]
    fn test_minimal_diagram() {
        let mut diagram = Diagram::new();
        diagram.add_shape(oxflow::NodeShape::Default);
        let svg = diagram
            .render_svg("white", None)
            .expect("Failed to render minimal SVG");

        assert!(svg.contains("<svg"));
        assert!(svg.contains("viewBox"));
        assert_eq!(EdgeType::default(), EdgeType::Bezier);
    }
}

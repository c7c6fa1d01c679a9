use std::path::PathBuf;

use anyhow::Result;
use oxflow::{
    BendAxis, Diagram, DiagramEditor, EdgeType, InteractionState, Point, PointerEvent, Rect,
    Viewport, read_diagram_file,
};

fn fixture() -> Result<Diagram> {
    read_diagram_file(&PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/flow.json"))
}

fn measured_editor() -> Result<DiagramEditor> {
    let mut editor = DiagramEditor::new(fixture()?);
    let mut viewport = Viewport::measured(Rect::from_origin_size(
        Point::new(100.0, 50.0),
        1200.0,
        800.0,
    ));
    viewport.pan_by(200.0, 0.0);
    editor.set_viewport(viewport);
    Ok(editor)
}

#[test]
fn diagram_loads_and_renders_svg() -> Result<()> {
    let diagram = fixture()?;
    assert_eq!(diagram.nodes.len(), 4);
    assert_eq!(
        diagram.edge("e-debug-check").map(|edge| edge.data.control_point),
        Some(Some(Point::new(420.0, 250.0)))
    );

    let svg = diagram.render_svg("white", None)?;
    assert!(svg.contains("<svg"));
    assert!(svg.contains("Great!"));
    assert!(svg.contains("ship it"));
    assert!(svg.contains("stroke-dasharray"));
    Ok(())
}

#[test]
fn persisted_step_edge_routes_through_its_control_point() -> Result<()> {
    let diagram = fixture()?;
    let route = diagram.route("e-check-done")?;
    // check bottom (75,200) -> done top (-125,320); x = -50 is inside the span.
    assert!(!route.crossed);
    assert_eq!(route.path.to_svg(), "M75,200 V260 H-125 V320");
    Ok(())
}

#[test]
fn drag_session_writes_store_once() -> Result<()> {
    let mut editor = measured_editor()?;
    let edge = "e-check-debug";

    // device (375, 310) projects to diagram (75, 260)
    editor.dispatch(edge, PointerEvent::PathClick { x: 375.0, y: 310.0 })?;
    assert_eq!(
        editor.router(edge).map(|router| router.state()),
        Some(InteractionState::Placed)
    );
    editor.dispatch(edge, PointerEvent::HandleDown)?;
    for x in [400.0, 450.0, 900.0] {
        editor.dispatch(edge, PointerEvent::Move { x, y: 330.0 })?;
        assert_eq!(
            editor.diagram().edge(edge).and_then(|e| e.data.control_point),
            None
        );
    }
    let geometry = editor.dispatch(edge, PointerEvent::Up)?;

    assert!(geometry.route.crossed, "600 lies beyond the target at 275");
    assert_eq!(
        editor.diagram().edge(edge).and_then(|e| e.data.control_point),
        Some(Point::new(600.0, 280.0))
    );
    assert_eq!(editor.listeners().active_count(), 0);
    Ok(())
}

#[test]
fn free_bend_keeps_persisted_axis() -> Result<()> {
    let mut editor = measured_editor()?;
    let route = editor.route("e-debug-check")?;
    assert_eq!(route.bend_axis, Some(BendAxis::Horizontal));
    assert_eq!(route.control_point, Point::new(420.0, 250.0));

    editor.dispatch("e-debug-check", PointerEvent::HandleDoubleClick)?;
    let edge = editor.diagram().edge("e-debug-check");
    assert_eq!(edge.and_then(|e| e.data.control_point), None);
    assert_eq!(edge.and_then(|e| e.data.bend_axis), Some(BendAxis::Horizontal));
    Ok(())
}

#[test]
fn switching_edge_type_reroutes() -> Result<()> {
    let mut editor = measured_editor()?;
    editor.set_edge_type("e-start-check", EdgeType::Step)?;
    let route = editor.route("e-start-check")?;
    assert_eq!(route.path.to_svg(), "M75,40 V100 H75 V160");
    Ok(())
}

#[test]
fn saved_documents_use_control_point_field() -> Result<()> {
    let diagram = fixture()?;
    let json = diagram.to_json()?;
    assert!(json.contains("\"controlPoint\""));
    assert!(!json.contains("\"marker\""));
    let reloaded = Diagram::from_json(&json)?;
    assert_eq!(reloaded.edges, diagram.edges);
    Ok(())
}

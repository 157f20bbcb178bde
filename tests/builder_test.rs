//! Tests for ScaleBuilder

use scalebal::domain::{
    Hand, LineOutcome, Pan, RejectReason, ScaleBuilder, Side, DEFAULT_SELF_MASS,
};

#[test]
fn given_table_when_building_then_creates_scales_in_mention_order() {
    // Arrange
    let lines = ["A,2,B", "B,1,3"];

    // Act
    let output = ScaleBuilder::default().build(lines).unwrap();

    // Assert
    let names: Vec<_> = output.graph.iter().map(|(_, s)| s.name.clone()).collect();
    assert_eq!(names, vec!["A", "B"]);
    assert!(output.rejected.is_empty());
}

#[test]
fn given_reference_when_building_then_side_links_existing_scale() {
    // Arrange
    let lines = ["Top,Mid,1", "Mid,2,3"];

    // Act
    let output = ScaleBuilder::default().build(lines).unwrap();

    // Assert
    let graph = &output.graph;
    let top = graph.by_name("Top").unwrap();
    let mid_id = graph.find("Mid").unwrap();
    assert_eq!(top.left, Side::Reference(mid_id));
    assert_eq!(top.right, Side::Pan(Pan::new(1)));
    assert_eq!(graph.len(), 2);
}

#[test]
fn given_undefined_reference_when_building_then_scale_has_default_sides() {
    // Arrange & Act
    let output = ScaleBuilder::default().build(["Top,Ghost,1"]).unwrap();

    // Assert
    let ghost = output.graph.by_name("Ghost").unwrap();
    assert_eq!(ghost.left, Side::default());
    assert_eq!(ghost.right, Side::default());
    assert_eq!(ghost.pan.mass, DEFAULT_SELF_MASS);
}

#[test]
fn given_invalid_lines_when_building_then_records_index_and_text() {
    // Arrange
    let lines = ["# header", "", "X,X,2", "A,1,2", "Y,3,Y", ",4,5"];

    // Act
    let output = ScaleBuilder::default().build(lines).unwrap();

    // Assert
    let found: Vec<_> = output
        .rejected
        .iter()
        .map(|r| (r.index, r.line.as_str(), r.reason.clone()))
        .collect();
    assert_eq!(
        found,
        vec![
            (2, "X,X,2", RejectReason::SelfReference(Hand::Left)),
            (4, "Y,3,Y", RejectReason::SelfReference(Hand::Right)),
            (5, ",4,5", RejectReason::EmptyName),
        ]
    );
    assert_eq!(output.graph.len(), 1);
}

#[test]
fn given_rejected_line_with_reference_when_building_then_creates_nothing() {
    // Arrange & Act: the right side would create B if the line were accepted
    let output = ScaleBuilder::default().build(["A,A,B"]).unwrap();

    // Assert
    assert!(output.graph.is_empty());
    assert!(output.graph.find("B").is_none());
}

#[test]
fn given_incremental_feed_when_pushing_then_outcomes_follow_lines() {
    // Arrange
    let mut builder = ScaleBuilder::default();

    // Act
    let outcomes: Vec<_> = ["#c", "S,5,5", "S,S,1"]
        .iter()
        .map(|line| builder.push_line(line).unwrap())
        .collect();

    // Assert
    assert_eq!(outcomes[0], LineOutcome::Skipped);
    assert!(matches!(outcomes[1], LineOutcome::Applied(_)));
    assert!(matches!(outcomes[2], LineOutcome::Rejected(ref r) if r.index == 2));
    assert_eq!(builder.finish().graph.len(), 1);
}

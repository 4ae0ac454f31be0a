use crate::converter::testutil::MockData;
use crate::converter::Lattice;
use crate::request::ConversionRequest;
use crate::segments::{RequestType, SegmentType, Segments};

/// After Viterbi with a fixed boundary, no node crossing the boundary may
/// hold a back-pointer.
#[test]
fn test_not_connected() {
    let data = MockData::new();
    let converter = data.converter();

    let mut segments = Segments::new();
    segments.set_request_type(RequestType::Conversion);
    let segment = segments.add_segment();
    segment.set_segment_type(SegmentType::FixedBoundary);
    segment.set_key("しょうめい");
    let segment = segments.add_segment();
    segment.set_segment_type(SegmentType::Free);
    segment.set_key("できる");

    let mut lattice = Lattice::new();
    lattice.set_key("しょうめいできる");
    let request = ConversionRequest::default();
    converter.make_lattice(&request, &segments, &mut lattice).unwrap();

    let group = converter.make_group(&segments);
    assert_eq!(group.len(), "しょうめいできる".len());
    assert_eq!(group["しょうめい".len()], 1);

    converter.viterbi(&segments, &mut lattice);

    // Intentionally segmented position - 1: "しょうめ"
    let pos = "しょうめ".len();
    let mut tested = false;
    for &id in lattice.begin_nodes(pos) {
        let node = lattice.node(id);
        if node.key_char_len() <= 1 {
            continue;
        }
        // A multi-char node here must cross into the next segment
        assert!(
            node.prev.is_none(),
            "node '{}' crosses the fixed boundary",
            node.key
        );
        tested = true;
    }
    assert!(tested, "expected at least one crossing node in the lattice");
}

#[test]
fn test_fixed_boundary_segments_preserved() {
    let data = MockData::new();
    let mut segments = Segments::new();
    segments.set_request_type(RequestType::Conversion);
    let segment = segments.add_segment();
    segment.set_segment_type(SegmentType::FixedBoundary);
    segment.set_key("しょうめい");
    let segment = segments.add_segment();
    segment.set_segment_type(SegmentType::Free);
    segment.set_key("できる");

    data.converter().convert(&mut segments).unwrap();

    assert_eq!(segments.conversion_segments_size(), 2);
    assert_eq!(segments.conversion_segment(0).key(), "しょうめい");
    assert_eq!(segments.conversion_segment(1).key(), "できる");
    assert_eq!(segments.conversion_segment(0).candidate(0).value, "証明");
    assert_eq!(segments.conversion_segment(1).candidate(0).value, "できる");
}

/// A value-locked segment keeps its locked surface on top.
#[test]
fn test_fixed_value_segment() {
    let data = MockData::new();
    let mut segments = Segments::new();
    segments.set_request_type(RequestType::Conversion);
    let segment = segments.add_segment();
    segment.set_segment_type(SegmentType::FixedValue);
    segment.set_key("きょう");
    let candidate = segment.add_candidate();
    candidate.key = "きょう".to_string();
    candidate.value = "京".to_string();
    let segment = segments.add_segment();
    segment.set_key("は");

    data.converter().convert(&mut segments).unwrap();

    assert_eq!(segments.conversion_segments_size(), 2);
    assert_eq!(segments.conversion_segment(0).candidate(0).value, "京");
}

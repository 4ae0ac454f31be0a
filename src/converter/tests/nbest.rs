use crate::converter::nbest::NBestGenerator;
use crate::converter::testutil::MockData;
use crate::converter::{Lattice, COST_SENTINEL};
use crate::dict::MemoryDictionary;
use crate::request::ConversionRequest;
use crate::segments::{RequestType, Segments};

fn prepared_lattice(data: &MockData, key: &str) -> (Segments, Lattice) {
    let mut segments = Segments::new();
    segments.set_request_type(RequestType::Conversion);
    segments.add_segment().set_key(key);

    let mut lattice = Lattice::new();
    lattice.set_key(key);
    let request = ConversionRequest::default();
    let converter = data.converter();
    converter.make_lattice(&request, &segments, &mut lattice).unwrap();
    converter.viterbi(&segments, &mut lattice);
    (segments, lattice)
}

#[test]
fn test_paths_in_ascending_cost_order() {
    let data = MockData::new();
    let (_, lattice) = prepared_lattice(&data, "きょうは");

    let eos_cost = lattice.node(lattice.eos()).cost;
    assert!(eos_cost < COST_SENTINEL);

    let generator = NBestGenerator::new(&lattice, data.connector(), data.segmenter(), 10_000);
    let paths: Vec<(Vec<usize>, i32)> = generator.collect();
    assert!(paths.len() >= 2);

    // The first path is the Viterbi optimum
    assert_eq!(paths[0].1, eos_cost);
    for pair in paths.windows(2) {
        assert!(pair[0].1 <= pair[1].1, "paths must pop in cost order");
    }

    // Every path tiles the full key
    for (nodes, _) in &paths {
        let joined: String = nodes.iter().map(|&id| lattice.node(id).key.as_str()).collect();
        assert_eq!(joined, "きょうは");
    }
}

#[test]
fn test_expansion_budget_bounds_work() {
    let data = MockData::new();
    let (_, lattice) = prepared_lattice(&data, "きょうは");

    // A one-pop budget is spent on the EOS expansion before any complete
    // path can surface
    let mut generator = NBestGenerator::new(&lattice, data.connector(), data.segmenter(), 1);
    assert!(generator.next().is_none());
}

#[test]
fn test_unreachable_eos_yields_nothing() {
    let data = MockData::new();
    let mut lattice = Lattice::new();
    lattice.set_key("きょう");
    // No nodes inserted, no Viterbi: EOS stays at the sentinel cost
    let mut generator = NBestGenerator::new(&lattice, data.connector(), data.segmenter(), 1_000);
    assert!(generator.next().is_none());
}

#[test]
fn test_viterbi_tiebreak_deterministic() {
    use crate::converter::testutil::{token, NOUN_ID};

    // Two tokens with identical costs force the tie-break rules
    let dict = MemoryDictionary::from_tokens([
        token("あ", "亜", 5000, NOUN_ID),
        token("あ", "阿", 5000, NOUN_ID),
    ]);
    let data = MockData::new();
    let converter = data.converter_with(&dict);

    let mut first: Option<String> = None;
    for _ in 0..10 {
        let mut segments = Segments::new();
        segments.set_request_type(RequestType::Conversion);
        segments.add_segment().set_key("あ");
        converter.convert(&mut segments).unwrap();
        let top = segments.segment(0).candidate(0).value.clone();
        match &first {
            None => first = Some(top),
            Some(expected) => assert_eq!(&top, expected, "tie-break must be deterministic"),
        }
    }
}

use crate::converter::testutil::MockData;
use crate::request::ConversionRequest;
use crate::segments::{Candidate, RequestType, Segments};

/// Runs a prediction over a multi-phrase key and reports whether any
/// candidate consumes only a prefix of the segment key.
fn has_partial_candidate(request: &ConversionRequest) -> bool {
    let data = MockData::new();
    let mut segments = Segments::new();
    segments.set_request_type(RequestType::Prediction);
    segments.set_max_prediction_candidates_size(10);
    segments.add_segment().set_key("わたしのなまえはなかのです");

    data.converter()
        .convert_for_request(request, &mut segments)
        .unwrap();

    assert_eq!(segments.conversion_segments_size(), 1);
    assert!(segments.segment(0).candidates_size() > 0);

    let segment_key = segments.segment(0).key().to_string();
    segments.segment(0).candidates().iter().any(|c| {
        c.key.len() < segment_key.len() && segment_key.starts_with(c.key.as_str())
    })
}

#[test]
fn test_enable_auto_partial_suggestion() {
    let request = ConversionRequest {
        create_partial_candidates: true,
        ..Default::default()
    };
    assert!(has_partial_candidate(&request));
}

#[test]
fn test_disable_auto_partial_suggestion() {
    let request = ConversionRequest {
        create_partial_candidates: false,
        ..Default::default()
    };
    assert!(!has_partial_candidate(&request));
}

#[test]
fn test_auto_partial_suggestion_default() {
    let request = ConversionRequest::default();
    assert!(!has_partial_candidate(&request));
}

/// Partial candidates are exactly the ones flagged as partially
/// consuming the key.
#[test]
fn test_auto_partial_suggestion_for_single_segment() {
    let request = ConversionRequest {
        create_partial_candidates: true,
        ..Default::default()
    };
    let data = MockData::new();

    for request_key in ["たかまち", "わたしのなまえはなかのです"] {
        let mut segments = Segments::new();
        segments.set_request_type(RequestType::Prediction);
        segments.set_max_prediction_candidates_size(10);
        segments.add_segment().set_key(request_key);

        data.converter()
            .convert_for_request(&request, &mut segments)
            .unwrap();

        assert_eq!(segments.conversion_segments_size(), 1);
        assert!(segments.segment(0).candidates_size() > 0);

        let segment_key = segments.segment(0).key();
        for candidate in segments.segment(0).candidates() {
            if candidate.attributes & Candidate::PARTIALLY_KEY_CONSUMED != 0 {
                assert!(
                    candidate.key.len() < segment_key.len(),
                    "partial candidate '{}' must consume a strict prefix",
                    candidate.key
                );
                assert!(segment_key.starts_with(candidate.key.as_str()));
            } else {
                assert!(
                    candidate.key.len() >= segment_key.len(),
                    "full candidate '{}' must consume the whole key",
                    candidate.key
                );
            }
        }
    }
}

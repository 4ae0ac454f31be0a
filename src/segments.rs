//! User-facing conversion units: segments, candidates and their container.
//!
//! A `Segments` value is owned by the caller and mutated in place by the
//! converter. History segments (previously committed text) form a prefix;
//! the remaining conversion segments carry the reading still being
//! converted. Candidates are replaced wholesale each time a segment is
//! reconverted.

/// How a conversion call should interpret the segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestType {
    #[default]
    Conversion,
    Prediction,
    Suggestion,
    PartialPrediction,
    PartialSuggestion,
    ReverseConversion,
}

/// Boundary/value negotiability of a single segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SegmentType {
    /// Boundaries may move during conversion.
    #[default]
    Free,
    /// The user fixed this boundary; no node may cross it.
    FixedBoundary,
    /// Boundary and surface value are both locked.
    FixedValue,
    /// Previously committed text, provides context only.
    History,
    /// Committed within the current composition.
    Submitted,
}

/// One decomposition step of a prediction candidate: byte lengths of the
/// key, the value, and their content (stem) portions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InnerSegmentBoundary {
    pub key_len: u32,
    pub value_len: u32,
    pub content_key_len: u32,
    pub content_value_len: u32,
}

/// A ranked conversion alternative for one segment.
#[derive(Debug, Clone, Default)]
pub struct Candidate {
    pub key: String,
    pub value: String,
    /// Key with the trailing functional tail removed.
    pub content_key: String,
    /// Value with the trailing functional tail removed.
    pub content_value: String,
    pub lid: u16,
    pub rid: u16,
    /// Intrinsic word cost of the candidate.
    pub wcost: i32,
    /// Total path cost this candidate was extracted from.
    pub cost: i32,
    /// Accumulated transition cost between the candidate's inner nodes.
    pub structure_cost: i32,
    pub attributes: u32,
    /// Populated for prediction candidates only.
    pub inner_segment_boundary: Vec<InnerSegmentBoundary>,
}

impl Candidate {
    pub const PARTIALLY_KEY_CONSUMED: u32 = 1 << 0;
    pub const SPELLING_CORRECTION: u32 = 1 << 1;
    pub const NO_MODIFICATION: u32 = 1 << 2;
    pub const RERANKED: u32 = 1 << 3;

    /// Append one inner-segment boundary entry (byte lengths).
    pub fn push_back_inner_segment_boundary(
        &mut self,
        key_len: usize,
        value_len: usize,
        content_key_len: usize,
        content_value_len: usize,
    ) {
        self.inner_segment_boundary.push(InnerSegmentBoundary {
            key_len: key_len as u32,
            value_len: value_len as u32,
            content_key_len: content_key_len as u32,
            content_value_len: content_value_len as u32,
        });
    }

    /// A candidate with boundaries is consistent when the boundary lengths
    /// tile its key and value exactly and content never exceeds its span.
    pub fn is_valid(&self) -> bool {
        if self.inner_segment_boundary.is_empty() {
            return true;
        }
        let mut key_sum = 0usize;
        let mut value_sum = 0usize;
        for b in &self.inner_segment_boundary {
            if b.content_key_len > b.key_len || b.content_value_len > b.value_len {
                return false;
            }
            key_sum += b.key_len as usize;
            value_sum += b.value_len as usize;
        }
        key_sum == self.key.len() && value_sum == self.value.len()
    }

    /// Iterate the inner segments as string slices.
    pub fn inner_segments(&self) -> InnerSegmentIterator<'_> {
        InnerSegmentIterator {
            candidate: self,
            index: 0,
            key_offset: 0,
            value_offset: 0,
        }
    }
}

/// One inner segment of a prediction candidate, as borrowed slices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InnerSegment<'a> {
    pub key: &'a str,
    pub value: &'a str,
    pub content_key: &'a str,
    pub content_value: &'a str,
}

pub struct InnerSegmentIterator<'a> {
    candidate: &'a Candidate,
    index: usize,
    key_offset: usize,
    value_offset: usize,
}

impl<'a> Iterator for InnerSegmentIterator<'a> {
    type Item = InnerSegment<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let b = self.candidate.inner_segment_boundary.get(self.index)?;
        let key_end = self.key_offset + b.key_len as usize;
        let value_end = self.value_offset + b.value_len as usize;
        let key = self.candidate.key.get(self.key_offset..key_end)?;
        let value = self.candidate.value.get(self.value_offset..value_end)?;
        let content_key = &key[..b.content_key_len as usize];
        let content_value = &value[..b.content_value_len as usize];
        self.index += 1;
        self.key_offset = key_end;
        self.value_offset = value_end;
        Some(InnerSegment {
            key,
            value,
            content_key,
            content_value,
        })
    }
}

/// A user-facing conversion unit: a reading plus its ranked candidates.
#[derive(Debug, Clone, Default)]
pub struct Segment {
    segment_type: SegmentType,
    key: String,
    candidates: Vec<Candidate>,
}

impl Segment {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn set_key(&mut self, key: impl Into<String>) {
        self.key = key.into();
    }

    pub fn segment_type(&self) -> SegmentType {
        self.segment_type
    }

    pub fn set_segment_type(&mut self, segment_type: SegmentType) {
        self.segment_type = segment_type;
    }

    pub fn candidates_size(&self) -> usize {
        self.candidates.len()
    }

    pub fn candidate(&self, i: usize) -> &Candidate {
        &self.candidates[i]
    }

    pub fn mut_candidate(&mut self, i: usize) -> &mut Candidate {
        &mut self.candidates[i]
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// Append a default-initialized candidate and return it.
    pub fn add_candidate(&mut self) -> &mut Candidate {
        self.candidates.push(Candidate::default());
        self.candidates.last_mut().expect("just pushed")
    }

    pub fn push_candidate(&mut self, candidate: Candidate) {
        self.candidates.push(candidate);
    }

    pub fn clear_candidates(&mut self) {
        self.candidates.clear();
    }
}

/// Ordered list of segments plus request-level settings.
///
/// Invariant: history segments (types `History`/`Submitted`) form a prefix
/// of the list; conversion segments follow.
#[derive(Debug, Clone, Default)]
pub struct Segments {
    segments: Vec<Segment>,
    request_type: RequestType,
    max_prediction_candidates: usize,
}

impl Segments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_type(&self) -> RequestType {
        self.request_type
    }

    pub fn set_request_type(&mut self, request_type: RequestType) {
        self.request_type = request_type;
    }

    /// Cap on candidates generated per segment for prediction requests.
    pub fn max_prediction_candidates_size(&self) -> usize {
        self.max_prediction_candidates
    }

    pub fn set_max_prediction_candidates_size(&mut self, n: usize) {
        self.max_prediction_candidates = n;
    }

    pub fn segments_size(&self) -> usize {
        self.segments.len()
    }

    pub fn segment(&self, i: usize) -> &Segment {
        &self.segments[i]
    }

    pub fn mut_segment(&mut self, i: usize) -> &mut Segment {
        &mut self.segments[i]
    }

    /// Append a default segment and return it.
    pub fn add_segment(&mut self) -> &mut Segment {
        self.segments.push(Segment::default());
        self.segments.last_mut().expect("just pushed")
    }

    fn is_history(segment: &Segment) -> bool {
        matches!(
            segment.segment_type(),
            SegmentType::History | SegmentType::Submitted
        )
    }

    /// Number of leading history segments.
    pub fn history_segments_size(&self) -> usize {
        self.segments
            .iter()
            .take_while(|s| Self::is_history(s))
            .count()
    }

    pub fn conversion_segments_size(&self) -> usize {
        self.segments_size() - self.history_segments_size()
    }

    /// The i-th conversion segment (skipping history).
    pub fn conversion_segment(&self, i: usize) -> &Segment {
        &self.segments[self.history_segments_size() + i]
    }

    pub fn mut_conversion_segment(&mut self, i: usize) -> &mut Segment {
        let offset = self.history_segments_size();
        &mut self.segments[offset + i]
    }

    pub fn history_segments(&self) -> &[Segment] {
        &self.segments[..self.history_segments_size()]
    }

    pub fn conversion_segments(&self) -> &[Segment] {
        &self.segments[self.history_segments_size()..]
    }

    /// Drop all history segments (used when history grows past the limit).
    pub fn clear_history_segments(&mut self) {
        let n = self.history_segments_size();
        self.segments.drain(..n);
    }

    /// Replace the conversion segments, keeping history intact.
    pub fn replace_conversion_segments(&mut self, replacement: Vec<Segment>) {
        let offset = self.history_segments_size();
        self.segments.truncate(offset);
        self.segments.extend(replacement);
    }
}

//! HTTP Range request parsing module
//!
//! Single-range `bytes=` parsing (RFC 7233). Multi-range and non-byte units
//! are ignored rather than rejected, matching common static-server behavior.

/// Parsed byte range
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeRequest {
    /// First byte position
    pub start: usize,
    /// Last byte position, None for an open-ended range
    pub end: Option<usize>,
}

impl RangeRequest {
    /// Actual last byte position for a file of the given size.
    #[inline]
    pub fn end_position(&self, file_size: usize) -> usize {
        self.end.unwrap_or_else(|| file_size.saturating_sub(1))
    }
}

/// Range header parse result
#[derive(Debug)]
pub enum RangeParseResult {
    /// Valid range request
    Valid(RangeRequest),
    /// Range cannot be satisfied for this file size, answer 416
    NotSatisfiable,
    /// No Range header, or one we ignore; serve the full content
    None,
}

/// Parse an HTTP Range header against a known file size.
///
/// Accepted forms: `bytes=start-end`, `bytes=start-`, `bytes=-suffix`.
pub fn parse_range_header(range_header: Option<&str>, file_size: usize) -> RangeParseResult {
    let Some(header) = range_header else {
        return RangeParseResult::None;
    };

    let Some(spec) = header.strip_prefix("bytes=") else {
        return RangeParseResult::None;
    };

    // Single range only; multi-range requests get the full content.
    if spec.contains(',') {
        return RangeParseResult::None;
    }

    let Some((start_str, end_str)) = spec.split_once('-') else {
        return RangeParseResult::None;
    };
    let (start_str, end_str) = (start_str.trim(), end_str.trim());

    if start_str.is_empty() {
        // Suffix form: "-500" means the last 500 bytes.
        let Ok(suffix) = end_str.parse::<usize>() else {
            return RangeParseResult::None;
        };
        if suffix == 0 {
            return RangeParseResult::NotSatisfiable;
        }
        return RangeParseResult::Valid(RangeRequest {
            start: file_size.saturating_sub(suffix),
            end: Some(file_size.saturating_sub(1)),
        });
    }

    let Ok(start) = start_str.parse::<usize>() else {
        return RangeParseResult::None;
    };
    if start >= file_size {
        return RangeParseResult::NotSatisfiable;
    }

    let end = if end_str.is_empty() {
        None
    } else {
        let Ok(e) = end_str.parse::<usize>() else {
            return RangeParseResult::None;
        };
        if e < start {
            return RangeParseResult::NotSatisfiable;
        }
        Some(e.min(file_size - 1))
    };

    RangeParseResult::Valid(RangeRequest { start, end })
}
